use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::debug;

/// Failure to obtain output from an external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("failed to read output of `{program}`")]
    Read {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    pub fn read(program: &str, source: std::io::Error) -> Self {
        CommandError::Read {
            program: program.to_string(),
            source,
        }
    }
}

/// Executes a command and returns its standard output.
///
/// Implemented by [`SystemRunner`] for real use; tests substitute canned output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError>;
}

/// Runs commands as child processes
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError> {
        debug!(program, ?args, "executing command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Exit {
                program: program.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError> {
        (**self).run(program, args)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// Returns canned output keyed by program name and records every invocation
    #[derive(Debug, Default)]
    pub struct FakeRunner {
        outputs: HashMap<String, String>,
        by_argument: Vec<(String, String, String)>,
        failing: Vec<String>,
        pub calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl FakeRunner {
        pub fn with(mut self, program: &str, output: &str) -> Self {
            self.outputs.insert(program.to_string(), output.to_string());
            self
        }

        /// Output for invocations of `program` that include `argument`; takes precedence over [`Self::with`]
        pub fn with_argument(mut self, program: &str, argument: &str, output: &str) -> Self {
            self.by_argument.push((
                program.to_string(),
                argument.to_string(),
                output.to_string(),
            ));
            self
        }

        pub fn failing(mut self, program: &str) -> Self {
            self.failing.push(program.to_string());
            self
        }

        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec()));

            if self.failing.iter().any(|p| p == program) {
                return Err(CommandError::Spawn {
                    program: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                });
            }

            let matching = self
                .by_argument
                .iter()
                .find(|(p, argument, _)| p == program && args.contains(argument))
                .map(|(_, _, output)| output);

            Ok(matching
                .or_else(|| self.outputs.get(program))
                .cloned()
                .unwrap_or_default()
                .into_bytes())
        }
    }
}
