mod cluster;
pub mod command;
pub mod config;
pub mod grammar;
mod jobs;
mod nodes;
pub mod partitions;
pub mod rows;

use std::io::Cursor;

pub use cluster::{Cluster, ClusterNode, PartitionGroup};
pub use command::{CommandError, CommandRunner, SystemRunner};
pub use config::{parse_config, SlurmConfig};
pub use grammar::{Delimiter, Field, RowGrammar};
pub use jobs::{parse_jobs, parse_steps, Job, Step};
pub use nodes::{parse_nodes, Node};
pub use partitions::{parse_partition, parse_partitions, PartitionBlock};
pub use rows::{parse_rows, Parsed};

/// Locations of the Slurm executables
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Programs {
    pub sinfo: String,
    pub squeue: String,
    pub sacct: String,
    pub scontrol: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            sinfo: "sinfo".to_string(),
            squeue: "squeue".to_string(),
            sacct: "sacct".to_string(),
            scontrol: "scontrol".to_string(),
        }
    }
}

/// Optional filters passed to `sinfo`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub partition: Option<String>,
    pub state: Option<String>,
    pub nodes: Option<String>,
}

/// Queries the Slurm controller via its command-line tools
#[derive(Debug)]
pub struct Scheduler<R = SystemRunner> {
    runner: R,
    programs: Programs,
    node_grammar: RowGrammar,
    job_grammar: RowGrammar,
    step_grammar: RowGrammar,
}

impl Scheduler<SystemRunner> {
    pub fn new(programs: Programs) -> Self {
        Self::with_runner(SystemRunner, programs)
    }
}

impl<R: CommandRunner> Scheduler<R> {
    pub fn with_runner(runner: R, programs: Programs) -> Self {
        Self {
            runner,
            programs,
            node_grammar: RowGrammar::nodes(),
            job_grammar: RowGrammar::jobs(),
            step_grammar: RowGrammar::steps(),
        }
    }

    /// Calls `sinfo -N` and returns one record per node
    pub fn nodes(&self, filter: &NodeFilter) -> Result<Parsed<Node>, CommandError> {
        let mut args = strings(["-h", "-N"]);
        for (flag, value) in [
            ("-p", &filter.partition),
            ("-t", &filter.state),
            ("-n", &filter.nodes),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                args.extend(strings([flag, value]));
            }
        }
        args.extend(strings(["-o", &self.node_grammar.printf_format()]));

        let output = self.runner.run(&self.programs.sinfo, &args)?;
        parse_nodes(Cursor::new(output), &self.node_grammar)
            .map_err(|err| CommandError::read(&self.programs.sinfo, err))
    }

    /// Calls `squeue`, optionally limited to a single job
    pub fn jobs(&self, job: Option<&str>) -> Result<Parsed<Job>, CommandError> {
        let mut args = strings(["-h"]);
        if let Some(job) = job {
            args.extend(strings(["-j", job]));
        }
        args.extend(strings(["-o", &self.job_grammar.printf_format()]));

        let output = self.runner.run(&self.programs.squeue, &args)?;
        parse_jobs(Cursor::new(output), &self.job_grammar)
            .map_err(|err| CommandError::read(&self.programs.squeue, err))
    }

    /// Calls `sacct` and returns the steps of `job`
    pub fn steps(&self, job: &str) -> Result<Parsed<Step>, CommandError> {
        let args = strings([
            "-n",
            "-P",
            "-j",
            job,
            &format!("--format={}", self.step_grammar.format(",")),
        ]);

        let output = self.runner.run(&self.programs.sacct, &args)?;
        parse_steps(Cursor::new(output), &self.step_grammar, job)
            .map_err(|err| CommandError::read(&self.programs.sacct, err))
    }

    /// Calls `scontrol show partition`, once per name or once for all partitions if `names` is empty
    pub fn partitions(&self, names: &[String]) -> Result<Vec<PartitionBlock>, CommandError> {
        if names.is_empty() {
            return self.show_partitions(None);
        }

        let mut partitions = Vec::new();
        for name in names {
            partitions.extend(self.show_partitions(Some(name))?);
        }

        Ok(partitions)
    }

    /// Calls `scontrol show partition <name>` and returns the attributes of that partition
    pub fn partition(&self, name: &str) -> Result<PartitionBlock, CommandError> {
        let output = self
            .runner
            .run(&self.programs.scontrol, &strings(["show", "partition", name]))?;

        parse_partition(Cursor::new(output))
            .map_err(|err| CommandError::read(&self.programs.scontrol, err))
    }

    fn show_partitions(&self, name: Option<&str>) -> Result<Vec<PartitionBlock>, CommandError> {
        let mut args = strings(["show", "partition"]);
        args.extend(name.map(String::from));

        let output = self.runner.run(&self.programs.scontrol, &args)?;
        parse_partitions(Cursor::new(output))
            .map_err(|err| CommandError::read(&self.programs.scontrol, err))
    }

    /// Calls `scontrol show config`
    pub fn config(&self) -> Result<SlurmConfig, CommandError> {
        let output = self
            .runner
            .run(&self.programs.scontrol, &strings(["show", "config"]))?;

        parse_config(Cursor::new(output))
            .map_err(|err| CommandError::read(&self.programs.scontrol, err))
    }

    /// Collects nodes and jobs and groups them by partition
    pub fn cluster(&self) -> Result<Cluster, CommandError> {
        let nodes = self.nodes(&NodeFilter::default())?;
        let jobs = self.jobs(None)?;

        Ok(Cluster::collect(nodes, jobs))
    }
}

fn strings<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::command::fake::FakeRunner;
    use super::*;

    fn scheduler(runner: FakeRunner) -> Scheduler<FakeRunner> {
        Scheduler::with_runner(runner, Programs::default())
    }

    #[test]
    fn test_node_arguments() {
        let slurm = scheduler(FakeRunner::default().with(
            "sinfo",
            "n1 p1 idle 1000 4 1 4 1 (null)\nn1 p2 idle 1000 4 1 4 1 (null)\n",
        ));
        let filter = NodeFilter {
            partition: Some("p1".into()),
            state: Some(" ".into()),
            nodes: None,
        };

        let nodes = slurm.nodes(&filter).unwrap();
        assert_eq!(nodes.records.len(), 1);

        let calls = slurm.runner.calls();
        assert_eq!(calls[0].0, "sinfo");
        assert_eq!(
            calls[0].1,
            strings(["-h", "-N", "-p", "p1", "-o", "%N %R %t %m %c %X %Y %Z %G"])
        );
    }

    #[test]
    fn test_job_arguments() {
        let slurm = scheduler(FakeRunner::default());
        slurm.jobs(Some("4242")).unwrap();
        slurm.steps("4242").unwrap();

        let calls = slurm.runner.calls();
        assert_eq!(
            calls[0].1,
            strings(["-h", "-j", "4242", "-o", "%i|%T|%u|%a|%C|%N|%P|%q|%r"])
        );
        assert_eq!(calls[1].0, "sacct");
        assert_eq!(
            calls[1].1,
            strings(["-n", "-P", "-j", "4242", "--format=JobID,JobName,State"])
        );
    }

    #[test]
    fn test_partitions_per_name() {
        let slurm = scheduler(FakeRunner::default().with(
            "scontrol",
            "PartitionName=p1 Nodes=node44 State=UP\n",
        ));

        let parts = slurm
            .partitions(&["p1".to_string(), "p1".to_string()])
            .unwrap();
        assert_eq!(parts.len(), 2);

        let calls = slurm.runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, strings(["show", "partition", "p1"]));

        assert_eq!(slurm.partitions(&[]).unwrap().len(), 1);
        assert_eq!(
            slurm.runner.calls()[2].1,
            strings(["show", "partition"])
        );
    }

    #[test]
    fn test_single_partition() {
        let slurm = scheduler(FakeRunner::default().with(
            "scontrol",
            "PartitionName=p1\n   Nodes=node44\n\n   State=UP\n",
        ));

        let partition = slurm.partition("p1").unwrap();
        assert_eq!(partition.name(), Some("p1"));
        assert_eq!(partition.state(), Some("UP"));
    }

    #[test]
    fn test_config() {
        let slurm = scheduler(FakeRunner::default().with(
            "scontrol",
            "ClusterName             = hpc\nSlurmctldPort           = 6817\n",
        ));

        let config = slurm.config().unwrap();
        assert_eq!(config.cluster_name(), Some("hpc"));
        assert_eq!(slurm.runner.calls()[0].1, strings(["show", "config"]));
    }

    #[test]
    fn test_command_failure_is_propagated() {
        let slurm = scheduler(FakeRunner::default().failing("squeue"));

        assert!(matches!(
            slurm.jobs(None),
            Err(CommandError::Spawn { ref program, .. }) if program == "squeue"
        ));
        assert!(matches!(slurm.cluster(), Err(CommandError::Spawn { .. })));
    }
}
