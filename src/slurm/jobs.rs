use std::io::{self, Read};

use serde::{Deserialize, Serialize};

use super::grammar::RowGrammar;
use super::rows::{nullable_string, parse_rows, Parsed};
use crate::utilities::expand_hostlist;

/// Snapshot of a queued or running job as reported by `squeue`
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all(deserialize = "UPPERCASE"))]
pub struct Job {
    /// ID of the job; array and heterogeneous jobs use non-numeric IDs such as `1234_7`
    #[serde(rename(deserialize = "JOBID"))]
    pub id: String,
    /// Long state name, e.g. `RUNNING` or `PENDING`
    pub state: String,
    /// Owner of the job
    pub user: String,
    /// Account charged for the job; may be empty
    pub account: String,
    /// Number of CPUs; pending jobs may report a range
    pub cpus: String,
    /// Nodes assigned to the job in compact hostlist form, e.g. `cn[01-04]`
    #[serde(deserialize_with = "nullable_string")]
    pub nodelist: String,
    pub partition: String,
    pub qos: String,
    /// Reason the job is pending, or `None`
    pub reason: String,
}

impl Job {
    /// Returns the individual nodes in `nodelist`
    pub fn nodes(&self) -> Vec<String> {
        expand_hostlist(&self.nodelist)
    }

    pub fn is_running(&self) -> bool {
        self.state == "RUNNING"
    }
}

/// A step of a job; the job ID itself is supplied by the caller
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Step {
    #[serde(rename(deserialize = "JOBID"))]
    pub id: String,
    #[serde(rename(deserialize = "JOBNAME"))]
    pub name: String,
    #[serde(rename(deserialize = "STATE"))]
    pub state: String,
}

/// Parses `squeue` output
pub fn parse_jobs<R>(reader: R, grammar: &RowGrammar) -> io::Result<Parsed<Job>>
where
    R: Read,
{
    parse_rows(reader, grammar)
}

/// Parses `sacct` output for `job`, discarding the line describing the job allocation itself
pub fn parse_steps<R>(reader: R, grammar: &RowGrammar, job: &str) -> io::Result<Parsed<Step>>
where
    R: Read,
{
    let mut steps: Parsed<Step> = parse_rows(reader, grammar)?;
    steps.records.retain(|step| step.id != job);

    Ok(steps)
}
