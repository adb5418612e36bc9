use std::collections::HashMap;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};

use super::grammar::RowGrammar;
use super::rows::{lenient_count, nullable_string, parse_rows, Parsed};

/// A single line of `sinfo -N` output; a node appears once per partition it belongs to
#[derive(Clone, Debug, Deserialize)]
struct NodeRow {
    #[serde(rename = "NODELIST")]
    name: String,
    #[serde(rename = "PARTITION")]
    partition: String,
    #[serde(rename = "STATE")]
    state: String,
    #[serde(rename = "MEMORY", deserialize_with = "lenient_count")]
    memory: u64,
    #[serde(rename = "CPUS", deserialize_with = "lenient_count")]
    cpus: u32,
    #[serde(rename = "SOCKETS", deserialize_with = "lenient_count")]
    sockets: u32,
    #[serde(rename = "CORES", deserialize_with = "lenient_count")]
    cores: u32,
    #[serde(rename = "THREADS", deserialize_with = "lenient_count")]
    threads: u32,
    #[serde(rename = "GRES", deserialize_with = "nullable_string")]
    gres: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    /// Partitions in the order they were first reported
    pub partitions: Vec<String>,
    /// Compact state as reported by `sinfo`, e.g. `idle`, `mix`, or `down*`
    pub state: String,
    /// Configured memory as reported by `sinfo` (MB)
    pub memory: u64,
    pub cpus: u32,
    pub sockets: u32,
    pub cores: u32,
    pub threads: u32,
    /// Generic resources, e.g. `gpu:a100:4(S:0-1)`; empty if none
    pub gres: String,
}

impl Node {
    fn from_row(row: NodeRow) -> Self {
        Node {
            name: row.name,
            partitions: vec![row.partition],
            state: row.state,
            memory: row.memory,
            cpus: row.cpus,
            sockets: row.sockets,
            cores: row.cores,
            threads: row.threads,
            gres: row.gres,
        }
    }

    /// Returns false if the node state carries the "not responding" marker
    pub fn responds(&self) -> bool {
        !self.state.ends_with('*')
    }

    /// Returns true if the node is available for executing jobs
    pub fn is_available(&self) -> bool {
        self.responds()
            && matches!(
                self.state.trim_end_matches(['*', '~', '#', '!', '%', '$', '@', '^', '-']),
                "alloc" | "allocated" | "comp" | "completing" | "idle" | "mix" | "mixed" | "resv"
                    | "reserved"
            )
    }

    /// Returns the number of GPUs listed in `gres`
    pub fn gpus(&self) -> usize {
        parse_gpus(&self.gres)
    }

    /// Returns true if the node is a member of `partition`
    pub fn in_partition(&self, partition: &str) -> bool {
        self.partitions.iter().any(|p| p == partition)
    }
}

/// Parses `sinfo -N` output, merging the per-partition lines of each node into one record
pub fn parse_nodes<R>(reader: R, grammar: &RowGrammar) -> io::Result<Parsed<Node>>
where
    R: Read,
{
    let rows: Parsed<NodeRow> = parse_rows(reader, grammar)?;

    let mut nodes: Vec<Node> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows.records {
        match index.get(&row.name) {
            Some(&idx) => {
                let node = &mut nodes[idx];
                if !node.in_partition(&row.partition) {
                    node.partitions.push(row.partition);
                }
            }
            None => {
                index.insert(row.name.clone(), nodes.len());
                nodes.push(Node::from_row(row));
            }
        }
    }

    Ok(Parsed {
        records: nodes,
        skipped: rows.skipped,
    })
}

/// Counts GPUs in a GRES string such as `gpu:a100:4(S:0-1),tmpdisk:100`
fn parse_gpus(gres: &str) -> usize {
    gres.split(',')
        .filter(|value| value.starts_with("gpu:"))
        .map(|value| {
            // Strip socket affinity, e.g. `(S:0-1)`, before taking the trailing count
            let (value, _) = value.split_once('(').unwrap_or((value, ""));
            let value = value.rsplit(':').next().unwrap_or(value);

            value.parse::<usize>().unwrap_or(0)
        })
        .sum()
}
