use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};

use serde::Serialize;

use crate::utilities::{split_first, split_tokens};

/// Well-known attributes of `scontrol show partition`; the full set depends on the Slurm version
pub mod keys {
    pub const PARTITION_NAME: &str = "PartitionName";
    pub const NODES: &str = "Nodes";
    pub const STATE: &str = "State";
    pub const MAX_TIME: &str = "MaxTime";
    pub const TOTAL_CPUS: &str = "TotalCPUs";
    pub const TOTAL_NODES: &str = "TotalNodes";
    pub const DEFAULT: &str = "Default";
}

/// Attributes of a single partition, keyed by attribute name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PartitionBlock {
    attributes: HashMap<String, String>,
}

impl PartitionBlock {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.attributes.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of `PartitionName`, if present
    pub fn name(&self) -> Option<&str> {
        self.get(keys::PARTITION_NAME)
    }

    /// Compact hostlist of member nodes
    pub fn nodes(&self) -> Option<&str> {
        self.get(keys::NODES)
    }

    pub fn state(&self) -> Option<&str> {
        self.get(keys::STATE)
    }
}

/// Splits a `key=value` token at the first `=`; tokens without `=` are ignored
fn split_attribute(token: &[u8]) -> Option<(String, String)> {
    let (key, value) = split_first(token, b'=')?;

    Some((
        String::from_utf8_lossy(key).into_owned(),
        String::from_utf8_lossy(value).into_owned(),
    ))
}

/// Parses `scontrol show partition` output into one block per partition.
///
/// Partitions are normally separated by blank lines, but a repeated `PartitionName`
/// attribute also starts a new block, since the separator is not reliably present.
pub fn parse_partitions<R>(reader: R) -> io::Result<Vec<PartitionBlock>>
where
    R: Read,
{
    let mut partitions = Vec::new();
    let mut current = PartitionBlock::default();

    for line in BufReader::new(reader).split(b'\n') {
        let line = line?;
        if line.trim_ascii().is_empty() {
            if !current.is_empty() {
                partitions.push(std::mem::take(&mut current));
            }

            continue;
        }

        for (key, value) in split_tokens(&line).filter_map(split_attribute) {
            if key == keys::PARTITION_NAME && current.contains(keys::PARTITION_NAME) {
                partitions.push(std::mem::take(&mut current));
            }

            current.insert(key, value);
        }
    }

    if !current.is_empty() {
        partitions.push(current);
    }

    Ok(partitions)
}

/// Parses `scontrol show partition <name>` output as a single, flattened block
pub fn parse_partition<R>(reader: R) -> io::Result<PartitionBlock>
where
    R: Read,
{
    let mut partition = PartitionBlock::default();
    for line in BufReader::new(reader).split(b'\n') {
        for (key, value) in split_tokens(&line?).filter_map(split_attribute) {
            partition.insert(key, value);
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const SAMPLE: &str = "\
PartitionName=p1
   AllowGroups=root,group1,group2 AllowAccounts=root,acct1,acct2 AllowQos=ALL
   AllocNodes=ALL Default=NO QoS=N/A
   DefaultTime=NONE DisableRootJobs=NO ExclusiveUser=NO GraceTime=0 Hidden=NO
   MaxNodes=UNLIMITED MaxTime=UNLIMITED MinNodes=0 LLN=NO MaxCPUsPerNode=UNLIMITED
   Nodes=node44
   PriorityJobFactor=1 PriorityTier=1 RootOnly=NO ReqResv=NO OverSubscribe=NO
   OverTimeLimit=NONE PreemptMode=OFF
   State=UP TotalCPUs=36 TotalNodes=1 SelectTypeParameters=NONE
   JobDefaults=(null)
   DefMemPerNode=UNLIMITED MaxMemPerNode=UNLIMITED

PartitionName=p2
   AllowGroups=root,group1,group2,group3 AllowAccounts=root,acct1,acct2 AllowQos=ALL
   AllocNodes=ALL Default=NO QoS=N/A
   DefaultTime=NONE DisableRootJobs=NO ExclusiveUser=NO GraceTime=0 Hidden=NO
   MaxNodes=UNLIMITED MaxTime=UNLIMITED MinNodes=0 LLN=NO MaxCPUsPerNode=UNLIMITED
   Nodes=node2026
   PriorityJobFactor=1 PriorityTier=1 RootOnly=NO ReqResv=NO OverSubscribe=NO
   OverTimeLimit=NONE PreemptMode=OFF
   State=UP TotalCPUs=36 TotalNodes=1 SelectTypeParameters=NONE
   JobDefaults=(null)
   DefMemPerNode=UNLIMITED MaxMemPerNode=UNLIMITED";

    #[test]
    fn test_multiple_partitions() {
        let parts = parse_partitions(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(parts.len(), 2);

        let p1 = &parts[0];
        assert_eq!(p1.name(), Some("p1"));
        assert_eq!(p1.nodes(), Some("node44"));
        assert_eq!(p1.state(), Some("UP"));
        assert_eq!(p1.get("DefMemPerNode"), Some("UNLIMITED"));
        assert_eq!(p1.get("JobDefaults"), Some("(null)"));

        let p2 = &parts[1];
        assert_eq!(p2.name(), Some("p2"));
        assert_eq!(p2.nodes(), Some("node2026"));
        assert_eq!(p2.state(), Some("UP"));
        assert_eq!(p2.get(keys::MAX_TIME), Some("UNLIMITED"));
        assert_eq!(p2.get("AllowGroups"), Some("root,group1,group2,group3"));
    }

    #[test]
    fn test_missing_blank_line() {
        let text = SAMPLE.replace("\n\nPartitionName=p2", "\nPartitionName=p2");
        let parts = parse_partitions(Cursor::new(text)).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name(), Some("p1"));
        assert_eq!(parts[0].nodes(), Some("node44"));
        assert_eq!(parts[1].name(), Some("p2"));
        assert_eq!(parts[1].nodes(), Some("node2026"));
    }

    #[test]
    fn test_oneline_partitions() {
        let text = "PartitionName=a Nodes=n1 State=UP PartitionName=b Nodes=n2 State=DOWN\n";
        let parts = parse_partitions(Cursor::new(text)).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].name(), Some("b"));
        assert_eq!(parts[1].state(), Some("DOWN"));
    }

    #[test]
    fn test_split_on_first_equals() {
        let text = "PartitionName=p1 TRES=cpu=36,mem=128000M,node=1 Empty= NoValue\n";
        let parts = parse_partitions(Cursor::new(text)).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].get("TRES"), Some("cpu=36,mem=128000M,node=1"));
        assert_eq!(parts[0].get("Empty"), Some(""));
        assert!(!parts[0].contains("NoValue"));
        assert_eq!(parts[0].len(), 3);
    }

    #[test]
    fn test_blank_input() {
        assert!(parse_partitions(Cursor::new("\n  \n\n")).unwrap().is_empty());
        assert!(parse_partition(Cursor::new("")).unwrap().is_empty());
    }

    #[test]
    fn test_single_partition() {
        let (p1, _) = SAMPLE.split_once("\n\n").unwrap();
        let partition = parse_partition(Cursor::new(p1)).unwrap();

        assert_eq!(partition.name(), Some("p1"));
        assert_eq!(partition.nodes(), Some("node44"));
        assert_eq!(partition.get(keys::TOTAL_CPUS), Some("36"));
    }

    #[test]
    fn test_single_partition_does_not_split() {
        let partition = parse_partition(Cursor::new(SAMPLE)).unwrap();

        // Later values win when the output unexpectedly holds several partitions
        assert_eq!(partition.name(), Some("p2"));
        assert_eq!(partition.get("MaxTime"), Some("UNLIMITED"));
    }
}
