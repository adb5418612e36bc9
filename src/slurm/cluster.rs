use std::collections::HashMap;
use std::rc::Rc;

use super::jobs::Job;
use super::nodes::Node;
use super::rows::Parsed;

/// A node together with the jobs currently allocated on it
#[derive(Clone, Debug)]
pub struct ClusterNode {
    pub node: Node,
    pub jobs: Vec<Rc<Job>>,
}

impl ClusterNode {
    pub fn users(&self) -> usize {
        unique_values(self.jobs.iter().map(|v| &v.user))
    }
}

/// Nodes and jobs belonging to a single partition
#[derive(Clone, Debug)]
pub struct PartitionGroup {
    pub name: String,
    pub nodes: Vec<Rc<ClusterNode>>,
    pub jobs: Vec<Rc<Job>>,
}

impl PartitionGroup {
    pub fn users(&self) -> usize {
        unique_values(self.jobs.iter().map(|v| &v.user))
    }

    pub fn cpus(&self) -> u64 {
        self.nodes.iter().map(|n| n.node.cpus as u64).sum()
    }

    pub fn memory(&self) -> u64 {
        self.nodes.iter().map(|n| n.node.memory).sum()
    }

    pub fn gpus(&self) -> usize {
        self.nodes.iter().map(|n| n.node.gpus()).sum()
    }
}

/// Snapshot of the cluster organized by partition
#[derive(Clone, Debug, Default)]
pub struct Cluster {
    pub partitions: Vec<Rc<PartitionGroup>>,
    /// Lines of `sinfo`/`squeue` output that could not be parsed
    pub skipped: usize,
}

impl Cluster {
    /// Groups nodes and jobs by partition; a node is listed under each partition it belongs to
    pub fn collect(nodes: Parsed<Node>, jobs: Parsed<Job>) -> Self {
        let skipped = nodes.skipped + jobs.skipped;
        let jobs = jobs.records.into_iter().map(Rc::new).collect::<Vec<_>>();

        let mut allocated: HashMap<String, Vec<Rc<Job>>> = HashMap::new();
        let mut queued: HashMap<String, Vec<Rc<Job>>> = HashMap::new();
        for job in &jobs {
            for node in job.nodes() {
                allocated.entry(node).or_default().push(job.clone());
            }

            // Pending jobs may list several candidate partitions
            for partition in job.partition.split(',').filter(|p| !p.is_empty()) {
                queued
                    .entry(partition.to_string())
                    .or_default()
                    .push(job.clone());
            }
        }

        let mut order = Vec::new();
        let mut members: HashMap<String, Vec<Rc<ClusterNode>>> = HashMap::new();
        for node in nodes.records {
            let node = Rc::new(ClusterNode {
                jobs: allocated.remove(&node.name).unwrap_or_default(),
                node,
            });

            for partition in &node.node.partitions {
                members
                    .entry(partition.clone())
                    .or_insert_with(|| {
                        order.push(partition.clone());
                        Vec::new()
                    })
                    .push(node.clone());
            }
        }

        let mut partitions = Vec::new();
        for name in order {
            let nodes = members.remove(&name).unwrap_or_default();
            let jobs = queued.remove(&name).unwrap_or_default();

            partitions.push(Rc::new(PartitionGroup { name, nodes, jobs }));
        }

        // Sort by descending number of nodes
        partitions.sort_by_key(|v| -(v.nodes.len() as isize));

        Cluster {
            partitions,
            skipped,
        }
    }
}

fn unique_values<'a, I>(iter: I) -> usize
where
    I: std::iter::Iterator<Item = &'a String>,
{
    let mut values = iter.collect::<Vec<_>>();
    values.sort_unstable();
    values.dedup();
    values.len()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::slurm::{parse_jobs, parse_nodes, RowGrammar};

    fn cluster() -> Cluster {
        let nodes = parse_nodes(
            Cursor::new(
                "\
cn01 short idle 1000 4 1 4 1 (null)
cn01 all idle 1000 4 1 4 1 (null)
cn02 all mix 1000 4 1 4 1 (null)
gpu01 gpu alloc 2000 8 1 8 1 gpu:2
",
            ),
            &RowGrammar::nodes(),
        )
        .unwrap();
        let jobs = parse_jobs(
            Cursor::new(
                "\
1|RUNNING|alice|a|2|cn02|all|normal|None
2|RUNNING|bob|a|2|cn02|all|normal|None
3|RUNNING|alice|b|8|gpu01|gpu|normal|None
4|PENDING|carol|b|1||short,all|normal|Priority
bogus
",
            ),
            &RowGrammar::jobs(),
        )
        .unwrap();

        Cluster::collect(nodes, jobs)
    }

    #[test]
    fn test_grouping() {
        let cluster = cluster();
        let names = cluster
            .partitions
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["all", "short", "gpu"]);
        assert_eq!(cluster.skipped, 1);

        let all = &cluster.partitions[0];
        assert_eq!(all.nodes.len(), 2);
        assert_eq!(all.jobs.len(), 3);
        assert_eq!(all.users(), 3);
        assert_eq!(all.cpus(), 8);
    }

    #[test]
    fn test_node_jobs() {
        let cluster = cluster();
        let cn02 = &cluster.partitions[0].nodes[1];

        assert_eq!(cn02.node.name, "cn02");
        assert_eq!(cn02.jobs.len(), 2);
        assert_eq!(cn02.users(), 2);

        let gpu = &cluster.partitions[2];
        assert_eq!(gpu.gpus(), 2);
        assert_eq!(gpu.nodes[0].jobs[0].id, "3");
    }
}
