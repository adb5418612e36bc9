use serde::Serialize;
use thiserror::Error;

use super::model::AssociationEdge;
use super::store::StoreError;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("account name must not be empty")]
    EmptyAccount,
    #[error("user name must not be empty")]
    EmptyUser,
    #[error("no matching association found")]
    NotFound,
    #[error("account `{account}` not found")]
    AccountNotFound { account: String },
    #[error("{} associations match the query", matches.len())]
    Ambiguous { matches: Vec<AssociationEdge> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accounts and users directly below an account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Children {
    pub accounts: Vec<String>,
    pub users: Vec<String>,
}

/// Filter for [`AssociationGraph::find_one`]; blank `user` or `partition` match anything
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssociationQuery {
    pub account: String,
    pub user: String,
    pub partition: String,
}

impl AssociationQuery {
    fn matches(&self, edge: &AssociationEdge) -> bool {
        let user = self.user.trim();
        let partition = self.partition.trim();

        edge.account == self.account.trim()
            && (user.is_empty() || edge.user == user)
            && (partition.is_empty() || edge.partition == partition)
    }
}

/// Snapshot of the association hierarchy of a single cluster, excluding deleted rows
#[derive(Clone, Debug, Default)]
pub struct AssociationGraph {
    cluster: String,
    edges: Vec<AssociationEdge>,
}

impl AssociationGraph {
    /// Keeps the live edges belonging to `cluster`; rows of other clusters are dropped
    pub fn new(cluster: &str, mut edges: Vec<AssociationEdge>) -> Self {
        edges.retain(|edge| !edge.deleted && edge.cluster == cluster);

        Self {
            cluster: cluster.to_string(),
            edges,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn edges(&self) -> &[AssociationEdge] {
        &self.edges
    }

    /// Sub-accounts and users one level below `account`
    pub fn direct_children(&self, account: &str) -> Children {
        let accounts = distinct(
            self.edges
                .iter()
                .filter(|e| e.is_account_level() && e.parent_account == account)
                .map(|e| &e.account),
        );
        let users = distinct(
            self.edges
                .iter()
                .filter(|e| !e.is_account_level() && e.account == account)
                .map(|e| &e.user),
        );

        Children { accounts, users }
    }

    /// Accounts under which `user` has an association
    pub fn parent_accounts(&self, user: &str) -> Vec<String> {
        distinct(
            self.edges
                .iter()
                .filter(|e| !e.is_account_level() && e.user == user)
                .map(|e| &e.account),
        )
    }

    pub fn default_partitions(&self, account: &str) -> Vec<String> {
        distinct(
            self.edges
                .iter()
                .filter(|e| e.is_account_level() && e.account == account)
                .map(|e| &e.partition),
        )
    }

    pub fn partitions_of(&self, account: &str, user: &str) -> Vec<String> {
        distinct(
            self.edges
                .iter()
                .filter(|e| e.account == account && e.user == user)
                .map(|e| &e.partition),
        )
    }

    /// Returns the single association matching `query`
    pub fn find_one(&self, query: &AssociationQuery) -> Result<&AssociationEdge, ResolveError> {
        if query.account.trim().is_empty() {
            return Err(ResolveError::EmptyAccount);
        }

        let mut matches = self.edges.iter().filter(|e| query.matches(e));
        match (matches.next(), matches.next()) {
            (None, _) => Err(ResolveError::NotFound),
            (Some(edge), None) => Ok(edge),
            (Some(first), Some(second)) => {
                let mut all = vec![first.clone(), second.clone()];
                all.extend(matches.cloned());

                Err(ResolveError::Ambiguous { matches: all })
            }
        }
    }
}

/// Collects non-empty values in first-seen order, dropping duplicates
fn distinct<'a, I>(iter: I) -> Vec<String>
where
    I: Iterator<Item = &'a String>,
{
    let mut values: Vec<String> = Vec::new();
    for value in iter {
        if !value.is_empty() && !values.contains(value) {
            values.push(value.clone());
        }
    }

    values
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn edge(account: &str, user: &str, partition: &str, parent: &str) -> AssociationEdge {
        AssociationEdge {
            cluster: "c1".into(),
            account: account.into(),
            user: user.into(),
            partition: partition.into(),
            parent_account: parent.into(),
            deleted: false,
        }
    }

    pub fn sample() -> Vec<AssociationEdge> {
        vec![
            edge("root", "", "", ""),
            edge("physics", "", "", "root"),
            edge("physics", "", "short", "root"),
            edge("physics", "", "long", "root"),
            edge("astro", "", "", "physics"),
            edge("chem", "", "short", "root"),
            edge("physics", "alice", "short", "root"),
            edge("physics", "alice", "long", "root"),
            edge("physics", "bob", "", "root"),
            edge("astro", "alice", "gpu", "physics"),
            edge("astro", "carol", "", "physics"),
            AssociationEdge {
                deleted: true,
                ..edge("old", "", "", "physics")
            },
            AssociationEdge {
                deleted: true,
                ..edge("physics", "mallory", "short", "root")
            },
        ]
    }

    #[test]
    fn test_deleted_edges_are_excluded() {
        let graph = AssociationGraph::new("c1", sample());

        assert_eq!(graph.edges().len(), 11);
        assert!(graph.edges().iter().all(|e| !e.deleted));
        assert!(graph.parent_accounts("mallory").is_empty());
    }

    #[test]
    fn test_other_clusters_are_excluded() {
        let mut edges = sample();
        edges.extend(
            [
                edge("physics", "alice", "short", "root"),
                edge("physics", "dave", "", "root"),
                edge("bio", "", "", "root"),
            ]
            .into_iter()
            .map(|e| AssociationEdge {
                cluster: "c2".into(),
                ..e
            }),
        );
        let graph = AssociationGraph::new("c1", edges);

        assert_eq!(graph.cluster(), "c1");
        assert_eq!(graph.edges().len(), 11);
        assert!(graph.parent_accounts("dave").is_empty());
        assert_eq!(graph.direct_children("physics").users, vec!["alice", "bob"]);
        assert_eq!(graph.direct_children("root").accounts, vec!["physics", "chem"]);

        let query = AssociationQuery {
            account: "physics".into(),
            user: "alice".into(),
            partition: "short".into(),
        };
        assert_eq!(graph.find_one(&query).unwrap().cluster, "c1");

        let graph = AssociationGraph::new("c3", sample());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_direct_children() {
        let graph = AssociationGraph::new("c1", sample());

        let children = graph.direct_children("physics");
        assert_eq!(children.accounts, vec!["astro"]);
        assert_eq!(children.users, vec!["alice", "bob"]);

        // Not recursive: carol belongs to astro only
        let children = graph.direct_children("root");
        assert_eq!(children.accounts, vec!["physics", "chem"]);
        assert!(children.users.is_empty());

        assert_eq!(graph.direct_children("missing"), Children::default());
    }

    #[test]
    fn test_parent_accounts() {
        let graph = AssociationGraph::new("c1", sample());

        assert_eq!(graph.parent_accounts("alice"), vec!["physics", "astro"]);
        assert_eq!(graph.parent_accounts("carol"), vec!["astro"]);
        assert!(graph.parent_accounts("nobody").is_empty());
    }

    #[test]
    fn test_partitions() {
        let graph = AssociationGraph::new("c1", sample());

        assert_eq!(graph.default_partitions("physics"), vec!["short", "long"]);
        assert_eq!(graph.default_partitions("chem"), vec!["short"]);
        assert!(graph.default_partitions("astro").is_empty());

        assert_eq!(graph.partitions_of("physics", "alice"), vec!["short", "long"]);
        assert!(graph.partitions_of("physics", "bob").is_empty());
        assert!(graph.partitions_of("chem", "alice").is_empty());
    }

    #[test]
    fn test_find_one() {
        let graph = AssociationGraph::new("c1", sample());

        let query = AssociationQuery {
            account: "astro".into(),
            user: "carol".into(),
            partition: " ".into(),
        };
        let found = graph.find_one(&query).unwrap();
        assert_eq!(found.user, "carol");

        let query = AssociationQuery {
            account: "physics".into(),
            user: "alice".into(),
            partition: "long".into(),
        };
        assert_eq!(graph.find_one(&query).unwrap().partition, "long");
    }

    #[test]
    fn test_find_one_not_found_and_ambiguous() {
        let graph = AssociationGraph::new("c1", sample());

        let query = AssociationQuery {
            account: "physics".into(),
            user: "alice".into(),
            partition: "gpu".into(),
        };
        assert!(matches!(graph.find_one(&query), Err(ResolveError::NotFound)));

        let query = AssociationQuery {
            account: "physics".into(),
            user: "alice".into(),
            partition: String::new(),
        };
        match graph.find_one(&query) {
            Err(ResolveError::Ambiguous { matches }) => {
                assert_eq!(matches.len(), 2);
                assert_eq!(matches[0].partition, "short");
                assert_eq!(matches[1].partition, "long");
            }
            other => panic!("expected ambiguous match, got {:?}", other),
        }

        let query = AssociationQuery::default();
        assert!(matches!(
            graph.find_one(&query),
            Err(ResolveError::EmptyAccount)
        ));
    }
}
