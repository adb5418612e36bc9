use thiserror::Error;

use super::model::{AccountRecord, AssociationDetail, AssociationEdge, QosRecord, UserRecord};
use crate::slurm::CommandError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cluster name is empty")]
    MissingCluster,
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Read-only access to the accounting database
pub trait AccountingStore {
    /// Cluster whose associations are served by this store
    fn cluster(&self) -> Result<&str, StoreError>;

    /// Every association of the configured cluster
    fn associations(&self) -> Result<Vec<AssociationEdge>, StoreError>;

    /// Limits of the association identified by `edge`, if it still exists
    fn association_detail(
        &self,
        edge: &AssociationEdge,
    ) -> Result<Option<AssociationDetail>, StoreError>;

    /// Looks up an account by its exact name
    fn account(&self, name: &str) -> Result<Option<AccountRecord>, StoreError>;

    fn accounts(&self) -> Result<Vec<AccountRecord>, StoreError>;

    /// Looks up all `names` in a single request; unknown names are omitted from the result
    fn users_named(&self, names: &[String]) -> Result<Vec<UserRecord>, StoreError>;

    fn users(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Looks up a QoS by its exact name
    fn qos(&self, name: &str) -> Result<Option<QosRecord>, StoreError>;

    fn qos_list(&self) -> Result<Vec<QosRecord>, StoreError>;
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::Cell;

    use super::*;

    /// Serves fixed records and counts the lookups made against it
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub cluster: String,
        pub edges: Vec<AssociationEdge>,
        pub details: Vec<AssociationDetail>,
        pub accounts: Vec<AccountRecord>,
        pub users: Vec<UserRecord>,
        pub qos: Vec<QosRecord>,
        pub failing: bool,
        pub association_calls: Cell<usize>,
        pub user_calls: Cell<usize>,
    }

    impl MemoryStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.failing {
                return Err(StoreError::Command(CommandError::Spawn {
                    program: "sacctmgr".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                }));
            }

            Ok(())
        }
    }

    impl AccountingStore for MemoryStore {
        fn cluster(&self) -> Result<&str, StoreError> {
            match self.cluster.trim() {
                "" => Err(StoreError::MissingCluster),
                cluster => Ok(cluster),
            }
        }

        fn associations(&self) -> Result<Vec<AssociationEdge>, StoreError> {
            self.check()?;
            self.association_calls.set(self.association_calls.get() + 1);

            Ok(self.edges.clone())
        }

        fn association_detail(
            &self,
            edge: &AssociationEdge,
        ) -> Result<Option<AssociationDetail>, StoreError> {
            self.check()?;

            Ok(self.details.iter().find(|d| d.describes(edge)).cloned())
        }

        fn account(&self, name: &str) -> Result<Option<AccountRecord>, StoreError> {
            self.check()?;

            Ok(self
                .accounts
                .iter()
                .find(|a| a.name == name && !a.deleted)
                .cloned())
        }

        fn accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
            self.check()?;

            Ok(self.accounts.clone())
        }

        fn users_named(&self, names: &[String]) -> Result<Vec<UserRecord>, StoreError> {
            self.check()?;
            self.user_calls.set(self.user_calls.get() + 1);

            Ok(self
                .users
                .iter()
                .filter(|u| names.contains(&u.name))
                .cloned()
                .collect())
        }

        fn users(&self) -> Result<Vec<UserRecord>, StoreError> {
            self.check()?;

            Ok(self.users.clone())
        }

        fn qos(&self, name: &str) -> Result<Option<QosRecord>, StoreError> {
            self.check()?;

            Ok(self.qos.iter().find(|q| q.name == name).cloned())
        }

        fn qos_list(&self) -> Result<Vec<QosRecord>, StoreError> {
            self.check()?;

            Ok(self.qos.clone())
        }
    }
}
