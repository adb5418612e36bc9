use serde::Serialize;
use tracing::debug;

use super::graph::{AssociationGraph, AssociationQuery, Children, ResolveError};
use super::model::{AdminLevel, AssociationDetail, AssociationEdge};
use super::store::AccountingStore;

/// A user below an account, with every account the user belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountUser {
    pub name: String,
    pub admin_level: AdminLevel,
    pub parent_accounts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountTree {
    pub name: String,
    pub description: String,
    pub organization: String,
    pub sub_accounts: Vec<String>,
    pub users: Vec<AccountUser>,
}

impl AccountTree {
    /// Orders accounts and users by name
    pub fn sorted(mut self) -> Self {
        self.sub_accounts.sort();
        self.users.sort_by(|a, b| a.name.cmp(&b.name));
        for user in &mut self.users {
            user.parent_accounts.sort();
        }

        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserPartitions {
    pub user: String,
    pub partitions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssociationTree {
    pub account: String,
    pub default_partitions: Vec<String>,
    pub sub_accounts: Vec<String>,
    pub users: Vec<UserPartitions>,
}

impl AssociationTree {
    /// Orders partitions, accounts, and users by name
    pub fn sorted(mut self) -> Self {
        self.default_partitions.sort();
        self.sub_accounts.sort();
        self.users.sort_by(|a, b| a.user.cmp(&b.user));
        for user in &mut self.users {
            user.partitions.sort();
        }

        self
    }
}

/// Answers association queries against a fresh snapshot of `store`
#[derive(Debug)]
pub struct Resolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> Resolver<'a, S>
where
    S: AccountingStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn graph(&self) -> Result<AssociationGraph, ResolveError> {
        let cluster = self.store.cluster()?;
        let edges = self.store.associations()?;
        debug!(cluster, edges = edges.len(), "loaded associations");

        Ok(AssociationGraph::new(cluster, edges))
    }

    pub fn direct_children(&self, account: &str) -> Result<Children, ResolveError> {
        let account = required_account(account)?;

        Ok(self.graph()?.direct_children(account))
    }

    pub fn parent_accounts(&self, user: &str) -> Result<Vec<String>, ResolveError> {
        let user = required_user(user)?;

        Ok(self.graph()?.parent_accounts(user))
    }

    pub fn default_partitions(&self, account: &str) -> Result<Vec<String>, ResolveError> {
        let account = required_account(account)?;

        Ok(self.graph()?.default_partitions(account))
    }

    pub fn partitions_of(&self, account: &str, user: &str) -> Result<Vec<String>, ResolveError> {
        let account = required_account(account)?;
        let user = required_user(user)?;

        Ok(self.graph()?.partitions_of(account, user))
    }

    pub fn find_one(&self, query: &AssociationQuery) -> Result<AssociationEdge, ResolveError> {
        required_account(&query.account)?;

        self.graph()?.find_one(query).cloned()
    }

    /// The single association matching `query`, together with its limits
    pub fn association(&self, query: &AssociationQuery) -> Result<AssociationDetail, ResolveError> {
        let edge = self.find_one(query)?;

        self.store
            .association_detail(&edge)?
            .ok_or(ResolveError::NotFound)
    }

    /// Account metadata with its direct sub-accounts and users
    pub fn account_tree(&self, account: &str) -> Result<AccountTree, ResolveError> {
        let account = required_account(account)?;
        let record = self
            .store
            .account(account)?
            .ok_or_else(|| ResolveError::AccountNotFound {
                account: account.to_string(),
            })?;

        let graph = self.graph()?;
        let children = graph.direct_children(account);

        let records = if children.users.is_empty() {
            Vec::new()
        } else {
            self.store.users_named(&children.users)?
        };

        let users = children
            .users
            .into_iter()
            .map(|name| {
                let admin_level = records
                    .iter()
                    .find(|r| r.name == name && !r.deleted)
                    .map(|r| r.admin_level)
                    .unwrap_or_default();
                let parent_accounts = graph.parent_accounts(&name);

                AccountUser {
                    name,
                    admin_level,
                    parent_accounts,
                }
            })
            .collect();

        Ok(AccountTree {
            name: record.name,
            description: record.description,
            organization: record.organization,
            sub_accounts: children.accounts,
            users,
        })
    }

    /// Partitions available to an account and to each of its direct users
    pub fn association_tree(&self, account: &str) -> Result<AssociationTree, ResolveError> {
        let account = required_account(account)?;
        let graph = self.graph()?;
        let children = graph.direct_children(account);

        let users = children
            .users
            .into_iter()
            .map(|user| UserPartitions {
                partitions: graph.partitions_of(account, &user),
                user,
            })
            .collect();

        Ok(AssociationTree {
            account: account.to_string(),
            default_partitions: graph.default_partitions(account),
            sub_accounts: children.accounts,
            users,
        })
    }
}

fn required_account(account: &str) -> Result<&str, ResolveError> {
    match account.trim() {
        "" => Err(ResolveError::EmptyAccount),
        account => Ok(account),
    }
}

fn required_user(user: &str) -> Result<&str, ResolveError> {
    match user.trim() {
        "" => Err(ResolveError::EmptyUser),
        user => Ok(user),
    }
}
