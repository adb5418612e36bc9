use std::io::Cursor;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::model::{AccountRecord, AssociationDetail, AssociationEdge, QosRecord, UserRecord};
use super::store::{AccountingStore, StoreError};
use crate::slurm::{parse_rows, CommandError, CommandRunner, RowGrammar, SystemRunner};

/// Entities that may be listed with `sacctmgr show`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listing {
    Associations,
    AssociationDetails,
    Accounts,
    Users,
    Qos,
}

impl Listing {
    fn entity(self) -> &'static str {
        match self {
            Listing::Associations | Listing::AssociationDetails => "associations",
            Listing::Accounts => "account",
            Listing::Users => "user",
            Listing::Qos => "qos",
        }
    }

    fn grammar(self) -> RowGrammar {
        match self {
            Listing::Associations => RowGrammar::associations(),
            Listing::AssociationDetails => RowGrammar::association_details(),
            Listing::Accounts => RowGrammar::accounts(),
            Listing::Users => RowGrammar::users(),
            Listing::Qos => RowGrammar::qos(),
        }
    }
}

/// Arguments for a single `sacctmgr show` invocation
#[derive(Clone, Debug)]
pub struct SacctmgrQuery {
    listing: Listing,
    grammar: RowGrammar,
    conditions: Vec<(&'static str, String)>,
}

impl SacctmgrQuery {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing,
            grammar: listing.grammar(),
            conditions: Vec::new(),
        }
    }

    /// Adds a `key=value` condition
    pub fn with(mut self, key: &'static str, value: &str) -> Self {
        self.conditions.push((key, value.to_string()));
        self
    }

    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            "-P".to_string(),
            "show".to_string(),
            self.listing.entity().to_string(),
        ];

        args.extend(
            self.conditions
                .iter()
                .map(|(key, value)| format!("{}={}", key, value)),
        );
        args.push(format!("format={}", self.grammar.format(",")));

        args
    }
}

/// Accounting store backed by the `sacctmgr` command
#[derive(Debug)]
pub struct SacctmgrStore<R = SystemRunner> {
    runner: R,
    program: String,
    cluster: Option<String>,
}

impl<R: CommandRunner> SacctmgrStore<R> {
    pub fn new(runner: R, program: &str, cluster: Option<String>) -> Self {
        Self {
            runner,
            program: program.to_string(),
            cluster: cluster
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }

    fn query<T>(&self, query: &SacctmgrQuery) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let output = self.runner.run(&self.program, &query.arguments())?;
        let parsed = parse_rows(Cursor::new(output), &query.grammar)
            .map_err(|err| CommandError::read(&self.program, err))?;

        debug!(
            listing = ?query.listing,
            records = parsed.records.len(),
            skipped = parsed.skipped,
            "queried accounting database"
        );

        Ok(parsed.records)
    }
}

impl<R: CommandRunner> AccountingStore for SacctmgrStore<R> {
    fn cluster(&self) -> Result<&str, StoreError> {
        self.cluster.as_deref().ok_or(StoreError::MissingCluster)
    }

    fn associations(&self) -> Result<Vec<AssociationEdge>, StoreError> {
        let query = SacctmgrQuery::new(Listing::Associations).with("cluster", self.cluster()?);

        self.query(&query)
    }

    fn association_detail(
        &self,
        edge: &AssociationEdge,
    ) -> Result<Option<AssociationDetail>, StoreError> {
        let mut query = SacctmgrQuery::new(Listing::AssociationDetails)
            .with("cluster", self.cluster()?)
            .with("accounts", &edge.account);
        if !edge.user.is_empty() {
            query = query.with("users", &edge.user);
        }
        if !edge.partition.is_empty() {
            query = query.with("partitions", &edge.partition);
        }

        let details: Vec<AssociationDetail> = self.query(&query)?;

        Ok(details.into_iter().find(|d| d.describes(edge)))
    }

    fn account(&self, name: &str) -> Result<Option<AccountRecord>, StoreError> {
        let query = SacctmgrQuery::new(Listing::Accounts).with("names", name);
        let accounts: Vec<AccountRecord> = self.query(&query)?;

        Ok(accounts.into_iter().find(|a| a.name == name))
    }

    fn accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
        self.query(&SacctmgrQuery::new(Listing::Accounts))
    }

    fn users_named(&self, names: &[String]) -> Result<Vec<UserRecord>, StoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let query = SacctmgrQuery::new(Listing::Users).with("names", &names.join(","));
        let mut users: Vec<UserRecord> = self.query(&query)?;
        users.retain(|u| names.contains(&u.name));

        Ok(users)
    }

    fn users(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.query(&SacctmgrQuery::new(Listing::Users))
    }

    fn qos(&self, name: &str) -> Result<Option<QosRecord>, StoreError> {
        let query = SacctmgrQuery::new(Listing::Qos).with("names", name);
        let qos: Vec<QosRecord> = self.query(&query)?;

        Ok(qos.into_iter().find(|q| q.name == name))
    }

    fn qos_list(&self) -> Result<Vec<QosRecord>, StoreError> {
        self.query(&SacctmgrQuery::new(Listing::Qos))
    }
}
