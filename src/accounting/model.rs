use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::slurm::rows::{comma_list, lenient_count, optional_count};

/// A single association row linking a user or account to its parent account
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct AssociationEdge {
    #[serde(rename(deserialize = "CLUSTER"))]
    pub cluster: String,
    #[serde(rename(deserialize = "ACCOUNT"))]
    pub account: String,
    /// Empty for account-level associations
    #[serde(rename(deserialize = "USER"))]
    pub user: String,
    #[serde(rename(deserialize = "PARTITION"))]
    pub partition: String,
    #[serde(rename(deserialize = "PARENT"))]
    pub parent_account: String,
    #[serde(default)]
    pub deleted: bool,
}

impl AssociationEdge {
    /// True for rows describing an account rather than a user within it
    pub fn is_account_level(&self) -> bool {
        self.user.is_empty()
    }
}

/// An association together with its scheduling limits.
///
/// Limits that are not set on the association are empty (`None` for counts); they may
/// still be inherited from a parent account.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AssociationDetail {
    #[serde(rename(deserialize = "ID"), deserialize_with = "lenient_count")]
    pub id: u32,
    #[serde(rename(deserialize = "CLUSTER"))]
    pub cluster: String,
    #[serde(rename(deserialize = "ACCOUNT"))]
    pub account: String,
    #[serde(rename(deserialize = "USER"))]
    pub user: String,
    #[serde(rename(deserialize = "PARTITION"))]
    pub partition: String,
    #[serde(rename(deserialize = "PARENT"))]
    pub parent_account: String,
    /// Fairshare value, or `parent`
    #[serde(rename(deserialize = "SHARES"))]
    pub shares: String,
    #[serde(rename(deserialize = "PRIORITY"), deserialize_with = "optional_count")]
    pub priority: Option<u32>,
    #[serde(rename(deserialize = "DEFAULT_QOS"))]
    pub default_qos: String,
    #[serde(rename(deserialize = "QOS"), deserialize_with = "comma_list")]
    pub qos: Vec<String>,
    #[serde(rename(deserialize = "MAX_JOBS"), deserialize_with = "optional_count")]
    pub max_jobs: Option<u32>,
    #[serde(rename(deserialize = "MAX_SUBMIT_JOBS"), deserialize_with = "optional_count")]
    pub max_submit_jobs: Option<u32>,
    #[serde(rename(deserialize = "MAX_JOBS_ACCRUE"), deserialize_with = "optional_count")]
    pub max_jobs_accrue: Option<u32>,
    #[serde(rename(deserialize = "MAX_WALL"))]
    pub max_wall_per_job: String,
    #[serde(rename(deserialize = "MAX_TRES"))]
    pub max_tres_per_job: String,
    #[serde(rename(deserialize = "MAX_TRES_PER_NODE"))]
    pub max_tres_per_node: String,
    #[serde(rename(deserialize = "MAX_TRES_MINS"))]
    pub max_tres_mins_per_job: String,
    #[serde(rename(deserialize = "GRP_JOBS"), deserialize_with = "optional_count")]
    pub grp_jobs: Option<u32>,
    #[serde(rename(deserialize = "GRP_SUBMIT_JOBS"), deserialize_with = "optional_count")]
    pub grp_submit_jobs: Option<u32>,
    #[serde(rename(deserialize = "GRP_JOBS_ACCRUE"), deserialize_with = "optional_count")]
    pub grp_jobs_accrue: Option<u32>,
    #[serde(rename(deserialize = "GRP_WALL"))]
    pub grp_wall: String,
    #[serde(rename(deserialize = "GRP_TRES"))]
    pub grp_tres: String,
    #[serde(rename(deserialize = "GRP_TRES_MINS"))]
    pub grp_tres_mins: String,
    #[serde(rename(deserialize = "GRP_TRES_RUN_MINS"))]
    pub grp_tres_run_mins: String,
}

impl AssociationDetail {
    /// True if this row describes the same association as `edge`
    pub fn describes(&self, edge: &AssociationEdge) -> bool {
        self.cluster == edge.cluster
            && self.account == edge.account
            && self.user == edge.user
            && self.partition == edge.partition
    }
}

/// A quality of service and its limits
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct QosRecord {
    #[serde(rename(deserialize = "ID"), deserialize_with = "lenient_count")]
    pub id: u32,
    #[serde(rename(deserialize = "NAME"))]
    pub name: String,
    #[serde(rename(deserialize = "DESCR"))]
    pub description: String,
    #[serde(rename(deserialize = "PRIORITY"), deserialize_with = "lenient_count")]
    pub priority: u32,
    #[serde(rename(deserialize = "GRACE_TIME"))]
    pub grace_time: String,
    #[serde(rename(deserialize = "PREEMPT"), deserialize_with = "comma_list")]
    pub preempt: Vec<String>,
    #[serde(rename(deserialize = "PREEMPT_MODE"))]
    pub preempt_mode: String,
    #[serde(rename(deserialize = "USAGE_FACTOR"), deserialize_with = "lenient_count")]
    pub usage_factor: f64,
    #[serde(rename(deserialize = "MAX_JOBS_PA"), deserialize_with = "optional_count")]
    pub max_jobs_per_account: Option<u32>,
    #[serde(rename(deserialize = "MAX_JOBS_PU"), deserialize_with = "optional_count")]
    pub max_jobs_per_user: Option<u32>,
    #[serde(rename(deserialize = "MAX_SUBMIT_PA"), deserialize_with = "optional_count")]
    pub max_submit_jobs_per_account: Option<u32>,
    #[serde(rename(deserialize = "MAX_SUBMIT_PU"), deserialize_with = "optional_count")]
    pub max_submit_jobs_per_user: Option<u32>,
    #[serde(rename(deserialize = "MAX_WALL"))]
    pub max_wall_per_job: String,
    #[serde(rename(deserialize = "MAX_TRES"))]
    pub max_tres_per_job: String,
    #[serde(rename(deserialize = "MAX_TRES_PER_NODE"))]
    pub max_tres_per_node: String,
    #[serde(rename(deserialize = "MAX_TRES_PU"))]
    pub max_tres_per_user: String,
    #[serde(rename(deserialize = "GRP_JOBS"), deserialize_with = "optional_count")]
    pub grp_jobs: Option<u32>,
    #[serde(rename(deserialize = "GRP_SUBMIT_JOBS"), deserialize_with = "optional_count")]
    pub grp_submit_jobs: Option<u32>,
    #[serde(rename(deserialize = "GRP_WALL"))]
    pub grp_wall: String,
    #[serde(rename(deserialize = "GRP_TRES"))]
    pub grp_tres: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    #[serde(rename(deserialize = "ACCOUNT"))]
    pub name: String,
    #[serde(rename(deserialize = "DESCR"))]
    pub description: String,
    #[serde(rename(deserialize = "ORG"))]
    pub organization: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    #[serde(rename(deserialize = "USER"))]
    pub name: String,
    #[serde(rename(deserialize = "ADMIN"))]
    pub admin_level: AdminLevel,
    #[serde(default)]
    pub deleted: bool,
}

/// Administrative privileges of a user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AdminLevel {
    #[default]
    NotSet,
    None,
    Operator,
    Administrator,
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdminLevel::NotSet => "Not Set",
            AdminLevel::None => "None",
            AdminLevel::Operator => "Operator",
            AdminLevel::Administrator => "Administrator",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for AdminLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "" | "notset" => Ok(AdminLevel::NotSet),
            "none" => Ok(AdminLevel::None),
            "operator" => Ok(AdminLevel::Operator),
            "admin" | "administrator" => Ok(AdminLevel::Administrator),
            _ => Err(format!("unknown admin level {:?}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for AdminLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
