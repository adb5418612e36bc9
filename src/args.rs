use std::path::PathBuf;

use argh::FromArgs;

use crate::accounting::AdminLevel;
use crate::output::Page;
use crate::slurm::Programs;

/// Command-line queries and text-based dashboard for Slurm
#[derive(FromArgs, Debug)]
pub struct Args {
    /// location of `sinfo` executable
    #[argh(option, default = "\"sinfo\".to_string()")]
    pub sinfo: String,

    /// location of `squeue` executable
    #[argh(option, default = "\"squeue\".to_string()")]
    pub squeue: String,

    /// location of `sacct` executable
    #[argh(option, default = "\"sacct\".to_string()")]
    pub sacct: String,

    /// location of `scontrol` executable
    #[argh(option, default = "\"scontrol\".to_string()")]
    pub scontrol: String,

    /// location of `sacctmgr` executable
    #[argh(option, default = "\"sacctmgr\".to_string()")]
    pub sacctmgr: String,

    /// cluster whose associations are queried; defaults to `ClusterName` of the local configuration
    #[argh(option)]
    pub cluster: Option<String>,

    /// write log messages to this file instead of stderr
    #[argh(option)]
    pub log_file: Option<PathBuf>,

    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,

    /// defaults to `dashboard`
    #[argh(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    pub fn programs(&self) -> Programs {
        Programs {
            sinfo: self.sinfo.clone(),
            squeue: self.squeue.clone(),
            sacct: self.sacct.clone(),
            scontrol: self.scontrol.clone(),
        }
    }
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand)]
pub enum Command {
    Nodes(NodesArgs),
    Jobs(JobsArgs),
    Steps(StepsArgs),
    Partitions(PartitionsArgs),
    Partition(PartitionArgs),
    AccountTree(AccountTreeArgs),
    AssociationTree(AssociationTreeArgs),
    Association(AssociationArgs),
    UserAccounts(UserAccountsArgs),
    Accounts(AccountsArgs),
    Users(UsersArgs),
    Qos(QosArgs),
    Dashboard(DashboardArgs),
}

/// List nodes with their partitions
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "nodes")]
pub struct NodesArgs {
    /// only list nodes in this partition
    #[argh(option)]
    pub partition: Option<String>,

    /// only list nodes in this state
    #[argh(option)]
    pub state: Option<String>,

    /// only list these nodes
    #[argh(option)]
    pub nodes: Option<String>,

    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,
}

/// List queued and running jobs
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "jobs")]
pub struct JobsArgs {
    /// only show this job
    #[argh(option)]
    pub job: Option<String>,

    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,
}

/// List the steps of a job
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "steps")]
pub struct StepsArgs {
    /// job ID
    #[argh(option)]
    pub job: String,

    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,
}

/// List partitions and their attributes
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "partitions")]
pub struct PartitionsArgs {
    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,

    /// partitions to show; all partitions if none are given
    #[argh(positional)]
    pub names: Vec<String>,
}

/// Show the attributes of a single partition
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "partition")]
pub struct PartitionArgs {
    /// partition name
    #[argh(positional)]
    pub name: String,
}

/// Show an account with its sub-accounts and users
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "account-tree")]
pub struct AccountTreeArgs {
    /// account name
    #[argh(positional)]
    pub account: String,
}

/// Show the partitions available to an account and its users
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "association-tree")]
pub struct AssociationTreeArgs {
    /// account name
    #[argh(positional)]
    pub account: String,
}

/// Look up a single association
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "association")]
pub struct AssociationArgs {
    /// account name
    #[argh(option)]
    pub account: String,

    /// user name; matches any user if omitted
    #[argh(option, default = "String::new()")]
    pub user: String,

    /// partition name; matches any partition if omitted
    #[argh(option, default = "String::new()")]
    pub partition: String,
}

/// List the accounts a user belongs to
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "user-accounts")]
pub struct UserAccountsArgs {
    /// user name
    #[argh(positional)]
    pub user: String,
}

/// List accounts
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "accounts")]
pub struct AccountsArgs {
    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,
}

/// List users
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "users")]
pub struct UsersArgs {
    /// only list users with this admin level
    #[argh(option)]
    pub admin_level: Option<AdminLevel>,

    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,
}

/// List quality of service definitions, or show a single one
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "qos")]
pub struct QosArgs {
    /// only show the QoS with this name
    #[argh(option)]
    pub name: Option<String>,

    /// page number, starting at 1
    #[argh(option, default = "1")]
    pub page: usize,

    /// number of results per page
    #[argh(option, default = "20")]
    pub page_size: usize,
}

/// Interactive overview of partitions, nodes, and jobs
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "dashboard")]
pub struct DashboardArgs {
    /// refresh frequency in seconds; a value of zero disables automatic updates
    #[argh(option, default = "5")]
    pub interval: u64,
}

impl Default for DashboardArgs {
    fn default() -> Self {
        Self { interval: 5 }
    }
}

macro_rules! paged {
    ($($args:ty),*) => {
        $(
            impl $args {
                pub fn page(&self) -> Page {
                    Page::new(self.page, self.page_size)
                }
            }
        )*
    };
}

paged!(
    NodesArgs,
    JobsArgs,
    StepsArgs,
    PartitionsArgs,
    AccountsArgs,
    UsersArgs,
    QosArgs
);

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        Args::from_args(&["slurmlens"], args)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();

        assert_eq!(args.programs(), Programs::default());
        assert_eq!(args.sacctmgr, "sacctmgr");
        assert_eq!(args.cluster, None);
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_subcommands() {
        let args = parse(&["--cluster", "c1", "partitions", "p1", "p2"]).unwrap();
        assert_eq!(args.cluster.as_deref(), Some("c1"));
        assert_eq!(
            args.command,
            Some(Command::Partitions(PartitionsArgs {
                page: 1,
                page_size: 20,
                names: vec!["p1".into(), "p2".into()],
            }))
        );

        let args = parse(&["association", "--account", "physics", "--user", "alice"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Association(AssociationArgs {
                account: "physics".into(),
                user: "alice".into(),
                partition: String::new(),
            }))
        );

        let args = parse(&["users", "--admin-level", "operator", "--page-size", "500"]).unwrap();
        match args.command {
            Some(Command::Users(users)) => {
                assert_eq!(users.admin_level, Some(AdminLevel::Operator));
                assert_eq!(users.page(), Page::new(1, 100));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_qos() {
        let args = parse(&["qos", "--name", "long"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Qos(QosArgs {
                name: Some("long".into()),
                page: 1,
                page_size: 20,
            }))
        );
    }

    #[test]
    fn test_missing_argument() {
        assert!(parse(&["account-tree"]).is_err());
        assert!(parse(&["steps"]).is_err());
    }
}
