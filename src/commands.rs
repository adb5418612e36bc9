use std::io::Write;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::debug;

use crate::accounting::{AccountingStore, AssociationQuery, Resolver, SacctmgrStore};
use crate::args::{Args, Command};
use crate::output::{write_json, Envelope};
use crate::slurm::{CommandRunner, NodeFilter, Scheduler};

/// Runs a non-interactive subcommand, writing its result to `out` as JSON
pub fn run<R, W>(runner: &R, args: &Args, command: &Command, out: W) -> Result<()>
where
    R: CommandRunner,
    W: Write,
{
    let slurm = Scheduler::with_runner(runner, args.programs());
    let store = SacctmgrStore::new(runner, &args.sacctmgr, args.cluster.clone());

    match command {
        Command::Nodes(cmd) => {
            let filter = NodeFilter {
                partition: cmd.partition.clone(),
                state: cmd.state.clone(),
                nodes: cmd.nodes.clone(),
            };

            let mut nodes = slurm.nodes(&filter)?;
            nodes.records.sort_by(|a, b| a.name.cmp(&b.name));

            write_json(
                out,
                &Envelope::paged(&nodes.records, cmd.page()).skipped(nodes.skipped),
            )
        }
        Command::Jobs(cmd) => {
            let job = cmd
                .job
                .as_deref()
                .map(|job| required("job ID", job))
                .transpose()?;
            let jobs = slurm.jobs(job)?;

            write_json(
                out,
                &Envelope::paged(&jobs.records, cmd.page()).skipped(jobs.skipped),
            )
        }
        Command::Steps(cmd) => {
            let steps = slurm.steps(required("job ID", &cmd.job)?)?;

            write_json(
                out,
                &Envelope::paged(&steps.records, cmd.page()).skipped(steps.skipped),
            )
        }
        Command::Partitions(cmd) => {
            let names = cmd
                .names
                .iter()
                .map(|name| required("partition name", name).map(String::from))
                .collect::<Result<Vec<_>>>()?;

            let mut partitions = slurm.partitions(&names)?;
            partitions.sort_by(|a, b| a.name().cmp(&b.name()));

            write_json(out, &Envelope::paged(&partitions, cmd.page()))
        }
        Command::Partition(cmd) => {
            let partition = slurm.partition(required("partition name", &cmd.name)?)?;

            write_json(out, &partition)
        }
        Command::AccountTree(cmd) => {
            let store = association_store(runner, args, &slurm)?;
            let tree = Resolver::new(&store)
                .account_tree(&cmd.account)
                .wrap_err_with(|| format!("failed to build account tree for {:?}", cmd.account))?;

            write_json(out, &tree.sorted())
        }
        Command::AssociationTree(cmd) => {
            let store = association_store(runner, args, &slurm)?;
            let tree = Resolver::new(&store)
                .association_tree(&cmd.account)
                .wrap_err_with(|| {
                    format!("failed to build association tree for {:?}", cmd.account)
                })?;

            write_json(out, &tree.sorted())
        }
        Command::Association(cmd) => {
            let store = association_store(runner, args, &slurm)?;
            let query = AssociationQuery {
                account: cmd.account.clone(),
                user: cmd.user.clone(),
                partition: cmd.partition.clone(),
            };

            write_json(out, &Resolver::new(&store).association(&query)?)
        }
        Command::UserAccounts(cmd) => {
            let store = association_store(runner, args, &slurm)?;
            let mut accounts = Resolver::new(&store).parent_accounts(&cmd.user)?;
            accounts.sort();

            write_json(out, &Envelope::all(&accounts))
        }
        Command::Accounts(cmd) => {
            let mut accounts = store.accounts()?;
            accounts.sort_by(|a, b| a.name.cmp(&b.name));

            write_json(out, &Envelope::paged(&accounts, cmd.page()))
        }
        Command::Users(cmd) => {
            let mut users = store.users()?;
            if let Some(level) = cmd.admin_level {
                users.retain(|u| u.admin_level == level);
            }
            users.sort_by(|a, b| a.name.cmp(&b.name));

            write_json(out, &Envelope::paged(&users, cmd.page()))
        }
        Command::Qos(cmd) => match cmd.name.as_deref() {
            Some(name) => {
                let name = required("QoS name", name)?;
                let qos = store
                    .qos(name)?
                    .ok_or_else(|| eyre!("QoS `{}` not found", name))?;

                write_json(out, &qos)
            }
            None => {
                let mut qos = store.qos_list()?;
                qos.sort_by(|a, b| b.id.cmp(&a.id));

                write_json(out, &Envelope::paged(&qos, cmd.page()))
            }
        },
        Command::Dashboard(_) => Err(eyre!("the dashboard cannot be run as a JSON command")),
    }
}

/// Accounting store for association queries, bound to `--cluster` or else to the
/// `ClusterName` of the local Slurm configuration
fn association_store<'r, R>(
    runner: &'r R,
    args: &Args,
    slurm: &Scheduler<&'r R>,
) -> Result<SacctmgrStore<&'r R>>
where
    R: CommandRunner,
{
    let cluster = match args.cluster.as_deref().map(str::trim) {
        Some(cluster) if !cluster.is_empty() => Some(cluster.to_string()),
        _ => slurm
            .config()
            .wrap_err("failed to determine the cluster name")?
            .cluster_name()
            .map(String::from),
    };
    debug!(?cluster, "resolved cluster for association queries");

    Ok(SacctmgrStore::new(runner, &args.sacctmgr, cluster))
}

/// Trims a user-supplied name, rejecting empty values before any command is run
fn required<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    match value.trim() {
        "" => Err(eyre!("{} must not be empty", what)),
        value => Ok(value),
    }
}
