use csv::StringRecord;

/// How the fields of a single output line are separated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// One or more whitespace characters; empty fields cannot be represented
    Whitespace,
    /// A single explicit character; consecutive delimiters yield empty fields
    Char(u8),
}

/// A named, positional field in a delimited row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Attribute name used when mapping the field onto a record
    pub name: &'static str,
    /// Token requesting this field from the tool, e.g. `%N` for `sinfo`
    pub format: &'static str,
}

impl Field {
    pub const fn new(name: &'static str, format: &'static str) -> Self {
        Self { name, format }
    }
}

/// Describes the layout of one-record-per-line command output.
///
/// The order of `fields` must match the order of the tokens passed to the tool, which is
/// why the format argument is generated from the grammar itself (see [`RowGrammar::format`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowGrammar {
    pub delimiter: Delimiter,
    pub fields: Vec<Field>,
}

impl RowGrammar {
    pub fn new(delimiter: Delimiter, fields: Vec<Field>) -> Self {
        Self { delimiter, fields }
    }

    /// `sinfo -N` output; one line per node and partition membership
    pub fn nodes() -> Self {
        Self::new(
            Delimiter::Whitespace,
            vec![
                Field::new("NODELIST", "%N"),
                Field::new("PARTITION", "%R"),
                Field::new("STATE", "%t"),
                Field::new("MEMORY", "%m"),
                Field::new("CPUS", "%c"),
                Field::new("SOCKETS", "%X"),
                Field::new("CORES", "%Y"),
                Field::new("THREADS", "%Z"),
                Field::new("GRES", "%G"),
            ],
        )
    }

    /// `squeue` output; account and reason may legitimately be empty
    pub fn jobs() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("JOBID", "%i"),
                Field::new("STATE", "%T"),
                Field::new("USER", "%u"),
                Field::new("ACCOUNT", "%a"),
                Field::new("CPUS", "%C"),
                Field::new("NODELIST", "%N"),
                Field::new("PARTITION", "%P"),
                Field::new("QOS", "%q"),
                Field::new("REASON", "%r"),
            ],
        )
    }

    /// `sacct --parsable2` output for the steps of a single job
    pub fn steps() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("JOBID", "JobID"),
                Field::new("JOBNAME", "JobName"),
                Field::new("STATE", "State"),
            ],
        )
    }

    /// `sacctmgr show associations` output
    pub fn associations() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("CLUSTER", "Cluster"),
                Field::new("ACCOUNT", "Account"),
                Field::new("USER", "User"),
                Field::new("PARTITION", "Partition"),
                Field::new("PARENT", "ParentName"),
            ],
        )
    }

    /// `sacctmgr show associations` output including the limits of each association
    pub fn association_details() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("CLUSTER", "Cluster"),
                Field::new("ACCOUNT", "Account"),
                Field::new("USER", "User"),
                Field::new("PARTITION", "Partition"),
                Field::new("PARENT", "ParentName"),
                Field::new("ID", "ID"),
                Field::new("SHARES", "Fairshare"),
                Field::new("PRIORITY", "Priority"),
                Field::new("DEFAULT_QOS", "DefaultQOS"),
                Field::new("QOS", "QOS"),
                Field::new("MAX_JOBS", "MaxJobs"),
                Field::new("MAX_SUBMIT_JOBS", "MaxSubmitJobs"),
                Field::new("MAX_JOBS_ACCRUE", "MaxJobsAccrue"),
                Field::new("MAX_WALL", "MaxWall"),
                Field::new("MAX_TRES", "MaxTRES"),
                Field::new("MAX_TRES_PER_NODE", "MaxTRESPerNode"),
                Field::new("MAX_TRES_MINS", "MaxTRESMins"),
                Field::new("GRP_JOBS", "GrpJobs"),
                Field::new("GRP_SUBMIT_JOBS", "GrpSubmitJobs"),
                Field::new("GRP_JOBS_ACCRUE", "GrpJobsAccrue"),
                Field::new("GRP_WALL", "GrpWall"),
                Field::new("GRP_TRES", "GrpTRES"),
                Field::new("GRP_TRES_MINS", "GrpTRESMins"),
                Field::new("GRP_TRES_RUN_MINS", "GrpTRESRunMins"),
            ],
        )
    }

    /// `sacctmgr show qos` output
    pub fn qos() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("ID", "ID"),
                Field::new("NAME", "Name"),
                Field::new("DESCR", "Descr"),
                Field::new("PRIORITY", "Priority"),
                Field::new("GRACE_TIME", "GraceTime"),
                Field::new("PREEMPT", "Preempt"),
                Field::new("PREEMPT_MODE", "PreemptMode"),
                Field::new("USAGE_FACTOR", "UsageFactor"),
                Field::new("MAX_JOBS_PA", "MaxJobsPA"),
                Field::new("MAX_JOBS_PU", "MaxJobsPU"),
                Field::new("MAX_SUBMIT_PA", "MaxSubmitPA"),
                Field::new("MAX_SUBMIT_PU", "MaxSubmitPU"),
                Field::new("MAX_WALL", "MaxWall"),
                Field::new("MAX_TRES", "MaxTRES"),
                Field::new("MAX_TRES_PER_NODE", "MaxTRESPerNode"),
                Field::new("MAX_TRES_PU", "MaxTRESPU"),
                Field::new("GRP_JOBS", "GrpJobs"),
                Field::new("GRP_SUBMIT_JOBS", "GrpSubmitJobs"),
                Field::new("GRP_WALL", "GrpWall"),
                Field::new("GRP_TRES", "GrpTRES"),
            ],
        )
    }

    /// `sacctmgr show account` output
    pub fn accounts() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("ACCOUNT", "Account"),
                Field::new("DESCR", "Descr"),
                Field::new("ORG", "Org"),
            ],
        )
    }

    /// `sacctmgr show user` output
    pub fn users() -> Self {
        Self::new(
            Delimiter::Char(b'|'),
            vec![
                Field::new("USER", "User"),
                Field::new("ADMIN", "AdminLevel"),
            ],
        )
    }

    /// Number of fields expected on every line
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in positional order, used as headers when deserializing rows
    pub fn headers(&self) -> StringRecord {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Converts the grammar into a format argument, joining the field tokens by `separator`
    pub fn format(&self, separator: &str) -> String {
        format_string(self.fields.iter().map(|f| f.format), separator)
    }

    /// Format argument for `sinfo -o`/`squeue -o`, using the grammar's own delimiter
    pub fn printf_format(&self) -> String {
        match self.delimiter {
            Delimiter::Whitespace => self.format(" "),
            Delimiter::Char(c) => self.format(&(c as char).to_string()),
        }
    }
}

/// Converts an iterator of format tokens into a single format argument
pub fn format_string<'a, I>(iter: I, separator: &str) -> String
where
    I: Iterator<Item = &'a str>,
{
    iter.collect::<Vec<_>>().join(separator)
}
