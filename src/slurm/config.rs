use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};

use crate::utilities::split_first;

/// Global cluster configuration reported by `scontrol show config`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlurmConfig {
    values: HashMap<String, String>,
}

impl SlurmConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Name under which this cluster is registered in the accounting database
    pub fn cluster_name(&self) -> Option<&str> {
        self.get("ClusterName").filter(|name| !name.is_empty())
    }
}

/// Parses `Key = Value` lines; headers and section titles without `=` are ignored
pub fn parse_config<R>(reader: R) -> io::Result<SlurmConfig>
where
    R: Read,
{
    let mut values = HashMap::new();

    for line in BufReader::new(reader).split(b'\n') {
        let line = line?;
        if let Some((key, value)) = split_first(&line, b'=') {
            let key = key.trim_ascii();
            if !key.is_empty() {
                values.insert(
                    String::from_utf8_lossy(key).into_owned(),
                    String::from_utf8_lossy(value.trim_ascii()).into_owned(),
                );
            }
        }
    }

    Ok(SlurmConfig { values })
}
