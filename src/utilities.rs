//! Byte and string helpers shared by the scheduler parsers

/// Splits `haystack` at the first occurrence of `needle`, returning None if no needle was found
pub fn split_first(haystack: &[u8], needle: u8) -> Option<(&[u8], &[u8])> {
    let index = haystack.iter().position(|&c| c == needle)?;
    let (key, value) = haystack.split_at(index);

    Some((key, &value[1..]))
}

/// Splits a line into non-empty runs of non-whitespace bytes
pub fn split_tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|c| c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
}

/// Expands a Slurm hostlist such as `cn[01-03,7],gpu1` into individual host names.
///
/// Zero-padding of ranges is preserved. Malformed ranges are passed through verbatim
/// rather than dropped, since the list is only used for display purposes.
pub fn expand_hostlist(hostlist: &str) -> Vec<String> {
    let mut hosts = Vec::new();
    for entry in split_outside_brackets(hostlist) {
        let entry = entry.trim();
        if entry.is_empty() || entry == "(null)" {
            continue;
        }

        match (entry.find('['), entry.rfind(']')) {
            (Some(open), Some(close)) if open < close => {
                let prefix = &entry[..open];
                let suffix = &entry[close + 1..];

                for range in entry[open + 1..close].split(',') {
                    match expand_range(range) {
                        Some(values) => hosts.extend(
                            values
                                .into_iter()
                                .map(|v| format!("{}{}{}", prefix, v, suffix)),
                        ),
                        None => hosts.push(format!("{}{}{}", prefix, range, suffix)),
                    }
                }
            }
            _ => hosts.push(entry.to_string()),
        }
    }

    hosts
}

/// Splits on commas that are not enclosed in brackets
fn split_outside_brackets(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, c) in value.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    parts.push(&value[start..]);
    parts
}

/// Expands `01-03` into `["01", "02", "03"]`; single values are returned as is
fn expand_range(range: &str) -> Option<Vec<String>> {
    let Some((first, last)) = range.split_once('-') else {
        return Some(vec![range.to_string()]);
    };

    let width = first.len();
    let first = first.parse::<usize>().ok()?;
    let last = last.parse::<usize>().ok()?;
    if first > last {
        return None;
    }

    Some(
        (first..=last)
            .map(|v| format!("{:0width$}", v, width = width))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_first() {
        assert_eq!(split_first(b"", b'='), None);
        assert_eq!(split_first(b"non-empty", b'='), None);
        assert_eq!(split_first(b"=", b'='), Some((&b""[..], &b""[..])));
        assert_eq!(split_first(b"Key=", b'='), Some((&b"Key"[..], &b""[..])));
        assert_eq!(
            split_first(b"JobDefaults=(null)", b'='),
            Some((&b"JobDefaults"[..], &b"(null)"[..]))
        );
        assert_eq!(
            split_first(b"TRES=cpu=36,mem=128000M", b'='),
            Some((&b"TRES"[..], &b"cpu=36,mem=128000M"[..]))
        );
    }

    #[test]
    fn test_split_tokens() {
        let tokens = split_tokens(b"   AllocNodes=ALL  Default=NO\tQoS=N/A ").collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![&b"AllocNodes=ALL"[..], &b"Default=NO"[..], &b"QoS=N/A"[..]]
        );
        assert_eq!(split_tokens(b"  \t ").count(), 0);
    }

    #[test]
    fn test_expand_hostlist() {
        assert_eq!(expand_hostlist(""), Vec::<String>::new());
        assert_eq!(expand_hostlist("(null)"), Vec::<String>::new());
        assert_eq!(expand_hostlist("node44"), vec!["node44"]);
        assert_eq!(
            expand_hostlist("cn[08-10,15],gpu1"),
            vec!["cn08", "cn09", "cn10", "cn15", "gpu1"]
        );
        assert_eq!(expand_hostlist("a[1-2]-ib"), vec!["a1-ib", "a2-ib"]);
    }

    #[test]
    fn test_expand_hostlist_malformed_range() {
        assert_eq!(expand_hostlist("cn[5-2]"), vec!["cn5-2"]);
        assert_eq!(expand_hostlist("cn[x-y]"), vec!["cnx-y"]);
    }
}
