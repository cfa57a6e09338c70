//! Query-string arguments shared by the route commands.
//!
//! Only the characters that would change how a query splits are escaped:
//! `%`, `&`, `=`, `#`, `+` and space. Everything else (`,`, `.`, `:`) is
//! printed as is so queries stay readable. `%XX` escapes are decoded on input;
//! a `%` that does not start an escape is taken literally.

use anyhow::{Result, bail};
use ciboard_core::codec::QueryRecord;
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Current query as `key=value` pairs; `a=1&b=2` and a leading `?` are accepted.
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    pub pairs: Vec<String>,
}

impl QueryArgs {
    pub fn record(&self) -> Result<QueryRecord> {
        parse_pairs(&self.pairs)
    }
}

/// Parse pairs into a record. Later pairs override earlier ones.
///
/// A pair without `=` has an empty value.
pub fn parse_pairs(pairs: &[String]) -> Result<QueryRecord> {
    let mut record = QueryRecord::new();
    for arg in pairs {
        for pair in arg.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                bail!("query pair '{pair}' has an empty key");
            }
            record.insert(unescape(key), unescape(value));
        }
    }
    Ok(record)
}

/// `k=v&k=v` in key order; empty for an empty record.
///
/// Parsing the result with [`parse_pairs`] gives back `record`.
pub fn to_query_string(record: &QueryRecord) -> String {
    record
        .iter()
        .map(|(key, value)| format!("{}={}", escape(key), escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' | '&' | '=' | '#' | '+' | ' ' => {
                out.push_str(&format!("%{:02X}", u32::from(c)));
            }
            _ => out.push(c),
        }
    }
    out
}

fn unescape(raw: &str) -> String {
    if !raw.contains('%') {
        return raw.to_string();
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = if bytes[i] == b'%' {
            bytes
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        } else {
            None
        };
        if let Some(byte) = escaped {
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parses_separate_and_joined_pairs() {
        let record = parse_pairs(&strings(&["?archs=arm64&page=2", "configs=a,b"])).expect("parse");
        assert_eq!(record.len(), 3);
        assert_eq!(record["archs"], "arm64");
        assert_eq!(record["page"], "2");
        assert_eq!(record["configs"], "a,b");
    }

    #[test]
    fn later_pairs_override_and_bare_keys_are_empty() {
        let record = parse_pairs(&strings(&["page=2", "page=3", "treeSearch"])).expect("parse");
        assert_eq!(record["page"], "3");
        assert_eq!(record["treeSearch"], "");
    }

    #[test]
    fn value_may_contain_equals() {
        let record = parse_pairs(&strings(&["testPath=a=b"])).expect("parse");
        assert_eq!(record["testPath"], "a=b");
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(parse_pairs(&strings(&["=5"])).is_err());
    }

    #[test]
    fn reserved_characters_survive_printing() {
        let mut record = QueryRecord::new();
        record.insert("testPath".into(), "a&b=c #1+2 100%".into());
        record.insert("configs".into(), "defconfig,tinyconfig".into());
        record.insert("currentPageTab".into(), "global.tests".into());
        let printed = to_query_string(&record);
        assert_eq!(
            printed,
            "configs=defconfig,tinyconfig&currentPageTab=global.tests\
             &testPath=a%26b%3Dc%20%231%2B2%20100%25"
        );
        assert_eq!(parse_pairs(&[printed]).expect("parse"), record);
    }

    #[test]
    fn stray_percent_is_literal() {
        let record =
            parse_pairs(&strings(&["treeSearch=50%", "testPath=%zz%+5%2"])).expect("parse");
        assert_eq!(record["treeSearch"], "50%");
        assert_eq!(record["testPath"], "%zz%+5%2");
        let record = parse_pairs(&strings(&["treeSearch=next%2Dlinux"])).expect("parse");
        assert_eq!(record["treeSearch"], "next-linux");
    }

    #[test]
    fn query_string_is_key_ordered() {
        let record = parse_pairs(&strings(&["z=1", "a=2"])).expect("parse");
        assert_eq!(to_query_string(&record), "a=2&z=1");
        assert_eq!(to_query_string(&QueryRecord::new()), "");
    }
}
