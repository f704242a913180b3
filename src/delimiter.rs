//! Per-table field delimiter resolution
//!
//! Some source datasets ship individual tables with a non-standard
//! delimiter. The table name (filename stem) is matched against a fixed set
//! of keyword substrings; when nothing matches, the caller-supplied default
//! flows through unchanged.

/// Keyword substrings mapped to their override delimiters.
const OVERRIDES: &[(&str, u8)] = &[
    ("tab_separated", b'\t'),
    ("pipe_separated", b'|'),
    ("caret_separated", b'^'),
    ("comma_separated", b','),
];

/// Resolve the field delimiter for a table name or filename stem.
///
/// First matching keyword wins. Total function: always returns a usable
/// delimiter.
pub fn resolve(table_or_stem: &str, default: u8) -> u8 {
    for (keyword, delimiter) in OVERRIDES {
        if table_or_stem.contains(keyword) {
            return *delimiter;
        }
    }
    default
}

/// Parse a CLI delimiter argument: a single ASCII character, or `tab` /
/// `\t` for tab-separated data.
pub fn parse_arg(arg: &str) -> anyhow::Result<u8> {
    match arg {
        "tab" | "\\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => anyhow::bail!("invalid delimiter '{other}': expected a single ASCII character or 'tab'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_overrides() {
        assert_eq!(resolve("tab_separated_table", b','), b'\t');
        assert_eq!(resolve("pipe_separated_table", b','), b'|');
        assert_eq!(resolve("caret_separated_table", b','), b'^');
        assert_eq!(resolve("comma_separated_table", b'\t'), b',');
    }

    #[test]
    fn test_resolve_substring_match() {
        assert_eq!(resolve("my_pipe_separated_extract", b','), b'|');
    }

    #[test]
    fn test_resolve_default_flows_through() {
        assert_eq!(resolve("condition_occurrence", b','), b',');
        assert_eq!(resolve("concept", b'\t'), b'\t');
        assert_eq!(resolve("", b';'), b';');
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg(",").unwrap(), b',');
        assert_eq!(parse_arg("|").unwrap(), b'|');
        assert_eq!(parse_arg("tab").unwrap(), b'\t');
        assert_eq!(parse_arg("\\t").unwrap(), b'\t');
        assert!(parse_arg("ab").is_err());
        assert!(parse_arg("").is_err());
    }
}
