use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{lines_value, string_lines};

/// `ls -l` column grammar: permissions, link count, owner, group, size,
/// ISO date-time, name. Android's toybox prints dates as
/// `YYYY-MM-DD HH:MM`.
static LISTING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*)\s+(\d+)\s+(\w+)\s+(\w+)\s+(\d+)\s+(\d{4}-\d{2}-\d{2} \d{2}:\d{2})\s+(.+)")
        .unwrap()
});

/// Directory listings: keep just the file names, dropping permissions,
/// ownership, size and date columns. Lines outside the grammar vanish
/// silently.
pub(super) fn reduce(value: &Value) -> Option<Value> {
    let lines = string_lines(value)?;
    let mut names: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() || line.to_lowercase().starts_with("total") {
            continue;
        }
        if let Some(caps) = LISTING_RE.captures(line) {
            names.push(caps[7].to_string());
        }
    }
    Some(lines_value(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_extracted() {
        let lines = json!([
            "total 64",
            "-rw-r--r-- 1 root root 12345 2023-01-15 10:30 Roboto-Regular.ttf",
            "-rw-r--r-- 1 root root  9876 2023-01-15 10:30 NotoSansCJK.ttc",
            "drwxr-xr-x 2 root root  4096 2023-01-15 10:30 hyphen-data",
        ]);
        assert_eq!(
            reduce(&lines),
            Some(json!([
                "Roboto-Regular.ttf",
                "NotoSansCJK.ttc",
                "hyphen-data"
            ]))
        );
    }

    #[test]
    fn test_blank_and_total_lines_skipped() {
        let lines = json!(["", "Total 12", "total 0"]);
        assert_eq!(reduce(&lines), Some(json!([])));
    }

    #[test]
    fn test_names_with_spaces_kept_whole() {
        let lines = json!([
            "-rw-r--r-- 1 media audio 204800 2022-11-02 08:01 Over the Horizon.ogg",
        ]);
        assert_eq!(reduce(&lines), Some(json!(["Over the Horizon.ogg"])));
    }

    #[test]
    fn test_off_grammar_lines_dropped() {
        let lines = json!([
            "-rw-r--r-- 1 root root 12345 Jan 15 10:30 old-date-format.ttf",
            "some free text",
        ]);
        assert_eq!(reduce(&lines), Some(json!([])));
    }

    #[test]
    fn test_duplicates_survive() {
        let lines = json!([
            "-rw-r--r-- 1 root root 1 2023-01-15 10:30 a.ttf",
            "-rw-r--r-- 1 root root 1 2023-01-15 10:30 a.ttf",
        ]);
        assert_eq!(reduce(&lines), Some(json!(["a.ttf", "a.ttf"])));
    }
}
