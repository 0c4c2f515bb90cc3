//! Bibliography key scan

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Entry-opening line: `@type{key,`
static ENTRY_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*@(\w+)[ \t]*\{[ \t]*([^,\s{}]+)[ \t]*,").expect("bibtex entry pattern")
});

/// Entry types that define no citable key
const NON_ENTRIES: &[&str] = &["string", "preamble", "comment"];

/// Keys defined more than once, in order of first appearance
pub fn duplicate_keys(text: &str) -> Vec<String> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut seen: Vec<(&str, usize)> = Vec::new();

    for caps in ENTRY_KEY.captures_iter(text) {
        let (Some(kind), Some(key)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if NON_ENTRIES.contains(&kind.as_str().to_lowercase().as_str()) {
            continue;
        }
        let key = key.as_str();
        match position.get(key) {
            Some(&at) => seen[at].1 += 1,
            None => {
                position.insert(key, seen.len());
                seen.push((key, 1));
            }
        }
    }

    seen.into_iter().filter(|(_, n)| *n > 1).map(|(key, _)| key.to_string()).collect()
}

/// Scan a bibliography file; a missing file has no duplicates.
/// Bytes that are not UTF-8 are replaced before scanning.
pub fn duplicate_keys_in(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(duplicate_keys(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_in_first_appearance_order() {
        let bib = "@article{smith2020,\n title={A}}\n\
                   @book{ jones2019 ,\n title={B}}\n\
                   @misc{jones2019,\n}\n\
                   @article{smith2020,\n}\n\
                   @article{unique,\n}\n";
        assert_eq!(duplicate_keys(bib), vec!["smith2020", "jones2019"]);
    }

    #[test]
    fn test_no_duplicates() {
        assert!(duplicate_keys("@article{a,\n}\n@book{b,\n}").is_empty());
        assert!(duplicate_keys("").is_empty());
    }

    #[test]
    fn test_string_macro_does_not_hide_entries() {
        let bib = "@string{jan = \"January\"}\n\
                   @article{k1,\n month = jan,\n}\n\
                   @article{k1,\n}\n";
        assert_eq!(duplicate_keys(bib), vec!["k1"]);
    }

    #[test]
    fn test_macros_and_mentions_are_not_keys() {
        let bib = "@STRING{acm = \"ACM\",}\n\
                   @String{acm = \"ACM Press\",}\n\
                   @comment{k1, note}\n\
                   @article{k1,\n note = {see @book{k1, elsewhere}},\n}\n";
        assert!(duplicate_keys(bib).is_empty());
    }

    #[test]
    fn test_non_utf8_file_is_scanned() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("references.bib");
        fs::write(&path, b"@article{k1,\n title={Caf\xe9}}\n@book{k1,\n}\n").unwrap();
        assert_eq!(duplicate_keys_in(&path).unwrap(), vec!["k1"]);
    }

    #[test]
    fn test_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(duplicate_keys_in(&temp.path().join("references.bib")).unwrap().is_empty());
    }
}
