//! `module.prop` descriptor parsing.
//!
//! The descriptor is a flat `key=value` file. Blank lines and `#` comments
//! are skipped, only the first `=` splits a line, and both sides are
//! trimmed. Duplicate keys keep the last value but stay at the position of
//! their first appearance.
//!
//! # Example
//!
//! ```rust
//! use module_packager::metadata::{parse_descriptor, KeyPolicy};
//!
//! let meta = parse_descriptor("id=mymod\nversion=2.3\n", &KeyPolicy::none()).unwrap();
//! assert_eq!(meta.get("id"), Some("mymod"));
//! ```

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{PackError, Result};

/// Keys a module descriptor is expected to carry.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "id",
    "name",
    "version",
    "versionCode",
    "author",
    "description",
];

/// Keys the publish utility cannot work without.
pub const PUBLISH_KEYS: &[&str] = &["id", "name", "version", "author", "description"];

/// What to do with expected keys that the descriptor does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Fill each missing key with an empty string and log a warning.
    Lenient(Vec<String>),
    /// Fail with [`PackError::MissingKeys`] naming every missing key.
    Strict(Vec<String>),
}

impl KeyPolicy {
    pub fn lenient(keys: &[&str]) -> Self {
        Self::Lenient(keys.iter().map(|k| k.to_string()).collect())
    }

    pub fn strict(keys: &[&str]) -> Self {
        Self::Strict(keys.iter().map(|k| k.to_string()).collect())
    }

    /// Accept whatever the file contains.
    pub fn none() -> Self {
        Self::Lenient(Vec::new())
    }

    fn keys(&self) -> &[String] {
        match self {
            Self::Lenient(keys) | Self::Strict(keys) => keys,
        }
    }
}

/// Parsed descriptor contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMetadata {
    entries: Vec<(String, String)>,
}

impl ModuleMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, or `""` when the descriptor never set it.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn id(&self) -> &str {
        self.value("id")
    }

    pub fn name(&self) -> &str {
        self.value("name")
    }

    pub fn version(&self) -> &str {
        self.value("version")
    }

    pub fn version_code(&self) -> &str {
        self.value("versionCode")
    }

    pub fn author(&self) -> &str {
        self.value("author")
    }

    pub fn description(&self) -> &str {
        self.value("description")
    }

    /// Entries in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }
}

/// Parse descriptor text and apply `policy` to the expected keys.
pub fn parse_descriptor(content: &str, policy: &KeyPolicy) -> Result<ModuleMetadata> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut meta = ModuleMetadata::default();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        meta.insert(key, value.trim());
    }

    let missing: Vec<String> = policy
        .keys()
        .iter()
        .filter(|key| meta.get(key.as_str()).is_none())
        .cloned()
        .collect();

    match policy {
        KeyPolicy::Strict(_) if !missing.is_empty() => {
            return Err(PackError::MissingKeys { keys: missing });
        }
        KeyPolicy::Strict(_) => {}
        KeyPolicy::Lenient(_) => {
            for key in &missing {
                warn!("module.prop is missing '{}'; using an empty value", key);
                meta.insert(key, "");
            }
        }
    }

    Ok(meta)
}

/// Read and parse the descriptor at `path`.
pub fn read_descriptor(path: &Path, policy: &KeyPolicy) -> Result<ModuleMetadata> {
    let content = fs::read_to_string(path).map_err(|source| PackError::DescriptorRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_descriptor(&content, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lenient() -> KeyPolicy {
        KeyPolicy::lenient(RECOGNIZED_KEYS)
    }

    #[test]
    fn test_duplicate_keys_keep_last_value() {
        let meta = parse_descriptor("id=a\nid=b", &KeyPolicy::none()).unwrap();
        assert_eq!(meta.get("id"), Some("b"));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let meta = parse_descriptor("# comment\n\nid=x", &KeyPolicy::none()).unwrap();
        assert_eq!(meta.iter().collect::<Vec<_>>(), vec![("id", "x")]);
    }

    #[test]
    fn test_line_without_separator_is_ignored() {
        let meta = parse_descriptor("garbage line\nid=x\n=orphan", &KeyPolicy::none()).unwrap();
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.id(), "x");
    }

    #[test]
    fn test_only_first_equals_splits() {
        let meta = parse_descriptor("description = a=b = c ", &KeyPolicy::none()).unwrap();
        assert_eq!(meta.description(), "a=b = c");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let meta = parse_descriptor("versionCode=5\nversioncode=6", &KeyPolicy::none()).unwrap();
        assert_eq!(meta.version_code(), "5");
        assert_eq!(meta.get("versioncode"), Some("6"));
    }

    #[test]
    fn test_lenient_fills_missing_keys() {
        let meta = parse_descriptor("id=mymod\nversion=1.0\n", &lenient()).unwrap();
        assert_eq!(meta.id(), "mymod");
        assert_eq!(meta.get("name"), Some(""));
        assert_eq!(meta.get("versionCode"), Some(""));
        assert_eq!(meta.len(), RECOGNIZED_KEYS.len());

        // Parsed keys come first, filled keys follow in recognized order.
        let keys: Vec<&str> = meta.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["id", "version", "name", "versionCode", "author", "description"]
        );
    }

    #[test]
    fn test_strict_reports_every_missing_key() {
        let err = parse_descriptor("id=mymod\n", &KeyPolicy::strict(PUBLISH_KEYS)).unwrap_err();
        match err {
            PackError::MissingKeys { keys } => {
                assert_eq!(keys, vec!["name", "version", "author", "description"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_accepts_empty_values() {
        let content = "id=m\nname=\nversion=1\nauthor=a\ndescription=\n";
        let meta = parse_descriptor(content, &KeyPolicy::strict(PUBLISH_KEYS)).unwrap();
        assert_eq!(meta.name(), "");
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let content = "id=mymod\r\nname=My Mod\r\n# note\r\nversion=v1.2\r\nid=other\r\n";
        let first = parse_descriptor(content, &lenient()).unwrap();
        let second = parse_descriptor(content, &lenient()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id(), "other");
        assert_eq!(first.name(), "My Mod");
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let meta = parse_descriptor("\u{feff}id=bom", &KeyPolicy::none()).unwrap();
        assert_eq!(meta.get("id"), Some("bom"));
    }

    #[test]
    fn test_read_descriptor_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("module.prop");
        fs::write(&path, "id=mymod\nname=My Mod\n").unwrap();

        let meta = read_descriptor(&path, &lenient()).unwrap();
        assert_eq!(meta.name(), "My Mod");
    }

    #[test]
    fn test_read_descriptor_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read_descriptor(&temp.path().join("module.prop"), &lenient()).unwrap_err();
        assert!(matches!(err, PackError::DescriptorRead { .. }));
    }
}
