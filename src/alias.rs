//! Channel alias table.
//!
//! The alias file is a flat list of `key = value` lines. Two reserved keys
//! pick the codepages used inside the archive; every other key maps an
//! archive channel name (the `.pdt` member name without its suffix) to the
//! name shown to the user. The position of an entry in the file is the
//! channel's stable index.
//!
//! ```text
//! cp_zip_fn = CP866
//! cp_content = CP1251
//! NTV = NTV Moscow
//! 1kanal = Channel One
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{JtvError, Result};

/// Default alias file looked up next to the archive when none is given.
pub const DEFAULT_ALIAS_FILE: &str = "channel.alias.rc";

/// Codepage of member filenames when the table does not set one.
pub const DEFAULT_FILENAME_CODEPAGE: &str = "CP866";

/// Codepage of program titles when the table does not set one.
pub const DEFAULT_CONTENT_CODEPAGE: &str = "CP1251";

const KEY_FILENAME_CODEPAGE: &str = "cp_zip_fn";
const KEY_CONTENT_CODEPAGE: &str = "cp_content";

/// One archive key to display name mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub archive_key: String,
    pub display_name: String,
}

/// Outcome of [`AliasTable::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub display_name: &'a str,
    /// Position in the table, `None` when the key has no alias.
    pub index: Option<usize>,
}

/// Ordered alias entries plus the archive codepages.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    filename_codepage: String,
    content_codepage: String,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            filename_codepage: DEFAULT_FILENAME_CODEPAGE.to_string(),
            content_codepage: DEFAULT_CONTENT_CODEPAGE.to_string(),
        }
    }
}

impl AliasTable {
    /// Load an alias table from a file.
    ///
    /// Only a file that cannot be opened or read is an error; malformed
    /// lines are skipped and an empty file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read(path).map_err(|source| JtvError::AliasLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&String::from_utf8_lossy(&text));
        debug!(
            path = %path.display(),
            entries = table.len(),
            "loaded channel aliases"
        );
        Ok(table)
    }

    /// Parse alias table text.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        for line in text.lines() {
            table.apply_line(line);
        }
        table
    }

    fn apply_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return;
        }

        let Some((key, value)) = line.split_once('=') else {
            debug!(line, "skipping alias line without '='");
            return;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() || key.contains(char::is_whitespace) {
            debug!(line, "skipping malformed alias line");
            return;
        }

        match key {
            KEY_FILENAME_CODEPAGE => self.filename_codepage = value.to_string(),
            KEY_CONTENT_CODEPAGE => self.content_codepage = value.to_string(),
            _ => self.entries.push(AliasEntry {
                archive_key: key.to_string(),
                display_name: value.to_string(),
            }),
        }
    }

    /// Override the codepages, e.g. from command-line flags.
    pub fn with_codepages(
        mut self,
        filename_codepage: Option<&str>,
        content_codepage: Option<&str>,
    ) -> Self {
        if let Some(cp) = filename_codepage {
            self.filename_codepage = cp.to_string();
        }
        if let Some(cp) = content_codepage {
            self.content_codepage = cp.to_string();
        }
        self
    }

    /// Resolve an archive key, ignoring case.
    ///
    /// Unknown keys resolve to themselves with no index so that channels
    /// missing from the table are still scheduled.
    pub fn lookup<'a>(&'a self, archive_key: &'a str) -> Resolved<'a> {
        let wanted = archive_key.to_lowercase();
        self.entries
            .iter()
            .position(|e| e.archive_key.to_lowercase() == wanted)
            .map(|index| Resolved {
                display_name: &self.entries[index].display_name,
                index: Some(index),
            })
            .unwrap_or(Resolved {
                display_name: archive_key,
                index: None,
            })
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filename_codepage(&self) -> &str {
        &self.filename_codepage
    }

    pub fn content_codepage(&self) -> &str {
        &self.content_codepage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
cp_zip_fn = CP866
cp_content=KOI8-R
NTV = NTV Moscow
# a comment
1kanal   =   Channel One

this line is junk
= no key
key with spaces = nope
Sport =
";

    #[test]
    fn parses_entries_and_codepages() {
        let table = AliasTable::parse(SAMPLE);
        assert_eq!(table.filename_codepage(), "CP866");
        assert_eq!(table.content_codepage(), "KOI8-R");
        assert_eq!(
            table.entries(),
            &[
                AliasEntry {
                    archive_key: "NTV".into(),
                    display_name: "NTV Moscow".into()
                },
                AliasEntry {
                    archive_key: "1kanal".into(),
                    display_name: "Channel One".into()
                },
            ]
        );
    }

    #[test]
    fn defaults_without_reserved_keys() {
        let table = AliasTable::parse("A = B\n");
        assert_eq!(table.filename_codepage(), DEFAULT_FILENAME_CODEPAGE);
        assert_eq!(table.content_codepage(), DEFAULT_CONTENT_CODEPAGE);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_source_is_valid() {
        let table = AliasTable::parse("");
        assert!(table.is_empty());
        let table = AliasTable::parse("\n  \n# only comments\n");
        assert!(table.is_empty());
    }

    #[test]
    fn lookup_ignores_case() {
        let table = AliasTable::parse(SAMPLE);
        let upper = table.lookup("NTV");
        let lower = table.lookup("ntv");
        assert_eq!(upper, lower);
        assert_eq!(upper.display_name, "NTV Moscow");
        assert_eq!(upper.index, Some(0));
        assert_eq!(table.lookup("1KANAL").index, Some(1));
    }

    #[test]
    fn lookup_ignores_case_outside_ascii() {
        let table = AliasTable::parse("Россия = Russia 1\n");
        assert_eq!(table.lookup("РОССИЯ").index, Some(0));
    }

    #[test]
    fn unknown_key_resolves_to_itself() {
        let table = AliasTable::parse(SAMPLE);
        let resolved = table.lookup("Discovery");
        assert_eq!(resolved.display_name, "Discovery");
        assert_eq!(resolved.index, None);
    }

    #[test]
    fn codepage_overrides() {
        let table = AliasTable::parse(SAMPLE).with_codepages(None, Some("UTF-8"));
        assert_eq!(table.filename_codepage(), "CP866");
        assert_eq!(table.content_codepage(), "UTF-8");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.rc");
        let err = AliasTable::load(&path).unwrap_err();
        assert!(matches!(err, JtvError::AliasLoad { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ALIAS_FILE);
        std::fs::write(&path, SAMPLE).unwrap();
        let table = AliasTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
    }
}
