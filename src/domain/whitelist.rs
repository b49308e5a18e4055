//! Email to group membership, loaded from a flat file.
//!
//! The file holds one `email,group` pair per line. Blank lines and lines
//! starting with `#` are skipped, malformed lines are logged and skipped,
//! and emails compare case-insensitively. The group name is an opaque
//! tenant tag; nothing here interprets it.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::GameError;

/// Reloadable membership table.
#[derive(Debug)]
pub struct Whitelist {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, String>>,
}

impl Whitelist {
    /// Reads the whitelist at `path`.
    ///
    /// A missing file yields an empty whitelist and a warning.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Internal`] when the file exists but cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref().to_path_buf();
        let entries = read_entries(&path)?;
        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    /// Builds a whitelist from file contents held in memory.
    ///
    /// [`Whitelist::reload`] is a no-op for whitelists built this way.
    #[must_use]
    pub fn from_contents(contents: &str) -> Self {
        Self {
            path: None,
            entries: RwLock::new(parse_entries(contents)),
        }
    }

    /// Re-reads the backing file and swaps the table in one step.
    ///
    /// Returns the number of entries now loaded.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Internal`] when the file cannot be read; the
    /// previous table stays in place.
    pub fn reload(&self) -> Result<usize, GameError> {
        let Some(path) = &self.path else {
            return Ok(self.len());
        };
        let fresh = read_entries(path)?;
        let count = fresh.len();
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        tracing::info!(entries = count, "whitelist reloaded");
        Ok(count)
    }

    /// Returns the group of `email`, or `None` for non-members.
    #[must_use]
    pub fn group_for(&self, email: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&email.trim().to_lowercase())
            .cloned()
    }

    /// Returns `true` if `email` is listed.
    #[must_use]
    pub fn is_member(&self, email: &str) -> bool {
        self.group_for(email).is_some()
    }

    /// Number of listed emails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nobody is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_entries(path: &Path) -> Result<HashMap<String, String>, GameError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let entries = parse_entries(&contents);
            tracing::info!(path = %path.display(), entries = entries.len(), "whitelist loaded");
            Ok(entries)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "whitelist file not found; nobody can sign in");
            Ok(HashMap::new())
        }
        Err(e) => Err(GameError::Internal(format!(
            "failed to read whitelist {}: {e}",
            path.display()
        ))),
    }
}

fn parse_entries(contents: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    for (number, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [email, group] if !email.is_empty() && !group.is_empty() => {
                entries.insert(email.to_lowercase(), (*group).to_string());
            }
            _ => {
                tracing::warn!(line = number + 1, "skipping malformed whitelist entry");
            }
        }
    }
    entries
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# email,group
alice@example.com,family

Bob@Example.com , work
broken-line
too,many,fields
,nogroup
carol@example.com,
";

    #[test]
    fn parses_valid_lines_and_skips_the_rest() {
        let list = Whitelist::from_contents(SAMPLE);
        assert_eq!(list.len(), 2);
        assert_eq!(list.group_for("alice@example.com").as_deref(), Some("family"));
        assert_eq!(list.group_for("bob@example.com").as_deref(), Some("work"));
        assert!(!list.is_member("carol@example.com"));
    }

    #[test]
    fn lookups_ignore_case_and_whitespace() {
        let list = Whitelist::from_contents(SAMPLE);
        assert!(list.is_member("  ALICE@example.COM "));
    }

    #[test]
    fn missing_file_is_empty() {
        let path = std::env::temp_dir().join("ferdle-whitelist-does-not-exist.txt");
        let Ok(list) = Whitelist::load(&path) else {
            panic!("missing file should load as empty");
        };
        assert!(list.is_empty());
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let path = std::env::temp_dir().join(format!(
            "ferdle-whitelist-{}.txt",
            std::process::id()
        ));
        let Ok(()) = std::fs::write(&path, "a@x.io,one\n") else {
            panic!("write temp whitelist");
        };
        let Ok(list) = Whitelist::load(&path) else {
            panic!("load temp whitelist");
        };
        assert_eq!(list.group_for("a@x.io").as_deref(), Some("one"));

        let Ok(()) = std::fs::write(&path, "a@x.io,two\nb@x.io,two\n") else {
            panic!("rewrite temp whitelist");
        };
        assert!(matches!(list.reload(), Ok(2)));
        assert_eq!(list.group_for("a@x.io").as_deref(), Some("two"));
        let _ = std::fs::remove_file(&path);
    }
}
