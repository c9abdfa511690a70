/*!
store.rs - file-backed registry of Linked API accounts.

Layout on disk (`config.json`):
  { "accounts": [ { "name", "linkedApiToken", "identificationToken" }, ... ],
    "currentAccount": "<identificationToken>" }

Legacy single-account files (`{ "linkedApiToken", "identificationToken" }`) are
upgraded on the first successful read and written back immediately, so later
reads always see the multi-account shape.

Every read failure (missing file, bad JSON, unknown shape) is reported as "no
store". Every mutation rewrites the whole file with owner-only permissions.
There is no cross-process locking: the last writer wins.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Name given to the account synthesized from a legacy file.
pub const LEGACY_ACCOUNT_NAME: &str = "default";

/* ---- Data Structures ---- */

/// One named token pair. `identity_token` is the key; `name` is only a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    #[serde(rename = "linkedApiToken", alias = "serviceToken")]
    pub service_token: String,
    #[serde(rename = "identificationToken", alias = "identityToken")]
    pub identity_token: String,
}

/// The token pair a session authenticates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub service_token: String,
    pub identity_token: String,
}

impl From<&AccountEntry> for Tokens {
    fn from(entry: &AccountEntry) -> Self {
        Self {
            service_token: entry.service_token.clone(),
            identity_token: entry.identity_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStore {
    pub accounts: Vec<AccountEntry>,
    /// identity token of the active entry, empty when none
    #[serde(rename = "currentAccount", default)]
    pub current_account: String,
}

impl AccountStore {
    fn position(&self, identity_token: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|a| a.identity_token == identity_token)
    }

    /// The entry `current_account` points at, falling back to the first entry
    /// when the pointer is empty or dangling.
    pub fn current_or_first(&self) -> Option<&AccountEntry> {
        self.position(&self.current_account)
            .and_then(|i| self.accounts.get(i))
            .or_else(|| self.accounts.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyCredentials {
    #[serde(rename = "linkedApiToken", alias = "serviceToken")]
    pub service_token: String,
    #[serde(rename = "identificationToken", alias = "identityToken")]
    pub identity_token: String,
}

impl LegacyCredentials {
    fn into_store(self) -> AccountStore {
        let current_account = self.identity_token.clone();
        AccountStore {
            accounts: vec![AccountEntry {
                name: LEGACY_ACCOUNT_NAME.to_string(),
                service_token: self.service_token,
                identity_token: self.identity_token,
            }],
            current_account,
        }
    }
}

/// Shapes the config file may take. The multi-account shape is tried first;
/// it requires `accounts`, so a legacy file falls through to the second arm.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredConfig {
    Multi(AccountStore),
    Legacy(LegacyCredentials),
}

/* ---- Store ---- */

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store. `None` when the file is missing, unreadable, of an
    /// unknown shape, or holds no accounts. A legacy file is migrated and
    /// persisted before returning.
    pub fn load(&self) -> Option<AccountStore> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("no credential file at {}: {e}", self.path.display());
                return None;
            }
        };

        let parsed: StoredConfig = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("ignoring unreadable credential file: {e}");
                return None;
            }
        };

        let store = match parsed {
            StoredConfig::Multi(store) => store,
            StoredConfig::Legacy(legacy) => {
                tracing::debug!("migrating legacy credential file to multi-account layout");
                let store = legacy.into_store();
                if let Err(e) = self.save(&store) {
                    tracing::warn!("failed to persist migrated credentials: {e:#}");
                }
                store
            }
        };

        if store.accounts.is_empty() {
            return None;
        }
        Some(store)
    }

    /// Overwrite the file with `store`, creating the directory when needed.
    pub fn save(&self, store: &AccountStore) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let body = serde_json::to_string_pretty(store).context("Failed to serialize config")?;
        write_private(&self.path, body.as_bytes())
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;
        tracing::debug!(
            "wrote {} account(s) to {}",
            store.accounts.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Tokens of the current account, or of the first account when the
    /// current pointer does not match any entry.
    pub fn resolve_current(&self) -> Option<Tokens> {
        self.load()?.current_or_first().map(Tokens::from)
    }

    /// Insert `entry`, or replace the entry with the same identity token in
    /// place. Either way it becomes current.
    pub fn add_or_replace(&self, entry: AccountEntry) -> Result<()> {
        let mut store = self.load().unwrap_or_default();
        store.current_account = entry.identity_token.clone();
        match store.position(&entry.identity_token) {
            Some(i) => store.accounts[i] = entry,
            None => store.accounts.push(entry),
        }
        self.save(&store)
    }

    /// Remove the current account. The first remaining entry becomes current.
    /// Returns `None` without touching the file when nothing is current.
    pub fn remove_current(&self) -> Result<Option<AccountEntry>> {
        let Some(mut store) = self.load() else {
            return Ok(None);
        };
        let Some(index) = store.position(&store.current_account) else {
            return Ok(None);
        };

        let removed = store.accounts.remove(index);
        store.current_account = store
            .accounts
            .first()
            .map(|a| a.identity_token.clone())
            .unwrap_or_default();
        self.save(&store)?;
        Ok(Some(removed))
    }

    /// Drop every account; returns how many were stored.
    pub fn remove_all(&self) -> Result<usize> {
        let Some(store) = self.load() else {
            return Ok(0);
        };
        let count = store.accounts.len();
        self.save(&AccountStore::default())?;
        Ok(count)
    }

    /// Accounts in store order, each paired with whether it is current.
    pub fn list(&self) -> Vec<(AccountEntry, bool)> {
        let Some(store) = self.load() else {
            return Vec::new();
        };
        let current = store.current_account;
        store
            .accounts
            .into_iter()
            .map(|a| {
                let is_current = a.identity_token == current;
                (a, is_current)
            })
            .collect()
    }

    /// First account whose name contains `query`, ignoring case.
    pub fn find_by_name(&self, query: &str) -> Option<AccountEntry> {
        let needle = query.to_lowercase();
        self.load()?
            .accounts
            .into_iter()
            .find(|a| a.name.to_lowercase().contains(&needle))
    }

    pub fn set_current(&self, identity_token: &str) -> Result<bool> {
        let Some(mut store) = self.load() else {
            return Ok(false);
        };
        if store.position(identity_token).is_none() {
            return Ok(false);
        }
        store.current_account = identity_token.to_string();
        self.save(&store)?;
        Ok(true)
    }

    pub fn rename(&self, identity_token: &str, new_name: &str) -> Result<bool> {
        let Some(mut store) = self.load() else {
            return Ok(false);
        };
        let Some(index) = store.position(identity_token) else {
            return Ok(false);
        };
        store.accounts[index].name = new_name.to_string();
        self.save(&store)?;
        Ok(true)
    }
}

/* ---- File Helpers ---- */

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    // `mode` only applies on creation; tighten files that already existed.
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, id: &str, token: &str) -> AccountEntry {
        AccountEntry {
            name: name.into(),
            service_token: token.into(),
            identity_token: id.into(),
        }
    }

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("linkedin-cli").join("config.json"))
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().is_none());
        assert!(store.resolve_current().is_none());
        assert!(store.list().is_empty());
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_none());

        fs::write(store.path(), r#"{"something":"else"}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn legacy_file_is_migrated_once_and_persisted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"linkedApiToken":"account_1","identificationToken":"id_1"}"#,
        )
        .unwrap();

        let first = store.load().unwrap();
        let expected = AccountStore {
            accounts: vec![entry("default", "id_1", "account_1")],
            current_account: "id_1".into(),
        };
        assert_eq!(first, expected);

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(on_disk.get("accounts").is_some_and(|v| v.is_array()));
        assert_eq!(on_disk["currentAccount"], "id_1");

        let second = store.load().unwrap();
        assert_eq!(second, expected);
    }

    #[test]
    fn abstract_field_names_are_accepted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"accounts":[{"name":"Work","serviceToken":"t_A","identityToken":"id_A"}],"currentAccount":"id_A"}"#,
        )
        .unwrap();
        let tokens = store.resolve_current().unwrap();
        assert_eq!(tokens.service_token, "t_A");
        assert_eq!(tokens.identity_token, "id_A");
    }

    #[test]
    fn add_appends_and_sets_current() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_or_replace(entry("Work", "id_A", "t_A")).unwrap();
        store.add_or_replace(entry("Home", "id_B", "t_B")).unwrap();

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0.name, "Work");
        assert!(!listed[0].1);
        assert!(listed[1].1);
        assert_eq!(store.resolve_current().unwrap().identity_token, "id_B");
    }

    #[test]
    fn add_with_existing_identity_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_or_replace(entry("Work", "id_A", "t_A")).unwrap();
        store.add_or_replace(entry("Home", "id_B", "t_B")).unwrap();
        store.add_or_replace(entry("Work v2", "id_A", "t_A2")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.accounts.len(), 2);
        assert_eq!(loaded.accounts[0], entry("Work v2", "id_A", "t_A2"));
        assert_eq!(loaded.current_account, "id_A");
    }

    #[test]
    fn remove_current_falls_back_to_first_remaining() {
        // (removed, expected current afterwards)
        for (removed_id, next_id) in [("id_A", "id_B"), ("id_B", "id_A"), ("id_C", "id_A")] {
            let dir = TempDir::new().unwrap();
            let store = store_in(&dir);
            store.add_or_replace(entry("A", "id_A", "t_A")).unwrap();
            store.add_or_replace(entry("B", "id_B", "t_B")).unwrap();
            store.add_or_replace(entry("C", "id_C", "t_C")).unwrap();
            assert!(store.set_current(removed_id).unwrap());

            let removed = store.remove_current().unwrap().unwrap();
            assert_eq!(removed.identity_token, removed_id);
            let loaded = store.load().unwrap();
            assert_eq!(loaded.current_account, next_id, "after removing {removed_id}");
            assert_eq!(loaded.accounts.len(), 2);
            assert!(loaded.accounts.iter().all(|a| a.identity_token != removed_id));
        }
    }

    #[test]
    fn remove_last_account_clears_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_or_replace(entry("Work", "id_A", "t_A")).unwrap();

        let removed = store.remove_current().unwrap().unwrap();
        assert_eq!(removed.name, "Work");

        let on_disk: AccountStore =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(on_disk.accounts.is_empty());
        assert_eq!(on_disk.current_account, "");
        assert!(store.resolve_current().is_none());
    }

    #[test]
    fn remove_current_with_dangling_pointer_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&AccountStore {
                accounts: vec![entry("A", "id_A", "t_A")],
                current_account: "id_gone".into(),
            })
            .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store.remove_current().unwrap().is_none());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        // dangling pointer still resolves to the first entry
        assert_eq!(store.resolve_current().unwrap().identity_token, "id_A");
    }

    #[test]
    fn remove_all_reports_count() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.remove_all().unwrap(), 0);
        assert!(!store.path().exists());

        store.add_or_replace(entry("A", "id_A", "t_A")).unwrap();
        store.add_or_replace(entry("B", "id_B", "t_B")).unwrap();
        assert_eq!(store.remove_all().unwrap(), 2);
        assert!(store.load().is_none());
    }

    #[test]
    fn find_by_name_is_case_insensitive_substring_first_match() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_or_replace(entry("John Work", "id_A", "t_A")).unwrap();
        store.add_or_replace(entry("john home", "id_B", "t_B")).unwrap();

        assert_eq!(store.find_by_name("JOHN").unwrap().identity_token, "id_A");
        assert_eq!(store.find_by_name("Home").unwrap().identity_token, "id_B");
        assert!(store.find_by_name("jane").is_none());
    }

    #[test]
    fn set_current_and_rename_require_existing_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.set_current("id_A").unwrap());
        assert!(!store.rename("id_A", "x").unwrap());

        store.add_or_replace(entry("A", "id_A", "t_A")).unwrap();
        store.add_or_replace(entry("B", "id_B", "t_B")).unwrap();
        assert!(!store.set_current("id_missing").unwrap());
        assert!(store.set_current("id_A").unwrap());
        assert_eq!(store.resolve_current().unwrap().identity_token, "id_A");

        assert!(store.rename("id_B", "Renamed").unwrap());
        assert_eq!(store.find_by_name("renamed").unwrap().identity_token, "id_B");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_or_replace(entry("A", "id_A", "t_A")).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
