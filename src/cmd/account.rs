/*!
`account.rs`

  linkedin account list
  linkedin account switch <name>
  linkedin account rename <name> --name <new>

`<name>` is a case-insensitive substring of the stored account name; the
first match in store order wins.
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;

use super::format::{Role, StyleOptions, color};
use super::shared::Ctx;
use crate::auth::{AccountEntry, CredentialStore};
use crate::error::{ExitCode, UsageError};

#[derive(Args, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// List all configured LinkedIn accounts
    List,

    /// Switch the active LinkedIn account
    Switch {
        /// Account name (case-insensitive substring match)
        name: String,
    },

    /// Rename a saved LinkedIn account
    Rename {
        /// Current account name (case-insensitive substring match)
        name: String,

        /// New name for the account
        #[arg(long = "name", value_name = "NEW_NAME")]
        new_name: String,
    },
}

pub fn execute_account(args: AccountArgs, ctx: &Ctx) -> Result<()> {
    let store = ctx.store();
    let mut out = std::io::stdout().lock();
    match args.command {
        AccountCommand::List => list(&store, &ctx.style(), &mut out),
        AccountCommand::Switch { name } => {
            let account = find(&store, &name)?;
            switch_to(&store, &account, &name, &mut out)
        }
        AccountCommand::Rename { name, new_name } => {
            let account = find(&store, &name)?;
            rename(&store, &account, &name, &new_name, &mut out)
        }
    }
}

fn find(store: &CredentialStore, name: &str) -> Result<AccountEntry> {
    store.find_by_name(name).ok_or_else(|| not_found(name))
}

fn not_found(name: &str) -> anyhow::Error {
    UsageError::new(
        ExitCode::General,
        format!("Account \"{name}\" not found. Run \"linkedin account list\" to see available accounts."),
    )
    .into()
}

// The entry can vanish between `find` and the write if another process edits the file.
fn switch_to(
    store: &CredentialStore,
    account: &AccountEntry,
    query: &str,
    out: &mut impl Write,
) -> Result<()> {
    if !store.set_current(&account.identity_token)? {
        return Err(not_found(query));
    }
    writeln!(out, "Switched to \"{}\".", account.name)?;
    Ok(())
}

fn rename(
    store: &CredentialStore,
    account: &AccountEntry,
    query: &str,
    new_name: &str,
    out: &mut impl Write,
) -> Result<()> {
    if !store.rename(&account.identity_token, new_name)? {
        return Err(not_found(query));
    }
    writeln!(out, "Renamed \"{}\" to \"{new_name}\".", account.name)?;
    Ok(())
}

fn list(store: &CredentialStore, style: &StyleOptions, out: &mut impl Write) -> Result<()> {
    let accounts = store.list();
    if accounts.is_empty() {
        writeln!(out, "No accounts configured. Run \"linkedin setup\" to add one.")?;
        return Ok(());
    }
    for (account, current) in accounts {
        let marker = if current { "*" } else { " " };
        let name = if current {
            color(Role::Success, &account.name, style)
        } else {
            account.name.clone()
        };
        writeln!(out, "{marker} {name} ({})", mask_token(&account.identity_token))?;
    }
    Ok(())
}

/// First six and last three characters of tokens longer than twelve.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return token.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn short_tokens_are_shown_whole() {
        assert_eq!(mask_token("id_123456789"), "id_123456789");
        assert_eq!(mask_token("id_1234567890abc"), "id_123...abc");
    }

    #[test]
    fn list_marks_current() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("config.json"));
        for (name, id) in [("Work", "id_work_0000001"), ("Personal", "id_pers")] {
            store
                .add_or_replace(AccountEntry {
                    name: name.into(),
                    service_token: "t".into(),
                    identity_token: id.into(),
                })
                .unwrap();
        }

        let mut out = Vec::new();
        list(&store, &StyleOptions::plain(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  Work (id_wor...001)\n* Personal (id_pers)\n"
        );
    }

    #[test]
    fn unknown_account_is_general_error() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("config.json"));
        let err = find(&store, "ghost").unwrap_err();
        let usage = err.downcast_ref::<UsageError>().unwrap();
        assert_eq!(usage.exit, ExitCode::General);
        assert!(usage.message.contains("\"ghost\" not found"));
    }

    fn seeded(dir: &TempDir) -> CredentialStore {
        let store = CredentialStore::new(dir.path().join("config.json"));
        for (name, id) in [("Work", "id_work"), ("Personal", "id_pers")] {
            store
                .add_or_replace(AccountEntry {
                    name: name.into(),
                    service_token: "t".into(),
                    identity_token: id.into(),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn switch_and_rename_report_success() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let work = find(&store, "work").unwrap();
        let mut out = Vec::new();
        switch_to(&store, &work, "work", &mut out).unwrap();
        rename(&store, &work, "work", "Office", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Switched to \"Work\".\nRenamed \"Work\" to \"Office\".\n"
        );
        assert_eq!(store.resolve_current().unwrap().identity_token, "id_work");
        assert!(store.find_by_name("office").is_some());
    }

    #[test]
    fn entry_removed_after_lookup_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);
        let work = find(&store, "work").unwrap();

        // Another process drops the entry between lookup and update.
        store.set_current("id_work").unwrap();
        store.remove_current().unwrap();

        let mut out = Vec::new();
        for err in [
            switch_to(&store, &work, "work", &mut out).unwrap_err(),
            rename(&store, &work, "work", "Office", &mut out).unwrap_err(),
        ] {
            let usage = err.downcast_ref::<UsageError>().unwrap();
            assert_eq!(usage.exit, ExitCode::General);
            assert!(usage.message.contains("\"work\" not found"));
        }
        assert!(out.is_empty());
        assert_eq!(store.resolve_current().unwrap().identity_token, "id_pers");
    }
}
