/*!
`reset.rs`

Removes stored accounts.

  linkedin reset          remove the current account; the first remaining one takes over
  linkedin reset --all    remove every account
*/

use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::shared::Ctx;
use crate::auth::CredentialStore;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Remove all accounts
    #[arg(long)]
    pub all: bool,
}

pub fn execute_reset(args: ResetArgs, ctx: &Ctx) -> Result<()> {
    let mut out = std::io::stdout().lock();
    reset(&ctx.store(), args.all, &mut out)
}

fn reset(store: &CredentialStore, all: bool, out: &mut impl Write) -> Result<()> {
    if all {
        let count = store.remove_all()?;
        match count {
            0 => writeln!(out, "No stored accounts found.")?,
            1 => writeln!(out, "Removed 1 account.")?,
            n => writeln!(out, "Removed {n} accounts.")?,
        }
        return Ok(());
    }

    if store.list().is_empty() {
        writeln!(out, "No stored accounts found.")?;
        return Ok(());
    }

    let Some(removed) = store.remove_current()? else {
        writeln!(out, "No active account to remove.")?;
        return Ok(());
    };

    match store.list().into_iter().find(|(_, current)| *current) {
        Some((next, _)) => writeln!(
            out,
            "Removed \"{}\". Switched to \"{}\".",
            removed.name, next.name
        )?,
        None => writeln!(out, "Removed \"{}\". No accounts remaining.", removed.name)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccountEntry;
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, names: &[&str]) -> CredentialStore {
        let store = CredentialStore::new(dir.path().join("config.json"));
        for (i, name) in names.iter().enumerate() {
            store
                .add_or_replace(AccountEntry {
                    name: name.to_string(),
                    service_token: format!("t_{i}"),
                    identity_token: format!("id_{i}"),
                })
                .unwrap();
        }
        store
    }

    fn run(store: &CredentialStore, all: bool) -> String {
        let mut out = Vec::new();
        reset(store, all, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_store_reports_nothing_to_do() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &[]);
        assert_eq!(run(&store, false), "No stored accounts found.\n");
        assert_eq!(run(&store, true), "No stored accounts found.\n");
    }

    #[test]
    fn removing_current_switches_to_first_remaining() {
        let dir = TempDir::new().unwrap();
        // "Personal" was added last, so it is current
        let store = store_with(&dir, &["Work", "Personal"]);
        assert_eq!(
            run(&store, false),
            "Removed \"Personal\". Switched to \"Work\".\n"
        );
        assert_eq!(run(&store, false), "Removed \"Work\". No accounts remaining.\n");
    }

    #[test]
    fn remove_all_counts_accounts() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &["A", "B", "C"]);
        assert_eq!(run(&store, true), "Removed 3 accounts.\n");
        assert!(store.list().is_empty());
    }
}
