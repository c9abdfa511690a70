//! Picks the token pair a command runs with.
//!
//! An explicit `--account` name wins over the stored current account. Both
//! paths fail with [`AuthError`] before any remote call is made.

use thiserror::Error;

use super::store::{CredentialStore, Tokens};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(
        "Account \"{name}\" not found. Run \"linkedin account list\" to see available accounts."
    )]
    AccountNotFound { name: String },

    #[error(
        "Authentication required.

To use this CLI, you need a Linked API account with a connected LinkedIn profile.

  1. Create an account at https://app.linkedapi.io
  2. Connect your LinkedIn account on the platform
  3. Copy your Linked API Token and Identification Token from the dashboard
  4. Run: linkedin setup

Learn more: https://linkedapi.io/docs/getting-started"
    )]
    NotConfigured,
}

pub fn resolve(store: &CredentialStore, account_override: Option<&str>) -> Result<Tokens, AuthError> {
    if let Some(name) = account_override.filter(|n| !n.is_empty()) {
        return store
            .find_by_name(name)
            .map(|entry| Tokens::from(&entry))
            .ok_or_else(|| AuthError::AccountNotFound {
                name: name.to_string(),
            });
    }

    store.resolve_current().ok_or(AuthError::NotConfigured)
}
