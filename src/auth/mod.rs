//! Local accounts and session token resolution.

pub mod resolver;
pub mod store;

pub use resolver::{AuthError, resolve};
pub use store::{AccountEntry, CredentialStore, Tokens};
