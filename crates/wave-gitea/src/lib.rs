//! # wave-gitea
//!
//! Gitea API integration for wave: repository settings, topics, branch and tag
//! protections, webhooks, and the contents/pull request endpoints used to
//! propagate templates.
//!
//! # Security
//!
//! Authentication tokens are stored using `SecretString` which automatically
//! zeroizes memory when dropped, reducing credential exposure in memory dumps.

mod auth;
mod client;
mod error;
mod traits;
mod types;

pub use auth::Auth;
pub use client::GiteaClient;
pub use error::{Error, Result};
// Re-export SecretString for constructing Auth::Token
pub use secrecy::SecretString;
pub use traits::GiteaApi;
pub use types::{
    Branch, ChangeFileOperation, ChangeFiles, ContentEntry, CreatePullRequest, PullRequest,
    Repository,
};
