//! Service layer for business logic with dependency injection.
//!
//! Services take the Gitea client through the [`wave_gitea::GiteaApi`] trait so
//! they can be exercised against [`test_mocks::MockGiteaApi`].

pub mod handlers;
pub mod pull;
pub mod push;
pub mod remote;
pub mod validate;

#[cfg(test)]
pub mod test_mocks;

pub use handlers::KindReport;
pub use pull::PullService;
pub use push::{PushOptions, PushService, PushSummary};
pub use validate::{CheckOutcome, ValidateService};
