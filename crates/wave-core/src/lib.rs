//! # wave-core
//!
//! Core library for wave: the resource model for Gitea repository
//! configuration, identity matching, and the reconciliation engine that turns
//! a desired and an observed set into create/update/delete operations.
//!
//! Nothing in this crate talks to the network. Remote access goes through the
//! [`apply::Remote`] and [`apply::TopicRemote`] traits.

pub mod apply;
pub mod config;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod resource;
pub mod store;
pub mod strategy;
pub mod targets;
pub mod templates;

pub use apply::{ApplyReport, Remote, TopicRemote, apply, apply_topics};
pub use config::Config;
pub use error::{Error, Result};
pub use identity::IdentityKey;
pub use reconcile::{
    Operation, OperationKind, Plan, TopicOperation, TopicPlan, reconcile, reconcile_topics,
};
pub use resource::{
    BranchProtection, BranchProtectionConfig, Document, ExternalTracker, RepoSettings, Resource,
    ResourceItem, ResourceKind, TagProtection, TagProtectionConfig, TopicsConfig, Webhook,
    WebhookConfig,
};
pub use strategy::Strategy;
pub use targets::RepoRef;
pub use templates::TemplatesConfig;
