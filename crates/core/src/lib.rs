//! `tradebook-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage concerns):
//! strongly-typed identifiers, the error taxonomy shared by every module,
//! and the tenant-scoping guard that every operation passes through.

pub mod entity;
pub mod error;
pub mod id;
pub mod tenant;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{TenantId, UserId};
pub use tenant::{TenantScope, TenantScoped};
