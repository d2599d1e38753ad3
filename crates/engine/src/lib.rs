//! `tradebook-engine` — the orchestration layer behind the domain crates.
//!
//! Holds the per-tenant arena store and exposes the public operations
//! (create/receive/sell/pay/record). Each mutating operation runs as one
//! atomic unit under the tenant's lock: validate fully, append the audit
//! entry, apply the writes. On any error nothing is committed.

pub mod arena;
pub mod engine;


pub use arena::TenantArena;
pub use engine::Engine;
