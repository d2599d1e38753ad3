//! `tradebook-audit` — the append-only audit trail.
//!
//! Every mutating operation appends exactly one entry, attributed to a user,
//! in the same unit of work as the mutation itself. Entries are immutable
//! facts: the log exposes no update or delete, and it survives deletion of
//! the entities (and even the company) it describes.

pub mod entry;
pub mod log;

pub use entry::AuditEntry;
pub use log::AuditLog;
