//! `tradebook-receiving` — inbound shipments and receiving reconciliation.
//!
//! A container records what was ordered per item; receiving reconciles how
//! much of that has actually arrived. The `received_qty <= quantity` bound is
//! the crate's central invariant, enforced batch-at-a-time (all lines of a
//! receipt validate, or nothing is applied).

pub mod container;

pub use container::{
    Container, ContainerId, ContainerItem, ContainerStatus, NewContainer, NewContainerItem,
    ReceiptLine, ReceivingStatus,
};
