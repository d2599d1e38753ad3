//! `tradebook-sales` — sales and their polymorphic inventory source.
//!
//! A sale names the customer it debits and the inventory-bearing entity it
//! was fulfilled from. The source is a closed tagged union, so new source
//! kinds are a compile-time-checked enumeration rather than an open string
//! space. Selling does not decrement receiving counts; the two are
//! independently tracked ledgers.

pub mod sale;

pub use sale::{NewSale, NewSaleItem, Sale, SaleId, SaleItem, SaleSource};
