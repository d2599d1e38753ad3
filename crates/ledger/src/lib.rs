//! `tradebook-ledger` — customer accounts and the balance engine.
//!
//! A customer's balance is a materialized cache of their ledger: sales debit
//! it, payments credit it, and nothing else may touch it. The derivation rule
//! `balance == sum(sale totals) - sum(payment amounts)` is the central
//! correctness property of the whole core.

pub mod account;

pub use account::{Customer, CustomerId, CustomerPayment, NewCustomer, PaymentId};
