//! `tradebook-identity` — the tenant root (`Company`) and actor identity (`User`).

pub mod company;
pub mod user;

pub use company::{Company, NewCompany};
pub use user::{NewUser, Role, User};
