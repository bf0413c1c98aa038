//! eventra/crates/ev-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Eventra:
//! list filtering, login negotiation, session state and the expiring cache.

pub mod auth;
pub mod cache;
pub mod error;
pub mod filter;
pub mod models;
pub mod query;
pub mod session;
pub mod store;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use auth::{Attempt, AuthNegotiator};
pub use cache::{ExpiringCache, DEFAULT_TTL};
pub use error::*;
pub use filter::filter;
pub use models::*;
pub use query::{QuerySpec, SortKey};
pub use session::{Access, AccessRequirement, Session, SessionManager, User};
pub use store::MemoryStore;
pub use traits::*;
