//! Task storage backends for the todo server
//!
//! This crate provides the storage abstraction behind the todo HTTP API.
//! Three implementations satisfy the same [`TaskStore`] contract: a volatile
//! in-memory store, an embedded SQLite store (single local file) and a
//! networked PostgreSQL store. Callers cannot tell them apart except by
//! durability.

mod entities;
mod error;
mod memory;
mod postgres;
mod sqlite;
mod store;

pub use entities::*;
pub use error::*;
pub use memory::*;
pub use postgres::*;
pub use sqlite::*;
pub use store::*;
