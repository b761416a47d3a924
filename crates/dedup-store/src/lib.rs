//! # dedup-store
//!
//! Vector store seam for message-dedup.
//!
//! The dedup pipeline needs two things from a store: the single nearest
//! stored record to a query vector within a filtered partition, and a
//! committed insert. This crate defines that interface and two backends.
//!
//! ## Features
//! - `PgVectorStore`: Postgres + pgvector via tokio-postgres, cosine distance (`<=>`)
//! - `InMemoryStore`: brute-force cosine search, for dry runs and tests
//! - Typed filter predicates over the closed set of filter fields
//! - Vectors travel to the store as `[c1,c2,...]` text literals

pub mod error;
pub mod literal;
pub mod memory;
pub mod postgres;
pub mod predicate;
pub mod store;
pub mod table;

pub use error::StoreError;
pub use literal::vector_literal;
pub use memory::InMemoryStore;
pub use postgres::PgVectorStore;
pub use predicate::{FilterCondition, FilterPredicate};
pub use store::{Neighbor, VectorStore};
pub use table::{quote_ident, TableName};
