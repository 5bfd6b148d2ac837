//! Infrastructure layer: Postgres and in-memory stores, periodic jobs.

pub mod jobs;
pub mod memory;
pub mod postgres;


pub use memory::{InMemoryStore, NewEvent};
pub use postgres::PostgresStore;
