//! Query runtime for graphgen entities.
//!
//! One builder, two backend families: SQL (`mysql`, `sqlite3`, `postgres`)
//! and Gremlin. The backend is chosen from the driver's dialect when the
//! [`Client`] is created; the builder compiles the same accumulated state
//! for either.

pub mod backend;
pub mod builder;
pub mod client;
pub mod driver;
pub mod entity;
pub mod error;
pub mod gremlin;
pub mod predicate;
pub mod select;
pub mod sql;
pub mod state;
pub mod value;

// Re-export commonly used items
pub use builder::Query;
pub use client::Client;
pub use driver::{Driver, QueryResult, Record};
pub use entity::Entity;
pub use error::{BoxError, QueryError};
pub use predicate::{EdgeStep, Order, Predicate, Rel};
pub use select::{Aggregate, GroupBy, Select};
pub use state::MAX_LIMIT;
pub use value::Value;

#[cfg(any(test, feature = "test-utils"))]
pub use driver::RecordingDriver;
#[cfg(feature = "sqlite")]
pub use driver::SqliteDriver;
