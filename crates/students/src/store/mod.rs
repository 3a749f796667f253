//! Student storage

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;

pub use memory::InMemoryStudentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStudentStore;
#[cfg(test)]
pub use traits::MockStudentStore;
pub use traits::{StudentQuery, StudentStore};
