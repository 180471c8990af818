pub mod connection;
pub mod customs;
pub mod matches;
pub mod models;
pub mod results;
pub mod setup;
pub mod store;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};
pub use setup::{init_database, reset_database};
pub use store::SqliteStore;
