pub mod auth;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod stats_client;

pub use routes::create_router;
pub use stats_client::StatsClient;
