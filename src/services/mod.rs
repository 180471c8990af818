pub mod ingestion;
pub mod scoring;
pub mod server;
pub mod watch;
