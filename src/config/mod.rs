pub mod settings;

pub use settings::{AppConfig, DatabaseSettings, OverlaySettings, ScoringSettings, StatsApiSettings};
