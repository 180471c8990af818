pub mod aggregate;
pub mod export;
pub mod ingest;
pub mod overlay;
pub mod rule_set;
pub mod store;
pub mod types;

#[cfg(test)]
pub mod memory;

pub use aggregate::ScoreAggregator;
pub use export::{ExportProjection, ExportTables};
pub use ingest::{delete_match, MatchIngestor, RecordedMatch};
pub use overlay::{OverlayBoard, OverlayFeed};
pub use rule_set::{RuleSet, ScoringMode};
pub use store::{CustomsStore, ResultWriter};
pub use types::*;
