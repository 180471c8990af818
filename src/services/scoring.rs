use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ScoringSettings;
use crate::domain::{parse_match, select_match};
use crate::errors::{ScoringError, ScoringResult};
use crate::scoring::{
    delete_match, CustomId, CustomSetting, CustomUpdate, CustomsStore, ExportProjection, ExportTables, MatchId,
    MatchIngestor, MatchRecord, NewCustom, OverlayBoard, RecordedMatch, RuleSet, ScoreAggregator, ScoringMode,
    Standings, StandingsMode,
};

/// Input for a new custom. Unset rule fields fall back to the configured
/// default rule set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDraft {
    pub name: String,
    pub mode: Option<ScoringMode>,
    pub placement_points: Option<Vec<i64>>,
    pub kill_point_rate: Option<f64>,
    pub kill_point_cap: Option<i64>,
    pub match_point_threshold: Option<i64>,
    #[serde(default)]
    pub default_teams: Vec<String>,
    pub spreadsheet_id: Option<String>,
}

/// Every scoring operation, over any `CustomsStore`
pub struct ScoringService<S: CustomsStore> {
    store: S,
    defaults: ScoringSettings,
}

impl<S: CustomsStore> ScoringService<S> {
    pub fn new(store: S, defaults: ScoringSettings) -> Self {
        Self { store, defaults }
    }

    // --- Customs ---

    pub fn create_custom(&mut self, draft: CustomDraft) -> ScoringResult<CustomSetting> {
        let name = validate_name(&draft.name)?;
        let rules = self.build_rules(&draft)?;
        let custom = NewCustom {
            name: name.to_string(),
            rules,
            default_teams: draft.default_teams,
            spreadsheet_id: draft.spreadsheet_id,
        };

        let id = self.store.in_transaction(|tx| tx.insert_custom(&custom))?;
        info!("Created custom {} '{}' ({})", id, custom.name, custom.rules.mode().as_str());
        self.get_custom(id)
    }

    pub fn get_custom(&mut self, id: CustomId) -> ScoringResult<CustomSetting> {
        self.store
            .find_custom(id)?
            .ok_or_else(|| ScoringError::not_found(format!("custom {}", id)))
    }

    pub fn find_custom_by_name(&mut self, name: &str) -> ScoringResult<CustomSetting> {
        self.store
            .find_custom_by_name(name)?
            .ok_or_else(|| ScoringError::not_found(format!("custom '{}'", name)))
    }

    pub fn list_customs(&mut self) -> ScoringResult<Vec<CustomSetting>> {
        self.store.list_customs()
    }

    /// Name, default teams and spreadsheet id only; the rule set is frozen
    pub fn update_custom(&mut self, id: CustomId, update: &CustomUpdate) -> ScoringResult<CustomSetting> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if !self.store.in_transaction(|tx| tx.update_custom(id, update))? {
            return Err(ScoringError::not_found(format!("custom {}", id)));
        }
        self.get_custom(id)
    }

    pub fn delete_custom(&mut self, id: CustomId) -> ScoringResult<()> {
        if !self.store.in_transaction(|tx| tx.delete_custom(id))? {
            return Err(ScoringError::not_found(format!("custom {}", id)));
        }
        info!("Deleted custom {}", id);
        Ok(())
    }

    // --- Matches ---

    pub fn list_matches(&mut self, custom_id: CustomId) -> ScoringResult<Vec<MatchRecord>> {
        self.get_custom(custom_id)?;
        self.store.list_matches(custom_id)
    }

    /// Parse raw telemetry (one match or a full stats response) and record it.
    /// A kill point rate that disagrees with the custom's frozen rule set is
    /// refused.
    pub fn record_match(
        &mut self,
        custom_id: CustomId,
        kill_point_rate: Option<f64>,
        raw: Value,
        match_id: Option<&str>,
    ) -> ScoringResult<RecordedMatch> {
        let custom = self.get_custom(custom_id)?;

        if let Some(rate) = kill_point_rate {
            if (rate - custom.rules.kill_point_rate()).abs() > f64::EPSILON {
                return Err(ScoringError::configuration(format!(
                    "custom {} scores kills at {}, not {}; the rule set cannot change after creation",
                    custom_id,
                    custom.rules.kill_point_rate(),
                    rate
                )));
            }
        }

        let telemetry = parse_match(select_match(raw, match_id)?)?;
        MatchIngestor::new(&custom.rules).record(&mut self.store, custom_id, &telemetry)
    }

    pub fn delete_match(&mut self, custom_id: CustomId, match_id: MatchId) -> ScoringResult<()> {
        self.get_custom(custom_id)?;
        delete_match(&mut self.store, custom_id, match_id)
    }

    pub fn set_winner(
        &mut self,
        custom_id: CustomId,
        match_id: MatchId,
        team_name: &str,
        winner: bool,
    ) -> ScoringResult<()> {
        self.ensure_match(custom_id, match_id)?;
        if !self.store.in_transaction(|tx| tx.set_winner(match_id, team_name, winner))? {
            return Err(ScoringError::not_found(format!("team '{}' in match {}", team_name, match_id)));
        }
        info!("Set winner={} for team '{}' in match {}", winner, team_name, match_id);
        Ok(())
    }

    // --- Read models ---

    /// Standings of the custom called `name`. A custom without matches has
    /// empty standings, an unknown name is not found.
    pub fn standings(&mut self, name: &str, mode: StandingsMode) -> ScoringResult<Standings> {
        let custom = self.find_custom_by_name(name)?;
        self.standings_for(&custom, mode)
    }

    pub fn match_standings(&mut self, custom_id: CustomId, match_id: MatchId) -> ScoringResult<Standings> {
        let custom = self.get_custom(custom_id)?;
        self.ensure_match(custom_id, match_id)?;

        let rows = self.store.list_team_results(custom_id)?;
        Ok(Standings {
            custom_id,
            custom_name: custom.name,
            mode: StandingsMode::Latest,
            match_id: Some(match_id),
            match_count: custom.match_count,
            rows: ScoreAggregator::new(&custom.rules).match_standings(&rows, match_id),
        })
    }

    pub fn overlay(&mut self, name: &str, mode: StandingsMode) -> ScoringResult<OverlayBoard> {
        let custom = self.find_custom_by_name(name)?;
        let standings = self.standings_for(&custom, mode)?;
        Ok(OverlayBoard::build(&standings, &custom.default_teams))
    }

    pub fn export(&mut self, custom_id: CustomId) -> ScoringResult<ExportTables> {
        let custom = self.get_custom(custom_id)?;
        let matches = self.store.list_matches(custom_id)?;
        let teams = self.store.list_team_results(custom_id)?;
        let players = self.store.list_player_results(custom_id)?;

        Ok(ExportProjection::new(&custom.rules).project(&matches, &teams, &players))
    }

    // --- Helper Methods ---

    fn standings_for(&mut self, custom: &CustomSetting, mode: StandingsMode) -> ScoringResult<Standings> {
        let rows = self.store.list_team_results(custom.id)?;
        let aggregator = ScoreAggregator::new(&custom.rules);

        let (match_id, standings) = match mode {
            StandingsMode::Aggregate => (None, aggregator.aggregate(&rows)),
            StandingsMode::Latest => match rows.iter().map(|r| r.match_id).max() {
                Some(latest) => (Some(latest), aggregator.match_standings(&rows, latest)),
                None => (None, Vec::new()),
            },
        };

        Ok(Standings {
            custom_id: custom.id,
            custom_name: custom.name.clone(),
            mode,
            match_id,
            match_count: custom.match_count,
            rows: standings,
        })
    }

    fn ensure_match(&mut self, custom_id: CustomId, match_id: MatchId) -> ScoringResult<()> {
        let owned = self.store.list_matches(custom_id)?.iter().any(|m| m.id == match_id);
        if !owned {
            return Err(ScoringError::not_found(format!("match {} of custom {}", match_id, custom_id)));
        }
        Ok(())
    }

    fn build_rules(&self, draft: &CustomDraft) -> ScoringResult<RuleSet> {
        let mode = draft.mode.unwrap_or(self.defaults.default_mode);
        let default_points: Vec<i64> = self
            .defaults
            .default_placement_points
            .iter()
            .map(|&p| i64::from(p))
            .collect();

        RuleSet::new(
            mode,
            draft.placement_points.as_deref().unwrap_or(&default_points),
            draft.kill_point_rate.unwrap_or(self.defaults.default_kill_point_rate),
            draft.kill_point_cap,
            draft.match_point_threshold,
        )
    }
}

fn validate_name(name: &str) -> ScoringResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ScoringError::validation("custom name must not be empty"));
    }
    Ok(trimmed)
}
