use chrono::NaiveDateTime;

use crate::errors::{ScoringError, ScoringResult};
use crate::scoring::{CustomSetting, RuleSet, ScoringMode};

/// Raw `customs` row. The placement table and the default team list are
/// stored as JSON arrays.
#[derive(Debug, Clone)]
pub struct CustomRow {
    pub id: i64,
    pub name: String,
    pub mode: String,
    pub placement_points: String,
    pub kill_point_rate: f64,
    pub kill_point_cap: Option<i64>,
    pub match_point_threshold: Option<i64>,
    pub default_teams: String,
    pub spreadsheet_id: Option<String>,
    pub match_count: i64,
    pub created_at: Option<NaiveDateTime>,
}

impl CustomRow {
    /// Rebuild the rule set; a stored row that no longer validates is a
    /// configuration error, never a silent default.
    pub fn into_setting(self) -> ScoringResult<CustomSetting> {
        let mode = ScoringMode::from_str_name(&self.mode).ok_or_else(|| {
            ScoringError::configuration(format!("custom '{}' has unknown scoring mode '{}'", self.name, self.mode))
        })?;

        let placement_points: Vec<i64> = serde_json::from_str(&self.placement_points).map_err(|e| {
            ScoringError::configuration(format!("custom '{}' has malformed placement points: {}", self.name, e))
        })?;

        let rules = RuleSet::new(
            mode,
            &placement_points,
            self.kill_point_rate,
            self.kill_point_cap,
            self.match_point_threshold,
        )?;

        let default_teams: Vec<String> = serde_json::from_str(&self.default_teams).map_err(|e| {
            ScoringError::configuration(format!("custom '{}' has malformed default teams: {}", self.name, e))
        })?;

        Ok(CustomSetting {
            id: self.id,
            name: self.name,
            rules,
            default_teams,
            spreadsheet_id: self.spreadsheet_id,
            match_count: u32::try_from(self.match_count).unwrap_or(0),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mode: &str, placement_points: &str) -> CustomRow {
        CustomRow {
            id: 1,
            name: "Scrims".to_string(),
            mode: mode.to_string(),
            placement_points: placement_points.to_string(),
            kill_point_rate: 1.0,
            kill_point_cap: None,
            match_point_threshold: None,
            default_teams: r#"["Alpha","Bravo"]"#.to_string(),
            spreadsheet_id: None,
            match_count: 2,
            created_at: None,
        }
    }

    #[test]
    fn test_valid_row_converts() {
        let points = serde_json::to_string(&crate::scoring::rule_set::ALGS_PLACEMENT_POINTS).unwrap();

        let setting = row("algs", &points).into_setting().unwrap();

        assert_eq!(setting.rules, RuleSet::algs_default());
        assert_eq!(setting.default_teams, vec!["Alpha", "Bravo"]);
        assert_eq!(setting.match_count, 2);
    }

    #[test]
    fn test_corrupt_rows_are_configuration_errors() {
        for custom in [row("algs", "not json"), row("battle_royale", "[12,9]"), row("algs", "[12,9]")] {
            assert!(matches!(custom.into_setting(), Err(ScoringError::Configuration(_))));
        }
    }
}
