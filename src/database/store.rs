use rusqlite::{Connection, ErrorCode};

use crate::errors::{ScoringError, ScoringResult};
use crate::scoring::{
    CustomId, CustomSetting, CustomUpdate, CustomsStore, MatchId, MatchMeta, MatchRecord, NewCustom, PlayerResult,
    ResultWriter, StoredPlayerResult, StoredTeamResult, TeamResult,
};

use super::customs::{self, CustomInsert};
use super::{matches, results};

/// `CustomsStore` over one SQLite connection
pub struct SqliteStore<'c> {
    conn: &'c mut Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }
}

/// Constraint violations are bad input; anything else is a storage failure
pub fn classify(err: anyhow::Error) -> ScoringError {
    let constraint = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<rusqlite::Error>())
        .any(|e| e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation));

    if constraint {
        ScoringError::validation(format!("{:#}", err))
    } else {
        ScoringError::Storage(err)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ScoringResult<String> {
    serde_json::to_string(value).map_err(|e| ScoringError::Storage(e.into()))
}

struct SqliteWriter<'t> {
    conn: &'t Connection,
}

impl SqliteWriter<'_> {
    fn ensure_name_free(&self, name: &str, except_id: Option<CustomId>) -> ScoringResult<()> {
        if customs::name_taken(self.conn, name, except_id).map_err(classify)? {
            return Err(ScoringError::validation(format!("custom name '{}' is already in use", name)));
        }
        Ok(())
    }
}

impl ResultWriter for SqliteWriter<'_> {
    fn insert_custom(&mut self, custom: &NewCustom) -> ScoringResult<CustomId> {
        self.ensure_name_free(&custom.name, None)?;

        let rules = &custom.rules;
        let row = CustomInsert {
            name: &custom.name,
            mode: rules.mode().as_str(),
            placement_points: to_json(&rules.placement_points())?,
            kill_point_rate: rules.kill_point_rate(),
            kill_point_cap: rules.kill_point_cap(),
            match_point_threshold: rules.match_point_threshold(),
            default_teams: to_json(&custom.default_teams)?,
            spreadsheet_id: custom.spreadsheet_id.as_deref(),
        };
        customs::insert_custom(self.conn, &row).map_err(classify)
    }

    fn update_custom(&mut self, id: CustomId, update: &CustomUpdate) -> ScoringResult<bool> {
        if let Some(name) = &update.name {
            self.ensure_name_free(name, Some(id))?;
        }
        let default_teams = update.default_teams.as_ref().map(to_json).transpose()?;

        customs::update_custom(
            self.conn,
            id,
            update.name.as_deref(),
            default_teams,
            update.spreadsheet_id.as_deref(),
        )
        .map_err(classify)
    }

    fn delete_custom(&mut self, id: CustomId) -> ScoringResult<bool> {
        customs::delete_custom(self.conn, id).map_err(classify)
    }

    fn insert_match(&mut self, custom_id: CustomId, meta: &MatchMeta) -> ScoringResult<MatchId> {
        if !customs::exists(self.conn, custom_id).map_err(classify)? {
            return Err(ScoringError::configuration(format!("custom {} no longer exists", custom_id)));
        }
        if matches::find_by_external_id(self.conn, custom_id, &meta.external_id)
            .map_err(classify)?
            .is_some()
        {
            return Err(ScoringError::validation(format!("match {} is already recorded", meta.external_id)));
        }
        matches::insert_match(self.conn, custom_id, meta).map_err(classify)
    }

    fn insert_player_results(&mut self, match_id: MatchId, players: &[PlayerResult]) -> ScoringResult<()> {
        for player in players {
            results::insert_player_result(self.conn, match_id, player).map_err(classify)?;
        }
        Ok(())
    }

    fn insert_team_results(&mut self, match_id: MatchId, teams: &[TeamResult]) -> ScoringResult<()> {
        for team in teams {
            results::insert_team_result(self.conn, match_id, team).map_err(classify)?;
        }
        Ok(())
    }

    fn adjust_match_count(&mut self, custom_id: CustomId, delta: i64) -> ScoringResult<()> {
        if !customs::adjust_match_count(self.conn, custom_id, delta).map_err(classify)? {
            return Err(ScoringError::configuration(format!("custom {} no longer exists", custom_id)));
        }
        Ok(())
    }

    fn delete_match(&mut self, custom_id: CustomId, match_id: MatchId) -> ScoringResult<bool> {
        matches::delete_match(self.conn, custom_id, match_id).map_err(classify)
    }

    fn set_winner(&mut self, match_id: MatchId, team_name: &str, winner: bool) -> ScoringResult<bool> {
        results::set_winner(self.conn, match_id, team_name, winner).map_err(classify)
    }
}

impl CustomsStore for SqliteStore<'_> {
    fn find_custom(&mut self, id: CustomId) -> ScoringResult<Option<CustomSetting>> {
        customs::find_by_id(self.conn, id)
            .map_err(classify)?
            .map(|row| row.into_setting())
            .transpose()
    }

    fn find_custom_by_name(&mut self, name: &str) -> ScoringResult<Option<CustomSetting>> {
        customs::find_by_name(self.conn, name)
            .map_err(classify)?
            .map(|row| row.into_setting())
            .transpose()
    }

    fn list_customs(&mut self) -> ScoringResult<Vec<CustomSetting>> {
        customs::list_customs(self.conn)
            .map_err(classify)?
            .into_iter()
            .map(|row| row.into_setting())
            .collect()
    }

    fn list_matches(&mut self, custom_id: CustomId) -> ScoringResult<Vec<MatchRecord>> {
        matches::list_by_custom(self.conn, custom_id).map_err(classify)
    }

    fn list_team_results(&mut self, custom_id: CustomId) -> ScoringResult<Vec<StoredTeamResult>> {
        results::list_team_results(self.conn, custom_id).map_err(classify)
    }

    fn list_player_results(&mut self, custom_id: CustomId) -> ScoringResult<Vec<StoredPlayerResult>> {
        results::list_player_results(self.conn, custom_id).map_err(classify)
    }

    fn in_transaction<T, F>(&mut self, work: F) -> ScoringResult<T>
    where
        F: FnOnce(&mut dyn ResultWriter) -> ScoringResult<T>,
    {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| ScoringError::Storage(anyhow::Error::new(e).context("Failed to begin transaction")))?;

        let mut writer = SqliteWriter { conn: &tx };
        // Dropping `tx` without commit rolls everything back
        let value = work(&mut writer)?;

        tx.commit()
            .map_err(|e| ScoringError::Storage(anyhow::Error::new(e).context("Failed to commit transaction")))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::init_database;
    use crate::scoring::{MatchIngestor, MatchTelemetry, PlayerStats, RuleSet, ScoringMode};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        init_database(&conn).unwrap();
        conn
    }

    fn new_custom(name: &str, rules: RuleSet) -> NewCustom {
        NewCustom {
            name: name.to_string(),
            rules,
            default_teams: vec!["Alpha".to_string()],
            spreadsheet_id: None,
        }
    }

    fn create(store: &mut SqliteStore, name: &str, rules: RuleSet) -> CustomId {
        store.in_transaction(|tx| tx.insert_custom(&new_custom(name, rules))).unwrap()
    }

    fn telemetry(external_id: &str) -> MatchTelemetry {
        let player = |name: &str, team: &str, placement: u32, kills: u32| PlayerStats {
            player_name: name.to_string(),
            character: "pathfinder".to_string(),
            team_name: team.to_string(),
            team_number: placement + 1,
            team_placement: placement,
            kills,
            ..Default::default()
        };
        MatchTelemetry {
            meta: MatchMeta {
                external_id: external_id.to_string(),
                map_name: "mp_rr_olympus_mu2".to_string(),
                started_at: None,
            },
            players: vec![
                player("a1", "Alpha", 1, 3),
                player("a2", "Alpha", 1, 2),
                player("b1", "Bravo", 2, 4),
            ],
        }
    }

    #[test]
    fn test_custom_round_trips_rule_set() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        let points: Vec<i64> = (0..20).map(|place| 20 - place).collect();
        let rules = RuleSet::new(ScoringMode::Poland, &points, 1.5, Some(6), Some(50)).unwrap();

        let id = create(&mut store, "Poland Cup", rules.clone());

        let custom = store.find_custom(id).unwrap().unwrap();
        assert_eq!(custom.rules, rules);
        assert_eq!(custom.default_teams, vec!["Alpha"]);
        assert_eq!(store.find_custom_by_name("Poland Cup").unwrap().unwrap().id, id);
        assert_eq!(store.list_customs().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_validation_error() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        create(&mut store, "Cup", RuleSet::algs_default());

        let err = store
            .in_transaction(|tx| tx.insert_custom(&new_custom("Cup", RuleSet::algs_default())))
            .unwrap_err();

        assert!(matches!(err, ScoringError::Validation(_)));
    }

    #[test]
    fn test_record_persists_all_rows_and_count() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        let rules = RuleSet::algs_default();
        let id = create(&mut store, "Cup", rules.clone());

        let recorded = MatchIngestor::new(&rules).record(&mut store, id, &telemetry("m1")).unwrap();

        assert_eq!(recorded.teams.len(), 2);
        assert_eq!(store.list_matches(id).unwrap().len(), 1);
        assert_eq!(store.list_team_results(id).unwrap().len(), 2);
        assert_eq!(store.list_player_results(id).unwrap().len(), 3);
        assert_eq!(store.find_custom(id).unwrap().unwrap().match_count, 1);
    }

    #[test]
    fn test_failed_unit_of_work_leaves_no_rows() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        let id = create(&mut store, "Cup", RuleSet::algs_default());

        let result: ScoringResult<()> = store.in_transaction(|tx| {
            let match_id = tx.insert_match(id, &telemetry("m1").meta)?;
            tx.adjust_match_count(id, 1)?;
            tx.set_winner(match_id, "Alpha", true)?;
            Err(ScoringError::Storage(anyhow::anyhow!("disk I/O error")))
        });

        assert!(result.is_err());
        assert!(store.list_matches(id).unwrap().is_empty());
        assert_eq!(store.find_custom(id).unwrap().unwrap().match_count, 0);
    }

    #[test]
    fn test_duplicate_match_is_rejected_without_side_effects() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        let rules = RuleSet::algs_default();
        let id = create(&mut store, "Cup", rules.clone());
        let ingestor = MatchIngestor::new(&rules);
        ingestor.record(&mut store, id, &telemetry("m1")).unwrap();

        let err = ingestor.record(&mut store, id, &telemetry("m1")).unwrap_err();

        assert!(matches!(err, ScoringError::Validation(_)));
        assert_eq!(store.list_team_results(id).unwrap().len(), 2);
        assert_eq!(store.find_custom(id).unwrap().unwrap().match_count, 1);
    }

    #[test]
    fn test_match_for_missing_custom_is_configuration_error() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        let rules = RuleSet::algs_default();

        let err = MatchIngestor::new(&rules).record(&mut store, 42, &telemetry("m1")).unwrap_err();

        assert!(matches!(err, ScoringError::Configuration(_)));
    }

    #[test]
    fn test_delete_custom_removes_results() {
        let mut conn = setup();
        let mut store = SqliteStore::new(&mut conn);
        let rules = RuleSet::algs_default();
        let id = create(&mut store, "Cup", rules.clone());
        MatchIngestor::new(&rules).record(&mut store, id, &telemetry("m1")).unwrap();

        assert!(store.in_transaction(|tx| tx.delete_custom(id)).unwrap());

        assert!(store.find_custom(id).unwrap().is_none());
        assert!(store.list_team_results(id).unwrap().is_empty());
        assert!(store.list_player_results(id).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_rule_set_surfaces_as_configuration_error() {
        let mut conn = setup();
        conn.execute(
            "INSERT INTO customs (name, mode, placement_points, kill_point_rate) VALUES ('Broken', 'algs', '[1,2', 1.0)",
            [],
        )
        .unwrap();
        let mut store = SqliteStore::new(&mut conn);

        let err = store.find_custom_by_name("Broken").unwrap_err();

        assert!(matches!(err, ScoringError::Configuration(_)));
    }

    #[test]
    fn test_classify_constraint_violation() {
        let conn = setup();
        let err = conn
            .execute("INSERT INTO matches (custom_id, external_id, map_name) VALUES (999, 'x', 'y')", [])
            .unwrap_err();

        assert!(matches!(classify(err.into()), ScoringError::Validation(_)));
        assert!(matches!(classify(anyhow::anyhow!("database is locked")), ScoringError::Storage(_)));
    }
}
