use serde::{Deserialize, Serialize};

use crate::errors::{ScoringError, ScoringResult};

/// ALGS placement table, index 0 = 1st place
pub const ALGS_PLACEMENT_POINTS: [u32; 20] = [12, 9, 7, 5, 4, 3, 3, 2, 2, 2, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Algs,
    Poland,
    TeamDeathMatch,
}

impl ScoringMode {
    pub fn required_placements(self) -> usize {
        match self {
            ScoringMode::Algs | ScoringMode::Poland => 20,
            ScoringMode::TeamDeathMatch => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Algs => "algs",
            ScoringMode::Poland => "poland",
            ScoringMode::TeamDeathMatch => "team_death_match",
        }
    }

    /// Parse a mode name as stored in the database
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "algs" => Some(Self::Algs),
            "poland" => Some(Self::Poland),
            "team_death_match" | "tdm" => Some(Self::TeamDeathMatch),
            _ => None,
        }
    }
}

/// Scoring configuration of one tournament. Fixed for the tournament's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    mode: ScoringMode,
    placement_points: Vec<u32>,
    kill_point_rate: f64,
    kill_point_cap: Option<u32>,
    match_point_threshold: Option<u32>,
}

impl RuleSet {
    pub fn new(
        mode: ScoringMode,
        placement_points: &[i64],
        kill_point_rate: f64,
        kill_point_cap: Option<i64>,
        match_point_threshold: Option<i64>,
    ) -> ScoringResult<Self> {
        let placement_points = validate_placement_points(mode, placement_points)?;

        if !kill_point_rate.is_finite() || kill_point_rate < 0.0 {
            return Err(ScoringError::configuration(format!(
                "kill point rate must be a non-negative number, got {}",
                kill_point_rate
            )));
        }

        let kill_point_cap = kill_point_cap
            .map(|cap| {
                u32::try_from(cap).map_err(|_| {
                    ScoringError::configuration(format!("kill point cap must be non-negative, got {}", cap))
                })
            })
            .transpose()?;

        let match_point_threshold = match mode {
            ScoringMode::Poland => Some(validate_threshold(match_point_threshold)?),
            // Only meaningful for Poland rule
            _ => None,
        };

        Ok(Self {
            mode,
            placement_points,
            kill_point_rate,
            kill_point_cap,
            match_point_threshold,
        })
    }

    pub fn algs_default() -> Self {
        Self {
            mode: ScoringMode::Algs,
            placement_points: ALGS_PLACEMENT_POINTS.to_vec(),
            kill_point_rate: 1.0,
            kill_point_cap: None,
            match_point_threshold: None,
        }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn placement_points(&self) -> &[u32] {
        &self.placement_points
    }

    pub fn kill_point_rate(&self) -> f64 {
        self.kill_point_rate
    }

    pub fn kill_point_cap(&self) -> Option<u32> {
        self.kill_point_cap
    }

    pub fn match_point_threshold(&self) -> Option<u32> {
        self.match_point_threshold
    }

    /// Points for a 1-based placement. Unplaced (0) or off-table placements score nothing.
    pub fn placement_point(&self, placement: u32) -> f64 {
        if placement == 0 {
            return 0.0;
        }
        self.placement_points
            .get(placement as usize - 1)
            .copied()
            .map(f64::from)
            .unwrap_or(0.0)
    }

    pub fn capped_kills(&self, kills: u32) -> u32 {
        match self.kill_point_cap {
            Some(cap) => kills.min(cap),
            None => kills,
        }
    }

    pub fn kill_points(&self, kills: u32) -> f64 {
        f64::from(kills) * self.kill_point_rate
    }

    /// Poland rule only: has a cumulative total reached the match-point threshold
    pub fn is_match_point(&self, total_points: i64) -> bool {
        match (self.mode, self.match_point_threshold) {
            (ScoringMode::Poland, Some(threshold)) => total_points >= i64::from(threshold),
            _ => false,
        }
    }
}

fn validate_placement_points(mode: ScoringMode, points: &[i64]) -> ScoringResult<Vec<u32>> {
    let required = mode.required_placements();
    if points.len() < required {
        return Err(ScoringError::configuration(format!(
            "{} mode needs {} placement points, got {}",
            mode.as_str(),
            required,
            points.len()
        )));
    }

    points
        .iter()
        .enumerate()
        .map(|(idx, &value)| {
            u32::try_from(value).map_err(|_| {
                ScoringError::configuration(format!(
                    "placement point for place {} must be non-negative, got {}",
                    idx + 1,
                    value
                ))
            })
        })
        .collect()
}

fn validate_threshold(threshold: Option<i64>) -> ScoringResult<u32> {
    match threshold {
        Some(value) if value > 0 => u32::try_from(value)
            .map_err(|_| ScoringError::configuration(format!("match point threshold {} is out of range", value))),
        Some(value) => Err(ScoringError::configuration(format!(
            "match point threshold must be positive, got {}",
            value
        ))),
        None => Err(ScoringError::configuration("poland mode requires a match point threshold")),
    }
}
