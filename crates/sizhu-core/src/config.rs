use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::calendar::LateRatConvention;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SizhuConfig {
    pub scoring: ScoringConfig,
    pub calendar: CalendarConfig,
}

/// Per-role weights for one contribution source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights {
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub hour: f64,
    pub decade_period: f64,
    pub year_in_period: f64,
    pub month_in_year: f64,
    pub day_in_month: f64,
    pub hour_in_day: f64,
}

impl RoleWeights {
    fn values(&self) -> [f64; 9] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.decade_period,
            self.year_in_period,
            self.month_in_year,
            self.day_in_month,
            self.hour_in_day,
        ]
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.values().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Validation(format!(
                "scoring.{} weights must be finite and non-negative",
                name
            )));
        }
        let emphasized = self.day.min(self.month);
        if emphasized < self.year.max(self.hour) {
            return Err(ConfigError::Validation(format!(
                "scoring.{}: day and month weights must be >= year and hour weights",
                name
            )));
        }
        Ok(())
    }
}

/// Deltas by an element's relation to the season's dominant element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalDeltas {
    /// The dominant element itself.
    pub dominant: f64,
    /// The element the dominant one produces.
    pub produced: f64,
    /// The element that produces the dominant one.
    pub neutral: f64,
    /// The element the dominant one restrains.
    pub restrained: f64,
    /// The element that restrains the dominant one.
    pub restraining: f64,
}

impl SeasonalDeltas {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let ordered = [
            self.dominant,
            self.produced,
            self.neutral,
            self.restrained,
            self.restraining,
        ];
        if ordered.iter().any(|d| !d.is_finite()) {
            return Err(ConfigError::Validation(format!(
                "scoring.{} deltas must be finite",
                name
            )));
        }
        if ordered.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ConfigError::Validation(format!(
                "scoring.{} must be strictly ordered dominant > produced > neutral > restrained > restraining",
                name
            )));
        }
        Ok(())
    }

    fn magnitude(&self) -> f64 {
        self.dominant - self.restraining
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationBonuses {
    /// Five stem combinations (天干五合).
    pub stem_pair: f64,
    /// Six branch harmonies (六合).
    pub branch_pair: f64,
    /// Three harmonies (三合), all three branches present.
    pub harmony_triad: f64,
    pub harmony_triad_partial: f64,
    /// Seasonal assemblies (三会), all three branches present.
    pub seasonal_triad: f64,
    pub seasonal_triad_partial: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub stem_weights: RoleWeights,
    pub hidden_stem_weights: RoleWeights,
    pub sound_element_weights: RoleWeights,
    pub seasonal: SeasonalDeltas,
    pub dominant_season: SeasonalDeltas,
    pub combinations: CombinationBonuses,
    /// Display scale for relative strengths.
    pub relative_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub late_rat: LateRatConvention,
    /// Number of decade periods generated per chart.
    pub decade_count: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stem_weights: RoleWeights {
                year: 1.0,
                month: 2.0,
                day: 8.0,
                hour: 1.0,
                decade_period: 1.0,
                year_in_period: 0.8,
                month_in_year: 0.6,
                day_in_month: 0.4,
                hour_in_day: 0.2,
            },
            hidden_stem_weights: RoleWeights {
                year: 0.4,
                month: 1.0,
                day: 0.5,
                hour: 0.4,
                decade_period: 0.4,
                year_in_period: 0.3,
                month_in_year: 0.25,
                day_in_month: 0.15,
                hour_in_day: 0.1,
            },
            sound_element_weights: RoleWeights {
                year: 0.2,
                month: 0.4,
                day: 0.3,
                hour: 0.2,
                decade_period: 0.2,
                year_in_period: 0.15,
                month_in_year: 0.1,
                day_in_month: 0.1,
                hour_in_day: 0.05,
            },
            seasonal: SeasonalDeltas {
                dominant: 0.5,
                produced: 0.25,
                neutral: 0.0,
                restrained: -0.15,
                restraining: -0.25,
            },
            dominant_season: SeasonalDeltas {
                dominant: 0.6,
                produced: 0.3,
                neutral: 0.0,
                restrained: -0.2,
                restraining: -0.3,
            },
            combinations: CombinationBonuses {
                stem_pair: 0.3,
                branch_pair: 0.2,
                harmony_triad: 0.6,
                harmony_triad_partial: 0.35,
                seasonal_triad: 0.5,
                seasonal_triad_partial: 0.3,
            },
            relative_scale: 10.0,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            late_rat: LateRatConvention::SameDay,
            decade_count: 10,
        }
    }
}

fn role_env_targets<'a>(
    source: &str,
    weights: &'a mut RoleWeights,
) -> Vec<(String, &'a mut f64)> {
    let RoleWeights {
        year,
        month,
        day,
        hour,
        decade_period,
        year_in_period,
        month_in_year,
        day_in_month,
        hour_in_day,
    } = weights;
    [
        ("YEAR", year),
        ("MONTH", month),
        ("DAY", day),
        ("HOUR", hour),
        ("DECADE_PERIOD", decade_period),
        ("YEAR_IN_PERIOD", year_in_period),
        ("MONTH_IN_YEAR", month_in_year),
        ("DAY_IN_MONTH", day_in_month),
        ("HOUR_IN_DAY", hour_in_day),
    ]
    .into_iter()
    .map(|(role, slot)| (format!("SIZHU_SCORING_{}_{}", source, role), slot))
    .collect()
}

fn delta_env_targets<'a>(
    table: &str,
    deltas: &'a mut SeasonalDeltas,
) -> Vec<(String, &'a mut f64)> {
    let SeasonalDeltas {
        dominant,
        produced,
        neutral,
        restrained,
        restraining,
    } = deltas;
    [
        ("DOMINANT", dominant),
        ("PRODUCED", produced),
        ("NEUTRAL", neutral),
        ("RESTRAINED", restrained),
        ("RESTRAINING", restraining),
    ]
    .into_iter()
    .map(|(relation, slot)| (format!("SIZHU_SCORING_{}_{}", table, relation), slot))
    .collect()
}

/// Every numeric scoring field paired with its SIZHU_SCORING_* variable.
fn scoring_env_targets(scoring: &mut ScoringConfig) -> Vec<(String, &mut f64)> {
    let ScoringConfig {
        stem_weights,
        hidden_stem_weights,
        sound_element_weights,
        seasonal,
        dominant_season,
        combinations,
        relative_scale,
    } = scoring;
    let CombinationBonuses {
        stem_pair,
        branch_pair,
        harmony_triad,
        harmony_triad_partial,
        seasonal_triad,
        seasonal_triad_partial,
    } = combinations;

    let mut targets = role_env_targets("STEM", stem_weights);
    targets.extend(role_env_targets("HIDDEN_STEM", hidden_stem_weights));
    targets.extend(role_env_targets("SOUND_ELEMENT", sound_element_weights));
    targets.extend(delta_env_targets("SEASONAL", seasonal));
    targets.extend(delta_env_targets("DOMINANT_SEASON", dominant_season));
    targets.extend(
        [
            ("STEM_PAIR", stem_pair),
            ("BRANCH_PAIR", branch_pair),
            ("HARMONY_TRIAD", harmony_triad),
            ("HARMONY_TRIAD_PARTIAL", harmony_triad_partial),
            ("SEASONAL_TRIAD", seasonal_triad),
            ("SEASONAL_TRIAD_PARTIAL", seasonal_triad_partial),
        ]
        .into_iter()
        .map(|(bonus, slot)| (format!("SIZHU_SCORING_COMBINATIONS_{}", bonus), slot)),
    );
    targets.push(("SIZHU_SCORING_RELATIVE_SCALE".to_string(), relative_scale));
    targets
}

impl SizhuConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SizhuConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with SIZHU_ and cover every
    /// numeric scoring field plus the calendar settings.
    /// Example: SIZHU_SCORING_STEM_DAY=3.5, SIZHU_SCORING_SEASONAL_DOMINANT=0.8,
    /// SIZHU_SCORING_COMBINATIONS_STEM_PAIR=0.4
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = SizhuConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // A user file replaces the default file as a whole.
        if let Some(path) = user_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env;

        fn parse_f64(name: &str) -> Result<Option<f64>, ConfigError> {
            match env::var(name) {
                Ok(val) => val
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::Validation(format!("Invalid {}", name))),
                Err(_) => Ok(None),
            }
        }

        // Scoring overrides
        for (name, slot) in scoring_env_targets(&mut self.scoring) {
            if let Some(v) = parse_f64(&name)? {
                *slot = v;
            }
        }

        // Calendar overrides
        if let Ok(val) = env::var("SIZHU_CALENDAR_DECADE_COUNT") {
            self.calendar.decade_count = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid SIZHU_CALENDAR_DECADE_COUNT".to_string())
            })?;
        }
        if let Ok(val) = env::var("SIZHU_CALENDAR_LATE_RAT") {
            self.calendar.late_rat = match val.as_str() {
                "same_day" => LateRatConvention::SameDay,
                "next_day" => LateRatConvention::NextDay,
                _ => {
                    return Err(ConfigError::Validation(
                        "Invalid SIZHU_CALENDAR_LATE_RAT".to_string(),
                    ))
                }
            };
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;

        // Role weights
        scoring.stem_weights.validate("stem_weights")?;
        scoring.hidden_stem_weights.validate("hidden_stem_weights")?;
        scoring.sound_element_weights.validate("sound_element_weights")?;

        // Seasonal deltas
        scoring.seasonal.validate("seasonal")?;
        scoring.dominant_season.validate("dominant_season")?;
        if scoring.dominant_season.magnitude() < scoring.seasonal.magnitude() {
            return Err(ConfigError::Validation(
                "scoring.dominant_season spread must be >= scoring.seasonal spread".to_string(),
            ));
        }

        // Combinations
        let c = &scoring.combinations;
        let bonuses = [
            c.stem_pair,
            c.branch_pair,
            c.harmony_triad,
            c.harmony_triad_partial,
            c.seasonal_triad,
            c.seasonal_triad_partial,
        ];
        if bonuses.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(ConfigError::Validation(
                "scoring.combinations must be finite and non-negative".to_string(),
            ));
        }
        if c.harmony_triad_partial >= c.harmony_triad {
            return Err(ConfigError::Validation(
                "scoring.combinations.harmony_triad_partial must be < harmony_triad".to_string(),
            ));
        }
        if c.seasonal_triad_partial >= c.seasonal_triad {
            return Err(ConfigError::Validation(
                "scoring.combinations.seasonal_triad_partial must be < seasonal_triad".to_string(),
            ));
        }

        if !scoring.relative_scale.is_finite() || scoring.relative_scale <= 0.0 {
            return Err(ConfigError::Validation(
                "scoring.relative_scale must be positive".to_string(),
            ));
        }

        // Calendar
        if self.calendar.decade_count == 0 || self.calendar.decade_count > 12 {
            return Err(ConfigError::Validation(
                "calendar.decade_count must be in [1, 12]".to_string(),
            ));
        }

        Ok(())
    }

    /// Export configuration to TOML string
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self
            .to_toml_string()
            .map_err(|e| ConfigError::Validation(format!("TOML serialization error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}
