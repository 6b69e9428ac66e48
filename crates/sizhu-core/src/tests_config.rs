#[cfg(test)]
mod tests {
    use crate::calendar::LateRatConvention;
    use crate::config::*;
    use std::env;
    use std::fs;
    use std::path::Path;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_valid() {
        let config = SizhuConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_role_emphasis() {
        let mut config = SizhuConfig::default();

        // Hour may not outweigh the day pillar
        config.scoring.stem_weights.hour = 4.0;
        assert!(config.validate().is_err());

        config.scoring.stem_weights.hour = 1.0;
        config.scoring.hidden_stem_weights.month = -1.0;
        assert!(config.validate().is_err());

        config.scoring.hidden_stem_weights.month = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_seasonal_order() {
        let mut config = SizhuConfig::default();

        // neutral must sit between produced and restrained
        config.scoring.seasonal.neutral = 1.5;
        assert!(config.validate().is_err());

        // dominant season spread must not shrink below seasonal spread
        let mut config = SizhuConfig::default();
        config.scoring.dominant_season = config.scoring.seasonal.clone();
        assert!(config.validate().is_ok());
        config.scoring.dominant_season.dominant = 0.4;
        config.scoring.dominant_season.produced = 0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_partial_triads() {
        let mut config = SizhuConfig::default();
        config.scoring.combinations.harmony_triad_partial = 1.5;
        assert!(config.validate().is_err());

        let mut config = SizhuConfig::default();
        config.scoring.combinations.seasonal_triad_partial = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_calendar() {
        let mut config = SizhuConfig::default();
        config.calendar.decade_count = 13;
        assert!(config.validate().is_err());
        config.calendar.decade_count = 12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml_string() {
        let config = SizhuConfig::default();
        let toml_str = config.to_toml_string().unwrap();

        assert!(toml_str.contains("[scoring.stem_weights]"));
        assert!(toml_str.contains("[calendar]"));
        assert!(toml_str.contains("late_rat = \"same_day\""));
        assert!(toml_str.contains("harmony_triad_partial"));
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let mut config = SizhuConfig::default();
        config.scoring.stem_weights.day = 3.5;
        config.calendar.late_rat = LateRatConvention::NextDay;

        let file = NamedTempFile::new().unwrap();
        config.save_to_file(file.path()).unwrap();
        let loaded = SizhuConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_from_file_rejects_invalid() {
        let mut config = SizhuConfig::default();
        config.scoring.combinations.seasonal_triad_partial = 5.0;
        let toml_str = config.to_toml_string().unwrap();

        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), toml_str).unwrap();
        assert!(matches!(
            SizhuConfig::from_file(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_config_from_file_parse_error() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "scoring = 3").unwrap();
        assert!(matches!(
            SizhuConfig::from_file(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    // Env-driven cases share one test so parallel tests never see each
    // other's variables.
    #[test]
    fn test_env_override_and_layering() {
        let default_file = NamedTempFile::new().unwrap();
        SizhuConfig::default()
            .save_to_file(default_file.path())
            .unwrap();

        env::set_var("SIZHU_CALENDAR_DECADE_COUNT", "8");
        let config = SizhuConfig::from_file_with_env(default_file.path());
        env::remove_var("SIZHU_CALENDAR_DECADE_COUNT");
        assert_eq!(config.unwrap().calendar.decade_count, 8);

        env::set_var("SIZHU_CALENDAR_LATE_RAT", "midnight");
        let bad = SizhuConfig::from_file_with_env(default_file.path());
        env::remove_var("SIZHU_CALENDAR_LATE_RAT");
        assert!(bad.is_err());

        let mut user = SizhuConfig::default();
        user.scoring.relative_scale = 100.0;
        let user_file = NamedTempFile::new().unwrap();
        user.save_to_file(user_file.path()).unwrap();

        let missing = Path::new("/nonexistent/sizhu.toml");
        let config = SizhuConfig::load_layered(Some(missing), Some(user_file.path())).unwrap();
        assert_eq!(config.scoring.relative_scale, 100.0);

        env::set_var("SIZHU_SCORING_STEM_DAY", "4.0");
        let config = SizhuConfig::load_layered(Some(default_file.path()), None);
        env::remove_var("SIZHU_SCORING_STEM_DAY");
        assert_eq!(config.unwrap().scoring.stem_weights.day, 4.0);

        let overrides = [
            ("SIZHU_SCORING_HIDDEN_STEM_MONTH", "1.5"),
            ("SIZHU_SCORING_SOUND_ELEMENT_HOUR_IN_DAY", "0.01"),
            ("SIZHU_SCORING_SEASONAL_DOMINANT", "0.7"),
            ("SIZHU_SCORING_DOMINANT_SEASON_RESTRAINING", "-0.5"),
            ("SIZHU_SCORING_COMBINATIONS_STEM_PAIR", "0.45"),
        ];
        for (name, value) in overrides {
            env::set_var(name, value);
        }
        let config = SizhuConfig::from_file_with_env(default_file.path());
        for (name, _) in overrides {
            env::remove_var(name);
        }
        let scoring = config.unwrap().scoring;
        assert_eq!(scoring.hidden_stem_weights.month, 1.5);
        assert_eq!(scoring.sound_element_weights.hour_in_day, 0.01);
        assert_eq!(scoring.seasonal.dominant, 0.7);
        assert_eq!(scoring.dominant_season.restraining, -0.5);
        assert_eq!(scoring.combinations.stem_pair, 0.45);

        env::set_var("SIZHU_SCORING_SEASONAL_NEUTRAL", "5.0");
        let unordered = SizhuConfig::from_file_with_env(default_file.path());
        env::remove_var("SIZHU_SCORING_SEASONAL_NEUTRAL");
        assert!(matches!(unordered, Err(ConfigError::Validation(_))));

        let config = SizhuConfig::load_layered(None, None).unwrap();
        assert_eq!(config, SizhuConfig::default());
    }
}
