use anyhow::{Context, Result};
use school_core::{RuleConfig, School, SchoolConfig};
use school_shared::SchoolSettings;
use std::path::Path;

/// Reads settings from a JSON file. Missing fields keep their defaults.
pub fn load_settings(path: &Path) -> Result<SchoolSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;

    SchoolSettings::from_json(&json)
        .with_context(|| format!("Invalid settings in {}", path.display()))
}

pub fn school_config(settings: &SchoolSettings) -> SchoolConfig {
    let rules = &settings.rules;

    SchoolConfig {
        fish_count: settings.fish_count,
        sphere_radius: settings.sphere_radius,
        fish_length: settings.fish_length,
        rules: RuleConfig {
            cohesion_divisor: rules.cohesion_divisor,
            separation_distance: rules.separation_distance,
            separation_scale: rules.separation_scale,
            alignment_divisor: rules.alignment_divisor,
            boundary_slack: rules.boundary_slack,
        },
    }
}

pub fn build_school(settings: &SchoolSettings) -> Result<School> {
    let config = school_config(settings);

    let school = match settings.seed {
        Some(seed) => School::with_seed(config, seed),
        None => School::new(config),
    }
    .context("Invalid school configuration")?;

    Ok(school)
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_core::SchoolError;

    #[test]
    fn test_default_settings_match_core_defaults() {
        assert_eq!(school_config(&SchoolSettings::default()), SchoolConfig::default());
    }

    #[test]
    fn test_build_school_rejects_single_fish() {
        let settings = SchoolSettings {
            fish_count: 1,
            ..SchoolSettings::default()
        };

        let err = build_school(&settings).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchoolError>(),
            Some(&SchoolError::TooFewFish { count: 1 })
        );
    }

    #[test]
    fn test_missing_settings_file() {
        let err = load_settings(Path::new("/nonexistent/school.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }
}
