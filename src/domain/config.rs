//! Weights of the cost model, read from a versioned TOML file.

use std::{io, path::Path};

use serde::{Deserialize, Serialize};

/// Weights of the assignment cost model.
///
/// These are process configuration, not part of the project snapshot, and the
/// core never mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct WeightConfig {
    /// The cost of a seat the group never ranked is `-non_wish_malus`.
    ///
    /// Negative values make unranked seats more expensive than any ranked
    /// one.
    pub non_wish_malus: f64,

    /// Subtracted from every cost of a flagged group.
    pub mark_bonus: f64,

    /// The rating that leaves costs unchanged.
    pub null_rating: f64,

    /// Cost change per rating point away from `null_rating`.
    ///
    /// A rating above `null_rating` lowers the cost, one below raises it.
    pub rating_factor: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            non_wish_malus: default_non_wish_malus(),
            mark_bonus: default_mark_bonus(),
            null_rating: default_null_rating(),
            rating_factor: default_rating_factor(),
        }
    }
}

/// Errors raised while reading or writing a weight file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access weight file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid TOML for this schema.
    #[error("failed to parse weight file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be encoded.
    #[error("failed to serialize weights: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A weight is NaN or infinite.
    #[error("weight {name} must be a finite number, got {value}")]
    NonFinite {
        /// The offending field.
        name: &'static str,
        /// Its value.
        value: f64,
    },
}

impl WeightConfig {
    /// Loads the weights from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if the TOML content is
    /// invalid, or if a weight is not finite.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every weight is a finite number.
    ///
    /// The cost matrix cannot hold NaN or infinite entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonFinite`] naming the first offending weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("non_wish_malus", self.non_wish_malus),
            ("mark_bonus", self.mark_bonus),
            ("null_rating", self.null_rating),
            ("rating_factor", self.rating_factor),
        ];
        weights
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map_or(Ok(()), |(name, value)| {
                Err(ConfigError::NonFinite { name, value })
            })
    }

    /// Loads the weights if the file exists, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No weight file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Saves the weights to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the weights cannot be serialized to TOML or if the
    /// file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

const fn default_non_wish_malus() -> f64 {
    -10.0
}

const fn default_mark_bonus() -> f64 {
    1.0
}

const fn default_null_rating() -> f64 {
    3.0
}

const fn default_rating_factor() -> f64 {
    0.5
}

/// The serialized versions of the weight file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_non_wish_malus")]
        non_wish_malus: f64,

        #[serde(default = "default_mark_bonus")]
        mark_bonus: f64,

        #[serde(default = "default_null_rating")]
        null_rating: f64,

        #[serde(default = "default_rating_factor")]
        rating_factor: f64,
    },
}

impl From<Versions> for WeightConfig {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                non_wish_malus,
                mark_bonus,
                null_rating,
                rating_factor,
            } => Self {
                non_wish_malus,
                mark_bonus,
                null_rating,
                rating_factor,
            },
        }
    }
}

impl From<WeightConfig> for Versions {
    fn from(config: WeightConfig) -> Self {
        Self::V1 {
            non_wish_malus: config.non_wish_malus,
            mark_bonus: config.mark_bonus,
            null_rating: config.null_rating,
            rating_factor: config.rating_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nnon_wish_malus = 5.0\nmark_bonus = 0.0\nnull_rating = 3.0\nrating_factor = 0.0\n",
        )
        .unwrap();

        let config = WeightConfig::load(file.path()).unwrap();

        assert!((config.non_wish_malus - 5.0).abs() < f64::EPSILON);
        assert!(config.mark_bonus.abs() < f64::EPSILON);
        assert!((config.null_rating - 3.0).abs() < f64::EPSILON);
        assert!(config.rating_factor.abs() < f64::EPSILON);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = WeightConfig::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let config = WeightConfig::load_or_default(&missing).unwrap();
        assert_eq!(config, WeightConfig::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nmark_bonus = \"lots\"\n")
            .unwrap();

        let error = WeightConfig::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test_case("mark_bonus = nan", "mark_bonus" ; "nan")]
    #[test_case("rating_factor = inf", "rating_factor" ; "infinity")]
    #[test_case("non_wish_malus = -inf", "non_wish_malus" ; "negative infinity")]
    fn load_rejects_non_finite_weights(line: &str, field: &str) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "_version = \"1\"\n{line}").unwrap();

        let error = WeightConfig::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::NonFinite { name, .. } if name == field));
    }

    #[test]
    fn version_only_file_returns_default() {
        let expected = WeightConfig::default();
        let actual: WeightConfig = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("weights.toml");
        let config = WeightConfig {
            non_wish_malus: -20.0,
            ..WeightConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(WeightConfig::load(&path).unwrap(), config);
    }
}
