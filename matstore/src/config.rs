//! Store configuration

use matstore_core::{Distribution, DEFAULT_DATASET};

/// How ranks obtain a full local copy on read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LocalReadStrategy {
    /// Every rank parses the file independently
    #[default]
    Replicated,
    /// Rank 0 parses the file and broadcasts the result
    RootBroadcast,
}

/// Configuration shared by every codec of a store
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Strategy for reads into local representations
    pub local_read: LocalReadStrategy,
    /// Dataset name inside `hdf5` containers
    pub dataset: String,
    /// Column separator for `txt` files; whitespace matches any run of it
    pub delimiter: char,
    /// Digits after the decimal point in scientific notation; shortest
    /// round-trip formatting when unset
    pub precision: Option<usize>,
    /// Layout of distributed dense reads when the caller names none
    pub default_distribution: Distribution,
    /// LIBSVM feature indices start at 0
    pub libsvm_zero_based: bool,
    /// Minimum feature count for LIBSVM reads
    pub libsvm_n_features: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            local_read: LocalReadStrategy::Replicated,
            dataset: DEFAULT_DATASET.to_string(),
            delimiter: ' ',
            precision: None,
            default_distribution: Distribution::default(),
            libsvm_zero_based: false,
            libsvm_n_features: None,
        }
    }
}

impl StoreConfig {
    /// Set the local read strategy
    pub fn with_local_read(mut self, strategy: LocalReadStrategy) -> Self {
        self.local_read = strategy;
        self
    }

    /// Set the container dataset name
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    /// Set the text column separator
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write values in scientific notation with `digits` decimals
    pub fn with_precision(mut self, digits: usize) -> Self {
        self.precision = Some(digits);
        self
    }

    /// Set the fallback layout for distributed dense reads
    pub fn with_default_distribution(mut self, distribution: Distribution) -> Self {
        self.default_distribution = distribution;
        self
    }

    /// Treat LIBSVM feature indices as 0-based
    pub fn with_libsvm_zero_based(mut self, zero_based: bool) -> Self {
        self.libsvm_zero_based = zero_based;
        self
    }

    /// Widen LIBSVM feature matrices to at least `n_features` columns
    pub fn with_libsvm_n_features(mut self, n_features: usize) -> Self {
        self.libsvm_n_features = Some(n_features);
        self
    }

    /// Parse a configuration from JSON; missing fields take defaults
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let json =
            std::fs::read_to_string(path).map_err(|source| crate::StoreError::io(path, source))?;
        Self::from_json_str(&json)
    }

    /// Format one value the way text codecs write it
    ///
    /// Without a precision the output is the shortest text that parses
    /// back to the same value; very large or small magnitudes switch to
    /// scientific notation.
    pub(crate) fn format_value(&self, value: f64) -> String {
        match self.precision {
            Some(digits) => format!("{value:.digits$e}"),
            None if value == 0.0 || (1e-5..1e16).contains(&value.abs()) => format!("{value}"),
            None => format!("{value:e}"),
        }
    }
}

/// Per-call read options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Layout for distributed dense targets; other targets ignore it
    pub distribution: Option<Distribution>,
}

impl ReadOptions {
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Requested layout, or the configured fallback
    pub fn distribution_or(&self, config: &StoreConfig) -> Distribution {
        self.distribution.unwrap_or(config.default_distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = StoreConfig::default()
            .with_dataset("A")
            .with_delimiter(',')
            .with_precision(3)
            .with_local_read(LocalReadStrategy::RootBroadcast);
        assert_eq!(config.dataset, "A");
        assert_eq!(config.format_value(1.5), "1.500e0");
        assert_eq!(StoreConfig::default().format_value(0.1), "0.1");
        assert_eq!(StoreConfig::default().format_value(-3.0), "-3");
        assert_eq!(StoreConfig::default().format_value(-1e-300), "-1e-300");
    }

    #[test]
    fn test_read_options_fallback() {
        let config = StoreConfig::default().with_default_distribution(Distribution::RowBlock);
        assert_eq!(ReadOptions::default().distribution_or(&config), Distribution::RowBlock);
        let options = ReadOptions::default().with_distribution(Distribution::Root);
        assert_eq!(options.distribution_or(&config), Distribution::Root);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_config() {
        let config = StoreConfig::from_json_str(
            r#"{"dataset": "weights", "local_read": "root-broadcast", "default_distribution": "row-block"}"#,
        )
        .unwrap();
        assert_eq!(config.dataset, "weights");
        assert_eq!(config.local_read, LocalReadStrategy::RootBroadcast);
        assert_eq!(config.default_distribution, Distribution::RowBlock);
        assert_eq!(config.delimiter, ' ');

        assert!(StoreConfig::from_json_str("{\"precision\": \"many\"}").is_err());
    }
}
