use baccarat::{Label, SimulationConfig, WeightTable};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use thiserror::Error;
use tracing::warn;

pub const MIN_DECKS: u8 = 1;
pub const MAX_DECKS: u8 = 12;
pub const DEFAULT_DECKS: u8 = 8;
pub const MIN_ITERATIONS: u32 = 100;
pub const MAX_ITERATIONS: u32 = 200_000;
pub const DEFAULT_ITERATIONS: u32 = 20_000;

/// Weights as written in the config file: card symbol to number. Entries are
/// read leniently, see `apply_weights`.
pub type ConfigWeights = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weights: ConfigWeights,
    pub simulation: ConfigSimulation,
    pub presets: BTreeMap<String, ConfigWeights>,
}

/// `decks` and `iterations` take any YAML value. Numbers are truncated, and
/// anything else falls back to the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSimulation {
    pub decks: Value,
    pub iterations: Value,
    pub number_of_threads: usize,
    pub seed: Option<u64>,
}

impl Default for ConfigSimulation {
    fn default() -> Self {
        Self {
            decks: Value::from(DEFAULT_DECKS),
            iterations: Value::from(DEFAULT_ITERATIONS),
            number_of_threads: 0,
            seed: None,
        }
    }
}

impl ConfigSimulation {
    /// Clamps the deck count to [1, 12] and the iterations to [100, 200000].
    pub fn to_simulation_config(&self) -> SimulationConfig {
        let decks = read_setting("decks", &self.decks, DEFAULT_DECKS as f64)
            .clamp(MIN_DECKS as f64, MAX_DECKS as f64) as u8;
        let iterations = read_setting("iterations", &self.iterations, DEFAULT_ITERATIONS as f64)
            .clamp(MIN_ITERATIONS as f64, MAX_ITERATIONS as f64) as u32;
        let mut config =
            SimulationConfig::new(decks, iterations).with_threads(self.number_of_threads);
        config.seed = self.seed;
        config
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no preset named {0:?}")]
    UnknownPreset(String),
}

impl Config {
    /// The default weight table overridden by the `weights` section, and then
    /// by the named preset if one is given.
    pub fn weight_table(&self, preset: Option<&str>) -> Result<WeightTable, ConfigError> {
        let table = apply_weights(WeightTable::default(), &self.weights);
        match preset {
            None => Ok(table),
            Some(name) => {
                let preset = self
                    .presets
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
                Ok(apply_weights(table, preset))
            }
        }
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

/// A finite YAML number truncated toward zero.
fn read_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite()).map(f64::trunc)
}

fn read_setting(name: &str, value: &Value, default: f64) -> f64 {
    match read_number(value) {
        Some(number) => number,
        None => {
            if !value.is_null() {
                warn!(setting = name, ?value, "ignoring non-numeric setting, using default");
            }
            default
        }
    }
}

/// Overrides `table` with the entries of `weights`. Only the 10 card symbols
/// are read. Values are truncated toward zero and clamped to the `i32`
/// range; non-numeric and non-finite values are skipped.
pub fn apply_weights(table: WeightTable, weights: &ConfigWeights) -> WeightTable {
    let entries = weights.iter().filter_map(|(symbol, value)| {
        let label = match Label::from_symbol(symbol) {
            Ok(label) => label,
            Err(err) => {
                warn!(%err, "ignoring weight entry");
                return None;
            }
        };
        let Some(number) = read_number(value) else {
            warn!(label = label.symbol(), ?value, "ignoring weight that is not a finite number");
            return None;
        };
        let weight = number.clamp(i32::MIN as f64, i32::MAX as f64);
        if weight != number {
            warn!(label = label.symbol(), number, weight, "weight clamped");
        }
        Some((label, weight as i32))
    });
    table.with_overrides(entries)
}

pub fn parse_config_from_str(content: &str) -> Result<Config, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> Result<Config, ConfigError> {
    let file_content = fs::read_to_string(filename).map_err(|source| ConfigError::Io {
        path: filename.to_string(),
        source,
    })?;
    parse_config_from_str(&file_content)
}
