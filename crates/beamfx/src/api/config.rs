use serde::{Deserialize, Serialize};

/// Configuration for the beam subsystem, provided by the embedding game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BeamConfig {
    /// Shared beam atlas.
    pub image: ImageConfig,
    /// Seed for crackle jitter (default: 42).
    pub seed: u64,
    /// Initial capacity of the packed segment buffer (default: 256).
    pub max_segment_instances: usize,
}

/// Where beam segments take their pixels from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    /// Atlas filename as known to the host (default: "Beams").
    pub filename: String,
    /// Number of beam rows stacked vertically in the atlas (default: 2).
    pub rows: u32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            image: ImageConfig::default(),
            seed: 42,
            max_segment_instances: 256,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            filename: "Beams".to_owned(),
            rows: 2,
        }
    }
}

impl BeamConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plugin_parameters() {
        let config = BeamConfig::default();
        assert_eq!(config.image.filename, "Beams");
        assert_eq!(config.image.rows, 2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BeamConfig::from_json(r#"{ "image": { "rows": 4 }, "seed": 7 }"#).unwrap();
        assert_eq!(config.image.filename, "Beams");
        assert_eq!(config.image.rows, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_segment_instances, 256);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(BeamConfig::from_json("{}").unwrap(), BeamConfig::default());
    }
}
