//! Simulation bounds resolution.
//!
//! Bounds come from the `sim_config` resource next to the datasets. Any
//! retrieval or structural failure falls back to a fixed range so playback
//! always has a usable domain; the failure is logged, never propagated.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::DatasetProvider;

/// Resource name of the bounds configuration document.
pub const CONFIG_RESOURCE: &str = "sim_config";

/// Bounds used when the configuration source is absent or malformed:
/// 23:00 to 26:00 in simulated minutes.
pub const FALLBACK_BOUNDS: SimulationBounds = SimulationBounds {
    min: 1380.0,
    max: 1560.0,
};

/// The `[min, max]` simulated-minute range playback runs over. Loaded once at
/// startup; read-only everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBounds {
    pub min: f64,
    pub max: f64,
}

impl SimulationBounds {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Deserialize)]
struct SimConfigFile {
    #[serde(rename = "TIME_RANGE_START")]
    time_range_start: i64,
    #[serde(rename = "TIME_RANGE_END")]
    time_range_end: i64,
}

/// Resolves playback bounds from the configuration source.
///
/// Fetch errors, parse errors, and inverted ranges (treated as malformed) all
/// yield [FALLBACK_BOUNDS]; this function cannot fail.
pub fn resolve_bounds(provider: &dyn DatasetProvider) -> SimulationBounds {
    let text = match provider.fetch(CONFIG_RESOURCE) {
        Ok(text) => text,
        Err(err) => {
            warn!("config fetch failed, using fallback bounds: {err}");
            return FALLBACK_BOUNDS;
        }
    };

    let config: SimConfigFile = match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(err) => {
            warn!("config parse failed, using fallback bounds: {err}");
            return FALLBACK_BOUNDS;
        }
    };

    if config.time_range_start >= config.time_range_end {
        warn!(
            start = config.time_range_start,
            end = config.time_range_end,
            "config time range is inverted or empty, using fallback bounds"
        );
        return FALLBACK_BOUNDS;
    }

    let bounds = SimulationBounds {
        min: config.time_range_start as f64,
        max: config.time_range_end as f64,
    };
    debug!(min = bounds.min, max = bounds.max, "simulation bounds resolved");
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticDatasetProvider;

    #[test]
    fn well_formed_config_resolves() {
        let provider = StaticDatasetProvider::new().with(
            CONFIG_RESOURCE,
            r#"{"TIME_RANGE_START": 1080, "TIME_RANGE_END": 1260}"#,
        );
        let bounds = resolve_bounds(&provider);
        assert_eq!(bounds, SimulationBounds { min: 1080.0, max: 1260.0 });
    }

    #[test]
    fn extra_config_fields_are_ignored() {
        let provider = StaticDatasetProvider::new().with(
            CONFIG_RESOURCE,
            r#"{"TIME_RANGE_START": 0, "TIME_RANGE_END": 1440, "BASE_DATE": "2024-04-18"}"#,
        );
        let bounds = resolve_bounds(&provider);
        assert_eq!(bounds.span(), 1440.0);
    }

    #[test]
    fn missing_config_falls_back() {
        let provider = StaticDatasetProvider::new();
        assert_eq!(resolve_bounds(&provider), FALLBACK_BOUNDS);
    }

    #[test]
    fn malformed_config_falls_back() {
        let provider = StaticDatasetProvider::new().with(CONFIG_RESOURCE, "not json at all");
        assert_eq!(resolve_bounds(&provider), FALLBACK_BOUNDS);
    }

    #[test]
    fn inverted_range_falls_back() {
        let provider = StaticDatasetProvider::new().with(
            CONFIG_RESOURCE,
            r#"{"TIME_RANGE_START": 1560, "TIME_RANGE_END": 1380}"#,
        );
        assert_eq!(resolve_bounds(&provider), FALLBACK_BOUNDS);
    }
}
