//! JSON tool configuration.
//!
//! ```json
//! {
//!   "tools": [
//!     { "name": "Probe", "id": 1,
//!       "coordinates": [["0.0", "0.0", "0.0"], [0.05, 0, 0], [0.05, 0.08, 0]] }
//!   ],
//!   "tracker": { "method": "refine_by_scaling" }
//! }
//! ```
//!
//! Coordinates are meters in the tool frame and may be numbers or numeric
//! strings. Malformed tool entries are skipped with a warning; only a
//! document that is not JSON or has no `tools` array is an error.

use std::fs;
use std::path::Path;

use ir_tracker_match::dedup_indices;
use nalgebra::Point3;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dictionary::ToolDictionary;
use crate::error::ConfigError;
use crate::params::TrackerParams;
use crate::tool::{ToolId, TrackedTool};

/// One tool entry as written in the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(default)]
    pub name: String,
    pub id: ToolId,
    #[serde(deserialize_with = "deserialize_coordinates")]
    pub coordinates: Vec<[f64; 3]>,
}

impl ToolSpec {
    pub fn geometry(&self) -> Vec<Point3<f64>> {
        self.coordinates
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect()
    }
}

/// Loaded configuration: the usable tool entries plus tracker tunables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub tools: Vec<ToolSpec>,
    #[serde(default)]
    pub tracker: TrackerParams,
    /// Tool entries dropped while parsing.
    #[serde(skip)]
    pub skipped_entries: usize,
}

impl TrackerConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let doc: Value = serde_json::from_str(raw)?;
        let entries = doc
            .get("tools")
            .and_then(Value::as_array)
            .ok_or(ConfigError::MissingTools)?;

        let tracker = match doc.get("tracker") {
            Some(v) => TrackerParams::deserialize(v)?,
            None => TrackerParams::default(),
        };

        let mut tools = Vec::with_capacity(entries.len());
        let mut skipped_entries = 0;
        for (i, entry) in entries.iter().enumerate() {
            match ToolSpec::deserialize(entry) {
                Ok(spec) => tools.push(spec),
                Err(e) => {
                    log::warn!("skipping tool entry #{i}: {e}");
                    skipped_entries += 1;
                }
            }
        }

        Ok(Self {
            tools,
            tracker,
            skipped_entries,
        })
    }

    /// Build the tool dictionary.
    ///
    /// Geometry is deduplicated with the matcher's duplicate tolerance; tools
    /// left with fewer than 3 markers are dropped, and for repeated ids the
    /// first entry wins.
    pub fn build_dictionary(&self) -> ToolDictionary {
        let tol = self.tracker.correspondence.duplicate_tolerance;
        let mut dict = ToolDictionary::new();

        for spec in &self.tools {
            let raw = spec.geometry();
            let geometry: Vec<Point3<f64>> =
                dedup_indices(&raw, tol).into_iter().map(|i| raw[i]).collect();
            if geometry.len() < 3 {
                log::warn!(
                    "skipping tool {} ({:?}): {} distinct markers, need at least 3",
                    spec.id,
                    spec.name,
                    geometry.len()
                );
                continue;
            }
            if geometry.len() != raw.len() {
                log::warn!(
                    "tool {}: dropped {} duplicate markers",
                    spec.id,
                    raw.len() - geometry.len()
                );
            }
            if !dict.insert(TrackedTool::new(spec.id, spec.name.clone(), geometry)) {
                log::warn!("duplicate tool id {} ({:?}) ignored", spec.id, spec.name);
            }
        }

        dict
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Result<f64, String> {
        let v = match self {
            Coordinate::Number(v) => *v,
            Coordinate::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid coordinate {s:?}: {e}"))?,
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(format!("non-finite coordinate {v}"))
        }
    }
}

fn deserialize_coordinates<'de, D>(deserializer: D) -> Result<Vec<[f64; 3]>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<[Coordinate; 3]>::deserialize(deserializer)?;
    raw.iter()
        .map(|[x, y, z]| -> Result<[f64; 3], String> {
            Ok([x.value()?, y.value()?, z.value()?])
        })
        .collect::<Result<_, _>>()
        .map_err(de::Error::custom)
}
