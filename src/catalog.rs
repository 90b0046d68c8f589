use crate::value::EntryValue;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// The five game-data tables the host exposes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Items,
    Jobs,
    Gangs,
    Vehicles,
    Weapons,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Items,
        Category::Jobs,
        Category::Gangs,
        Category::Vehicles,
        Category::Weapons,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Items => "items",
            Category::Jobs => "jobs",
            Category::Gangs => "gangs",
            Category::Vehicles => "vehicles",
            Category::Weapons => "weapons",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category's table: entry key -> entry value.
pub type Snapshot = IndexMap<String, EntryValue>;

/// Everything the host last pushed. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelData {
    #[serde(deserialize_with = "lenient_snapshot")]
    pub items: Snapshot,
    #[serde(deserialize_with = "lenient_snapshot")]
    pub jobs: Snapshot,
    #[serde(deserialize_with = "lenient_snapshot")]
    pub gangs: Snapshot,
    #[serde(deserialize_with = "lenient_snapshot")]
    pub vehicles: Snapshot,
    #[serde(deserialize_with = "lenient_snapshot")]
    pub weapons: Snapshot,
}

/// Accepts a table in any shape a host JSON encoder produces. An empty Lua
/// table often arrives as `[]`, and a list is keyed by its indices.
fn lenient_snapshot<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Snapshot, D::Error> {
    match EntryValue::deserialize(deserializer)? {
        EntryValue::Object(map) => Ok(map),
        EntryValue::Null => Ok(Snapshot::new()),
        EntryValue::Array(values) => Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect()),
        other => Err(de::Error::custom(format!(
            "expected a table of entries, found {}",
            other.type_name()
        ))),
    }
}

impl PanelData {
    pub fn snapshot(&self, category: Category) -> &Snapshot {
        match category {
            Category::Items => &self.items,
            Category::Jobs => &self.jobs,
            Category::Gangs => &self.gangs,
            Category::Vehicles => &self.vehicles,
            Category::Weapons => &self.weapons,
        }
    }

    pub fn entry(&self, category: Category, key: &str) -> Option<&EntryValue> {
        self.snapshot(category).get(key)
    }

    pub fn entry_count(&self) -> usize {
        Category::ALL
            .into_iter()
            .map(|c| self.snapshot(c).len())
            .sum()
    }

    /// Keys of `category` containing `query` (case-insensitive), sorted.
    pub fn filter_keys(&self, category: Category, query: &str) -> Vec<String> {
        filter_keys(self.snapshot(category).keys(), query)
    }
}

pub fn filter_keys<'a>(keys: impl IntoIterator<Item = &'a String>, query: &str) -> Vec<String> {
    let query_lower = query.trim().to_lowercase();
    let mut out: Vec<String> = keys
        .into_iter()
        .filter(|k| query_lower.is_empty() || k.to_lowercase().contains(&query_lower))
        .cloned()
        .collect();
    out.sort();
    out
}
