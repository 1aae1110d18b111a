use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name of the persisted mistakes document. The file backend stores it as
/// `mistakes.v4.json`; other backends may use the bare name as their slot key.
pub const STORE_NAME: &str = "mistakes.v4";

pub const DEFAULT_UI_LANG: &str = "ru";
pub const DEFAULT_STUDY_LANG: &str = "de";
pub const DEFAULT_STARS_MAX: u32 = 5;

/// A word as exchanged with the dictionary registry and the UI layer.
/// Only `id` and the two origin-key fields are interpreted here; everything
/// else a collection puts on a word (term, translation, examples) survives
/// untouched in `extra` so a materialized copy loses nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(
        rename = "_mistakeSourceKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mistake_source_key: Option<String>,
    #[serde(
        rename = "_favoriteSourceKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub favorite_source_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WordRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_source_key(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mistake_source_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// String payload field carried in `extra`, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}

/// Word ids compare by string form; collections are free to ship them as
/// JSON numbers.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "word id must be a string or number, got {other}"
        ))),
    }
}

/// The isolated storage unit for one (UI language, study language) pair.
///
/// `items` and `sources` are two views of the same membership: an id under
/// `items[key]` is mapped back by `sources[id]`, and an id belongs to exactly
/// one source key. `insert`/`remove` keep both sides in step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(default)]
    pub items: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(default)]
    pub stars: BTreeMap<String, BTreeMap<String, u32>>,
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

impl Bucket {
    pub fn contains(&self, key: &str, id: &str) -> bool {
        self.items.get(key).is_some_and(|ids| ids.contains_key(id))
    }

    pub fn insert(&mut self, key: &str, id: &str) {
        self.items
            .entry(key.to_string())
            .or_default()
            .insert(id.to_string(), true);
        self.sources.insert(id.to_string(), key.to_string());
    }

    /// Drops an id from membership, ratings and the reverse index. Per-key
    /// sub-maps left empty are pruned. Returns false for unknown ids.
    pub fn remove(&mut self, id: &str) -> bool {
        let key = match self.sources.remove(id) {
            Some(key) => key,
            None => return false,
        };
        if let Some(ids) = self.items.get_mut(&key) {
            ids.remove(id);
            if ids.is_empty() {
                self.items.remove(&key);
            }
        }
        if let Some(ratings) = self.stars.get_mut(&key) {
            ratings.remove(id);
            if ratings.is_empty() {
                self.stars.remove(&key);
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.stars.is_empty() && self.sources.is_empty()
    }
}

/// The whole persisted document: UI language -> study language -> bucket.
/// BTreeMap keeps the serialized form stable across saves.
pub type MistakesDoc = BTreeMap<String, BTreeMap<String, Bucket>>;

/// Buckets are created lazily on first access and never merged across pairs.
pub fn ensure_bucket<'a>(
    doc: &'a mut MistakesDoc,
    ui_lang: &str,
    study_lang: &str,
) -> &'a mut Bucket {
    doc.entry(ui_lang.to_string())
        .or_default()
        .entry(study_lang.to_string())
        .or_default()
}

/// Summary over the active bucket. `count` is the number of ids that still
/// resolve to a live word, `tracked` counts stored ids including stale ones,
/// `collections` the distinct source keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MistakesStats {
    pub count: usize,
    pub tracked: usize,
    pub collections: usize,
}
