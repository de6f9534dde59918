//! Shorts dataset structures and JSON persistence

use crate::Result;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::io::{Read, Write};
use tracing::warn;

/// Null or wrong-typed values decode to the field's default
fn or_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(de)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Keep the string items of a list, anything else is an empty list
fn string_list<'de, D>(de: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Value::deserialize(de)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(list)
}

/// Decode each short on its own, skipping records that are not objects
fn short_list<'de, D>(de: D) -> std::result::Result<Vec<Short>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(de)? else {
        return Ok(Vec::new());
    };

    let shorts = items
        .into_iter()
        .filter_map(|item| match Short::deserialize(item) {
            Ok(short) => Some(short),
            Err(e) => {
                warn!("Skipping malformed short record: {}", e);
                None
            }
        })
        .collect();
    Ok(shorts)
}

/// Decode each group entry, remembering whether it carried a `shorts` field
fn group_map<'de, D>(de: D) -> std::result::Result<IndexMap<String, GroupEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(de)?;

    let groups = raw
        .into_iter()
        .map(|(key, value)| {
            let shorts_listed = value.get("shorts").is_some();
            let mut entry = GroupEntry::deserialize(value).unwrap_or_else(|e| {
                warn!("Group '{}' is malformed, keeping it empty: {}", key, e);
                GroupEntry::default()
            });
            entry.shorts_listed = shorts_listed;
            (key, entry)
        })
        .collect();
    Ok(groups)
}

/// A single short-form video record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Short {
    #[serde(deserialize_with = "or_default")]
    pub video_id: String,
    #[serde(deserialize_with = "or_default")]
    pub title: String,
    #[serde(deserialize_with = "or_default")]
    pub channel: String,

    /// Publish time formatted as `%Y-%m-%d %H:%M:%S`
    #[serde(deserialize_with = "or_default")]
    pub upload_time: String,

    #[serde(deserialize_with = "or_default")]
    pub views: u64,
    #[serde(deserialize_with = "or_default")]
    pub likes: u64,
    #[serde(deserialize_with = "or_default")]
    pub comments: u64,

    /// Hashtags in source order, each starting with `#`
    #[serde(deserialize_with = "string_list")]
    pub hashtags: Vec<String>,

    #[serde(deserialize_with = "or_default")]
    pub url: String,

    /// Fields we do not model, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Short {
    pub fn new(video_id: &str, title: &str, hashtags: &[&str]) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: title.to_string(),
            hashtags: hashtags.iter().map(|t| t.to_string()).collect(),
            url: format!("https://www.youtube.com/shorts/{}", video_id),
            ..Self::default()
        }
    }
}

/// Per-group entry of the working dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupEntry {
    #[serde(deserialize_with = "or_default")]
    pub korean_name: String,
    #[serde(deserialize_with = "or_default")]
    pub channel_id: String,
    #[serde(deserialize_with = "or_default")]
    pub channel_url: String,
    #[serde(deserialize_with = "or_default")]
    pub shorts_count: usize,
    #[serde(deserialize_with = "short_list")]
    pub shorts: Vec<Short>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Whether the source entry had a `shorts` field at all
    #[serde(skip)]
    pub shorts_listed: bool,
}

impl GroupEntry {
    /// Build an entry whose count matches its shorts
    pub fn new(korean_name: &str, channel_id: &str, channel_url: &str, shorts: Vec<Short>) -> Self {
        Self {
            korean_name: korean_name.to_string(),
            channel_id: channel_id.to_string(),
            channel_url: channel_url.to_string(),
            shorts_count: shorts.len(),
            shorts,
            extra: Map::new(),
            shorts_listed: true,
        }
    }

    /// Copy of this entry with every non-shorts field kept and no shorts
    pub fn empty_like(&self) -> Self {
        Self {
            korean_name: self.korean_name.clone(),
            channel_id: self.channel_id.clone(),
            channel_url: self.channel_url.clone(),
            shorts_count: 0,
            shorts: Vec::new(),
            extra: self.extra.clone(),
            shorts_listed: true,
        }
    }

    pub fn push(&mut self, short: Short) {
        self.shorts_listed = true;
        self.shorts.push(short);
        self.shorts_count = self.shorts.len();
    }

    pub fn is_consistent(&self) -> bool {
        self.shorts_count == self.shorts.len()
    }
}

/// Insertion-ordered mapping from group key to its entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Dataset {
    #[serde(deserialize_with = "group_map")]
    groups: IndexMap<String, GroupEntry>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Pretty JSON with non-ASCII text kept as-is
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: GroupEntry) -> Option<GroupEntry> {
        self.groups.insert(key.into(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&GroupEntry> {
        self.groups.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut GroupEntry> {
        self.groups.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<GroupEntry> {
        self.groups.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GroupEntry)> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut GroupEntry)> {
        self.groups.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    /// Drop groups whose count is zero
    pub fn retain_non_empty(&mut self) {
        self.groups.retain(|_, entry| entry.shorts_count > 0);
    }

    /// Sum of every group's `shorts_count`
    pub fn total_shorts(&self) -> usize {
        self.groups.values().map(|entry| entry.shorts_count).sum()
    }

    /// Merge `other` into this dataset; entries of `other` replace same-key entries
    pub fn merge(&mut self, other: Dataset) {
        for (key, entry) in other.groups {
            self.groups.insert(key, entry);
        }
    }
}

impl FromIterator<(String, GroupEntry)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (String, GroupEntry)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
