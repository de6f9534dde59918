//! Challenge classifiers
//!
//! Three generations are kept side by side so their partitions can be
//! compared on the same dataset:
//!
//! - [`GlobalLookupClassifier`]: resolves every tag through the
//!   last-write-wins owner of the alias table.
//! - [`RosterClassifier`]: home-group aliases take priority, remaining tags
//!   are resolved against every candidate owner.
//! - [`KeywordClassifier`]: ignores the roster and looks for a keyword.

use crate::{AliasIndex, CoreError, Short};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decides whether a short is a challenge video for its home group
pub trait ChallengeClassifier {
    /// Short strategy name used in logs
    fn name(&self) -> &'static str;

    /// `group` is the dataset key the short was collected under
    fn classify(&self, short: &Short, group: &str) -> bool;
}

/// Strip a single leading `#` and lower-case
pub fn normalize_tag(tag: &str) -> String {
    tag.strip_prefix('#').unwrap_or(tag).to_lowercase()
}

/// Original global lookup: each alias resolves to exactly one group
#[derive(Debug, Clone, Copy)]
pub struct GlobalLookupClassifier<'a> {
    index: &'a AliasIndex,
}

impl<'a> GlobalLookupClassifier<'a> {
    pub fn new(index: &'a AliasIndex) -> Self {
        Self { index }
    }

    pub fn classify_tags(&self, hashtags: &[String], current_group: &str) -> bool {
        let current_group = current_group.to_lowercase();
        let mut found_own_group = false;
        let mut found_other_group = false;

        for tag in hashtags {
            if let Some(owner) = self.index.last_owner(&normalize_tag(tag)) {
                if owner == current_group {
                    found_own_group = true;
                } else {
                    found_other_group = true;
                }
            }
        }

        found_own_group && found_other_group
    }
}

impl ChallengeClassifier for GlobalLookupClassifier<'_> {
    fn name(&self) -> &'static str {
        "global"
    }

    fn classify(&self, short: &Short, group: &str) -> bool {
        self.classify_tags(&short.hashtags, group)
    }
}

/// Priority rule: a tag naming the home group (or one of its members) is
/// always counted as the home group, even when another group registered
/// the same alias.
#[derive(Debug, Clone, Copy)]
pub struct RosterClassifier<'a> {
    index: &'a AliasIndex,
}

impl<'a> RosterClassifier<'a> {
    pub fn new(index: &'a AliasIndex) -> Self {
        Self { index }
    }

    pub fn classify_tags(&self, hashtags: &[String], current_group: &str) -> bool {
        let current_group = current_group.to_lowercase();
        let own_aliases = self.index.own_aliases(&current_group);

        let mut found_own_group = false;
        let mut found_other_group = false;

        for tag in hashtags {
            let tag = normalize_tag(tag);

            if own_aliases.contains(tag.as_str()) {
                found_own_group = true;
                continue;
            }

            let owners = self.index.groups_for(&tag);
            if owners.is_empty() {
                continue;
            }
            if owners.iter().any(|owner| *owner == current_group) {
                found_own_group = true;
            } else {
                found_other_group = true;
            }

            if found_own_group && found_other_group {
                break;
            }
        }

        found_own_group && found_other_group
    }
}

impl ChallengeClassifier for RosterClassifier<'_> {
    fn name(&self) -> &'static str {
        "roster"
    }

    fn classify(&self, short: &Short, group: &str) -> bool {
        self.classify_tags(&short.hashtags, group)
    }
}

/// Substring match of a keyword against every hashtag
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keyword: String,
}

impl KeywordClassifier {
    pub const DEFAULT_KEYWORD: &'static str = "challenge";

    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn classify_tags(&self, hashtags: &[String]) -> bool {
        hashtags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&self.keyword))
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEYWORD)
    }
}

impl ChallengeClassifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn classify(&self, short: &Short, _group: &str) -> bool {
        self.classify_tags(&short.hashtags)
    }
}

/// Selectable classifier strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Last-write-wins alias lookup
    Global,
    /// Home-group priority over the alias index
    #[default]
    Roster,
    /// Keyword substring match
    Keyword,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 3] = [Self::Global, Self::Roster, Self::Keyword];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Roster => "roster",
            Self::Keyword => "keyword",
        }
    }

    /// Whether the strategy reads the roster
    pub fn needs_roster(&self) -> bool {
        !matches!(self, Self::Keyword)
    }

    /// Instantiate the strategy. `keyword` is only read by [`Self::Keyword`].
    pub fn build<'a>(
        &self,
        index: Option<&'a AliasIndex>,
        keyword: &str,
    ) -> Result<Box<dyn ChallengeClassifier + 'a>, CoreError> {
        match (self, index) {
            (Self::Global, Some(index)) => Ok(Box::new(GlobalLookupClassifier::new(index))),
            (Self::Roster, Some(index)) => Ok(Box::new(RosterClassifier::new(index))),
            (Self::Keyword, _) => Ok(Box::new(KeywordClassifier::new(keyword))),
            (kind, None) => Err(CoreError::IndexRequired(kind.to_string())),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" | "v0" => Ok(Self::Global),
            "roster" | "v1" => Ok(Self::Roster),
            "keyword" | "v2" => Ok(Self::Keyword),
            other => Err(CoreError::UnknownStrategy(other.to_string())),
        }
    }
}
