//! Alias index: resolves performer and group names to canonical groups
//!
//! Every alias (performer or group name, either language, lower-cased) maps
//! to the list of canonical groups that registered it. Most aliases have a
//! single owner; a shared performer name keeps all of its owners so callers
//! can disambiguate with the home group instead of trusting whichever row
//! happened to be read last.

use crate::{CoreError, Result, RosterRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Bidirectional lookup between aliases and canonical group identifiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasIndex {
    /// Alias -> candidate groups, insertion order, most recent writer last
    name_to_group: HashMap<String, Vec<String>>,

    /// Canonical group -> member aliases (both languages)
    group_to_members: HashMap<String, HashSet<String>>,

    /// Canonical group -> group-level aliases (canonical id, localized name)
    group_aliases: HashMap<String, HashSet<String>>,
}

impl AliasIndex {
    /// Build the index from roster rows.
    ///
    /// Blank performer names and rows without a group are skipped. Fails with
    /// [`CoreError::MissingGroupRow`] if no row of a canonical group supplies
    /// a korean group name.
    pub fn build(roster: &[RosterRecord]) -> Result<Self> {
        let mut index = Self::default();
        let mut group_order: Vec<String> = Vec::new();

        for record in roster {
            if record.group_en.trim().is_empty() {
                warn!("Skipping roster row '{}' without a group", record.name_en);
                continue;
            }

            let group = record.group_id();
            if !index.group_to_members.contains_key(&group) {
                group_order.push(group.clone());
                index.group_to_members.insert(group.clone(), HashSet::new());
            }

            for name in [&record.name_en, &record.name_ko] {
                if name.trim().is_empty() {
                    continue;
                }
                let name = name.to_lowercase();
                index.register(&name, &group);
                index
                    .group_to_members
                    .entry(group.clone())
                    .or_default()
                    .insert(name);
            }
        }

        for group in &group_order {
            index.register(group, group);

            let korean_group = roster
                .iter()
                .filter(|record| record.group_en.to_lowercase() == *group)
                .find(|record| !record.group_ko.trim().is_empty())
                .map(|record| record.group_ko.to_lowercase())
                .ok_or_else(|| CoreError::MissingGroupRow(group.clone()))?;
            index.register(&korean_group, group);

            let aliases = index.group_aliases.entry(group.clone()).or_default();
            aliases.insert(group.clone());
            aliases.insert(korean_group);
        }

        for (alias, groups) in index.shared_aliases() {
            warn!("Alias '{}' is shared by groups {:?}", alias, groups);
        }

        debug!(
            "Built alias index: {} groups, {} aliases",
            index.group_to_members.len(),
            index.name_to_group.len()
        );

        Ok(index)
    }

    /// Record `group` as the most recent owner of `alias`
    fn register(&mut self, alias: &str, group: &str) {
        if alias.trim().is_empty() {
            return;
        }
        let owners = self.name_to_group.entry(alias.to_string()).or_default();
        owners.retain(|owner| owner != group);
        owners.push(group.to_string());
    }

    /// All candidate groups for an alias, empty if unknown
    pub fn groups_for(&self, alias: &str) -> &[String] {
        self.name_to_group
            .get(alias)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The owner a single-valued table would have kept (last row wins)
    pub fn last_owner(&self, alias: &str) -> Option<&str> {
        self.name_to_group
            .get(alias)
            .and_then(|owners| owners.last())
            .map(String::as_str)
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.name_to_group.contains_key(alias)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.group_to_members.contains_key(group)
    }

    /// Member aliases of a group
    pub fn members(&self, group: &str) -> Option<&HashSet<String>> {
        self.group_to_members.get(group)
    }

    /// Aliases that identify `group` itself: its members, its group-level
    /// names and the identifier. An unknown group yields just `{group}`.
    pub fn own_aliases<'a>(&'a self, group: &'a str) -> HashSet<&'a str> {
        let mut own: HashSet<&str> = HashSet::new();
        own.insert(group);

        if let Some(members) = self.group_to_members.get(group) {
            own.extend(members.iter().map(String::as_str));
        }
        if let Some(aliases) = self.group_aliases.get(group) {
            own.extend(aliases.iter().map(String::as_str));
        }

        own
    }

    /// Aliases registered by more than one group, sorted by alias
    pub fn shared_aliases(&self) -> Vec<(&str, &[String])> {
        let mut shared: Vec<(&str, &[String])> = self
            .name_to_group
            .iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(alias, owners)| (alias.as_str(), owners.as_slice()))
            .collect();
        shared.sort_by(|a, b| a.0.cmp(b.0));
        shared
    }

    /// Canonical group identifiers, sorted
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self.group_to_members.keys().map(String::as_str).collect();
        groups.sort_unstable();
        groups
    }

    /// Every alias key of the name table
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.name_to_group.keys().map(String::as_str)
    }

    pub fn stats(&self) -> AliasIndexStats {
        AliasIndexStats {
            groups: self.group_to_members.len(),
            aliases: self.name_to_group.len(),
            shared_aliases: self.name_to_group.values().filter(|o| o.len() > 1).count(),
        }
    }
}

/// Statistics about the alias index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AliasIndexStats {
    pub groups: usize,
    pub aliases: usize,
    pub shared_aliases: usize,
}

impl AliasIndexStats {
    pub fn summary(&self) -> String {
        format!(
            "Alias index: {} groups, {} aliases, {} shared",
            self.groups, self.aliases, self.shared_aliases
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<RosterRecord> {
        vec![
            RosterRecord::new("Karina", "카리나", "aespa", "에스파"),
            RosterRecord::new("Winter", "윈터", "aespa", "에스파"),
            RosterRecord::new("Yeji", "예지", "ITZY", "있지"),
        ]
    }

    #[test]
    fn test_build_maps_both_languages() {
        let index = AliasIndex::build(&roster()).unwrap();

        assert_eq!(index.groups_for("karina"), ["aespa"]);
        assert_eq!(index.groups_for("카리나"), ["aespa"]);
        assert_eq!(index.groups_for("itzy"), ["itzy"]);
        assert_eq!(index.groups_for("있지"), ["itzy"]);
        assert!(index.groups_for("nobody").is_empty());
    }

    #[test]
    fn test_group_names_are_not_members() {
        let index = AliasIndex::build(&roster()).unwrap();
        let members = index.members("aespa").unwrap();

        assert_eq!(members.len(), 4);
        assert!(members.contains("winter"));
        assert!(!members.contains("aespa"));
        assert!(!members.contains("에스파"));
    }

    #[test]
    fn test_own_aliases_cover_group_level_names() {
        let index = AliasIndex::build(&roster()).unwrap();
        let own = index.own_aliases("aespa");

        for alias in ["aespa", "에스파", "karina", "카리나", "winter", "윈터"] {
            assert!(own.contains(alias), "missing {}", alias);
        }
        assert!(!own.contains("yeji"));
    }

    #[test]
    fn test_unknown_group_own_aliases() {
        let index = AliasIndex::build(&roster()).unwrap();
        let own = index.own_aliases("newjeans");
        assert_eq!(own.len(), 1);
        assert!(own.contains("newjeans"));
    }

    #[test]
    fn test_shared_alias_keeps_every_owner() {
        let mut rows = roster();
        rows.push(RosterRecord::new("Karina", "카리나", "Other", "아더"));
        let index = AliasIndex::build(&rows).unwrap();

        assert_eq!(index.groups_for("karina"), ["aespa", "other"]);
        assert_eq!(index.last_owner("karina"), Some("other"));
        assert_eq!(index.stats().shared_aliases, 2);
    }

    #[test]
    fn test_missing_group_row_is_error() {
        let mut rows = roster();
        rows.push(RosterRecord::new("Hanni", "하니", "NewJeans", ""));
        rows.push(RosterRecord::new("Minji", "민지", "NEWJEANS", " "));
        let result = AliasIndex::build(&rows);
        assert!(matches!(result, Err(CoreError::MissingGroupRow(g)) if g == "newjeans"));
    }

    #[test]
    fn test_korean_group_name_from_later_row() {
        let mut rows = roster();
        rows.push(RosterRecord::new("Hanni", "하니", "NewJeans", ""));
        rows.push(RosterRecord::new("Minji", "민지", "NewJeans", "뉴진스"));
        let index = AliasIndex::build(&rows).unwrap();
        assert_eq!(index.groups_for("뉴진스"), ["newjeans"]);
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let rows = vec![RosterRecord::new("Lisa", "", "BLACKPINK", "블랙핑크")];
        let index = AliasIndex::build(&rows).unwrap();
        assert!(!index.contains_alias(""));
        assert_eq!(index.members("blackpink").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_roster() {
        let index = AliasIndex::build(&[]).unwrap();
        assert_eq!(index.stats().groups, 0);
        assert_eq!(index.stats().aliases, 0);
    }

    #[test]
    fn test_rows_without_group_are_skipped() {
        let mut rows = roster();
        rows.push(RosterRecord::new("IU", "아이유", "", "솔로"));
        rows.push(RosterRecord::new("Taeyeon", "태연", "  ", "솔로"));
        let index = AliasIndex::build(&rows).unwrap();

        assert!(!index.contains_group(""));
        assert!(!index.contains_alias(""));
        assert!(index.groups_for("iu").is_empty());
        assert!(index.groups_for("솔로").is_empty());
        assert_eq!(index.stats().groups, 2);
    }
}
