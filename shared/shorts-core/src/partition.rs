//! Dataset partitioning into challenge and non-challenge shorts

use crate::{ChallengeClassifier, Dataset};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

/// The two output datasets of a split
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub challenge: Dataset,
    pub non_challenge: Dataset,
    pub summary: PartitionSummary,
}

/// Counts produced by a split
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionSummary {
    /// Classifier strategy name
    pub strategy: String,
    pub groups_seen: usize,
    pub challenge_total: usize,
    pub non_challenge_total: usize,
    /// Group key -> (challenge, non-challenge)
    pub per_group: IndexMap<String, (usize, usize)>,
}

impl PartitionSummary {
    pub fn total(&self) -> usize {
        self.challenge_total + self.non_challenge_total
    }

    pub fn summary(&self) -> String {
        format!(
            "Split with '{}' over {} groups:\n\
            - Total challenge shorts: {}\n\
            - Total non-challenge shorts: {}",
            self.strategy, self.groups_seen, self.challenge_total, self.non_challenge_total
        )
    }
}

/// Route every short of every group through `classifier`.
///
/// Each output entry keeps all non-shorts fields of its input entry and a
/// count equal to its routed shorts. Groups left without shorts are dropped
/// from that output.
pub fn partition(dataset: &Dataset, classifier: &dyn ChallengeClassifier) -> Partition {
    let mut challenge = Dataset::new();
    let mut non_challenge = Dataset::new();
    let mut per_group = IndexMap::new();

    for (group, entry) in dataset.iter() {
        if !entry.is_consistent() {
            warn!(
                "Group '{}' declares {} shorts but lists {}; using the list",
                group,
                entry.shorts_count,
                entry.shorts.len()
            );
        }

        let mut challenge_entry = entry.empty_like();
        let mut non_challenge_entry = entry.empty_like();

        for short in &entry.shorts {
            if classifier.classify(short, group) {
                challenge_entry.push(short.clone());
            } else {
                non_challenge_entry.push(short.clone());
            }
        }

        debug!(
            "{}: {} challenge, {} non-challenge",
            group, challenge_entry.shorts_count, non_challenge_entry.shorts_count
        );
        per_group.insert(
            group.clone(),
            (challenge_entry.shorts_count, non_challenge_entry.shorts_count),
        );

        challenge.insert(group.clone(), challenge_entry);
        non_challenge.insert(group.clone(), non_challenge_entry);
    }

    challenge.retain_non_empty();
    non_challenge.retain_non_empty();

    let summary = PartitionSummary {
        strategy: classifier.name().to_string(),
        groups_seen: dataset.len(),
        challenge_total: challenge.total_shorts(),
        non_challenge_total: non_challenge.total_shorts(),
        per_group,
    };

    Partition {
        challenge,
        non_challenge,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupEntry, KeywordClassifier, Short};

    fn entry(shorts: Vec<Short>) -> GroupEntry {
        GroupEntry::new("에스파", "UC1", "https://www.youtube.com/@aespa", shorts)
    }

    #[test]
    fn test_three_of_five() {
        let mut dataset = Dataset::new();
        dataset.insert(
            "aespa",
            entry(vec![
                Short::new("a", "", &["#challenge"]),
                Short::new("b", "", &["#aespa"]),
                Short::new("c", "", &["#WhiplashChallenge"]),
                Short::new("d", "", &[]),
                Short::new("e", "", &["#dance_challenge"]),
            ]),
        );

        let result = partition(&dataset, &KeywordClassifier::default());
        let challenge = result.challenge.get("aespa").unwrap();
        let non_challenge = result.non_challenge.get("aespa").unwrap();

        assert_eq!(challenge.shorts_count, 3);
        assert_eq!(non_challenge.shorts_count, 2);
        assert_eq!(challenge.korean_name, non_challenge.korean_name);
        assert_eq!(challenge.channel_id, non_challenge.channel_id);
        assert_eq!(challenge.channel_url, non_challenge.channel_url);
        assert_eq!(result.summary.per_group["aespa"], (3, 2));
    }

    #[test]
    fn test_empty_groups_dropped() {
        let mut dataset = Dataset::new();
        dataset.insert("all", entry(vec![Short::new("a", "", &["#challenge"])]));
        dataset.insert("none", entry(vec![Short::new("b", "", &["#vlog"])]));
        dataset.insert("empty", entry(vec![]));

        let result = partition(&dataset, &KeywordClassifier::default());

        assert!(result.challenge.contains("all"));
        assert!(!result.challenge.contains("none"));
        assert!(!result.non_challenge.contains("all"));
        assert!(result.non_challenge.contains("none"));
        assert!(!result.challenge.contains("empty"));
        assert!(!result.non_challenge.contains("empty"));
        assert_eq!(result.summary.groups_seen, 3);
        assert_eq!(result.summary.total(), 2);
    }

    #[test]
    fn test_inconsistent_count_uses_list() {
        let mut bad = entry(vec![Short::new("a", "", &["#challenge"])]);
        bad.shorts_count = 7;
        let mut dataset = Dataset::new();
        dataset.insert("aespa", bad);

        let result = partition(&dataset, &KeywordClassifier::default());
        assert_eq!(result.challenge.get("aespa").unwrap().shorts_count, 1);
        assert_eq!(result.summary.challenge_total, 1);
    }
}
