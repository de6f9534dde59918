//! Hashtag extraction and title hashtag merging

use crate::Dataset;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn hashtag_regex() -> &'static Regex {
    static HASHTAG: OnceLock<Regex> = OnceLock::new();
    HASHTAG.get_or_init(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"))
}

/// All `#word` tokens of `text` in order of appearance
pub fn extract_hashtags(text: &str) -> Vec<String> {
    hashtag_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Counters reported by [`merge_title_hashtags`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HashtagStats {
    pub groups: usize,
    pub shorts: usize,
    pub hashtags_before: usize,
    pub hashtags_after: usize,
    pub hashtags_added: usize,
}

impl HashtagStats {
    pub fn summary(&self) -> String {
        format!(
            "Processed {} shorts across {} groups:\n\
            - Total hashtags before: {}\n\
            - Total hashtags after: {}\n\
            - Added {} new hashtags from titles",
            self.shorts, self.groups, self.hashtags_before, self.hashtags_after, self.hashtags_added
        )
    }
}

/// Append title hashtags missing from each short's hashtag list.
/// Groups without a `shorts` field are left alone and not counted.
pub fn merge_title_hashtags(dataset: &mut Dataset) -> HashtagStats {
    let mut stats = HashtagStats::default();

    for (_, entry) in dataset.iter_mut() {
        if !entry.shorts_listed {
            continue;
        }
        stats.groups += 1;

        for short in &mut entry.shorts {
            stats.shorts += 1;
            stats.hashtags_before += short.hashtags.len();

            for hashtag in extract_hashtags(&short.title) {
                if !short.hashtags.contains(&hashtag) {
                    short.hashtags.push(hashtag);
                    stats.hashtags_added += 1;
                }
            }

            stats.hashtags_after += short.hashtags.len();
        }
    }

    stats
}
