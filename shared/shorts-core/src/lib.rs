//! Shorts Core - Shared data structures, alias index and challenge classifiers

pub mod alias;
pub mod classifier;
pub mod compare;
pub mod dataset;
pub mod hashtags;
pub mod partition;
pub mod roster;

pub use alias::{AliasIndex, AliasIndexStats};
pub use classifier::{
    normalize_tag, ChallengeClassifier, ClassifierKind, GlobalLookupClassifier,
    KeywordClassifier, RosterClassifier,
};
pub use compare::{compare_groups, GroupComparison};
pub use dataset::{Dataset, GroupEntry, Short};
pub use hashtags::{extract_hashtags, merge_title_hashtags, HashtagStats};
pub use partition::{partition, Partition, PartitionSummary};
pub use roster::{GroupRecord, RosterRecord};

/// Result type for Shorts Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for Shorts Core operations
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No roster row supplies the korean name for group '{0}'")]
    MissingGroupRow(String),

    #[error("Unknown classifier strategy: {0}")]
    UnknownStrategy(String),

    #[error("Classifier strategy '{0}' needs an alias index")]
    IndexRequired(String),
}
