/// K-pop Shorts - dataset builder and challenge classifier
///
/// Collects YouTube shorts of K-pop groups, enriches them with hashtags and
/// Wikipedia intros, and splits them into challenge and non-challenge sets.

pub mod config;
pub mod processing;
pub mod store;
pub mod wiki;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::processing::{DatasetProcessor, FetchSummary};
pub use crate::wiki::{HttpPageSource, NameUsed, PageSource, WikiFetcher, WikiStats};
pub use crate::youtube::YouTubeClient;
pub use shorts_core::{ClassifierKind, Dataset, PartitionSummary};
