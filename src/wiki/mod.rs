//! Wikipedia intros for each group: fetching, extraction and text repair

pub mod extract;
pub mod fetcher;
pub mod spacing;

pub use extract::extract_intro;
pub use fetcher::{
    page_url, GroupWikiInfo, HttpPageSource, NameUsed, PageSource, WikiFetcher, WikiInfoMap, WikiPage,
    WikiStats,
};
pub use spacing::{fix_group_info, fix_spacing};
