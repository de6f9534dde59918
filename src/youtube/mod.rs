//! YouTube Data API access: shorts listing and channel handle resolution

pub mod client;
pub mod handles;

pub use client::{VideoDetails, YouTubeClient};
pub use handles::{parse_channel_handle, shorts_playlist_id};
