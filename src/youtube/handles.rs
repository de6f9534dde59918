//! Channel handle and playlist id helpers

use url::Url;

/// Extract an `@handle` from a handle or channel URL.
///
/// Accepts `@name`, `youtube.com/@name/...` and legacy `youtube.com/c/name`
/// links (mapped to `@name`). Shorts links and anything else yield `None`.
pub fn parse_channel_handle(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.contains("shorts/") {
        return None;
    }

    if value.contains("youtube.com") {
        let url = if value.contains("://") {
            Url::parse(value).ok()?
        } else {
            Url::parse(&format!("https://{}", value)).ok()?
        };

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        return match segments.next()? {
            "c" => segments.next().map(|name| format!("@{}", name)),
            first if first.len() > 1 && first.starts_with('@') => Some(first.to_string()),
            _ => None,
        };
    }

    if value.len() > 1 && value.starts_with('@') {
        return Some(value.to_string());
    }

    None
}

/// Shorts playlist of a channel: `UC...` becomes `UUSH...`
pub fn shorts_playlist_id(channel_id: &str) -> Option<String> {
    channel_id
        .trim()
        .strip_prefix("UC")
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("UUSH{}", rest))
}
