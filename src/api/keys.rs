//! Cache key names used by the read-through layer.
//!
//! The cache itself treats keys as opaque; the naming convention lives here.

pub const VIDEO_FEED: &str = "video_feed";
pub const TRENDING_VIDEOS: &str = "trending_videos";
pub const USER_PROFILE: &str = "user_profile";
pub const VIDEO_LIST: &str = "video_list";
pub const AUDIOS_DATA: &str = "audios_data";
pub const FILTERS_DATA: &str = "filters_data";
pub const COMMENTS_DATA: &str = "comments_data";

/// Key for a single video's detail payload.
pub fn video(id: &str) -> String {
    format!("video_{}", id)
}

/// Key for the comment thread of one video.
pub fn comments(video_id: &str) -> String {
    format!("{}_{}", COMMENTS_DATA, video_id)
}
