//! Video-related payloads
//!
//! Fields the backend may omit carry serde defaults so that older cached
//! entries still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published video as returned by the feed, trending and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for POST /videos
#[derive(Debug, Clone, Serialize)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// A comment on a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for POST /videos/:id/comments
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub text: String,
}

/// A soundtrack available when recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// A camera filter available when recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_deserialize_minimal() {
        let json = r#"{"id":"1","title":"Surf","video_url":"https://cdn/1.mp4","user_id":"u1"}"#;
        let video: Video = serde_json::from_str(json).unwrap();

        assert_eq!(video.id, "1");
        assert_eq!(video.likes, 0);
        assert!(video.thumbnail_url.is_none());
        assert!(video.created_at.is_none());
    }

    #[test]
    fn test_video_deserialize_with_timestamp() {
        let json = r#"{"id":"1","title":"Surf","video_url":"u","user_id":"u1",
                       "likes":7,"created_at":"2024-05-01T12:00:00Z"}"#;
        let video: Video = serde_json::from_str(json).unwrap();

        assert_eq!(video.likes, 7);
        assert!(video.created_at.is_some());
    }

    #[test]
    fn test_new_video_skips_missing_thumbnail() {
        let body = NewVideo {
            title: "t".to_string(),
            description: "d".to_string(),
            video_url: "u".to_string(),
            thumbnail_url: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("thumbnail_url"));
    }
}
