//! Backend data models
//!
//! Payload types exchanged with the video backend and stored in the cache.

pub mod user;
pub mod video;

// Re-export commonly used types
pub use user::UserProfile;
pub use video::{Audio, Comment, Filter, NewComment, NewVideo, Video};
