//! Resolving user-supplied video references to a canonical video ID.
//!
//! Accepted shapes, checked in order:
//! - a bare 11-character ID (`dQw4w9WgXcQ`)
//! - a short link (`https://youtu.be/dQw4w9WgXcQ`)
//! - a watch link with a `v` query parameter
//! - an `/embed/<id>` or `/shorts/<id>` path
//!
//! Resolution is purely syntactic: no network access, and malformed input is an
//! ordinary `Err`, never a panic.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::types::ValidationError;

/// Canonical video ID shape: exactly 11 URL-safe base64 characters.
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Host fragment identifying short links.
const SHORT_LINK_HOST: &str = "youtu.be";

/// Path markers that precede an ID in embed and shorts links.
const PATH_MARKERS: &[&str] = &["embed", "shorts"];

/// A canonical external video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Creates a video ID, requiring the canonical 11-character shape.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if is_video_id(&id) {
            Ok(Self(id))
        } else {
            Err(ValidationError::InvalidVideoReference { input: id })
        }
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public page for watching the video outside the timer.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_video_id(candidate: &str) -> bool {
    VIDEO_ID_RE.is_match(candidate)
}

/// Resolves a raw ID or video link to its canonical ID.
pub fn resolve(input: &str) -> Result<VideoId, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidVideoReference {
        input: input.to_string(),
    };

    if is_video_id(trimmed) {
        return Ok(VideoId(trimmed.to_string()));
    }

    let url = Url::parse(trimmed).map_err(|_| invalid())?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if url
        .host_str()
        .is_some_and(|host| host.contains(SHORT_LINK_HOST))
    {
        return segments
            .first()
            .filter(|s| is_video_id(s))
            .map(|s| VideoId((*s).to_string()))
            .ok_or_else(invalid);
    }

    if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
        if is_video_id(&v) {
            return Ok(VideoId(v.into_owned()));
        }
    }

    segments
        .iter()
        .position(|s| PATH_MARKERS.contains(s))
        .and_then(|marker| segments.get(marker + 1))
        .filter(|s| is_video_id(s))
        .map(|s| VideoId((*s).to_string()))
        .ok_or_else(invalid)
}
