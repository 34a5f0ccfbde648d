//! Announcement caption parsing
//!
//! ```text
//! Titre - Inception
//! Genre - Science-Fiction
//! ```

use netcloud_common::{normalize, Genre};
use thiserror::Error;

pub const TITLE_MARKER: &str = "Titre - ";
pub const GENRE_MARKER: &str = "Genre - ";

/// A well-formed announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Normalized title (registry key)
    pub title: String,
    pub genre: Genre,
    /// Full caption, trimmed, republished as-is
    pub caption: String,
}

/// Why a caption was not accepted as an announcement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("expected at least 2 lines, got {0}")]
    TooFewLines(usize),

    #[error("second line lacks the 'Genre - ' marker")]
    MissingGenreMarker,

    #[error("genre '{0}' is not recognized")]
    UnknownGenre(String),

    #[error("title is empty after normalization")]
    EmptyTitle,
}

/// Parse a poster caption
pub fn parse_announcement(text: &str) -> Result<Announcement, Rejection> {
    let caption = text.trim();
    let lines: Vec<&str> = caption.split('\n').collect();

    if lines.len() < 2 {
        return Err(Rejection::TooFewLines(lines.len()));
    }
    if !lines[1].contains(GENRE_MARKER) {
        return Err(Rejection::MissingGenreMarker);
    }

    let raw_genre = lines[1].replace(GENRE_MARKER, "");
    let genre: Genre = raw_genre
        .parse()
        .map_err(|_| Rejection::UnknownGenre(raw_genre.trim().to_string()))?;

    let title = normalize(&lines[0].replace(TITLE_MARKER, ""));
    if title.is_empty() {
        return Err(Rejection::EmptyTitle);
    }

    Ok(Announcement {
        title,
        genre,
        caption: caption.to_string(),
    })
}
