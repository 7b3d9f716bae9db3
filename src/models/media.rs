//! Media-related data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a parsed title refers to.
///
/// An episode always carries positive season and episode numbers and never a
/// year; a movie never carries season or episode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaKind {
    Movie { year: Option<u16> },
    Episode { season: u16, episode: u16 },
}

/// Structured information recovered from a filename or slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTitle {
    /// Cleaned title (show name for episodes).
    pub title: String,
    #[serde(flatten)]
    pub kind: MediaKind,
}

impl ParsedTitle {
    /// Create a movie title.
    pub fn movie<S: Into<String>>(title: S, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            kind: MediaKind::Movie { year },
        }
    }

    /// Create an episode title.
    ///
    /// Returns `None` when season or episode is zero.
    pub fn episode<S: Into<String>>(title: S, season: u16, episode: u16) -> Option<Self> {
        if season == 0 || episode == 0 {
            return None;
        }
        Some(Self {
            title: title.into(),
            kind: MediaKind::Episode { season, episode },
        })
    }

    pub fn is_series(&self) -> bool {
        matches!(self.kind, MediaKind::Episode { .. })
    }

    pub fn year(&self) -> Option<u16> {
        match self.kind {
            MediaKind::Movie { year } => year,
            MediaKind::Episode { .. } => None,
        }
    }

    pub fn season(&self) -> Option<u16> {
        match self.kind {
            MediaKind::Episode { season, .. } => Some(season),
            MediaKind::Movie { .. } => None,
        }
    }

    pub fn episode_number(&self) -> Option<u16> {
        match self.kind {
            MediaKind::Episode { episode, .. } => Some(episode),
            MediaKind::Movie { .. } => None,
        }
    }
}

impl std::fmt::Display for ParsedTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MediaKind::Movie { year: Some(year) } => write!(f, "{} ({})", self.title, year),
            MediaKind::Movie { year: None } => write!(f, "{}", self.title),
            MediaKind::Episode { season, episode } => {
                write!(f, "{} S{:02}E{:02}", self.title, season, episode)
            }
        }
    }
}

/// One video in the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Catalog video ID.
    pub id: String,
    /// Current display name.
    pub name: String,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Resolution label reported by the host.
    #[serde(default)]
    pub resolution: Option<String>,
    /// Upload time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// Create an entry with only an id and a name.
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: 0,
            duration: None,
            resolution: None,
            created_at: None,
        }
    }
}

/// Episode part of a metadata match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u16,
    pub episode: u16,
    /// Episode title from TMDB, or `Episode N` when unknown.
    pub name: String,
}

/// Result of a metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMatch {
    /// TMDB ID.
    pub external_id: u64,
    /// IMDB ID.
    pub cross_ref_id: Option<String>,
    /// Movie title or series name.
    pub title: String,
    /// Release year (movies only).
    pub year: Option<u16>,
    /// Episode details (series only).
    pub episode: Option<EpisodeRef>,
}

/// Season summary from the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub name: String,
    pub episode_count: u16,
}

/// Series structure from the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub name: String,
    pub total_seasons: u16,
    /// Regular seasons keyed by number (specials excluded).
    pub seasons: std::collections::BTreeMap<u16, SeasonSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_rejects_zero() {
        assert!(ParsedTitle::episode("Show", 0, 1).is_none());
        assert!(ParsedTitle::episode("Show", 1, 0).is_none());
        assert!(ParsedTitle::episode("Show", 1, 1).is_some());
    }

    #[test]
    fn test_accessors() {
        let movie = ParsedTitle::movie("Alien", Some(1979));
        assert!(!movie.is_series());
        assert_eq!(movie.year(), Some(1979));
        assert_eq!(movie.season(), None);

        let ep = ParsedTitle::episode("Show", 2, 9).unwrap();
        assert!(ep.is_series());
        assert_eq!(ep.year(), None);
        assert_eq!(ep.season(), Some(2));
        assert_eq!(ep.episode_number(), Some(9));
        assert_eq!(ep.to_string(), "Show S02E09");
    }

    #[test]
    fn test_parsed_title_json_shape() {
        let ep = ParsedTitle::episode("Show", 1, 5).unwrap();
        let json = serde_json::to_value(&ep).unwrap();
        assert_eq!(json["type"], "episode");
        assert_eq!(json["season"], 1);
        assert_eq!(json["title"], "Show");
    }

    #[test]
    fn test_catalog_entry_deserialize() {
        let json = r#"{"id":"v1","name":"Movie 2003.mkv","size":1024,"createdAt":"2024-01-02T03:04:05Z"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "v1");
        assert_eq!(entry.size, 1024);
        assert!(entry.created_at.is_some());
        assert!(entry.resolution.is_none());
    }
}
