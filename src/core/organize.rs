//! Series organisation and missing-episode reports.
//!
//! Works on canonical names: an entry takes part only when its name carries
//! an `{externalId}` marker and a season and episode number.

use crate::generators::filename::extract_external_id;
use crate::models::media::CatalogEntry;
use crate::services::MetadataProvider;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static SEASON_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)s(\d{1,2})[._\s-]?e(\d{1,3})").unwrap());

static SPELLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)season[\s_-]*(\d{1,2})[\s_-]*episode[\s_-]*(\d{1,3})").unwrap()
});

static CROSS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^0-9])(\d{1,2})x(\d{1,3})(?:[^0-9]|$)").unwrap());

static EPISODE_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ep[\s_-]*(\d{1,3})").unwrap());

static BRACED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// Season/episode numbers found in a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeMarker {
    /// `None` for episode-only markers such as `Ep 5`.
    pub season: Option<u16>,
    pub episode: u16,
    /// Byte offset where the marker starts.
    pub start: usize,
}

/// Find the season/episode marker in a name.
pub fn extract_season_episode(name: &str) -> Option<EpisodeMarker> {
    for re in [&*SEASON_EPISODE_RE, &*SPELLED_RE, &*CROSS_RE] {
        if let Some(caps) = re.captures(name) {
            let (Some(whole), Some(season), Some(episode)) =
                (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            // The cross pattern also matches the character before the season
            let start = if std::ptr::eq(re, &*CROSS_RE) {
                season.start()
            } else {
                whole.start()
            };
            if let (Ok(season), Ok(episode)) = (season.as_str().parse(), episode.as_str().parse()) {
                return Some(EpisodeMarker {
                    season: Some(season),
                    episode,
                    start,
                });
            }
        }
    }

    let caps = EPISODE_ONLY_RE.captures(name)?;
    let whole = caps.get(0)?;
    Some(EpisodeMarker {
        season: None,
        episode: caps.get(1)?.as_str().parse().ok()?,
        start: whole.start(),
    })
}

/// Episodes of one series found in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizedSeries {
    pub external_id: u64,
    pub series_name: String,
    /// Season number to episode number to entry.
    pub seasons: BTreeMap<u16, BTreeMap<u16, CatalogEntry>>,
}

/// Group episode entries by series id, season and episode.
///
/// Entries without an id marker or without a season and episode are left
/// out. When two entries claim the same episode, the later one is kept.
/// Series come back ordered by id.
pub fn organize_series(entries: &[CatalogEntry]) -> Vec<OrganizedSeries> {
    let mut series: BTreeMap<u64, OrganizedSeries> = BTreeMap::new();

    for entry in entries {
        let Some(marker) = extract_season_episode(&entry.name) else {
            continue;
        };
        let (Some(season), Some(id)) = (marker.season, extract_external_id(&entry.name)) else {
            continue;
        };
        if season == 0 || marker.episode == 0 {
            continue;
        }

        series
            .entry(id)
            .or_insert_with(|| OrganizedSeries {
                external_id: id,
                series_name: series_name(&entry.name, marker.start),
                seasons: BTreeMap::new(),
            })
            .seasons
            .entry(season)
            .or_default()
            .insert(marker.episode, entry.clone());
    }

    series.into_values().collect()
}

/// Text before the season marker, without id markers.
fn series_name(name: &str, marker_start: usize) -> String {
    let prefix = BRACED_RE.replace_all(&name[..marker_start], "");
    prefix
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-'))
        .to_string()
}

/// Availability of one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season: u16,
    pub name: String,
    pub expected_episodes: u16,
    pub available_episodes: usize,
    pub missing_episodes: Vec<u16>,
    /// Available entries in episode order.
    pub episodes: Vec<CatalogEntry>,
}

/// Availability of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub external_id: u64,
    pub series_name: String,
    pub total_seasons: u16,
    pub seasons_available: usize,
    /// Seasons with no episode at all.
    pub missing_seasons: Vec<u16>,
    pub seasons: Vec<SeasonReport>,
}

/// Compare organised series with their metadata.
///
/// Series whose metadata cannot be fetched are left out of the report.
pub async fn missing_episodes(
    metadata: &dyn MetadataProvider,
    series: &[OrganizedSeries],
) -> Vec<SeriesReport> {
    let mut reports = Vec::new();

    for organized in series {
        let info = match metadata.series_info(organized.external_id).await {
            Ok(Some(info)) => info,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!(
                    "Error fetching series info for {}: {}",
                    organized.external_id,
                    e
                );
                continue;
            }
        };

        let mut report = SeriesReport {
            external_id: organized.external_id,
            series_name: organized.series_name.clone(),
            total_seasons: info.total_seasons,
            seasons_available: organized.seasons.len(),
            missing_seasons: Vec::new(),
            seasons: Vec::new(),
        };

        let empty = BTreeMap::new();
        for season in 1..=info.total_seasons {
            let summary = info.seasons.get(&season);
            let expected = summary.map(|s| s.episode_count).unwrap_or(0);
            let available = organized.seasons.get(&season).unwrap_or(&empty);

            if available.is_empty() {
                report.missing_seasons.push(season);
            }

            report.seasons.push(SeasonReport {
                season,
                name: summary
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| format!("Season {}", season)),
                expected_episodes: expected,
                available_episodes: available.len(),
                missing_episodes: (1..=expected).filter(|ep| !available.contains_key(ep)).collect(),
                episodes: available.values().cloned().collect(),
            });
        }

        reports.push(report);
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_patterns() {
        let m = extract_season_episode("Show S01-E05-Pilot {1}").unwrap();
        assert_eq!((m.season, m.episode), (Some(1), 5));

        let m = extract_season_episode("Show Season 2 Episode 10").unwrap();
        assert_eq!((m.season, m.episode), (Some(2), 10));

        let m = extract_season_episode("Show 3x07").unwrap();
        assert_eq!((m.season, m.episode), (Some(3), 7));

        let m = extract_season_episode("Show Ep 12").unwrap();
        assert_eq!((m.season, m.episode), (None, 12));

        assert!(extract_season_episode("Movie 1999").is_none());
        assert!(extract_season_episode("Movie 1999 1920x1080 {42}").is_none());
    }

    #[test]
    fn test_organize_series() {
        let entries = vec![
            CatalogEntry::new("a", "Breaking Bad S01-E02-Cat's in the Bag {1396} {tt0903747}.mkv"),
            CatalogEntry::new("b", "Breaking Bad S01-E01-Pilot {1396} {tt0903747}.mkv"),
            CatalogEntry::new("c", "Breaking Bad S02-E01-Seven Thirty-Seven {1396}.mkv"),
            CatalogEntry::new("d", "Heat 1995 {949} {tt0113277}.mkv"),
            CatalogEntry::new("e", "Random S01E01.mkv"),
            CatalogEntry::new("f", "Alpha S01-E01-Pilot {100}.mkv"),
        ];

        let series = organize_series(&entries);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].external_id, 100);

        let bb = &series[1];
        assert_eq!(bb.external_id, 1396);
        assert_eq!(bb.series_name, "Breaking Bad");
        assert_eq!(bb.seasons.len(), 2);
        let first: Vec<u16> = bb.seasons[&1].keys().copied().collect();
        assert_eq!(first, vec![1, 2]);
    }
}
