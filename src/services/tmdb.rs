//! TMDB API client.

use crate::models::config::TmdbConfig;
use crate::models::media::{
    EpisodeRef, MetadataMatch, ParsedTitle, SeasonSummary, SeriesInfo,
};
use crate::services::MetadataProvider;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Movie search result.
#[derive(Debug, Deserialize)]
pub struct MovieSearchResult {
    pub results: Vec<MovieSearchItem>,
}

/// Movie search item.
#[derive(Debug, Deserialize)]
pub struct MovieSearchItem {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
}

/// TV show search result.
#[derive(Debug, Deserialize)]
pub struct TvSearchResult {
    pub results: Vec<TvSearchItem>,
}

/// TV show search item.
#[derive(Debug, Deserialize)]
pub struct TvSearchItem {
    pub id: u64,
    pub name: String,
    pub first_air_date: Option<String>,
}

/// External IDs of a movie or TV show.
#[derive(Debug, Deserialize)]
pub struct ExternalIds {
    pub imdb_id: Option<String>,
}

/// Episode details.
#[derive(Debug, Deserialize)]
pub struct EpisodeDetails {
    pub name: Option<String>,
}

/// TV show details.
#[derive(Debug, Deserialize)]
pub struct TvDetails {
    pub name: String,
    pub number_of_seasons: u16,
    #[serde(default)]
    pub seasons: Vec<TvSeasonItem>,
}

/// Season entry within TV show details.
#[derive(Debug, Deserialize)]
pub struct TvSeasonItem {
    pub season_number: u16,
    pub episode_count: u16,
    pub name: Option<String>,
}

/// Which TMDB collection an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbKind {
    Movie,
    Tv,
}

impl TmdbKind {
    fn path(self) -> &'static str {
        match self {
            TmdbKind::Movie => "movie",
            TmdbKind::Tv => "tv",
        }
    }
}

/// TMDB API client.
pub struct TmdbClient {
    api_key: String,
    language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    use_bearer: bool,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDB client. Fails when no API key is configured.
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(crate::Error::TmdbApiKeyMissing)?;

        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        Ok(Self {
            api_key,
            language: config.language.clone(),
            use_bearer,
            client: reqwest::Client::new(),
        })
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.use_bearer {
            format!(
                "{}/{}?language={}{}",
                TMDB_BASE_URL, path, self.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                TMDB_BASE_URL, path, self.api_key, self.language, extra_params
            )
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .build_request(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| crate::Error::Tmdb(e.to_string()))?
            .json()
            .await?;
        Ok(resp)
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.use_bearer {
            format!("{}/authentication", TMDB_BASE_URL)
        } else {
            format!("{}/authentication?api_key={}", TMDB_BASE_URL, self.api_key)
        };

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Search for movies.
    pub async fn search_movie(&self, query: &str, year: Option<u16>) -> Result<Vec<MovieSearchItem>> {
        let year_param = year.map(|y| format!("&year={}", y)).unwrap_or_default();
        let url = self.build_url(
            "search/movie",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );
        let resp: MovieSearchResult = self.get_json(&url).await?;
        Ok(resp.results)
    }

    /// Search for TV shows.
    pub async fn search_tv(&self, query: &str) -> Result<Vec<TvSearchItem>> {
        let url = self.build_url(
            "search/tv",
            &format!("&query={}", urlencoding::encode(query)),
        );
        let resp: TvSearchResult = self.get_json(&url).await?;
        Ok(resp.results)
    }

    /// Get the IMDB ID of a movie or TV show.
    pub async fn get_imdb_id(&self, kind: TmdbKind, tmdb_id: u64) -> Result<Option<String>> {
        let url = self.build_url(&format!("{}/{}/external_ids", kind.path(), tmdb_id), "");
        let resp: ExternalIds = self.get_json(&url).await?;
        Ok(resp.imdb_id.filter(|id| !id.is_empty()))
    }

    /// Get TV show details.
    pub async fn get_tv_details(&self, tv_id: u64) -> Result<TvDetails> {
        let url = self.build_url(&format!("tv/{}", tv_id), "");
        self.get_json(&url).await
    }

    /// Get episode details.
    pub async fn get_episode_details(
        &self,
        tv_id: u64,
        season_number: u16,
        episode_number: u16,
    ) -> Result<EpisodeDetails> {
        let url = self.build_url(
            &format!("tv/{}/season/{}/episode/{}", tv_id, season_number, episode_number),
            "",
        );
        self.get_json(&url).await
    }

    /// IMDB ID lookup that treats failures as "no id".
    async fn imdb_id_or_none(&self, kind: TmdbKind, tmdb_id: u64) -> Option<String> {
        match self.get_imdb_id(kind, tmdb_id).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Error fetching IMDB ID for TMDB {}: {}", tmdb_id, e);
                None
            }
        }
    }

    async fn lookup_movie(&self, title: &str, year: Option<u16>) -> Result<Option<MetadataMatch>> {
        let results = self.search_movie(title, year).await?;
        let Some(best) = pick_best(&results, |m| m.title.as_str(), title) else {
            tracing::debug!("No TMDB movie results for: {}", title);
            return Ok(None);
        };

        let imdb_id = self.imdb_id_or_none(TmdbKind::Movie, best.id).await;
        Ok(Some(MetadataMatch {
            external_id: best.id,
            cross_ref_id: imdb_id,
            title: best.title.clone(),
            year: year_of(best.release_date.as_deref()),
            episode: None,
        }))
    }

    async fn lookup_episode(
        &self,
        title: &str,
        season: u16,
        episode: u16,
    ) -> Result<Option<MetadataMatch>> {
        let results = self.search_tv(title).await?;
        let Some(best) = pick_best(&results, |t| t.name.as_str(), title) else {
            tracing::debug!("No TMDB TV results for: {}", title);
            return Ok(None);
        };

        let imdb_id = self.imdb_id_or_none(TmdbKind::Tv, best.id).await;
        let episode_name = match self.get_episode_details(best.id, season, episode).await {
            Ok(details) => details.name.filter(|n| !n.is_empty()),
            Err(e) => {
                tracing::debug!(
                    "Episode details not found for tmdb{} S{}E{}: {}",
                    best.id,
                    season,
                    episode,
                    e
                );
                None
            }
        };

        Ok(Some(MetadataMatch {
            external_id: best.id,
            cross_ref_id: imdb_id,
            title: best.name.clone(),
            year: None,
            episode: Some(EpisodeRef {
                season,
                episode,
                name: episode_name.unwrap_or_else(|| format!("Episode {}", episode)),
            }),
        }))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_metadata(&self, parsed: &ParsedTitle) -> Result<Option<MetadataMatch>> {
        if parsed.title.trim().is_empty() {
            tracing::warn!("TMDB lookup called without a title");
            return Ok(None);
        }

        match (parsed.season(), parsed.episode_number()) {
            (Some(season), Some(episode)) => {
                self.lookup_episode(&parsed.title, season, episode).await
            }
            _ => self.lookup_movie(&parsed.title, parsed.year()).await,
        }
    }

    async fn series_info(&self, external_id: u64) -> Result<Option<SeriesInfo>> {
        let details = self.get_tv_details(external_id).await?;
        let seasons = details
            .seasons
            .into_iter()
            // Season 0 holds specials
            .filter(|s| s.season_number > 0)
            .map(|s| {
                let name = s
                    .name
                    .unwrap_or_else(|| format!("Season {}", s.season_number));
                (
                    s.season_number,
                    SeasonSummary {
                        name,
                        episode_count: s.episode_count,
                    },
                )
            })
            .collect();

        Ok(Some(SeriesInfo {
            name: details.name,
            total_seasons: details.number_of_seasons,
            seasons,
        }))
    }
}

/// Pick the best search result for a title: exact (case-insensitive) title,
/// then a title containing the query, then the first result.
pub fn pick_best<'a, T>(items: &'a [T], title_of: impl Fn(&T) -> &str, wanted: &str) -> Option<&'a T> {
    let wanted = wanted.to_lowercase();
    items
        .iter()
        .find(|item| title_of(item).to_lowercase() == wanted)
        .or_else(|| items.iter().find(|item| title_of(item).to_lowercase().contains(&wanted)))
        .or_else(|| items.first())
}

/// Year from a `YYYY-MM-DD` date.
fn year_of(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, title: &str) -> MovieSearchItem {
        MovieSearchItem {
            id,
            title: title.to_string(),
            release_date: None,
        }
    }

    #[test]
    fn test_pick_best_prefers_exact_title() {
        let items = vec![movie(1, "Alien Resurrection"), movie(2, "Alien"), movie(3, "Aliens")];
        let best = pick_best(&items, |m| m.title.as_str(), "alien").unwrap();
        assert_eq!(best.id, 2);
    }

    #[test]
    fn test_pick_best_falls_back_to_substring_then_first() {
        let items = vec![movie(1, "Other Film"), movie(2, "The Thing")];
        let best = pick_best(&items, |m| m.title.as_str(), "Thing").unwrap();
        assert_eq!(best.id, 2);

        let best = pick_best(&items, |m| m.title.as_str(), "Nothing Here").unwrap();
        assert_eq!(best.id, 1);

        let empty: Vec<MovieSearchItem> = Vec::new();
        assert!(pick_best(&empty, |m| m.title.as_str(), "x").is_none());
    }

    #[test]
    fn test_year_of() {
        assert_eq!(year_of(Some("1999-03-31")), Some(1999));
        assert_eq!(year_of(Some("")), None);
        assert_eq!(year_of(None), None);
    }

    #[test]
    fn test_requires_api_key() {
        let config = TmdbConfig {
            api_key: None,
            language: "en-US".to_string(),
        };
        assert!(matches!(
            TmdbClient::new(&config),
            Err(crate::Error::TmdbApiKeyMissing)
        ));
    }

    #[test]
    fn test_build_url_v3() {
        let config = TmdbConfig {
            api_key: Some("abc".to_string()),
            language: "en-US".to_string(),
        };
        let client = TmdbClient::new(&config).unwrap();
        assert_eq!(
            client.build_url("search/movie", "&query=x"),
            "https://api.themoviedb.org/3/search/movie?api_key=abc&language=en-US&query=x"
        );
    }
}
