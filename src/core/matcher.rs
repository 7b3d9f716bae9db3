//! Candidate matching.
//!
//! Series requests with a known season and episode are matched exactly: a
//! candidate qualifies only when its own name parses to the same season and
//! episode. Everything else goes through weighted scoring.
//!
//! Both branches break ties by candidate order: the first qualifying (or
//! first highest-scoring) candidate wins.

use crate::core::cache::MatchCache;
use crate::core::cleaner::normalize;
use crate::core::parser::{parse, parse_slug, slug_to_query};
use crate::models::config::MatchWeights;
use crate::models::media::{CatalogEntry, ParsedTitle};
use crate::services::VideoCatalog;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Score computed for one candidate during selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidateScore<'a> {
    pub entry: &'a CatalogEntry,
    pub score: i32,
}

/// Outcome of selecting among candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The catalog returned nothing to choose from.
    NoCandidates,
    /// Series candidate with identical season and episode.
    Exact { entry: CatalogEntry },
    /// Best scored candidate above the threshold.
    Scored { entry: CatalogEntry, score: i32 },
    /// Series request, but no candidate has that episode.
    EpisodeNotFound { season: u16, episode: u16 },
    /// Best score did not clear the threshold.
    NoConfidentMatch { best_score: Option<i32> },
}

impl MatchOutcome {
    /// Selected entry, if any.
    pub fn entry(&self) -> Option<&CatalogEntry> {
        match self {
            MatchOutcome::Exact { entry } | MatchOutcome::Scored { entry, .. } => Some(entry),
            _ => None,
        }
    }

    /// Human readable description.
    pub fn message(&self) -> String {
        match self {
            MatchOutcome::NoCandidates => "No candidate videos found".to_string(),
            MatchOutcome::Exact { entry } => format!("Exact match: {}", entry.name),
            MatchOutcome::Scored { entry, score } => {
                format!("Match with score {}: {}", score, entry.name)
            }
            MatchOutcome::EpisodeNotFound { season, episode } => {
                format!("Exact episode not found (S{:02}E{:02})", season, episode)
            }
            MatchOutcome::NoConfidentMatch { best_score: Some(score) } => {
                format!("No confident match (best score: {})", score)
            }
            MatchOutcome::NoConfidentMatch { best_score: None } => {
                "No confident match".to_string()
            }
        }
    }
}

/// Picks the best candidate for a parsed request.
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer {
    weights: MatchWeights,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(MatchWeights::default())
    }
}

impl MatchScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    /// Score one candidate.
    ///
    /// A candidate whose name cannot be parsed, or a request without a
    /// parsed title, can only earn the external id bonus.
    pub fn score<'a>(
        &self,
        request: Option<&ParsedTitle>,
        entry: &'a CatalogEntry,
        external_id: Option<u64>,
    ) -> MatchCandidateScore<'a> {
        let mut score = 0;

        if let Some(id) = external_id {
            if entry.name.contains(&format!("{{{}}}", id)) {
                score += self.weights.external_id;
            }
        }

        if let (Some(request), Some(candidate)) = (request, parse(&entry.name)) {
            let wanted = normalize(&request.title);
            let found = normalize(&candidate.title);
            if !wanted.is_empty() {
                if wanted == found {
                    score += self.weights.exact_title;
                } else if found.contains(&wanted) {
                    score += self.weights.partial_title;
                }
            }

            if !request.is_series() && !candidate.is_series() {
                if let (Some(a), Some(b)) = (request.year(), candidate.year()) {
                    if a == b {
                        score += self.weights.year;
                    }
                }
            }
        }

        MatchCandidateScore { entry, score }
    }

    /// Select the best candidate.
    pub fn select(
        &self,
        request: Option<&ParsedTitle>,
        candidates: &[CatalogEntry],
        external_id: Option<u64>,
    ) -> MatchOutcome {
        if candidates.is_empty() {
            return MatchOutcome::NoCandidates;
        }

        if let Some(request) = request {
            if let (Some(season), Some(episode)) = (request.season(), request.episode_number()) {
                return self.select_episode(candidates, season, episode);
            }
        }

        let mut best: Option<MatchCandidateScore<'_>> = None;
        for entry in candidates {
            let scored = self.score(request, entry, external_id);
            tracing::debug!("Candidate \"{}\" scored {}", entry.name, scored.score);
            // Strictly greater: the earlier candidate keeps a tie
            if best.map_or(true, |b| scored.score > b.score) {
                best = Some(scored);
            }
        }

        match best {
            Some(b) if b.score > self.weights.threshold => MatchOutcome::Scored {
                entry: b.entry.clone(),
                score: b.score,
            },
            b => MatchOutcome::NoConfidentMatch {
                best_score: b.map(|b| b.score),
            },
        }
    }

    fn select_episode(&self, candidates: &[CatalogEntry], season: u16, episode: u16) -> MatchOutcome {
        tracing::debug!("Exact series match for S{:02}E{:02}", season, episode);
        let found = candidates.iter().find(|entry| {
            parse(&entry.name).map_or(false, |p| {
                p.season() == Some(season) && p.episode_number() == Some(episode)
            })
        });

        match found {
            Some(entry) => MatchOutcome::Exact {
                entry: entry.clone(),
            },
            None => MatchOutcome::EpisodeNotFound { season, episode },
        }
    }
}

/// A match request: a slug, an external id, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRequest {
    pub slug: Option<String>,
    pub external_id: Option<u64>,
}

impl MatchRequest {
    /// Cache key, `match-{externalId|none}-{slug|none}`.
    ///
    /// The slug is trimmed and lowercased so that equivalent requests share
    /// an entry.
    pub fn cache_key(&self) -> String {
        let id = self
            .external_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_string());
        let slug = self
            .slug()
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| "none".to_string());
        format!("match-{}-{}", id, slug)
    }

    fn slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Score for scored matches; `None` for exact episode matches.
    pub score: Option<i32>,
    pub stream_url: Option<String>,
    pub download_url: Option<String>,
}

impl MatchResult {
    fn new(entry: CatalogEntry, score: Option<i32>, player_base_url: Option<&str>) -> Self {
        let base = player_base_url.map(|b| b.trim_end_matches('/'));
        Self {
            stream_url: base.map(|b| format!("{}/#{}", b, entry.id)),
            download_url: base.map(|b| format!("{}/#{}&dl=1", b, entry.id)),
            entry,
            score,
        }
    }
}

/// Answer of [`MatchService::match_request`].
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResponse {
    /// Served from the cache without touching the catalog.
    Cached(MatchResult),
    /// Freshly computed and stored in the cache.
    Matched(MatchResult),
    /// Nothing suitable; not cached.
    NoMatch(MatchOutcome),
}

impl MatchResponse {
    pub fn result(&self) -> Option<&MatchResult> {
        match self {
            MatchResponse::Cached(r) | MatchResponse::Matched(r) => Some(r),
            MatchResponse::NoMatch(_) => None,
        }
    }
}

/// Cached slug/id to catalog entry matching.
pub struct MatchService {
    catalog: Arc<dyn VideoCatalog>,
    cache: Arc<MatchCache>,
    scorer: MatchScorer,
    player_base_url: Option<String>,
}

impl MatchService {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        cache: Arc<MatchCache>,
        scorer: MatchScorer,
        player_base_url: Option<String>,
    ) -> Self {
        Self {
            catalog,
            cache,
            scorer,
            player_base_url,
        }
    }

    /// Match a request against the catalog.
    ///
    /// Candidates come from an `{externalId}` search first, then from a slug
    /// search when that finds nothing. Only successful matches are cached.
    pub async fn match_request(&self, request: &MatchRequest) -> Result<MatchResponse> {
        let slug = request.slug();
        if slug.is_none() && request.external_id.is_none() {
            return Err(crate::Error::EmptyMatchRequest);
        }

        let key = request.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            tracing::info!("Serving match for {} from cache", key);
            return Ok(MatchResponse::Cached(cached));
        }

        let mut candidates = Vec::new();
        if let Some(id) = request.external_id {
            tracing::info!("Match: searching with external id {}", id);
            candidates = self.search(&format!("{{{}}}", id)).await;
        }
        if candidates.is_empty() {
            if let Some(slug) = slug {
                let query = slug_to_query(slug);
                tracing::info!("Match: searching by slug \"{}\"", query);
                candidates = self.search(&query).await;
            }
        }

        let parsed = slug.and_then(parse_slug);
        let outcome = self
            .scorer
            .select(parsed.as_ref(), &candidates, request.external_id);

        let score = match &outcome {
            MatchOutcome::Scored { score, .. } => Some(*score),
            _ => None,
        };
        let Some(entry) = outcome.entry().cloned() else {
            tracing::info!("No match for {}: {}", key, outcome.message());
            return Ok(MatchResponse::NoMatch(outcome));
        };

        tracing::info!("{}", outcome.message());
        let result = MatchResult::new(entry, score, self.player_base_url.as_deref());
        self.cache.put(&key, result.clone()).await;
        Ok(MatchResponse::Matched(result))
    }

    async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        match self.catalog.search(query).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Catalog search failed for \"{}\": {}", query, e);
                Vec::new()
            }
        }
    }
}
