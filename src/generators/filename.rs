//! Canonical filename generator.
//!
//! Movie: `Title Year {ExternalId} {CrossRefId}.ext`
//! Series: `Series Name S01-E05-Episode Title {ExternalId} {CrossRefId}.ext`
//!
//! The cross-reference id is left out when unknown.

use crate::models::media::{MetadataMatch, ParsedTitle};
use once_cell::sync::Lazy;
use regex::Regex;

static ID_THEN_CROSS_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\d+\}.*\{tt\d+\}").unwrap());

static CROSS_REF_THEN_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{tt\d+\}.*\{\d+\}").unwrap());

static EXTERNAL_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").unwrap());

/// Build the canonical name for a matched title.
///
/// Season and episode numbers come from the parsed title; names and ids
/// come from the metadata match.
pub fn canonical_name(parsed: &ParsedTitle, matched: &MetadataMatch, extension: &str) -> String {
    let ids = match &matched.cross_ref_id {
        Some(cross_ref) => format!("{{{}}} {{{}}}", matched.external_id, cross_ref),
        None => format!("{{{}}}", matched.external_id),
    };

    let stem = match (parsed.season(), parsed.episode_number()) {
        (Some(season), Some(episode)) => {
            let episode_name = matched
                .episode
                .as_ref()
                .map(|e| e.name.clone())
                .unwrap_or_else(|| format!("Episode {}", episode));
            format!(
                "{} S{:02}-E{:02}-{} {}",
                sanitize_filename(&matched.title),
                season,
                episode,
                sanitize_filename(&episode_name),
                ids
            )
        }
        _ => match matched.year {
            Some(year) => format!("{} {} {}", sanitize_filename(&matched.title), year, ids),
            None => format!("{} {}", sanitize_filename(&matched.title), ids),
        },
    };

    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Whether a name already carries both an external id and a cross-reference
/// id marker, in either order.
pub fn is_canonical(name: &str) -> bool {
    ID_THEN_CROSS_REF_RE.is_match(name) || CROSS_REF_THEN_ID_RE.is_match(name)
}

/// First `{digits}` marker in a name.
pub fn extract_external_id(name: &str) -> Option<u64> {
    EXTERNAL_ID_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Sanitize a string for use in filenames.
fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
