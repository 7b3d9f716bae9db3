//! Local filename parser.
//!
//! Classifies a filename or slug as a series episode or a movie by running an
//! ordered list of rules; the first rule that yields a title wins:
//!
//! 1. `S##E##` (with `.`, `_`, `-` or space between season and episode)
//! 2. `Season # Episode #`
//! 3. `#x##`
//! 4. Release year (last 4-digit year in 1900-2099)
//! 5. Whole cleaned string as a movie without year
//!
//! Series rules run before the year rule because episode names often carry an
//! air date that would otherwise be taken as a release year.

use crate::core::cleaner::clean;
use crate::models::media::ParsedTitle;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static EXTENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[A-Za-z0-9]{1,5}$").unwrap());

static AKA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\sAKA\s").unwrap());

static SEASON_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(.*?)s(\d{1,2})[._\s-]?e(\d{1,3})").unwrap());

static SPELLED_SEASON_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(.*?)season[._\s-]?(\d{1,2})[._\s-]?episode[._\s-]?(\d{1,3})").unwrap()
});

// Digits on either side are rejected so resolutions like 1920x1080 stay movies
static CROSS_NOTATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(.*?)(?:^|[^0-9])(\d{1,2})x(\d{1,3})(?:[^0-9]|$)").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

static SLUG_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/-]").unwrap());

/// A single parsing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRule {
    /// `Show.Name.S01E05`, `Show S01.E05`, `Show s1-e5`
    SeasonEpisode,
    /// `Show Season 1 Episode 5`
    SpelledSeasonEpisode,
    /// `Show 1x05`
    CrossNotation,
    /// `Movie Title 2003 1080p`
    ReleaseYear,
    /// Anything with a non-empty cleaned title.
    Fallback,
}

/// Rules in priority order.
pub const RULES: [ParseRule; 5] = [
    ParseRule::SeasonEpisode,
    ParseRule::SpelledSeasonEpisode,
    ParseRule::CrossNotation,
    ParseRule::ReleaseYear,
    ParseRule::Fallback,
];

impl ParseRule {
    /// Apply this rule to a prepared name (see [`prepare`]).
    pub fn apply(self, raw: &str) -> Option<ParsedTitle> {
        match self {
            ParseRule::SeasonEpisode => episode_from(&SEASON_EPISODE_RE, raw),
            ParseRule::SpelledSeasonEpisode => episode_from(&SPELLED_SEASON_EPISODE_RE, raw),
            ParseRule::CrossNotation => episode_from(&CROSS_NOTATION_RE, raw),
            ParseRule::ReleaseYear => movie_by_year(raw),
            ParseRule::Fallback => {
                let title = clean(raw);
                (!title.is_empty()).then(|| ParsedTitle::movie(title, None))
            }
        }
    }
}

/// Strip the file extension and any `AKA` alternate title.
pub fn prepare(filename: &str) -> String {
    let raw = EXTENSION_RE.replace(filename, "");
    AKA_RE
        .split(&raw)
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Parse a filename. Returns `None` when nothing title-like remains.
pub fn parse(filename: &str) -> Option<ParsedTitle> {
    parse_with_rule(filename).map(|(_, parsed)| parsed)
}

/// Parse a filename and report which rule produced the result.
pub fn parse_with_rule(filename: &str) -> Option<(ParseRule, ParsedTitle)> {
    let raw = prepare(filename);
    let result = RULES
        .iter()
        .find_map(|rule| rule.apply(&raw).map(|parsed| (*rule, parsed)));

    match &result {
        Some((rule, parsed)) => tracing::debug!("Parsed '{}' via {:?}: {}", filename, rule, parsed),
        None => tracing::debug!("Could not parse: {}", filename),
    }

    result
}

/// Turn a URL slug into a parseable string (`/` and `-` become spaces).
pub fn slug_to_query(slug: &str) -> String {
    SLUG_SEPARATOR_RE.replace_all(slug, " ").into_owned()
}

/// Parse a URL slug such as `the-matrix-1999` or `tv/show-name-s01e05`.
pub fn parse_slug(slug: &str) -> Option<ParsedTitle> {
    parse(&slug_to_query(slug))
}

fn episode_from(re: &Regex, raw: &str) -> Option<ParsedTitle> {
    let caps = re.captures(raw)?;
    let title = clean(caps.get(1)?.as_str());
    if title.is_empty() {
        return None;
    }
    let season = number(&caps, 2)?;
    let episode = number(&caps, 3)?;
    ParsedTitle::episode(title, season, episode)
}

fn movie_by_year(raw: &str) -> Option<ParsedTitle> {
    // Titles may contain years themselves; the release year is the last one.
    // `_` counts as a word character for `\b`, so search a copy with spaces.
    // Offsets are unchanged since both are one byte.
    let spaced = raw.replace('_', " ");
    let last = YEAR_RE.find_iter(&spaced).last()?;
    let year: u16 = last.as_str().parse().ok()?;
    let title = clean(&raw[..last.start()]);
    if title.is_empty() {
        return None;
    }
    Some(ParsedTitle::movie(title, Some(year)))
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u16> {
    caps.get(group)?.as_str().parse().ok()
}
