//! Integration tests for title cleaning and parsing.
//!
//! Tests cover:
//! - Junk token removal
//! - Series, year and fallback rules and their priority
//! - Slug parsing

use stream_manager::core::cleaner::clean;
use stream_manager::core::parser::{parse, parse_slug, parse_with_rule, ParseRule, RULES};
use stream_manager::models::media::ParsedTitle;

// ========== CLEANER TESTS ==========

#[test]
fn test_clean_removes_junk_as_whole_words() {
    let junk = [
        "1080p", "720p", "2160p", "4K", "BluRay", "WEB-DL", "WEBRip", "HDRip", "x264", "x265",
        "HEVC", "10bit", "AAC", "DTS", "Hindi", "English", "Dual Audio", "ESubs", "YIFY", "RARBG",
        "UNCUT", "Extended", "Remastered",
    ];

    for token in junk {
        let raw = format!("Some Title {} Release", token);
        let cleaned = clean(&raw);
        assert_eq!(cleaned, "Some Title Release", "token {:?} was not removed", token);
    }
}

#[test]
fn test_clean_is_case_insensitive() {
    assert_eq!(clean("Title.bluray.X264.hevc"), "Title");
}

#[test]
fn test_clean_drops_bracketed_segments() {
    assert_eq!(clean("[TGx] Title {tt0111161} [1080p]"), "Title");
}

// ========== PARSER TESTS ==========

#[test]
fn test_parse_series_filename() {
    assert_eq!(
        parse("Show.Name.S02E09.1080p.mkv"),
        ParsedTitle::episode("Show Name", 2, 9)
    );
}

#[test]
fn test_parse_movie_with_parenthesised_year() {
    assert_eq!(
        parse("Movie Title (2003) 1080p BluRay x264.mkv"),
        Some(ParsedTitle::movie("Movie Title", Some(2003)))
    );
}

#[test]
fn test_parse_last_year_wins() {
    let parsed = parse("2001.A.Space.Odyssey.1968.mkv").unwrap();
    assert_eq!(parsed.year(), Some(1968));
    assert_eq!(parsed.title, "2001 A Space Odyssey");
}

#[test]
fn test_series_rules_beat_year_rule() {
    let (rule, parsed) = parse_with_rule("Show.2019.S01E03.Air.Date.2019.mkv").unwrap();
    assert_eq!(rule, ParseRule::SeasonEpisode);
    assert_eq!(parsed, ParsedTitle::episode("Show 2019", 1, 3).unwrap());
    assert_eq!(parsed.year(), None);
}

#[test]
fn test_series_without_title_falls_through() {
    // No title before S01E01, so the series rule is rejected
    let (rule, parsed) = parse_with_rule("S01E01.2020.mkv").unwrap();
    assert_ne!(rule, ParseRule::SeasonEpisode);
    assert!(!parsed.is_series());
}

#[test]
fn test_parse_spelled_and_cross_notation() {
    assert_eq!(
        parse("Show Name Season 1 Episode 10.mp4"),
        ParsedTitle::episode("Show Name", 1, 10)
    );
    assert_eq!(
        parse("Show.Name.2x05.HDTV.avi"),
        ParsedTitle::episode("Show Name", 2, 5)
    );
}

#[test]
fn test_parse_truncates_aka() {
    assert_eq!(
        parse("Main Title AKA Other Title 1999.mkv"),
        Some(ParsedTitle::movie("Main Title", None))
    );
}

#[test]
fn test_parse_fallback_and_failure() {
    assert_eq!(
        parse("Some.Random.Movie.mkv"),
        Some(ParsedTitle::movie("Some Random Movie", None))
    );
    assert_eq!(parse("1080p.x264.mkv"), None);
    assert_eq!(parse(""), None);
}

#[test]
fn test_rules_are_ordered() {
    assert_eq!(RULES[0], ParseRule::SeasonEpisode);
    assert_eq!(RULES[RULES.len() - 1], ParseRule::Fallback);
}

#[test]
fn test_parsed_series_invariant() {
    let names = [
        "Show.S01E01.mkv",
        "Show Season 3 Episode 4",
        "Show 1x02",
        "Movie 1999",
        "Movie",
    ];
    for name in names {
        let parsed = parse(name).unwrap();
        if parsed.is_series() {
            assert!(parsed.season().unwrap() > 0);
            assert!(parsed.episode_number().unwrap() > 0);
            assert_eq!(parsed.year(), None);
        } else {
            assert_eq!(parsed.season(), None);
            assert_eq!(parsed.episode_number(), None);
        }
    }
}

#[test]
fn test_underscore_names_keep_their_year() {
    let dotted = parse("Movie.Title.2003.1080p.BluRay.mkv").unwrap();
    let underscored = parse("Movie_Title_2003_1080p_BluRay.mkv").unwrap();
    assert_eq!(underscored, ParsedTitle::movie("Movie Title", Some(2003)));
    assert_eq!(underscored, dotted);
}

#[test]
fn test_resolution_is_not_an_episode() {
    let (rule, parsed) = parse_with_rule("Movie 2003 1920x1080.mkv").unwrap();
    assert_eq!(rule, ParseRule::ReleaseYear);
    assert_eq!(parsed, ParsedTitle::movie("Movie", Some(2003)));
}

// ========== SLUG TESTS ==========

#[test]
fn test_parse_slug() {
    assert_eq!(
        parse_slug("movie/the-matrix-1999"),
        Some(ParsedTitle::movie("movie the matrix", Some(1999)))
    );
    assert_eq!(
        parse_slug("breaking-bad-s01e05"),
        ParsedTitle::episode("breaking bad", 1, 5)
    );
}
