//! Title cleaning.
//!
//! Strips release junk from raw filename fragments so that only the title
//! text remains: bracketed ids, quality and codec markers, language tags,
//! release groups and site names.

use once_cell::sync::Lazy;
use regex::Regex;

/// Junk tokens removed as whole words, case-insensitively.
const JUNK_KEYWORDS: &[&str] = &[
    // Quality & resolution
    "4k", "uhd", "2160p", "1080p", "720p", "480p", "hd",
    // Source & rip type
    "blu-ray", "bluray", "brrip", "bdrip", "web-dl", "webrip", "web", "hdrip", "dvdrip",
    "hdts", "hdcam", "camrip", "predvdrip", "hdtc", "amzn", "nf", "hbo", "hc",
    // Video & audio codecs
    "x264", "h264", "x265", "h265", "hevc", "avc", "10bit", "8bit",
    "dts-hd", "dts", "ac3", "dd5.1", "ddp 5.1", "ddp2.0", "aac", "mp3",
    // Language & subtitles
    "dual audio", "dual-audio", "multi-audio", "hindi", "english", "korean", "japanese",
    "tamil", "telugu", "french", "spanish", "ukrainian", "turkish",
    "dubbed", "org", "esub", "esubs", "msub", "msubs", "hc-esub", "hc-sub",
    // Release groups & sites
    "bollyflix", "moviesmod", "themoviesflix", "moonflix", "vegamovies", "1337x", "topmovies",
    "yify", "yts", "rarbg", "torrent", "saon", "tfa",
    // Editions
    "uncut", "unrated", "extended", "remastered", "special edition", "x-rated",
    "reloaded version",
    // Extensions & domains
    "mkv", "mp4", "avi", "com", "net", "info", "email",
];

static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

static BRACED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

static JUNK_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = JUNK_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
});

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._\-]+").unwrap());

static EMPTY_PARENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean a raw title fragment.
///
/// Never fails; the result may be empty when nothing but junk was present.
pub fn clean(raw: &str) -> String {
    // `_` is a word character, so it would hide junk from `\b`
    let s = raw.replace('_', " ");
    let s = BRACKETED_RE.replace_all(&s, "");
    let s = BRACED_RE.replace_all(&s, "");
    let s = JUNK_RE.replace_all(&s, "");
    let s = SEPARATOR_RE.replace_all(&s, " ");
    let s = strip_unbalanced_parens(&s);
    let s = EMPTY_PARENS_RE.replace_all(&s, "");
    let s = WHITESPACE_RE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Normalize a title for comparison: lowercase alphanumerics only.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Drop parentheses that have no partner, e.g. the `(` left over when a
/// title is cut right before `(2003)`.
fn strip_unbalanced_parens(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut keep = vec![true; chars.len()];
    let mut open = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        match c {
            '(' => open.push(i),
            ')' => {
                if open.pop().is_none() {
                    keep[i] = false;
                }
            }
            _ => {}
        }
    }
    for i in open {
        keep[i] = false;
    }

    chars
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}
