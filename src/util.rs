//! String and duration utilities for track matching.

use std::{sync::LazyLock, time::Duration};

use regex_lite::Regex;

/// Placeholder for metadata fields the upstream response did not carry.
/// Titles and artists must never be empty strings.
pub const UNKNOWN: &str = "Unknown";

static NOISE_PARENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([^)]*(?:version|video|audio|official|lyrics)\)")
        .expect("invalid noise pattern")
});

static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("invalid bracket pattern"));

static NOISE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)official (?:music )?video|official audio|lyric video|with lyrics")
        .expect("invalid suffix pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace pattern"));

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("invalid duration pattern")
});

/// Strips noise suffixes like "(Official Video)" or "[Lyrics]" from a
/// title so that search queries match the underlying song rather than a
/// particular upload's packaging.
#[must_use]
pub fn cleanup_title(title: &str) -> String {
    let cleaned = NOISE_PARENS.replace_all(title, "");
    let cleaned = BRACKETS.replace_all(&cleaned, "");
    let cleaned = NOISE_SUFFIX.replace_all(&cleaned, "");
    WHITESPACE.replace_all(cleaned.trim(), " ").into_owned()
}

/// Builds the bridge search query for a track.
#[must_use]
pub fn search_query(artist: &str, title: &str) -> String {
    format!("{artist} - {}", cleanup_title(title))
}

/// Compares two titles for similarity, 0.0 (nothing in common) to 1.0
/// (equal after cleanup). Levenshtein distance over the cleaned,
/// lowercased titles, normalized by the longer length.
///
/// Note: the bridge deliberately does not consult this score; the first
/// search result wins. The score is kept for diagnostics.
#[must_use]
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = cleanup_title(&a.to_lowercase());
    let b = cleanup_title(&b.to_lowercase());

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    #[expect(clippy::cast_precision_loss)]
    let score = 1.0 - (levenshtein(&a, &b) as f64 / max_len as f64);
    score
}

/// Levenshtein edit distance, two-row implementation.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (current[j] + 1).min(prev[j + 1] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

/// Parses an ISO 8601 duration as returned by the Data API, e.g.
/// `PT1H2M3S`. Unparseable input yields a zero duration rather than an
/// error: duration is best-effort metadata.
#[must_use]
pub fn parse_iso_duration(iso: &str) -> Duration {
    let Some(captures) = ISO_DURATION.captures(iso) else {
        return Duration::ZERO;
    };

    let field = |i: usize| {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    Duration::from_secs(field(1) * 3600 + field(2) * 60 + field(3))
}

/// Parses renderer time text like `"1:02:03"` or `"4:20"` into a
/// duration. Unparseable input yields a zero duration.
#[must_use]
pub fn parse_time_text(text: &str) -> Duration {
    let parts: Vec<_> = text.split(':').map(str::parse::<u64>).collect();
    if parts.iter().any(std::result::Result::is_err) {
        return Duration::ZERO;
    }
    let parts: Vec<u64> = parts.into_iter().map(|p| p.unwrap_or(0)).collect();

    let seconds = match parts.as_slice() {
        [h, m, s] => h * 3600 + m * 60 + s,
        [m, s] => m * 60 + s,
        [s] => *s,
        _ => 0,
    };

    Duration::from_secs(seconds)
}

/// Replaces an empty string with the [`UNKNOWN`] placeholder.
#[must_use]
pub fn or_unknown(value: String) -> String {
    if value.trim().is_empty() {
        UNKNOWN.to_owned()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_strips_noise() {
        assert_eq!(
            cleanup_title("Never Gonna Give You Up (Official Video)"),
            "Never Gonna Give You Up"
        );
        assert_eq!(cleanup_title("Song [4K Remaster]  (Lyric Video)"), "Song");
        assert_eq!(cleanup_title("Plain Title"), "Plain Title");
    }

    #[test]
    fn cleanup_collapses_whitespace() {
        assert_eq!(cleanup_title("  a   b "), "a b");
    }

    #[test]
    fn query_shape() {
        assert_eq!(
            search_query("Rick Astley", "Never Gonna Give You Up (Official Video)"),
            "Rick Astley - Never Gonna Give You Up"
        );
    }

    #[test]
    fn similarity_bounds() {
        assert!((title_similarity("same", "same") - 1.0).abs() < f64::EPSILON);
        assert!((title_similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(title_similarity("abcd", "wxyz") < 0.5);
        // Noise suffixes do not count against similarity.
        assert!((title_similarity("Song (Official Video)", "song") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_iso_duration("PT1H2M3S"), Duration::from_secs(3723));
        assert_eq!(parse_iso_duration("PT4M20S"), Duration::from_secs(260));
        assert_eq!(parse_iso_duration("PT45S"), Duration::from_secs(45));
        assert_eq!(parse_iso_duration("garbage"), Duration::ZERO);
    }

    #[test]
    fn time_text() {
        assert_eq!(parse_time_text("1:02:03"), Duration::from_secs(3723));
        assert_eq!(parse_time_text("4:20"), Duration::from_secs(260));
        assert_eq!(parse_time_text("59"), Duration::from_secs(59));
        assert_eq!(parse_time_text("not a time"), Duration::ZERO);
    }

    #[test]
    fn unknown_placeholder() {
        assert_eq!(or_unknown(String::new()), "Unknown");
        assert_eq!(or_unknown("  ".to_owned()), "Unknown");
        assert_eq!(or_unknown("Artist".to_owned()), "Artist");
    }
}
