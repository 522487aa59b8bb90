//! Mapping of raw location strings onto canonical city names.

use std::sync::LazyLock;

use regex::Regex;

/// Canonical name given to every remote-work location.
pub const REMOTE: &str = "Remote";

/// Maps a raw location string onto a canonical city name.
pub trait LocationNormalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;
}

impl<F> LocationNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, raw: &str) -> String {
        self(raw)
    }
}

static REMOTE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(remote|work from home|wfh|anywhere)\b").expect("valid regex")
});
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:,|/|\s-\s|\|)\s*").expect("valid regex"));

/// Lower-cased aliases and the city they stand for.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("bengaluru", "Bangalore"),
    ("bangalore", "Bangalore"),
    ("gurugram", "Gurgaon"),
    ("bombay", "Mumbai"),
    ("new delhi", "Delhi"),
    ("nyc", "New York"),
    ("new york city", "New York"),
    ("sf", "San Francisco"),
    ("san francisco bay area", "San Francisco"),
];

// ── CityNormalizer ────────────────────────────────────────────────────────────

/// Default normaliser: remote markers collapse to [`REMOTE`]; otherwise the
/// first segment of the string, alias-resolved and title-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct CityNormalizer;

impl LocationNormalizer for CityNormalizer {
    fn normalize(&self, raw: &str) -> String {
        if REMOTE_MARKERS.is_match(raw) {
            return REMOTE.to_string();
        }

        let stripped = PARENTHETICAL.replace_all(raw, " ");
        let first = SEPARATOR
            .split(stripped.trim())
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();
        let collapsed = first.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return String::new();
        }

        let lowered = collapsed.to_lowercase();
        if let Some((_, city)) = CITY_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
            return (*city).to_string();
        }
        title_case(&collapsed)
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_markers() {
        let n = CityNormalizer;
        assert_eq!(n.normalize("Remote"), "Remote");
        assert_eq!(n.normalize("Work From Home, India"), "Remote");
        assert_eq!(n.normalize("Anywhere (WFH)"), "Remote");
    }

    #[test]
    fn test_first_segment_is_kept() {
        let n = CityNormalizer;
        assert_eq!(n.normalize("pune, maharashtra, india"), "Pune");
        assert_eq!(n.normalize("Hyderabad / Secunderabad"), "Hyderabad");
        assert_eq!(n.normalize("Chennai - Tamil Nadu"), "Chennai");
    }

    #[test]
    fn test_parentheticals_and_whitespace_are_stripped() {
        let n = CityNormalizer;
        assert_eq!(n.normalize("  Kolkata   (Salt Lake)  "), "Kolkata");
        assert_eq!(n.normalize("los   angeles"), "Los Angeles");
    }

    #[test]
    fn test_aliases() {
        let n = CityNormalizer;
        assert_eq!(n.normalize("Bengaluru, Karnataka"), "Bangalore");
        assert_eq!(n.normalize("NYC"), "New York");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(CityNormalizer.normalize(""), "");
        assert_eq!(CityNormalizer.normalize(" , "), "");
    }

    #[test]
    fn test_closure_normalizer() {
        let upper = |raw: &str| raw.to_uppercase();
        assert_eq!(upper.normalize("pune"), "PUNE");
    }
}
