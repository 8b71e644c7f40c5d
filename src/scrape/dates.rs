//! Date normalization for raw date fragments found in link text.
//!
//! The site writes dates inconsistently: Indonesian month names
//! ("15 Januari 2024"), English names ("March 2022"), bare digit pairs, or
//! nothing useful at all. [`normalize`] converts all of these into a
//! canonical `YYYY-MM-DD` string and never fails outward; when nothing can
//! be parsed it falls back to January 1st of the supplied year.
//!
//! The result carries a [`DateOrigin`] so callers (and tests) can tell a
//! cleanly parsed date from a fallback, which the raw string alone cannot.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Localized month-name substitutions, applied as literal substring
/// replacements on the lowercased input. Full names come before their
/// abbreviations so "januari" rewrites before "jan" gets a chance to
/// mangle it. Substring matching inside unrelated words is a known,
/// accepted tradeoff.
const MONTH_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("januari", "jan"),
    ("february", "feb"),
    ("februari", "feb"),
    ("january", "jan"),
    ("march", "mar"),
    ("maret", "mar"),
    ("april", "apr"),
    ("mei", "may"),
    ("june", "jun"),
    ("juni", "jun"),
    ("july", "jul"),
    ("juli", "jul"),
    ("august", "aug"),
    ("agustus", "aug"),
    ("september", "sep"),
    ("october", "oct"),
    ("oktober", "okt"),
    ("okt", "oct"),
    ("november", "nov"),
    ("december", "dec"),
    ("desember", "des"),
    ("des", "dec"),
    ("agu", "aug"),
];

static DIGIT_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// How a normalized date was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrigin {
    /// One of the ordered date-format templates parsed the text.
    Template,
    /// Two digit runs were interpreted as day and month with the fallback year.
    DigitPair,
    /// A single digit run was interpreted as a day in January.
    DayOnly,
    /// Nothing parseable; January 1st of the fallback year.
    Fallback,
}

/// A canonical date plus the provenance of its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    /// Well-formed calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Whether the date was parsed or substituted.
    pub origin: DateOrigin,
}

impl NormalizedDate {
    fn fallback(year: i32) -> Self {
        NormalizedDate {
            date: format!("{year}-01-01"),
            origin: DateOrigin::Fallback,
        }
    }
}

/// Normalize a free-text date fragment into `YYYY-MM-DD`.
///
/// Total: always returns a value, never panics. Parsing proceeds through
/// three stages — month-name substitution plus format templates, then a
/// digit-run heuristic, then the full fallback `{year}-01-01`.
pub fn normalize(raw: &str, fallback_year: i32) -> NormalizedDate {
    let mut text = raw.to_lowercase();
    for (from, to) in MONTH_SUBSTITUTIONS {
        text = text.replace(from, to);
    }
    let text = text.trim();

    // Ordered templates: "day month year" first, then "month year" with the
    // day pinned to the 1st. chrono's %b accepts full names too, so the
    // substituted abbreviations and any untouched English full names both
    // parse here.
    if let Ok(dt) = NaiveDate::parse_from_str(text, "%d %b %Y") {
        return NormalizedDate {
            date: dt.format("%Y-%m-%d").to_string(),
            origin: DateOrigin::Template,
        };
    }
    if let Ok(dt) = NaiveDate::parse_from_str(&format!("01 {text}"), "%d %b %Y") {
        return NormalizedDate {
            date: dt.format("%Y-%m-%d").to_string(),
            origin: DateOrigin::Template,
        };
    }
    // "day month" without a year: append the fallback year before matching.
    if let Ok(dt) = NaiveDate::parse_from_str(&format!("{text} {fallback_year}"), "%d %b %Y") {
        return NormalizedDate {
            date: dt.format("%Y-%m-%d").to_string(),
            origin: DateOrigin::Template,
        };
    }

    digit_run_date(raw, fallback_year).unwrap_or_else(|| NormalizedDate::fallback(fallback_year))
}

/// Interpret bare digit runs in the raw text as a date.
///
/// Two or more runs: first is the day, second the month, year from the
/// fallback. Exactly one run: a day in January. Candidates that do not form
/// a real calendar date are rejected so the caller falls back instead of
/// emitting something like `2024-45-99`.
fn digit_run_date(raw: &str, fallback_year: i32) -> Option<NormalizedDate> {
    let runs: Vec<u32> = DIGIT_RUNS
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    let (day, month, origin) = match runs.as_slice() {
        [] => return None,
        [day] => (*day, 1, DateOrigin::DayOnly),
        [day, month, ..] => (*day, *month, DateOrigin::DigitPair),
    };

    let dt = NaiveDate::from_ymd_opt(fallback_year, month, day)?;
    Some(NormalizedDate {
        date: dt.format("%Y-%m-%d").to_string(),
        origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indonesian_full_month() {
        let d = normalize("15 Januari 2024", 2024);
        assert_eq!(d.date, "2024-01-15");
        assert_eq!(d.origin, DateOrigin::Template);
    }

    #[test]
    fn test_indonesian_abbreviations() {
        assert_eq!(normalize("3 Mei 2023", 2023).date, "2023-05-03");
        assert_eq!(normalize("12 Agu 2024", 2024).date, "2024-08-12");
        assert_eq!(normalize("7 Okt 2022", 2022).date, "2022-10-07");
        assert_eq!(normalize("25 Desember 2023", 2023).date, "2023-12-25");
    }

    #[test]
    fn test_month_year_pins_first_of_month() {
        let d = normalize("March 2022", 2022);
        assert_eq!(d.date, "2022-03-01");
        assert_eq!(d.origin, DateOrigin::Template);
        assert_eq!(normalize("Oktober 2024", 2024).date, "2024-10-01");
    }

    #[test]
    fn test_day_month_without_year_uses_fallback_year() {
        let d = normalize("15 Juni", 2023);
        assert_eq!(d.date, "2023-06-15");
        assert_eq!(d.origin, DateOrigin::Template);
    }

    #[test]
    fn test_garbage_falls_back() {
        let d = normalize("garbage", 2023);
        assert_eq!(d.date, "2023-01-01");
        assert_eq!(d.origin, DateOrigin::Fallback);
    }

    #[test]
    fn test_digit_pair() {
        let d = normalize("update 15/3", 2024);
        assert_eq!(d.date, "2024-03-15");
        assert_eq!(d.origin, DateOrigin::DigitPair);
    }

    #[test]
    fn test_single_digit_run_is_a_january_day() {
        let d = normalize("minggu ke 7", 2024);
        assert_eq!(d.date, "2024-01-07");
        assert_eq!(d.origin, DateOrigin::DayOnly);
    }

    #[test]
    fn test_impossible_digit_pair_falls_back() {
        let d = normalize("99 45", 2024);
        assert_eq!(d.date, "2024-01-01");
        assert_eq!(d.origin, DateOrigin::Fallback);
    }

    #[test]
    fn test_always_well_formed() {
        let samples = [
            "",
            "   ",
            "🚀🔥",
            "31 Feb 2023",
            "15 Januari 2024",
            "Pembaharuan fitur tanggal 29 Februari 2024",
            "0",
            "123456789012345678901234567890",
        ];
        let shape = Regex::new(r"^-?\d{1,}-\d{2}-\d{2}$").unwrap();
        for s in samples {
            let d = normalize(s, 2024);
            assert!(shape.is_match(&d.date), "bad date {:?} for input {:?}", d.date, s);
        }
    }

    #[test]
    fn test_leap_day_only_when_valid() {
        assert_eq!(normalize("29 Feb 2024", 2024).date, "2024-02-29");
        // 2023 has no Feb 29; templates fail, digit runs 29/2023 are not a
        // valid day/month pair either, so this collapses to the fallback.
        let d = normalize("29 Feb 2023", 2023);
        assert_eq!(d.date, "2023-01-01");
    }
}
