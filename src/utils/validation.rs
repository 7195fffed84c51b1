//! String format predicates consumed by the `string` type.
//!
//! Every predicate is pure: it inspects the given string and answers whether
//! it conforms to the format. No normalization happens here, callers trim
//! before asking.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};

// The patterns below are compile-time constants, a failure here is a bug.
fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => panic!("invalid built-in pattern {pattern}: {e}"),
    }
}

static SLUG: Lazy<Regex> = Lazy::new(|| compile(r"^[a-z0-9]+(?:[a-z0-9-]*[a-z0-9])?$"));
static SLUG_WITH_SLASHES: Lazy<Regex> =
    Lazy::new(|| compile(r"^[a-z0-9]+(?:[a-z0-9/-]*[a-z0-9])?$"));
static DATED_SLUG: Lazy<Regex> =
    Lazy::new(|| compile(r"^(\d{4}-\d{2}-\d{2})-([a-z0-9]+(?:[a-z0-9-]*[a-z0-9])?)$"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    compile(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$")
});
static HASHTAG: Lazy<Regex> = Lazy::new(|| compile(r"^#?[\p{L}\p{N}_]*[\p{L}_][\p{L}\p{N}_]*$"));
static HOSTNAME_LABEL: Lazy<Regex> =
    Lazy::new(|| compile(r"^[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"));
static URI: Lazy<Regex> = Lazy::new(|| compile(r"^[a-zA-Z][a-zA-Z0-9+.-]*:[^\s]+$"));
static URL: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?i)(https?|ftp)://(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:[a-z0-9\-._~%]+|\[[a-f0-9:.]+\])(?::\d{1,5})?(?:[/?#][^\s]*)?$")
});

/// Validation utilities for the closed set of string formats.
pub struct ValidationUtils;

impl ValidationUtils {
    /// Calendar date in `YYYY-MM-DD` form.
    pub fn is_valid_date(value: &str) -> bool {
        value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
    }

    /// ISO 8601 date-time, with or without an offset.
    pub fn is_valid_date_time(value: &str) -> bool {
        DateTime::parse_from_rfc3339(value).is_ok()
            || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
    }

    pub fn is_valid_slug(value: &str) -> bool {
        SLUG.is_match(value)
    }

    /// Slugs that may also contain path separators, e.g. `news/local-story`.
    pub fn is_valid_slug_with_slashes(value: &str) -> bool {
        SLUG_WITH_SLASHES.is_match(value)
    }

    /// `YYYY-MM-DD-slug` where the date is a real calendar date.
    pub fn is_valid_dated_slug(value: &str) -> bool {
        DATED_SLUG
            .captures(value)
            .and_then(|c| c.get(1))
            .map(|date| Self::is_valid_date(date.as_str()))
            .unwrap_or(false)
    }

    pub fn is_valid_email(value: &str) -> bool {
        value.len() <= 254 && EMAIL.is_match(value)
    }

    /// Hashtags may carry a leading `#` and must contain at least one letter.
    pub fn is_valid_hashtag(value: &str) -> bool {
        let tag = value.strip_prefix('#').unwrap_or(value);
        !tag.is_empty() && tag.chars().count() <= 139 && HASHTAG.is_match(value)
    }

    pub fn is_valid_ipv4(value: &str) -> bool {
        value.parse::<Ipv4Addr>().is_ok()
    }

    pub fn is_valid_ipv6(value: &str) -> bool {
        value.parse::<Ipv6Addr>().is_ok()
    }

    pub fn is_valid_hostname(value: &str) -> bool {
        let host = value.strip_suffix('.').unwrap_or(value);
        !host.is_empty()
            && host.len() <= 253
            && host.split('.').all(|label| HOSTNAME_LABEL.is_match(label))
    }

    pub fn is_valid_uri(value: &str) -> bool {
        URI.is_match(value)
    }

    pub fn is_valid_url(value: &str) -> bool {
        URL.is_match(value)
    }

    pub fn is_valid_uuid(value: &str) -> bool {
        uuid::Uuid::parse_str(value).is_ok()
    }
}
