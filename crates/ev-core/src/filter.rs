//! # List Filter Engine
//!
//! Shared search / filter / sort for the events, hackathons and projects
//! views. Pure and synchronous: it selects and reorders references into the
//! caller's collection and never mutates a record.

use crate::models::Listing;
use crate::query::{normalized, QuerySpec, SortKey};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Reverse;

/// Produces the filtered, ordered view of `records` for `query`.
///
/// A record is kept when it passes the category, status and refinement
/// controls AND the text search. Sorting, when requested, is stable.
pub fn filter<'a, R: Listing>(records: &'a [R], query: &QuerySpec) -> Vec<&'a R> {
    let needle = query.needle();
    let prize = query.prize.as_deref().and_then(normalized);
    let location = query.location.as_deref().and_then(normalized);
    let difficulty = query.difficulty.as_deref().filter(|d| !d.is_empty());

    let mut kept: Vec<&R> = records
        .iter()
        .filter(|r| r.matches_category(&query.category_filter))
        .filter(|r| r.matches_status(&query.status_filter))
        .filter(|r| difficulty.map_or(true, |d| r.difficulty() == Some(d)))
        .filter(|r| prize.as_deref().map_or(true, |p| contains(r.prize(), p)))
        .filter(|r| location.as_deref().map_or(true, |l| contains(r.location(), l)))
        .filter(|r| needle.as_deref().map_or(true, |n| matches_search(*r, n)))
        .collect();

    if let Some(key) = query.sort_key {
        sort(&mut kept, key);
    }
    kept
}

/// True when `needle` (already lower-cased) occurs in any searchable field.
pub fn matches_search<R: Listing + ?Sized>(record: &R, needle: &str) -> bool {
    contains(record.title(), needle)
        || contains(record.description(), needle)
        || contains(record.location(), needle)
        || contains(record.author(), needle)
        || contains(record.category(), needle)
        || record.tags().iter().any(|tag| tag.to_lowercase().contains(needle))
}

fn contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|text| text.to_lowercase().contains(needle))
}

fn sort<R: Listing>(records: &mut [&R], key: SortKey) {
    // sort_by_cached_key is stable, so ties keep input order.
    match key {
        SortKey::Recent => records.sort_by_cached_key(|r| Reverse(parse_timestamp(r.last_updated()))),
        SortKey::Stars => records.sort_by_cached_key(|r| Reverse(r.stars())),
        SortKey::Forks => records.sort_by_cached_key(|r| Reverse(r.forks())),
        SortKey::Issues => records.sort_by_cached_key(|r| Reverse(r.open_issues())),
    }
}

/// Epoch millis for the date formats seen in listing payloads.
/// Missing or unparseable dates map to `None`, which orders before any date.
fn parse_timestamp(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
