// src/ingest/normalize.rs
//! Raw feed entry → canonical item candidate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::types::RawEntry;
use crate::store::NewItem;

const SNIPPET_MAX_CHARS: usize = 1500;

/// Map a raw entry to an item candidate, or `None` when title or link is blank.
pub fn normalize_entry(raw: &RawEntry, source_id: i64) -> Option<NewItem> {
    let title = non_blank(raw.title.as_deref())?;
    let url = non_blank(raw.link.as_deref())?;

    let published_at = first_non_empty(raw.iso_date.as_deref(), raw.pub_date.as_deref())
        .and_then(parse_feed_date);
    let author = first_non_empty(raw.creator.as_deref(), raw.author.as_deref()).map(str::to_string);

    Some(NewItem {
        source_id,
        title,
        url,
        guid: raw.guid.clone(),
        published_at,
        summary: raw.content_snippet.clone(),
        author,
        tags: Vec::new(),
    })
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn first_non_empty<'a>(primary: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    primary.filter(|s| !s.is_empty()).or(fallback.filter(|s| !s.is_empty()))
}

/// Parse the date formats feeds use in practice. Unparseable input is `None`.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s).or_else(|_| DateTime::parse_from_rfc2822(s)) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offset-less forms are taken as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Plain-text snippet of an HTML body: entities decoded, tags stripped,
/// whitespace collapsed, capped at 1500 chars. Empty results are `None`.
pub fn snippet_text(s: &str) -> Option<String> {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > SNIPPET_MAX_CHARS {
        out = out.chars().take(SNIPPET_MAX_CHARS).collect();
    }

    (!out.is_empty()).then_some(out)
}
