#![forbid(unsafe_code)]

//! Video identifiers, watch URLs and the per-video record the collector
//! accumulates.
//!
//! Field parsers live here too so the exact text rules (first line of the
//! title, first token of the view counter) are testable without any HTML.

use std::fmt;

use serde::Serialize;
use url::Url;

pub const DEFAULT_SITE_BASE: &str = "https://www.youtube.com";
pub const WATCH_PATH: &str = "/watch?v=";
pub const VIDEO_ID_LEN: usize = 11;

/// One of the three fields scraped from a watch page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    #[serde(rename = "date")]
    Published,
    Views,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Published, Field::Views];

    /// Column name used in the CSV header.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Published => "date",
            Field::Views => "views",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single field could not be extracted from an otherwise reachable page.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("no node matched the {0} selector")]
    Missing(Field),
    #[error("could not parse {field} from {raw:?}")]
    Unparseable { field: Field, raw: String },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Missing(field) => *field,
            FieldError::Unparseable { field, .. } => *field,
        }
    }
}

/// Whatever was captured for one video. Disabled videos may hold a subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoRecord {
    pub title: Option<String>,
    pub published: Option<String>,
    pub views: Option<f64>,
}

pub fn watch_url(site_base: &str, video_id: &str) -> String {
    format!("{}{WATCH_PATH}{video_id}", site_base.trim_end_matches('/'))
}

/// Accepts either a bare id or a watch/short-link URL and returns the id.
///
/// Anything that does not look like a URL is returned trimmed but otherwise
/// untouched; validity is a separate question answered by [`is_well_formed`].
pub fn video_id_from_input(input: &str) -> String {
    let trimmed = input.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else if trimmed.contains("/watch?") || trimmed.starts_with("youtu.be/") {
        format!("https://{trimmed}")
    } else {
        return trimmed.to_string();
    };
    let Ok(parsed) = Url::parse(&candidate) else {
        return trimmed.to_string();
    };
    if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| key == "v") {
        return value.into_owned();
    }
    let first_segment = parsed.path_segments().and_then(|mut parts| parts.next());
    if parsed.host_str() == Some("youtu.be")
        && let Some(segment) = first_segment
        && !segment.is_empty()
    {
        return segment.to_string();
    }
    trimmed.to_string()
}

pub fn is_well_formed(video_id: &str) -> bool {
    video_id.len() == VIDEO_ID_LEN
        && video_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Title nodes carry surrounding newlines and indentation; the first
/// non-blank line is the title.
pub fn parse_title(raw: &str) -> Result<String, FieldError> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FieldError::Unparseable {
            field: Field::Title,
            raw: raw.to_string(),
        })
}

/// The publish date is kept exactly as the page shows it, minus padding.
pub fn parse_published(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Unparseable {
            field: Field::Published,
            raw: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// `"1,234,567 views"` -> `1234567.0`.
pub fn parse_view_count(raw: &str) -> Result<f64, FieldError> {
    let unparseable = || FieldError::Unparseable {
        field: Field::Views,
        raw: raw.to_string(),
    };
    let token = raw.split_whitespace().next().ok_or_else(unparseable)?;
    token
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| unparseable())
}
