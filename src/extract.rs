#![forbid(unsafe_code)]

//! Structural queries against a fetched watch page.
//!
//! The collector only sees the [`PageQuery`] trait, so tests can hand it a
//! canned table of texts instead of real markup. [`HtmlQuery`] is the real
//! thing, backed by CSS selectors.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::video::{
    Field, FieldError, VideoRecord, parse_published, parse_title, parse_view_count,
};

pub const DEFAULT_TITLE_SELECTOR: &str = ".watch-title";
pub const DEFAULT_PUBLISHED_SELECTOR: &str = ".watch-time-text";
pub const DEFAULT_VIEWS_SELECTOR: &str = ".watch-view-count";

/// CSS selectors for the three fields. Loadable from a TOML profile so a
/// layout change on the site does not need a rebuild:
///
/// ```toml
/// title = "h1.title"
/// views = "span.view-count"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSelectors {
    pub title: String,
    pub published: String,
    pub views: String,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_SELECTOR.to_string(),
            published: DEFAULT_PUBLISHED_SELECTOR.to_string(),
            views: DEFAULT_VIEWS_SELECTOR.to_string(),
        }
    }
}

impl FieldSelectors {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("parsing selector profile")
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Loading {}", path.display()))
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Published => &self.published,
            Field::Views => &self.views,
        }
    }
}

/// Capability the collector uses to look inside a page body.
pub trait PageQuery {
    type Document;

    fn parse(&self, body: &str) -> Self::Document;

    /// Text of every node matching `field`'s query, in document order.
    fn texts(&self, document: &Self::Document, field: Field) -> Vec<String>;
}

/// [`PageQuery`] over real HTML using the `scraper` crate.
#[derive(Debug)]
pub struct HtmlQuery {
    title: Selector,
    published: Selector,
    views: Selector,
}

impl HtmlQuery {
    pub fn new(selectors: &FieldSelectors) -> Result<Self> {
        Ok(Self {
            title: compile(Field::Title, &selectors.title)?,
            published: compile(Field::Published, &selectors.published)?,
            views: compile(Field::Views, &selectors.views)?,
        })
    }

    fn selector(&self, field: Field) -> &Selector {
        match field {
            Field::Title => &self.title,
            Field::Published => &self.published,
            Field::Views => &self.views,
        }
    }
}

fn compile(field: Field, raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|err| anyhow!("invalid {field} selector {raw:?}: {err:?}"))
}

impl PageQuery for HtmlQuery {
    type Document = Html;

    fn parse(&self, body: &str) -> Html {
        Html::parse_document(body)
    }

    fn texts(&self, document: &Html, field: Field) -> Vec<String> {
        document
            .select(self.selector(field))
            .map(node_text)
            .collect()
    }
}

/// Prefers the node's own text children; falls back to all descendant text
/// when the value sits inside a nested element.
fn node_text(element: ElementRef<'_>) -> String {
    let own: String = element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect();
    if own.trim().is_empty() {
        element.text().collect()
    } else {
        own
    }
}

/// Per-field results for one page. Every field is attempted regardless of
/// how the others went.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub title: Result<String, FieldError>,
    pub published: Result<String, FieldError>,
    pub views: Result<f64, FieldError>,
}

impl PageOutcome {
    pub fn errors(&self) -> Vec<&FieldError> {
        [
            self.title.as_ref().err(),
            self.published.as_ref().err(),
            self.views.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn failed_fields(&self) -> Vec<Field> {
        self.errors().into_iter().map(FieldError::field).collect()
    }

    pub fn is_disabled(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn into_record(self) -> VideoRecord {
        VideoRecord {
            title: self.title.ok(),
            published: self.published.ok(),
            views: self.views.ok(),
        }
    }
}

pub fn extract_page<Q>(query: &Q, body: &str) -> PageOutcome
where
    Q: PageQuery + ?Sized,
{
    let document = query.parse(body);
    let first = |field: Field| {
        query
            .texts(&document, field)
            .into_iter()
            .next()
            .ok_or(FieldError::Missing(field))
    };

    PageOutcome {
        title: first(Field::Title).and_then(|raw| parse_title(&raw)),
        published: first(Field::Published).and_then(|raw| parse_published(&raw)),
        views: first(Field::Views).and_then(|raw| parse_view_count(&raw)),
    }
}
