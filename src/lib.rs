#![forbid(unsafe_code)]

//! Scrapes title, publish date and view count from YouTube watch pages and
//! writes the complete rows to a CSV file.
//!
//! [`collector::Collector`] drives a run; transport lives behind
//! [`fetch::PageFetcher`] and markup queries behind [`extract::PageQuery`], so
//! either side can be swapped out in tests.

pub mod collector;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod report;
pub mod video;

pub use collector::{Collector, CollectorError};
pub use extract::{FieldSelectors, HtmlQuery, PageQuery};
pub use fetch::{HttpFetcher, PageFetcher};
pub use video::{Field, VideoRecord};
