#![forbid(unsafe_code)]

//! The collection run: fetch every watch page, extract title, publish date and
//! view count, and sort each video into one of three buckets.
//!
//! * unreachable pages are skipped and leave no trace in `valid`;
//! * reachable pages land in `valid`;
//! * reachable pages where any field failed are additionally `disabled`.
//!
//! Read accessors refuse to answer before [`Collector::run`] has finished so a
//! caller never mistakes "not collected yet" for "no data".

use std::{
    collections::{HashMap, HashSet},
    io,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::extract::{PageOutcome, PageQuery, extract_page};
use crate::fetch::PageFetcher;
use crate::report::{DisabledVideo, RunSummary, SkippedVideo};
use crate::video::{
    DEFAULT_SITE_BASE, Field, FieldError, VideoRecord, is_well_formed, video_id_from_input,
    watch_url,
};

pub const DEFAULT_PROGRESS_EVERY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("collector has not run yet; call run() before reading results")]
    NotReady,
    #[error("video {0} was not collected")]
    MissingKey(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One CSV row. Field order is the header order.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    video_id: &'a str,
    title: &'a str,
    date: &'a str,
    views: f64,
}

/// What happened to a single page.
#[derive(Debug)]
enum Visit {
    Unreachable(String),
    Fetched(PageOutcome),
}

/// Results accumulated during a run, swapped into the collector at the end.
#[derive(Debug, Default)]
struct Tally {
    collected: HashMap<String, VideoRecord>,
    valid: HashSet<String>,
    disabled: HashMap<String, Vec<FieldError>>,
    skipped: HashMap<String, String>,
}

impl Tally {
    fn absorb(&mut self, video_id: &str, visit: Visit) {
        match visit {
            Visit::Unreachable(reason) => {
                debug!(video_id, %reason, "page unreachable, skipping");
                self.skipped.insert(video_id.to_string(), reason);
            }
            Visit::Fetched(outcome) => {
                self.valid.insert(video_id.to_string());
                let errors: Vec<FieldError> = outcome.errors().into_iter().cloned().collect();
                if !errors.is_empty() {
                    debug!(video_id, fields = ?outcome.failed_fields(), "partial page, disabling");
                    self.disabled.insert(video_id.to_string(), errors);
                }
                self.collected
                    .insert(video_id.to_string(), outcome.into_record());
            }
        }
    }
}

pub struct Collector<F, Q> {
    identifiers: Vec<String>,
    urls: Vec<String>,
    site_base: String,
    fetcher: F,
    query: Q,
    workers: usize,
    progress_every: usize,
    collected: HashMap<String, VideoRecord>,
    valid: HashSet<String>,
    disabled: HashMap<String, Vec<FieldError>>,
    skipped: HashMap<String, String>,
    collected_at: DateTime<Utc>,
    done: bool,
}

impl<F, Q> Collector<F, Q>
where
    F: PageFetcher + Sync,
    Q: PageQuery + Sync,
{
    /// Accepts bare ids or watch URLs. Repeated videos are kept once, at their
    /// first position. Nothing is fetched until [`run`](Self::run).
    pub fn new<I, S>(inputs: I, fetcher: F, query: Q) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();
        for input in inputs {
            let video_id = video_id_from_input(input.as_ref());
            if video_id.is_empty() {
                continue;
            }
            if !seen.insert(video_id.clone()) {
                debug!(video_id = %video_id, "duplicate input ignored");
                continue;
            }
            identifiers.push(video_id);
        }

        let site_base = DEFAULT_SITE_BASE.to_string();
        let urls = build_urls(&site_base, &identifiers);
        Self {
            identifiers,
            urls,
            site_base,
            fetcher,
            query,
            workers: 1,
            progress_every: DEFAULT_PROGRESS_EVERY,
            collected: HashMap::new(),
            valid: HashSet::new(),
            disabled: HashMap::new(),
            skipped: HashMap::new(),
            collected_at: Utc::now(),
            done: false,
        }
    }

    pub fn with_site_base(mut self, site_base: impl Into<String>) -> Self {
        self.site_base = site_base.into();
        self.urls = build_urls(&self.site_base, &self.identifiers);
        self
    }

    /// Number of pages fetched at once. `1` keeps the run strictly sequential.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }

    /// Visits every page once, in input order when sequential. Never aborts
    /// on a single video; calling it again starts over from scratch.
    pub fn run(&mut self) {
        let total = self.identifiers.len();
        let workers = self.workers.min(total).max(1);
        info!(total, workers, site_base = %self.site_base, "start collection");
        self.done = false;

        let tally = if workers == 1 {
            self.run_sequential()
        } else {
            self.run_pooled(workers)
        };

        self.collected = tally.collected;
        self.valid = tally.valid;
        self.disabled = tally.disabled;
        self.skipped = tally.skipped;
        self.done = true;
        info!(
            total,
            valid = self.valid.len(),
            disabled = self.disabled.len(),
            skipped = self.skipped.len(),
            "collection finished"
        );
    }

    fn run_sequential(&self) -> Tally {
        let mut tally = Tally::default();
        for index in 0..self.identifiers.len() {
            let visit = self.visit(index);
            tally.absorb(&self.identifiers[index], visit);
            self.report_progress(index + 1);
        }
        tally
    }

    /// Workers pull the next index off a shared counter; page work happens
    /// outside the lock and only the merge into the tally is serialized.
    fn run_pooled(&self, workers: usize) -> Tally {
        let next = AtomicUsize::new(0);
        let processed = AtomicUsize::new(0);
        let tally = Mutex::new(Tally::default());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        if index >= self.identifiers.len() {
                            break;
                        }
                        let visit = self.visit(index);
                        tally.lock().absorb(&self.identifiers[index], visit);
                        self.report_progress(processed.fetch_add(1, Ordering::Relaxed) + 1);
                    }
                });
            }
        });

        tally.into_inner()
    }

    fn visit(&self, index: usize) -> Visit {
        let video_id = &self.identifiers[index];
        let url = &self.urls[index];
        if !is_well_formed(video_id) {
            warn!(video_id = %video_id, "video id does not look like an 11 character id");
        }
        match self.fetcher.fetch(url) {
            Ok(body) => Visit::Fetched(extract_page(&self.query, &body)),
            Err(err) => Visit::Unreachable(format!("{err:#}")),
        }
    }

    fn report_progress(&self, processed: usize) {
        if processed % self.progress_every == 0 {
            info!(
                processed,
                total = self.identifiers.len(),
                "visited {processed} urls"
            );
        }
    }
}

impl<F, Q> Collector<F, Q> {
    fn ensure_done(&self) -> Result<(), CollectorError> {
        if self.done {
            Ok(())
        } else {
            Err(CollectorError::NotReady)
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn site_base(&self) -> &str {
        &self.site_base
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn valid(&self) -> &HashSet<String> {
        &self.valid
    }

    pub fn disabled(&self) -> HashSet<&str> {
        self.disabled.keys().map(String::as_str).collect()
    }

    pub fn is_disabled(&self, input: &str) -> bool {
        self.disabled.contains_key(&video_id_from_input(input))
    }

    /// Which fields sent a video to `disabled`, if it is there.
    pub fn failed_fields(&self, input: &str) -> Option<Vec<Field>> {
        self.disabled
            .get(&video_id_from_input(input))
            .map(|errors| errors.iter().map(FieldError::field).collect())
    }

    pub fn record(&self, input: &str) -> Option<&VideoRecord> {
        self.collected.get(&video_id_from_input(input))
    }

    /// Videos whose page could not be fetched, with the transport error, in
    /// input order.
    pub fn skipped(&self) -> Vec<(&str, &str)> {
        self.identifiers
            .iter()
            .filter_map(|video_id| {
                self.skipped
                    .get(video_id)
                    .map(|reason| (video_id.as_str(), reason.as_str()))
            })
            .collect()
    }

    /// View count for an id or watch URL. Disabled videos report `0.0` even
    /// when a count was captured.
    pub fn views(&self, input: &str) -> Result<f64, CollectorError> {
        self.ensure_done()?;
        let video_id = video_id_from_input(input);
        if self.disabled.contains_key(&video_id) {
            return Ok(0.0);
        }
        self.collected
            .get(&video_id)
            .and_then(|record| record.views)
            .ok_or(CollectorError::MissingKey(video_id))
    }

    /// `valid - disabled`, as ids or as watch URLs, in input order.
    pub fn non_disabled(&self, as_urls: bool) -> Result<Vec<String>, CollectorError> {
        self.ensure_done()?;
        Ok(self
            .identifiers
            .iter()
            .zip(&self.urls)
            .filter(|(video_id, _)| self.is_complete(video_id))
            .map(|(video_id, url)| {
                if as_urls {
                    url.clone()
                } else {
                    video_id.clone()
                }
            })
            .collect())
    }

    fn is_complete(&self, video_id: &str) -> bool {
        self.valid.contains(video_id) && !self.disabled.contains_key(video_id)
    }

    fn csv_row<'a>(&'a self, video_id: &'a str) -> Option<CsvRow<'a>> {
        if !self.is_complete(video_id) {
            return None;
        }
        let record = self.collected.get(video_id)?;
        Some(CsvRow {
            video_id,
            title: record.title.as_deref()?,
            date: record.published.as_deref()?,
            views: record.views?,
        })
    }

    /// Writes `video_id,title,date,views` plus one row per complete video and
    /// returns the number of data rows.
    pub fn save(&self, path: &Path) -> Result<usize, CollectorError> {
        self.ensure_done()?;
        let mut writer = csv::Writer::from_path(path)?;
        let mut rows = 0;
        for video_id in &self.identifiers {
            if let Some(row) = self.csv_row(video_id) {
                writer.serialize(row)?;
                rows += 1;
            }
        }
        if rows == 0 {
            writer.write_record(["video_id", "title", "date", "views"])?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows, "file saved");
        Ok(rows)
    }

    pub fn summary(&self) -> Result<RunSummary, CollectorError> {
        self.ensure_done()?;
        let disabled = self
            .identifiers
            .iter()
            .filter_map(|video_id| {
                self.disabled.get(video_id).map(|errors| DisabledVideo {
                    video_id: video_id.clone(),
                    fields: errors.iter().map(FieldError::field).collect(),
                    reasons: errors.iter().map(ToString::to_string).collect(),
                })
            })
            .collect();
        let skipped = self
            .skipped()
            .into_iter()
            .map(|(video_id, reason)| SkippedVideo {
                video_id: video_id.to_string(),
                reason: reason.to_string(),
            })
            .collect();

        Ok(RunSummary {
            collected_at: self.collected_at,
            total: self.identifiers.len(),
            valid: self.valid.len(),
            complete: self.valid.len() - self.disabled.len(),
            disabled,
            skipped,
        })
    }
}

fn build_urls(site_base: &str, identifiers: &[String]) -> Vec<String> {
    identifiers
        .iter()
        .map(|video_id| watch_url(site_base, video_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FieldSelectors, HtmlQuery};
    use anyhow::{Result, anyhow};
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    const A: &str = "AAAAAAAAAAA";
    const B: &str = "BBBBBBBBBBB";
    const C: &str = "CCCCCCCCCCC";

    /// Serves canned bodies by URL; anything else is a connection failure.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn page(mut self, video_id: &str, body: &str) -> Self {
            self.pages
                .insert(watch_url(DEFAULT_SITE_BASE, video_id), body.to_string());
            self
        }
    }

    impl PageFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.calls.lock().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("connection refused"))
        }
    }

    /// Bodies are `field=text` lines; no markup involved.
    struct FakeQuery;

    impl PageQuery for FakeQuery {
        type Document = HashMap<String, Vec<String>>;

        fn parse(&self, body: &str) -> Self::Document {
            let mut document: Self::Document = HashMap::new();
            for line in body.lines() {
                if let Some((field, text)) = line.split_once('=') {
                    document
                        .entry(field.trim().to_string())
                        .or_default()
                        .push(text.to_string());
                }
            }
            document
        }

        fn texts(&self, document: &Self::Document, field: Field) -> Vec<String> {
            document.get(field.as_str()).cloned().unwrap_or_default()
        }
    }

    fn full_page(title: &str, date: &str, views: &str) -> String {
        format!("title={title}\ndate={date}\nviews={views}\n")
    }

    fn collector(fetcher: FakeFetcher, ids: &[&str]) -> Collector<FakeFetcher, FakeQuery> {
        Collector::new(ids.iter().copied(), fetcher, FakeQuery)
    }

    fn scenario() -> Collector<FakeFetcher, FakeQuery> {
        let fetcher = FakeFetcher::default()
            .page(A, &full_page("First", "Jan 1, 2020", "1,234,567 views"))
            .page(B, "title=Second\ndate=Feb 2, 2020\nviews=oops\n");
        let mut collector = collector(fetcher, &[A, B, C]);
        collector.run();
        collector
    }

    fn set<'a>(items: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        items.into_iter().map(str::to_string).collect()
    }

    #[test]
    fn new_does_not_fetch() {
        let collector = collector(FakeFetcher::default(), &[A]);
        assert!(collector.fetcher.calls.lock().is_empty());
        assert!(!collector.is_done());
        assert_eq!(
            collector.urls(),
            [format!("https://www.youtube.com/watch?v={A}")]
        );
    }

    #[test]
    fn new_normalizes_urls_and_drops_duplicates() {
        let url = format!("https://www.youtube.com/watch?v={B}");
        let collector = collector(FakeFetcher::default(), &[A, &url, B, "  ", A]);
        assert_eq!(collector.identifiers(), [A, B]);
    }

    #[test]
    fn accessors_refuse_before_run() {
        let dir = tempdir().unwrap();
        let collector = collector(FakeFetcher::default(), &[A]);
        assert!(matches!(collector.views(A), Err(CollectorError::NotReady)));
        assert!(matches!(
            collector.non_disabled(false),
            Err(CollectorError::NotReady)
        ));
        assert!(matches!(
            collector.save(&dir.path().join("out.csv")),
            Err(CollectorError::NotReady)
        ));
        assert!(!dir.path().join("out.csv").exists());
        assert!(matches!(collector.summary(), Err(CollectorError::NotReady)));
    }

    #[test]
    fn complete_page_is_valid_and_not_disabled() {
        let fetcher =
            FakeFetcher::default().page(A, &full_page("First", "Jan 1, 2020", "1,234,567 views"));
        let mut collector = collector(fetcher, &[A]);
        collector.run();

        assert!(collector.is_done());
        assert_eq!(collector.valid(), &HashSet::from([A.to_string()]));
        assert!(collector.disabled().is_empty());
        assert_eq!(collector.views(A).unwrap(), 1_234_567.0);
        let record = collector.record(A).unwrap();
        assert_eq!(record.title.as_deref(), Some("First"));
        assert_eq!(record.published.as_deref(), Some("Jan 1, 2020"));
    }

    #[test]
    fn missing_views_disables_video() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        let fetcher = FakeFetcher::default().page(A, "title=First\ndate=Jan 1, 2020\n");
        let mut collector = collector(fetcher, &[A]);
        collector.run();

        assert!(collector.valid().contains(A));
        assert!(collector.is_disabled(A));
        assert_eq!(collector.failed_fields(A), Some(vec![Field::Views]));
        assert_eq!(collector.views(A).unwrap(), 0.0);
        assert!(collector.non_disabled(false).unwrap().is_empty());
        assert_eq!(collector.record(A).unwrap().title.as_deref(), Some("First"));

        assert_eq!(collector.save(&path).unwrap(), 0);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "video_id,title,date,views");
        assert!(!written.contains(A));
    }

    #[test]
    fn disabled_video_reports_zero_even_with_captured_count() {
        let fetcher = FakeFetcher::default().page(A, "date=Jan 1, 2020\nviews=77 views\n");
        let mut collector = collector(fetcher, &[A]);
        collector.run();

        assert_eq!(collector.record(A).unwrap().views, Some(77.0));
        assert_eq!(collector.failed_fields(A), Some(vec![Field::Title]));
        assert_eq!(collector.views(A).unwrap(), 0.0);
    }

    #[test]
    fn every_failed_field_is_recorded() {
        let fetcher = FakeFetcher::default().page(A, "nothing useful");
        let mut collector = collector(fetcher, &[A]);
        collector.run();
        assert_eq!(collector.failed_fields(A), Some(Field::ALL.to_vec()));
        assert!(collector.valid().contains(A));
    }

    #[test]
    fn unreachable_page_is_skipped_everywhere() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut collector = collector(FakeFetcher::default(), &[C]);
        collector.run();

        assert!(collector.valid().is_empty());
        assert!(collector.disabled().is_empty());
        assert!(collector.record(C).is_none());
        assert!(matches!(collector.views(C), Err(CollectorError::MissingKey(id)) if id == C));
        assert_eq!(collector.skipped(), vec![(C, "connection refused")]);
        assert_eq!(collector.save(&path).unwrap(), 0);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "video_id,title,date,views");
    }

    #[test]
    fn views_for_unknown_video_is_missing_key() {
        let collector = scenario();
        assert!(matches!(
            collector.views("ZZZZZZZZZZZ"),
            Err(CollectorError::MissingKey(_))
        ));
    }

    #[test]
    fn views_accepts_watch_url() {
        let collector = scenario();
        let url = format!("https://www.youtube.com/watch?v={A}");
        assert_eq!(collector.views(&url).unwrap(), 1_234_567.0);
    }

    #[test]
    fn non_disabled_is_valid_minus_disabled() {
        let collector = scenario();
        let valid: BTreeSet<String> = collector.valid().iter().cloned().collect();
        let disabled: BTreeSet<String> = collector
            .disabled()
            .into_iter()
            .map(str::to_string)
            .collect();
        let expected: BTreeSet<String> = valid.difference(&disabled).cloned().collect();

        let ids = collector.non_disabled(false).unwrap();
        assert_eq!(set(ids.iter().map(String::as_str)), expected);
        assert_eq!(ids, [A]);

        let urls = collector.non_disabled(true).unwrap();
        assert_eq!(urls, [format!("https://www.youtube.com/watch?v={A}")]);
    }

    #[test]
    fn save_writes_one_row_per_complete_video() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        let collector = scenario();
        assert_eq!(collector.save(&path).unwrap(), 1);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["video_id", "title", "date", "views"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], A);
        assert_eq!(&rows[0][1], "First");
        assert_eq!(&rows[0][2], "Jan 1, 2020");
        assert_eq!(rows[0][3].parse::<f64>().unwrap(), 1_234_567.0);
    }

    #[test]
    fn save_quotes_titles_with_commas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        let page = full_page("Hello, \"World\"", "Mar 3, 2021", "5 views");
        let fetcher = FakeFetcher::default().page(A, &page);
        let mut collector = collector(fetcher, &[A]);
        collector.run();
        collector.save(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[1], "Hello, \"World\"");
    }

    #[test]
    fn save_reports_io_errors() {
        let dir = tempdir().unwrap();
        let collector = scenario();
        let err = collector
            .save(&dir.path().join("missing").join("videos.csv"))
            .unwrap_err();
        assert!(matches!(
            err,
            CollectorError::Csv(_) | CollectorError::Io(_)
        ));
    }

    #[test]
    fn invariants_hold_after_run() {
        let collector = scenario();
        for video_id in collector.disabled() {
            assert!(collector.valid().contains(video_id));
        }
        for video_id in collector.identifiers() {
            if !collector.valid().contains(video_id) {
                assert!(collector.record(video_id).is_none());
            }
        }
    }

    #[test]
    fn summary_lists_disabled_and_skipped() {
        let collector = scenario();
        let summary = collector.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.complete, 1);
        assert_eq!(summary.disabled.len(), 1);
        assert_eq!(summary.disabled[0].video_id, B);
        assert_eq!(summary.disabled[0].fields, vec![Field::Views]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].video_id, C);
        assert_eq!(summary.collected_at, collector.collected_at());
    }

    #[test]
    fn rerun_replaces_previous_results() {
        let mut collector = scenario();
        collector.fetcher.pages.clear();
        collector.run();
        assert!(collector.valid().is_empty());
        assert!(collector.disabled().is_empty());
        assert_eq!(collector.skipped().len(), 3);
        assert_eq!(collector.fetcher.calls.lock().len(), 6);
    }

    #[test]
    fn pooled_run_matches_sequential_run() {
        let ids: Vec<String> = (0..25).map(|n| format!("vid{n:0>8}")).collect();
        let build = || {
            let mut fetcher = FakeFetcher::default();
            for (n, video_id) in ids.iter().enumerate() {
                match n % 3 {
                    0 => {
                        let views = format!("{n} views");
                        fetcher = fetcher.page(video_id, &full_page("t", "d", &views));
                    }
                    1 => fetcher = fetcher.page(video_id, "title=t\n"),
                    _ => {}
                }
            }
            Collector::new(ids.iter(), fetcher, FakeQuery)
        };

        let mut sequential = build();
        sequential.run();
        let mut pooled = build().with_workers(4).with_progress_every(5);
        pooled.run();

        assert_eq!(pooled.valid(), sequential.valid());
        assert_eq!(pooled.disabled(), sequential.disabled());
        assert_eq!(pooled.skipped(), sequential.skipped());
        assert_eq!(
            pooled.non_disabled(false).unwrap(),
            sequential.non_disabled(false).unwrap()
        );
        for video_id in &ids {
            assert_eq!(pooled.record(video_id), sequential.record(video_id));
        }
        assert_eq!(pooled.fetcher.calls.lock().len(), ids.len());
    }

    #[test]
    fn custom_site_base_changes_urls() {
        let collector = collector(FakeFetcher::default(), &[A]);
        let collector = collector.with_site_base("http://localhost:8080/");
        assert_eq!(
            collector.urls(),
            [format!("http://localhost:8080/watch?v={A}")]
        );
        assert_eq!(collector.site_base(), "http://localhost:8080/");
    }

    #[test]
    fn html_pages_flow_through_the_collector() {
        let page = r#"<html><body>
            <span class="watch-title">
                Big Buck Bunny
            </span>
            <strong class="watch-time-text">Published on May 10, 2012</strong>
            <div class="watch-view-count">12,345 views</div>
        </body></html>"#;
        let broken = r#"<html><body><span class="watch-title">Only a title</span></body></html>"#;
        let fetcher = FakeFetcher::default().page(A, page).page(B, broken);
        let query = HtmlQuery::new(&FieldSelectors::default()).unwrap();
        let mut collector = Collector::new([A, B, C], fetcher, query);
        collector.run();

        assert_eq!(collector.views(A).unwrap(), 12_345.0);
        assert_eq!(collector.views(B).unwrap(), 0.0);
        assert_eq!(
            collector.failed_fields(B),
            Some(vec![Field::Published, Field::Views])
        );
        assert!(matches!(
            collector.views(C),
            Err(CollectorError::MissingKey(_))
        ));
        assert_eq!(
            collector.record(A).unwrap().title.as_deref(),
            Some("Big Buck Bunny")
        );
    }
}
