//! The export pipeline: fetch, repair, parse, expand, dedupe, filter, render, write.

use std::path::PathBuf;

use chrono::Utc;
use chrono_tz::Tz;

use calorg_core::config::{RejectionPredicate, Settings, TzidAlias};
use calorg_rfc::error::RfcError;
use calorg_rfc::rfc::ical::expand::TimeZoneResolver;
use calorg_rfc::rfc::ical::parse::parse;
use calorg_rfc::rfc::ical::repair::repair_timezones;

use crate::error::{ServiceError, ServiceResult};
use crate::export::{
    Document, DocumentHeader, EventDefinition, NormalizedEvent, OccurrenceExpander, Window,
    apply_rejections, dedup_by_key,
};
use crate::fetch::fetch_feed;
use crate::writer::write_document;

/// Everything one export run needs besides the feed text.
///
/// Built once per run; the window is fixed relative to the run's start time.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub timezone: Tz,
    pub window: Window,
    pub reject: Vec<RejectionPredicate>,
    pub tzid_aliases: Vec<TzidAlias>,
    pub title: String,
    pub category: String,
    pub setupfile: String,
    pub exported_at: chrono::DateTime<Tz>,
}

impl ExportOptions {
    /// ## Summary
    /// Builds the options for a run starting at `now`.
    ///
    /// ## Errors
    ///
    /// Returns `ServiceError::InvalidConfiguration` if `export.timezone` is
    /// not an IANA zone name.
    pub fn from_settings(settings: &Settings, now: chrono::DateTime<Utc>) -> ServiceResult<Self> {
        let export = &settings.export;
        let timezone = export.timezone.parse::<Tz>().map_err(|err| {
            ServiceError::InvalidConfiguration(format!(
                "export.timezone {:?}: {err}",
                export.timezone
            ))
        })?;

        Ok(Self {
            timezone,
            window: Window::around(now, export.past_days, export.future_days),
            reject: export.reject.clone(),
            tzid_aliases: export.tzid_aliases.clone(),
            title: settings.output.title.clone(),
            category: settings.output.category.clone(),
            setupfile: settings.output.setupfile.clone(),
            exported_at: now.with_timezone(&timezone),
        })
    }

    fn header(&self) -> DocumentHeader {
        DocumentHeader {
            title: self.title.clone(),
            category: self.category.clone(),
            setupfile: self.setupfile.clone(),
            exported_at: self.exported_at,
        }
    }
}

/// A rendered document and the number of events in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub text: String,
    pub event_count: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub event_count: usize,
    pub path: PathBuf,
}

/// ## Summary
/// Turns raw feed text into the org document.
///
/// ## Errors
///
/// Fails on malformed calendar text, on events without a usable DTSTART and
/// on recurrence rules the expander rejects. One bad event fails the run.
#[tracing::instrument(skip_all, fields(bytes = raw.len()))]
pub fn export_calendar(raw: &str, options: &ExportOptions) -> ServiceResult<ExportedDocument> {
    let repaired = repair_timezones(raw, &options.tzid_aliases);
    let calendar = parse(&repaired).map_err(RfcError::from)?;

    let mut resolver = TimeZoneResolver::new(options.timezone);
    let definitions = calendar
        .events()
        .map(|component| EventDefinition::from_component(component, &mut resolver))
        .collect::<ServiceResult<Vec<_>>>()?;
    tracing::debug!(definitions = definitions.len(), "Parsed event definitions");

    let occurrences = OccurrenceExpander::new(options.window).expand_all(&definitions)?;
    let normalized: Vec<NormalizedEvent<'_>> = occurrences
        .iter()
        .map(|occurrence| NormalizedEvent::new(occurrence, options.timezone))
        .collect();

    let unique = dedup_by_key(normalized);
    let events = apply_rejections(unique, &options.reject);
    let event_count = events.len();

    let text = Document::new(options.header(), events).to_string();
    Ok(ExportedDocument { text, event_count })
}

/// ## Summary
/// Runs a full export with the given settings.
///
/// ## Errors
///
/// Returns an error if the options are invalid, the feed cannot be fetched
/// or parsed, or the document cannot be written. Nothing is written on failure.
#[tracing::instrument(skip_all, fields(feed = %settings.feed.url, output = %settings.output.path.display()))]
pub async fn run(settings: &Settings) -> ServiceResult<ExportReport> {
    let options = ExportOptions::from_settings(settings, Utc::now())?;
    tracing::debug!(
        min = %options.window.min(),
        max = %options.window.max(),
        timezone = %options.timezone,
        "Export window"
    );

    let raw = fetch_feed(&settings.feed.url, &settings.feed.user_agent).await?;
    let document = export_calendar(&raw, &options)?;
    write_document(&settings.output.path, &document.text).await?;

    Ok(ExportReport {
        event_count: document.event_count,
        path: settings.output.path.clone(),
    })
}
