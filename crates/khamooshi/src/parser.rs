use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::calendar::{normalize_digits, resolve_date};
use crate::error::OutageError;
use crate::types::{OutageTimeRange, Place, PlaceOutage, ScrapedOutage};

/// Precedes every outage announcement line in the description.
const OUTAGE_MARKER: char = '❌';

static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ItemTitle.AnnTitle").expect("invalid selector: table title")
});

static SEL_DESCRIPTION_LINES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".AnnDescription p").expect("invalid selector: description lines")
});

// "مورخ <day> <month> ماه <year>", day as digits or as an ordinal word that
// may contain spaces and the zero-width non-joiner.
static RE_TABLE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"مورخ\s+([0-9۰-۹]+|[آابپتثجچحخدذرزسشصضطظعغفقکگلمنوهی\s\x{200C}]+)\s+([آابپتثجچحخدذرزسشصضطظعغفقکگلمنوهی]+)\s+ماه\s+([0-9۰-۹]+)",
    )
    .expect("invalid regex: table date")
});

static RE_TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*تا\s*([0-9]+)").expect("invalid regex: time range")
});

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

pub fn extract_publication_date(document: &Html) -> Result<NaiveDate, OutageError> {
    let title = document
        .select(&SEL_TITLE)
        .next()
        .map(elem_text)
        .unwrap_or_default();

    let caps = RE_TABLE_DATE.captures(&title).ok_or_else(|| {
        log::debug!("No date found in table title: {:?}", title.trim());
        OutageError::InvalidDateFormat
    })?;

    resolve_date(&caps[3], &caps[1], &caps[2])
}

/// Reads an hour range such as "۹ تا ۱۱" out of an announcement line.
pub fn parse_outage_time(line: &str) -> Option<OutageTimeRange> {
    let line = normalize_digits(line);
    let caps = RE_TIME_RANGE.captures(&line)?;

    Some(OutageTimeRange {
        start_hour: caps[1].parse().ok()?,
        end_hour: caps[2].parse().ok()?,
    })
}

/// Collects, for every place in caller order, the outage ranges announced
/// before each line that mentions it. Only the nearest marker line above a
/// mention is consulted, even when its hours cannot be read. Places with no
/// ranges are left out.
///
/// A blank phrase would match every line, so it is rejected up front.
pub fn extract_place_outages(
    document: &Html,
    places: &[Place],
) -> Result<Vec<PlaceOutage>, OutageError> {
    if places.is_empty() {
        return Err(OutageError::NoPlaces);
    }
    if let Some(place) = places.iter().find(|p| p.phrase.trim().is_empty()) {
        log::warn!("Place {:?} has no search phrase", place.alias);
        return Err(OutageError::MissingSearchPhrase);
    }

    let lines: Vec<String> = document
        .select(&SEL_DESCRIPTION_LINES)
        .map(elem_text)
        .collect();
    log::debug!("Found {} description line(s)", lines.len());

    let mut place_outages = Vec::new();

    for place in places {
        let mut outage_times = Vec::new();

        for (i, _) in lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(&place.phrase))
        {
            let Some(announcement) = lines[..i]
                .iter()
                .rev()
                .find(|line| line.contains(OUTAGE_MARKER))
            else {
                continue;
            };

            match parse_outage_time(announcement) {
                Some(range) => outage_times.push(range),
                None => log::debug!(
                    "Unreadable hours in announcement above {:?}: {:?}",
                    place.phrase,
                    announcement.trim()
                ),
            }
        }

        if !outage_times.is_empty() {
            place_outages.push(PlaceOutage {
                place: place.clone(),
                outage_times,
            });
        }
    }

    Ok(place_outages)
}

/// Parses a raw page once and interprets it for `places`. A date that cannot
/// be read is reported as [`OutageError::OutageDateUnavailable`] rather than
/// the underlying date error.
pub fn parse_outage_page(html: &str, places: &[Place]) -> Result<ScrapedOutage, OutageError> {
    let document = Html::parse_document(html);

    let date = extract_publication_date(&document).map_err(|e| {
        log::warn!("Could not read the outage table date: {}", e);
        OutageError::OutageDateUnavailable
    })?;

    let places = extract_place_outages(&document, places)?;

    Ok(ScrapedOutage { date, places })
}
