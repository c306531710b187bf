use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("Invalid place '{0}'. Expected ALIAS=PHRASE with a non-empty phrase")]
pub struct PlaceParseError(String);

/// A user-labelled search phrase. Only `phrase` is looked for in the page,
/// case-sensitively and as a plain substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Place {
    pub alias: String,
    pub phrase: String,
}

impl Place {
    pub fn new(alias: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            phrase: phrase.into(),
        }
    }
}

/// Parses `ALIAS=PHRASE`. Without an `=` the whole text is used as both.
impl FromStr for Place {
    type Err = PlaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (alias, phrase) = s.split_once('=').unwrap_or((s, s));
        let (alias, phrase) = (alias.trim(), phrase.trim());
        if phrase.is_empty() {
            return Err(PlaceParseError(s.to_string()));
        }
        Ok(Place::new(if alias.is_empty() { phrase } else { alias }, phrase))
    }
}

/// Hours exactly as written on the page; neither ordering nor bounds are
/// checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutageTimeRange {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Display for OutageTimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start_hour, self.end_hour)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOutage {
    pub place: Place,
    pub outage_times: Vec<OutageTimeRange>,
}

impl Display for PlaceOutage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({})", self.place.alias, self.place.phrase)?;
        for range in &self.outage_times {
            writeln!(f, "   ⏰ {}", range)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedOutage {
    pub date: NaiveDate,
    pub places: Vec<PlaceOutage>,
}

impl Display for ScrapedOutage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ Outage table for {}", self.date)?;
        writeln!(f, "└─ {} place(s) affected", self.places.len())?;
        for (i, place) in self.places.iter().enumerate() {
            write!(f, "{:>2}. {}", i + 1, place)?;
        }
        Ok(())
    }
}
