pub mod cache;
pub mod calendar;
pub mod error;
mod parser;
pub mod scraper;
pub mod types;
pub mod utils;

pub use error::{ErrorBody, OutageError};
pub use parser::{
    extract_place_outages, extract_publication_date, parse_outage_page, parse_outage_time,
};
pub use scraper::{OutageChecker, Settings};

pub(crate) const OUTAGE_TABLE_URL: &str = "https://qepd.co.ir/fa-IR/DouranPortal/6423";
