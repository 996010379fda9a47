use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Local};
use tracing::{info, warn};

use crate::utils::archive_lookup::{lookup, ArchiveConfig, DocumentReference};
use crate::utils::scrape_proxy::{FetchError, PageFetcher};

/// Current month plus two earlier ones.
pub const LOOKUP_ATTEMPTS: usize = 3;

/// One edition of the bulletin, identified by year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicationPeriod {
    year: i32,
    month: u32,
}

impl PublicationPeriod {
    #[allow(dead_code)]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Period containing the local system date.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month before this one; January steps back to December of the previous year.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for PublicationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

/// Outcome of the latest-bulletin search. Callers must handle `NotFound`
/// before attempting a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found(DocumentReference),
    NotFound { tried: Vec<PublicationPeriod> },
}

pub struct PublicationLocator {
    fetcher: Arc<dyn PageFetcher>,
    archive: ArchiveConfig,
}

impl PublicationLocator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, archive: ArchiveConfig) -> Self {
        Self { fetcher, archive }
    }

    pub async fn locate_latest(&self) -> Result<Located, FetchError> {
        self.locate_from(PublicationPeriod::current()).await
    }

    /// Tries `start` and the months before it, newest first.
    ///
    /// A scrape failure aborts the search; only an empty listing moves on to
    /// the previous month.
    pub async fn locate_from(&self, start: PublicationPeriod) -> Result<Located, FetchError> {
        let mut period = start;
        let mut tried = Vec::with_capacity(LOOKUP_ATTEMPTS);

        for attempt in 1..=LOOKUP_ATTEMPTS {
            info!(target: "publication_locator", year = period.year(), month = period.month(), attempt = attempt, "Looking up bulletin");

            if let Some(reference) = lookup(self.fetcher.as_ref(), &self.archive, period).await? {
                info!(target: "publication_locator", url = %reference.url, period = %period, "Latest bulletin located");
                return Ok(Located::Found(reference));
            }

            tried.push(period);
            period = period.previous();
        }

        warn!(target: "publication_locator", start = %start, attempts = LOOKUP_ATTEMPTS, "No bulletin found");
        Ok(Located::NotFound { tried })
    }
}
