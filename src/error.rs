use thiserror::Error;

use crate::utils::pdf::PdfError;
use crate::utils::publication_locator::PublicationPeriod;
use crate::utils::scrape_proxy::FetchError;

/// Everything that can end a bulletin request.
#[derive(Error, Debug)]
pub enum BulletinError {
    #[error("{0}")]
    Validation(String),

    #[error("No publication available for {}", format_periods(.tried))]
    NotFound { tried: Vec<PublicationPeriod> },

    #[error(transparent)]
    Network(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] PdfError),
}

fn format_periods(periods: &[PublicationPeriod]) -> String {
    periods
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_tried_periods() {
        let err = BulletinError::NotFound {
            tried: vec![
                PublicationPeriod::new(2024, 3).unwrap(),
                PublicationPeriod::new(2024, 2).unwrap(),
            ],
        };
        assert_eq!(err.to_string(), "No publication available for 2024/03, 2024/02");
    }

    #[test]
    fn network_errors_keep_upstream_message() {
        let err = BulletinError::from(FetchError::Status {
            url: "https://bo.example/x.pdf".to_string(),
            status: 500,
        });
        assert_eq!(
            err.to_string(),
            "HTTP error 500 while fetching https://bo.example/x.pdf"
        );
    }
}
