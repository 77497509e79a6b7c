use crate::domain::model::{CostAndUsage, CostQueryFailure, CostQueryOutcome};
use crate::domain::ports::BillingError;

/// Error kind shared by empty results and provider-flagged unavailability.
pub const DATA_UNAVAILABLE: &str = "DataUnavailableException";

pub const NO_DATA_MESSAGE: &str = "No cost data available for the specified date range.";
pub const UNAVAILABLE_MESSAGE: &str = "Cost data is not available for the specified time period.";
pub const FETCH_FAILED_MESSAGE: &str = "Cost data could not be fetched.";

/// Maps the raw result of a billing query onto the two-shape outcome.
///
/// A page with zero `ResultsByTime` rows counts as unavailable data, the same
/// kind the provider reports through its error code. The two are told apart
/// only by `message`.
pub fn classify(result: Result<CostAndUsage, BillingError>) -> CostQueryOutcome {
    match result {
        Ok(page) if page.results_by_time.is_empty() => CostQueryOutcome::Failure(CostQueryFailure {
            error: DATA_UNAVAILABLE.to_string(),
            message: NO_DATA_MESSAGE.to_string(),
        }),
        Ok(page) => CostQueryOutcome::Success(page),
        Err(err) if err.code() == Some(DATA_UNAVAILABLE) => {
            CostQueryOutcome::Failure(CostQueryFailure {
                error: DATA_UNAVAILABLE.to_string(),
                message: UNAVAILABLE_MESSAGE.to_string(),
            })
        }
        Err(err) => CostQueryOutcome::Failure(CostQueryFailure {
            error: err.to_string(),
            message: FETCH_FAILED_MESSAGE.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FailureKind, ResultByTime};

    #[test]
    fn test_rows_pass_through_unchanged() {
        let page = CostAndUsage {
            results_by_time: vec![ResultByTime::default()],
            next_page_token: Some("next".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(Ok(page.clone())), CostQueryOutcome::Success(page));
    }

    #[test]
    fn test_empty_page_is_data_unavailable() {
        let outcome = classify(Ok(CostAndUsage::default()));
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.error, DATA_UNAVAILABLE);
        assert_eq!(failure.message, NO_DATA_MESSAGE);
        assert_eq!(failure.kind(), FailureKind::DataUnavailable);
    }

    #[test]
    fn test_coded_unavailability() {
        let err = BillingError::new(Some(DATA_UNAVAILABLE.to_string()), "no data for that range");
        let outcome = classify(Err(err));
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.error, DATA_UNAVAILABLE);
        assert_eq!(failure.message, UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_other_failures_are_stringified() {
        let err = BillingError::new(
            Some("AccessDeniedException".to_string()),
            "AccessDeniedException: not authorized",
        );
        let outcome = classify(Err(err));
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.error, "AccessDeniedException: not authorized");
        assert_eq!(failure.message, FETCH_FAILED_MESSAGE);
        assert_eq!(failure.kind(), FailureKind::UnclassifiedQueryFailure);
    }
}
