use thiserror::Error;

use crate::api::coinbase::ApiError;

/// Failures while drawing a chart or touching the page
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("container #{0} not found in page")]
    ContainerMissing(String),
    #[error("series length mismatch: {labels} labels, {data} values")]
    MismatchedSeries { labels: usize, data: usize },
    #[error("failed to draw chart: {0}")]
    Draw(String),
    #[error("failed to publish page: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that aborts a refresh cycle. A single coin failing fails the whole batch.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to fetch {coin}: {source}")]
    Fetch {
        coin: String,
        #[source]
        source: ApiError,
    },
    #[error("{coin}: price {value:?} at index {index} is not a number")]
    InvalidPrice {
        coin: String,
        index: usize,
        value: String,
    },
    #[error("{coin}: timestamp {value} is out of range")]
    InvalidTimestamp { coin: String, value: i64 },
    #[error(transparent)]
    Render(#[from] ChartError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_coin() {
        let err = CycleError::Fetch {
            coin: "bitcoin".to_string(),
            source: ApiError::NotFound("missing".to_string()),
        };
        assert_eq!(err.to_string(), "failed to fetch bitcoin: Not Found: missing");
    }
}
