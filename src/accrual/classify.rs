use reqwest::StatusCode;

use crate::domain::{AccrualResult, OrderNumber};

/// Raw outcome of one accrual lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualResponse {
    pub status: StatusCode,
    /// Decoded body; only present for a 200 whose body parsed
    pub body: Option<AccrualResult>,
}

impl AccrualResponse {
    pub fn ok(result: AccrualResult) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(result),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    pub fn no_content() -> Self {
        Self::status(StatusCode::NO_CONTENT)
    }

    pub fn too_many_requests() -> Self {
        Self::status(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// What the fetcher should do with a lookup response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the result to the sink
    Found(AccrualResult),
    /// 204: the accrual service has no record of the order yet
    NotRegistered,
    /// 429: back off before the next lookup
    RateLimited,
    /// 200 with a missing or malformed body
    Undecodable,
    /// 200 describing a different order than the one requested
    Mismatch { reported: OrderNumber },
    /// Any other status
    Rejected(StatusCode),
}

/// Classify a lookup response for `requested`. Stateless.
pub fn classify(requested: &OrderNumber, response: AccrualResponse) -> Verdict {
    match response.status {
        StatusCode::OK => match response.body {
            Some(result) if &result.order == requested => Verdict::Found(result),
            Some(result) => Verdict::Mismatch {
                reported: result.order,
            },
            None => Verdict::Undecodable,
        },
        StatusCode::NO_CONTENT => Verdict::NotRegistered,
        StatusCode::TOO_MANY_REQUESTS => Verdict::RateLimited,
        other => Verdict::Rejected(other),
    }
}
