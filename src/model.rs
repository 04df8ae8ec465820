/// Shared data types for the ZIP→PWS query service.
///
/// `Candidate` and `ContaminantRow` are the semantic records produced by the
/// store layer and serialized verbatim into API responses. `ServiceError` is
/// the error taxonomy every layer speaks: structural validation failures,
/// semantic not-found outcomes, and store failures are distinct variants and
/// stay distinct all the way to the HTTP status code.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Semantic records
// ---------------------------------------------------------------------------

/// One ZIP→PWS coverage row. Doubles as the "resolved PWS" record: a
/// resolution is always either one of these rows verbatim or a synthetic
/// record built from an operator override (pwsid and coverage absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// 5-digit ZIP code this coverage row belongs to.
    pub zip: String,
    /// PWS name, unique and case-sensitive across the store.
    pub pws_name: String,
    /// EPA PWS identifier, when known.
    pub pwsid: Option<String>,
    /// Estimated fraction of the ZIP served by this PWS, in [0.0, 1.0].
    /// Absent means unknown, which ranks below any known fraction.
    pub coverage_fraction: Option<f64>,
}

/// One contaminant measurement reported for a PWS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminantRow {
    pub contaminant: String,
    pub value_ppb: Option<f64>,
    pub year: Option<i32>,
    pub basis: Option<String>,
    pub source_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Request-path error taxonomy.
///
/// `InvalidInput` is detected before any store access. `NotFound` is a
/// semantic outcome of a well-formed query. `StoreUnavailable` covers every
/// store-layer sub-cause (connect failure, query error, statement timeout);
/// callers are not told which, and an empty result is never reported this
/// way — the two are kept distinct at every layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Malformed ZIP or numeric parameter outside its declared bounds.
    InvalidInput(String),
    /// No coverage rows for a ZIP, or no contaminant rows for a PWS/year.
    NotFound(String),
    /// Connection failure, query error, or timeout at the store boundary.
    StoreUnavailable(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "not found: {}", msg),
            ServiceError::StoreUnavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<postgres::Error> for ServiceError {
    fn from(e: postgres::Error) -> Self {
        ServiceError::StoreUnavailable(e.to_string())
    }
}

impl ServiceError {
    /// HTTP status this error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::StoreUnavailable(_) => 503,
        }
    }

    /// Client-facing detail string (without the variant prefix).
    pub fn detail(&self) -> &str {
        match self {
            ServiceError::InvalidInput(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::StoreUnavailable(msg) => msg,
        }
    }
}
