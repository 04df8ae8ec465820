/// PWS Resolver: picks exactly one authoritative water system for a ZIP.
///
/// Resolution is deterministic. Candidates are ordered by coverage fraction
/// descending (absent last) then name ascending, which is a total order, so
/// repeated calls on unchanged data always produce the same winner. An
/// operator-supplied override is honored even when no coverage row backs it;
/// the synthetic record that results carries no pwsid and no coverage.

use crate::model::{Candidate, ServiceError};
use crate::store;
use postgres::Client;

/// How many coverage rows to consider per ZIP during resolution.
pub const MAX_CANDIDATES: i64 = 5;

/// ZIP codes are exactly 5 ASCII digits. Checked before any store access.
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a ZIP to a single PWS record.
///
/// Without an override: the highest-coverage candidate wins, or `NotFound`
/// when the ZIP has no coverage rows. With an override: an exact-name match
/// among the candidates returns the real row (with its pwsid and coverage);
/// no match returns a synthetic record for the override name.
pub fn resolve_pws(
    client: &mut Client,
    zip: &str,
    pws_override: Option<&str>,
) -> Result<Candidate, ServiceError> {
    if !is_valid_zip(zip) {
        return Err(ServiceError::InvalidInput("ZIP must be 5 digits.".to_string()));
    }

    let candidates = store::candidates_for_zip(client, zip, MAX_CANDIDATES)?;

    match pws_override {
        Some(name) => Ok(reconcile_override(zip, name, candidates)),
        None => candidates.into_iter().next().ok_or_else(|| {
            ServiceError::NotFound(format!("No PWS mapping found for ZIP {}.", zip))
        }),
    }
}

/// Reconcile an explicit PWS-name override against the ZIP's candidates.
///
/// Matching is exact and case-sensitive. An unmatched override still
/// resolves — callers may know about a system the coverage map doesn't —
/// but coverage and pwsid are reported as unknown rather than fabricated.
pub fn reconcile_override(zip: &str, name: &str, candidates: Vec<Candidate>) -> Candidate {
    candidates
        .into_iter()
        .find(|c| c.pws_name == name)
        .unwrap_or_else(|| Candidate {
            zip: zip.to_string(),
            pws_name: name.to_string(),
            pwsid: None,
            coverage_fraction: None,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
