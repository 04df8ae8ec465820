/// Store Access Layer: the three parameterized read queries the service is
/// built on, plus the ordering comparators they guarantee.
///
/// Each operation is a bounded, parameterized (`$n`) query against the
/// relational store. Ordering is stated twice on purpose: once in the SQL
/// (`NULLS LAST`) and once as an explicit Rust comparator applied to the
/// fetched rows, so ranked output never depends on how the underlying engine
/// places NULLs. Absent values rank strictly below any finite value,
/// including negative ones.
///
/// All failures propagate as `ServiceError::StoreUnavailable`; an empty
/// result is a successful query, never an error, and the two are kept
/// distinct at every layer above.

use crate::model::{Candidate, ContaminantRow, ServiceError};
use postgres::Client;
use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Comparators (engine-agnostic "DESC NULLS LAST" semantics)
// ---------------------------------------------------------------------------

/// Descending on value, absent last. `total_cmp` keeps the order total even
/// for non-finite values.
fn f64_desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending on year, absent last.
fn i32_desc_nulls_last(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Total order over ZIP coverage candidates: coverage_fraction descending
/// (absent last), then pws_name ascending. This is the resolver's tie-break
/// rule; it admits exactly one winner.
pub fn candidate_order(a: &Candidate, b: &Candidate) -> Ordering {
    f64_desc_nulls_last(a.coverage_fraction, b.coverage_fraction)
        .then_with(|| a.pws_name.cmp(&b.pws_name))
}

/// Ranking order for a single-year contaminant query: value_ppb descending
/// (absent last), then contaminant name ascending.
pub fn year_mode_order(a: &ContaminantRow, b: &ContaminantRow) -> Ordering {
    f64_desc_nulls_last(a.value_ppb, b.value_ppb)
        .then_with(|| a.contaminant.cmp(&b.contaminant))
}

/// Ranking order for an all-time contaminant query: value_ppb descending
/// (absent last), then year descending (absent last), then name ascending.
pub fn all_time_order(a: &ContaminantRow, b: &ContaminantRow) -> Ordering {
    f64_desc_nulls_last(a.value_ppb, b.value_ppb)
        .then_with(|| i32_desc_nulls_last(a.year, b.year))
        .then_with(|| a.contaminant.cmp(&b.contaminant))
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

/// Coverage candidates for a ZIP, ordered by `candidate_order`, bounded to
/// `limit` rows.
pub fn candidates_for_zip(
    client: &mut Client,
    zip: &str,
    limit: i64,
) -> Result<Vec<Candidate>, ServiceError> {
    let rows = client.query(
        "SELECT zip, pwsid, pws_name, coverage_fraction
         FROM zip_pws
         WHERE zip = $1
         ORDER BY coverage_fraction DESC NULLS LAST, pws_name ASC
         LIMIT $2",
        &[&zip, &limit],
    )?;

    let mut candidates: Vec<Candidate> = rows
        .iter()
        .map(|row| Candidate {
            zip: trimmed(row.get(0)),
            pwsid: row.get(1),
            pws_name: row.get(2),
            coverage_fraction: row.get(3),
        })
        .collect();

    candidates.sort_by(candidate_order);
    Ok(candidates)
}

/// Latest measurement year for a PWS; None when the PWS has no measurements
/// or none of them carry a year.
pub fn latest_year_for_pws(
    client: &mut Client,
    pws_name: &str,
) -> Result<Option<i32>, ServiceError> {
    let row = client.query_one(
        "SELECT MAX(m.year)
         FROM measurement m
         JOIN pws p ON p.id = m.pws_id
         WHERE p.name = $1",
        &[&pws_name],
    )?;

    Ok(row.get(0))
}

/// Contaminant measurements for a PWS, bounded to `limit` rows.
///
/// With a year: exact-year filter, ordered by `year_mode_order`. Without:
/// all-time, ordered by `all_time_order`. A year with no matching rows is a
/// legal query that returns an empty list.
pub fn contaminants_for_pws(
    client: &mut Client,
    pws_name: &str,
    year: Option<i32>,
    limit: i64,
) -> Result<Vec<ContaminantRow>, ServiceError> {
    let rows = match year {
        Some(y) => client.query(
            "SELECT c.name, m.value_ppb, m.year, m.basis, m.source_url
             FROM measurement m
             JOIN pws p ON p.id = m.pws_id
             JOIN contaminant c ON c.id = m.contaminant_id
             WHERE p.name = $1 AND m.year = $2
             ORDER BY m.value_ppb DESC NULLS LAST, c.name ASC
             LIMIT $3",
            &[&pws_name, &y, &limit],
        )?,
        None => client.query(
            "SELECT c.name, m.value_ppb, m.year, m.basis, m.source_url
             FROM measurement m
             JOIN pws p ON p.id = m.pws_id
             JOIN contaminant c ON c.id = m.contaminant_id
             WHERE p.name = $1
             ORDER BY m.value_ppb DESC NULLS LAST, m.year DESC NULLS LAST, c.name ASC
             LIMIT $2",
            &[&pws_name, &limit],
        )?,
    };

    let mut contaminants: Vec<ContaminantRow> = rows
        .iter()
        .map(|row| ContaminantRow {
            contaminant: row.get(0),
            value_ppb: row.get(1),
            year: row.get(2),
            basis: row.get(3),
            source_url: row.get(4),
        })
        .collect();

    match year {
        Some(_) => contaminants.sort_by(year_mode_order),
        None => contaminants.sort_by(all_time_order),
    }

    Ok(contaminants)
}

/// `zip_pws.zip` is CHAR(5); Postgres pads CHAR columns with spaces, so trim
/// before handing the value to anything that compares ZIP strings.
fn trimmed(value: String) -> String {
    value.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
