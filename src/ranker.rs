/// Contaminant Ranker: effective-year policy plus bounded ranked lists.
///
/// A caller-supplied year is used verbatim, even if no data exists for it —
/// that surfaces as `NotFound`, never as an empty success. Without a year
/// the latest measurement year for the PWS is used; when the PWS has no
/// dated measurements at all, ranking runs in all-time mode and the
/// effective year is reported as absent (distinguishable from any real
/// year, there is no sentinel).

use crate::model::{ContaminantRow, ServiceError};
use crate::store;
use postgres::Client;

/// Explicit-year-or-latest-year fallback policy.
pub fn effective_year(requested: Option<i32>, latest: Option<i32>) -> Option<i32> {
    requested.or(latest)
}

/// Top contaminants for a resolved PWS.
///
/// Returns the ranked rows and the year actually used for the query. The
/// `NotFound` message names the requested year only when the caller supplied
/// one; in fallback mode the caller never asked for the year that came up
/// empty.
pub fn top_contaminants(
    client: &mut Client,
    pws_name: &str,
    top_n: i64,
    year: Option<i32>,
) -> Result<(Vec<ContaminantRow>, Option<i32>), ServiceError> {
    let latest = match year {
        Some(_) => None, // latest-year lookup only runs when no year was given
        None => store::latest_year_for_pws(client, pws_name)?,
    };
    let year_used = effective_year(year, latest);

    let rows = store::contaminants_for_pws(client, pws_name, year_used, top_n)?;

    if rows.is_empty() {
        let qualifier = match year {
            Some(y) => format!(" in year {}", y),
            None => String::new(),
        };
        return Err(ServiceError::NotFound(format!(
            "No contaminant rows found for '{}'{}.",
            pws_name, qualifier
        )));
    }

    Ok((rows, year_used))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
