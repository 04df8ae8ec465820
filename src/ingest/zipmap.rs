/// Loader for the ZIP→PWS coverage map CSV.
///
/// Required columns: zip, pws. Optional columns pwsid and coverage_fraction
/// are honored when present; a map without them loads with coverage 1.0 and
/// no pwsid, matching the light-weight generator output. ZIPs are
/// left-padded with zeros to 5 digits (spreadsheet round-trips strip them).
///
/// Write semantics: insert with ON CONFLICT (zip, pws_name) DO NOTHING —
/// re-running the loader never duplicates or overwrites coverage rows.

use super::measurements::{coerce_float, coerce_text};
use super::LoadError;
use postgres::Client;
use std::io::Read;

/// One parsed coverage row.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipMapRecord {
    pub zip: String,
    pub pws_name: String,
    pub pwsid: Option<String>,
    pub coverage_fraction: Option<f64>,
}

/// Left-pad a ZIP with zeros to 5 digits.
pub fn pad_zip(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 5 {
        trimmed.to_string()
    } else {
        format!("{:0>5}", trimmed)
    }
}

/// Parse the ZIP-map CSV. Rows with a blank zip or pws are skipped.
pub fn read_zipmap_csv<R: Read>(reader: R) -> Result<Vec<ZipMapRecord>, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let zip_col = position("zip");
    let pws_col = position("pws");
    let (Some(zip_col), Some(pws_col)) = (zip_col, pws_col) else {
        let mut missing = Vec::new();
        if zip_col.is_none() {
            missing.push("zip".to_string());
        }
        if pws_col.is_none() {
            missing.push("pws".to_string());
        }
        return Err(LoadError::MissingColumns(missing));
    };
    let pwsid_col = position("pwsid");
    let coverage_col = position("coverage_fraction");

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result?;
        let zip_raw = row.get(zip_col).unwrap_or("").trim();
        let pws_name = row.get(pws_col).unwrap_or("").trim();
        if zip_raw.is_empty() || pws_name.is_empty() {
            continue;
        }

        records.push(ZipMapRecord {
            zip: pad_zip(zip_raw),
            pws_name: pws_name.to_string(),
            pwsid: pwsid_col.and_then(|c| coerce_text(row.get(c).unwrap_or(""))),
            // No coverage column means the generator's whole-ZIP assumption.
            coverage_fraction: match coverage_col {
                Some(c) => coerce_float(row.get(c).unwrap_or("")),
                None => Some(1.0),
            },
        });
    }

    Ok(records)
}

/// Load parsed coverage rows. Returns the number of rows actually inserted;
/// rows already present under the (zip, pws_name) key are left untouched.
pub fn load_zip_map(client: &mut Client, records: &[ZipMapRecord]) -> Result<usize, LoadError> {
    let mut inserted = 0;
    for record in records {
        let affected = client.execute(
            "INSERT INTO zip_pws (zip, pwsid, pws_name, coverage_fraction)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (zip, pws_name) DO NOTHING",
            &[&record.zip, &record.pwsid, &record.pws_name, &record.coverage_fraction],
        )?;
        inserted += affected as usize;
    }

    Ok(inserted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
