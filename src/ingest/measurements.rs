/// Loader for the ppb-normalized contaminant measurement CSV.
///
/// Expected columns: pws, contaminant, value_ppb, basis, year, source_url.
/// Column order does not matter; extra columns are ignored. Blank or
/// unparseable year/value cells load as NULL rather than failing the row —
/// the curated datasets mix sources and not every row carries every field.
///
/// Write semantics: `pws` and `contaminant` names upsert
/// (ON CONFLICT (name) DO NOTHING), measurement rows are insert-only.

use super::LoadError;
use postgres::Client;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;

/// One parsed measurement row, ready to warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub pws: String,
    pub contaminant: String,
    pub year: Option<i32>,
    pub value_ppb: Option<f64>,
    pub basis: Option<String>,
    pub source_url: Option<String>,
}

const REQUIRED_COLUMNS: [&str; 6] =
    ["pws", "contaminant", "value_ppb", "basis", "year", "source_url"];

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Blank cells are NULL; "2020" and "2020.0" both parse (sources that round-
/// trip through spreadsheets render integer years as floats).
pub fn coerce_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    trimmed.parse::<f64>().ok().map(|f| f as i32)
}

/// Blank or unparseable cells are NULL.
pub fn coerce_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Blank cells are NULL; everything else passes through trimmed.
pub fn coerce_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the measurement CSV, validating the header before reading any row.
/// Rows with a blank pws or contaminant name are skipped; they cannot be
/// warehoused against the unique-name tables.
pub fn read_measurement_csv<R: Read>(reader: R) -> Result<Vec<MeasurementRecord>, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let index = column_index(&headers, &REQUIRED_COLUMNS)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result?;
        let cell = |name: &str| row.get(index[name]).unwrap_or("");

        let pws = cell("pws").trim().to_string();
        let contaminant = cell("contaminant").trim().to_string();
        if pws.is_empty() || contaminant.is_empty() {
            continue;
        }

        records.push(MeasurementRecord {
            pws,
            contaminant,
            year: coerce_year(cell("year")),
            value_ppb: coerce_float(cell("value_ppb")),
            basis: coerce_text(cell("basis")),
            source_url: coerce_text(cell("source_url")),
        });
    }

    Ok(records)
}

/// Map required column names to their positions, reporting all missing
/// columns at once.
fn column_index(
    headers: &csv::StringRecord,
    required: &[&'static str],
) -> Result<HashMap<&'static str, usize>, LoadError> {
    let mut index = HashMap::new();
    let mut missing = Vec::new();

    for &name in required {
        match headers.iter().position(|h| h.trim() == name) {
            Some(pos) => {
                index.insert(name, pos);
            }
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        missing.sort();
        return Err(LoadError::MissingColumns(missing));
    }

    Ok(index)
}

// ---------------------------------------------------------------------------
// Warehousing
// ---------------------------------------------------------------------------

/// Load parsed records into the store. Returns the number of measurement
/// rows inserted.
pub fn load_measurements(
    client: &mut Client,
    records: &[MeasurementRecord],
) -> Result<usize, LoadError> {
    // Upsert the unique-name tables first so every measurement row has
    // something to reference.
    let pws_names: BTreeSet<&str> = records.iter().map(|r| r.pws.as_str()).collect();
    for name in &pws_names {
        client.execute("INSERT INTO pws(name) VALUES ($1) ON CONFLICT (name) DO NOTHING", &[name])?;
    }

    let contaminant_names: BTreeSet<&str> =
        records.iter().map(|r| r.contaminant.as_str()).collect();
    for name in &contaminant_names {
        client.execute(
            "INSERT INTO contaminant(name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
            &[name],
        )?;
    }

    let pws_ids = name_to_id(client, "SELECT id, name FROM pws")?;
    let contaminant_ids = name_to_id(client, "SELECT id, name FROM contaminant")?;

    let mut inserted = 0;
    for record in records {
        let (Some(pws_id), Some(contaminant_id)) =
            (pws_ids.get(&record.pws), contaminant_ids.get(&record.contaminant))
        else {
            // Unreachable if the upserts succeeded; skip rather than abort.
            continue;
        };

        client.execute(
            "INSERT INTO measurement (pws_id, contaminant_id, year, value_ppb, basis, source_url)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                pws_id,
                contaminant_id,
                &record.year,
                &record.value_ppb,
                &record.basis,
                &record.source_url,
            ],
        )?;
        inserted += 1;
    }

    Ok(inserted)
}

fn name_to_id(client: &mut Client, sql: &str) -> Result<HashMap<String, i32>, LoadError> {
    let rows = client.query(sql, &[])?;
    Ok(rows
        .iter()
        .map(|row| {
            let id: i32 = row.get(0);
            let name: String = row.get(1);
            (name, id)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_year_variants() {
        assert_eq!(coerce_year("2020"), Some(2020));
        assert_eq!(coerce_year(" 2020 "), Some(2020));
        assert_eq!(coerce_year("2020.0"), Some(2020));
        assert_eq!(coerce_year(""), None);
        assert_eq!(coerce_year("   "), None);
        assert_eq!(coerce_year("unknown"), None);
    }

    #[test]
    fn test_coerce_float_variants() {
        assert_eq!(coerce_float("3.5"), Some(3.5));
        assert_eq!(coerce_float("0"), Some(0.0));
        assert_eq!(coerce_float(""), None);
        assert_eq!(coerce_float("n/a"), None);
    }

    #[test]
    fn test_coerce_text_blank_is_null() {
        assert_eq!(coerce_text("  "), None);
        assert_eq!(coerce_text(" CCR 2022 "), Some("CCR 2022".to_string()));
    }

    #[test]
    fn test_read_csv_with_reordered_columns() {
        let data = "contaminant,pws,year,value_ppb,basis,source_url\n\
                    Lead,LADWP,2022,4.2,90th percentile,https://example.org/ccr\n\
                    Arsenic,LADWP,,,,\n";

        let records = read_measurement_csv(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pws, "LADWP");
        assert_eq!(records[0].contaminant, "Lead");
        assert_eq!(records[0].year, Some(2022));
        assert_eq!(records[0].value_ppb, Some(4.2));
        assert_eq!(records[0].basis, Some("90th percentile".to_string()));

        assert_eq!(records[1].year, None);
        assert_eq!(records[1].value_ppb, None);
        assert_eq!(records[1].basis, None);
    }

    #[test]
    fn test_read_csv_skips_unnameable_rows() {
        let data = "pws,contaminant,value_ppb,basis,year,source_url\n\
                    ,Lead,4.2,,2022,\n\
                    LADWP,,4.2,,2022,\n\
                    LADWP,Lead,4.2,,2022,\n";

        let records = read_measurement_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pws, "LADWP");
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let data = "pws,contaminant\nLADWP,Lead\n";

        let err = read_measurement_csv(data.as_bytes()).unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["basis", "source_url", "value_ppb", "year"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }
}
