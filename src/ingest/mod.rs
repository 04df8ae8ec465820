/// CSV ingestion for the curated datasets.
///
/// Two loaders, one per dataset:
/// - `measurements` — the ppb-normalized contaminant CSV (pws, contaminant,
///   year, value_ppb, basis, source_url). Names upsert, measurements insert.
/// - `zipmap` — the ZIP→PWS coverage map CSV (zip, pws). Insert-ignore on
///   the (zip, pws_name) key.
///
/// Parsing is separated from warehousing in each file so the CSV handling
/// can be tested without a database.

pub mod measurements;
pub mod zipmap;

/// Loader error conditions.
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read
    Io(std::io::Error),
    /// CSV was malformed
    Csv(csv::Error),
    /// Required columns missing from the header row
    MissingColumns(Vec<String>),
    /// Database write failed
    Db(postgres::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Failed to read input file: {}", e),
            LoadError::Csv(e) => write!(f, "Failed to parse CSV: {}", e),
            LoadError::MissingColumns(cols) => {
                write!(f, "CSV is missing required columns: {}", cols.join(", "))
            }
            LoadError::Db(e) => write!(f, "Database write failed: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::Csv(e)
    }
}

impl From<postgres::Error> for LoadError {
    fn from(e: postgres::Error) -> Self {
        LoadError::Db(e)
    }
}
