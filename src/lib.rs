/// zipwater_service: ZIP→PWS resolution and contaminant reporting service.
///
/// # Module structure
///
/// ```text
/// zipwater_service
/// ├── model     — shared data types (Candidate, ContaminantRow, ServiceError)
/// ├── config    — runtime configuration loader (service.toml)
/// ├── db        — DATABASE_URL validation, connection pool, schema bootstrap
/// ├── store     — parameterized read queries + NULLS-LAST comparators
/// ├── resolver  — ZIP validation, candidate selection, override reconciliation
/// ├── ranker    — effective-year policy and bounded ranked contaminant lists
/// ├── endpoint  — HTTP API (tiny_http) and request orchestration
/// └── ingest
///     ├── measurements — ppb-normalized contaminant CSV loader
///     └── zipmap       — ZIP→PWS coverage map CSV loader
/// ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod ranker;
pub mod resolver;
pub mod store;
