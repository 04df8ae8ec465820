/// HTTP endpoint for the ZIP→PWS query API.
///
/// Request orchestration lives here: parameter parsing and bounds checks run
/// before any collaborator, then the resolver and ranker are composed per
/// request and their outcomes translated to the HTTP error taxonomy
/// (400 InvalidInput / 404 NotFound / 503 StoreUnavailable).
///
/// Endpoints:
/// - GET /v1/zip/{zip}/pws?limit=N - Coverage candidates for a ZIP
/// - GET /v1/contaminants?zip=&top_n=&year=&pws= - Ranked contaminant report
/// - GET /health - Liveness, no store access
/// - GET /readyz - Store reachability + dataset presence

use crate::db::{Pool, PooledClient};
use crate::model::{Candidate, ContaminantRow, ServiceError};
use crate::ranker;
use crate::resolver;
use crate::store;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use threadpool::ThreadPool;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response for /v1/zip/{zip}/pws
#[derive(Debug, Serialize)]
pub struct ZipCandidatesResponse {
    pub zip: String,
    pub candidates: Vec<Candidate>,
}

/// Response for /v1/contaminants
#[derive(Debug, Serialize)]
pub struct ContaminantsResponse {
    pub zip: String,
    pub resolved_pws: Candidate,
    pub latest_year_used: Option<i32>,
    pub contaminants: Vec<ContaminantRow>,
}

// ---------------------------------------------------------------------------
// Query-string parsing
// ---------------------------------------------------------------------------

/// Split a request URL into its path and decoded query parameters.
/// Later duplicates of a key win. `+` decodes to a space.
pub fn split_query(url: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, q),
        None => (url, ""),
    };

    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key), decode_component(value));
    }

    (path, params)
}

fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}

/// Parse an integer parameter with a default and inclusive bounds.
/// Unparseable or out-of-bounds values are structural errors, reported
/// before any store access.
fn bounded_param(
    params: &HashMap<String, String>,
    key: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ServiceError> {
    let value = match params.get(key) {
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            ServiceError::InvalidInput(format!("Parameter '{}' must be an integer.", key))
        })?,
        None => default,
    };

    if value < min || value > max {
        return Err(ServiceError::InvalidInput(format!(
            "Parameter '{}' must be between {} and {}.",
            key, min, max
        )));
    }

    Ok(value)
}

/// Optional year parameter; present-but-unparseable is a structural error.
fn year_param(params: &HashMap<String, String>) -> Result<Option<i32>, ServiceError> {
    match params.get("year") {
        Some(raw) => raw.parse::<i32>().map(Some).map_err(|_| {
            ServiceError::InvalidInput("Parameter 'year' must be an integer.".to_string())
        }),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// GET /v1/zip/{zip}/pws — coverage candidates for a ZIP.
fn zip_candidates(
    pool: &Pool,
    zip: &str,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, ServiceError> {
    let limit = bounded_param(params, "limit", 5, 1, 20)?;
    if !resolver::is_valid_zip(zip) {
        return Err(ServiceError::InvalidInput("ZIP must be 5 digits.".to_string()));
    }

    let mut client = checkout(pool)?;
    let candidates = store::candidates_for_zip(&mut client, zip, limit)?;
    if candidates.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "No PWS mapping found for ZIP {}.",
            zip
        )));
    }

    let response = ZipCandidatesResponse { zip: zip.to_string(), candidates };
    to_json(&response)
}

/// Validated /v1/contaminants parameters. Produced entirely from the query
/// string; building one never touches the store or the pool.
struct ContaminantsParams {
    zip: String,
    top_n: i64,
    year: Option<i32>,
    pws_override: Option<String>,
}

/// Structural validation for /v1/contaminants: presence, syntax, and bounds.
/// Runs to completion before any connection is checked out, so a malformed
/// request gets its 400 even when the store is down or the pool exhausted.
fn contaminants_params(
    params: &HashMap<String, String>,
) -> Result<ContaminantsParams, ServiceError> {
    let top_n = bounded_param(params, "top_n", 10, 1, 50)?;
    let year = year_param(params)?;
    let zip = params
        .get("zip")
        .ok_or_else(|| ServiceError::InvalidInput("Parameter 'zip' is required.".to_string()))?;
    if !resolver::is_valid_zip(zip) {
        return Err(ServiceError::InvalidInput("ZIP must be 5 digits.".to_string()));
    }

    Ok(ContaminantsParams {
        zip: zip.clone(),
        top_n,
        year,
        pws_override: params.get("pws").cloned(),
    })
}

/// GET /v1/contaminants — resolve the ZIP's PWS, then rank its contaminants.
fn contaminants_report(
    pool: &Pool,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, ServiceError> {
    let request = contaminants_params(params)?;

    let mut client = checkout(pool)?;
    let resolved =
        resolver::resolve_pws(&mut client, &request.zip, request.pws_override.as_deref())?;
    let (contaminants, latest_year_used) =
        ranker::top_contaminants(&mut client, &resolved.pws_name, request.top_n, request.year)?;

    let response = ContaminantsResponse {
        zip: request.zip,
        resolved_pws: resolved,
        latest_year_used,
        contaminants,
    };
    to_json(&response)
}

/// GET /readyz — store reachable and both core tables populated.
fn readiness(pool: &Pool) -> Result<serde_json::Value, ServiceError> {
    let mut client = checkout(pool)?;
    let (pws_rows, zip_map_rows) =
        crate::db::readiness_counts(&mut client).map_err(ServiceError::from)?;

    if pws_rows == 0 || zip_map_rows == 0 {
        return Err(ServiceError::StoreUnavailable(format!(
            "Datasets not loaded (pws_rows={}, zip_map_rows={}).",
            pws_rows, zip_map_rows
        )));
    }

    Ok(serde_json::json!({
        "ok": true,
        "pws_rows": pws_rows,
        "zip_map_rows": zip_map_rows,
    }))
}

fn checkout(pool: &Pool) -> Result<PooledClient<'_>, ServiceError> {
    pool.get().map_err(|e| ServiceError::StoreUnavailable(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::StoreUnavailable(e.to_string()))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

type JsonResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

/// Start the HTTP server, dispatching each request to a worker thread.
/// Workers share the connection pool; requests are fully independent.
pub fn start_endpoint_server(port: u16, pool: Arc<Pool>, workers: usize) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /v1/zip/{{zip}}/pws - ZIP coverage candidates");
    println!("   GET /v1/contaminants?zip=... - Ranked contaminant report");
    println!("   GET /health - Liveness");
    println!("   GET /readyz - Store readiness\n");

    let dispatch = ThreadPool::new(workers.max(1));

    for request in server.incoming_requests() {
        let pool = Arc::clone(&pool);
        dispatch.execute(move || {
            let response = route_request(&pool, request.url());
            if let Err(e) = request.respond(response) {
                eprintln!("Failed to send response: {}", e);
            }
        });
    }

    Ok(())
}

/// Route a request URL to its handler and render the outcome as JSON.
fn route_request(pool: &Pool, url: &str) -> JsonResponse {
    let (path, params) = split_query(url);

    let result = if path == "/health" {
        Ok(serde_json::json!({ "ok": true }))
    } else if path == "/readyz" {
        readiness(pool)
    } else if path == "/v1/contaminants" {
        contaminants_report(pool, &params)
    } else if let Some(zip) = path
        .strip_prefix("/v1/zip/")
        .and_then(|rest| rest.strip_suffix("/pws"))
    {
        zip_candidates(pool, zip, &params)
    } else {
        return create_response(
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": [
                    "/health",
                    "/readyz",
                    "/v1/zip/{zip}/pws",
                    "/v1/contaminants"
                ]
            }),
        );
    };

    match result {
        Ok(body) => create_response(200, body),
        Err(e) => create_response(e.status_code(), serde_json::json!({ "error": e.detail() })),
    }
}

/// Create HTTP response with JSON body. Responses are CORS-open; the API is
/// consumed directly from browsers.
fn create_response(status_code: u16, json: serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
        .with_header(
            tiny_http::Header::from_bytes(&b"Access-Control-Allow-Origin"[..], &b"*"[..]).unwrap(),
        )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
