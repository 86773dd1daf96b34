//! Request handler for serverless deployments.
//!
//! Takes a JSON body holding a base64 encoded log, decodes it and wraps the
//! JSON report in a status envelope.

use crate::parser::BBLDecoder;
use crate::report::DecodeReport;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Base64 encoded log contents
    #[serde(default)]
    pub file_data: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HandlerResponse {
    fn json(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }

    fn error(status_code: u16, message: &str) -> Self {
        let body = serde_json::json!({ "success": false, "error": message }).to_string();
        Self::json(status_code, body)
    }
}

/// Handle one decode request with default decoder options.
pub fn handle_request(body: &str) -> HandlerResponse {
    handle_request_with(&BBLDecoder::new(), body)
}

/// Handle one decode request.
///
/// A log that fails to decode still answers 200, with `success: false` in
/// the report. Only a bad request or an unserialisable report change the
/// status code.
pub fn handle_request_with(decoder: &BBLDecoder, body: &str) -> HandlerResponse {
    let request: DecodeRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(err) => {
            warn!("rejecting request with malformed body: {}", err);
            return HandlerResponse::error(STATUS_BAD_REQUEST, &format!("Invalid request body: {}", err));
        }
    };

    let Some(file_data) = request.file_data else {
        return HandlerResponse::error(STATUS_BAD_REQUEST, "No file data provided");
    };

    // Line-wrapped payloads are accepted; any other stray byte is rejected.
    let compact: Vec<u8> = file_data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = match STANDARD.decode(&compact) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("rejecting request with invalid base64: {}", err);
            return HandlerResponse::error(STATUS_BAD_REQUEST, &format!("Invalid base64 data: {}", err));
        }
    };

    debug!(size = bytes.len(), filename = ?request.filename, "decoding uploaded log");
    let report = DecodeReport::from_result(decoder.decode_bytes(&bytes)).with_filename(request.filename);

    match report.to_json() {
        Ok(body) => HandlerResponse::json(STATUS_OK, body),
        Err(err) => {
            error!("failed to serialise decode report: {}", err);
            HandlerResponse::error(STATUS_INTERNAL_ERROR, &format!("Internal server error: {}", err))
        }
    }
}
