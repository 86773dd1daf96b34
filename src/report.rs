//! JSON result report for decoded logs.
//!
//! A successful report carries the headers, field definitions, frame count
//! and gyro samples. A failed one carries the error text and an empty
//! sample list.

use crate::error::Result;
use crate::types::{DecodedLog, FieldSchema, GyroSample, HeaderMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_definitions: Option<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<usize>,
    #[serde(default)]
    pub gyro_data: Vec<GyroSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl DecodeReport {
    pub fn success(log: DecodedLog) -> Self {
        Self {
            success: true,
            error: None,
            headers: Some(log.headers),
            field_definitions: Some(log.field_definitions),
            frame_count: Some(log.frame_count),
            gyro_data: log.gyro_data,
            filename: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn from_result(result: Result<DecodedLog>) -> Self {
        match result {
            Ok(log) => Self::success(log),
            Err(err) => Self::failure(err),
        }
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
