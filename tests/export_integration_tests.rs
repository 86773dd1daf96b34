//! Integration tests for export functionality
//!
//! Tests the export layer across different scenarios:
//! - JSON report written beside the input
//! - CSV export with directory creation
//! - Output directory override
//! - Failure reports

#![cfg(all(feature = "json", feature = "csv"))]

use bbl_decoder::export::*;
use bbl_decoder::{decode_bbl_bytes, DecodeReport, DecodedLog};
use std::fs;
use tempfile::TempDir;

const LOG: &[u8] = b"H Product:Betaflight\nF I time:1:0 gyroADC[0]:0:0 gyroADC[1]:0:0 gyroADC[2]:0:0\nS\nI\xe8\x07\x0a\x00\x00I\xf4\x07\x00\x14\x00";

fn decoded() -> DecodedLog {
    decode_bbl_bytes(LOG).expect("test log should decode")
}

#[test]
fn test_export_json_beside_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bbl_path = temp_dir.path().join("flight.bbl");

    let report = DecodeReport::success(decoded());
    let json_path = export_to_json(&report, &bbl_path, &ExportOptions::default()).unwrap();

    assert_eq!(json_path, temp_dir.path().join("flight_decoded.json"));
    let contents = fs::read_to_string(&json_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["frame_count"], 2);
    assert_eq!(parsed["gyro_data"][1]["timestamp"], 1012);
    // pretty printed
    assert!(contents.contains("\n  \"success\": true"));
}

#[test]
fn test_export_csv_creates_output_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let nonexistent_dir = temp_dir.path().join("nonexistent").join("output");
    let bbl_path = temp_dir.path().join("test.bbl");

    let export_opts = ExportOptions {
        csv: true,
        output_dir: Some(nonexistent_dir.to_str().unwrap().to_string()),
    };

    let csv_path = export_to_csv(&decoded(), &bbl_path, &export_opts).unwrap();
    assert!(nonexistent_dir.exists(), "Output directory should be created");
    assert_eq!(csv_path, nonexistent_dir.join("test_gyro.csv"));

    let contents = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "timestamp,gyro_x,gyro_y,gyro_z,gyro_x_raw,gyro_y_raw,gyro_z_raw"
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "1000,0.610,0.000,0.000,10,0,0");
    assert_eq!(lines[2], "1012,0.000,1.220,0.000,0,20,0");
}

#[test]
fn test_export_log_respects_csv_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bbl_path = temp_dir.path().join("LOG00001.BFL");
    let log = decoded();

    let report = export_log(&log, &bbl_path, &ExportOptions::default()).unwrap();
    assert!(report.json_path.is_some());
    assert!(report.csv_path.is_none());
    assert!(!temp_dir.path().join("LOG00001_gyro.csv").exists());

    let options = ExportOptions {
        csv: true,
        output_dir: None,
    };
    let report = export_log(&log, &bbl_path, &options).unwrap();
    assert_eq!(report.csv_path, Some(temp_dir.path().join("LOG00001_gyro.csv")));
}

#[test]
fn test_export_failure_report() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bbl_path = temp_dir.path().join("broken.bbl");

    let report = DecodeReport::from_result(decode_bbl_bytes(b""));
    let json_path = export_to_json(&report, &bbl_path, &ExportOptions::default()).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(parsed["success"], false);
    assert!(parsed["error"].as_str().unwrap().starts_with("Invalid header"));
}
