//! Export functionality for decoded logs
//!
//! Writes the JSON report and, optionally, a CSV of gyro samples next to the
//! input file or into a chosen output directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[cfg(feature = "csv")]
use crate::types::DecodedLog;
#[cfg(feature = "json")]
use crate::report::DecodeReport;

/// Export options for controlling output formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub csv: bool,
    pub output_dir: Option<String>,
}

/// Paths written by an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

/// Output paths for one input file: `(<stem>_decoded.json, <stem>_gyro.csv)`.
///
/// Files go into `output_dir` when set, otherwise beside the input.
pub fn compute_export_paths(input_path: &Path, export_options: &ExportOptions) -> (PathBuf, PathBuf) {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "blackbox".to_string());

    let output_dir = match &export_options.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    (
        output_dir.join(format!("{stem}_decoded.json")),
        output_dir.join(format!("{stem}_gyro.csv")),
    )
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {parent:?}"))?;
        }
    }
    Ok(())
}

/// Write the report as pretty-printed JSON
#[cfg(feature = "json")]
pub fn export_to_json(
    report: &DecodeReport,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    use std::fs::File;
    use std::io::{BufWriter, Write};

    let (json_path, _) = compute_export_paths(input_path, export_options);
    ensure_parent_dir(&json_path)?;

    let file = File::create(&json_path)
        .with_context(|| format!("Failed to create JSON file: {json_path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write JSON file: {json_path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush JSON file: {json_path:?}"))?;

    Ok(json_path)
}

/// Write one CSV row per gyro sample
#[cfg(feature = "csv")]
pub fn export_to_csv(log: &DecodedLog, input_path: &Path, export_options: &ExportOptions) -> Result<PathBuf> {
    let (_, csv_path) = compute_export_paths(input_path, export_options);
    ensure_parent_dir(&csv_path)?;

    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create CSV file: {csv_path:?}"))?;

    writer.write_record([
        "timestamp",
        "gyro_x",
        "gyro_y",
        "gyro_z",
        "gyro_x_raw",
        "gyro_y_raw",
        "gyro_z_raw",
    ])?;

    for sample in &log.gyro_data {
        writer.write_record(&[
            sample.timestamp.to_string(),
            format!("{:.3}", sample.gyro_x),
            format!("{:.3}", sample.gyro_y),
            format!("{:.3}", sample.gyro_z),
            sample.gyro_x_raw.to_string(),
            sample.gyro_y_raw.to_string(),
            sample.gyro_z_raw.to_string(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {csv_path:?}"))?;

    Ok(csv_path)
}

/// Export a decoded log in every format the options ask for.
#[cfg(all(feature = "json", feature = "csv"))]
pub fn export_log(log: &DecodedLog, input_path: &Path, export_options: &ExportOptions) -> Result<ExportReport> {
    let report = DecodeReport::success(log.clone());
    let json_path = export_to_json(&report, input_path, export_options)?;

    let csv_path = if export_options.csv {
        Some(export_to_csv(log, input_path, export_options)?)
    } else {
        None
    };

    Ok(ExportReport {
        json_path: Some(json_path),
        csv_path,
    })
}
