//! CLI binary for BBL Decoder
//!
//! Decodes one blackbox log, prints a summary and writes the JSON report.

use anyhow::Result;
use bbl_decoder::{
    decode_bbl_file, export_to_csv, export_to_json, extract_firmware_version, DecodeReport,
    DecodedLog, ExportOptions,
};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::Level;

fn main() -> Result<()> {
    let matches = Command::new("BBL Decoder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode a blackbox log file into headers, field definitions and gyro samples.")
        .arg(
            Arg::new("file")
                .help("Blackbox log file to decode")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed parsing information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Also export gyro samples to <name>_gyro.csv")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for output files (default: same as input file)")
                .value_name("DIR"),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if debug { Level::DEBUG } else { Level::WARN })
        .init();

    let input_path = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .unwrap_or_default();
    let export_options = ExportOptions {
        csv: matches.get_flag("csv"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
    };

    println!("Decoding BBL file: {}", input_path.display());

    let log = match decode_bbl_file(&input_path) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    print_summary(&log);

    let csv_log = export_options.csv.then(|| log.clone());
    let json_path = export_to_json(&DecodeReport::success(log), &input_path, &export_options)?;
    println!("\nDetailed results saved to: {}", json_path.display());

    if let Some(log) = csv_log {
        let csv_path = export_to_csv(&log, &input_path, &export_options)?;
        println!("Gyro samples exported to: {}", csv_path.display());
    }

    Ok(())
}

fn print_summary(log: &DecodedLog) {
    println!("Successfully decoded {} frames", log.frame_count);
    println!("Extracted {} gyro data points", log.gyro_data.len());

    if log.stats.failed_frames > 0 {
        println!("Discarded {} malformed frames", log.stats.failed_frames);
    }

    if !log.gyro_data.is_empty() {
        println!("\nFirst 5 gyro data points:");
        for (i, sample) in log.gyro_data.iter().take(5).enumerate() {
            println!(
                "  {}: X={:.2}°/s, Y={:.2}°/s, Z={:.2}°/s",
                i + 1,
                sample.gyro_x,
                sample.gyro_y,
                sample.gyro_z
            );
        }
    }

    if !log.headers.is_empty() {
        println!("\nHeaders:");
        for (key, value) in &log.headers {
            println!("  {key}: {value}");
        }
    }

    let firmware = log
        .header("Firmware revision")
        .or_else(|| log.header("Version"))
        .and_then(extract_firmware_version);
    if let Some(version) = firmware {
        println!("\nFirmware version: {version}");
    }
}
