//! BBL Decoder Library
//!
//! A Rust library for decoding Betaflight-style blackbox log files into
//! their headers, field definitions and gyro samples.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export of gyro samples
//! - **`cli`** (default): Build the command-line interface binary
//! - **`json`** (default): JSON result report and the base64 request handler
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Decode a log file and look at the gyro samples:
//! ```rust,no_run
//! use bbl_decoder::decode_bbl_file;
//! use std::path::Path;
//!
//! let log = decode_bbl_file(Path::new("flight.BBL")).unwrap();
//! println!("Decoded {} frames", log.frame_count);
//! for sample in log.gyro_data.iter().take(5) {
//!     println!("{}: X={:.2}°/s", sample.timestamp, sample.gyro_x);
//! }
//! ```
//!
//! Decode from memory with custom options:
//! ```rust,no_run
//! use bbl_decoder::{BBLDecoder, DecoderOptions};
//!
//! let data = std::fs::read("flight.BBL").unwrap();
//! let decoder = BBLDecoder::with_options(DecoderOptions {
//!     history_capacity: 4,
//!     ..DecoderOptions::default()
//! });
//! let log = decoder.decode_bytes(&data).unwrap();
//! println!("{} samples over {} us", log.gyro_data.len(), log.duration());
//! ```
//!
//! # Public API
//!
//! ## Decoding Functions
//! - [`decode_bbl_file`] - Decode a log file with default options
//! - [`decode_bbl_bytes`] - Decode log data from memory
//! - [`BBLDecoder`] - Reusable decoder carrying [`DecoderOptions`]
//!
//! ## Data Types
//! - [`DecodedLog`] - Headers, field schema, frame count and gyro samples
//! - [`GyroSample`] - One scaled gyro reading
//! - [`FieldSchema`] - Per-frame-type field definitions
//! - [`FrameStats`] - Frame counts by type
//!
//! ## Export and Reporting
//! - `DecodeReport` - JSON success/failure report (`json` feature)
//! - `handle_request` - base64 request handler (`json` feature)
//! - [`compute_export_paths`] - Output paths for an input file

// Module declarations
pub mod conversion;
pub mod error;
pub mod export;
#[cfg(feature = "json")]
pub mod handler;
pub mod parser;
#[cfg(feature = "json")]
pub mod report;
pub mod types;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use conversion::*;
#[allow(ambiguous_glob_reexports)]
pub use error::*;
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[cfg(feature = "json")]
pub use handler::{handle_request, handle_request_with, DecodeRequest, HandlerResponse};
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
#[cfg(feature = "json")]
pub use report::DecodeReport;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
