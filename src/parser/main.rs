use crate::conversion::GYRO_SCALE;
use crate::error::Result;
use crate::parser::frame::parse_frames;
use crate::parser::header::{parse_field_definition_lines, parse_headers};
use crate::parser::schema::build_field_schema;
use crate::parser::stream::BBLDataStream;
use crate::types::{DecodedLog, HeaderEnd, HISTORY_CAPACITY};
use std::path::Path;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoder configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderOptions {
    /// Number of accepted frames kept for prediction
    pub history_capacity: usize,
    /// Field names of the x, y and z gyro axes
    pub gyro_fields: [String; 3],
    pub time_field: String,
    /// Multiplier from raw gyro counts to degrees per second
    pub gyro_scale: f64,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            gyro_fields: [
                "gyroADC[0]".to_string(),
                "gyroADC[1]".to_string(),
                "gyroADC[2]".to_string(),
            ],
            time_field: "time".to_string(),
            gyro_scale: GYRO_SCALE,
        }
    }
}

/// Blackbox log decoder.
///
/// Holds only configuration; every decode call starts from a fresh session,
/// so one decoder can be reused or shared between threads.
#[derive(Debug, Clone, Default)]
pub struct BBLDecoder {
    options: DecoderOptions,
}

impl BBLDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode a complete log held in memory.
    ///
    /// Fails only when the header block or the field declarations are
    /// malformed. Problems inside the binary section discard single frames
    /// or end the frame loop early, and the frames accepted so far are
    /// returned.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<DecodedLog> {
        debug!("Data size: {} bytes", data.len());

        let mut stream = BBLDataStream::new(data);
        let header_block = parse_headers(&mut stream)?;
        let mut headers = header_block.headers;

        let definition_lines = if header_block.end == HeaderEnd::FieldDefinitions {
            parse_field_definition_lines(&mut stream, &mut headers)?
        } else {
            Vec::new()
        };

        let field_definitions = build_field_schema(&headers, &definition_lines)?;
        debug!(
            "Binary data starts at offset {} ({} bytes)",
            stream.pos,
            stream.remaining()
        );

        let output = parse_frames(&mut stream, &field_definitions, &self.options);

        info!(
            frames = output.frame_count,
            samples = output.gyro_data.len(),
            failed = output.stats.failed_frames,
            stop = ?output.stop_reason,
            "decoded blackbox log"
        );

        Ok(DecodedLog {
            headers,
            field_definitions,
            frame_count: output.frame_count,
            gyro_data: output.gyro_data,
            stats: output.stats,
            stop_reason: output.stop_reason,
        })
    }

    /// Read a file and decode it.
    pub fn decode_file(&self, file_path: &Path) -> Result<DecodedLog> {
        let file_data = std::fs::read(file_path)?;
        debug!(
            "File size: {} bytes ({:.2} MB)",
            file_data.len(),
            file_data.len() as f64 / 1024.0 / 1024.0
        );
        self.decode_bytes(&file_data)
    }
}

/// Decode BBL data from memory with default options
pub fn decode_bbl_bytes(data: &[u8]) -> Result<DecodedLog> {
    BBLDecoder::new().decode_bytes(data)
}

/// Decode a BBL file with default options
pub fn decode_bbl_file(file_path: &Path) -> Result<DecodedLog> {
    BBLDecoder::new().decode_file(file_path)
}
