use crate::types::{FieldSchema, FrameStats, HeaderMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One gyro reading taken from an accepted main frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GyroSample {
    /// The frame's `time` field, or the sample's index when the frame has none
    pub timestamp: i64,
    /// Scaled values in degrees per second
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
    pub gyro_x_raw: i64,
    pub gyro_y_raw: i64,
    pub gyro_z_raw: i64,
}

/// Why the frame loop stopped. Neither case is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    EndOfStream,
    UnknownFrameType { byte: u8, offset: usize },
}

/// Complete result of a successful decode
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedLog {
    pub headers: HeaderMap,
    pub field_definitions: FieldSchema,
    /// Accepted main (I and P) frames
    pub frame_count: usize,
    pub gyro_data: Vec<GyroSample>,
    pub stats: FrameStats,
    pub stop_reason: StopReason,
}

impl DecodedLog {
    /// Span between the first and last sample timestamps
    pub fn duration(&self) -> i64 {
        match (self.gyro_data.first(), self.gyro_data.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp),
            _ => 0,
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Check if dispatch ran to the end of the data
    pub fn reached_end(&self) -> bool {
        self.stop_reason == StopReason::EndOfStream
    }
}
