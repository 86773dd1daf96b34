//! Gyro sample extraction from accepted main frames.

use crate::conversion::scale_raw;
use crate::parser::main::DecoderOptions;
use crate::types::{DecodedFrame, GyroSample};

/// Project a frame's gyro axes into a scaled sample.
///
/// Missing axis fields read as 0. The timestamp is the frame's time field
/// when present, otherwise `sample_index`.
pub fn extract_gyro_sample(
    frame: &DecodedFrame,
    sample_index: usize,
    options: &DecoderOptions,
) -> GyroSample {
    let [x_field, y_field, z_field] = &options.gyro_fields;
    let gyro_x_raw = frame.get(x_field).unwrap_or(0);
    let gyro_y_raw = frame.get(y_field).unwrap_or(0);
    let gyro_z_raw = frame.get(z_field).unwrap_or(0);

    let timestamp = frame
        .get(&options.time_field)
        .unwrap_or(sample_index as i64);

    GyroSample {
        timestamp,
        gyro_x: scale_raw(gyro_x_raw, options.gyro_scale),
        gyro_y: scale_raw(gyro_y_raw, options.gyro_scale),
        gyro_z: scale_raw(gyro_z_raw, options.gyro_scale),
        gyro_x_raw,
        gyro_y_raw,
        gyro_z_raw,
    }
}
