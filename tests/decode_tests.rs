//! Integration tests for decoding complete logs
//!
//! Covers the public decoding API end to end:
//! - Minimal logs declared through `F` lines and `H Field` headers
//! - P-frame reconstruction and the bounded prediction history
//! - Auxiliary frame skipping and early stops
//! - Failure on data without headers

use approx::assert_abs_diff_eq;
use bbl_decoder::{
    decode_bbl_bytes, decode_bbl_file, parse_frames, BBLDataStream, BBLDecoder, DecodeError,
    DecoderOptions, FieldEncoding, FieldPredictor, FieldSchema, StopReason,
};
use std::io::Write;
use tempfile::NamedTempFile;

const MINIMAL_LOG: &[u8] =
    b"H Product:Betaflight\nH Version:4.3.0\nF I gyroADC[0]:0:0 gyroADC[1]:0:0 gyroADC[2]:0:0\nS\nI\x64\x7F\x00";

/// Unsigned VB bytes for a value
fn uvb(mut value: u64) -> Vec<u8> {
    let mut bytes = Vec::new();
    while value >= 0x80 {
        bytes.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    bytes.push(value as u8);
    bytes
}

/// A log with `H Field` headers: I frames carry absolute values, P frames
/// predict loopIteration by increment, time by straight line and the gyro
/// axes by average of two.
fn header_declared_log(frame_count: usize) -> Vec<u8> {
    let mut data = b"H Product:Blackbox flight data recorder by Nicholas Sherlock\n\
H Firmware revision:Betaflight 4.5.1 (77d01ba3b) AT32F435M\n\
H Field I name:loopIteration,time,gyroADC[0],gyroADC[1],gyroADC[2]\n\
H Field I signed:0,0,1,1,1\n\
H Field I predictor:0,0,0,0,0\n\
H Field I encoding:1,1,0,0,0\n\
H Field P predictor:5,1,2,2,2\n\
H Field P encoding:0,0,0,0,0\n\
H Field P name:loopIteration,time,gyroADC[0],gyroADC[1],gyroADC[2]\n\
S\n"
        .to_vec();

    data.push(b'I');
    data.extend(uvb(0));
    data.extend(uvb(1_000));
    data.extend_from_slice(&[0x10, 0x20, 0x30]);

    for _ in 1..frame_count {
        // zero deltas: every value follows its predictor exactly
        data.extend_from_slice(&[b'P', 0, 0, 0, 0, 0]);
    }
    data
}

#[test]
fn test_minimal_log_decodes_one_frame() {
    let log = decode_bbl_bytes(MINIMAL_LOG).expect("minimal log should decode");

    assert!(log.frame_count >= 1);
    assert_eq!(log.header("Product"), Some("Betaflight"));
    assert_eq!(log.gyro_data.len(), log.frame_count);
    assert_eq!(log.gyro_data[0].gyro_x_raw, -28);
    assert_abs_diff_eq!(log.gyro_data[0].gyro_x, -28.0 / 16.4, epsilon = 1e-9);
}

#[test]
fn test_empty_and_garbage_input_fail() {
    assert!(matches!(decode_bbl_bytes(b""), Err(DecodeError::InvalidHeader(_))));
    assert!(decode_bbl_bytes(b"invalid data").is_err());
}

#[test]
fn test_header_declared_schema() {
    let log = decode_bbl_bytes(&header_declared_log(1)).unwrap();

    let p_def = log.field_definitions.get('P').unwrap();
    assert_eq!(p_def.fields[0].predictor, FieldPredictor::Increment);
    assert_eq!(p_def.fields[2].encoding, FieldEncoding::SignedVb);
    assert!(log.field_definitions.get('I').unwrap().fields[3].signed);

    assert_eq!(log.frame_count, 1);
    assert_eq!(log.gyro_data[0].timestamp, 1_000);
    assert_eq!(log.gyro_data[0].gyro_y_raw, 0x20);
}

#[test]
fn test_fifteen_frames_give_fifteen_samples() {
    let log = decode_bbl_bytes(&header_declared_log(15)).unwrap();

    assert_eq!(log.frame_count, 15);
    assert_eq!(log.gyro_data.len(), 15);
    assert_eq!(log.stats.i_frames, 1);
    assert_eq!(log.stats.p_frames, 14);
    assert!(log.reached_end());

    // straight-line time with zero deltas stays at the I frame's time
    assert!(log.gyro_data.iter().all(|s| s.timestamp == 1_000));
    // average-of-two over equal values keeps the gyro constant
    assert!(log.gyro_data.iter().all(|s| s.gyro_z_raw == 0x30));
    assert_eq!(log.duration(), 0);
}

#[test]
fn test_history_stays_bounded() {
    let data = header_declared_log(15);
    let mut stream = BBLDataStream::new(&data);
    // skip the text header
    let start = data.windows(2).position(|w| w == b"S\n").unwrap() + 2;
    stream.pos = start;

    let log = decode_bbl_bytes(&data).unwrap();
    let output = parse_frames(&mut stream, &log.field_definitions, &DecoderOptions::default());

    assert_eq!(output.gyro_data.len(), 15);
    assert!(output.history.len() <= 10);
    assert_eq!(output.history.previous().unwrap().get("loopIteration"), Some(14));
}

#[test]
fn test_time_advances_by_straight_line() {
    let mut data = header_declared_log(1);
    // first P frame: time delta +500, then a zero-delta frame extrapolates
    data.extend_from_slice(&[b'P', 0]);
    data.extend(uvb(500));
    data.extend_from_slice(&[0, 0, 0]);
    data.extend_from_slice(&[b'P', 0, 0, 0, 0, 0]);

    let log = decode_bbl_bytes(&data).unwrap();
    let timestamps: Vec<i64> = log.gyro_data.iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, [1_000, 1_500, 2_000]);
}

#[test]
fn test_auxiliary_frames_and_trailing_garbage() {
    let mut data = header_declared_log(2);
    data.push(b'S');
    data.extend_from_slice(&[1, 2, 3, 4, 5]);
    data.extend_from_slice(&[b'E', 0x0f, 0x00]);
    data.extend_from_slice(&[b'P', 0, 0, 0, 0, 0]);
    let stop_offset = data.len();
    data.extend_from_slice(&[0xff, b'P', 0, 0, 0, 0, 0]);

    let log = decode_bbl_bytes(&data).unwrap();
    assert_eq!(log.frame_count, 3);
    assert_eq!(log.stats.s_frames, 1);
    assert_eq!(log.stats.e_frames, 1);
    assert_eq!(
        log.stop_reason,
        StopReason::UnknownFrameType {
            byte: 0xff,
            offset: stop_offset
        }
    );
}

#[test]
fn test_decoding_is_idempotent() {
    let data = header_declared_log(8);
    let first = decode_bbl_bytes(&data).unwrap();
    let second = BBLDecoder::new().decode_bytes(&data).unwrap();

    assert_eq!(first.headers, second.headers);
    assert_eq!(first.field_definitions, second.field_definitions);
    assert_eq!(first.frame_count, second.frame_count);
    assert_eq!(first.gyro_data, second.gyro_data);
}

#[test]
fn test_invalid_field_codes_fail() {
    let data = b"H Field I name:a,b\nH Field I encoding:1,one\nS\nI\x00\x00";
    let err = decode_bbl_bytes(data).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidSchema(_)));
}

#[test]
fn test_default_schema_fallback() {
    let data = b"H Product:Test\nS\nI\x00\x0a\x01\x02\x03\x00\x00\x00";
    let log = decode_bbl_bytes(data).unwrap();
    assert_eq!(log.field_definitions, FieldSchema::default_schema());
    assert_eq!(log.gyro_data[0].timestamp, 10);
    assert_eq!(log.gyro_data[0].gyro_y_raw, 2);
}

#[test]
fn test_decode_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(MINIMAL_LOG).unwrap();

    let log = decode_bbl_file(file.path()).unwrap();
    assert_eq!(log.frame_count, 1);
    assert_eq!(log.header("Version"), Some("4.3.0"));
}
