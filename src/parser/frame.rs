use crate::parser::decoder::{apply_predictor, decode_field_value};
use crate::parser::gyro::extract_gyro_sample;
use crate::parser::main::DecoderOptions;
use crate::parser::stream::BBLDataStream;
use crate::types::{
    DecodedFrame, FieldSchema, FrameDefinition, FrameHistory, FrameKind, FrameStats, GyroSample,
    StopReason,
};
use std::fmt;
use tracing::{debug, warn};

/// Signed VB reads used to skip an S frame
const SLOW_FRAME_SKIP_READS: usize = 5;
/// Signed VB reads used to skip a G or H frame
const GPS_FRAME_SKIP_READS: usize = 10;

/// Why a main frame was discarded. The frame loop carries on at the next
/// byte after either of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The schema declares no fields for this frame type
    EmptyDefinition { frame_type: char },
    /// Reconstructing a field from history overflowed
    PredictionOverflow { field: String },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::EmptyDefinition { frame_type } => {
                write!(f, "no fields defined for frame type '{}'", frame_type)
            }
            FrameError::PredictionOverflow { field } => {
                write!(f, "prediction overflow in field '{}'", field)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Everything the frame loop produces
#[derive(Debug)]
pub struct FrameParseOutput {
    pub frame_count: usize,
    pub gyro_data: Vec<GyroSample>,
    pub stats: FrameStats,
    pub stop_reason: StopReason,
    /// Frames still in the prediction window when the loop ended
    pub history: FrameHistory,
}

/// Parse frames from the binary part of a log.
///
/// Runs until the end of the data or the first byte that is not a known
/// frame tag. Main frames that fail to decode are dropped and the loop
/// resumes at the following byte without searching for the next tag.
pub fn parse_frames(
    stream: &mut BBLDataStream,
    schema: &FieldSchema,
    options: &DecoderOptions,
) -> FrameParseOutput {
    let start_pos = stream.pos;
    let mut history = FrameHistory::new(options.history_capacity);
    let mut gyro_data: Vec<GyroSample> = Vec::new();
    let mut stats = FrameStats::default();
    let mut frame_count = 0;

    let stop_reason = loop {
        let frame_start_pos = stream.pos;
        let Some(tag) = stream.read_byte() else {
            break StopReason::EndOfStream;
        };

        let Some(kind) = FrameKind::from_tag(tag) else {
            warn!(
                "unknown frame type byte 0x{:02X} at offset {}, stopping",
                tag, frame_start_pos
            );
            break StopReason::UnknownFrameType {
                byte: tag,
                offset: frame_start_pos,
            };
        };

        if !kind.is_main() {
            skip_frame(stream, kind);
            stats.count(kind);
            continue;
        }

        let empty = FrameDefinition::new();
        let definition = schema.get(kind.tag()).unwrap_or(&empty);

        match parse_main_frame(stream, kind, definition, &history) {
            Ok(frame) => {
                let sample = extract_gyro_sample(&frame, gyro_data.len(), options);
                if frame_count < 3 {
                    debug!(
                        frame_type = %frame.frame_type,
                        offset = frame_start_pos,
                        timestamp = sample.timestamp,
                        "accepted frame"
                    );
                }
                gyro_data.push(sample);
                history.push(frame);
                stats.count(kind);
                frame_count += 1;
            }
            Err(err) => {
                warn!(offset = frame_start_pos, "discarding {} frame: {}", kind.tag(), err);
                stats.failed_frames += 1;
            }
        }
    };

    stats.total_bytes = (stream.pos - start_pos) as u64;

    debug!(
        "Parsed {} frames: {} I, {} P, {} S, {} G, {} H, {} E, {} failed",
        frame_count,
        stats.i_frames,
        stats.p_frames,
        stats.s_frames,
        stats.g_frames,
        stats.h_frames,
        stats.e_frames,
        stats.failed_frames
    );

    FrameParseOutput {
        frame_count,
        gyro_data,
        stats,
        stop_reason,
        history,
    }
}

/// Parse one I or P frame.
///
/// I frames carry absolute values. P frames carry deltas that are added to
/// a prediction from `history`, once history holds at least one frame.
pub fn parse_main_frame(
    stream: &mut BBLDataStream,
    kind: FrameKind,
    definition: &FrameDefinition,
    history: &FrameHistory,
) -> Result<DecodedFrame, FrameError> {
    if definition.is_empty() {
        return Err(FrameError::EmptyDefinition {
            frame_type: kind.tag(),
        });
    }

    let predictive = kind == FrameKind::Inter && !history.is_empty();
    let mut frame = DecodedFrame::new(kind.tag());

    for field in &definition.fields {
        let raw_value = decode_field_value(stream, field.encoding);

        let value = if predictive {
            apply_predictor(field.predictor, raw_value, &field.name, history).ok_or_else(|| {
                FrameError::PredictionOverflow {
                    field: field.name.clone(),
                }
            })?
        } else {
            raw_value
        };

        frame.data.insert(field.name.clone(), value);
    }

    Ok(frame)
}

/// Consume an auxiliary frame without interpreting it.
pub fn skip_frame(stream: &mut BBLDataStream, kind: FrameKind) {
    match kind {
        FrameKind::Slow => {
            for _ in 0..SLOW_FRAME_SKIP_READS {
                let _ = stream.read_signed_vb();
            }
        }
        FrameKind::Gps | FrameKind::GpsHome => {
            for _ in 0..GPS_FRAME_SKIP_READS {
                let _ = stream.read_signed_vb();
            }
        }
        FrameKind::Event => {
            let _event_type = stream.read_unsigned_vb();
            let _event_data = stream.read_unsigned_vb();
        }
        FrameKind::Intra | FrameKind::Inter => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decoder::{FieldEncoding, FieldPredictor};
    use crate::types::FieldDefinition;

    fn frame_bytes(tag: u8, loop_iteration: u8, time: &[u8], gyro: [u8; 3]) -> Vec<u8> {
        let mut bytes = vec![tag, loop_iteration];
        bytes.extend_from_slice(time);
        bytes.extend_from_slice(&gyro);
        bytes.extend_from_slice(&[0, 0, 0]);
        bytes
    }

    fn parse(data: &[u8], schema: &FieldSchema) -> FrameParseOutput {
        let mut stream = BBLDataStream::new(data);
        parse_frames(&mut stream, schema, &DecoderOptions::default())
    }

    #[test]
    fn test_intra_and_inter_frames() {
        let schema = FieldSchema::default_schema();
        let mut data = frame_bytes(b'I', 0, &[0xe8, 0x07], [10, 20, 30]); // time 1000
        data.extend(frame_bytes(b'P', 0, &[0xf4, 0x03], [5, 0x7f, 0])); // time delta 500
        data.extend(frame_bytes(b'P', 0, &[0x00], [1, 2, 3]));

        let output = parse(&data, &schema);
        assert_eq!(output.frame_count, 3);
        assert_eq!(output.stop_reason, StopReason::EndOfStream);
        assert_eq!(output.stats.i_frames, 1);
        assert_eq!(output.stats.p_frames, 2);
        assert_eq!(output.stats.total_bytes, data.len() as u64);

        let timestamps: Vec<i64> = output.gyro_data.iter().map(|s| s.timestamp).collect();
        // straight line from one frame repeats it; from two it extrapolates
        assert_eq!(timestamps, [1000, 1500, 2000]);

        // zero predictor: P frame gyro values are the deltas themselves
        assert_eq!(output.gyro_data[1].gyro_x_raw, 5);
        assert_eq!(output.gyro_data[1].gyro_y_raw, -1);

        let last = output.history.previous().unwrap();
        assert_eq!(last.get("loopIteration"), Some(2));
        assert_eq!(last.frame_type, 'P');
    }

    #[test]
    fn test_inter_frame_without_history_is_absolute() {
        let schema = FieldSchema::default_schema();
        let data = frame_bytes(b'P', 4, &[0x64], [1, 2, 3]);
        let output = parse(&data, &schema);

        assert_eq!(output.frame_count, 1);
        let frame = output.history.previous().unwrap();
        assert_eq!(frame.get("loopIteration"), Some(4));
        assert_eq!(frame.get("time"), Some(100));
    }

    #[test]
    fn test_auxiliary_frames_are_skipped() {
        let schema = FieldSchema::default_schema();
        let mut data = vec![b'S', 1, 2, 3, 4, 5];
        data.push(b'G');
        data.extend_from_slice(&[0; 10]);
        data.push(b'H');
        data.extend_from_slice(&[0x81, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        data.extend_from_slice(&[b'E', 0x80, 0x01, 0x07]);
        data.extend(frame_bytes(b'I', 1, &[0x0a], [1, 1, 1]));

        let output = parse(&data, &schema);
        assert_eq!(output.stats.s_frames, 1);
        assert_eq!(output.stats.g_frames, 1);
        assert_eq!(output.stats.h_frames, 1);
        assert_eq!(output.stats.e_frames, 1);
        assert_eq!(output.frame_count, 1);
        assert_eq!(output.gyro_data[0].timestamp, 10);
    }

    #[test]
    fn test_unknown_tag_stops_with_frames_kept() {
        let schema = FieldSchema::default_schema();
        let mut data = frame_bytes(b'I', 0, &[0x01], [1, 2, 3]);
        let offset = data.len();
        data.push(b'X');
        data.extend(frame_bytes(b'I', 0, &[0x02], [1, 2, 3]));

        let output = parse(&data, &schema);
        assert_eq!(output.frame_count, 1);
        assert_eq!(
            output.stop_reason,
            StopReason::UnknownFrameType { byte: b'X', offset }
        );
    }

    #[test]
    fn test_truncated_frame_reads_zeros() {
        let schema = FieldSchema::default_schema();
        let output = parse(&[b'I', 0x05, 0x64], &schema);

        assert_eq!(output.frame_count, 1);
        let frame = output.history.previous().unwrap();
        assert_eq!(frame.get("time"), Some(100));
        assert_eq!(frame.get("gyroADC[0]"), Some(0));
        assert_eq!(frame.get("accSmooth[2]"), Some(0));
    }

    #[test]
    fn test_missing_definition_discards_frame() {
        let mut schema = FieldSchema::new();
        schema.insert(
            'I',
            FrameDefinition {
                fields: vec![FieldDefinition::new("gyroADC[0]", FieldEncoding::SignedVb, FieldPredictor::Zero)],
            },
        );
        // P has no definition: the tag is dropped and the next byte read as a tag
        let data = [b'I', 0x05, b'P', b'I', 0x06];
        let output = parse(&data, &schema);

        assert_eq!(output.frame_count, 2);
        assert_eq!(output.stats.failed_frames, 1);
        assert_eq!(output.gyro_data[1].gyro_x_raw, 6);
    }

    #[test]
    fn test_prediction_overflow_discards_only_that_frame() {
        let mut schema = FieldSchema::new();
        let fields = vec![FieldDefinition::new("x", FieldEncoding::UnsignedVb, FieldPredictor::StraightLine)];
        schema.insert('I', FrameDefinition { fields: fields.clone() });
        schema.insert('P', FrameDefinition { fields });

        let mut history = FrameHistory::default();
        let mut frame = DecodedFrame::new('I');
        frame.data.insert("x".to_string(), i64::MAX);
        history.push(frame);

        let definition = schema.get('P').unwrap();
        let mut stream = BBLDataStream::new(&[0x01]);
        let err = parse_main_frame(&mut stream, FrameKind::Inter, definition, &history).unwrap_err();
        assert_eq!(err, FrameError::PredictionOverflow { field: "x".to_string() });
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_skip_frame_byte_counts() {
        let data = [0u8; 16];

        let mut stream = BBLDataStream::new(&data);
        skip_frame(&mut stream, FrameKind::Slow);
        assert_eq!(stream.pos, 5);

        let mut stream = BBLDataStream::new(&data);
        skip_frame(&mut stream, FrameKind::Gps);
        assert_eq!(stream.pos, 10);

        let mut stream = BBLDataStream::new(&data);
        skip_frame(&mut stream, FrameKind::Event);
        assert_eq!(stream.pos, 2);
    }
}
