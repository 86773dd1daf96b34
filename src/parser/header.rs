use crate::error::{DecodeError, Result};
use crate::parser::decoder::{FieldEncoding, FieldPredictor};
use crate::parser::stream::BBLDataStream;
use crate::types::{
    FieldDefinition, FieldDefinitionLine, FrameDefinition, HeaderBlock, HeaderEnd, HeaderMap,
};
use tracing::debug;

pub const HEADER_PREFIX: &[u8] = b"H ";
pub const FIELD_DEFINITION_PREFIX: &[u8] = b"F ";
/// A line holding only this marker ends the text part of a log.
pub const LOG_START_MARKER: &[u8] = b"S";

/// Parse the text header at the start of a log.
///
/// Stops at the log-start marker, at the first field-definition line (which
/// is rewound so [`parse_field_definition_lines`] sees it again), or at a
/// blank line / end of data. Running out of lines without a single
/// key/value pair is an error.
pub fn parse_headers(stream: &mut BBLDataStream) -> Result<HeaderBlock> {
    let mut headers = HeaderMap::new();

    let end = loop {
        let line_start = stream.pos;
        let line = match stream.read_line() {
            Some(line) if !line.is_empty() => line,
            _ => break HeaderEnd::EndOfHeaders,
        };

        let line = trim_ascii(&line);
        if line.is_empty() {
            continue;
        }

        if line.starts_with(HEADER_PREFIX) {
            insert_header_line(line, &mut headers);
        } else if line == LOG_START_MARKER {
            debug!(offset = stream.pos, "log start marker found");
            break HeaderEnd::LogStart;
        } else if line.starts_with(FIELD_DEFINITION_PREFIX) {
            // Hand the whole line back, terminator included.
            stream.rewind(stream.pos - line_start);
            break HeaderEnd::FieldDefinitions;
        }
    };

    if end == HeaderEnd::EndOfHeaders && headers.is_empty() {
        return Err(DecodeError::InvalidHeader(
            "no header lines found before end of data".to_string(),
        ));
    }

    debug!(count = headers.len(), ?end, "parsed header block");
    Ok(HeaderBlock { headers, end })
}

/// Read `F <tag> name:encoding:predictor ...` lines following the header
/// block.
///
/// Late `H` lines are still added to `headers`. Reading stops at the
/// log-start marker, a blank line or the end of data.
pub fn parse_field_definition_lines(
    stream: &mut BBLDataStream,
    headers: &mut HeaderMap,
) -> Result<Vec<FieldDefinitionLine>> {
    let mut lines = Vec::new();

    loop {
        let line = match stream.read_line() {
            Some(line) if !line.is_empty() => line,
            _ => break,
        };

        let line = trim_ascii(&line);
        if line.is_empty() {
            continue;
        }

        if line.starts_with(FIELD_DEFINITION_PREFIX) {
            let text = decode_text(&line[FIELD_DEFINITION_PREFIX.len()..]);
            if let Some(definition_line) = parse_field_definition_line(&text)? {
                debug!(
                    frame_type = %definition_line.frame_type,
                    fields = definition_line.definition.len(),
                    "field definition line"
                );
                lines.push(definition_line);
            }
        } else if line.starts_with(HEADER_PREFIX) {
            insert_header_line(line, headers);
        } else if line == LOG_START_MARKER {
            debug!(offset = stream.pos, "log start marker found");
            break;
        }
    }

    Ok(lines)
}

fn parse_field_definition_line(text: &str) -> Result<Option<FieldDefinitionLine>> {
    let mut tokens = text.split_whitespace();

    let frame_type = match tokens.next().and_then(single_char) {
        Some(tag) => tag,
        None => {
            debug!(line = text, "ignoring field definition line without a frame tag");
            return Ok(None);
        }
    };

    let fields = tokens
        .map(parse_field_token)
        .collect::<Result<Vec<FieldDefinition>>>()?;

    Ok(Some(FieldDefinitionLine {
        frame_type,
        definition: FrameDefinition { fields },
    }))
}

/// `name[:encoding[:predictor]]`; missing codes are 0.
fn parse_field_token(token: &str) -> Result<FieldDefinition> {
    let mut parts = token.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    let encoding = parse_code(parts.next(), token)?;
    let predictor = parse_code(parts.next(), token)?;

    Ok(FieldDefinition::new(
        name,
        FieldEncoding::from_code(encoding),
        FieldPredictor::from_code(predictor),
    ))
}

fn parse_code(part: Option<&str>, token: &str) -> Result<i64> {
    match part {
        None => Ok(0),
        Some(code) => code.trim().parse().map_err(|_| {
            DecodeError::InvalidSchema(format!("invalid code '{}' in field '{}'", code, token))
        }),
    }
}

fn insert_header_line(line: &[u8], headers: &mut HeaderMap) {
    let text = decode_text(&line[HEADER_PREFIX.len()..]);
    if let Some((key, value)) = text.split_once(':') {
        let key = key.trim();
        let value = value.trim();
        debug!(key, value, "header");
        headers.insert(key.to_string(), value.to_string());
    }
}

pub(crate) fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Header text is ASCII in practice; anything that is not UTF-8 is dropped.
fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
