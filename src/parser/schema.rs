//! Field schema discovery.
//!
//! Frame layouts come from `H Field <tag> name|encoding|predictor|signed`
//! headers, then from `F` lines for tags the headers did not declare, and
//! finally from [`FieldSchema::default_schema`] when neither declared
//! anything.

use crate::error::{DecodeError, Result};
use crate::parser::decoder::{FieldEncoding, FieldPredictor};
use crate::parser::header::single_char;
use crate::types::{FieldDefinitionLine, FieldSchema, FrameDefinition, HeaderMap};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Default)]
struct DeclaredLists {
    names: Option<Vec<String>>,
    encodings: Option<Vec<i64>>,
    predictors: Option<Vec<i64>>,
    signed: Option<Vec<i64>>,
}

/// Build the field schema for one log.
pub fn build_field_schema(
    headers: &HeaderMap,
    definition_lines: &[FieldDefinitionLine],
) -> Result<FieldSchema> {
    let mut declared: BTreeMap<char, DeclaredLists> = BTreeMap::new();

    for (key, value) in headers {
        let Some((frame_type, attribute)) = parse_field_key(key) else {
            continue;
        };

        let lists = declared.entry(frame_type).or_default();
        match attribute {
            "name" => {
                lists.names = Some(value.split(',').map(|s| s.trim().to_string()).collect());
            }
            "encoding" => lists.encodings = Some(parse_code_list(key, value)?),
            "predictor" => lists.predictors = Some(parse_code_list(key, value)?),
            "signed" => lists.signed = Some(parse_code_list(key, value)?),
            _ => {}
        }
    }

    let mut schema = FieldSchema::new();
    for (frame_type, lists) in declared {
        let Some(names) = lists.names else {
            debug!(%frame_type, "field codes declared without names, ignoring");
            continue;
        };

        let mut definition = FrameDefinition::from_field_names(names);
        if let Some(encodings) = lists.encodings {
            let encodings: Vec<FieldEncoding> =
                encodings.into_iter().map(FieldEncoding::from_code).collect();
            definition.update_encoding(&encodings);
        }
        if let Some(predictors) = lists.predictors {
            let predictors: Vec<FieldPredictor> =
                predictors.into_iter().map(FieldPredictor::from_code).collect();
            definition.update_predictors(&predictors);
        }
        if let Some(signed) = lists.signed {
            let signed: Vec<bool> = signed.into_iter().map(|s| s != 0).collect();
            definition.update_signed(&signed);
        }

        debug!(%frame_type, fields = definition.len(), "field definition from headers");
        schema.insert(frame_type, definition);
    }

    for line in definition_lines {
        if schema.contains(line.frame_type) {
            debug!(frame_type = %line.frame_type, "header fields take precedence over F line");
            continue;
        }
        schema.insert(line.frame_type, line.definition.clone());
    }

    if schema.is_empty() {
        warn!("log declares no fields, using default I/P layout");
        return Ok(FieldSchema::default_schema());
    }

    Ok(schema)
}

/// `Field <tag> <attribute>` with a one-character tag.
fn parse_field_key(key: &str) -> Option<(char, &str)> {
    let mut words = key.split_whitespace();
    if words.next()? != "Field" {
        return None;
    }
    let tag = words.next()?;
    let attribute = words.next()?;
    if words.next().is_some() {
        return None;
    }

    match single_char(tag) {
        Some(frame_type) => Some((frame_type, attribute)),
        None => {
            debug!(key, "ignoring field header with a multi-character tag");
            None
        }
    }
}

fn parse_code_list(key: &str, value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(|code| {
            code.trim().parse::<i64>().map_err(|_| {
                DecodeError::InvalidSchema(format!("invalid value '{}' in '{}'", code, key))
            })
        })
        .collect()
}
