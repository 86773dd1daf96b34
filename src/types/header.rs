use crate::types::frame::FrameDefinition;
use std::collections::BTreeMap;

/// `H <key>:<value>` pairs of a log. Later duplicates overwrite earlier ones.
pub type HeaderMap = BTreeMap<String, String>;

/// Why the header block ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEnd {
    /// The log-start marker line; binary frames follow.
    LogStart,
    /// A field-definition (`F `) line, rewound for the next stage.
    FieldDefinitions,
    /// A blank line or the end of the data.
    EndOfHeaders,
}

/// Parsed text header of a log
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub headers: HeaderMap,
    pub end: HeaderEnd,
}

impl HeaderBlock {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// One `F <tag> name:encoding:predictor ...` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinitionLine {
    pub frame_type: char,
    pub definition: FrameDefinition,
}
