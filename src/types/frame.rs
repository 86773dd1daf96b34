use crate::parser::decoder::{FieldEncoding, FieldPredictor};
use std::collections::{BTreeMap, HashMap, VecDeque};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of reconstructed frames kept for prediction.
pub const HISTORY_CAPACITY: usize = 10;

/// Frame kinds, keyed by the tag byte that starts each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `I`: absolute field values
    Intra,
    /// `P`: deltas against predicted values
    Inter,
    /// `S`: slow data
    Slow,
    /// `G`: GPS position
    Gps,
    /// `H`: GPS home
    GpsHome,
    /// `E`: event
    Event,
}

impl FrameKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'I' => Some(FrameKind::Intra),
            b'P' => Some(FrameKind::Inter),
            b'S' => Some(FrameKind::Slow),
            b'G' => Some(FrameKind::Gps),
            b'H' => Some(FrameKind::GpsHome),
            b'E' => Some(FrameKind::Event),
            _ => None,
        }
    }

    pub fn tag(self) -> char {
        match self {
            FrameKind::Intra => 'I',
            FrameKind::Inter => 'P',
            FrameKind::Slow => 'S',
            FrameKind::Gps => 'G',
            FrameKind::GpsHome => 'H',
            FrameKind::Event => 'E',
        }
    }

    /// Main frames carry the sensor fields described by the schema.
    pub fn is_main(self) -> bool {
        matches!(self, FrameKind::Intra | FrameKind::Inter)
    }
}

/// Field definition for a frame type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDefinition {
    pub name: String,
    pub encoding: FieldEncoding,
    pub predictor: FieldPredictor,
    pub signed: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, encoding: FieldEncoding, predictor: FieldPredictor) -> Self {
        Self {
            name: name.into(),
            encoding,
            predictor,
            signed: false,
        }
    }
}

/// Ordered field list of one frame type; the order is the on-wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FrameDefinition {
    pub fields: Vec<FieldDefinition>,
}

impl FrameDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_field_names(names: Vec<String>) -> Self {
        let fields = names
            .into_iter()
            .map(|name| FieldDefinition::new(name, FieldEncoding::default(), FieldPredictor::default()))
            .collect();
        Self { fields }
    }

    pub fn update_signed(&mut self, signed_data: &[bool]) {
        for (field, signed) in self.fields.iter_mut().zip(signed_data) {
            field.signed = *signed;
        }
    }

    pub fn update_predictors(&mut self, predictors: &[FieldPredictor]) {
        for (field, predictor) in self.fields.iter_mut().zip(predictors) {
            field.predictor = *predictor;
        }
    }

    pub fn update_encoding(&mut self, encodings: &[FieldEncoding]) {
        for (field, encoding) in self.fields.iter_mut().zip(encodings) {
            field.encoding = *encoding;
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Frame definitions for every frame tag of a log. Built once per decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldSchema {
    definitions: BTreeMap<char, FrameDefinition>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema used when a log declares no fields at all: the same eight
    /// fields for intra and inter frames.
    pub fn default_schema() -> Self {
        use FieldEncoding::{SignedVb, UnsignedVb};
        use FieldPredictor::{Increment, StraightLine, Zero};

        let fields = vec![
            FieldDefinition::new("loopIteration", UnsignedVb, Increment),
            FieldDefinition::new("time", UnsignedVb, StraightLine),
            FieldDefinition::new("gyroADC[0]", SignedVb, Zero),
            FieldDefinition::new("gyroADC[1]", SignedVb, Zero),
            FieldDefinition::new("gyroADC[2]", SignedVb, Zero),
            FieldDefinition::new("accSmooth[0]", SignedVb, Zero),
            FieldDefinition::new("accSmooth[1]", SignedVb, Zero),
            FieldDefinition::new("accSmooth[2]", SignedVb, Zero),
        ];

        let mut schema = Self::new();
        schema.insert('I', FrameDefinition { fields: fields.clone() });
        schema.insert('P', FrameDefinition { fields });
        schema
    }

    pub fn insert(&mut self, frame_type: char, definition: FrameDefinition) {
        self.definitions.insert(frame_type, definition);
    }

    pub fn get(&self, frame_type: char) -> Option<&FrameDefinition> {
        self.definitions.get(&frame_type)
    }

    pub fn contains(&self, frame_type: char) -> bool {
        self.definitions.contains_key(&frame_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &FrameDefinition)> {
        self.definitions.iter().map(|(tag, def)| (*tag, def))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Decoded frame data
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedFrame {
    pub frame_type: char,
    pub data: HashMap<String, i64>,
}

impl DecodedFrame {
    pub fn new(frame_type: char) -> Self {
        Self {
            frame_type,
            data: HashMap::new(),
        }
    }

    pub fn get(&self, field_name: &str) -> Option<i64> {
        self.data.get(field_name).copied()
    }
}

/// Frame statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameStats {
    pub i_frames: u32,
    pub p_frames: u32,
    pub s_frames: u32,
    pub g_frames: u32,
    pub h_frames: u32,
    pub e_frames: u32,
    /// Main frames that were started but discarded
    pub failed_frames: u32,
    pub total_bytes: u64,
}

impl FrameStats {
    pub(crate) fn count(&mut self, kind: FrameKind) {
        let counter = match kind {
            FrameKind::Intra => &mut self.i_frames,
            FrameKind::Inter => &mut self.p_frames,
            FrameKind::Slow => &mut self.s_frames,
            FrameKind::Gps => &mut self.g_frames,
            FrameKind::GpsHome => &mut self.h_frames,
            FrameKind::Event => &mut self.e_frames,
        };
        *counter += 1;
    }
}

/// Frame history for prediction during parsing.
///
/// Holds the most recent frames, oldest first; pushing past capacity drops
/// the oldest.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    frames: VecDeque<DecodedFrame>,
    capacity: usize,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, frame: DecodedFrame) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn previous(&self) -> Option<&DecodedFrame> {
        self.frames.back()
    }

    pub fn previous2(&self) -> Option<&DecodedFrame> {
        self.frames.len().checked_sub(2).and_then(|i| self.frames.get(i))
    }

    /// Field value of the last frame, 0 when absent.
    pub fn previous_value(&self, field_name: &str) -> i64 {
        self.previous().and_then(|f| f.get(field_name)).unwrap_or(0)
    }

    /// Field value of the second-to-last frame, 0 when absent.
    pub fn previous2_value(&self, field_name: &str) -> i64 {
        self.previous2().and_then(|f| f.get(field_name)).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodedFrame> {
        self.frames.iter()
    }
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
