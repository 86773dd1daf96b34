use crate::parser::stream::BBLDataStream;
use crate::types::FrameHistory;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field encodings as numbered in the `Field <t> encoding` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldEncoding {
    #[default]
    SignedVb,
    UnsignedVb,
    Neg14Bit,
    Tag8_8Svb,
    Tag2_3S32,
    Tag8_4S16,
    Null,
    Unknown(i64),
}

impl FieldEncoding {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => FieldEncoding::SignedVb,
            1 => FieldEncoding::UnsignedVb,
            3 => FieldEncoding::Neg14Bit,
            6 => FieldEncoding::Tag8_8Svb,
            7 => FieldEncoding::Tag2_3S32,
            8 => FieldEncoding::Tag8_4S16,
            9 => FieldEncoding::Null,
            other => FieldEncoding::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            FieldEncoding::SignedVb => 0,
            FieldEncoding::UnsignedVb => 1,
            FieldEncoding::Neg14Bit => 3,
            FieldEncoding::Tag8_8Svb => 6,
            FieldEncoding::Tag2_3S32 => 7,
            FieldEncoding::Tag8_4S16 => 8,
            FieldEncoding::Null => 9,
            FieldEncoding::Unknown(code) => code,
        }
    }
}

/// Field predictors as numbered in the `Field <t> predictor` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPredictor {
    #[default]
    Zero,
    StraightLine,
    Average2,
    MinThrottle,
    Motor0,
    Increment,
    HomeCoord,
    LastMainFrameTime,
    MinMotor,
    Average3,
    Unknown(i64),
}

impl FieldPredictor {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => FieldPredictor::Zero,
            1 => FieldPredictor::StraightLine,
            2 => FieldPredictor::Average2,
            3 => FieldPredictor::MinThrottle,
            4 => FieldPredictor::Motor0,
            5 => FieldPredictor::Increment,
            6 => FieldPredictor::HomeCoord,
            7 => FieldPredictor::LastMainFrameTime,
            8 => FieldPredictor::MinMotor,
            9 => FieldPredictor::Average3,
            other => FieldPredictor::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            FieldPredictor::Zero => 0,
            FieldPredictor::StraightLine => 1,
            FieldPredictor::Average2 => 2,
            FieldPredictor::MinThrottle => 3,
            FieldPredictor::Motor0 => 4,
            FieldPredictor::Increment => 5,
            FieldPredictor::HomeCoord => 6,
            FieldPredictor::LastMainFrameTime => 7,
            FieldPredictor::MinMotor => 8,
            FieldPredictor::Average3 => 9,
            FieldPredictor::Unknown(code) => code,
        }
    }
}

// Both kinds travel as their header codes so unknown values survive output.
#[cfg(feature = "serde")]
impl Serialize for FieldEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for FieldEncoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i64::deserialize(deserializer).map(FieldEncoding::from_code)
    }
}

#[cfg(feature = "serde")]
impl Serialize for FieldPredictor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for FieldPredictor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i64::deserialize(deserializer).map(FieldPredictor::from_code)
    }
}

/// Decode a field value using the specified encoding.
///
/// A read cut short by the end of the data yields 0.
pub fn decode_field_value(stream: &mut BBLDataStream, encoding: FieldEncoding) -> i64 {
    let value = match encoding {
        FieldEncoding::SignedVb => stream.read_signed_vb(),
        FieldEncoding::UnsignedVb => stream.read_unsigned_vb().map(|v| v as i64),
        FieldEncoding::Neg14Bit => stream.read_neg_14bit(),
        // Tag-group and null encodings are not decoded; they read as one signed VB.
        FieldEncoding::Tag8_8Svb
        | FieldEncoding::Tag2_3S32
        | FieldEncoding::Tag8_4S16
        | FieldEncoding::Null
        | FieldEncoding::Unknown(_) => stream.read_signed_vb(),
    };

    value.unwrap_or(0)
}

/// Predict a field from history, then add the decoded delta.
///
/// Returns `None` if the arithmetic overflows.
pub fn apply_predictor(
    predictor: FieldPredictor,
    delta: i64,
    field_name: &str,
    history: &FrameHistory,
) -> Option<i64> {
    let prev = history.previous_value(field_name);
    let prev2 = history.previous2_value(field_name);
    let has_two = history.len() >= 2;

    let predicted = match predictor {
        FieldPredictor::Zero => Some(0),

        FieldPredictor::StraightLine => {
            if has_two {
                prev.checked_mul(2).and_then(|v| v.checked_sub(prev2))
            } else {
                Some(prev)
            }
        }

        FieldPredictor::Average2 => {
            if has_two {
                prev.checked_add(prev2).map(|sum| sum.div_euclid(2))
            } else {
                Some(prev)
            }
        }

        FieldPredictor::Increment => prev.checked_add(1),

        // No dedicated arithmetic for these; they carry the previous value.
        FieldPredictor::MinThrottle
        | FieldPredictor::Motor0
        | FieldPredictor::HomeCoord
        | FieldPredictor::LastMainFrameTime
        | FieldPredictor::MinMotor
        | FieldPredictor::Average3
        | FieldPredictor::Unknown(_) => Some(prev),
    };

    predicted.and_then(|p| p.checked_add(delta))
}
