//! Group-type payload encoding and decoding
//!
//! Dispatch is a closed match over the (type code, version) pair: the
//! broadcast standard fixes the group catalogue, so a new group type
//! is a code change here, not a runtime registration. Only 0A (basic
//! tuning) and 2A (RadioText) are implemented; everything else decodes
//! to [`GroupError::UnsupportedType`] so callers can count and skip it
//! without guessing at payload semantics.

use std::fmt;

use thiserror::Error;

use crate::fields::{AfCode, AfPair, MusicSpeech, ProgramType};
use crate::group::Group;

/// The group types this codec implements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString)]
pub enum GroupKind {
    /// Type 0A: basic tuning and switching information
    #[strum(serialize = "0A")]
    BasicTuning,

    /// Type 2A: RadioText
    #[strum(serialize = "2A")]
    RadioText,
}

impl GroupKind {
    /// The four-bit group type code
    pub fn type_code(&self) -> u8 {
        match self {
            GroupKind::BasicTuning => 0,
            GroupKind::RadioText => 2,
        }
    }

    /// Number of segment addresses a field of this type spans
    pub fn segment_count(&self) -> u8 {
        match self {
            GroupKind::BasicTuning => 4,
            GroupKind::RadioText => 16,
        }
    }

    /// Closed dispatch over the wire-format type and version bits
    pub fn from_wire(type_code: u8, version_b: bool) -> Result<Self, GroupError> {
        match (type_code, version_b) {
            (0, false) => Ok(GroupKind::BasicTuning),
            (2, false) => Ok(GroupKind::RadioText),
            _ => Err(GroupError::UnsupportedType {
                type_code,
                version: if version_b { 'B' } else { 'A' },
            }),
        }
    }
}

/// Error interpreting a correctly-synchronized group
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GroupError {
    /// The group declares a type/version this codec does not implement
    #[error("unsupported group type {type_code}{version}")]
    UnsupportedType {
        /// Four-bit group type code
        type_code: u8,
        /// Version letter, `A` or `B`
        version: char,
    },
}

/// Fields common to every group, carried in blocks A and B
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupHeader {
    /// Program Identification
    pub pi: u16,
    /// Programme Type
    pub pty: ProgramType,
    /// Traffic Program flag
    pub tp: bool,
}

/// Type-specific payload of one decoded group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupPayload {
    /// One segment of a type 0A transmission
    BasicTuning {
        /// Traffic Announcement flag
        ta: bool,
        /// Music/Speech switch
        ms: MusicSpeech,
        /// The single DI bit carried by this segment
        di_bit: bool,
        /// Segment address, 0–3
        segment: u8,
        /// Alternate Frequency pair, if this group carries one
        af: Option<AfPair>,
        /// Two Program Service characters at offset `2 × segment`
        ps_chars: [u8; 2],
    },

    /// One segment of a type 2A transmission
    RadioText {
        /// RadioText A/B flag
        ab: bool,
        /// Segment address, 0–15
        segment: u8,
        /// Four RadioText characters at offset `4 × segment`
        chars: [u8; 4],
    },
}

impl GroupPayload {
    /// Which group kind this payload belongs to
    pub fn kind(&self) -> GroupKind {
        match self {
            GroupPayload::BasicTuning { .. } => GroupKind::BasicTuning,
            GroupPayload::RadioText { .. } => GroupKind::RadioText,
        }
    }

    /// The payload's segment address
    pub fn segment(&self) -> u8 {
        match self {
            GroupPayload::BasicTuning { segment, .. } => *segment,
            GroupPayload::RadioText { segment, .. } => *segment,
        }
    }
}

/// A fully-interpreted group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedGroup {
    /// Common fields from blocks A and B
    pub header: GroupHeader,
    /// Type-specific payload
    pub payload: GroupPayload,
}

impl fmt::Display for DecodedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pi={:04x} segment={}",
            self.payload.kind(),
            self.header.pi,
            self.payload.segment()
        )
    }
}

/// Interpret an assembled group's payload
///
/// ```
/// use rdsgroup::{decode_group, Group, GroupKind};
///
/// // segment 0 of a 0A transmission: PI 0x1234, PTY 5, TP and TA set,
/// // AF pair (104.5, 98.0), PS characters "Ra"
/// let group = Group::new(0x1234, 0x04b0, 0xaa69, 0x5261);
/// let decoded = decode_group(&group).expect("supported type");
/// assert_eq!(GroupKind::BasicTuning, decoded.payload.kind());
/// assert_eq!(0x1234, decoded.header.pi);
/// assert_eq!(0, decoded.payload.segment());
/// ```
pub fn decode_group(group: &Group) -> Result<DecodedGroup, GroupError> {
    let info_b = group.info_b();
    let type_code = (info_b >> 12) as u8;
    let version_b = info_b & (1 << 11) != 0;
    let kind = GroupKind::from_wire(type_code, version_b)?;

    let header = GroupHeader {
        pi: group.pi(),
        pty: ProgramType::from_wire((info_b >> 5) as u8),
        tp: info_b & (1 << 10) != 0,
    };

    let payload = match kind {
        GroupKind::BasicTuning => GroupPayload::BasicTuning {
            ta: info_b & (1 << 4) != 0,
            ms: MusicSpeech::from_bit(info_b & (1 << 3) != 0),
            di_bit: info_b & (1 << 2) != 0,
            segment: (info_b & 0x3) as u8,
            af: decode_af_pair(group.info_c()),
            ps_chars: group.info_d().to_be_bytes(),
        },
        GroupKind::RadioText => {
            let [c0, c1] = group.info_c().to_be_bytes();
            let [c2, c3] = group.info_d().to_be_bytes();
            GroupPayload::RadioText {
                ab: info_b & (1 << 4) != 0,
                segment: (info_b & 0xf) as u8,
                chars: [c0, c1, c2, c3],
            }
        }
    };

    Ok(DecodedGroup { header, payload })
}

/// Synthesize the group carrying `payload` under `header`
///
/// This is the structural inverse of [`decode_group`]: every field is
/// already validated by its type, so synthesis cannot fail.
pub fn encode_group(header: &GroupHeader, payload: &GroupPayload) -> Group {
    let kind = payload.kind();
    let mut info_b: u16 = (kind.type_code() as u16) << 12;
    info_b |= (header.tp as u16) << 10;
    info_b |= (header.pty.value() as u16) << 5;

    let (info_c, info_d) = match payload {
        GroupPayload::BasicTuning {
            ta,
            ms,
            di_bit,
            segment,
            af,
            ps_chars,
        } => {
            info_b |= (*ta as u16) << 4;
            info_b |= (ms.bit() as u16) << 3;
            info_b |= (*di_bit as u16) << 2;
            info_b |= (*segment & 0x3) as u16;
            (encode_af_pair(*af), u16::from_be_bytes(*ps_chars))
        }
        GroupPayload::RadioText { ab, segment, chars } => {
            info_b |= (*ab as u16) << 4;
            info_b |= (*segment & 0xf) as u16;
            (
                u16::from_be_bytes([chars[0], chars[1]]),
                u16::from_be_bytes([chars[2], chars[3]]),
            )
        }
    };

    Group::new(header.pi, info_b, info_c, info_d)
}

// An all-zero block C means "no AF carried here"; so does any code
// outside the 1..=204 band (0 is "not used", 205+ are fillers)
fn decode_af_pair(info_c: u16) -> Option<AfPair> {
    let [first, second] = info_c.to_be_bytes();
    match (AfCode::try_from(first), AfCode::try_from(second)) {
        (Ok(first), Ok(second)) => Some(AfPair(first, second)),
        _ => None,
    }
}

fn encode_af_pair(af: Option<AfPair>) -> u16 {
    match af {
        Some(AfPair(first, second)) => u16::from_be_bytes([first.value(), second.value()]),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> GroupHeader {
        GroupHeader {
            pi: 4660,
            pty: ProgramType::try_from(5).expect("in range"),
            tp: true,
        }
    }

    #[test]
    fn test_golden_block_b_words() {
        // block B words of the reference 0A transmission are
        // 0x04b0..0x04b3, one per segment
        for segment in 0..4u8 {
            let group = encode_group(
                &header(),
                &GroupPayload::BasicTuning {
                    ta: true,
                    ms: MusicSpeech::Speech,
                    di_bit: false,
                    segment,
                    af: None,
                    ps_chars: [b' ', b' '],
                },
            );
            assert_eq!(0x04b0 | segment as u16, group.info_b());
        }
    }

    #[test]
    fn test_round_trip_basic_tuning() {
        let payload = GroupPayload::BasicTuning {
            ta: true,
            ms: MusicSpeech::Speech,
            di_bit: true,
            segment: 2,
            af: Some(AfPair(
                AfCode::try_from(170).expect("valid"),
                AfCode::try_from(105).expect("valid"),
            )),
            ps_chars: [b'i', b'o'],
        };
        let group = encode_group(&header(), &payload);
        let decoded = decode_group(&group).expect("supported");
        assert_eq!(header(), decoded.header);
        assert_eq!(payload, decoded.payload);
    }

    #[test]
    fn test_round_trip_radio_text() {
        let payload = GroupPayload::RadioText {
            ab: true,
            segment: 15,
            chars: *b"tist",
        };
        let group = encode_group(&header(), &payload);
        let decoded = decode_group(&group).expect("supported");
        assert_eq!(payload, decoded.payload);
        // 2A with AB set: type 2 in the top nibble, AB at bit 4
        assert_eq!(0x2000 | (1 << 10) | (5 << 5) | (1 << 4) | 15, group.info_b());
    }

    #[test]
    fn test_zero_block_c_is_no_af() {
        let group = Group::new(4660, 0x04b1, 0x0000, 0x6469);
        match decode_group(&group).expect("supported").payload {
            GroupPayload::BasicTuning { af, segment, .. } => {
                assert_eq!(None, af);
                assert_eq!(1, segment);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_unsupported_types() {
        // 3A: unassigned here
        let group = Group::new(4660, 0x3000, 0, 0);
        assert_eq!(
            Err(GroupError::UnsupportedType {
                type_code: 3,
                version: 'A'
            }),
            decode_group(&group).map(|_| ())
        );

        // 0B: version B of a supported type is still unsupported
        let group = Group::new(4660, 0x0800, 0, 0);
        assert_eq!(
            Err(GroupError::UnsupportedType {
                type_code: 0,
                version: 'B'
            }),
            decode_group(&group).map(|_| ())
        );
    }

    #[test]
    fn test_kind_wire_codes() {
        assert_eq!(0, GroupKind::BasicTuning.type_code());
        assert_eq!(2, GroupKind::RadioText.type_code());
        assert_eq!("0A", GroupKind::BasicTuning.to_string());
        assert_eq!(Ok(GroupKind::RadioText), "2A".parse());
        assert_eq!(4, GroupKind::BasicTuning.segment_count());
        assert_eq!(16, GroupKind::RadioText.segment_count());
    }
}
