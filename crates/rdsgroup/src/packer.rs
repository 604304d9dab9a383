//! Encode-side frame packing
//!
//! The packer expands a validated [`FieldSet`] into the full ordered
//! sequence of groups and seals them into a bitstream. A type 0A field
//! set always becomes exactly four groups, one per segment address;
//! the Alternate Frequency pair rides in segment 0 with an all-zero
//! block C in the rest. A type 2A field set always becomes all sixteen
//! segments of the space-padded 64-character buffer, so a receiver
//! that accumulates every segment sees the message boundary even when
//! the text is short or empty.

use crate::bits::BitString;
use crate::codec::{encode_group, GroupHeader, GroupPayload};
use crate::fields::{BasicTuning, FieldSet, RadioTextMessage};
use crate::group::GROUP_BITS;

/// Expand a field set into its complete transmission bitstream
///
/// ```
/// use rdsgroup::{BasicTuning, FieldSet, pack};
///
/// let fields = BasicTuning {
///     pi: 4660,
///     pty: 5.try_into().unwrap(),
///     tp: true,
///     ta: true,
///     ms: Default::default(),
///     di: Default::default(),
///     af: "104.5,98.0".parse().unwrap(),
///     ps: "RadioXYZ".parse().unwrap(),
/// };
/// let bits = pack(&FieldSet::BasicTuning(fields));
/// assert_eq!(4 * 104, bits.len());
/// ```
pub fn pack(fields: &FieldSet) -> BitString {
    match fields {
        FieldSet::BasicTuning(tuning) => pack_basic_tuning(tuning),
        FieldSet::RadioText(message) => pack_radio_text(message),
    }
}

fn pack_basic_tuning(tuning: &BasicTuning) -> BitString {
    let header = GroupHeader {
        pi: tuning.pi,
        pty: tuning.pty,
        tp: tuning.tp,
    };
    let ps = tuning.ps.as_bytes();

    let mut out = BitString::with_capacity(4 * GROUP_BITS);
    for segment in 0..4u8 {
        let start = segment as usize * 2;
        let payload = GroupPayload::BasicTuning {
            ta: tuning.ta,
            ms: tuning.ms,
            di_bit: tuning.di.bit_for_segment(segment),
            segment,
            af: (segment == 0).then_some(tuning.af),
            ps_chars: [ps[start], ps[start + 1]],
        };
        encode_group(&header, &payload).write_to(&mut out);
    }
    out
}

fn pack_radio_text(message: &RadioTextMessage) -> BitString {
    let header = GroupHeader {
        pi: message.pi,
        pty: message.pty,
        tp: message.tp,
    };
    let text = message.text.as_bytes();

    let mut out = BitString::with_capacity(16 * GROUP_BITS);
    for segment in 0..16u8 {
        let start = segment as usize * 4;
        let payload = GroupPayload::RadioText {
            ab: message.ab,
            segment,
            chars: [text[start], text[start + 1], text[start + 2], text[start + 3]],
        };
        encode_group(&header, &payload).write_to(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fields::{DecoderId, MusicSpeech, RadioText};

    fn tuning() -> BasicTuning {
        BasicTuning {
            pi: 4660,
            pty: 5.try_into().expect("in range"),
            tp: true,
            ta: true,
            ms: MusicSpeech::Speech,
            di: DecoderId::default(),
            af: "104.5,98.0".parse().expect("valid"),
            ps: "RadioXYZ".parse().expect("valid"),
        }
    }

    #[test]
    fn test_basic_tuning_group_count() {
        let bits = pack(&FieldSet::BasicTuning(tuning()));
        assert_eq!(4 * GROUP_BITS, bits.len());
    }

    #[test]
    fn test_radio_text_always_fills_sixteen_groups() {
        let message = RadioTextMessage {
            pi: 4660,
            pty: 5.try_into().expect("in range"),
            tp: true,
            ab: false,
            text: RadioText::new("").expect("empty is valid"),
        };
        let bits = pack(&FieldSet::RadioText(message));
        assert_eq!(16 * GROUP_BITS, bits.len());
    }

    #[test]
    fn test_af_rides_in_segment_zero_only() {
        use crate::block::Block;
        use crate::crc::BLOCK_BITS;

        let bits = pack(&FieldSet::BasicTuning(tuning())).to_string();
        for segment in 0..4usize {
            let c_start = (segment * 4 + 2) * BLOCK_BITS;
            let word =
                u32::from_str_radix(&bits[c_start..c_start + BLOCK_BITS], 2).expect("binary");
            let block = Block::from_word(word).expect("sealed");
            if segment == 0 {
                assert_eq!(0xaa69, block.info);
            } else {
                assert_eq!(0, block.info);
            }
        }
    }
}
