//! The full decode pipeline
//!
//! Wires the synchronizer, assembler, codec, and accumulators into a
//! single pass over a bitstream: bits → blocks → groups → decoded
//! payloads → accumulated fields. All state is call-local, so every
//! decode is an independent pure function of its input; a service
//! decoding many streams concurrently simply makes concurrent calls.
//!
//! Per-block and per-group problems never abort the pass. A failed
//! checkword slides the synchronizer one bit; an unsupported group
//! type or out-of-range segment address drops that group; everything
//! is tallied in [`DecodeStats`] and logged. Only a stream yielding no
//! usable groups at all turns into a hard [`DecodeError`].

#[cfg(not(test))]
use log::{debug, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as warn;

use thiserror::Error;

use crate::accumulator::{Completeness, TextField};
use crate::bits::{BitString, BitStringError};
use crate::codec::{decode_group, DecodedGroup, GroupError, GroupPayload};
use crate::fields::{AfPair, DecoderId, MusicSpeech, ProgramType};
use crate::group::{Group, GroupAssembler};
use crate::sync::BlockSync;

/// Error decoding a bitstream
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The textual bitstream did not parse
    #[error(transparent)]
    Bits(#[from] BitStringError),

    /// No group could be assembled from the stream
    #[error("no complete groups found in the stream")]
    NoGroups,

    /// Groups were assembled, but none of a supported type
    #[error("stream contained {groups} group(s), none of a supported type")]
    Unsupported {
        /// Count of assembled groups
        groups: u64,
    },
}

/// Tallies of what happened during one decode pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Bits read from the input
    pub bits_consumed: u64,
    /// Bits discarded while hunting for block sync
    pub bits_skipped: u64,
    /// Blocks recovered with valid checkwords
    pub blocks_synced: u64,
    /// Synced blocks dropped from incomplete candidate groups
    pub blocks_discarded: u64,
    /// Groups assembled from synced blocks
    pub groups_assembled: u64,
    /// Groups dropped for an unsupported type/version
    pub unsupported_groups: u64,
    /// Groups dropped for a bad segment address
    pub segments_rejected: u64,
}

/// Accumulated type 0A fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TuningFields {
    /// Traffic Announcement flag (latest observation)
    pub ta: bool,
    /// Music/Speech switch (latest observation)
    pub ms: MusicSpeech,
    /// Decoder Identification flags; complete only when `ps` is
    pub di: DecoderId,
    /// Alternate Frequency pair, if any group carried one
    pub af: Option<AfPair>,
    /// Program Service name accumulator
    pub ps: TextField,
}

/// Accumulated type 2A fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadioTextFields {
    /// RadioText A/B flag (latest observation)
    pub ab: bool,
    /// RadioText accumulator
    pub text: TextField,
}

/// Everything recovered from one decode pass
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeOutcome {
    /// Program Identification (latest observation)
    pub pi: u16,
    /// Programme Type (latest observation)
    pub pty: ProgramType,
    /// Traffic Program flag (latest observation)
    pub tp: bool,
    /// Basic tuning fields, if any 0A group decoded
    pub tuning: Option<TuningFields>,
    /// RadioText fields, if any 2A group decoded
    pub radiotext: Option<RadioTextFields>,
    /// Pass tallies
    pub stats: DecodeStats,
}

impl DecodeOutcome {
    /// Overall completeness: every accumulated field fully populated
    ///
    /// Reports `Partial` if the stream ended with any multi-segment
    /// field still missing segments. Callers decide whether partial
    /// output is acceptable; the field buffers themselves never
    /// fabricate missing segments.
    pub fn completeness(&self) -> Completeness {
        let tuning_done = self
            .tuning
            .as_ref()
            .map_or(true, |fields| fields.ps.is_complete());
        let text_done = self
            .radiotext
            .as_ref()
            .map_or(true, |fields| fields.text.is_complete());
        if tuning_done && text_done {
            Completeness::Complete
        } else {
            Completeness::Partial
        }
    }

    /// True iff [`completeness()`](DecodeOutcome::completeness) is `Complete`
    pub fn is_complete(&self) -> bool {
        self.completeness() == Completeness::Complete
    }
}

/// Decode a textual `0`/`1` bitstream
///
/// Convenience wrapper over [`decode_bits`].
///
/// ```
/// use rdsgroup::{decode_str, BasicTuning, FieldSet, pack};
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
/// let bits = pack(&FieldSet::BasicTuning(fields)).to_string();
///
/// let outcome = decode_str(&bits).expect("decodes");
/// assert_eq!(4660, outcome.pi);
/// assert!(outcome.is_complete());
/// assert_eq!("RadioXYZ", outcome.tuning.unwrap().ps.text());
/// ```
pub fn decode_str(bits: &str) -> Result<DecodeOutcome, DecodeError> {
    let bits: BitString = bits.parse()?;
    decode_bits(&bits)
}

/// Decode a bitstream from any source of bits
pub fn decode_bits<I>(bits: I) -> Result<DecodeOutcome, DecodeError>
where
    I: IntoIterator<Item = bool>,
{
    let mut sync = BlockSync::new(bits.into_iter());
    let mut assembler = GroupAssembler::new();
    let mut accumulator = Accumulator::default();
    let mut stats = DecodeStats::default();

    while let Some(synced) = sync.next() {
        stats.blocks_synced += 1;
        for group in assembler.push(synced) {
            accumulator.apply(&group, &mut stats);
        }
    }
    for group in assembler.finish() {
        accumulator.apply(&group, &mut stats);
    }

    stats.bits_consumed = sync.bits_consumed();
    stats.bits_skipped = sync.bits_skipped();
    stats.blocks_discarded = assembler.blocks_discarded();

    accumulator.into_outcome(stats)
}

// Cross-group accumulation state for one pass
#[derive(Debug, Default)]
struct Accumulator {
    header: Option<(u16, ProgramType, bool)>,
    tuning: Option<TuningFields>,
    radiotext: Option<RadioTextFields>,
}

impl Accumulator {
    fn apply(&mut self, group: &Group, stats: &mut DecodeStats) {
        stats.groups_assembled += 1;
        let decoded = match decode_group(group) {
            Ok(decoded) => decoded,
            Err(error @ GroupError::UnsupportedType { .. }) => {
                warn!("decode: skipping group: {}", error);
                stats.unsupported_groups += 1;
                return;
            }
        };
        debug!("decode: {}", decoded);

        self.apply_header(&decoded);
        match decoded.payload {
            GroupPayload::BasicTuning {
                ta,
                ms,
                di_bit,
                segment,
                af,
                ps_chars,
            } => {
                let fields = self.tuning.get_or_insert_with(|| TuningFields {
                    ta,
                    ms,
                    di: DecoderId::default(),
                    af: None,
                    ps: TextField::program_service(),
                });
                fields.ta = ta;
                fields.ms = ms;
                fields.di.set_from_segment(segment, di_bit);
                if af.is_some() {
                    fields.af = af;
                }
                if let Err(error) = fields.ps.write_segment(segment, &ps_chars) {
                    warn!("decode: dropping group: {}", error);
                    stats.segments_rejected += 1;
                }
            }
            GroupPayload::RadioText { ab, segment, chars } => {
                let fields = self.radiotext.get_or_insert_with(|| RadioTextFields {
                    ab,
                    text: TextField::radio_text(),
                });
                if fields.ab != ab {
                    // A/B toggle: the transmitter has started a new
                    // message; partial content from the old one must
                    // not bleed into it
                    debug!("decode: A/B toggle, clearing RadioText buffer");
                    fields.text.reset();
                    fields.ab = ab;
                }
                if let Err(error) = fields.text.write_segment(segment, &chars) {
                    warn!("decode: dropping group: {}", error);
                    stats.segments_rejected += 1;
                }
            }
        }
    }

    fn apply_header(&mut self, decoded: &DecodedGroup) {
        let next = (
            decoded.header.pi,
            decoded.header.pty,
            decoded.header.tp,
        );
        if let Some(previous) = self.header {
            if previous.0 != next.0 {
                warn!(
                    "decode: program identification changed from {} to {}",
                    previous.0, next.0
                );
            }
        }
        self.header = Some(next);
    }

    fn into_outcome(self, stats: DecodeStats) -> Result<DecodeOutcome, DecodeError> {
        match self.header {
            Some((pi, pty, tp)) => Ok(DecodeOutcome {
                pi,
                pty,
                tp,
                tuning: self.tuning,
                radiotext: self.radiotext,
                stats,
            }),
            None if stats.groups_assembled > 0 => Err(DecodeError::Unsupported {
                groups: stats.groups_assembled,
            }),
            None => Err(DecodeError::NoGroups),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fields::{BasicTuning, DecoderId, FieldSet, RadioText, RadioTextMessage};
    use crate::packer::pack;

    fn tuning_fields() -> BasicTuning {
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

    fn text_fields(text: &str, ab: bool) -> RadioTextMessage {
        RadioTextMessage {
            pi: 4660,
            pty: 5.try_into().expect("in range"),
            tp: true,
            ab,
            text: RadioText::new(text).expect("valid"),
        }
    }

    #[test]
    fn test_round_trip_basic_tuning() {
        let bits = pack(&FieldSet::BasicTuning(tuning_fields()));
        let outcome = decode_bits(&bits).expect("decodes");

        assert_eq!(4660, outcome.pi);
        assert_eq!(5, outcome.pty.value());
        assert!(outcome.tp);
        assert!(outcome.is_complete());

        let tuning = outcome.tuning.expect("0A fields");
        assert!(tuning.ta);
        assert_eq!(MusicSpeech::Speech, tuning.ms);
        assert_eq!(0, tuning.di.value());
        assert_eq!("104.5, 98.0", tuning.af.expect("af pair").to_string());
        assert_eq!("RadioXYZ", tuning.ps.text());
        assert!(outcome.radiotext.is_none());
    }

    #[test]
    fn test_round_trip_radio_text() {
        let bits = pack(&FieldSet::RadioText(text_fields(
            "Now Playing Song Title by Artist",
            false,
        )));
        let outcome = decode_bits(&bits).expect("decodes");

        assert!(outcome.is_complete());
        let fields = outcome.radiotext.expect("2A fields");
        assert!(!fields.ab);
        assert_eq!(
            "Now Playing Song Title by Artist",
            fields.text.text().trim_end()
        );
        assert!(outcome.tuning.is_none());
    }

    #[test]
    fn test_truncated_stream_reports_partial() {
        // drop the last group: segment 3 of the PS name never arrives
        let bits = pack(&FieldSet::BasicTuning(tuning_fields())).to_string();
        let outcome = decode_str(&bits[..3 * 104]).expect("decodes");

        assert_eq!(Completeness::Partial, outcome.completeness());
        let tuning = outcome.tuning.expect("0A fields");
        assert_eq!(0b0111, tuning.ps.received_mask());
        assert!(!tuning.ps.segment_received(3));
        assert_eq!("RadioX  ", tuning.ps.text());
    }

    #[test]
    fn test_ab_toggle_discards_accumulated_text() {
        // two messages with opposite A/B flags: the second must not
        // inherit segments from the first. Truncate the second so the
        // discarded first message would be visible if it leaked.
        let first = pack(&FieldSet::RadioText(text_fields("OLD MESSAGE", false)));
        let second = pack(&FieldSet::RadioText(text_fields("NEW", true))).to_string();

        let mut bits = first.to_string();
        bits.push_str(&second[..2 * 104]);

        let outcome = decode_str(&bits).expect("decodes");
        let fields = outcome.radiotext.as_ref().expect("2A fields");
        assert!(fields.ab);
        assert_eq!(0b0011, fields.text.received_mask());
        assert_eq!("NEW", fields.text.text().trim_end());
        assert_eq!(Completeness::Partial, outcome.completeness());
    }

    #[test]
    fn test_latest_segment_wins_across_repeats() {
        // the same transmission looped twice decodes exactly once over
        let mut bits = pack(&FieldSet::BasicTuning(tuning_fields()));
        for bit in pack(&FieldSet::BasicTuning(tuning_fields())).iter() {
            bits.push(bit);
        }
        let outcome = decode_bits(&bits).expect("decodes");
        assert!(outcome.is_complete());
        assert_eq!(8, outcome.stats.groups_assembled);
        assert_eq!("RadioXYZ", outcome.tuning.expect("0A fields").ps.text());
    }

    #[test]
    fn test_rotation_invariance() {
        let reference = pack(&FieldSet::BasicTuning(tuning_fields()));
        let expected = decode_bits(&reference).expect("decodes");

        for rotation in 1..16 {
            let mut rotated = reference.clone();
            rotated.rotate_left(rotation * 26);
            let outcome = decode_bits(&rotated).expect("decodes");
            assert_eq!(expected.pi, outcome.pi);
            assert_eq!(expected.tuning, outcome.tuning, "rotation {}", rotation);
            assert!(outcome.is_complete(), "rotation {}", rotation);
        }
    }

    #[test]
    fn test_unsupported_only_stream_is_an_error() {
        // a valid group of type 3A: synchronizes and assembles, but
        // the codec refuses it
        let mut bits = BitString::new();
        Group::new(4660, 0x3000, 0, 0).write_to(&mut bits);
        assert_eq!(
            Err(DecodeError::Unsupported { groups: 1 }),
            decode_bits(&bits)
        );
    }

    #[test]
    fn test_garbage_stream_is_an_error() {
        assert_eq!(Err(DecodeError::NoGroups), decode_str("010101"));
        assert!(matches!(
            decode_str("01x1"),
            Err(DecodeError::Bits(_))
        ));
    }

    #[test]
    fn test_unsupported_groups_are_counted_not_fatal() {
        // a 3A group in front of a full 0A transmission
        let mut bits = BitString::new();
        Group::new(4660, 0x3000, 0, 0).write_to(&mut bits);
        for bit in pack(&FieldSet::BasicTuning(tuning_fields())).iter() {
            bits.push(bit);
        }

        let outcome = decode_bits(&bits).expect("decodes");
        assert_eq!(1, outcome.stats.unsupported_groups);
        assert_eq!(5, outcome.stats.groups_assembled);
        assert!(outcome.is_complete());
        assert_eq!("RadioXYZ", outcome.tuning.expect("0A fields").ps.text());
    }
}
