//! # rdsgroup: RDS/RBDS Group Encoding and Decoding
//!
//! This crate encodes and decodes
//! [Radio Data System](https://en.wikipedia.org/wiki/Radio_Data_System)
//! (RDS/RBDS) metadata groups of type 0A (basic tuning and switching
//! information) and type 2A (RadioText). It works at the bit level:
//! structured broadcast fields go in, checksum-protected multi-block
//! bitstreams come out, and vice versa.
//!
//! Recovering a transmission does **not** require knowing where it
//! starts. Every 26-bit block carries a CRC-derived checkword that
//! both detects errors and names the block's position within its
//! group, so the decoder synchronizes from the checkwords alone. A
//! stream may begin mid-group, deliver its groups in shuffled order,
//! or permute the blocks inside a group; the decoded fields are the
//! same.
//!
//! ## Example
//!
//! ```
//! use rdsgroup::{decode_str, pack, BasicTuning, FieldSet, MusicSpeech};
//!
//! // the field values are validated once, at construction
//! let fields = BasicTuning {
//!     pi: 4660,
//!     pty: 5.try_into().expect("0-31"),
//!     tp: true,
//!     ta: true,
//!     ms: MusicSpeech::Speech,
//!     di: Default::default(),
//!     af: "104.5,98.0".parse().expect("two frequencies"),
//!     ps: "RadioXYZ".parse().expect("8 characters or fewer"),
//! };
//!
//! // encode: four groups of four blocks, 416 bits
//! let bits = pack(&FieldSet::BasicTuning(fields)).to_string();
//! assert_eq!(416, bits.len());
//!
//! // decode restores the fields and reports completeness
//! let outcome = decode_str(&bits).expect("valid stream");
//! assert_eq!(4660, outcome.pi);
//! assert_eq!(5, outcome.pty.value());
//! assert!(outcome.is_complete());
//!
//! let tuning = outcome.tuning.expect("0A content");
//! assert_eq!("RadioXYZ", tuning.ps.text());
//! assert_eq!("104.5, 98.0", tuning.af.expect("af").to_string());
//! ```
//!
//! ## Pipeline
//!
//! Decoding runs bits through four stages, each usable on its own:
//!
//! 1. [`BlockSync`] scans a raw bitstream for valid blocks, sliding
//!    one bit at a time until a checkword verifies.
//! 2. [`GroupAssembler`] folds synchronized blocks into [`Group`]s,
//!    tolerant of rotation and block reordering.
//! 3. [`decode_group`] interprets a group's payload by its declared
//!    type, through a closed dispatch over the supported types.
//! 4. [`TextField`] accumulates multi-segment fields (Program Service
//!    name, RadioText) across groups, tracking exactly which segments
//!    arrived.
//!
//! Encoding is the inverse: [`pack`] expands a validated [`FieldSet`]
//! into every segment's group and seals each block with its checkword.
//!
//! Partial decodes are reported as partial, and missing segments are
//! never silently padded into data. Per-group problems (bad
//! checkwords, unsupported group types) are tallied in
//! [`DecodeStats`] rather than aborting the stream.

mod accumulator;
mod bits;
mod block;
mod codec;
mod crc;
mod decoder;
mod fields;
mod group;
mod packer;
mod ptycodes;
mod sync;

pub use accumulator::{Completeness, SegmentOutOfRange, TextField};
pub use bits::{BitString, BitStringError};
pub use block::{Block, BlockPosition};
pub use codec::{
    decode_group, encode_group, DecodedGroup, GroupError, GroupHeader, GroupKind, GroupPayload,
};
pub use crc::{checkword, verify, BLOCK_BITS, CHECKWORD_BITS, INFO_BITS};
pub use decoder::{
    decode_bits, decode_str, DecodeError, DecodeOutcome, DecodeStats, RadioTextFields,
    TuningFields,
};
pub use fields::{
    is_allowed_char, AfCode, AfPair, BasicTuning, DecoderId, FieldError, FieldSet, MusicSpeech,
    ProgramService, ProgramType, RadioText, RadioTextMessage, PS_LENGTH, RT_LENGTH,
};
pub use group::{Group, GroupAssembler, GROUP_BITS};
pub use packer::pack;
pub use sync::{BlockSync, SyncedBlock};
