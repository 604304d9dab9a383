//! Block positions and sealed-block conversions

use std::fmt;

use strum::IntoEnumIterator;

use crate::crc;

/// Logical position of a block within a group
///
/// The checkword offset constants let a receiver identify a block's
/// position without any out-of-band alignment. Version B groups repeat
/// the PI word in their third block under the alternate offset `C′`.
///
/// ```
/// use rdsgroup::BlockPosition;
///
/// assert_eq!("C'", format!("{}", BlockPosition::CPrime));
/// assert_eq!(Some(BlockPosition::B), BlockPosition::from_offset_word(408));
/// assert_eq!(None, BlockPosition::from_offset_word(0));
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter,
)]
pub enum BlockPosition {
    A,
    B,
    C,
    #[strum(serialize = "C'")]
    CPrime,
    D,
}

impl BlockPosition {
    /// The 10-bit offset word for this position
    pub fn offset_word(&self) -> u16 {
        match self {
            BlockPosition::A => 252,
            BlockPosition::B => 408,
            BlockPosition::C => 360,
            BlockPosition::CPrime => 848,
            BlockPosition::D => 436,
        }
    }

    /// Look up the position whose offset word matches `word`
    pub fn from_offset_word(word: u16) -> Option<Self> {
        BlockPosition::iter().find(|position| position.offset_word() == word)
    }

    // Canonical slot within a group: C and C′ share the third slot
    pub(crate) fn slot(&self) -> usize {
        match self {
            BlockPosition::A => 0,
            BlockPosition::B => 1,
            BlockPosition::C | BlockPosition::CPrime => 2,
            BlockPosition::D => 3,
        }
    }
}

/// A single RDS block: an information word at a known position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// Logical position, fixed by the checkword offset
    pub position: BlockPosition,

    /// The 16-bit information word
    pub info: u16,
}

impl Block {
    /// Seal this block into its 26-bit wire form
    ///
    /// Appends the 10-bit checkword for the block's position.
    pub fn seal(&self) -> u32 {
        ((self.info as u32) << crc::CHECKWORD_BITS)
            | (crc::checkword(self.info) ^ self.position.offset_word()) as u32
    }

    /// Recover a block from a candidate 26-bit word
    ///
    /// Returns `None` unless the trailing ten bits form a valid
    /// checkword under one of the five known offset words. A `None`
    /// here is the `ChecksumMismatch` case: the caller slides on.
    pub fn from_word(word: u32) -> Option<Block> {
        let position = BlockPosition::from_offset_word(crc::syndrome(word))?;
        Some(Block {
            position,
            info: (word >> crc::CHECKWORD_BITS) as u16,
        })
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:04x}", self.position, self.info)
    }
}
