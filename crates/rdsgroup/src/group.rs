//! Groups and group assembly
//!
//! Four blocks sharing one Program Identification value make a
//! [`Group`]. The [`GroupAssembler`] folds the synchronizer's block
//! stream into groups. Because the checkword already fixes every
//! block's logical position, assembly cannot lean on the canonical
//! A-B-C-D arrival order: observed streams deliver whole groups in
//! shuffled segment order, permute blocks inside a group, and rotate
//! the stream so a group straddles both ends.
//!
//! The assembler therefore holds a small window of recent blocks and
//! emits groups by two rules:
//!
//! 1. **Adjacent**: a B block trailed immediately (by bit offset) by
//!    its C and D blocks, with any A available for PI. This is the
//!    transmission order, and it pairs payload blocks with the B that
//!    names their segment even when the stream starts mid-group.
//!
//! 2. **Windowed**: when the window overflows or the stream ends, the
//!    four oldest blocks form a group if they cover all four slots in
//!    any order. This is what decodes block-permuted vectors, and it
//!    lets the leading orphan blocks of a rotated stream pair up with
//!    their own B once the rotation wraps around.
//!
//! A window that fills without yielding either kind sheds its oldest
//! block and assembly carries on; a bad span never aborts the stream.

use arraydeque::ArrayDeque;
use arrayvec::ArrayVec;

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::bits::BitString;
use crate::block::{Block, BlockPosition};
use crate::crc::BLOCK_BITS;
use crate::sync::SyncedBlock;

/// Bits in a sealed four-block group
pub const GROUP_BITS: usize = 4 * BLOCK_BITS;

// Window capacity: two groups' worth of blocks
const WINDOW_CAP: usize = 8;

/// Four blocks in canonical order, sharing one PI value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    pi: u16,
    info_b: u16,
    info_c: u16,
    info_d: u16,
    // position sealed over the third block: C, or C′ for version B
    c_position: BlockPosition,
}

impl Group {
    /// Assemble a version-A group from its information words
    pub fn new(pi: u16, info_b: u16, info_c: u16, info_d: u16) -> Self {
        Self {
            pi,
            info_b,
            info_c,
            info_d,
            c_position: BlockPosition::C,
        }
    }

    /// Program Identification, from block A
    pub fn pi(&self) -> u16 {
        self.pi
    }

    /// Block B information word
    pub fn info_b(&self) -> u16 {
        self.info_b
    }

    /// Block C information word
    pub fn info_c(&self) -> u16 {
        self.info_c
    }

    /// Block D information word
    pub fn info_d(&self) -> u16 {
        self.info_d
    }

    /// Whether the third block was sealed under C or C′
    pub fn c_position(&self) -> BlockPosition {
        self.c_position
    }

    /// The group's blocks in canonical transmission order
    pub fn blocks(&self) -> [Block; 4] {
        [
            Block {
                position: BlockPosition::A,
                info: self.pi,
            },
            Block {
                position: BlockPosition::B,
                info: self.info_b,
            },
            Block {
                position: self.c_position,
                info: self.info_c,
            },
            Block {
                position: BlockPosition::D,
                info: self.info_d,
            },
        ]
    }

    /// Seal all four blocks and append them to `out`
    pub fn write_to(&self, out: &mut BitString) {
        for block in self.blocks() {
            out.push_word(block.seal(), BLOCK_BITS);
        }
    }

    // Build from one block per slot, however they arrived
    fn from_slots(slots: [SyncedBlock; 4]) -> Self {
        Self {
            pi: slots[0].block.info,
            info_b: slots[1].block.info,
            info_c: slots[2].block.info,
            info_d: slots[3].block.info,
            c_position: slots[2].block.position,
        }
    }
}

/// Folds a stream of synchronized blocks into groups
///
/// Push blocks as the synchronizer yields them; call
/// [`finish()`](GroupAssembler::finish) once the stream ends to drain
/// groups still held in the window.
///
/// ```
/// use rdsgroup::{Block, BlockPosition, GroupAssembler, SyncedBlock};
///
/// let mut assembler = GroupAssembler::new();
/// let mut groups = Vec::new();
/// let stream = [
///     (BlockPosition::A, 0x1234),
///     (BlockPosition::B, 0x04b0),
///     (BlockPosition::C, 0xaa69),
///     (BlockPosition::D, 0x5261),
/// ];
/// for (index, (position, info)) in stream.into_iter().enumerate() {
///     groups.extend(assembler.push(SyncedBlock {
///         block: Block { position, info },
///         bit_offset: 26 * index as u64,
///     }));
/// }
/// groups.extend(assembler.finish());
///
/// assert_eq!(1, groups.len());
/// assert_eq!(0x1234, groups[0].pi());
/// ```
#[derive(Clone, Debug, Default)]
pub struct GroupAssembler {
    window: ArrayDeque<SyncedBlock, WINDOW_CAP>,
    discarded: u64,
}

impl GroupAssembler {
    /// New assembler with an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of blocks dropped from incomplete candidate groups
    pub fn blocks_discarded(&self) -> u64 {
        self.discarded
    }

    /// Offer the next synchronized block
    ///
    /// Returns zero, one, or two completed groups: clearing window
    /// pressure can complete an older windowed group in the same call
    /// that the new block completes an adjacent one.
    pub fn push(&mut self, synced: SyncedBlock) -> ArrayVec<Group, 2> {
        let mut out = ArrayVec::new();
        if self.window.is_full() {
            if let Some(group) = self.make_room() {
                out.push(group);
            }
        }

        // room is guaranteed: make_room always frees at least one slot
        let _ = self.window.push_back(synced);

        if let Some(group) = self.take_adjacent() {
            out.push(group);
        }
        out
    }

    /// Drain groups still held in the window at end of stream
    pub fn finish(&mut self) -> ArrayVec<Group, 2> {
        let mut out = ArrayVec::new();
        while self.window.len() >= 4 && !out.is_full() {
            if let Some(group) = self.take_adjacent().or_else(|| self.take_windowed()) {
                out.push(group);
            } else if let Some(dropped) = self.window.pop_front() {
                self.discarded += 1;
                debug!("assembler: end of stream, dropping {}", dropped.block);
            }
        }
        self.discarded += self.window.len() as u64;
        self.window.clear();
        out
    }

    // Free at least one window slot, preferably by emitting a group
    fn make_room(&mut self) -> Option<Group> {
        if let Some(group) = self.take_adjacent().or_else(|| self.take_windowed()) {
            return Some(group);
        }
        if let Some(dropped) = self.window.pop_front() {
            self.discarded += 1;
            debug!("assembler: no group forming, dropping {}", dropped.block);
        }
        None
    }

    // Rule 1: a B followed contiguously by C and D, plus any A
    fn take_adjacent(&mut self) -> Option<Group> {
        let blocks: ArrayVec<SyncedBlock, WINDOW_CAP> = self.window.iter().copied().collect();

        // the most recent A; every group in a stream shares one PI, so
        // a borrowed A only ever contributes the right value
        let (a_index, a) = blocks
            .iter()
            .enumerate()
            .rev()
            .find(|(_, held)| held.block.position == BlockPosition::A)?;

        for (b_index, b) in blocks
            .iter()
            .enumerate()
            .filter(|(_, held)| held.block.position == BlockPosition::B)
        {
            let c = blocks.iter().enumerate().find(|(_, held)| {
                held.block.position.slot() == 2
                    && held.bit_offset == b.bit_offset + BLOCK_BITS as u64
            });
            let d = blocks.iter().enumerate().find(|(_, held)| {
                held.block.position == BlockPosition::D
                    && held.bit_offset == b.bit_offset + 2 * BLOCK_BITS as u64
            });
            if let (Some((c_index, c)), Some((d_index, d))) = (c, d) {
                let group = Group::from_slots([*a, *b, *c, *d]);
                self.remove_indices([a_index, b_index, c_index, d_index]);
                return Some(group);
            }
        }
        None
    }

    // Rule 2: the four oldest blocks cover all four slots
    fn take_windowed(&mut self) -> Option<Group> {
        if self.window.len() < 4 {
            return None;
        }
        let mut slots: [Option<SyncedBlock>; 4] = [None; 4];
        for held in self.window.iter().take(4) {
            if slots[held.block.position.slot()].is_some() {
                return None;
            }
            slots[held.block.position.slot()] = Some(*held);
        }
        match slots {
            [Some(a), Some(b), Some(c), Some(d)] => {
                for _ in 0..4 {
                    self.window.pop_front();
                }
                Some(Group::from_slots([a, b, c, d]))
            }
            _ => None,
        }
    }

    fn remove_indices(&mut self, indices: [usize; 4]) {
        let kept: ArrayVec<SyncedBlock, WINDOW_CAP> = self
            .window
            .iter()
            .enumerate()
            .filter(|(index, _)| !indices.contains(index))
            .map(|(_, held)| *held)
            .collect();
        self.window.clear();
        for held in kept {
            let _ = self.window.push_back(held);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced(position: BlockPosition, info: u16, block_index: u64) -> SyncedBlock {
        SyncedBlock {
            block: Block { position, info },
            bit_offset: block_index * BLOCK_BITS as u64,
        }
    }

    fn run(stream: &[(BlockPosition, u16)]) -> (Vec<Group>, u64) {
        let mut assembler = GroupAssembler::new();
        let mut groups = Vec::new();
        for (index, &(position, info)) in stream.iter().enumerate() {
            groups.extend(assembler.push(synced(position, info, index as u64)));
        }
        groups.extend(assembler.finish());
        (groups, assembler.blocks_discarded())
    }

    #[test]
    fn test_canonical_order() {
        let (groups, discarded) = run(&[
            (BlockPosition::A, 0x1234),
            (BlockPosition::B, 0x04b0),
            (BlockPosition::C, 0xaa69),
            (BlockPosition::D, 0x5261),
        ]);
        assert_eq!(1, groups.len());
        assert_eq!(0x1234, groups[0].pi());
        assert_eq!(0x04b0, groups[0].info_b());
        assert_eq!(0xaa69, groups[0].info_c());
        assert_eq!(0x5261, groups[0].info_d());
        assert_eq!(0, discarded);
    }

    #[test]
    fn test_permuted_group() {
        // a whole group delivered as D, C, B, A must still assemble
        let (groups, _) = run(&[
            (BlockPosition::D, 0x5261),
            (BlockPosition::C, 0xaa69),
            (BlockPosition::B, 0x04b0),
            (BlockPosition::A, 0x1234),
        ]);
        assert_eq!(1, groups.len());
        assert_eq!(0x1234, groups[0].pi());
        assert_eq!(0xaa69, groups[0].info_c());
        assert_eq!(0x5261, groups[0].info_d());
    }

    #[test]
    fn test_rotated_stream_pairs_payload_with_its_own_b() {
        // rotation by two blocks: C0 D0 | A B1 C1 D1 | A B0. The
        // leading C0, D0 must wait for the trailing B0 instead of being
        // claimed by B1
        let (groups, _) = run(&[
            (BlockPosition::C, 0xcc00),
            (BlockPosition::D, 0xdd00),
            (BlockPosition::A, 0x1234),
            (BlockPosition::B, 0x04b1),
            (BlockPosition::C, 0xcc11),
            (BlockPosition::D, 0xdd11),
            (BlockPosition::A, 0x1234),
            (BlockPosition::B, 0x04b0),
        ]);
        assert_eq!(2, groups.len());
        assert_eq!(0x04b1, groups[0].info_b());
        assert_eq!(0xcc11, groups[0].info_c());
        assert_eq!(0xdd11, groups[0].info_d());
        assert_eq!(0x04b0, groups[1].info_b());
        assert_eq!(0xcc00, groups[1].info_c());
        assert_eq!(0xdd00, groups[1].info_d());
    }

    #[test]
    fn test_c_prime_fills_the_c_slot() {
        let (groups, _) = run(&[
            (BlockPosition::A, 0x1234),
            (BlockPosition::B, 0x0800),
            (BlockPosition::CPrime, 0x1234),
            (BlockPosition::D, 0x0000),
        ]);
        assert_eq!(1, groups.len());
        assert_eq!(BlockPosition::CPrime, groups[0].c_position());
    }

    #[test]
    fn test_incomplete_window_is_discarded() {
        // two orphan blocks never form a group and are counted
        let (groups, discarded) = run(&[(BlockPosition::A, 0x1234), (BlockPosition::B, 0x04b0)]);
        assert!(groups.is_empty());
        assert_eq!(2, discarded);
    }

    #[test]
    fn test_write_to_round_trips_through_blocks() {
        let group = Group::new(0x1234, 0x04b0, 0xaa69, 0x5261);
        let mut bits = BitString::new();
        group.write_to(&mut bits);
        assert_eq!(GROUP_BITS, bits.len());

        let blocks = group.blocks();
        assert_eq!(BlockPosition::A, blocks[0].position);
        assert_eq!(Some(blocks[0]), Block::from_word(blocks[0].seal()));
    }
}
