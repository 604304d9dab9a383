//! Cross-group segment accumulation
//!
//! Fields larger than one group (the eight-character Program Service
//! name, the 64-character RadioText) arrive as numbered segments
//! spread over many groups, in whatever order the stream delivers
//! them. [`TextField`] is the accumulation buffer: a fixed byte array
//! plus a bitmask of the segments actually received. The mask is the
//! ground truth for completeness; unreceived spans render as spaces
//! but are never reported as received, so missing data can always be
//! told apart from genuine space padding.

use std::fmt;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::fields::RT_LENGTH;

/// Accumulation progress of a multi-segment field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Completeness {
    /// Every segment has been received at least once
    Complete,

    /// At least one segment is still outstanding
    Partial,
}

/// A segment address beyond the field's segment count
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("segment address {segment} is out of range for a field of {limit} segments")]
pub struct SegmentOutOfRange {
    /// The offending address
    pub segment: u8,
    /// The field's segment count
    pub limit: u8,
}

/// Fixed-width text assembled from numbered segments
///
/// ```
/// use rdsgroup::{Completeness, TextField};
///
/// let mut ps = TextField::program_service();
/// ps.write_segment(0, b"Ra").unwrap();
/// ps.write_segment(1, b"di").unwrap();
/// assert_eq!(Completeness::Partial, ps.completeness());
/// assert!(ps.segment_received(1));
/// assert!(!ps.segment_received(2));
///
/// ps.write_segment(2, b"oX").unwrap();
/// ps.write_segment(3, b"YZ").unwrap();
/// assert_eq!(Completeness::Complete, ps.completeness());
/// assert_eq!("RadioXYZ", ps.text());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextField {
    buf: ArrayVec<u8, RT_LENGTH>,
    mask: u16,
    segments: u8,
    segment_len: u8,
}

impl TextField {
    /// Buffer for a Program Service name: four segments of two bytes
    pub fn program_service() -> Self {
        Self::new(4, 2)
    }

    /// Buffer for a RadioText message: sixteen segments of four bytes
    pub fn radio_text() -> Self {
        Self::new(16, 4)
    }

    fn new(segments: u8, segment_len: u8) -> Self {
        let mut buf = ArrayVec::new();
        for _ in 0..(segments as usize * segment_len as usize) {
            buf.push(b' ');
        }
        Self {
            buf,
            mask: 0,
            segments,
            segment_len,
        }
    }

    /// Number of segments this field spans
    pub fn segment_count(&self) -> u8 {
        self.segments
    }

    /// Store one segment's characters, latest observation winning
    ///
    /// `chars` must hold exactly one segment's worth of bytes; the
    /// address is checked against the field's segment count.
    pub fn write_segment(&mut self, segment: u8, chars: &[u8]) -> Result<(), SegmentOutOfRange> {
        if segment >= self.segments || chars.len() != self.segment_len as usize {
            return Err(SegmentOutOfRange {
                segment,
                limit: self.segments,
            });
        }
        let start = segment as usize * self.segment_len as usize;
        self.buf[start..start + chars.len()].copy_from_slice(chars);
        self.mask |= 1 << segment;
        Ok(())
    }

    /// Discard all accumulated content and marks
    ///
    /// Used when a RadioText A/B toggle announces that the transmitter
    /// has started a new message.
    pub fn reset(&mut self) {
        self.buf.iter_mut().for_each(|byte| *byte = b' ');
        self.mask = 0;
    }

    /// True once `segment` has been received at least once
    pub fn segment_received(&self, segment: u8) -> bool {
        self.mask & (1 << segment) != 0
    }

    /// Bitmask of received segments, segment 0 in the low bit
    pub fn received_mask(&self) -> u16 {
        self.mask
    }

    /// Whether every segment has been observed
    pub fn completeness(&self) -> Completeness {
        if self.mask == ((1u32 << self.segments) - 1) as u16 {
            Completeness::Complete
        } else {
            Completeness::Partial
        }
    }

    /// True iff [`completeness()`](TextField::completeness) is `Complete`
    pub fn is_complete(&self) -> bool {
        self.completeness() == Completeness::Complete
    }

    /// The raw buffer, spaces where nothing has been received
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The buffer as text
    ///
    /// Wire bytes are not charset-checked on decode, so this is lossy
    /// for hostile input; permitted characters pass through verbatim.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
