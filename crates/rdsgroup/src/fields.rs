//! Typed broadcast field vocabulary
//!
//! Encode-side field values are validated once, at construction, and
//! are structurally valid from then on: a [`ProgramType`] always fits
//! five bits, an [`AfCode`] always names a real carrier frequency, a
//! [`ProgramService`] is always exactly eight permitted characters.
//! The codec and packer therefore never re-check value domains, only
//! structure. Malformed *input text* fails here, long before it can
//! be confused with a malformed *bitstream*.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::ptycodes;

/// Length of a Program Service name, in characters
pub const PS_LENGTH: usize = 8;

/// Length of a RadioText message buffer, in characters
pub const RT_LENGTH: usize = 64;

lazy_static! {
    // frequency literals look like "87.6" or "104.5"
    static ref FREQUENCY_RE: Regex = Regex::new(r"^\d{2,3}\.\d$").expect("static regex");
}

/// Error constructing a broadcast field value
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// Text exceeds the field's fixed width
    #[error("text is {len} characters; the limit for this field is {limit}")]
    TooLong {
        /// Characters supplied
        len: usize,
        /// Characters permitted
        limit: usize,
    },

    /// Text contains a character outside `[A-Za-z0-9 ]`
    #[error("character {found:?} is not permitted; fields accept only letters, digits, and spaces")]
    DisallowedCharacter {
        /// The offending character
        found: char,
    },

    /// Programme type code exceeds five bits
    #[error("programme type {0} exceeds the maximum of 31")]
    ProgramTypeRange(u8),

    /// Programme type text was not an unsigned integer
    #[error("{0:?} is not a programme type number")]
    ProgramTypeFormat(String),

    /// Alternate frequency code outside the carried band
    #[error("alternate frequency code {0} is outside 1..=204 (87.6 MHz to 107.9 MHz)")]
    FrequencyRange(i32),

    /// Frequency text did not match the `"dd.d"` literal form
    #[error("{0:?} is not a frequency literal like \"104.5\"")]
    FrequencyFormat(String),

    /// An AF argument did not contain exactly two frequencies
    #[error("expected exactly two comma-separated frequencies, found {0}")]
    FrequencyCount(usize),
}

/// True for the characters permitted in PS and RT fields
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' '
}

// Validate charset and pad to `limit` with trailing spaces
fn validated_padded(text: &str, limit: usize) -> Result<String, FieldError> {
    if text.len() > limit {
        return Err(FieldError::TooLong {
            len: text.len(),
            limit,
        });
    }
    if let Some(found) = text.chars().find(|&c| !is_allowed_char(c)) {
        return Err(FieldError::DisallowedCharacter { found });
    }

    let mut out = String::with_capacity(limit);
    out.push_str(text);
    while out.len() < limit {
        out.push(' ');
    }
    Ok(out)
}

/// Five-bit Programme Type code
///
/// ```
/// use rdsgroup::ProgramType;
///
/// let pty = ProgramType::try_from(5).expect("in range");
/// assert_eq!(5, pty.value());
/// assert_eq!("Education", pty.name());
/// assert!(ProgramType::try_from(32).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProgramType(u8);

impl ProgramType {
    /// The raw 0–31 code
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Assigned programme-type name, like "`Education`"
    pub fn name(&self) -> &'static str {
        ptycodes::name(self.0)
    }

    // Wire values are masked to five bits and cannot be out of range
    pub(crate) fn from_wire(bits: u8) -> Self {
        Self(bits & 0x1f)
    }
}

impl TryFrom<u8> for ProgramType {
    type Error = FieldError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 31 {
            Err(FieldError::ProgramTypeRange(value))
        } else {
            Ok(Self(value))
        }
    }
}

impl FromStr for ProgramType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .parse()
            .map_err(|_| FieldError::ProgramTypeFormat(s.to_owned()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Eight-bit Alternate Frequency code
///
/// Codes 1 through 204 map linearly onto 87.6 MHz through 107.9 MHz in
/// 0.1 MHz steps. Code 0 ("not used") and codes 205 and up (fillers
/// and escapes) are not carried by this codec and are rejected.
///
/// ```
/// use rdsgroup::AfCode;
///
/// let af: AfCode = "104.5".parse().expect("valid literal");
/// assert_eq!(170, af.value());
/// assert_eq!("104.5", af.to_string());
///
/// assert!(AfCode::try_from(0).is_err());
/// assert!(AfCode::try_from(205).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AfCode(u8);

impl AfCode {
    /// Lowest valid code (87.6 MHz)
    pub const MIN: u8 = 1;

    /// Highest valid code (107.9 MHz)
    pub const MAX: u8 = 204;

    /// The raw 1–204 code
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Carrier frequency in MHz
    pub fn mhz(&self) -> f32 {
        (self.0 as f32 + 875.0) / 10.0
    }

    /// Quantize a frequency in MHz to its code
    pub fn from_mhz(mhz: f32) -> Result<Self, FieldError> {
        let tenths = (mhz * 10.0).round() as i32;
        Self::from_tenths(tenths)
    }

    // `tenths` is the frequency with the decimal point removed: 1045
    // for 104.5 MHz
    fn from_tenths(tenths: i32) -> Result<Self, FieldError> {
        let code = tenths - 875;
        if (Self::MIN as i32..=Self::MAX as i32).contains(&code) {
            Ok(Self(code as u8))
        } else {
            Err(FieldError::FrequencyRange(code))
        }
    }
}

impl TryFrom<u8> for AfCode {
    type Error = FieldError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FieldError::FrequencyRange(value as i32))
        }
    }
}

impl FromStr for AfCode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !FREQUENCY_RE.is_match(s) {
            return Err(FieldError::FrequencyFormat(s.to_owned()));
        }
        let digits: String = s.chars().filter(|c| *c != '.').collect();
        let tenths: i32 = digits
            .parse()
            .map_err(|_| FieldError::FrequencyFormat(s.to_owned()))?;
        Self::from_tenths(tenths)
    }
}

impl fmt::Display for AfCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.mhz())
    }
}

/// An Alternate Frequency pair, as carried in one type 0A group
///
/// ```
/// use rdsgroup::AfPair;
///
/// let pair: AfPair = "104.5,98.0".parse().expect("two literals");
/// assert_eq!("104.5, 98.0", pair.to_string());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AfPair(pub AfCode, pub AfCode);

impl FromStr for AfPair {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(FieldError::FrequencyCount(parts.len()));
        }
        Ok(Self(parts[0].parse()?, parts[1].parse()?))
    }
}

impl fmt::Display for AfPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.0, self.1)
    }
}

/// Music/Speech switch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum MusicSpeech {
    /// Speech programming (wire bit 0)
    #[default]
    Speech,
    /// Music programming (wire bit 1)
    Music,
}

impl MusicSpeech {
    /// The wire bit: 1 for music, 0 for speech
    pub fn bit(&self) -> bool {
        matches!(self, MusicSpeech::Music)
    }

    /// Build from the wire bit
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            MusicSpeech::Music
        } else {
            MusicSpeech::Speech
        }
    }
}

/// Decoder Identification flags d3..d0
///
/// Each type 0A group carries a single DI bit; the flag it belongs to
/// is selected by the group's segment address. The bit sent with
/// segment address `s` is flag `d(3 − s)`, so a complete flag set
/// needs all four segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DecoderId {
    // low nibble, d0 at bit 0
    bits: u8,
}

impl DecoderId {
    /// Build from the four flags, most significant (d3) first
    pub fn new(d3: bool, d2: bool, d1: bool, d0: bool) -> Self {
        Self {
            bits: (d3 as u8) << 3 | (d2 as u8) << 2 | (d1 as u8) << 1 | d0 as u8,
        }
    }

    /// Read flag `d{index}`; `index` must be 0–3
    pub fn flag(&self, index: u8) -> bool {
        self.bits & (1 << (index & 3)) != 0
    }

    /// The four flags as a nibble, d3 most significant
    pub fn value(&self) -> u8 {
        self.bits
    }

    /// The DI bit transmitted with segment address `segment`
    pub fn bit_for_segment(&self, segment: u8) -> bool {
        self.flag(3 - (segment & 3))
    }

    /// Record a received DI bit for segment address `segment`
    pub fn set_from_segment(&mut self, segment: u8, bit: bool) {
        let index = 3 - (segment & 3);
        if bit {
            self.bits |= 1 << index;
        } else {
            self.bits &= !(1 << index);
        }
    }
}

impl fmt::Display for DecoderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bits.fmt(f)
    }
}

/// A validated Program Service name: exactly eight characters
///
/// ```
/// use rdsgroup::ProgramService;
///
/// let ps: ProgramService = "Radio".parse().expect("valid");
/// assert_eq!("Radio   ", ps.as_str());
/// assert!("TooLongName".parse::<ProgramService>().is_err());
/// assert!("Ab!".parse::<ProgramService>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramService(String);

impl ProgramService {
    /// Validate and space-pad a name of up to eight characters
    pub fn new(text: &str) -> Result<Self, FieldError> {
        Ok(Self(validated_padded(text, PS_LENGTH)?))
    }

    /// The padded eight-character name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The padded name as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for ProgramService {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ProgramService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated RadioText message: exactly 64 characters after padding
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RadioText(String);

impl RadioText {
    /// Validate and space-pad a message of up to 64 characters
    pub fn new(text: &str) -> Result<Self, FieldError> {
        Ok(Self(validated_padded(text, RT_LENGTH)?))
    }

    /// The padded 64-character message
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The padded message as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for RadioText {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for RadioText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Encode-side field set for a type 0A transmission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicTuning {
    /// Program Identification
    pub pi: u16,
    /// Programme Type
    pub pty: ProgramType,
    /// Traffic Program flag
    pub tp: bool,
    /// Traffic Announcement flag
    pub ta: bool,
    /// Music/Speech switch
    pub ms: MusicSpeech,
    /// Decoder Identification flags
    pub di: DecoderId,
    /// Alternate Frequency pair
    pub af: AfPair,
    /// Program Service name
    pub ps: ProgramService,
}

/// Encode-side field set for a type 2A transmission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadioTextMessage {
    /// Program Identification
    pub pi: u16,
    /// Programme Type
    pub pty: ProgramType,
    /// Traffic Program flag
    pub tp: bool,
    /// RadioText A/B flag
    pub ab: bool,
    /// The message text
    pub text: RadioText,
}

/// A complete, validated field set ready for the frame packer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSet {
    /// Basic tuning and switching information (type 0A)
    BasicTuning(BasicTuning),
    /// RadioText (type 2A)
    RadioText(RadioTextMessage),
}
