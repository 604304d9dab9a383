//! # Programme Type (PTY) codes
//!
//! The five-bit PTY field names the kind of programming a station
//! carries. This table follows the European RDS assignment (EN 50067),
//! which is the variant the group layouts in this crate come from.
//!
//! | Code | Programme type        |
//! |------|-----------------------|
//! | 0    | None                  |
//! | 1    | News                  |
//! | 2    | Current Affairs       |
//! | 3    | Information           |
//! | 4    | Sport                 |
//! | 5    | Education             |
//! | 6    | Drama                 |
//! | 7    | Culture               |
//! | 8    | Science               |
//! | 9    | Varied                |
//! | 10   | Pop Music             |
//! | 11   | Rock Music            |
//! | 12   | Easy Listening        |
//! | 13   | Light Classical       |
//! | 14   | Serious Classical     |
//! | 15   | Other Music           |
//! | 16   | Weather               |
//! | 17   | Finance               |
//! | 18   | Children's Programmes |
//! | 19   | Social Affairs        |
//! | 20   | Religion              |
//! | 21   | Phone-In              |
//! | 22   | Travel                |
//! | 23   | Leisure               |
//! | 24   | Jazz Music            |
//! | 25   | Country Music         |
//! | 26   | National Music        |
//! | 27   | Oldies Music          |
//! | 28   | Folk Music            |
//! | 29   | Documentary           |
//! | 30   | Alarm Test            |
//! | 31   | Alarm                 |

use phf::phf_map;

static PTY_NAMES: phf::Map<u8, &'static str> = phf_map! {
    0u8 => "None",
    1u8 => "News",
    2u8 => "Current Affairs",
    3u8 => "Information",
    4u8 => "Sport",
    5u8 => "Education",
    6u8 => "Drama",
    7u8 => "Culture",
    8u8 => "Science",
    9u8 => "Varied",
    10u8 => "Pop Music",
    11u8 => "Rock Music",
    12u8 => "Easy Listening",
    13u8 => "Light Classical",
    14u8 => "Serious Classical",
    15u8 => "Other Music",
    16u8 => "Weather",
    17u8 => "Finance",
    18u8 => "Children's Programmes",
    19u8 => "Social Affairs",
    20u8 => "Religion",
    21u8 => "Phone-In",
    22u8 => "Travel",
    23u8 => "Leisure",
    24u8 => "Jazz Music",
    25u8 => "Country Music",
    26u8 => "National Music",
    27u8 => "Oldies Music",
    28u8 => "Folk Music",
    29u8 => "Documentary",
    30u8 => "Alarm Test",
    31u8 => "Alarm",
};

/// Programme-type display name for a 5-bit code
///
/// Codes above 31 have no assignment and return "Unknown"; the
/// [`ProgramType`](crate::ProgramType) newtype prevents them from
/// appearing in practice.
pub(crate) fn name(code: u8) -> &'static str {
    PTY_NAMES.get(&code).copied().unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_codes_named() {
        for code in 0..=31u8 {
            assert_ne!("Unknown", name(code));
        }
        assert_eq!("Unknown", name(32));
    }

    #[test]
    fn test_spot_checks() {
        assert_eq!("None", name(0));
        assert_eq!("Education", name(5));
        assert_eq!("Alarm", name(31));
    }
}
