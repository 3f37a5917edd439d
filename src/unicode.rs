// unicode.rs - Unicode classification and simple case mapping.
//
// Code points are plain `u32` so that surrogates and values above
// U+10FFFF (possible in 32-bit code-unit strings) classify as nothing
// instead of failing.

use unic_char_property::EnumeratedCharProperty;
use unic_ucd_category::GeneralCategory;

#[inline]
fn as_char(c: u32) -> Option<char> {
    char::from_u32(c)
}

/// Decimal digit (`Nd`).
pub fn is_digit(c: u32) -> bool {
    as_char(c).map_or(false, |ch| {
        GeneralCategory::of(ch) == GeneralCategory::DecimalNumber
    })
}

/// White space, including the information separators U+001C..U+001F.
pub fn is_space(c: u32) -> bool {
    matches!(c, 0x1c..=0x1f) || as_char(c).map_or(false, char::is_whitespace)
}

pub fn is_linebreak(c: u32) -> bool {
    matches!(
        c,
        0x0a | 0x0b | 0x0c | 0x0d | 0x1c | 0x1d | 0x1e | 0x85 | 0x2028 | 0x2029
    )
}

/// Letter or number of any kind.
pub fn is_alnum(c: u32) -> bool {
    as_char(c).map_or(false, |ch| {
        let cat = GeneralCategory::of(ch);
        cat.is_letter() || cat.is_number()
    })
}

pub fn is_word(c: u32) -> bool {
    c == '_' as u32 || is_alnum(c)
}

/// Simple lowercase mapping.
pub fn to_lower(c: u32) -> u32 {
    match as_char(c) {
        // LATIN CAPITAL LETTER I WITH DOT ABOVE, full mapping "i\u{307}"
        Some('\u{130}') => 'i' as u32,
        Some(ch) => single(ch.to_lowercase()).unwrap_or(c),
        None => c,
    }
}

/// Simple uppercase mapping.
///
/// Where the full mapping expands, only the Greek iota-subscript letters have
/// a one-character simple form (they map to the prosgegrammeni titlecase
/// letters). Every other expanding character maps to itself.
pub fn to_upper(c: u32) -> u32 {
    match c {
        0x1f80..=0x1f87 | 0x1f90..=0x1f97 | 0x1fa0..=0x1fa7 => c + 8,
        0x1fb3 | 0x1fc3 | 0x1ff3 => c + 9,
        _ => match as_char(c) {
            Some(ch) => single(ch.to_uppercase()).unwrap_or(c),
            None => c,
        },
    }
}

fn single(mut it: impl Iterator<Item = char>) -> Option<u32> {
    let first = it.next()?;
    match it.next() {
        None => Some(first as u32),
        Some(_) => None,
    }
}

/// Two-letter general category abbreviation (`"Lu"`, `"Nd"`, ...).
pub fn category_abbr(c: u32) -> &'static str {
    match as_char(c) {
        Some(ch) => GeneralCategory::of(ch).abbr_name(),
        None if (0xd800..=0xdfff).contains(&c) => "Cs",
        None => "Cn",
    }
}

/// Test `c` against a general category given as a major letter and an
/// optional minor letter (`0` matches every category of the major class).
pub fn in_general_category(c: u32, major: u8, minor: u8) -> bool {
    let abbr = category_abbr(c).as_bytes();
    abbr[0] == major && (minor == 0 || abbr.get(1) == Some(&minor))
}
