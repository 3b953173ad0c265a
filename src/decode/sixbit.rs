//! Six-bit ASCII payload armouring used by AIVDM sentences.
//!
//! Each payload character carries six bits: subtract 48 from the character
//! code, and subtract a further 8 when the result is above 40. This maps
//! `0`..=`W` onto 0..=39 and `` ` ``..=`w` onto 40..=63.

use super::BitPayload;

/// Bits carried by one payload character
pub const BITS_PER_CHAR: usize = 6;

/// Whether `c` belongs to the payload armouring alphabet
pub fn is_armor_char(c: char) -> bool {
    matches!(c, '0'..='W' | '`'..='w')
}

/// Six-bit value of one armoured character
pub fn char_value(c: char) -> Option<u8> {
    if !is_armor_char(c) {
        return None;
    }
    let mut value = c as u8 - 48;
    if value > 40 {
        value -= 8;
    }
    Some(value)
}

/// Armoured character for a six-bit value
pub fn value_char(value: u8) -> Option<char> {
    match value {
        0..=39 => Some((value + 48) as char),
        40..=63 => Some((value + 56) as char),
        _ => None,
    }
}

/// Convert an armoured payload into its bitstream, `6 * len` bits long.
///
/// Returns None if any character falls outside the armouring alphabet.
pub fn decode(text: &str) -> Option<BitPayload> {
    let mut bits = BitPayload::with_capacity(text.len() * BITS_PER_CHAR);
    for c in text.chars() {
        bits.push_bits(u64::from(char_value(c)?), BITS_PER_CHAR);
    }
    Some(bits)
}

/// Armour a bitstream back into payload text, zero-filling the last character.
///
/// Returns the text and the number of fill bits added.
pub fn encode(bits: &BitPayload) -> (String, u8) {
    let chars = bits.len().div_ceil(BITS_PER_CHAR);
    let text = (0..chars)
        .filter_map(|i| {
            let value = bits.read_unsigned(i * BITS_PER_CHAR, BITS_PER_CHAR, super::Fill::Zeros);
            value_char(value as u8)
        })
        .collect();
    let padding = (chars * BITS_PER_CHAR - bits.len()) as u8;
    (text, padding)
}
