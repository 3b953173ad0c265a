//! Six-bit text fields (ship name, call sign, destination)

use super::{BitPayload, Fill};

/// ITU-R M.1371 six-bit character table
pub const SIXBIT_TEXT: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";

const PERMITTED_PUNCTUATION: &str = "[]^_!\"#$%&\\()*+,-./:;<=>?";

/// Characters allowed to survive into a decoded text field
pub fn is_permitted(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' ' || PERMITTED_PUNCTUATION.contains(c)
}

/// Decode bits [start, end) as six-bit text.
///
/// Reading stops at `end` or when the bitstream runs out; a trailing partial
/// group is zero-filled. `@` fill characters and surrounding whitespace are
/// removed and anything outside the permitted set is dropped.
pub fn decode_text(bits: &BitPayload, start: usize, end: usize) -> String {
    let stop = end.min(bits.len());
    let raw: String = (start..stop)
        .step_by(6)
        .map(|offset| SIXBIT_TEXT[bits.read_unsigned(offset, 6, Fill::Zeros) as usize] as char)
        .filter(|c| *c != '@')
        .collect();

    raw.trim().chars().filter(|c| is_permitted(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_values(values: &[u8]) -> BitPayload {
        let mut bits = BitPayload::new();
        for value in values {
            bits.push_bits(u64::from(*value), 6);
        }
        bits
    }

    #[test]
    fn table_layout() {
        assert_eq!(SIXBIT_TEXT[0], b'@');
        assert_eq!(SIXBIT_TEXT[1], b'A');
        assert_eq!(SIXBIT_TEXT[32], b' ');
        assert_eq!(SIXBIT_TEXT[39], b'\'');
        assert_eq!(SIXBIT_TEXT[48], b'0');
        assert_eq!(SIXBIT_TEXT[63], b'?');
    }

    #[test]
    fn strips_fill_and_whitespace() {
        // " EVER@@" followed by trailing @ fill
        let bits = from_values(&[32, 5, 22, 5, 18, 0, 0, 32, 0]);
        assert_eq!(decode_text(&bits, 0, bits.len()), "EVER");
    }

    #[test]
    fn drops_characters_outside_permitted_set() {
        // "O'NEIL": the apostrophe (39) is not permitted
        let bits = from_values(&[15, 39, 14, 5, 9, 12]);
        assert_eq!(decode_text(&bits, 0, 36), "ONEIL");
    }

    #[test]
    fn short_bitstream_ends_field() {
        let bits = from_values(&[14, 5, 23]);
        assert_eq!(decode_text(&bits, 0, 120), "NEW");
        assert_eq!(decode_text(&bits, 60, 120), "");
    }

    #[test]
    fn partial_group_is_zero_filled() {
        let mut bits = from_values(&[1]);
        // 0b0000 1 -> pads to 0b000010 = 'B'
        bits.push_bits(0b00001, 5);
        assert_eq!(decode_text(&bits, 0, 12), "AB");
    }

    #[test]
    fn permitted_set() {
        for c in "AZ09 []^_!\"#$%&\\()*+,-./:;<=>?".chars() {
            assert!(is_permitted(c), "{c:?} should be permitted");
        }
        for c in "@'a`".chars() {
            assert!(!is_permitted(c), "{c:?} should be dropped");
        }
    }
}
