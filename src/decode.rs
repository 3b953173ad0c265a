//! Bit-level AIS payload decoding

pub mod fields;
pub mod sixbit;
pub mod text;

/// Bits used past the end of a payload when a fixed-offset read runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// All filler bits zero
    Zeros,
    /// First filler bit one, the rest zero
    LeadingOne,
}

impl Fill {
    fn bit(self, offset_past_end: usize) -> bool {
        matches!(self, Fill::LeadingOne) && offset_past_end == 0
    }
}

/// Ordered bitstream of a decoded payload, most significant bit first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitPayload(Vec<bool>);

impl BitPayload {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self(Vec::with_capacity(bits))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append `width` low bits of `value`, most significant first
    pub fn push_bits(&mut self, value: u64, width: usize) {
        for shift in (0..width).rev() {
            self.0.push(value >> shift & 1 == 1);
        }
    }

    /// Append another bitstream after this one
    pub fn append(&mut self, other: &BitPayload) {
        self.0.extend_from_slice(&other.0);
    }

    /// Drop `padding` fill bits from the end, never more than are present
    pub fn trim_padding(&mut self, padding: usize) {
        let keep = self.0.len().saturating_sub(padding);
        self.0.truncate(keep);
    }

    /// Bit at `index`, or the filler bit once past the end
    pub fn bit(&self, index: usize, fill: Fill) -> bool {
        match self.0.get(index) {
            Some(bit) => *bit,
            None => fill.bit(index - self.0.len()),
        }
    }

    /// Unsigned integer from bits [start, start + width)
    pub fn read_unsigned(&self, start: usize, width: usize, fill: Fill) -> u64 {
        debug_assert!(width <= 64);
        (start..start + width).fold(0u64, |acc, index| {
            acc << 1 | u64::from(self.bit(index, fill))
        })
    }

    /// Two's complement signed integer from bits [start, start + width)
    pub fn read_signed(&self, start: usize, width: usize, fill: Fill) -> i64 {
        let raw = self.read_unsigned(start, width, fill);
        if width == 0 || width >= 64 {
            return raw as i64;
        }
        if raw >> (width - 1) & 1 == 1 {
            raw as i64 - (1i64 << width)
        } else {
            raw as i64
        }
    }

    /// Render as a string of `0` and `1` characters
    pub fn to_bit_string(&self) -> String {
        self.0.iter().map(|bit| if *bit { '1' } else { '0' }).collect()
    }
}

impl FromIterator<bool> for BitPayload {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
