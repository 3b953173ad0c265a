//! Fixed-offset field extraction by message type

use std::ops::Range;

use tracing::debug;

use super::{text::decode_text, BitPayload, Fill};
use crate::models::{DecodedMessage, Mmsi, SentenceRecord};

/// Position fields are stored in 1/10000 minute
const POSITION_SCALE: f64 = 600_000.0;

const MESSAGE_TYPE: Range<usize> = 0..6;
const MMSI: Range<usize> = 8..38;

/// Static and voyage related data, message type 5
const STATIC_VOYAGE_TYPE: u8 = 5;
const CALLSIGN: Range<usize> = 70..112;
const SHIPNAME: Range<usize> = 112..232;
const DESTINATION: Range<usize> = 302..422;

/// Bit ranges of the position fields for one group of message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionLayout {
    pub longitude: Range<usize>,
    pub latitude: Range<usize>,
}

const fn layout(longitude: Range<usize>, latitude: Range<usize>) -> PositionLayout {
    PositionLayout {
        longitude,
        latitude,
    }
}

/// Message types carrying a position, and where it sits in the bitstream
pub static POSITION_LAYOUTS: &[(&[u8], PositionLayout)] = &[
    // Class A position report, SAR aircraft position report
    (&[1, 2, 3, 9], layout(61..89, 89..116)),
    // Base station report
    (&[4], layout(79..107, 107..134)),
    // Class B standard and extended position report
    (&[18, 19], layout(57..85, 85..112)),
    // Aid-to-navigation report
    (&[21], layout(164..192, 192..219)),
    // Long range broadcast
    (&[27], layout(44..62, 62..79)),
];

/// Position layout for `message_type`, None if the type has no position
pub fn position_layout(message_type: u8) -> Option<&'static PositionLayout> {
    POSITION_LAYOUTS
        .iter()
        .find(|(types, _)| types.contains(&message_type))
        .map(|(_, layout)| layout)
}

pub fn message_type(bits: &BitPayload) -> u8 {
    bits.read_unsigned(MESSAGE_TYPE.start, MESSAGE_TYPE.len(), Fill::Zeros) as u8
}

/// Raw 30-bit user id at bits [8,38), regardless of message type
pub fn raw_mmsi(bits: &BitPayload) -> u32 {
    bits.read_unsigned(MMSI.start, MMSI.len(), Fill::Zeros) as u32
}

/// MMSI at bits [8,38). None when the raw value does not fit in nine digits.
pub fn mmsi(bits: &BitPayload) -> Option<Mmsi> {
    Mmsi::try_from(raw_mmsi(bits)).ok()
}

fn degrees(bits: &BitPayload, range: &Range<usize>, fill: Fill, limit: f64) -> Option<f64> {
    let value = bits.read_signed(range.start, range.len(), fill) as f64 / POSITION_SCALE;
    if value.abs() > limit {
        debug!("Position value {} outside +/-{}, not available", value, limit);
        return None;
    }
    Some(value)
}

/// Longitude in degrees; None for types without a position or for
/// values outside [-180, 180] (181 = not available)
pub fn longitude(bits: &BitPayload, message_type: u8) -> Option<f64> {
    let layout = position_layout(message_type)?;
    degrees(bits, &layout.longitude, Fill::Zeros, 180.0)
}

/// Latitude in degrees; None for types without a position or for
/// values outside [-90, 90] (91 = not available)
pub fn latitude(bits: &BitPayload, message_type: u8) -> Option<f64> {
    let layout = position_layout(message_type)?;
    degrees(bits, &layout.latitude, Fill::LeadingOne, 90.0)
}

pub fn callsign(bits: &BitPayload) -> String {
    decode_text(bits, CALLSIGN.start, CALLSIGN.end)
}

pub fn shipname(bits: &BitPayload) -> String {
    decode_text(bits, SHIPNAME.start, SHIPNAME.end)
}

pub fn destination(bits: &BitPayload) -> String {
    decode_text(bits, DESTINATION.start, DESTINATION.end)
}

/// Decode all fields of a (possibly merged) record
pub fn decode(record: SentenceRecord) -> DecodedMessage {
    let SentenceRecord { sentence, bits, .. } = record;

    let Some(payload) = bits.as_ref() else {
        return DecodedMessage {
            sentence,
            bits: None,
            message_type: None,
            mmsi: None,
            longitude: None,
            latitude: None,
            shipname: None,
            callsign: None,
            destination: None,
        };
    };

    let message_type = message_type(payload);
    let is_static = message_type == STATIC_VOYAGE_TYPE;

    DecodedMessage {
        message_type: Some(message_type),
        mmsi: mmsi(payload),
        longitude: longitude(payload, message_type),
        latitude: latitude(payload, message_type),
        shipname: is_static.then(|| shipname(payload)),
        callsign: is_static.then(|| callsign(payload)),
        destination: is_static.then(|| destination(payload)),
        sentence,
        bits,
    }
}
