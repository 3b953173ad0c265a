//! Data models.

use std::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::decode::BitPayload;
use crate::errors::AisArchiveError;

/// Maritime Mobile Service Identity (MMSI)
///
/// A unique nine-digit number for identifying vessels in AIS messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mmsi(u32);

impl TryFrom<u32> for Mmsi {
    type Error = AisArchiveError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > 999_999_999 {
            return Err(AisArchiveError::InvalidMmsi(value.to_string()));
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for Mmsi {
    type Error = AisArchiveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let parsed = value
            .parse::<u32>()
            .map_err(|_| AisArchiveError::InvalidMmsi(value.to_string()))?;
        Self::try_from(parsed)
    }
}

impl Mmsi {
    /// Get the raw MMSI value
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Zero-padded to nine digits
impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

/// Problem found while parsing a sentence that does not abort the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceIssue {
    /// No `!` body, or a body without the seven AIVDM fields
    MalformedBody,
    /// Well-formed NMEA sentence of a type other than AIVDM
    UnsupportedSentence,
    /// Payload empty or containing characters outside the armouring alphabet
    InvalidPayload,
}

impl SentenceIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentenceIssue::MalformedBody => "malformed_body",
            SentenceIssue::UnsupportedSentence => "unsupported_sentence",
            SentenceIssue::InvalidPayload => "invalid_payload",
        }
    }
}

impl fmt::Display for SentenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input line, split into tag metadata and AIVDM body fields
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentence {
    /// Receiver timestamp, the leading digit run of the line
    pub received_time: Option<DateTime<Utc>>,
    /// Tag block `c:` timestamp, epoch zero when missing
    pub report_time: DateTime<Utc>,
    /// Tag block `s:` source station
    pub source: Option<String>,
    /// Tag block `g:` group
    pub group: Option<String>,
    pub fragment_count: Option<u8>,
    pub fragment_index: Option<u8>,
    pub sequence_id: Option<String>,
    /// Radio channel, `A` or `B`
    pub channel: Option<String>,
    /// Number of fill bits in the last payload character
    pub padding: Option<u8>,
    /// Six-bit armoured payload text
    pub payload: Option<String>,
    pub issue: Option<SentenceIssue>,
}

impl Default for RawSentence {
    fn default() -> Self {
        Self {
            received_time: None,
            report_time: DateTime::UNIX_EPOCH,
            source: None,
            group: None,
            fragment_count: None,
            fragment_index: None,
            sequence_id: None,
            channel: None,
            padding: None,
            payload: None,
            issue: None,
        }
    }
}

impl RawSentence {
    /// First part of a two-part message
    pub fn is_first_of_two(&self) -> bool {
        self.fragment_count == Some(2) && self.fragment_index == Some(1)
    }

    /// Second part of a two-part message
    pub fn is_second_of_two(&self) -> bool {
        self.fragment_count == Some(2) && self.fragment_index == Some(2)
    }
}

/// A parsed sentence together with its decoded bitstream, between
/// parsing and field decoding
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRecord {
    /// 1-based line number in the input
    pub line: usize,
    pub sentence: RawSentence,
    pub bits: Option<BitPayload>,
}

/// Fully decoded row
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub sentence: RawSentence,
    /// Final bitstream, after merging a second fragment if one was found
    pub bits: Option<BitPayload>,
    pub message_type: Option<u8>,
    pub mmsi: Option<Mmsi>,
    /// Longitude in decimal degrees, None if not reported for this type
    pub longitude: Option<f64>,
    /// Latitude in decimal degrees, None if not reported for this type
    pub latitude: Option<f64>,
    /// Static and voyage data, only for type 5
    pub shipname: Option<String>,
    pub callsign: Option<String>,
    pub destination: Option<String>,
}

impl DecodedMessage {
    pub fn partition(&self) -> Partition {
        Partition::from(&self.sentence.report_time)
    }
}

/// Dataset partition derived from report time, in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Partition {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl From<&DateTime<Utc>> for Partition {
    fn from(time: &DateTime<Utc>) -> Self {
        Self {
            year: time.year(),
            month: time.month(),
            day: time.day(),
            hour: time.hour(),
        }
    }
}

impl Partition {
    /// Hive-style relative directory, e.g. `year=2019/month=10/day=1/hour=0`
    pub fn relative_path(&self) -> String {
        format!(
            "year={}/month={}/day={}/hour={}",
            self.year, self.month, self.day, self.hour
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mmsi_zero_padded() {
        let mmsi = Mmsi::try_from(2_655_651).unwrap();
        assert_eq!(mmsi.to_string(), "002655651");
        assert_eq!(mmsi.value(), 2_655_651);
    }

    #[test]
    fn mmsi_rejects_ten_digits() {
        assert!(Mmsi::try_from(1_000_000_000).is_err());
        assert!(Mmsi::try_from("abc").is_err());
        assert_eq!(Mmsi::try_from("230123456").unwrap().value(), 230_123_456);
    }

    #[test]
    fn partition_from_report_time() {
        let time = Utc.with_ymd_and_hms(2019, 10, 1, 7, 59, 59).unwrap();
        let partition = Partition::from(&time);
        assert_eq!(
            partition,
            Partition {
                year: 2019,
                month: 10,
                day: 1,
                hour: 7
            }
        );
        assert_eq!(partition.relative_path(), "year=2019/month=10/day=1/hour=7");
    }

    #[test]
    fn default_report_time_is_epoch() {
        let sentence = RawSentence::default();
        assert_eq!(sentence.report_time.timestamp(), 0);
        assert_eq!(
            Partition::from(&sentence.report_time).relative_path(),
            "year=1970/month=1/day=1/hour=0"
        );
    }
}
