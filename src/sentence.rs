//! Sentence parsing: tag-block prefix and AIVDM body.
//!
//! An input line looks like
//!
//! ```text
//! 1569888001\g:1-2-1234,s:rORBCOMM000,c:1569888000*4A\!AIVDM,2,1,3,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn22222222,0*1C
//! ```
//!
//! with an optional leading receive-time epoch, an optional tag block, and
//! a seven-field NMEA body after the first `!`.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::decode::sixbit;
use crate::errors::AisArchiveError;
use crate::models::{RawSentence, SentenceIssue};

const SENTENCE_ID: &str = "AIVDM";
const BODY_FIELDS: usize = 7;

/// Tag block metadata from the part of the line before `!`
#[derive(Debug, Clone, Default, PartialEq)]
struct Prefix {
    received_time: Option<DateTime<Utc>>,
    report_time: Option<DateTime<Utc>>,
    source: Option<String>,
    group: Option<String>,
}

/// Fields of the AIVDM sentence itself
#[derive(Debug, Clone, Default, PartialEq)]
struct Body {
    fragment_count: Option<u8>,
    fragment_index: Option<u8>,
    sequence_id: Option<String>,
    channel: Option<String>,
    payload: Option<String>,
    padding: Option<u8>,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// Structural problems are recorded on the sentence as a
/// [`SentenceIssue`]; only malformed numbers are errors.
pub fn parse_line(line: &str) -> Result<Option<RawSentence>, AisArchiveError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (prefix, body) = match line.split_once('!') {
        Some((prefix, body)) => (prefix, Some(body)),
        None => (line, None),
    };

    let prefix = parse_prefix(prefix);
    let (body, issue) = match body {
        Some(body) => parse_body(body)?,
        None => (Body::default(), Some(SentenceIssue::MalformedBody)),
    };

    if let Some(issue) = issue {
        debug!("Sentence issue {}: {}", issue, line);
    }

    Ok(Some(RawSentence {
        received_time: prefix.received_time,
        report_time: prefix.report_time.unwrap_or(DateTime::UNIX_EPOCH),
        source: prefix.source,
        group: prefix.group,
        fragment_count: body.fragment_count,
        fragment_index: body.fragment_index,
        sequence_id: body.sequence_id,
        channel: body.channel,
        padding: body.padding,
        payload: body.payload,
        issue,
    }))
}

/// Timestamps follow an optional-value policy: an unusable receive time is
/// absent and an unusable report time falls back to epoch zero.
fn parse_prefix(prefix: &str) -> Prefix {
    let digits = leading(prefix, |c| c.is_ascii_digit());
    let received_time = match digits {
        "" => None,
        digits => optional_epoch("received_time", digits),
    };

    let mut parsed = Prefix {
        received_time,
        ..Prefix::default()
    };

    let tags = prefix[digits.len()..].trim_matches('\\');
    let tags = tags.split_once('*').map_or(tags, |(tags, _checksum)| tags);

    for tag in tags.split(',') {
        let Some((key, value)) = tag.trim_matches('\\').split_once(':') else {
            continue;
        };
        match key {
            "c" => {
                let digits = leading(value, |c| c.is_ascii_digit());
                if !digits.is_empty() {
                    parsed.report_time = optional_epoch("report_time", digits);
                }
            }
            "s" => parsed.source = non_empty(leading(value, is_word_char)),
            "g" => {
                parsed.group = non_empty(leading(value, |c| c.is_ascii_alphanumeric() || c == '-'))
            }
            _ => {}
        }
    }

    parsed
}

fn parse_body(body: &str) -> Result<(Body, Option<SentenceIssue>), AisArchiveError> {
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != BODY_FIELDS {
        return Ok((Body::default(), Some(SentenceIssue::MalformedBody)));
    }
    if fields[0] != SENTENCE_ID {
        return Ok((Body::default(), Some(SentenceIssue::UnsupportedSentence)));
    }

    let padding = fields[6].split_once('*').map_or(fields[6], |(padding, _)| padding);

    let mut parsed = Body {
        fragment_count: parse_small("fragment_count", fields[1])?,
        fragment_index: parse_small("fragment_index", fields[2])?,
        sequence_id: non_empty(fields[3]),
        channel: non_empty(fields[4]),
        payload: None,
        padding: parse_small("padding", padding)?,
    };

    let payload = fields[5];
    if payload.is_empty() || !payload.chars().all(sixbit::is_armor_char) {
        return Ok((parsed, Some(SentenceIssue::InvalidPayload)));
    }
    parsed.payload = Some(payload.to_string());

    Ok((parsed, None))
}

/// Epoch seconds, None if the digits overflow or fall outside chrono's range
fn optional_epoch(field: &'static str, digits: &str) -> Option<DateTime<Utc>> {
    let time = digits
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0));
    if time.is_none() {
        warn!("Ignoring out-of-range {} {}", field, digits);
    }
    time
}

/// Empty means absent; anything else must be a small decimal number
fn parse_small(field: &'static str, value: &str) -> Result<Option<u8>, AisArchiveError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u8>()
        .map(Some)
        .map_err(|_| AisArchiveError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn leading(value: &str, pred: impl Fn(char) -> bool) -> &str {
    let end = value.find(|c: char| !pred(c)).unwrap_or(value.len());
    &value[..end]
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_line() {
        let line = r"1569888001\g:1-2-1234,s:rORBCOMM000,c:1569888000*4A\!AIVDM,2,1,3,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn22222222,0*1C";
        let sentence = parse_line(line).unwrap().unwrap();

        assert_eq!(sentence.received_time.unwrap().timestamp(), 1_569_888_001);
        assert_eq!(sentence.report_time.timestamp(), 1_569_888_000);
        assert_eq!(sentence.group.as_deref(), Some("1-2-1234"));
        assert_eq!(sentence.source.as_deref(), Some("rORBCOMM000"));
        assert_eq!(sentence.fragment_count, Some(2));
        assert_eq!(sentence.fragment_index, Some(1));
        assert_eq!(sentence.sequence_id.as_deref(), Some("3"));
        assert_eq!(sentence.channel.as_deref(), Some("A"));
        assert_eq!(sentence.padding, Some(0));
        assert_eq!(
            sentence.payload.as_deref(),
            Some("55?MbV02;H;s<HtKR20EHE:0@T4@Dn22222222")
        );
        assert!(sentence.issue.is_none());
    }

    #[test]
    fn missing_receive_time_is_unset() {
        let line = r"\s:43479,c:1635883083,t:1635883172*6C\!AIVDM,1,1,,,144fiV0P00WT:`8POChN4?v4281b,0*64";
        let sentence = parse_line(line).unwrap().unwrap();

        assert!(sentence.received_time.is_none());
        assert_eq!(sentence.report_time.timestamp(), 1_635_883_083);
        assert_eq!(sentence.source.as_deref(), Some("43479"));
        assert!(sentence.group.is_none());
        assert!(sentence.sequence_id.is_none());
        assert!(sentence.channel.is_none());
    }

    #[test]
    fn missing_or_malformed_report_time_defaults_to_epoch() {
        let sentence = parse_line("!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3?,0*5C")
            .unwrap()
            .unwrap();
        assert_eq!(sentence.report_time, DateTime::UNIX_EPOCH);

        let sentence = parse_line(r"\c:soon*00\!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3?,0*5C")
            .unwrap()
            .unwrap();
        assert_eq!(sentence.report_time, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn invalid_payload_is_flagged() {
        let sentence = parse_line("!AIVDM,1,1,,A,15M6 7FC~,0*00").unwrap().unwrap();
        assert_eq!(sentence.issue, Some(SentenceIssue::InvalidPayload));
        assert!(sentence.payload.is_none());
        assert_eq!(sentence.fragment_count, Some(1));

        let sentence = parse_line("!AIVDM,1,1,,A,,0*00").unwrap().unwrap();
        assert_eq!(sentence.issue, Some(SentenceIssue::InvalidPayload));
    }

    #[test]
    fn malformed_body_is_flagged() {
        let sentence = parse_line(r"1569888001\c:1569888000*4A\").unwrap().unwrap();
        assert_eq!(sentence.issue, Some(SentenceIssue::MalformedBody));
        assert_eq!(sentence.report_time.timestamp(), 1_569_888_000);

        let sentence = parse_line("!AIVDM,1,1,A,15M67FC000G?ufbE`FepT@3?").unwrap().unwrap();
        assert_eq!(sentence.issue, Some(SentenceIssue::MalformedBody));
        assert!(sentence.payload.is_none());
    }

    #[test]
    fn other_sentence_types_are_flagged() {
        let sentence = parse_line("!AIVDO,1,1,,,B3P7uL@00FK0mT5`sk?Q3wS5oP06,0*1D")
            .unwrap()
            .unwrap();
        assert_eq!(sentence.issue, Some(SentenceIssue::UnsupportedSentence));
        assert!(sentence.payload.is_none());
    }

    #[test]
    fn non_numeric_body_field_is_an_error() {
        let err = parse_line("!AIVDM,x,1,,A,15M67FC000G?ufbE`FepT@3?,0*5C").unwrap_err();
        assert!(matches!(
            err,
            AisArchiveError::InvalidNumber {
                field: "fragment_count",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_report_time_defaults_to_epoch() {
        let line = r"\c:99999999999999999999*00\!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3?,0*5C";
        let sentence = parse_line(line).unwrap().unwrap();
        assert_eq!(sentence.report_time, DateTime::UNIX_EPOCH);
        assert!(sentence.issue.is_none());

        // Parses as i64 but is beyond chrono's range
        let line = r"\c:9223372036854775807*00\!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3?,0*5C";
        let sentence = parse_line(line).unwrap().unwrap();
        assert_eq!(sentence.report_time, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn out_of_range_receive_time_is_unset() {
        let line = r"99999999999999999999\c:1569888000*00\!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3?,0*5C";
        let sentence = parse_line(line).unwrap().unwrap();
        assert!(sentence.received_time.is_none());
        assert_eq!(sentence.report_time.timestamp(), 1_569_888_000);
        assert_eq!(sentence.payload.as_deref(), Some("15M67FC000G?ufbE`FepT@3?"));
    }

    #[test]
    fn blank_line_is_skipped() {
        assert!(parse_line("   ").unwrap().is_none());
    }
}
