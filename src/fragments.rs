//! Reassembly of two-part AIS messages

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::config::JoinKeyPolicy;
use crate::decode::fields::raw_mmsi;
use crate::models::SentenceRecord;

/// Key on which first and second fragments are matched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    MmsiGroup { mmsi: u32, group: String },
    GroupSequence { group: String, sequence: Option<String> },
}

/// Group identifier of a `g:` tag.
///
/// NMEA 4 tags read `<sentence>-<total>-<id>`, so both sentences of a group
/// share only the last component. Tags without `-` are used whole.
pub fn group_id(tag: &str) -> &str {
    tag.rsplit_once('-').map_or(tag, |(_, id)| id)
}

/// Counts from one reassembly pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblyStats {
    /// Pairs joined into one bitstream
    pub merged: usize,
    /// Second fragments dropped without a matching first fragment
    pub orphaned: usize,
}

/// Joins the two sentences of a two-fragment message into one record
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentReassembler {
    policy: JoinKeyPolicy,
}

impl FragmentReassembler {
    pub fn new(policy: JoinKeyPolicy) -> Self {
        Self { policy }
    }

    /// Join key of a record, None if it cannot take part in a join
    pub fn join_key(&self, record: &SentenceRecord) -> Option<JoinKey> {
        let bits = record.bits.as_ref()?;
        let group = record.sentence.group.clone()?;
        match self.policy {
            JoinKeyPolicy::MmsiAndGroup => Some(JoinKey::MmsiGroup {
                mmsi: raw_mmsi(bits),
                group,
            }),
            JoinKeyPolicy::GroupAndSequence => Some(JoinKey::GroupSequence {
                group: group_id(&group).to_string(),
                sequence: record.sentence.sequence_id.clone(),
            }),
        }
    }

    /// Append each second fragment's bits to its first fragment and drop
    /// every second-of-two record. Input order is otherwise preserved.
    pub fn reassemble(
        &self,
        mut records: Vec<SentenceRecord>,
    ) -> (Vec<SentenceRecord>, ReassemblyStats) {
        let mut seconds: HashMap<JoinKey, VecDeque<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            if !record.sentence.is_second_of_two() {
                continue;
            }
            if let Some(key) = self.join_key(record) {
                seconds.entry(key).or_default().push_back(index);
            }
        }

        let mut pairs = Vec::new();
        for (index, record) in records.iter().enumerate() {
            if !record.sentence.is_first_of_two() {
                continue;
            }
            let second = self
                .join_key(record)
                .and_then(|key| seconds.get_mut(&key))
                .and_then(VecDeque::pop_front);
            if let Some(second) = second {
                pairs.push((index, second));
            }
        }

        for &(first, second) in &pairs {
            let Some(tail) = records[second].bits.take() else {
                continue;
            };
            if let Some(head) = records[first].bits.as_mut() {
                head.append(&tail);
            }
            debug!(
                "Merged fragment on line {} into line {}",
                records[second].line, records[first].line
            );
        }

        let total_seconds = records
            .iter()
            .filter(|record| record.sentence.is_second_of_two())
            .count();
        let stats = ReassemblyStats {
            merged: pairs.len(),
            orphaned: total_seconds - pairs.len(),
        };

        records.retain(|record| {
            if record.sentence.is_second_of_two() {
                if record.bits.is_some() {
                    debug!("Dropping unmatched second fragment on line {}", record.line);
                }
                return false;
            }
            true
        });

        (records, stats)
    }
}
