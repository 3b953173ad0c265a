//! Two-phase batch transform: parse and join, then decode

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    dataset::DatasetWriterBuilder,
    decode::{fields, sixbit},
    errors::AisArchiveError,
    fragments::FragmentReassembler,
    models::{DecodedMessage, SentenceRecord},
    sentence::parse_line,
};

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank input lines
    pub lines: usize,
    /// Lines dropped because of a malformed numeric field
    pub skipped: usize,
    /// Rows written with a sentence issue
    pub flagged: usize,
    /// Two-part messages joined
    pub merged: usize,
    /// Second fragments dropped without a partner
    pub orphaned: usize,
    /// Rows in the output
    pub messages: usize,
}

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Read `input`, decode it and write the partitioned dataset to `output`
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunStats, AisArchiveError> {
        info!("Reading the data from {}", input.display());
        let raw = fs::read(input)?;
        let text = String::from_utf8_lossy(&raw);

        let (messages, stats) = self.decode(&text)?;

        let writer = DatasetWriterBuilder::new()
            .root(output.to_path_buf())
            .output(self.config.output.clone())
            .build()?;
        writer.write(&messages)?;

        info!(
            "Finished: {} lines, {} rows, {} merged, {} orphaned, {} skipped, {} flagged",
            stats.lines, stats.messages, stats.merged, stats.orphaned, stats.skipped, stats.flagged
        );
        Ok(stats)
    }

    /// Decode a whole input text into ordered rows
    pub fn decode(&self, text: &str) -> Result<(Vec<DecodedMessage>, RunStats), AisArchiveError> {
        let mut stats = RunStats::default();

        info!("Parsing sentences and converting payloads");
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .collect();
        let parsed: Vec<Result<Option<SentenceRecord>, AisArchiveError>> = lines
            .par_iter()
            .map(|(line, text)| prepare(*line, text).map_err(|e| e.at_line(*line)))
            .collect();

        let mut records = Vec::with_capacity(parsed.len());
        for result in parsed {
            match result {
                Ok(Some(record)) => {
                    stats.lines += 1;
                    records.push(record);
                }
                Ok(None) => {}
                Err(e) if self.config.decode.strict => return Err(e),
                Err(e) => {
                    stats.lines += 1;
                    stats.skipped += 1;
                    warn!("Skipping line: {}", e);
                }
            }
        }

        info!("Appending second fragments");
        let reassembler = FragmentReassembler::new(self.config.fragments.join_key);
        let (records, reassembly) = reassembler.reassemble(records);
        stats.merged = reassembly.merged;
        stats.orphaned = reassembly.orphaned;

        info!("Decoding message fields");
        let messages: Vec<DecodedMessage> = records.into_par_iter().map(fields::decode).collect();

        stats.flagged = messages
            .iter()
            .filter(|message| message.sentence.issue.is_some())
            .count();
        stats.messages = messages.len();

        Ok((messages, stats))
    }
}

/// Parse one line and convert its payload into a bitstream
fn prepare(line: usize, text: &str) -> Result<Option<SentenceRecord>, AisArchiveError> {
    let Some(sentence) = parse_line(text)? else {
        return Ok(None);
    };

    let bits = sentence.payload.as_deref().and_then(sixbit::decode).map(|mut bits| {
        bits.trim_padding(usize::from(sentence.padding.unwrap_or(0)));
        bits
    });

    Ok(Some(SentenceRecord {
        line,
        sentence,
        bits,
    }))
}
