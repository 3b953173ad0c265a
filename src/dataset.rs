//! Partitioned Parquet dataset writer
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampSecondArray, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use tracing::{debug, error, info};

use crate::{
    config::OutputConfig,
    errors::AisArchiveError,
    models::{DecodedMessage, Partition},
};

/// File written into each partition directory
pub const PART_FILE_NAME: &str = "part-00000.parquet";

const UTC: &str = "UTC";

/// Writes decoded messages as a Hive-partitioned Parquet dataset
pub struct DatasetWriter {
    root: PathBuf,
    config: OutputConfig,
}

impl DatasetWriter {
    /// Create a new dataset writer, creating the root directory if needed
    pub fn new(root: PathBuf, config: OutputConfig) -> Result<Self, AisArchiveError> {
        Self::validate(&root, &config)?;

        info!(
            "Initializing DatasetWriter: root={}, compression={:?}, max_rows_per_group={}",
            root.display(),
            config.compression,
            config.max_rows_per_group
        );

        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                error!("Failed to create dataset directory: {}", e);
                e
            })?;
        }

        Ok(Self { root, config })
    }

    fn validate(root: &Path, config: &OutputConfig) -> Result<(), AisArchiveError> {
        if root.as_os_str().is_empty() {
            return Err(AisArchiveError::ConfigurationError {
                message: "Dataset path cannot be empty".to_string(),
            });
        }
        if config.max_rows_per_group == 0 {
            return Err(AisArchiveError::ConfigurationError {
                message: "Row group size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Arrow schema of every partition file
    pub fn schema() -> SchemaRef {
        let timestamp = DataType::Timestamp(TimeUnit::Second, Some(UTC.into()));
        Arc::new(Schema::new(vec![
            Field::new("received_time", timestamp.clone(), true),
            Field::new("report_time", timestamp, false),
            Field::new("source", DataType::Utf8, true),
            Field::new("group", DataType::Utf8, true),
            Field::new("fragment_count", DataType::UInt8, true),
            Field::new("fragment_index", DataType::UInt8, true),
            Field::new("sequence_id", DataType::Utf8, true),
            Field::new("channel", DataType::Utf8, true),
            Field::new("padding", DataType::UInt8, true),
            Field::new("bits", DataType::Utf8, true),
            Field::new("message_type", DataType::UInt8, true),
            Field::new("mmsi", DataType::Utf8, true),
            Field::new("longitude", DataType::Float64, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("destination", DataType::Utf8, true),
            Field::new("callsign", DataType::Utf8, true),
            Field::new("shipname", DataType::Utf8, true),
            Field::new("issue", DataType::Utf8, true),
        ]))
    }

    /// Write all messages, one file per year/month/day/hour partition.
    ///
    /// Returns the written file paths in partition order.
    pub fn write(&self, messages: &[DecodedMessage]) -> Result<Vec<PathBuf>, AisArchiveError> {
        let mut partitions: BTreeMap<Partition, Vec<&DecodedMessage>> = BTreeMap::new();
        for message in messages {
            partitions.entry(message.partition()).or_default().push(message);
        }

        info!(
            "Writing {} rows into {} partitions",
            messages.len(),
            partitions.len()
        );

        partitions
            .iter()
            .map(|(partition, rows)| self.write_partition(partition, rows))
            .collect()
    }

    fn write_partition(
        &self,
        partition: &Partition,
        rows: &[&DecodedMessage],
    ) -> Result<PathBuf, AisArchiveError> {
        let dir = self.root.join(partition.relative_path());
        fs::create_dir_all(&dir)?;
        let path = dir.join(PART_FILE_NAME);

        let batch = Self::record_batch(rows)?;
        let props = WriterProperties::builder()
            .set_compression(self.config.compression.into())
            .set_max_row_group_size(self.config.max_rows_per_group)
            .build();

        let file = fs::File::create(&path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    /// Build one Arrow batch from a partition's rows
    pub fn record_batch(rows: &[&DecodedMessage]) -> Result<RecordBatch, AisArchiveError> {
        let received_time: Vec<Option<i64>> = rows
            .iter()
            .map(|m| m.sentence.received_time.map(|t| t.timestamp()))
            .collect();
        let report_time: Vec<i64> = rows
            .iter()
            .map(|m| m.sentence.report_time.timestamp())
            .collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampSecondArray::from(received_time).with_timezone(UTC)),
            Arc::new(TimestampSecondArray::from(report_time).with_timezone(UTC)),
            strings(rows, |m| m.sentence.source.clone()),
            strings(rows, |m| m.sentence.group.clone()),
            small(rows, |m| m.sentence.fragment_count),
            small(rows, |m| m.sentence.fragment_index),
            strings(rows, |m| m.sentence.sequence_id.clone()),
            strings(rows, |m| m.sentence.channel.clone()),
            small(rows, |m| m.sentence.padding),
            strings(rows, |m| m.bits.as_ref().map(|b| b.to_bit_string())),
            small(rows, |m| m.message_type),
            strings(rows, |m| m.mmsi.map(|mmsi| mmsi.to_string())),
            Arc::new(Float64Array::from(
                rows.iter().map(|m| m.longitude).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|m| m.latitude).collect::<Vec<_>>(),
            )),
            strings(rows, |m| m.destination.clone()),
            strings(rows, |m| m.callsign.clone()),
            strings(rows, |m| m.shipname.clone()),
            strings(rows, |m| m.sentence.issue.map(|i| i.as_str().to_string())),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

fn strings(
    rows: &[&DecodedMessage],
    value: impl Fn(&DecodedMessage) -> Option<String>,
) -> ArrayRef {
    Arc::new(StringArray::from(
        rows.iter().map(|m| value(*m)).collect::<Vec<_>>(),
    ))
}

fn small(rows: &[&DecodedMessage], value: impl Fn(&DecodedMessage) -> Option<u8>) -> ArrayRef {
    Arc::new(UInt8Array::from(
        rows.iter().map(|m| value(*m)).collect::<Vec<_>>(),
    ))
}

/// Builder for DatasetWriter with simplified configuration
pub struct DatasetWriterBuilder {
    root: Option<PathBuf>,
    output: Option<OutputConfig>,
}

impl Default for DatasetWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetWriterBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            output: None,
        }
    }

    pub fn root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    pub fn output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> Result<DatasetWriter, AisArchiveError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("ais-archive"));
        let output = self.output.unwrap_or_default();

        DatasetWriter::new(root, output)
    }
}
