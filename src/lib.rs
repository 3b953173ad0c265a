//! Decode NMEA-wrapped AIS sentences into a time-partitioned Parquet dataset

pub mod config;
pub mod dataset;
pub mod decode;
pub mod errors;
pub mod fragments;
pub mod models;
pub mod pipeline;
pub mod sentence;
