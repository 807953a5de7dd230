//! Error types for the proxy and its host adapter.
//!
//! None of these escape `EventDispatcher::dispatch`: the dispatcher folds every failure into
//! "do nothing for this event". They exist so the loading, injection and parsing layers can be
//! used and tested on their own.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("I/O error reading mapping table: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed mapping line {line}: {reason}")]
    MalformedLine { line: usize, reason: &'static str },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InjectError {
    #[error("switch write path for {switch_id:#x} port {out_port} is closed")]
    Disconnected { switch_id: u64, out_port: u32 },

    #[error("switch {switch_id:#x} rejected packet-out: {reason}")]
    Rejected { switch_id: u64, reason: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid switch id {0:?}")]
    InvalidSwitchId(String),

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid frame hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid frame: {0}")]
    InvalidFrame(&'static str),

    #[error("packet-out for switch {0:#x} has no output action")]
    NoOutputPort(u64),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("worker count must be a positive integer, got {0:?}")]
    InvalidWorkers(String),

    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("dispatch worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
