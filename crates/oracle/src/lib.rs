pub mod client;
pub mod outcome;
pub mod parse;
pub mod testing;

pub use client::{CliOracle, DEFAULT_TIMEOUT_SECS, Oracle, OracleConfig};
pub use outcome::{ExtractionFailure, OracleOutcome};
pub use parse::{ParseOutcome, ParseStrategy, interpret_response, recover_json};
