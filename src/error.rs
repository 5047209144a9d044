use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum OeisError {
    #[error("Invalid OEIS ID: {0}")]
    #[diagnostic(help("identifiers are 'A' followed by exactly six digits, e.g. A000045"))]
    InvalidId(String),

    #[error("unsupported resource format: {0}")]
    #[diagnostic(help("expected one of: html, json, text, bfile"))]
    InvalidFormat(String),

    #[error("OEIS request failed: {0}")]
    Http(String),

    #[error("OEIS returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("OEIS search returned no results for {0}")]
    NoResults(String),

    #[error("malformed OEIS record: {0}")]
    MalformedRecord(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}
