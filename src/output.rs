use std::io::{self, Write};

use serde::Serialize;

use crate::bfile::BFileInfo;
use crate::sequence::SequenceRecord;

#[derive(Debug, Clone, Serialize)]
pub struct UrlResult {
    pub id: String,
    pub format: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoResult<'a> {
    #[serde(flatten)]
    pub record: &'a SequenceRecord,
    pub bfile: BFileInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct BFileResult {
    pub id: String,
    pub filename: String,
    pub url: String,
    #[serde(flatten)]
    pub info: BFileInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_url(result: &UrlResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_info(result: &InfoResult<'_>) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_bfile(result: &BFileResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
