use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::OeisError;

pub const OEIS_URL: &str = "https://oeis.org";

const ID_PREFIX: char = 'A';
const ID_DIGITS: usize = 6;

pub fn check_id(candidate: &str) -> bool {
    let Some(digits) = candidate.strip_prefix(ID_PREFIX) else {
        return false;
    };
    digits.len() == ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OeisId(String);

impl OeisId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digits(&self) -> &str {
        &self.0[ID_PREFIX.len_utf8()..]
    }

    pub fn bfile_name(&self) -> String {
        build_filename(self)
    }
}

impl fmt::Display for OeisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OeisId {
    type Err = OeisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !check_id(value) {
            return Err(OeisError::InvalidId(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }
}

impl TryFrom<String> for OeisId {
    type Error = OeisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !check_id(&value) {
            return Err(OeisError::InvalidId(value));
        }
        Ok(Self(value))
    }
}

impl From<OeisId> for String {
    fn from(id: OeisId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFormat {
    #[default]
    Html,
    Json,
    Text,
    #[value(name = "bfile")]
    #[serde(rename = "bfile")]
    BFile,
}

impl fmt::Display for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceFormat::Html => write!(f, "html"),
            ResourceFormat::Json => write!(f, "json"),
            ResourceFormat::Text => write!(f, "text"),
            ResourceFormat::BFile => write!(f, "bfile"),
        }
    }
}

impl FromStr for ResourceFormat {
    type Err = OeisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "html" => Ok(ResourceFormat::Html),
            "json" => Ok(ResourceFormat::Json),
            "text" => Ok(ResourceFormat::Text),
            "bfile" => Ok(ResourceFormat::BFile),
            _ => Err(OeisError::InvalidFormat(value.to_string())),
        }
    }
}

pub fn build_filename(id: &OeisId) -> String {
    format!("b{}.txt", id.digits())
}

pub fn resource_url(base: &str, id: &OeisId, format: ResourceFormat) -> String {
    let base = base.trim_end_matches('/');
    match format {
        ResourceFormat::Html => format!("{base}/{id}"),
        ResourceFormat::Json => format!("{base}/search?q=id:{id}&fmt=json"),
        ResourceFormat::Text => format!("{base}/search?q=id:{id}&fmt=text"),
        ResourceFormat::BFile => format!("{base}/{id}/{}", build_filename(id)),
    }
}

pub fn build_url(id: &str, format: Option<&str>) -> Result<String, OeisError> {
    let id: OeisId = id.parse()?;
    let format = match format {
        Some(value) => value.parse()?,
        None => ResourceFormat::default(),
    };
    Ok(resource_url(OEIS_URL, &id, format))
}
