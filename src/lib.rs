pub mod bfile;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod sequence;

pub use bfile::{BFile, BFileInfo, parse_bfile};
pub use client::{OeisClient, OeisHttpClient};
pub use config::{ClientConfig, ConfigLoader};
pub use domain::{
    OEIS_URL, OeisId, ResourceFormat, build_filename, build_url, check_id, resource_url,
};
pub use error::OeisError;
pub use sequence::{Offset, RawEntry, Sequence, SequenceRecord};
