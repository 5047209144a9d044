use std::sync::OnceLock;

use num_bigint::BigInt;
use serde::Serialize;

use crate::client::OeisClient;
use crate::domain::{OeisId, ResourceFormat, build_filename, resource_url};
use crate::error::OeisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BFileInfo {
    pub available: bool,
    pub length: Option<usize>,
}

impl BFileInfo {
    pub const UNAVAILABLE: BFileInfo = BFileInfo {
        available: false,
        length: None,
    };
}

pub struct BFile<C: OeisClient> {
    id: OeisId,
    filename: String,
    url: String,
    client: C,
    data: OnceLock<Option<Vec<BigInt>>>,
}

impl<C: OeisClient> BFile<C> {
    pub fn new(id: &str, client: C) -> Result<Self, OeisError> {
        let id: OeisId = id.parse()?;
        Ok(Self::for_id(id, client))
    }

    pub fn for_id(id: OeisId, client: C) -> Self {
        let filename = build_filename(&id);
        let url = resource_url(client.base_url(), &id, ResourceFormat::BFile);
        Self {
            id,
            filename,
            url,
            client,
            data: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &OeisId {
        &self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn data(&self) -> Option<&[BigInt]> {
        self.data.get_or_init(|| self.fetch()).as_deref()
    }

    pub fn is_fetched(&self) -> bool {
        self.data.get().is_some()
    }

    pub fn info(&self) -> BFileInfo {
        match self.data() {
            Some(values) => BFileInfo {
                available: true,
                length: Some(values.len()),
            },
            None => BFileInfo::UNAVAILABLE,
        }
    }

    fn fetch(&self) -> Option<Vec<BigInt>> {
        let body = match self.client.get_text(&self.url) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(id = %self.id, error = %err, "b-file unavailable");
                return None;
            }
        };
        let parsed = parse_bfile(&body);
        if parsed.is_none() {
            tracing::warn!(id = %self.id, url = %self.url, "b-file body is malformed");
        }
        parsed
    }
}

// Fail-closed: one line that is not `n a(n)` rejects the whole body.
pub fn parse_bfile(body: &str) -> Option<Vec<BigInt>> {
    let mut values = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(index), Some(value), None) = (fields.next(), fields.next(), fields.next())
        else {
            return None;
        };
        index.parse::<i64>().ok()?;
        values.push(value.parse::<BigInt>().ok()?);
    }
    Some(values)
}
