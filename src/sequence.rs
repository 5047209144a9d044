use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use num_bigint::BigInt;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::bfile::{BFile, BFileInfo};
use crate::client::OeisClient;
use crate::domain::{OeisId, ResourceFormat, resource_url};
use crate::error::OeisError;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]*)">(.*?)</a>"#).unwrap());
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_([^_]+)_").unwrap());

const NAIVE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// Emitted as a list of lines, a string or a number depending on the entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Field {
    Number(i64),
    Text(String),
    Lines(Vec<String>),
}

impl Field {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Field::Number(value) => vec![value.to_string()],
            Field::Text(value) => vec![value.clone()],
            Field::Lines(lines) => lines.clone(),
        }
    }

    pub fn joined(&self) -> String {
        match self {
            Field::Lines(lines) => lines.join("\n"),
            other => other.lines().concat(),
        }
    }

    fn as_count(&self) -> Option<u64> {
        match self {
            Field::Number(value) => u64::try_from(*value).ok(),
            Field::Text(value) => value.trim().parse().ok(),
            Field::Lines(lines) => Some(lines.len() as u64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawEntry {
    pub number: Option<u64>,
    pub id: Option<String>,
    pub data: Option<String>,
    pub name: Option<String>,
    pub comment: Option<Field>,
    pub reference: Option<Field>,
    pub formula: Option<Field>,
    pub example: Option<Field>,
    pub maple: Option<Field>,
    pub mathematica: Option<Field>,
    pub program: Option<Field>,
    pub xref: Option<Field>,
    pub keyword: Option<String>,
    pub offset: Option<String>,
    pub author: Option<String>,
    pub references: Option<Field>,
    pub revision: Option<Field>,
    pub time: Option<String>,
    pub created: Option<String>,
    pub link: Option<Field>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Records(Vec<RawEntry>),
    Search {
        #[serde(default)]
        results: Option<Vec<RawEntry>>,
    },
}

// Accepts a bare array, the older `{"count", "results"}` object, or `null`.
pub fn parse_envelope(id: &OeisId, body: &str) -> Result<RawEntry, OeisError> {
    let envelope: Option<Envelope> = serde_json::from_str(body)
        .map_err(|err| OeisError::MalformedRecord(format!("{id}: {err}")))?;
    let entries = match envelope {
        Some(Envelope::Records(entries)) => entries,
        Some(Envelope::Search { results }) => results.unwrap_or_default(),
        None => Vec::new(),
    };
    if entries.len() > 1 {
        tracing::warn!(%id, count = entries.len(), "search returned several entries, using the first");
    }
    entries
        .into_iter()
        .next()
        .ok_or_else(|| OeisError::NoResults(id.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Offset {
    pub first_index: i64,
    // position of the first term with |a(n)| > 1
    pub first_large: Option<i64>,
}

impl Offset {
    pub fn parse(value: &str) -> Option<Self> {
        let (first, rest) = match value.split_once(',') {
            Some((first, rest)) => (first, Some(rest)),
            None => (value, None),
        };
        let first_index = first.trim().parse().ok()?;
        let first_large = match rest {
            Some(rest) => Some(rest.trim().parse().ok()?),
            None => None,
        };
        Some(Self {
            first_index,
            first_large,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceRecord {
    pub id: OeisId,
    pub number: Option<u64>,
    pub m_id: Option<String>,
    pub n_id: Option<String>,
    pub name: String,
    pub data: String,
    #[serde(serialize_with = "serialize_terms")]
    pub terms: Option<Vec<BigInt>>,
    pub offset: Option<Offset>,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    pub links: Vec<String>,
    pub created: Option<DateTime<FixedOffset>>,
    pub modified: Option<DateTime<FixedOffset>>,
    pub comment: String,
    pub reference: String,
    pub formula: String,
    pub example: String,
    pub maple: String,
    pub mathematica: String,
    pub program: String,
    pub xref: String,
    pub references: Option<u64>,
    pub references_text: String,
    pub revision: Option<u64>,
}

impl SequenceRecord {
    pub fn from_raw(id: OeisId, raw: &RawEntry, base_url: &str) -> Result<Self, OeisError> {
        let malformed = |what: &str, value: &str| {
            OeisError::MalformedRecord(format!("{id}: unparseable {what} {value:?}"))
        };

        let data = raw.data.clone().unwrap_or_default();
        let terms = parse_terms(&data);

        let offset = match raw.offset.as_deref() {
            Some(value) if !value.trim().is_empty() => {
                Some(Offset::parse(value).ok_or_else(|| malformed("offset", value))?)
            }
            _ => None,
        };

        let created = match raw.created.as_deref() {
            Some(value) if !value.trim().is_empty() => {
                Some(parse_timestamp(value).ok_or_else(|| malformed("created", value))?)
            }
            _ => None,
        };
        let modified = match raw.time.as_deref() {
            Some(value) if !value.trim().is_empty() => {
                Some(parse_timestamp(value).ok_or_else(|| malformed("time", value))?)
            }
            _ => None,
        };

        let (m_id, n_id) = split_legacy_ids(raw.id.as_deref().unwrap_or_default());
        let links = raw
            .link
            .as_ref()
            .map(|field| field.lines())
            .unwrap_or_default()
            .iter()
            .map(|line| format_link(line, base_url))
            .collect();

        let text = |field: &Option<Field>| field.as_ref().map(Field::joined).unwrap_or_default();

        Ok(Self {
            number: raw.number,
            m_id,
            n_id,
            name: raw.name.clone().unwrap_or_default(),
            data,
            terms,
            offset,
            authors: parse_authors(raw.author.as_deref().unwrap_or_default()),
            keywords: parse_keywords(raw.keyword.as_deref().unwrap_or_default()),
            links,
            created,
            modified,
            comment: text(&raw.comment),
            reference: text(&raw.reference),
            formula: text(&raw.formula),
            example: text(&raw.example),
            maple: text(&raw.maple),
            mathematica: text(&raw.mathematica),
            program: text(&raw.program),
            xref: text(&raw.xref),
            references: raw.references.as_ref().and_then(Field::as_count),
            references_text: match &raw.references {
                Some(field @ (Field::Text(_) | Field::Lines(_))) => field.joined(),
                _ => String::new(),
            },
            revision: raw.revision.as_ref().and_then(Field::as_count),
            id,
        })
    }

    pub fn link_text(&self) -> String {
        self.links.join("\n")
    }
}

// One request at construction; the b-file is fetched on first use.
pub struct Sequence<C: OeisClient> {
    raw: RawEntry,
    record: SequenceRecord,
    bfile: BFile<C>,
}

impl<C: OeisClient> Sequence<C> {
    pub fn fetch(id: &str, client: C) -> Result<Self, OeisError> {
        let id: OeisId = id.parse()?;
        let url = resource_url(client.base_url(), &id, ResourceFormat::Json);
        tracing::debug!(%id, %url, "fetching sequence record");
        let body = client.get_text(&url)?;
        let raw = parse_envelope(&id, &body)?;
        let record = SequenceRecord::from_raw(id.clone(), &raw, client.base_url())?;
        Ok(Self {
            raw,
            record,
            bfile: BFile::for_id(id, client),
        })
    }

    pub fn id(&self) -> &OeisId {
        &self.record.id
    }

    pub fn raw(&self) -> &RawEntry {
        &self.raw
    }

    pub fn record(&self) -> &SequenceRecord {
        &self.record
    }

    pub fn into_record(self) -> SequenceRecord {
        self.record
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn data(&self) -> &str {
        &self.record.data
    }

    pub fn bfile(&self) -> &BFile<C> {
        &self.bfile
    }

    pub fn bfile_info(&self) -> BFileInfo {
        self.bfile.info()
    }
}

fn parse_terms(data: &str) -> Option<Vec<BigInt>> {
    data.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| term.parse().ok())
        .collect()
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    NAIVE_TIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

fn split_legacy_ids(value: &str) -> (Option<String>, Option<String>) {
    let mut m_id = None;
    let mut n_id = None;
    for part in value.split_whitespace() {
        if part.starts_with('M') {
            m_id.get_or_insert_with(|| part.to_string());
        } else if part.starts_with('N') {
            n_id.get_or_insert_with(|| part.to_string());
        }
    }
    (m_id, n_id)
}

fn parse_authors(value: &str) -> Vec<String> {
    let names: Vec<String> = AUTHOR_RE
        .captures_iter(value)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() && !value.trim().is_empty() {
        return vec![value.trim().to_string()];
    }
    names
}

fn parse_keywords(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

// `<a href="/A000045">F</a>` -> `[F](https://oeis.org/A000045)`
fn format_link(line: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if let Some(caps) = ANCHOR_RE.captures(line) {
        let target = &caps[1];
        let label = &caps[2];
        if target.starts_with('/') {
            return format!("[{label}]({base}{target})");
        }
        return format!("[{label}]({target})");
    }
    line.replace("href=\"/", &format!("href=\"{base}/"))
}

fn serialize_terms<S: Serializer>(
    terms: &Option<Vec<BigInt>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match terms {
        Some(terms) => serializer.collect_seq(terms.iter().map(|term| term.to_string())),
        None => serializer.serialize_none(),
    }
}
