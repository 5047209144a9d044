use std::fs;
use std::sync::Mutex;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use serde_json::json;

use oeis_tools::bfile::BFileInfo;
use oeis_tools::client::OeisClient;
use oeis_tools::error::OeisError;
use oeis_tools::sequence::{Offset, Sequence};

/// Serves the JSON record for search URLs and `bfile` for everything else.
struct MockClient {
    json: Result<String, OeisError>,
    bfile: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockClient {
    fn new(json: String, bfile: Option<&str>) -> Self {
        Self {
            json: Ok(json),
            bfile: bfile.map(str::to_string),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: OeisError) -> Self {
        Self {
            json: Err(err),
            bfile: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl OeisClient for MockClient {
    fn get_text(&self, url: &str) -> Result<String, OeisError> {
        self.calls.lock().unwrap().push(url.to_string());
        if url.contains("/search?") {
            return match &self.json {
                Ok(body) => Ok(body.clone()),
                Err(OeisError::Status { status, message }) => Err(OeisError::Status {
                    status: *status,
                    message: message.clone(),
                }),
                Err(other) => Err(OeisError::Http(other.to_string())),
            };
        }
        self.bfile
            .clone()
            .ok_or_else(|| OeisError::Status {
                status: 404,
                message: "no b-file".to_string(),
            })
    }
}

fn payload() -> String {
    json!([{
        "id": "M1234 N5678",
        "data": "1,1,2,3,5,8",
        "name": "Fibonacci numbers",
        "comment": ["First comment", "Second comment"],
        "reference": ["Ref A", "Ref B"],
        "formula": ["a(n)=a(n-1)+a(n-2)"],
        "example": ["a(5)=5"],
        "maple": ["seq(fibonacci(n),n=0..10);"],
        "mathematica": ["Table[Fibonacci[n], {n,0,10}]"],
        "program": ["Python: ..."],
        "xref": ["Cf. A000204"],
        "keyword": "nonn",
        "offset": "0,2",
        "author": "N. J. A. Sloane",
        "references": ["Some extra reference"],
        "revision": "42",
        "time": "2024-01-02 03:04:05",
        "created": "2000-01-01 00:00:00",
        "link": [
            "<a href=\"/A000045\">Main entry</a>",
            "<a href=\"https://example.com/ref\">External ref</a>",
            "See also <a href=\"/wiki\">wiki</a>"
        ]
    }])
    .to_string()
}

#[test]
fn sequence_parses_json_fields_and_builds_links() {
    let client = MockClient::new(payload(), None);
    let seq = Sequence::fetch("A000045", &client).unwrap();
    let record = seq.record();

    assert_eq!(seq.id().as_str(), "A000045");
    assert_eq!(record.m_id.as_deref(), Some("M1234"));
    assert_eq!(record.n_id.as_deref(), Some("N5678"));
    assert_eq!(seq.name(), "Fibonacci numbers");
    assert_eq!(seq.data(), "1,1,2,3,5,8");
    assert_eq!(record.comment, "First comment\nSecond comment");
    assert_eq!(record.reference, "Ref A\nRef B");
    assert_eq!(record.keywords, vec!["nonn"]);
    assert_eq!(record.authors, vec!["N. J. A. Sloane"]);
    assert_eq!(
        record.offset,
        Some(Offset {
            first_index: 0,
            first_large: Some(2)
        })
    );
    assert_eq!(record.references, Some(1));
    assert_eq!(record.references_text, "Some extra reference");
    assert_eq!(record.revision, Some(42));
    assert_eq!(
        record.modified.unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    );
    assert_eq!(
        record.created.unwrap(),
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    );

    let links = record.link_text();
    assert!(links.contains("[Main entry](https://oeis.org/A000045)"));
    assert!(links.contains("[External ref](https://example.com/ref)"));
    assert!(links.contains("[wiki](https://oeis.org/wiki)"));

    assert_eq!(
        client.calls(),
        vec!["https://oeis.org/search?q=id:A000045&fmt=json"]
    );
    assert!(!seq.bfile().is_fetched());
}

#[test]
fn sequence_parses_fixture() {
    let body = fs::read_to_string("tests/fixtures/oeis_A000045.json").unwrap();
    let client = MockClient::new(body, None);
    let seq = Sequence::fetch("A000045", &client).unwrap();
    let record = seq.record();

    assert_eq!(record.number, Some(45));
    assert!(seq.name().starts_with("Fibonacci numbers"));
    let terms = record.terms.as_ref().unwrap();
    assert_eq!(terms.len(), 41);
    assert_eq!(terms[10], BigInt::from(55));
    assert_eq!(record.authors, vec!["N. J. A. Sloane"]);
    assert!(record.keywords.contains(&"core".to_string()));
    assert_eq!(record.references, Some(3052));
    assert_eq!(record.references_text, "");
    assert_eq!(record.revision, Some(3200));
    assert_eq!(record.links.len(), 3);
    assert_eq!(
        record.links[0],
        "[The first 2000 Fibonacci numbers: Table of n, F(n) for n = 0..2000](https://oeis.org/A000045/b000045.txt)"
    );
    assert_eq!(
        record.links[2],
        "Index entries for linear recurrences with constant coefficients, signature (1,1)."
    );
    assert_eq!(
        record.modified.unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 6, 0, 51, 36).unwrap()
    );
    assert_eq!(record.mathematica, "Fibonacci[Range[0, 40]]");
}

#[test]
fn sequence_rejects_invalid_oeis_id() {
    let client = MockClient::new(payload(), None);
    let err = Sequence::fetch("invalid-id", &client).err().unwrap();
    assert_matches!(err, OeisError::InvalidId(_));
    assert!(err.to_string().contains("Invalid OEIS ID"));
    assert!(client.calls().is_empty());
}

#[test]
fn sequence_propagates_http_error() {
    let client = MockClient::failing(OeisError::Status {
        status: 500,
        message: "request failed".to_string(),
    });
    let err = Sequence::fetch("A000001", &client).err().unwrap();
    assert_matches!(err, OeisError::Status { status: 500, ref message } if message == "request failed");
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn sequence_without_results_is_an_error() {
    let client = MockClient::new(r#"{"greeting": "hi", "count": 0, "results": null}"#.to_string(), None);
    let err = Sequence::fetch("A999999", &client).err().unwrap();
    assert_matches!(err, OeisError::NoResults(id) if id == "A999999");
}

#[test]
fn bfile_info_reports_length_and_memoizes() {
    let client = MockClient::new(payload(), Some("0 0\n1 1\n2 1\n3 2\n"));
    let seq = Sequence::fetch("A000045", &client).unwrap();

    let expected = BFileInfo {
        available: true,
        length: Some(4),
    };
    assert_eq!(seq.bfile_info(), expected);
    assert_eq!(seq.bfile_info(), expected);
    assert_eq!(
        client.calls(),
        vec![
            "https://oeis.org/search?q=id:A000045&fmt=json",
            "https://oeis.org/A000045/b000045.txt",
        ]
    );
}

#[test]
fn bfile_info_degrades_when_missing() {
    let client = MockClient::new(payload(), None);
    let seq = Sequence::fetch("A000045", &client).unwrap();
    assert_eq!(seq.bfile_info(), BFileInfo::UNAVAILABLE);
}

#[test]
fn bfile_info_degrades_on_malformed_body() {
    let client = MockClient::new(payload(), Some("0 0\n<html>oops</html>\n"));
    let seq = Sequence::fetch("A000045", &client).unwrap();
    assert_eq!(
        seq.bfile_info(),
        BFileInfo {
            available: false,
            length: None
        }
    );
}

#[test]
fn record_serializes_terms_as_strings() {
    let client = MockClient::new(payload(), None);
    let seq = Sequence::fetch("A000045", &client).unwrap();
    let value = serde_json::to_value(seq.record()).unwrap();
    assert_eq!(value["id"], "A000045");
    assert_eq!(value["terms"], json!(["1", "1", "2", "3", "5", "8"]));
}

#[test]
fn non_numeric_listing_still_constructs() {
    let body = json!([{"name": "x", "data": "1,2,3,..."}]).to_string();
    let client = MockClient::new(body, None);
    let seq = Sequence::fetch("A000045", &client).unwrap();

    assert_eq!(seq.name(), "x");
    assert_eq!(seq.data(), "1,2,3,...");
    assert_eq!(seq.record().terms, None);
    let value = serde_json::to_value(seq.record()).unwrap();
    assert!(value["terms"].is_null());
}

#[test]
fn blank_timestamps_and_missing_data_still_construct() {
    let body = json!([{
        "name": "Number of groups of order n.",
        "created": "",
        "time": "",
        "keyword": "nonn,core",
        "author": "_N. J. A. Sloane_"
    }])
    .to_string();
    let client = MockClient::new(body, None);
    let seq = Sequence::fetch("A000001", &client).unwrap();
    let record = seq.record();

    assert_eq!(seq.name(), "Number of groups of order n.");
    assert_eq!(seq.data(), "");
    assert_eq!(record.terms, Some(Vec::new()));
    assert_eq!(record.created, None);
    assert_eq!(record.modified, None);
    assert_eq!(record.offset, None);
    assert_eq!(record.keywords, vec!["nonn", "core"]);
    assert_eq!(record.authors, vec!["N. J. A. Sloane"]);
}

#[test]
fn string_fields_round_trip_verbatim() {
    let name = "Triangle read by rows: T(n,k) = \"weird\" <b>markup</b>, ünïcode";
    let data = " 1, 2 ,3,x";
    let body = json!([{"name": name, "data": data, "comment": "single line"}]).to_string();
    let client = MockClient::new(body, None);
    let seq = Sequence::fetch("A000045", &client).unwrap();

    assert_eq!(seq.name(), name);
    assert_eq!(seq.data(), data);
    assert_eq!(seq.record().comment, "single line");
    assert_eq!(seq.raw().data.as_deref(), Some(data));
}
