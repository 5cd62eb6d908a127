//! Extraction of a [`JobRequest`] from raw HTTP parts
//!
//! The pipeline is framework-agnostic: whatever HTTP layer fronts it
//! hands over headers, form fields, and an optional uploaded file, and
//! this module turns them into the typed request model. Header lookup is
//! case-insensitive because proxies rewrite header casing.

use bloomcast_core::{headers, JobInput, JobRequest, RequestError, UrlInput};
use std::collections::HashMap;
use tracing::debug;

/// Form field names consumed by extraction itself; everything else
/// becomes a per-job option.
const KNOWN_FIELDS: &[&str] = &[
    "job_id",
    "completion_mode",
    "input_text",
    "input_url",
    "input_name",
    "input_mime",
    "input_size",
    "return_pdf_base64",
];

/// Raw request parts as received by the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Multipart/form fields
    pub fields: HashMap<String, String>,
    /// Uploaded file, as (declared filename, raw bytes)
    pub file: Option<(Option<String>, Vec<u8>)>,
}

/// Build a [`JobRequest`] from raw parts
///
/// Input precedence when several are supplied: uploaded file, then
/// `input_text`, then `input_url`. Exactly one is required.
pub fn extract_request(raw: RawRequest) -> bloomcast_core::Result<JobRequest> {
    let timestamp_raw = header(&raw.headers, headers::TIMESTAMP)
        .ok_or(RequestError::MissingField(headers::TIMESTAMP))?;
    let timestamp: i64 = timestamp_raw
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidField(headers::TIMESTAMP))?;

    let idempotency_key = header(&raw.headers, headers::IDEMPOTENCY_KEY)
        .ok_or(RequestError::MissingField(headers::IDEMPOTENCY_KEY))?;
    let signature = header(&raw.headers, headers::SIGNATURE)
        .ok_or(RequestError::MissingField(headers::SIGNATURE))?;

    let job_id = field(&raw.fields, "job_id").ok_or(RequestError::MissingField("job_id"))?;

    let input = extract_input(&raw)?;

    let options: HashMap<String, String> = raw
        .fields
        .iter()
        .filter(|(name, _)| !KNOWN_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    if !options.is_empty() {
        debug!(count = options.len(), "request carries per-job options");
    }

    let mut request =
        JobRequest::new(job_id, timestamp, idempotency_key, signature, input).with_options(options);
    if let Some(mode) = field(&raw.fields, "completion_mode") {
        request = request.with_completion_mode(mode);
    }
    Ok(request)
}

fn extract_input(raw: &RawRequest) -> bloomcast_core::Result<JobInput> {
    if let Some((name, bytes)) = &raw.file {
        return Ok(JobInput::File {
            name: name.clone(),
            bytes: bytes.clone(),
        });
    }
    if let Some(text) = field(&raw.fields, "input_text") {
        return Ok(JobInput::Text(text));
    }
    if let Some(url) = field(&raw.fields, "input_url") {
        let size = field(&raw.fields, "input_size")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        return Ok(JobInput::Url(UrlInput {
            url,
            name: field(&raw.fields, "input_name").unwrap_or_default(),
            mime: field(&raw.fields, "input_mime").unwrap_or_default(),
            size,
        }));
    }
    Err(RequestError::MissingField("input"))
}

/// Case-insensitive header lookup
fn header(headers: &HashMap<String, String>, name: &str) -> Option<String> {
    headers.get(name).cloned().or_else(|| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    })
}

fn field(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields.get(name).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_text() -> RawRequest {
        let mut headers = HashMap::new();
        headers.insert(headers::TIMESTAMP.to_string(), "1700000000".to_string());
        headers.insert(headers::IDEMPOTENCY_KEY.to_string(), "idem-1".to_string());
        headers.insert(headers::SIGNATURE.to_string(), "v1=abc".to_string());
        let mut fields = HashMap::new();
        fields.insert("job_id".to_string(), "job-0042".to_string());
        fields.insert("input_text".to_string(), "a,b\n1,2".to_string());
        RawRequest {
            headers,
            fields,
            file: None,
        }
    }

    #[test]
    fn test_extract_text_request() {
        let request = extract_request(raw_with_text()).unwrap();
        assert_eq!(request.job_id, "job-0042");
        assert_eq!(request.timestamp, 1_700_000_000);
        assert_eq!(request.idempotency_key, "idem-1");
        assert!(matches!(request.input, JobInput::Text(_)));
        assert_eq!(request.completion_mode, "review");
    }

    #[test]
    fn test_headers_case_insensitive() {
        let mut raw = raw_with_text();
        let ts = raw.headers.remove(headers::TIMESTAMP).unwrap();
        raw.headers.insert("x-taskyard-timestamp".to_string(), ts);
        assert!(extract_request(raw).is_ok());
    }

    #[test]
    fn test_missing_signature_header() {
        let mut raw = raw_with_text();
        raw.headers.remove(headers::SIGNATURE);
        assert_eq!(
            extract_request(raw).unwrap_err(),
            RequestError::MissingField(headers::SIGNATURE)
        );
    }

    #[test]
    fn test_non_integer_timestamp_rejected() {
        let mut raw = raw_with_text();
        raw.headers
            .insert(headers::TIMESTAMP.to_string(), "yesterday".to_string());
        assert!(matches!(
            extract_request(raw),
            Err(RequestError::InvalidField(_))
        ));
    }

    #[test]
    fn test_file_takes_precedence_over_text() {
        let mut raw = raw_with_text();
        raw.file = Some((Some("orders.xlsx".to_string()), vec![1, 2, 3]));
        let request = extract_request(raw).unwrap();
        assert!(matches!(request.input, JobInput::File { .. }));
    }

    #[test]
    fn test_url_input_with_descriptor_fields() {
        let mut raw = raw_with_text();
        raw.fields.remove("input_text");
        raw.fields
            .insert("input_url".to_string(), "https://files.example/wb.xlsx".to_string());
        raw.fields.insert("input_name".to_string(), "wb.xlsx".to_string());
        raw.fields.insert("input_size".to_string(), "2048".to_string());
        let request = extract_request(raw).unwrap();
        match request.input {
            JobInput::Url(url) => {
                assert_eq!(url.url, "https://files.example/wb.xlsx");
                assert_eq!(url.size, 2048);
            }
            other => panic!("expected url input, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_input_rejected() {
        let mut raw = raw_with_text();
        raw.fields.remove("input_text");
        assert_eq!(
            extract_request(raw).unwrap_err(),
            RequestError::MissingField("input")
        );
    }

    #[test]
    fn test_unknown_fields_become_options() {
        let mut raw = raw_with_text();
        raw.fields
            .insert("HISTORY_CLIENT_SHEET".to_string(), "Verkoop".to_string());
        raw.fields
            .insert("PEER_WEIGHT".to_string(), "0.3".to_string());
        let request = extract_request(raw).unwrap();
        assert_eq!(
            request.options.get("HISTORY_CLIENT_SHEET").map(String::as_str),
            Some("Verkoop")
        );
        assert_eq!(request.options.len(), 2);
    }
}
