use bytes::Bytes;

use crate::error::{ConnectorError, Result};

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

pub fn boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim().to_ascii_lowercase();
    if !mime.starts_with("multipart/") {
        return None;
    }
    params
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Splits a multipart body into its parts. Only `CRLF--boundary` closes a
/// part, so boundary text inside a line of payload is kept.
pub fn decode(body: &[u8], boundary: &str) -> Result<Vec<FormPart>> {
    let opening = format!("--{boundary}").into_bytes();
    let delimiter = format!("\r\n--{boundary}").into_bytes();
    let mut cursor = find(body, &opening, 0)
        .ok_or_else(|| framing("no opening boundary"))?
        + opening.len();
    let mut parts = Vec::new();

    loop {
        if body[cursor..].starts_with(b"--") {
            return Ok(parts);
        }
        let start = skip_line_end(body, cursor);
        let next = find(body, &delimiter, start).ok_or_else(|| framing("missing closing boundary"))?;
        let segment = &body[start..next];
        parts.push(parse_part(segment)?);
        cursor = next + delimiter.len();
    }
}

fn parse_part(segment: &[u8]) -> Result<FormPart> {
    let (head, body) = match find(segment, HEADER_END, 0) {
        Some(pos) => (&segment[..pos], &segment[pos + HEADER_END.len()..]),
        None if segment.starts_with(CRLF) => (&segment[..0], &segment[CRLF.len()..]),
        None => return Err(framing("part without header block")),
    };
    let head = std::str::from_utf8(head).map_err(|e| framing(&e.to_string()))?;

    let mut name = None;
    let mut content_type = None;
    for line in head.split("\r\n") {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("content-disposition") {
            name = value
                .split(';')
                .filter_map(|param| param.trim().split_once('='))
                .find(|(k, _)| k.trim() == "name")
                .map(|(_, v)| v.trim().trim_matches('"').to_string());
        } else if key.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    Ok(FormPart {
        name,
        content_type,
        body: Bytes::copy_from_slice(body),
    })
}

fn skip_line_end(body: &[u8], at: usize) -> usize {
    if body[at..].starts_with(CRLF) {
        at + CRLF.len()
    } else if body[at..].starts_with(b"\n") {
        at + 1
    } else {
        at
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

fn framing(reason: &str) -> ConnectorError {
    ConnectorError::MessageTransport(format!("malformed multipart reply: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_boundary_parameter() {
        assert_eq!(
            boundary("multipart/form-data; boundary=\"abc123\"").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            boundary("multipart/mixed;charset=utf-8;BOUNDARY=xyz").as_deref(),
            Some("xyz")
        );
        assert_eq!(boundary("application/json"), None);
        assert_eq!(boundary("multipart/form-data"), None);
    }

    const BODY: &[u8] = b"--b0undary\r\n\
Content-Disposition: form-data; name=\"header\"\r\n\
Content-Type: application/ld+json\r\n\
\r\n\
{\"a\":1}\r\n\
--b0undary\r\n\
Content-Disposition: form-data; name=\"payload\"\r\n\
\r\n\
line one --b0undary inside\r\n\
--b0undary--\r\n";

    #[test]
    fn splits_named_parts() {
        let parts = decode(BODY, "b0undary").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name.as_deref(), Some("header"));
        assert_eq!(parts[0].content_type.as_deref(), Some("application/ld+json"));
        assert_eq!(parts[0].body.as_ref(), b"{\"a\":1}");
        assert_eq!(parts[1].name.as_deref(), Some("payload"));
        assert_eq!(parts[1].content_type, None);
    }

    #[test]
    fn boundary_text_inside_a_line_is_payload() {
        let parts = decode(BODY, "b0undary").unwrap();
        assert_eq!(parts[1].body.as_ref(), b"line one --b0undary inside");
    }

    #[test]
    fn empty_part_body() {
        let body = b"--xx\r\nContent-Disposition: form-data; name=\"payload\"\r\n\r\n\r\n--xx--\r\n";
        let parts = decode(body, "xx").unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].body.is_empty());
    }

    #[test]
    fn truncated_body_is_a_transport_error() {
        let err = decode(&BODY[..BODY.len() - 14], "b0undary").unwrap_err();
        assert!(matches!(err, ConnectorError::MessageTransport(_)));

        let err = decode(b"no boundary here", "xx").unwrap_err();
        assert!(matches!(err, ConnectorError::MessageTransport(_)));
    }
}
