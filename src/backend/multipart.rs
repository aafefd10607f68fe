//! Minimal multipart/form-data encoding for the single-file upload.

const CRLF: &str = "\r\n";

/// Encode one file as a multipart/form-data body.
///
/// Returns the `Content-Type` header value (carrying the boundary) and the
/// encoded body bytes.
pub(crate) fn file_form(
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> (String, Vec<u8>) {
    let boundary = format!("----tablescope-{:032x}", rand::random::<u128>());
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}{CRLF}").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{}\"{CRLF}",
            sanitize_filename(filename)
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}{CRLF}{CRLF}").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("{CRLF}--{boundary}--{CRLF}").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Keep header syntax intact no matter what the picked file is called.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\r' | '\n' | '\\' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_headers_and_payload() {
        let (content_type, body) = file_form("file", "data.csv", "text/csv", b"a,b\n1,2\n");
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("Content-Disposition: form-data; name=\"file\"; filename=\"data.csv\"\r\n"));
        assert!(text.contains("Content-Type: text/csv\r\n\r\na,b\n1,2\n"));
        assert!(text.ends_with(&format!("\r\n--{boundary}--\r\n")));
    }

    #[test]
    fn boundaries_differ_between_forms() {
        let (first, _) = file_form("file", "a.csv", "text/csv", b"");
        let (second, _) = file_form("file", "a.csv", "text/csv", b"");
        assert_ne!(first, second);
    }

    #[test]
    fn hostile_filenames_cannot_break_the_header() {
        let (_, body) = file_form("file", "x\"\r\nEvil: yes", "text/csv", b"");
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("filename=\"x___Evil: yes\""));
        assert!(!text.contains("Evil: yes\r\n"));
    }
}
