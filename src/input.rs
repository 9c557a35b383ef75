use crate::mcp::contracts::MAX_INPUT_BYTES;
use crate::mcp::errors;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct InputPayload {
    pub bytes: Vec<u8>,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct HtmlPayload {
    pub html: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct InputError {
    pub kind: &'static str,
    pub message: String,
}

impl InputError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(errors::INVALID_INPUT, message)
    }

    fn too_large(message: impl Into<String>) -> Self {
        Self::new(errors::TOO_LARGE, message)
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for InputError {}

/// Document bytes from exactly one of `path` or `base64`.
pub fn load_input(args: &Value) -> Result<InputPayload, InputError> {
    let obj = as_object(args)?;

    match exclusive(obj, "path", "base64")? {
        Source::First(value) => {
            let path = value
                .as_str()
                .ok_or_else(|| InputError::invalid_input("path must be a string"))?;
            let bytes = read_file(path)?;
            Ok(InputPayload {
                bytes,
                source: format!("path:{path}"),
            })
        }
        Source::Second(value) => {
            let base64_str = value
                .as_str()
                .ok_or_else(|| InputError::invalid_input("base64 must be a string"))?;
            let bytes = STANDARD
                .decode(base64_str.as_bytes())
                .map_err(|_| InputError::invalid_input("base64 must be valid"))?;
            check_len(bytes.len() as u64)?;
            Ok(InputPayload {
                bytes,
                source: "base64".to_string(),
            })
        }
    }
}

/// HTML text from exactly one of `html_content` or `html_path`.
pub fn load_html(args: &Value) -> Result<HtmlPayload, InputError> {
    let obj = as_object(args)?;

    match exclusive(obj, "html_content", "html_path")? {
        Source::First(value) => {
            let html = value
                .as_str()
                .ok_or_else(|| InputError::invalid_input("html_content must be a string"))?;
            check_len(html.len() as u64)?;
            Ok(HtmlPayload {
                html: html.to_string(),
                source: "html_content".to_string(),
            })
        }
        Source::Second(value) => {
            let path = value
                .as_str()
                .ok_or_else(|| InputError::invalid_input("html_path must be a string"))?;
            let bytes = read_file(path)?;
            let html = String::from_utf8(bytes)
                .map_err(|_| InputError::invalid_input("html_path must contain UTF-8 text"))?;
            Ok(HtmlPayload {
                html,
                source: format!("path:{path}"),
            })
        }
    }
}

enum Source<'a> {
    First(&'a Value),
    Second(&'a Value),
}

fn as_object(args: &Value) -> Result<&Map<String, Value>, InputError> {
    args.as_object()
        .ok_or_else(|| InputError::invalid_input("arguments must be an object"))
}

fn exclusive<'a>(
    obj: &'a Map<String, Value>,
    first: &str,
    second: &str,
) -> Result<Source<'a>, InputError> {
    match (obj.get(first), obj.get(second)) {
        (None, None) => Err(InputError::invalid_input(format!(
            "either {first} or {second} is required"
        ))),
        (Some(_), Some(_)) => Err(InputError::invalid_input(format!(
            "{first} and {second} cannot both be set"
        ))),
        (Some(value), None) => Ok(Source::First(value)),
        (None, Some(value)) => Ok(Source::Second(value)),
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, InputError> {
    let path_ref = Path::new(path);
    let metadata = fs::metadata(path_ref)
        .map_err(|_| InputError::invalid_input("path must exist and be a file"))?;
    if !metadata.is_file() {
        return Err(InputError::invalid_input("path must be a file"));
    }
    check_len(metadata.len())?;
    fs::read(path_ref).map_err(|_| InputError::invalid_input("failed to read path contents"))
}

fn check_len(len: u64) -> Result<(), InputError> {
    if len > MAX_INPUT_BYTES {
        return Err(InputError::too_large(format!(
            "input exceeds limit: {len} bytes (max {MAX_INPUT_BYTES})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn base64_ok() {
        let encoded = STANDARD.encode(b"hello");
        let args = json!({"base64": encoded});
        let payload = load_input(&args).expect("payload");
        assert_eq!(payload.bytes, b"hello");
        assert_eq!(payload.source, "base64");
    }

    #[test]
    fn base64_invalid() {
        let args = json!({"base64": "not@@@"});
        let err = load_input(&args).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }

    #[test]
    fn missing_input() {
        let err = load_input(&json!({})).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
        assert_eq!(err.message, "either path or base64 is required");
    }

    #[test]
    fn arguments_not_object() {
        let err = load_input(&json!(["path"])).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }

    #[test]
    fn both_present() {
        let encoded = STANDARD.encode(b"hello");
        let args = json!({"path": "./report.pdf", "base64": encoded});
        let err = load_input(&args).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }

    #[test]
    fn path_not_found() {
        let args = json!({"path": "/tmp/definitely-missing-document-tools-file.pdf"});
        let err = load_input(&args).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }

    #[test]
    fn path_is_dir() {
        let dir = tempdir().expect("tempdir");
        let args = json!({"path": dir.path().to_string_lossy()});
        let err = load_input(&args).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }

    #[test]
    fn too_large() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("large.pdf");
        let file = File::create(&file_path).expect("file");
        file.set_len(MAX_INPUT_BYTES + 1).expect("set_len");
        let args = json!({"path": file_path.to_string_lossy()});
        let err = load_input(&args).expect_err("error");
        assert_eq!(err.kind, errors::TOO_LARGE);
    }

    #[test]
    fn html_inline() {
        let args = json!({"html_content": "<table></table>"});
        let payload = load_html(&args).expect("payload");
        assert_eq!(payload.html, "<table></table>");
        assert_eq!(payload.source, "html_content");
    }

    #[test]
    fn html_from_path() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("tables.html");
        fs::write(&file_path, "<table><tr><td>1</td></tr></table>").expect("write");
        let args = json!({"html_path": file_path.to_string_lossy()});
        let payload = load_html(&args).expect("payload");
        assert!(payload.html.contains("<td>1</td>"));
        assert!(payload.source.starts_with("path:"));
    }

    #[test]
    fn html_path_not_utf8() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("binary.html");
        fs::write(&file_path, [0xff, 0xfe, 0x00]).expect("write");
        let args = json!({"html_path": file_path.to_string_lossy()});
        let err = load_html(&args).expect_err("error");
        assert_eq!(err.kind, errors::INVALID_INPUT);
    }

    #[test]
    fn html_both_present() {
        let args = json!({"html_content": "<p/>", "html_path": "/tmp/x.html"});
        let err = load_html(&args).expect_err("error");
        assert_eq!(err.message, "html_content and html_path cannot both be set");
    }
}
