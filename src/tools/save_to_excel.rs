use crate::html_tables::parse_tables;
use crate::input::load_html;
use crate::mcp::contracts::MAX_OUTPUT_BYTES;
use crate::mcp::errors;
use crate::tools::error_result;
use crate::workbook::{build_workbook, sheet_name};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn call(args: &Value) -> Value {
    let payload = match load_html(args) {
        Ok(payload) => payload,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let output_path = match parse_output_path(args.get("output_path")) {
        Ok(path) => path,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let tables = parse_tables(&payload.html);
    tracing::debug!(source = %payload.source, tables = tables.len(), "parsed html tables");

    let output_bytes = match build_workbook(&tables) {
        Ok(bytes) => bytes,
        Err(err) => return error_result(err.kind, err.message, Some(payload.source.as_str())),
    };

    let bytes_len = output_bytes.len() as u64;
    let sheets: Vec<String> = (0..tables.len()).map(sheet_name).collect();
    tracing::info!(sheets = sheets.len(), bytes_len, "built workbook");

    match output_path {
        Some(path) => match write_output(&path, &output_bytes) {
            Ok(output) => json!({
                "content": output.content,
                "structuredContent": {
                    "sheets": sheets,
                    "path": output.path,
                    "uri": output.uri,
                    "bytes_len": bytes_len
                },
                "isError": false
            }),
            Err(err) => error_result(err.kind, err.message, None),
        },
        None => {
            if bytes_len > MAX_OUTPUT_BYTES {
                return error_result(
                    errors::TOO_LARGE,
                    format!("output exceeds limit: {bytes_len} bytes (max {MAX_OUTPUT_BYTES})"),
                    None,
                );
            }
            let base64 = STANDARD.encode(&output_bytes);
            json!({
                "content": [{
                    "type": "text",
                    "text": format!("saved {} table(s) to xlsx ({bytes_len} bytes)", sheets.len())
                }],
                "structuredContent": {
                    "sheets": sheets,
                    "base64": base64,
                    "bytes_len": bytes_len
                },
                "isError": false
            })
        }
    }
}

struct ToolError {
    kind: &'static str,
    message: String,
}

struct OutputResource {
    path: String,
    uri: String,
    content: Vec<Value>,
}

fn parse_output_path(value: Option<&Value>) -> Result<Option<String>, ToolError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Some(path) = value.as_str() else {
        return Err(ToolError {
            kind: errors::INVALID_INPUT,
            message: "output_path must be a string".to_string(),
        });
    };
    if path.trim().is_empty() {
        return Err(ToolError {
            kind: errors::INVALID_INPUT,
            message: "output_path must not be empty".to_string(),
        });
    }
    Ok(Some(path.to_string()))
}

fn write_output(path: &str, bytes: &[u8]) -> Result<OutputResource, ToolError> {
    fs::write(path, bytes).map_err(|err| ToolError {
        kind: errors::INTERNAL_ERROR,
        message: format!("failed to write output: {err}"),
    })?;

    let uri = format!("file://{path}");
    let name = Path::new(path)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("output.xlsx");

    let content = vec![
        json!({
            "type": "text",
            "text": format!("workbook written to {path}")
        }),
        json!({
            "type": "resource_link",
            "uri": uri,
            "name": name,
            "mimeType": XLSX_MIME_TYPE
        }),
    ];

    Ok(OutputResource {
        path: path.to_string(),
        uri,
        content,
    })
}
