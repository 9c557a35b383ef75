use serde_json::json;

pub const TOOL_READ_DOCUMENT_CONTENTS: &str = "read_document_contents";
pub const TOOL_SAVE_TO_EXCEL: &str = "save_to_excel";

pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_OUTPUT_BYTES: u64 = 20 * 1024 * 1024;

pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub fn read_document_contents_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "path": { "type": "string" },
            "base64": { "type": "string" }
        },
        "oneOf": [
            { "required": ["path"] },
            { "required": ["base64"] }
        ],
        "additionalProperties": false
    })
}

pub fn save_to_excel_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "html_content": { "type": "string" },
            "html_path": { "type": "string" },
            "output_path": { "type": "string" }
        },
        "oneOf": [
            { "required": ["html_content"] },
            { "required": ["html_path"] }
        ],
        "additionalProperties": false
    })
}

pub fn input_schema(tool: &str) -> serde_json::Value {
    match tool {
        TOOL_READ_DOCUMENT_CONTENTS => read_document_contents_schema(),
        TOOL_SAVE_TO_EXCEL => save_to_excel_schema(),
        _ => json!({ "type": "object" }),
    }
}
