use crate::kernel::{KernelFunction, Member, Param, ParamType, ToolSet};
use crate::mcp::contracts;
use serde_json::json;

pub mod read_document;
pub mod save_to_excel;

/// Document tools exposed to the HR agent.
pub struct DocumentTools;

impl ToolSet for DocumentTools {
    const AGENT_NAME: &'static str = "Hr_Agent";
    const FORMATTING_INSTRUCTIONS: &'static str = "Instructions: You help read documents, extract information, and save extracted table inforamtion to an excel file. ";

    fn members() -> Vec<Member> {
        vec![
            Member {
                name: contracts::TOOL_READ_DOCUMENT_CONTENTS,
                doc: None,
                kernel_function: Some(KernelFunction {
                    description: Some(
                        "Read contents of the data provided, extract tables and return them on HTML format.",
                    ),
                    handler: read_document::call,
                }),
                params: vec![Param::new("document", ParamType::Bytes)],
            },
            Member {
                name: contracts::TOOL_SAVE_TO_EXCEL,
                doc: Some(
                    "Converts HTML tables in the provided HTML content to an Excel file, one worksheet per table.",
                ),
                kernel_function: Some(KernelFunction {
                    description: Some("Save the extracted HTML tables to an Excel file."),
                    handler: save_to_excel::call,
                }),
                params: vec![Param::new("html_content", ParamType::Str)],
            },
            Member {
                name: "parse_html_tables",
                doc: Some("Splits HTML into header and body grids per table."),
                kernel_function: None,
                params: vec![Param::new("html_content", ParamType::Str)],
            },
        ]
    }
}

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> serde_json::Value {
    let message = message.into();
    tracing::warn!(kind, %message, source, "tool call failed");
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{generate_tools_json_doc, get_all_kernel_functions};
    use crate::mcp::errors;
    use serde_json::Value;

    #[test]
    fn formatting_instructions_are_verbatim() {
        assert_eq!(
            DocumentTools::FORMATTING_INSTRUCTIONS,
            "Instructions: You help read documents, extract information, and save extracted table inforamtion to an excel file. "
        );
    }

    #[test]
    fn exposes_both_document_tools() {
        let functions = get_all_kernel_functions::<DocumentTools>();
        let names: Vec<&str> = functions.keys().map(String::as_str).collect();
        assert_eq!(names, ["read_document_contents", "save_to_excel"]);
    }

    #[test]
    fn manifest_matches_framework_shape() {
        let manifest = generate_tools_json_doc::<DocumentTools>().expect("manifest");
        let parsed: Value = serde_json::from_str(&manifest).expect("json");
        let entries = parsed.as_array().expect("array");
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0]["agent"], "Hr_Agent");
        assert_eq!(entries[0]["function"], "read_document_contents");
        assert_eq!(
            entries[0]["description"],
            "Read contents of the data provided, extract tables and return them on HTML format."
        );
        assert_eq!(
            entries[0]["arguments"],
            "{'document': {'description': 'document', 'title': 'Document', 'type': 'bytes'}}"
        );

        assert_eq!(entries[1]["function"], "save_to_excel");
        assert_eq!(
            entries[1]["description"],
            "Save the extracted HTML tables to an Excel file."
        );
        assert_eq!(
            entries[1]["arguments"],
            "{'html_content': {'description': 'html_content', 'title': 'Html Content', 'type': 'str'}}"
        );
    }

    #[test]
    fn error_result_carries_source() {
        let result = error_result(errors::INVALID_INPUT, "bad", Some("base64"));
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["kind"], "invalid_input");
        assert_eq!(result["structuredContent"]["error"]["source"], "base64");
        assert_eq!(result["content"][0]["text"], "Error: bad");
    }
}
