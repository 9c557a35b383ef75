use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use std::io::{self, BufRead, Write};
use std::process;

use document_tools::kernel::{
    ToolSet, generate_tools_json_doc, generate_tools_json_doc_for, get_all_kernel_functions,
};
use document_tools::tools::DocumentTools;
use document_tools::{logging, mcp, tools};

#[derive(Parser)]
#[command(name = "document-tools")]
#[command(
    version,
    about = "Document table tools and tool manifest for agent frameworks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(
    group(
        clap::ArgGroup::new("input")
            .required(true)
            .multiple(false)
            .args(["path", "base64"])
    )
)]
struct InputArgs {
    /// Path to the document
    #[arg(long)]
    path: Option<String>,
    /// Base64-encoded document bytes
    #[arg(long)]
    base64: Option<String>,
}

#[derive(Args, Clone)]
struct ReadDocumentArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
#[command(
    group(
        clap::ArgGroup::new("html")
            .required(true)
            .multiple(false)
            .args(["html_content", "html_path"])
    )
)]
struct SaveToExcelArgs {
    /// HTML content containing tables
    #[arg(long = "html")]
    html_content: Option<String>,
    /// Path to an HTML file containing tables
    #[arg(long)]
    html_path: Option<String>,
    /// Where to write the workbook
    #[arg(long, default_value = "output.xlsx")]
    output_path: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// Extract tables from a document as HTML
    ReadDocument(ReadDocumentArgs),
    /// Convert HTML tables into an xlsx workbook
    SaveToExcel(SaveToExcelArgs),
    /// Print the JSON tool manifest
    Manifest {
        /// Agent name recorded on every manifest entry
        #[arg(long, env = "DOCUMENT_TOOLS_AGENT")]
        agent: Option<String>,
    },
}

fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { stdio } => {
            if stdio {
                run_stdio_server()
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::ReadDocument(args) => run_read_document(args),
        Commands::SaveToExcel(args) => run_save_to_excel(args),
        Commands::Manifest { agent } => run_manifest(agent),
    }
}

fn run_read_document(args: ReadDocumentArgs) -> Result<()> {
    let map = build_input_args(&args.input);
    let result = tools::read_document::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_save_to_excel(args: SaveToExcelArgs) -> Result<()> {
    let mut map = Map::new();
    if let Some(html_content) = &args.html_content {
        map.insert("html_content".to_string(), json!(html_content));
    }
    if let Some(html_path) = &args.html_path {
        map.insert("html_path".to_string(), json!(html_path));
    }
    map.insert("output_path".to_string(), json!(args.output_path));
    let result = tools::save_to_excel::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_manifest(agent: Option<String>) -> Result<()> {
    let manifest = match agent {
        Some(agent) => generate_tools_json_doc_for(&agent, DocumentTools::members()),
        None => generate_tools_json_doc::<DocumentTools>(),
    }
    .context("failed to serialize tool manifest")?;
    println!("{manifest}");
    Ok(())
}

fn build_input_args(input: &InputArgs) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(path) = &input.path {
        map.insert("path".to_string(), json!(path));
    }
    if let Some(base64) = &input.base64 {
        map.insert("base64".to_string(), json!(base64));
    }
    map
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error");
        eprintln!("{message}");
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    println!("{text}");
    Ok(())
}

const METHOD_NOT_FOUND: i64 = -32601;

fn run_stdio_server() -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = stdin.lock().lines();
    let mut writer = io::BufWriter::new(stdout.lock());
    tracing::info!("serving tools over stdio");

    for line in reader {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparsable request line");
                continue;
            }
        };

        if let Some(response) = handle_request(&request) {
            let serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            writeln!(writer, "{serialized}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

fn handle_request(request: &Value) -> Option<Value> {
    let method = request.get("method").and_then(|value| value.as_str());
    // Notifications carry no id and never get a response.
    let id = request.get("id").cloned()?;
    tracing::debug!(method, "handling request");

    let result = match method {
        Some("initialize") => json!({
            "protocolVersion": mcp::contracts::PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": DocumentTools::FORMATTING_INSTRUCTIONS
        }),
        Some("ping") => json!({}),
        Some("tools/list") => json!({
            "tools": mcp::tool_definitions()
        }),
        Some("tools/call") => handle_tool_call(request),
        other => {
            let method = other.unwrap_or("");
            return Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": METHOD_NOT_FOUND,
                    "message": format!("method not found: {method}")
                }
            }));
        }
    };

    Some(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    }))
}

fn handle_tool_call(request: &Value) -> Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return tools::error_result(mcp::errors::INVALID_INPUT, "params must be an object", None);
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return tools::error_result(
            mcp::errors::INVALID_INPUT,
            "params.name must be a string",
            None,
        );
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    match get_all_kernel_functions::<DocumentTools>().get(name) {
        Some(function) => {
            tracing::info!(tool = name, "calling tool");
            (function.handler)(&args)
        }
        None => tools::error_result(
            mcp::errors::INVALID_INPUT,
            format!("tool not implemented: {name}"),
            Some(name),
        ),
    }
}
