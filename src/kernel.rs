//! Tool reflection: which members of a tool set are exposed as kernel
//! functions, and the JSON manifest the agent framework registers them from.

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;
use serde_json::ser::Formatter;
use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// Runs a tool on its argument object and returns an MCP tool result.
pub type Handler = fn(&Value) -> Value;

/// Type hint attached to a member parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Bytes,
    Int,
    Float,
    Bool,
    List(Box<ParamType>),
    Optional(Box<ParamType>),
    Untyped,
}

impl ParamType {
    /// Name used in the manifest `type` field.
    pub fn manifest_name(&self) -> &'static str {
        match self {
            ParamType::Str => "str",
            ParamType::Bytes => "bytes",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Untyped => "string",
            ParamType::List(_) | ParamType::Optional(_) => {
                let rendered = self.to_string();
                if rendered.contains("int") {
                    "int"
                } else if rendered.contains("float") {
                    "float"
                } else if rendered.contains("bool") {
                    "boolean"
                } else {
                    "string"
                }
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Str => f.write_str("str"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::Int => f.write_str("int"),
            ParamType::Float => f.write_str("float"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Untyped => f.write_str("any"),
            ParamType::List(inner) => write!(f, "list[{inner}]"),
            ParamType::Optional(inner) => write!(f, "optional[{inner}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
}

impl Param {
    pub fn new(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty }
    }
}

/// Marks a member as exposed to the agent framework.
#[derive(Debug, Clone, Copy)]
pub struct KernelFunction {
    pub description: Option<&'static str>,
    pub handler: Handler,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: &'static str,
    pub doc: Option<&'static str>,
    pub kernel_function: Option<KernelFunction>,
    pub params: Vec<Param>,
}

impl Member {
    /// The marker description when set, else the trimmed doc text.
    pub fn description(&self) -> String {
        self.kernel_function
            .and_then(|function| function.description)
            .filter(|description| !description.is_empty())
            .map(str::to_string)
            .or_else(|| self.doc.map(|doc| doc.trim().to_string()))
            .unwrap_or_default()
    }
}

pub trait ToolSet {
    const AGENT_NAME: &'static str;
    const FORMATTING_INSTRUCTIONS: &'static str;

    fn members() -> Vec<Member>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub agent: String,
    pub function: String,
    pub description: String,
    pub arguments: String,
}

const GET_ALL_KERNEL_FUNCTIONS: &str = "get_all_kernel_functions";
const GENERATE_TOOLS_JSON_DOC: &str = "generate_tools_json_doc";

fn is_hidden(name: &str, reserved: &str) -> bool {
    name.starts_with('_') || name == reserved
}

pub fn get_all_kernel_functions<T: ToolSet>() -> BTreeMap<String, KernelFunction> {
    T::members()
        .into_iter()
        .filter(|member| !is_hidden(member.name, GET_ALL_KERNEL_FUNCTIONS))
        .filter_map(|member| {
            member
                .kernel_function
                .map(|function| (member.name.to_string(), function))
        })
        .collect()
}

pub fn generate_tools_json_doc<T: ToolSet>() -> serde_json::Result<String> {
    generate_tools_json_doc_for(T::AGENT_NAME, T::members())
}

pub fn generate_tools_json_doc_for(
    agent: &str,
    members: Vec<Member>,
) -> serde_json::Result<String> {
    let tools = tool_descriptors(agent, members)?;
    serde_json::to_string_pretty(&tools)
}

pub fn tool_descriptors(
    agent: &str,
    mut members: Vec<Member>,
) -> serde_json::Result<Vec<ToolDescriptor>> {
    members.sort_by(|left, right| left.name.cmp(right.name));

    let mut tools = Vec::new();
    for member in members {
        if is_hidden(member.name, GENERATE_TOOLS_JSON_DOC) {
            continue;
        }
        if member.kernel_function.is_none() {
            continue;
        }

        tools.push(ToolDescriptor {
            agent: agent.to_string(),
            function: member.name.to_string(),
            description: member.description(),
            arguments: render_arguments(&member.params)?,
        });
    }
    Ok(tools)
}

#[derive(Serialize)]
struct ArgumentSchema<'a> {
    description: &'a str,
    title: String,
    #[serde(rename = "type")]
    ty: &'static str,
}

struct Arguments<'a>(Vec<(&'a str, ArgumentSchema<'a>)>);

impl Serialize for Arguments<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

/// Argument mapping as the framework expects it: Python-style separators and
/// single quotes in place of double quotes.
fn render_arguments(params: &[Param]) -> serde_json::Result<String> {
    let arguments = Arguments(
        params
            .iter()
            .filter(|param| param.name != "self" && param.name != "cls")
            .map(|param| {
                (
                    param.name,
                    ArgumentSchema {
                        description: param.name,
                        title: title_case(&param.name.replace('_', " ")),
                        ty: param.ty.manifest_name(),
                    },
                )
            })
            .collect(),
    );

    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    arguments.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).replace('"', "'"))
}

/// Single-line JSON with `", "` between items and `": "` after keys.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Uppercases a letter that follows a non-letter, lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous_alphabetic = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_alphabetic {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            output.push(ch);
            previous_alphabetic = false;
        }
    }
    output
}
