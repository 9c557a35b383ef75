use crate::kernel::{ToolSet, get_all_kernel_functions};
use crate::tools::DocumentTools;
use serde_json::json;

pub mod contracts;
pub mod errors;

pub fn tool_definitions() -> Vec<serde_json::Value> {
    tool_definitions_for::<DocumentTools>()
}

/// `tools/list` entries for every exposed member, described the same way as
/// in the tool manifest.
pub fn tool_definitions_for<T: ToolSet>() -> Vec<serde_json::Value> {
    let members = T::members();
    get_all_kernel_functions::<T>()
        .into_keys()
        .filter_map(|name| {
            let member = members.iter().find(|member| member.name == name)?;
            Some(json!({
                "name": name,
                "description": member.description(),
                "inputSchema": contracts::input_schema(&name)
            }))
        })
        .collect()
}
