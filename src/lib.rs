pub mod html_tables;
pub mod input;
pub mod kernel;
pub mod logging;
pub mod mcp;
pub mod tools;
pub mod workbook;
