use crate::input::load_input;
use crate::tools::error_result;
use serde_json::{Value, json};

/// Canned extraction result; table extraction from real documents is not wired up.
pub const SAMPLE_TABLES_HTML: &str = concat!(
    "Here are the extracted tables in HTML format: ",
    "1. **Sales Numbers for Q1:** ",
    "<table border='1' style='border-collapse:collapse;width:50%;'> <thead> <tr> ",
    "<th>Quarter</th> <th>Bicycle Sales</th> <th>Helmet Sales</th> <th>Total Sales</th> ",
    "</tr> </thead> <tbody> ",
    "<tr> <td>Q1</td> <td>$150,000</td> <td>$75,000</td> <td>$225,000</td> </tr> ",
    "<tr> <td>Q2</td> <td>$180,000</td> <td>$90,000</td> <td>$270,000</td> </tr> ",
    "<tr> <td>Q3</td> <td>$210,000</td> <td>$105,000</td> <td>$315,000</td> </tr> ",
    "<tr> <td>Q4</td> <td>$240,000</td> <td>$120,000</td> <td>$360,000</td> </tr> ",
    "</tbody></table>",
    "2. **Projected Sales Numbers:**",
    "<table border='1' style='border-collapse:collapse;width:50%;'> <thead> <tr> ",
    "<th>Quarter</th> <th>Projected Bicycle Sales</th> <th>Projected Helmet Sales</th> ",
    "<th>Projected Total Sales</th> </tr> </thead> <tbody> ",
    "<tr> <td>Q1</td> <td>$270,000</td> <td>$135,000</td> <td>$405,000</td> </tr> ",
    "<tr> <td>Q2</td> <td>$300,000</td> <td>$150,000</td> <td>$450,000</td> </tr> ",
    "<tr> <td>Q3</td> <td>$330,000</td> <td>$165,000</td> <td>$495,000</td> </tr> ",
    "<tr> <td>Q4</td> <td>$360,000</td> <td>$180,000</td> <td>$540,000</td> </tr> ",
    "</tbody></table>",
);

pub fn call(args: &Value) -> Value {
    let payload = match load_input(args) {
        Ok(payload) => payload,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let bytes_len = payload.bytes.len() as u64;
    tracing::info!(source = %payload.source, bytes_len, "reading document contents");

    json!({
        "content": [{"type": "text", "text": SAMPLE_TABLES_HTML}],
        "structuredContent": {
            "html": SAMPLE_TABLES_HTML,
            "source": payload.source,
            "bytes_len": bytes_len
        },
        "isError": false
    })
}
