//! Grid extraction for `<table>` elements.

use scraper::{ElementRef, Html};
use std::collections::VecDeque;

const MAX_COLSPAN: usize = 1_000;
const MAX_ROWSPAN: usize = 65_534;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    pub header: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    pub width: usize,
}

struct RawCell {
    text: String,
    colspan: usize,
    rowspan: usize,
}

struct RawRow {
    cells: Vec<RawCell>,
    all_header_cells: bool,
}

#[derive(Default)]
struct RowGroups {
    head: Vec<RawRow>,
    body: Vec<RawRow>,
    foot: Vec<RawRow>,
}

/// Every non-empty table in document order, nested tables included.
pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "table")
        .filter_map(build_table)
        .collect()
}

fn build_table(table: ElementRef<'_>) -> Option<HtmlTable> {
    let RowGroups {
        mut head,
        mut body,
        foot,
    } = collect_rows(table);

    if head.is_empty() {
        let leading = body
            .iter()
            .take_while(|row| row.all_header_cells)
            .count();
        head = body.drain(..leading).collect();
    }

    // Spans never reach past the row group they start in.
    let mut header = expand_spans(&head);
    let mut rows = expand_spans(&body);
    rows.extend(expand_spans(&foot));
    header.retain(|row| !row.is_empty());
    rows.retain(|row| !row.is_empty());

    let width = header
        .iter()
        .chain(rows.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if width == 0 {
        return None;
    }
    for row in header.iter_mut().chain(rows.iter_mut()) {
        row.resize(width, String::new());
    }

    Some(HtmlTable {
        header,
        rows,
        width,
    })
}

/// Rows owned by this table, split into `thead`, `tbody` (plus bare `tr`
/// children) and `tfoot` groups.
fn collect_rows(table: ElementRef<'_>) -> RowGroups {
    let mut groups = RowGroups::default();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => groups.head.extend(section_rows(child)),
            "tbody" => groups.body.extend(section_rows(child)),
            "tfoot" => groups.foot.extend(section_rows(child)),
            "tr" => groups.body.push(raw_row(child)),
            _ => {}
        }
    }

    groups
}

fn section_rows(section: ElementRef<'_>) -> Vec<RawRow> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "tr")
        .map(raw_row)
        .collect()
}

fn raw_row(tr: ElementRef<'_>) -> RawRow {
    let mut all_header_cells = true;
    let cells: Vec<RawCell> = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| {
            if cell.value().name() != "th" {
                all_header_cells = false;
            }
            RawCell {
                text: cell_text(cell),
                colspan: span(cell, "colspan", MAX_COLSPAN),
                rowspan: span(cell, "rowspan", MAX_ROWSPAN),
            }
        })
        .collect();

    RawRow {
        all_header_cells: all_header_cells && !cells.is_empty(),
        cells,
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn span(cell: ElementRef<'_>, attr: &str, max: usize) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, max)
}

/// A value from a `rowspan` cell still owed to the rows below it.
struct PendingSpan {
    col: usize,
    text: String,
    rows_left: usize,
}

/// Lays cells out on a grid, repeating spanned values into every slot they
/// cover.
///
/// A pending rowspan value is placed before the first cell that would start
/// at or past its column. Values whose column was taken by a wider cell are
/// appended at the end of the row instead. Rowspans that outlive the group
/// produce trailing rows of their own.
fn expand_spans(raw_rows: &[RawRow]) -> Vec<Vec<String>> {
    let mut pending: VecDeque<PendingSpan> = VecDeque::new();
    let mut grid = Vec::with_capacity(raw_rows.len());

    for raw in raw_rows {
        let mut row = Vec::new();
        let mut next = Vec::new();

        for cell in &raw.cells {
            while let Some(carried) = pending.pop_front() {
                if carried.col > row.len() {
                    pending.push_front(carried);
                    break;
                }
                place_pending(&mut row, &mut next, carried);
            }
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    next.push(PendingSpan {
                        col: row.len(),
                        text: cell.text.clone(),
                        rows_left: cell.rowspan - 1,
                    });
                }
                row.push(cell.text.clone());
            }
        }

        for carried in pending.drain(..) {
            place_pending(&mut row, &mut next, carried);
        }
        grid.push(row);
        pending = next.into();
    }

    while !pending.is_empty() {
        let mut row = Vec::new();
        let mut next = Vec::new();
        for carried in pending.drain(..) {
            place_pending(&mut row, &mut next, carried);
        }
        grid.push(row);
        pending = next.into();
    }

    grid
}

fn place_pending(row: &mut Vec<String>, next: &mut Vec<PendingSpan>, carried: PendingSpan) {
    row.push(carried.text.clone());
    if carried.rows_left > 1 {
        next.push(PendingSpan {
            rows_left: carried.rows_left - 1,
            ..carried
        });
    }
}
