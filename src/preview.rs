//! Structured extraction of the backend's HTML table preview.
//!
//! The backend sends the head of the uploaded dataset as a pre-rendered HTML
//! table blob. Injecting backend markup into the UI verbatim is off the table,
//! so the blob is reduced to plain header and cell strings and rendered as a
//! native grid. Anything that does not look like a table degrades to an empty
//! preview.

use std::sync::LazyLock;

use regex::Regex;

static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row regex is valid")
});
static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(th|td)[^>]*>(.*?)</(?:th|td)>").expect("cell regex is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex is valid"));

/// Header and body rows extracted from the preview blob.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PreviewTable {
    /// Parse an HTML table blob into plain text cells.
    ///
    /// The first row containing `<th>` cells becomes the header; every other
    /// row contributes its `<td>` cells. Tags inside cells are stripped and
    /// common entities decoded.
    pub fn parse(html: &str) -> Self {
        let mut table = Self::default();
        for row in ROW_RE.captures_iter(html) {
            let inner = &row[1];
            let mut header_cells = Vec::new();
            let mut body_cells = Vec::new();
            for cell in CELL_RE.captures_iter(inner) {
                let text = clean_cell(&cell[2]);
                if cell[1].eq_ignore_ascii_case("th") {
                    header_cells.push(text);
                } else {
                    body_cells.push(text);
                }
            }
            if table.header.is_empty() && !header_cells.is_empty() {
                table.header = header_cells;
            }
            if !body_cells.is_empty() {
                table.rows.push(body_cells);
            }
        }
        table
    }

    /// Whether any usable content was extracted.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    /// Widest row, used to size the rendered grid.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

fn clean_cell(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    decode_entities(stripped.trim())
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
