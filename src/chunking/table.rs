//! Table splitting.
//!
//! A table too large for one chunk is cut at the largest row boundary that
//! fits, then at cell boundaries inside a row, then inside a cell's text.
//! Every piece is a self-contained `<table>` fragment; a piece whose markup
//! alone cannot fit keeps its text only. When the markup does not hold all
//! of the element text, the text is split instead. Content is never dropped.

use crate::elements::table::{render_rows, table_wrapper_len};
use crate::elements::{Element, ElementMetadata, ElementType, HtmlCell, HtmlRow, HtmlTable};

use super::text_splitter::TextSplitter;

/// Length of the `<tr></tr>` wrapper.
const ROW_WRAPPER_LEN: usize = 9;

/// One piece of a split table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TablePiece {
    pub(crate) text: String,
    pub(crate) html: Option<String>,
}

/// Turn a table into chunk elements.
///
/// A table that fits stays one Table element. Otherwise it becomes
/// TableChunk pieces; every piece after the first is a continuation.
pub(crate) fn chunk_table(table: &Element, max: usize, metadata: ElementMetadata) -> Vec<Element> {
    let html = table.text_as_html();
    let fits = table.text_len() <= max && html.map_or(true, |h| h.chars().count() <= max);

    if fits {
        let mut metadata = metadata;
        metadata.text_as_html = html.map(str::to_string);
        return vec![Element::new(ElementType::Table, table.text.clone()).with_metadata(metadata)];
    }

    let pieces = split_table(&table.text, html, max);
    log::debug!(
        "splitting table of {} characters ({} of html) into {} pieces of at most {}",
        table.text_len(),
        html.map_or(0, |h| h.chars().count()),
        pieces.len(),
        max
    );

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            let mut metadata = metadata.clone();
            metadata.text_as_html = piece.html;
            if i > 0 {
                metadata.is_continuation = Some(true);
            }
            Element::new(ElementType::TableChunk, piece.text).with_metadata(metadata)
        })
        .collect()
}

/// Split a table's content into pieces of at most `max` characters.
pub(crate) fn split_table(text: &str, html: Option<&str>, max: usize) -> Vec<TablePiece> {
    if let Some(html) = html {
        match HtmlTable::parse(html) {
            Ok(table) if table.rows.is_empty() => log::debug!("table html has no rows, splitting its text"),
            Ok(table) if !holds_text(&table.text(), text) => {
                log::debug!("table html does not hold all of the table text, splitting its text")
            },
            Ok(table) => return split_rows(&table.rows, max),
            Err(e) => log::debug!("table html unusable for splitting ({}), splitting its text", e),
        }
    }
    text_pieces(text, max)
}

/// Whether `html_text` contains every non-whitespace character of `text`
/// in order and without gaps.
fn holds_text(html_text: &str, text: &str) -> bool {
    let compact = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    compact(html_text).contains(&compact(text))
}

fn text_pieces(text: &str, max: usize) -> Vec<TablePiece> {
    TextSplitter::new(max, 0)
        .split(text)
        .into_iter()
        .map(|text| TablePiece { text, html: None })
        .collect()
}

/// Running size of a piece under construction.
#[derive(Debug, Default)]
struct Extent {
    html: usize,
    text: usize,
}

impl Extent {
    fn with(&self, html: usize, text: usize) -> Extent {
        Extent {
            html: self.html + html,
            text: match (self.text, text) {
                (0, n) => n,
                (c, 0) => c,
                (c, n) => c + 1 + n,
            },
        }
    }

    fn fits(&self, base: usize, max: usize) -> bool {
        base + self.html <= max && self.text <= max
    }
}

fn split_rows(rows: &[HtmlRow], max: usize) -> Vec<TablePiece> {
    let base = table_wrapper_len();
    let mut pieces = Vec::new();
    let mut current: Vec<HtmlRow> = Vec::new();
    let mut extent = Extent::default();

    for row in rows {
        let html_len = row.to_html().chars().count();
        let text_len = row.text().chars().count();

        let grown = extent.with(html_len, text_len);
        if grown.fits(base, max) {
            current.push(row.clone());
            extent = grown;
            continue;
        }

        if !current.is_empty() {
            pieces.push(rows_piece(&current));
            current.clear();
        }

        let alone = Extent::default().with(html_len, text_len);
        if alone.fits(base, max) {
            current.push(row.clone());
            extent = alone;
        } else {
            extent = Extent::default();
            pieces.extend(split_cells(row, max));
        }
    }

    if !current.is_empty() {
        pieces.push(rows_piece(&current));
    }
    pieces
}

fn rows_piece(rows: &[HtmlRow]) -> TablePiece {
    TablePiece {
        text: join_row_text(rows),
        html: Some(render_rows(rows)),
    }
}

fn join_row_text(rows: &[HtmlRow]) -> String {
    rows.iter()
        .map(|r| r.text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_cells(row: &HtmlRow, max: usize) -> Vec<TablePiece> {
    let base = table_wrapper_len() + ROW_WRAPPER_LEN;
    let mut pieces = Vec::new();
    let mut current: Vec<HtmlCell> = Vec::new();
    let mut extent = Extent::default();

    for cell in &row.cells {
        let html_len = cell.to_html().chars().count();
        let text_len = cell.text.chars().count();

        let grown = extent.with(html_len, text_len);
        if grown.fits(base, max) {
            current.push(cell.clone());
            extent = grown;
            continue;
        }

        if !current.is_empty() {
            pieces.push(cells_piece(std::mem::take(&mut current)));
        }

        let alone = Extent::default().with(html_len, text_len);
        if alone.fits(base, max) {
            current.push(cell.clone());
            extent = alone;
        } else {
            extent = Extent::default();
            pieces.extend(split_cell_text(cell, max));
        }
    }

    if !current.is_empty() {
        pieces.push(cells_piece(current));
    }
    pieces
}

fn cells_piece(cells: Vec<HtmlCell>) -> TablePiece {
    let row = HtmlRow { cells };
    TablePiece {
        text: row.text(),
        html: Some(render_rows(std::slice::from_ref(&row))),
    }
}

fn split_cell_text(cell: &HtmlCell, max: usize) -> Vec<TablePiece> {
    let overhead = table_wrapper_len() + ROW_WRAPPER_LEN + cell.markup_overhead();
    if overhead >= max {
        return text_pieces(&cell.text, max);
    }

    TextSplitter::new(max - overhead, 0)
        .split(&cell.text)
        .into_iter()
        .map(|text| {
            let piece = HtmlCell {
                text: text.clone(),
                ..cell.clone()
            };
            let html = render_rows(&[HtmlRow { cells: vec![piece] }]);
            // escaping can push the markup past the cap
            let html = (html.chars().count() <= max).then_some(html);
            TablePiece { text, html }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_html(rows: usize, cell_len: usize) -> String {
        let mut html = String::from("<table>");
        for i in 0..rows {
            let text: String = std::iter::repeat(char::from(b'a' + (i % 26) as u8)).take(cell_len).collect();
            html.push_str(&format!("<tr><td>{}</td></tr>", text));
        }
        html.push_str("</table>");
        html
    }

    #[test]
    fn test_small_table_stays_whole() {
        let table = Element::table("a b", "<table><tr><td>a</td><td>b</td></tr></table>");
        let chunks = chunk_table(&table, 100, ElementMetadata::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].category, ElementType::Table);
        assert!(chunks[0].text_as_html().is_some());
    }

    #[test]
    fn test_split_at_rows() {
        // 15 + 5 * 97 = 500 characters of html
        let html = table_html(5, 79);
        assert_eq!(html.len(), 500);
        let text = HtmlTable::parse(&html).unwrap().text();
        let chunks = chunk_table(&Element::table(text.clone(), html), 200, ElementMetadata::default());

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.category == ElementType::TableChunk));
        assert_eq!(chunks[0].metadata.is_continuation, None);
        assert!(chunks[1..].iter().all(|c| c.metadata.is_continuation == Some(true)));
        for chunk in &chunks {
            assert!(chunk.text_len() <= 200);
            assert!(chunk.text_as_html().unwrap().len() <= 200);
        }
        let joined: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined.join(" "), text);
    }

    #[test]
    fn test_packs_several_rows_per_piece() {
        let html = table_html(10, 5);
        // 15 + 2 * 23 = 61 fits, a third row does not
        let pieces = split_table("", Some(&html), 61);
        assert_eq!(pieces.len(), 5);
        assert_eq!(pieces[0].html.as_deref(), Some("<table><tr><td>aaaaa</td></tr><tr><td>bbbbb</td></tr></table>"));
        assert_eq!(pieces[0].text, "aaaaa bbbbb");
    }

    #[test]
    fn test_wide_row_splits_at_cells() {
        let html = "<table><tr><td>one</td><td>two</td><td>three</td></tr></table>";
        let pieces = split_table("one two three", Some(html), 40);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].html.as_deref(), Some("<table><tr><td>one</td></tr></table>"));
        assert_eq!(pieces[1].text, "two");
        let pieces = split_table("one two three", Some(html), 50);
        assert_eq!(pieces[0].text, "one two");
    }

    #[test]
    fn test_huge_cell_splits_text() {
        let long = "word ".repeat(40);
        let html = format!("<table><tr><td>{}</td></tr></table>", long.trim());
        let pieces = split_table(long.trim(), Some(&html), 60);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.text.chars().count() <= 60);
            assert!(piece.html.as_ref().map_or(true, |h| h.len() <= 60));
        }
        let total: usize = pieces.iter().map(|p| p.text.split_whitespace().count()).sum();
        assert_eq!(total, 40);
    }

    #[test]
    fn test_markup_larger_than_cap_keeps_text() {
        let pieces = split_table("abcdefghij", Some("<table><tr><td>abcdefghij</td></tr></table>"), 8);
        assert!(pieces.iter().all(|p| p.html.is_none()));
        assert_eq!(pieces.iter().map(|p| p.text.as_str()).collect::<String>(), "abcdefghij");
    }

    #[test]
    fn test_table_without_html_splits_text() {
        let table = Element::new(ElementType::Table, "x ".repeat(60).trim().to_string());
        let chunks = chunk_table(&table, 50, ElementMetadata::default());
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.text_as_html().is_none()));
    }

    #[test]
    fn test_html_missing_text_splits_text() {
        let text = "cell ".repeat(60);
        let table = Element::table(text.trim(), "<table><tr><td>a</td></tr><tr><td>b</td></tr></table>");
        let chunks = chunk_table(&table, 200, ElementMetadata::default());

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.category == ElementType::TableChunk));
        assert!(chunks.iter().all(|c| c.text_len() <= 200 && c.text_as_html().is_none()));
        assert!(chunks[1..].iter().all(|c| c.metadata.is_continuation == Some(true)));
        let kept: usize = chunks.iter().map(|c| c.text.chars().filter(|ch| !ch.is_whitespace()).count()).sum();
        assert_eq!(kept, 240);
    }

    #[test]
    fn test_html_with_extra_cells_still_splits_rows() {
        // one 63-character row per piece
        let html = table_html(4, 30);
        let pieces = split_table("", Some(&html), 70);
        assert_eq!(pieces.len(), 4);
        assert!(pieces.iter().all(|p| p.html.is_some()));
    }
}
