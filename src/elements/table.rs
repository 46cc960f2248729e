//! HTML table model used to split tables at row and cell boundaries.
//!
//! Table HTML arrives from external structure extractors as a `<table>`
//! fragment. It is parsed with `quick-xml` into rows of cells; rows and cells
//! can then be rendered back into smaller, self-contained `<table>` fragments.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Named HTML entities beyond the five XML ones that extractors emit.
fn html_entity(name: &str) -> Option<&'static str> {
    let text = match name {
        "nbsp" => "\u{a0}",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{b0}",
        "plusmn" => "\u{b1}",
        "times" => "\u{d7}",
        "middot" => "\u{b7}",
        "bull" => "\u{2022}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "euro" => "\u{20ac}",
        "pound" => "\u{a3}",
        "yen" => "\u{a5}",
        "sect" => "\u{a7}",
        _ => return None,
    };
    Some(text)
}

const TABLE_OPEN: &str = "<table>";
const TABLE_CLOSE: &str = "</table>";

/// One cell of a table row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlCell {
    /// `<th>` instead of `<td>`
    pub header: bool,
    /// Whitespace-normalised cell text
    pub text: String,
    /// `colspan` attribute, kept verbatim
    pub colspan: Option<String>,
    /// `rowspan` attribute, kept verbatim
    pub rowspan: Option<String>,
}

impl HtmlCell {
    /// A plain `<td>` cell.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn tag(&self) -> &'static str {
        if self.header {
            "th"
        } else {
            "td"
        }
    }

    /// Render the cell as HTML.
    pub fn to_html(&self) -> String {
        let mut html = format!("<{}", self.tag());
        if let Some(span) = &self.colspan {
            html.push_str(&format!(" colspan=\"{}\"", quick_xml::escape::escape(span.as_str())));
        }
        if let Some(span) = &self.rowspan {
            html.push_str(&format!(" rowspan=\"{}\"", quick_xml::escape::escape(span.as_str())));
        }
        html.push('>');
        html.push_str(&quick_xml::escape::escape(self.text.as_str()));
        html.push_str(&format!("</{}>", self.tag()));
        html
    }

    /// Rendered length of the cell markup around `text`.
    pub fn markup_overhead(&self) -> usize {
        let empty = HtmlCell {
            text: String::new(),
            ..self.clone()
        };
        empty.to_html().chars().count()
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlRow {
    /// Cells in document order
    pub cells: Vec<HtmlCell>,
}

impl HtmlRow {
    /// Render the row as `<tr>...</tr>`.
    pub fn to_html(&self) -> String {
        render_cells(&self.cells)
    }

    /// Cell texts joined by single spaces.
    pub fn text(&self) -> String {
        join_cell_text(&self.cells)
    }
}

/// Render cells as one `<tr>` row.
pub fn render_cells(cells: &[HtmlCell]) -> String {
    let mut html = String::from("<tr>");
    for cell in cells {
        html.push_str(&cell.to_html());
    }
    html.push_str("</tr>");
    html
}

/// Non-empty cell texts joined by single spaces.
pub fn join_cell_text(cells: &[HtmlCell]) -> String {
    cells
        .iter()
        .map(|c| c.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A parsed HTML table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlTable {
    /// Rows in document order
    pub rows: Vec<HtmlRow>,
}

impl HtmlTable {
    /// Parse a `<table>` fragment.
    ///
    /// Section wrappers (`thead`, `tbody`, `tfoot`) are flattened; markup
    /// inside cells is reduced to its text. Nested tables contribute their
    /// text to the enclosing cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use element_oxide::elements::HtmlTable;
    ///
    /// let table = HtmlTable::parse("<table><tr><th>Name</th><td>Ada &amp; co</td></tr></table>").unwrap();
    /// assert_eq!(table.rows.len(), 1);
    /// assert_eq!(table.rows[0].cells[1].text, "Ada & co");
    /// assert_eq!(table.text(), "Name Ada & co");
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        let mut reader = Reader::from_str(html);
        reader.check_end_names(false);

        let mut rows: Vec<HtmlRow> = Vec::new();
        let mut table_depth = 0usize;
        let mut current_row: Option<HtmlRow> = None;
        let mut current_cell: Option<(HtmlCell, String)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = lower_name(&e);
                    match name.as_str() {
                        "table" => table_depth += 1,
                        "tr" if table_depth == 1 => {
                            if let Some(row) = current_row.take() {
                                rows.push(row);
                            }
                            current_row = Some(HtmlRow::default());
                        },
                        "td" | "th" if table_depth == 1 => {
                            close_cell(&mut current_cell, &mut current_row);
                            current_cell = Some((start_cell(&e, name == "th")?, String::new()));
                        },
                        _ => {},
                    }
                },
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                    match name.as_str() {
                        "table" => {
                            table_depth = table_depth.saturating_sub(1);
                            if table_depth == 0 {
                                close_cell(&mut current_cell, &mut current_row);
                                if let Some(row) = current_row.take() {
                                    rows.push(row);
                                }
                            }
                        },
                        "td" | "th" if table_depth == 1 => close_cell(&mut current_cell, &mut current_row),
                        "tr" if table_depth == 1 => {
                            close_cell(&mut current_cell, &mut current_row);
                            if let Some(row) = current_row.take() {
                                rows.push(row);
                            }
                        },
                        _ => {},
                    }
                },
                Ok(Event::Empty(e)) => {
                    let name = lower_name(&e);
                    match name.as_str() {
                        "td" | "th" if table_depth == 1 => {
                            close_cell(&mut current_cell, &mut current_row);
                            let cell = start_cell(&e, name == "th")?;
                            current_row.get_or_insert_with(HtmlRow::default).cells.push(cell);
                        },
                        "br" => {
                            if let Some((_, buf)) = current_cell.as_mut() {
                                buf.push(' ');
                            }
                        },
                        _ => {},
                    }
                },
                Ok(Event::Text(t)) => {
                    if let Some((_, buf)) = current_cell.as_mut() {
                        match t.unescape_with(html_entity) {
                            Ok(text) => buf.push_str(&text),
                            // entities outside the named set stay verbatim
                            Err(_) => buf.push_str(&String::from_utf8_lossy(&t)),
                        }
                        buf.push(' ');
                    }
                },
                Ok(Event::CData(c)) => {
                    if let Some((_, buf)) = current_cell.as_mut() {
                        buf.push_str(&String::from_utf8_lossy(&c));
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::InvalidElement(format!(
                        "table html at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                },
                _ => {},
            }
        }

        close_cell(&mut current_cell, &mut current_row);
        if let Some(row) = current_row.take() {
            rows.push(row);
        }
        rows.retain(|r| !r.cells.is_empty());

        Ok(Self { rows })
    }

    /// All cell texts joined by single spaces.
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the whole table.
    pub fn to_html(&self) -> String {
        render_rows(&self.rows)
    }
}

/// Render rows as one self-contained `<table>` fragment.
pub fn render_rows(rows: &[HtmlRow]) -> String {
    let mut html = String::from(TABLE_OPEN);
    for row in rows {
        html.push_str(&row.to_html());
    }
    html.push_str(TABLE_CLOSE);
    html
}

/// Length of the `<table></table>` wrapper.
pub fn table_wrapper_len() -> usize {
    TABLE_OPEN.len() + TABLE_CLOSE.len()
}

fn lower_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

fn start_cell(e: &BytesStart<'_>, header: bool) -> Result<HtmlCell> {
    let mut cell = HtmlCell {
        header,
        ..Default::default()
    };
    for attr in e.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        match key.as_str() {
            "colspan" => cell.colspan = Some(value),
            "rowspan" => cell.rowspan = Some(value),
            _ => {},
        }
    }
    Ok(cell)
}

fn close_cell(current_cell: &mut Option<(HtmlCell, String)>, current_row: &mut Option<HtmlRow>) {
    if let Some((mut cell, buf)) = current_cell.take() {
        cell.text = buf.split_whitespace().collect::<Vec<_>>().join(" ");
        current_row.get_or_insert_with(HtmlRow::default).cells.push(cell);
    }
}
