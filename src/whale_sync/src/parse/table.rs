//! Locating the counts table and reading its cells.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

/// Heading text that introduces the counts table.
pub const TABLE_TITLE: &str = "recent counts";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static HEADINGS: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));
static TABLES: Lazy<Selector> = Lazy::new(|| selector("table"));
static HEADER_CELLS: Lazy<Selector> = Lazy::new(|| selector("th"));
static ROWS: Lazy<Selector> = Lazy::new(|| selector("tr"));
static DATA_CELLS: Lazy<Selector> = Lazy::new(|| selector("td"));

/// Finds the counts table.
///
/// First choice is a `<table>` that is the next element after a heading whose
/// text contains "Recent Counts". Otherwise the first table whose header cells
/// read DATE, TOURS and something with "mammals viewed" or "sightings".
pub fn find_counts_table(doc: &Html) -> Option<ElementRef<'_>> {
    by_heading(doc).or_else(|| by_header_cells(doc))
}

fn by_heading(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&HEADINGS)
        .filter(|h| cell_text(*h).to_lowercase().contains(TABLE_TITLE))
        .find_map(|h| {
            h.next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|next| next.value().name() == "table")
        })
}

fn by_header_cells(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&TABLES).find(|table| {
        let heads: Vec<String> = table
            .select(&HEADER_CELLS)
            .map(|th| cell_text(th).to_lowercase())
            .collect();
        heads.iter().any(|h| h == "date")
            && heads.iter().any(|h| h == "tours")
            && heads
                .iter()
                .any(|h| h.contains("mammals viewed") || h.contains("sightings"))
    })
}

/// Data rows of `table` as cell texts. Header-only rows are skipped.
pub fn data_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = Vec<String>> + 'a {
    table.select(&ROWS).filter_map(|tr| {
        let cells: Vec<String> = tr.select(&DATA_CELLS).map(cell_text).collect();
        (!cells.is_empty()).then_some(cells)
    })
}

/// Visible text of an element with whitespace collapsed. Line breaks and
/// block boundaries count as whitespace.
pub fn cell_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => raw.push_str(t),
            Node::Element(e) if matches!(e.name(), "br" | "p" | "div" | "li") => raw.push(' '),
            _ => {}
        }
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
