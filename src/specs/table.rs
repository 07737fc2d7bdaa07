// src/specs/table.rs
// Header + body split of one <table>, shared by the listing and detail specs.

use crate::core::html::{TagBlock, blocks};

pub(crate) struct RawCell {
    pub text: String,
    /// `data-title` of the cell, used by responsive tables instead of a header.
    pub title: Option<String>,
    /// `href` of the first link inside the cell.
    pub href: Option<String>,
}

pub(crate) struct RawTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Labels come from the first row holding `<th>` cells; without one the
    /// first row is taken as the header and kept out of the body.
    pub fn read(table: &TagBlock<'_>) -> Self {
        let trs: Vec<TagBlock<'_>> = table.children("tr").collect();

        let th_row = trs.iter().position(|tr| tr.children("th").next().is_some());
        let (labels, header_ix) = match th_row {
            Some(i) => (cell_texts(&trs[i]), Some(i)),
            // responsive tables label every cell instead
            None => match trs.first() {
                Some(first) if !has_titled_cells(first) => (cell_texts(first), Some(0)),
                _ => (Vec::new(), None),
            },
        };

        let rows = trs
            .iter()
            .enumerate()
            .filter(|(i, tr)| Some(*i) != header_ix && tr.children("td").next().is_some())
            .map(|(_, tr)| read_cells(tr))
            .collect();

        Self { labels, rows }
    }

    pub fn lowered_labels(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.to_lowercase()).collect()
    }
}

fn has_titled_cells(tr: &TagBlock<'_>) -> bool {
    tr.children("td").any(|td| td.attr("data-title").is_some())
}

fn cell_texts(tr: &TagBlock<'_>) -> Vec<String> {
    tr.cells().iter().map(|c| c.text()).collect()
}

fn read_cells(tr: &TagBlock<'_>) -> Vec<RawCell> {
    tr.cells()
        .iter()
        .map(|c| RawCell {
            text: c.text(),
            title: c.attr("data-title").map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            href: c
                .children("a")
                .find_map(|a| a.attr("href"))
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty() && !h.starts_with('#')),
        })
        .collect()
}

pub(crate) fn tables(doc: &str) -> impl Iterator<Item = TagBlock<'_>> {
    blocks(doc, "table")
}
