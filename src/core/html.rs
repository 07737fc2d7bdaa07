// src/core/html.rs
//! Case-insensitive tag scanning over raw HTML.
//!
//! Not a parser. A block runs from `<tag ...>` to the first matching `</tag`,
//! so same-name nesting (a table inside a table cell) is not supported.
//! Lowercasing is ASCII-only, which keeps byte offsets of the lowered copy
//! identical to the source.

use super::sanitize::{decode_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// One `<tag ...>inner</tag>` occurrence, borrowed from the source document.
#[derive(Clone, Copy, Debug)]
pub struct TagBlock<'a> {
    /// The opening tag including `<` and `>`.
    pub open: &'a str,
    pub inner: &'a str,
    /// Byte offsets of the whole block in the scanned string.
    pub start: usize,
    pub end: usize,
}

impl<'a> TagBlock<'a> {
    pub fn attr(&self, name: &str) -> Option<String> {
        attr_value(self.open, name)
    }

    /// Visible text of the block: tags stripped, entities decoded, whitespace collapsed.
    pub fn text(&self) -> String {
        strip_tags(self.inner)
    }

    pub fn children(&self, tag: &str) -> Blocks<'a> {
        Blocks::new(self.inner, &[tag])
    }

    /// `<td>` and `<th>` children, in document order.
    pub fn cells(&self) -> Vec<TagBlock<'a>> {
        Blocks::new(self.inner, &["td", "th"]).collect()
    }
}

/// Source plus its lowered copy, for repeated case-insensitive lookups.
pub struct Html<'a> {
    src: &'a str,
    lc: String,
}

impl<'a> Html<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, lc: to_lower(src) }
    }

    pub fn find_ci(&self, needle: &str, from: usize) -> Option<usize> {
        let n = to_lower(needle);
        self.lc.get(from..)?.find(&n).map(|i| i + from)
    }

    pub fn contains_ci(&self, needle: &str) -> bool {
        self.find_ci(needle, 0).is_some()
    }

    /// Next block of any of `tags` starting at or after `from`.
    pub fn next_block_any(&self, tags: &[&str], from: usize) -> Option<TagBlock<'a>> {
        tags.iter()
            .filter_map(|t| self.next_block(t, from))
            .min_by_key(|b| b.start)
    }

    pub fn next_block(&self, tag: &str, from: usize) -> Option<TagBlock<'a>> {
        let name = to_lower(tag);
        let open_pat = format!("<{name}");
        let close_pat = format!("</{name}");
        let bytes = self.lc.as_bytes();

        let mut at = from;
        loop {
            let start = self.lc.get(at..)?.find(&open_pat)? + at;
            let after_name = start + open_pat.len();
            // `<th` must not match `<thead`
            match bytes.get(after_name) {
                Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {}
                _ => { at = after_name; continue; }
            }
            let open_end = self.src[start..].find('>')? + start + 1;
            let close = self.lc[open_end..].find(&close_pat)? + open_end;
            let end = self.src[close..]
                .find('>')
                .map(|i| close + i + 1)
                .unwrap_or(self.src.len());
            return Some(TagBlock {
                open: &self.src[start..open_end],
                inner: &self.src[open_end..close],
                start,
                end,
            });
        }
    }
}

/// Iterator over successive, non-overlapping blocks of the given tag names.
pub struct Blocks<'a> {
    html: Html<'a>,
    tags: Vec<String>,
    pos: usize,
}

impl<'a> Blocks<'a> {
    pub fn new(src: &'a str, tags: &[&str]) -> Self {
        Self {
            html: Html::new(src),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            pos: 0,
        }
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = TagBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        let block = self.html.next_block_any(&tags, self.pos)?;
        self.pos = block.end;
        Some(block)
    }
}

pub fn blocks<'a>(src: &'a str, tag: &str) -> Blocks<'a> {
    Blocks::new(src, &[tag])
}

/// Value of attribute `name` in an opening tag. Quoted or bare values;
/// names match whole-word, so `title` does not hit `data-title`.
pub fn attr_value(open_tag: &str, name: &str) -> Option<String> {
    let lc = to_lower(open_tag);
    let needle = to_lower(name);
    let bytes = lc.as_bytes();
    let mut from = 0usize;

    while let Some(rel) = lc[from..].find(&needle) {
        let at = from + rel;
        from = at + needle.len();

        let before_ok = at > 0 && bytes[at - 1].is_ascii_whitespace();
        let rest = lc[from..].trim_start();
        if !before_ok || !rest.starts_with('=') {
            continue;
        }
        // offsets in `lc` are valid in `open_tag`
        let eq = lc.len() - rest.len();
        let val = open_tag[eq + 1..].trim_start();
        let value = match val.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &val[1..];
                &body[..body.find(q).unwrap_or(body.len())]
            }
            _ => {
                let end = val
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(val.len());
                val[..end].trim_end_matches('/')
            }
        };
        return Some(decode_entities(value));
    }
    None
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => { in_tag = true; out.push(' '); }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

/// Page text with `<script>`/`<style>` bodies removed and tags stripped.
pub fn visible_text(doc: &str) -> String {
    let html = Html::new(doc);
    let mut kept = String::with_capacity(doc.len());
    let mut pos = 0usize;
    while let Some(b) = html.next_block_any(&["script", "style"], pos) {
        kept.push_str(&doc[pos..b.start]);
        kept.push(' ');
        pos = b.end;
    }
    kept.push_str(&doc[pos..]);
    strip_tags(kept)
}
