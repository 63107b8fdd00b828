//! Merging regenerated content into files that already exist.
//!
//! `append` updates insert one rendered block per entity (service or
//! method). A block is identified by its anchor: when the anchor text is
//! already part of the file the block is not inserted again, so applying the
//! same update twice changes nothing. An anchor that starts or ends with an
//! identifier character only matches where the neighbouring character is not
//! one, so `func Pay(` and `Pay` never match inside `PayRefund`.

/// One block to insert, with the text that marks it as present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBlock {
    /// Text whose presence means the block was inserted before; the body
    /// itself when empty.
    pub anchor: String,
    pub body: String,
}

impl AppendBlock {
    pub fn new(anchor: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            body: body.into(),
        }
    }

    fn marker(&self) -> &str {
        let anchor = self.anchor.trim();
        if anchor.is_empty() {
            self.body.trim()
        } else {
            anchor
        }
    }
}

/// Result of [`append_blocks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub content: String,
    /// Number of blocks actually inserted.
    pub inserted: usize,
}

/// Insert every block not yet present into `existing`.
///
/// New blocks go after the last line containing `location`, or at the end
/// of the file when `location` is empty or not found.
pub fn append_blocks(existing: &str, blocks: &[AppendBlock], location: &str) -> Appended {
    let mut chunk = String::new();
    let mut inserted = 0;
    for block in blocks {
        let marker = block.marker();
        if marker.is_empty() || contains_anchor(existing, marker) || contains_anchor(&chunk, marker)
        {
            continue;
        }
        chunk.push_str(&block.body);
        if !chunk.ends_with('\n') {
            chunk.push('\n');
        }
        inserted += 1;
    }

    if inserted == 0 {
        return Appended {
            content: existing.to_string(),
            inserted,
        };
    }

    let split = (!location.is_empty())
        .then(|| existing.rfind(location))
        .flatten()
        .map(|pos| match existing[pos..].find('\n') {
            Some(eol) => pos + eol + 1,
            None => existing.len(),
        })
        .unwrap_or(existing.len());

    let (head, tail) = existing.split_at(split);
    let mut content = String::with_capacity(existing.len() + chunk.len() + 1);
    content.push_str(head);
    if !head.is_empty() && !head.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&chunk);
    content.push_str(tail);

    Appended { content, inserted }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `anchor` occurs in `text` without running into a neighbouring
/// identifier.
fn contains_anchor(text: &str, anchor: &str) -> bool {
    let (Some(first), Some(last)) = (anchor.chars().next(), anchor.chars().next_back()) else {
        return false;
    };
    text.match_indices(anchor).any(|(pos, _)| {
        let before = text[..pos].chars().next_back();
        let after = text[pos + anchor.len()..].chars().next();
        !(is_ident(first) && before.is_some_and(is_ident))
            && !(is_ident(last) && after.is_some_and(is_ident))
    })
}

/// Add import specs (`"fmt"`, `alias "path"`) not yet present.
///
/// Specs go into the `import ( ... )` block when there is one, after the
/// last single-line import otherwise, and into a new block after the
/// `package` clause as a last resort.
pub fn insert_imports(content: &str, imports: &[String]) -> String {
    let missing: Vec<&str> = imports
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty() && !content.contains(*i))
        .collect();
    if missing.is_empty() {
        return content.to_string();
    }

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let trailing_newline = content.ends_with('\n');

    let block_start = lines.iter().position(|l| l.trim_start().starts_with("import ("));
    let block_end = block_start.and_then(|start| {
        lines[start..]
            .iter()
            .position(|l| l.trim() == ")")
            .map(|offset| start + offset)
    });

    if let Some(end) = block_end {
        for (i, spec) in missing.iter().enumerate() {
            lines.insert(end + i, format!("\t{spec}"));
        }
    } else if let Some(last) = lines
        .iter()
        .rposition(|l| l.trim_start().starts_with("import "))
    {
        for (i, spec) in missing.iter().enumerate() {
            lines.insert(last + 1 + i, format!("import {spec}"));
        }
    } else {
        let at = lines
            .iter()
            .position(|l| l.trim_start().starts_with("package "))
            .map(|p| p + 1)
            .unwrap_or(0);
        let mut block = vec![String::new(), "import (".to_string()];
        block.extend(missing.iter().map(|spec| format!("\t{spec}")));
        block.push(")".to_string());
        lines.splice(at..at, block);
    }

    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}
