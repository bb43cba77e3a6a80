//! Docstring normalization
//!
//! Turns a free-form comment block into clean lines: the first line is the
//! summary, the rest is the body with its common indentation removed.

/// Split a docstring into normalized lines.
///
/// Blank lines at the edges of the result and at the edges of the body are
/// dropped; blank lines inside the body are kept as paragraph breaks.
pub fn split_doc(doc: Option<&str>) -> Vec<String> {
    let Some(doc) = doc.filter(|d| !d.is_empty()) else {
        return Vec::new();
    };

    let mut lines = doc.lines();
    let summary = lines.next().unwrap_or_default().trim().to_string();
    let rest: Vec<&str> = lines.collect();

    // First line doesn't count towards the common indent
    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut body: Vec<String> = rest
        .iter()
        .map(|line| strip_chars(line, indent).trim_end().to_string())
        .collect();
    trim_blank_edges(&mut body);

    let mut trimmed = Vec::with_capacity(body.len() + 1);
    trimmed.push(summary);
    trimmed.extend(body);
    trim_blank_edges(&mut trimmed);
    trimmed
}

/// Drop the first `n` characters of `line`
fn strip_chars(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((at, _)) => &line[at..],
        None => "",
    }
}

fn trim_blank_edges(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines.drain(..leading);
}
