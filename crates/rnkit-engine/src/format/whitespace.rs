//! Whitespace normalization.

use std::ops::Range;

enum Line {
    Blank,
    Text { text: String, protected: bool },
}

/// Trims trailing whitespace, collapses blank-line runs to one, drops blank
/// lines right after an opening brace or right before a closing one, removes
/// leading and trailing blank lines and ends the text with one newline.
/// Lines inside `protected` ranges (template literals) are left untouched.
pub fn tidy(text: &str, protected: &[Range<usize>]) -> String {
    let inside = |offset: usize| protected.iter().any(|r| r.start < offset && offset < r.end);

    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in text.split('\n') {
        let start = offset;
        let end = start + raw.len();
        offset = end + 1;

        let starts_inside = inside(start);
        let text = if inside(end) { raw.to_string() } else { raw.trim_end().to_string() };
        if !starts_inside && text.trim().is_empty() {
            lines.push(Line::Blank);
        } else {
            lines.push(Line::Text {
                text,
                protected: starts_inside,
            });
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut pending_blank = false;
    for line in lines {
        match line {
            Line::Blank => {
                let after_open = out
                    .last()
                    .map(|l| l.trim_end().ends_with('{'))
                    .unwrap_or(true);
                if !after_open {
                    pending_blank = true;
                }
            }
            Line::Text { text, protected } => {
                let closes = !protected && text.trim_start().starts_with('}');
                if pending_blank && !closes {
                    out.push(String::new());
                }
                pending_blank = false;
                out.push(text);
            }
        }
    }

    if out.is_empty() {
        return String::new();
    }
    let mut result = out.join("\n");
    result.push('\n');
    result
}
