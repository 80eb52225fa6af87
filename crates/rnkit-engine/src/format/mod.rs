//! Pretty-printer and import organizer.
//!
//! [`normalize`] is a pure function of the file text: running it on its own
//! output returns the same bytes, which is what golden-file comparisons rely on.

mod imports;
mod whitespace;

pub use imports::{organize, ImportDecl};
pub use whitespace::tidy;

use std::ops::Range;
use std::path::Path;

use crate::diagnostic::EngineError;
use crate::source::{NodeKind, Origin, SourceFile, SourceParser};

/// Returns the normalized text of a file.
pub fn normalize(file: &SourceFile) -> Result<String, EngineError> {
    let organized = organize(file).replace("\r\n", "\n");
    let root = SourceParser::new(file.dialect())?.parse(&organized, file.path())?;
    let protected: Vec<Range<usize>> = root
        .find_all(|n| n.kind() == NodeKind::TemplateString)
        .iter()
        .map(|n| n.range())
        .collect();
    Ok(tidy(&organized, &protected))
}

/// Normalizes a text as if it were the content of `path`.
pub fn normalize_text(path: &Path, text: &str) -> Result<String, EngineError> {
    let file = SourceFile::parse(path, text, Origin::Created)?;
    normalize(&file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        let text = "import { b } from './b';\r\nimport a from 'a';   \r\n\r\n\r\n\r\nexport function f() {\r\n\r\n  return `x  \r\n\r\n`;\r\n}\r\n";
        let path = Path::new("src/f.ts");
        let once = normalize_text(path, text).unwrap();
        let twice = normalize_text(path, &once).unwrap();
        assert_eq!(once, twice);
        assert!(once.starts_with("import a from 'a';\n\nimport { b } from './b';\n\nexport function f() {\n  return"));
    }
}
