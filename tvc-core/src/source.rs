use std::fmt;

/// A byte range into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteSpan {
    pub start: u32,
    pub end: u32,
}

impl ByteSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// `{ file, line, column, sourceLineText }` — immutable once computed, derived
/// from a byte offset by scanning newlines (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub source_line_text: String,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Scans `source` for newlines up to `offset` to compute a 1-indexed
/// line/column and the full text of that line, used both by diagnostics and
/// by any pass that needs to report a location back to the caller.
pub fn locate(source: &str, offset: u32, file: &str) -> SourceLoc {
    let offset = offset as usize;
    let bytes = source.as_bytes();
    let clamped = offset.min(bytes.len());

    let mut line: u32 = 1;
    let mut last_newline: usize = 0;
    for (i, b) in bytes[..clamped].iter().enumerate() {
        if *b == b'\n' {
            line += 1;
            last_newline = i + 1;
        }
    }
    let column = (clamped - last_newline) as u32 + 1;

    let line_end = bytes[clamped..]
        .iter()
        .position(|b| *b == b'\n')
        .map(|p| clamped + p)
        .unwrap_or(bytes.len());
    let source_line_text = String::from_utf8_lossy(&bytes[last_newline..line_end]).into_owned();

    SourceLoc {
        file: file.to_string(),
        line,
        column,
        source_line_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_first_line() {
        let loc = locate("let x = 1;\nlet y = 2;", 4, "app.svelte");
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.source_line_text, "let x = 1;");
    }

    #[test]
    fn locates_second_line() {
        let loc = locate("let x = 1;\nlet y = 2;", 15, "app.svelte");
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.source_line_text, "let y = 2;");
    }

    #[test]
    fn clamps_past_end_of_source() {
        let loc = locate("abc", 999, "app.svelte");
        assert_eq!(loc.line, 1);
        assert_eq!(loc.source_line_text, "abc");
    }
}
