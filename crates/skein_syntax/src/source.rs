use crate::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

#[derive(Clone, Debug)]
pub struct SourceText {
    text: String,
    line_starts: Vec<u32>,
}

impl SourceText {
    pub fn new(text: String) -> Self {
        let mut line_starts = Vec::with_capacity(text.len().saturating_div(64).max(32));
        line_starts.push(0u32);
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { text, line_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn slice(&self, span: Span) -> &str {
        let start = (span.start.0 as usize).min(self.text.len());
        let end = (span.end.0 as usize).clamp(start, self.text.len());
        &self.text[start..end]
    }

    /// Zero-based line and character column of a byte offset.
    pub fn line_col(&self, byte: u32) -> (u32, u32) {
        let byte = byte.min(self.text.len() as u32);
        let idx = match self.line_starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line = idx as u32;
        let line_start = self.line_starts[idx] as usize;
        let mut target = byte as usize;
        while target > line_start && !self.text.is_char_boundary(target) {
            target = target.saturating_sub(1);
        }
        let col = self.text[line_start..target].chars().count() as u32;
        (line, col)
    }

    /// Text of a zero-based line without its terminator.
    pub fn line_text(&self, line: u32) -> &str {
        let Some(&start) = self.line_starts.get(line as usize) else {
            return "";
        };
        let start = start as usize;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|&e| e as usize - 1)
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches('\r')
    }
}

/// Where a failure happened, resolved against its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    /// One-based.
    pub line: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub source_line: String,
}

#[derive(Clone, Debug)]
pub struct SourceFile {
    pub id: SourceId,
    pub name: String,
    pub text: SourceText,
}

impl SourceFile {
    pub fn new(id: SourceId, name: impl Into<String>, text: String) -> Self {
        Self {
            id,
            name: name.into(),
            text: SourceText::new(text),
        }
    }

    pub fn location(&self, span: Span) -> Location {
        let (line, start_col) = self.text.line_col(span.start.0);
        let (end_line, end_col) = self.text.line_col(span.end.0);
        let source_line = self.text.line_text(line).to_string();
        let end_col = if end_line == line {
            end_col.max(start_col + 1)
        } else {
            (source_line.chars().count() as u32).max(start_col + 1)
        };
        Location {
            name: self.name.clone(),
            line: line + 1,
            start_col,
            end_col,
            source_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_covers_span_on_one_line() {
        let src = SourceFile::new(SourceId(0), "a.js", "let a = 1;\nfoo(bar);\n".to_string());
        let loc = src.location(Span::new(11, 14));
        assert_eq!(loc.line, 2);
        assert_eq!(loc.start_col, 0);
        assert_eq!(loc.end_col, 3);
        assert_eq!(loc.source_line, "foo(bar);");
    }

    #[test]
    fn location_clamps_multi_line_span_to_first_line() {
        let src = SourceFile::new(SourceId(0), "b.js", "f(1,\n  2)".to_string());
        let loc = src.location(Span::new(0, 9));
        assert_eq!(loc.line, 1);
        assert_eq!((loc.start_col, loc.end_col), (0, 4));
    }

    #[test]
    fn empty_span_still_gets_one_caret() {
        let src = SourceFile::new(SourceId(0), "c.js", "x".to_string());
        let loc = src.location(Span::new(1, 1));
        assert_eq!((loc.start_col, loc.end_col), (1, 2));
    }
}
