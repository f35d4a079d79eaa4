use std::ffi::{OsStr, OsString};

pub const PIPE: &str = "|";
pub const SEQUENCE: &str = ";";

/// What ended a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Pipe,
    Sequence,
    End,
}

/// One command's argument vector plus the delimiter that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub argv: Vec<OsString>,
    pub delimiter: Delimiter,
}

impl Segment {
    /// True when the next segment reads this one's output.
    pub fn is_piped(&self) -> bool {
        self.delimiter == Delimiter::Pipe
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

fn delimiter_of(token: &OsStr) -> Option<Delimiter> {
    if token == PIPE {
        Some(Delimiter::Pipe)
    } else if token == SEQUENCE {
        Some(Delimiter::Sequence)
    } else {
        None
    }
}

/// Lazy scan over a token list, yielding one segment per call.
///
/// Leading `;` tokens are skipped. Two adjacent delimiters otherwise produce
/// an empty segment, which callers treat as a no-op. A `;` straight after a
/// `|` is never skipped: it comes back as an empty `Sequence` segment so the
/// pipeline is closed at that boundary.
pub struct Segments<'a> {
    tokens: &'a [OsString],
    cursor: usize,
    after_pipe: bool,
}

impl<'a> Segments<'a> {
    pub fn new(tokens: &'a [OsString]) -> Self {
        Self {
            tokens,
            cursor: 0,
            after_pipe: false,
        }
    }

    /// Index of the next unconsumed token.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn at_sequence(&self) -> bool {
        self.tokens
            .get(self.cursor)
            .is_some_and(|t| delimiter_of(t) == Some(Delimiter::Sequence))
    }

    fn skip_sequences(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            if delimiter_of(token) != Some(Delimiter::Sequence) {
                break;
            }
            self.cursor += 1;
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if std::mem::take(&mut self.after_pipe) && self.at_sequence() {
            self.cursor += 1;
            return Some(Segment {
                argv: Vec::new(),
                delimiter: Delimiter::Sequence,
            });
        }

        self.skip_sequences();
        if self.cursor >= self.tokens.len() {
            return None;
        }

        let start = self.cursor;
        let end = self.tokens[start..]
            .iter()
            .position(|t| delimiter_of(t).is_some())
            .map_or(self.tokens.len(), |n| start + n);

        let delimiter = self
            .tokens
            .get(end)
            .and_then(|t| delimiter_of(t))
            .unwrap_or(Delimiter::End);

        // Step over the delimiter itself, never past the end.
        self.cursor = if end < self.tokens.len() { end + 1 } else { end };
        self.after_pipe = delimiter == Delimiter::Pipe;

        Some(Segment {
            argv: self.tokens[start..end].to_vec(),
            delimiter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<OsString> {
        words.iter().map(OsString::from).collect()
    }

    fn argv(segment: &Segment) -> Vec<&str> {
        segment.argv.iter().map(|a| a.to_str().unwrap()).collect()
    }

    #[test]
    fn test_single_command() {
        let toks = tokens(&["/bin/echo", "hi", "there"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 1);
        assert_eq!(argv(&segs[0]), ["/bin/echo", "hi", "there"]);
        assert_eq!(segs[0].delimiter, Delimiter::End);
    }

    #[test]
    fn test_pipe_then_sequence() {
        let toks = tokens(&["echo", "hi", "|", "cat", ";", "cd", "/nonexistent"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(argv(&segs[0]), ["echo", "hi"]);
        assert!(segs[0].is_piped());
        assert_eq!(argv(&segs[1]), ["cat"]);
        assert_eq!(segs[1].delimiter, Delimiter::Sequence);
        assert_eq!(argv(&segs[2]), ["cd", "/nonexistent"]);
        assert_eq!(segs[2].delimiter, Delimiter::End);
    }

    #[test]
    fn test_leading_and_repeated_semicolons_skipped() {
        let toks = tokens(&[";", ";", "a", ";", ";", "b", ";"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(argv(&segs[0]), ["a"]);
        assert_eq!(argv(&segs[1]), ["b"]);
        assert_eq!(segs[1].delimiter, Delimiter::Sequence);
    }

    #[test]
    fn test_adjacent_pipes_yield_empty_segment() {
        let toks = tokens(&["a", "|", "|", "b"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 3);
        assert!(segs[1].is_empty());
        assert!(segs[1].is_piped());
        assert_eq!(argv(&segs[2]), ["b"]);
    }

    #[test]
    fn test_leading_pipe_is_empty_piped_segment() {
        let toks = tokens(&["|", "cat"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert!(segs[0].is_empty());
        assert!(segs[0].is_piped());
        assert_eq!(argv(&segs[1]), ["cat"]);
    }

    #[test]
    fn test_trailing_pipe() {
        let toks = tokens(&["a", "|"]);
        let mut segs = Segments::new(&toks);
        let first = segs.next().unwrap();
        assert!(first.is_piped());
        assert_eq!(segs.cursor(), 2);
        assert!(segs.next().is_none());
    }

    #[test]
    fn test_semicolon_after_pipe_ends_pipeline() {
        let toks = tokens(&["a", "|", ";", "b"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(argv(&segs[0]), ["a"]);
        assert!(segs[0].is_piped());
        assert!(segs[1].is_empty());
        assert_eq!(segs[1].delimiter, Delimiter::Sequence);
        assert_eq!(argv(&segs[2]), ["b"]);
        assert_eq!(segs[2].delimiter, Delimiter::End);
    }

    #[test]
    fn test_semicolon_run_after_pipe_yields_one_boundary() {
        let toks = tokens(&["a", "|", ";", ";", ";", "b"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 3);
        assert!(segs[1].is_empty());
        assert_eq!(segs[1].delimiter, Delimiter::Sequence);
        assert_eq!(argv(&segs[2]), ["b"]);
    }

    #[test]
    fn test_trailing_pipe_then_semicolon() {
        let toks = tokens(&["a", "|", ";"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].delimiter, Delimiter::Sequence);
        assert!(segs[1].is_empty());
    }

    #[test]
    fn test_empty_input() {
        let toks: Vec<OsString> = Vec::new();
        assert!(Segments::new(&toks).next().is_none());
        let only_seps = tokens(&[";", ";"]);
        assert!(Segments::new(&only_seps).next().is_none());
    }

    #[test]
    fn test_delimiter_must_match_whole_token() {
        let toks = tokens(&["echo", "a|b", ";;", "x;"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].argv.len(), 4);
    }

    #[test]
    fn test_tokens_are_copied_not_moved() {
        let toks = tokens(&["a", "|", "b"]);
        let segs: Vec<Segment> = Segments::new(&toks).collect();
        drop(segs);
        assert_eq!(toks.len(), 3);
    }
}
