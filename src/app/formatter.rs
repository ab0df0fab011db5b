//! Canonical layout for minified members.
//!
//! Rendering normalises layout only: members start at column zero, nested
//! lines keep their indentation relative to the member, tabs count as four
//! columns and trailing whitespace goes. Spacing between tokens on a line is
//! kept as written, so `class A{int x;}` and `class A { int x; }` stay distinct.

use crate::app::syntax::{indentation_width, MemberKind, MemberNode};

/// Lazily splits text on `\r\n`, `\n` or a lone `\r`.
#[derive(Debug, Clone)]
pub struct SourceLines<'a> {
    rest: Option<&'a str>,
}

impl<'a> SourceLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: Some(text) }
    }
}

impl<'a> Iterator for SourceLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(i) => {
                let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = Some(&rest[i + terminator..]);
                Some(&rest[..i])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

pub struct CanonicalFormatter;

impl CanonicalFormatter {
    /// Renders members in order. Declarations are separated by a blank line;
    /// comments and one-line preprocessor directives stick to what follows.
    pub fn render(members: &[&MemberNode]) -> String {
        let mut output = String::new();
        let mut previous: Option<MemberKind> = None;

        for member in members {
            if previous == Some(MemberKind::Declaration) {
                output.push('\n');
            }
            output.push_str(&Self::render_member(member));
            output.push('\n');
            previous = Some(member.kind);
        }

        output
    }

    /// Shifts the member to column zero. Continuation lines lose up to
    /// `member.indent` columns; lines inside multi-line literals are untouched.
    pub fn render_member(member: &MemberNode) -> String {
        let mut output = String::with_capacity(member.text.len());

        // Line numbering follows the parser's rows, which only break on '\n'.
        for (index, line) in member.text.split('\n').enumerate() {
            if index > 0 {
                output.push('\n');
            }
            if index > 0 && member.verbatim_lines.binary_search(&index).is_ok() {
                output.push_str(line);
                continue;
            }

            let line = line.strip_suffix('\r').unwrap_or(line);
            if index == 0 {
                output.push_str(line.trim());
            } else {
                output.push_str(&Self::reindent(line, member.indent));
            }
        }

        output
    }

    fn reindent(line: &str, base: usize) -> String {
        let content = line.trim_start_matches(|c: char| c == ' ' || c == '\t').trim_end();
        if content.is_empty() {
            return String::new();
        }
        let width = indentation_width(line);
        format!("{}{}", " ".repeat(width.saturating_sub(base)), content)
    }

    /// Drops whitespace-only lines and trailing whitespace; every kept line
    /// ends with `\n`. Leading whitespace and line order are preserved.
    pub fn strip_blank_lines(text: &str) -> String {
        SourceLines::new(text)
            .filter(|line| !line.trim().is_empty())
            .fold(String::with_capacity(text.len()), |mut output, line| {
                output.push_str(line.trim_end());
                output.push('\n');
                output
            })
    }
}

/// Estimated token count for `text` at `avg_chars_per_token` characters per token.
pub fn estimate_tokens(text: &str, avg_chars_per_token: f64) -> usize {
    let chars = text.chars().count();
    if !avg_chars_per_token.is_finite() || avg_chars_per_token <= 0.0 {
        return chars;
    }
    (chars as f64 / avg_chars_per_token).ceil() as usize
}
