//! Line markup
//!
//! A line of output is written as a string with inline style escapes:
//! `#<tag><text>` starts a new segment in the style selected by the one-letter
//! tag. Text before any escape is in the default style.
//!
//! ```text
//! #Hget#D  - prints the value of an environment variable.
//! └─┬─┘└──────────────────┬──────────────────────────────┘
//!  Header              Default
//! ```
//!
//! `#` is the only reserved character. A `#` followed by a letter that is not
//! a known tag is kept as literal text in the current segment.

use std::fmt;

/// Style escape character
pub const ESCAPE: char = '#';

/// Shown in place of an empty segment so it still takes up a cell
pub const NBSP: &str = "\u{a0}";

/// Visual style of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    #[default]
    Default,
    Header,
    Error,
    Rainbow,
}

impl Style {
    /// Look up a tag code (case-sensitive)
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'D' => Some(Style::Default),
            'H' => Some(Style::Header),
            'E' => Some(Style::Error),
            'r' => Some(Style::Rainbow),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Style::Default => 'D',
            Style::Header => 'H',
            Style::Error => 'E',
            Style::Rainbow => 'r',
        }
    }
}

/// A run of text in one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub style: Style,
    pub text: String,
}

impl Segment {
    pub fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    /// Text as displayed; empty segments become a non-breaking space
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() {
            NBSP
        } else {
            &self.text
        }
    }
}

/// One parsed output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    segments: Vec<Segment>,
}

impl StyledLine {
    /// Parse a markup string into styled segments
    pub fn parse(text: &str) -> Self {
        let prefixed;
        let text: &str = if text.starts_with(ESCAPE) {
            text
        } else {
            prefixed = format!("{}{}{}", ESCAPE, Style::Default.code(), text);
            prefixed.as_str()
        };

        let mut segments: Vec<Segment> = Vec::new();

        // The first fragment precedes the leading escape and is always empty
        for fragment in text.split(ESCAPE).skip(1) {
            let mut chars = fragment.chars();
            match chars.next().and_then(Style::from_code) {
                Some(style) => segments.push(Segment::new(style, chars.as_str())),
                None => {
                    // Unknown or missing tag: keep the escape as literal text
                    let literal = format!("{}{}", ESCAPE, fragment);
                    match segments.last_mut() {
                        Some(last) => last.text.push_str(&literal),
                        None => segments.push(Segment::new(Style::Default, literal)),
                    }
                }
            }
        }

        Self { segments }
    }

    /// A single empty default segment
    pub fn blank() -> Self {
        Self {
            segments: vec![Segment::new(Style::Default, "")],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Text as a reader would see it, styles dropped
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(Segment::display_text).collect()
    }

    /// Encode back into markup
    #[allow(dead_code)]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push(ESCAPE);
            out.push(segment.style.code());
            out.push_str(&segment.text);
        }
        out
    }
}

impl fmt::Display for StyledLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain_text())
    }
}

/// Parse an optional markup string; `None` yields a blank line
pub fn parse_line(text: Option<&str>) -> StyledLine {
    match text {
        Some(text) => StyledLine::parse(text),
        None => StyledLine::blank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_then_default() {
        let line = StyledLine::parse("#Hfoo#Dbar");
        assert_eq!(
            line.segments(),
            &[
                Segment::new(Style::Header, "foo"),
                Segment::new(Style::Default, "bar"),
            ]
        );
        assert_eq!(line.plain_text(), "foobar");
    }

    #[test]
    fn test_untagged_text_is_default() {
        let line = StyledLine::parse("a b c");
        assert_eq!(line.segments(), &[Segment::new(Style::Default, "a b c")]);
    }

    #[test]
    fn test_blank_lines() {
        let none = parse_line(None);
        let empty = parse_line(Some(""));
        assert_eq!(none, empty);
        assert_eq!(none, StyledLine::blank());
        assert_eq!(none.segments().len(), 1);
        assert_eq!(none.plain_text(), NBSP);
    }

    #[test]
    fn test_empty_segment_is_nbsp() {
        let line = StyledLine::parse("#Hname#D");
        assert_eq!(line.segments()[1].text, "");
        assert_eq!(line.plain_text(), format!("name{}", NBSP));
    }

    #[test]
    fn test_all_tags() {
        let line = StyledLine::parse("#Dd#Hh#Ee#rr");
        let styles: Vec<Style> = line.segments().iter().map(|s| s.style).collect();
        assert_eq!(
            styles,
            vec![Style::Default, Style::Header, Style::Error, Style::Rainbow]
        );
    }

    #[test]
    fn test_unknown_tag_is_literal() {
        let line = StyledLine::parse("#Hissue #5 open");
        assert_eq!(line.segments(), &[Segment::new(Style::Header, "issue #5 open")]);

        // Tags are case-sensitive: 'R' is not rainbow
        let line = StyledLine::parse("#Rtext");
        assert_eq!(line.segments(), &[Segment::new(Style::Default, "#Rtext")]);
    }

    #[test]
    fn test_bare_escape() {
        let line = StyledLine::parse("a##b#");
        assert_eq!(line.segments(), &[Segment::new(Style::Default, "a##b#")]);
    }

    #[test]
    fn test_to_markup() {
        let line = StyledLine::parse("#Eerror#D: oops");
        assert_eq!(line.to_markup(), "#Eerror#D: oops");
        assert_eq!(StyledLine::parse("plain").to_markup(), "#Dplain");
    }
}
