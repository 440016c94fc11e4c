//! Text lines
//!
//! A document line is one record; its identity is its position.

use super::Record;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextLine {
    pub content: String,
}

impl TextLine {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Record for TextLine {
    const KIND: &'static str = "line";
    const MIN_FIELDS: usize = 1;
    const SKIP_BLANK: bool = false;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        Some(Self::new(fields[0]))
    }

    fn write_fields(&self, out: &mut String) {
        out.push_str(&self.content);
    }

    // The whole line is the content; commas are text here.
    fn split(line: &str) -> Vec<&str> {
        vec![line]
    }
}
