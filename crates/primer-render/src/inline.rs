//! Inline run extraction.
//!
//! Collects the inline events of one block into an ordered run sequence.
//! Emphasis markers toggle style flags, code spans force the fixed-width
//! font, images collapse to a literal follow-up marker, and links are
//! unwrapped to their inner text. Adjacent runs with identical style merge;
//! a hard break is a styleless marker that never merges.

use primer_docx::{Break, Run, RunStyle};
use pulldown_cmark::{Tag, TagEnd};

use crate::styles::FIXED_WIDTH_FONT;

/// Collects inline events into a run sequence.
#[derive(Debug, Default)]
pub(crate) struct RunCollector {
    runs: Vec<Run>,
    /// Nesting depth of `Strong` markers.
    bold: u32,
    /// Nesting depth of `Emphasis` markers.
    italic: u32,
    /// Alt-text buffer, `Some` while inside an image tag.
    alt_text: Option<String>,
}

impl RunCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Handle an inline container opening. Unrecognized tags are ignored.
    pub(crate) fn start(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Strong => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::Image { .. } => self.alt_text = Some(String::new()),
            // Links keep their inner text only.
            Tag::Link { .. } => {}
            _ => {}
        }
    }

    /// Handle an inline container closing.
    pub(crate) fn end(&mut self, tag: &TagEnd) {
        match tag {
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Image => self.flush_image(),
            TagEnd::Link => {}
            _ => {}
        }
    }

    /// Plain text in the current style.
    pub(crate) fn text(&mut self, text: &str) {
        if let Some(alt) = self.alt_text.as_mut() {
            alt.push_str(text);
            return;
        }
        let style = self.current_style();
        self.push_run(text, style);
    }

    /// An inline code span: fixed-width font, never combined with the
    /// surrounding emphasis.
    pub(crate) fn code(&mut self, code: &str) {
        if let Some(alt) = self.alt_text.as_mut() {
            alt.push_str(code);
            return;
        }
        let style = RunStyle {
            font: Some(FIXED_WIDTH_FONT.to_owned()),
            ..RunStyle::default()
        };
        self.push_run(code, style);
    }

    /// A soft line wrap collapses to a single space.
    pub(crate) fn soft_break(&mut self) {
        self.text(" ");
    }

    /// A hard break forces a new visual line within the paragraph.
    pub(crate) fn hard_break(&mut self) {
        if self.alt_text.is_some() {
            return;
        }
        self.runs.push(Run::Break(Break::Line));
    }

    /// Finish collection. An image left unclosed still yields its marker.
    pub(crate) fn finish(mut self) -> Vec<Run> {
        if self.alt_text.is_some() {
            self.flush_image();
        }
        self.runs
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn current_style(&self) -> RunStyle {
        RunStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            font: None,
        }
    }

    /// Images are never embedded; they become a literal marker for manual
    /// follow-up, styled like the surrounding text.
    fn flush_image(&mut self) {
        let Some(alt) = self.alt_text.take() else {
            return;
        };
        let marker = if alt.is_empty() {
            "TODO: image omitted".to_owned()
        } else {
            format!("TODO: image omitted ({alt})")
        };
        let style = self.current_style();
        self.push_run(&marker, style);
    }

    /// Append text, merging into the previous run when the style matches.
    fn push_run(&mut self, text: &str, style: RunStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(Run::Text(last)) = self.runs.last_mut()
            && last.style == style
        {
            last.text.push_str(text);
            return;
        }
        self.runs.push(Run::text(text, style));
    }
}
