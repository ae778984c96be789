//! In-memory document model.
//!
//! The model is deliberately shallow: a document is an ordered sequence of
//! body blocks (paragraphs and tables), a style registry and the section
//! page geometry. Fields are public so callers can rearrange blocks in
//! place; the insertion-order invariants live with the caller.

use crate::styles::StyleRegistry;

/// A length in points.
///
/// WordprocessingML serializes font sizes in half-points and spacing,
/// indents and page geometry in twentieths of a point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pt(pub f32);

impl Pt {
    /// Value in half-points (`w:sz`).
    #[must_use]
    pub fn half_points(self) -> i64 {
        (f64::from(self.0) * 2.0).round() as i64
    }

    /// Value in twentieths of a point (`w:spacing`, `w:ind`, `w:pgMar`).
    #[must_use]
    pub fn twentieths(self) -> i64 {
        (f64::from(self.0) * 20.0).round() as i64
    }

    #[must_use]
    pub fn from_half_points(value: i64) -> Self {
        Self(value as f32 / 2.0)
    }

    #[must_use]
    pub fn from_twentieths(value: i64) -> Self {
        Self(value as f32 / 20.0)
    }
}

/// Character-level formatting shared by a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    /// Font override (`w:rFonts`), e.g. a fixed-width face for code spans.
    pub font: Option<String>,
}

/// A contiguous span of text sharing one [`RunStyle`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub style: RunStyle,
}

/// An explicit break inside a paragraph (`w:br`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Break {
    /// New visual line within the same paragraph.
    Line,
    /// Page break.
    Page,
}

/// One run of a paragraph: either styled text or a break.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Run {
    Text(TextRun),
    Break(Break),
}

impl Run {
    /// Build a text run.
    #[must_use]
    pub fn text(text: impl Into<String>, style: RunStyle) -> Self {
        Self::Text(TextRun {
            text: text.into(),
            style,
        })
    }

    /// The run's text, empty for breaks.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(run) => &run.text,
            Self::Break(_) => "",
        }
    }
}

/// Paragraph indentation (`w:ind`). A negative `first_line` serializes as a
/// hanging indent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Indent {
    pub left: Pt,
    pub first_line: Pt,
}

/// A body or table-cell paragraph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    /// Referenced style id (`w:pStyle`), not a style name.
    pub style_id: Option<String>,
    pub indent: Option<Indent>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Concatenated text of all text runs.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::as_text).collect()
    }

    /// Replace all runs with a single unstyled run holding `text`.
    ///
    /// An empty `text` clears the paragraph entirely. Mirrors the
    /// collapse-to-one-run semantics of assigning paragraph text wholesale.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.runs.clear();
        if !text.is_empty() {
            self.runs.push(Run::text(text, RunStyle::default()));
        }
    }

    /// Append a text run without any merging.
    pub fn push_text(&mut self, text: impl Into<String>, style: RunStyle) {
        self.runs.push(Run::text(text, style));
    }
}

/// A table cell holding its own paragraph sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

/// One table row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A body table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// Fixed column sizing (`w:tblLayout w:type="fixed"`).
    pub fixed_layout: bool,
    /// Table width in fiftieths of a percent (`w:tblW w:type="pct"`);
    /// 5000 is full page width.
    pub width_pct: Option<u32>,
    /// Explicit column widths; when empty the grid splits evenly.
    pub col_widths: Vec<Pt>,
    /// Repeat the first row at the top of every page (`w:tblHeader`).
    pub header_row: bool,
}

impl Table {
    /// Number of grid columns: the widest row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }
}

/// One body block.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Section page geometry in twentieths of a point.
///
/// Defaults match a US Letter page with one-inch margins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    pub width: i64,
    pub height: i64,
    pub margin_left: i64,
    pub margin_right: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 12240,
            height: 15840,
            margin_left: 1440,
            margin_right: 1440,
            margin_top: 1440,
            margin_bottom: 1440,
        }
    }
}

impl PageLayout {
    /// Page width minus left and right margins.
    #[must_use]
    pub fn usable_width(&self) -> i64 {
        self.width - self.margin_left - self.margin_right
    }
}

/// The document: body blocks, styles and page geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub styles: StyleRegistry,
    pub page: PageLayout,
}

impl Document {
    /// A blank document seeded with the built-in style set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            styles: StyleRegistry::builtin(),
            page: PageLayout::default(),
        }
    }

    /// Append an empty paragraph and return it for filling.
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.blocks.push(Block::Paragraph(Paragraph::default()));
        match self.blocks.last_mut() {
            Some(Block::Paragraph(paragraph)) => paragraph,
            _ => unreachable!("last block was just pushed as a paragraph"),
        }
    }

    /// Append a paragraph holding a single page break.
    pub fn add_page_break(&mut self) {
        let paragraph = self.add_paragraph();
        paragraph.runs.push(Run::Break(Break::Page));
    }

    /// Body-level paragraphs in document order (table cells not included).
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            Block::Table(_) => None,
        })
    }

    /// Resolve a style name to its id, when the style exists.
    #[must_use]
    pub fn style_id(&self, name: &str) -> Option<String> {
        self.styles.id_for_name(name).map(str::to_owned)
    }

    /// Whether a style with this name is registered.
    #[must_use]
    pub fn has_style(&self, name: &str) -> bool {
        self.styles.by_name(name).is_some()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pt_conversions() {
        assert_eq!(Pt(18.0).half_points(), 36);
        assert_eq!(Pt(9.0).twentieths(), 180);
        assert_eq!(Pt(-9.0).twentieths(), -180);
        assert_eq!(Pt::from_half_points(32), Pt(16.0));
        assert_eq!(Pt::from_twentieths(480), Pt(24.0));
    }

    #[test]
    fn test_paragraph_text_concatenates_runs() {
        let mut paragraph = Paragraph::default();
        paragraph.push_text("Hello ", RunStyle::default());
        paragraph.push_text(
            "world",
            RunStyle {
                bold: true,
                ..RunStyle::default()
            },
        );
        paragraph.runs.push(Run::Break(Break::Line));
        assert_eq!(paragraph.text(), "Hello world");
    }

    #[test]
    fn test_set_text_collapses_runs() {
        let mut paragraph = Paragraph::default();
        paragraph.push_text("a", RunStyle::default());
        paragraph.push_text("b", RunStyle::default());
        paragraph.set_text("replaced");
        assert_eq!(paragraph.runs.len(), 1);
        assert_eq!(paragraph.text(), "replaced");

        paragraph.set_text("");
        assert!(paragraph.runs.is_empty());
    }

    #[test]
    fn test_table_column_count_is_widest_row() {
        let mut table = Table::default();
        table.rows.push(TableRow {
            cells: vec![TableCell::default(); 2],
        });
        table.rows.push(TableRow {
            cells: vec![TableCell::default(); 4],
        });
        table.rows.push(TableRow {
            cells: vec![TableCell::default(); 3],
        });
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn test_usable_width() {
        let page = PageLayout::default();
        assert_eq!(page.usable_width(), 9360);
    }

    #[test]
    fn test_blank_document_has_builtin_styles() {
        let doc = Document::new();
        assert!(doc.has_style("Title"));
        assert!(doc.has_style("Heading 1"));
        assert!(doc.has_style("Normal"));
        assert_eq!(doc.style_id("Heading 1").as_deref(), Some("Heading1"));
    }
}
