//! WordprocessingML document model and package I/O.
//!
//! This crate holds the subset of a `.docx` document the primer pipeline
//! works with: styled paragraphs made of runs, tables, a style registry and
//! section page geometry. [`Document::open`] loads that subset from an
//! existing package (anything it does not model is skipped, so templates
//! produced by other tools still load), and [`Document::save`] serializes
//! the model back into a complete package, atomically.
//!
//! # Example
//!
//! ```
//! use primer_docx::{Document, RunStyle};
//!
//! let mut doc = Document::new();
//! let style_id = doc.style_id("Heading 1");
//! let paragraph = doc.add_paragraph();
//! paragraph.style_id = style_id;
//! paragraph.push_text("Hello", RunStyle::default());
//! assert_eq!(paragraph.text(), "Hello");
//! ```

mod document;
mod error;
mod read;
mod styles;
mod write;

pub use document::{
    Block, Break, Document, Indent, PageLayout, Paragraph, Pt, Run, RunStyle, Table, TableCell,
    TableRow, TextRun,
};
pub use error::DocxError;
pub use styles::{Style, StyleKind, StyleRegistry};
