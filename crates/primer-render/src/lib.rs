//! Markdown-to-document rendering engine for client primers.
//!
//! Turns a structured markdown primer into a styled document, optionally
//! inside a reusable template: the template's `{{CONTENT}}` placeholder
//! marks where rendered blocks are inserted, `{{COMPANY}}` and `{{DATE}}`
//! are substituted, and `{{CONTACT}}` paragraphs are removed.
//!
//! The engine is a two-pass interpreter over the pulldown-cmark event
//! stream: [`group_blocks`] folds events into a closed set of [`Block`]
//! variants (headings, paragraphs with list context, rules, code fences,
//! buffered table grids), and an emission pass writes each variant through
//! an insertion cursor that preserves document order even when rendering
//! starts mid-document.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! primer_render::render_primer(
//!     Path::new("clients/acme/primer.md"),
//!     Path::new("clients/acme/latest/primer.docx"),
//!     Some(Path::new("templates/primer_template.docx")),
//! )?;
//! # Ok::<(), primer_render::RenderError>(())
//! ```

mod blocks;
mod error;
mod inline;
mod render;
mod styles;
mod table;
mod template;
mod writer;

pub use blocks::{Block, ListKind, group_blocks};
pub use error::RenderError;
pub use render::render_primer;
pub use styles::{StyleProfile, merged};
pub use template::{
    COMPANY_PLACEHOLDER, CONTACT_PLACEHOLDER, CONTENT_PLACEHOLDER, DATE_PLACEHOLDER,
    FALLBACK_COMPANY,
};
