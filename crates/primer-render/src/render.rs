//! The rendering pipeline.
//!
//! `render_primer` runs the whole sequence: bootstrap the output document
//! from the template, resolve placeholders, apply the style profile, group
//! the markdown into blocks and emit them through the insertion cursor,
//! then persist atomically.

use std::fs;
use std::path::Path;

use primer_docx::{Indent, Paragraph, Pt, RunStyle, Table, TableCell, TableRow};
use pulldown_cmark::{Options, Parser};

use crate::blocks::{Block, ListKind, group_blocks};
use crate::error::RenderError;
use crate::styles::{FIXED_WIDTH_FONT, apply_style_profile, apply_table_profile};
use crate::table::TableGrid;
use crate::template;
use crate::writer::DocWriter;

/// Hanging-indent profile for list-item paragraphs: the bullet or number
/// hangs left of the wrapped text.
const LIST_INDENT: Indent = Indent {
    left: Pt(18.0),
    first_line: Pt(-9.0),
};

/// Render a markdown primer into a document at `output_path`.
///
/// When `template_path` is given, rendering starts at the template's
/// content placeholder; a template that does not exist yet is synthesized
/// first. Without a template the output is built from a blank document.
///
/// # Errors
///
/// Fails fast when the template path is an existing directory, and on any
/// I/O or package failure reading the source or writing the destination.
pub fn render_primer(
    markdown_path: &Path,
    output_path: &Path,
    template_path: Option<&Path>,
) -> Result<(), RenderError> {
    let markdown = fs::read_to_string(markdown_path)
        .map_err(|source| RenderError::io(markdown_path, source))?;

    let mut doc = template::load_document(template_path)?;
    // Contact paragraphs are removed here, so the (positional) cursor must
    // be located afterwards.
    template::apply_placeholder_replacements(&mut doc, markdown_path);
    let cursor = template::locate_cursor(&mut doc);
    apply_style_profile(&mut doc);

    let parser = Parser::new_ext(&markdown, Options::ENABLE_TABLES);
    let blocks = group_blocks(parser);
    tracing::debug!(blocks = blocks.len(), "grouped markdown blocks");

    let mut writer = DocWriter::new(&mut doc, cursor);
    emit_blocks(&mut writer, &blocks);
    drop(writer);

    doc.save(output_path)?;
    tracing::info!(
        source = %markdown_path.display(),
        output = %output_path.display(),
        "rendered primer"
    );
    Ok(())
}

/// Emit grouped blocks through the insertion cursor.
pub(crate) fn emit_blocks(writer: &mut DocWriter<'_>, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Heading { level, runs } => {
                let style = heading_style(*level, writer.document().has_style("Title"));
                let paragraph = writer.paragraph(Some(style));
                paragraph.runs = runs.clone();
            }
            Block::Paragraph { runs, list } => {
                let paragraph = match list {
                    Some(ListKind::Bullet) => writer.paragraph(Some("List Bullet")),
                    Some(ListKind::Ordered) => writer.paragraph(Some("List Number")),
                    None => writer.paragraph(Some("Normal")),
                };
                if list.is_some() && paragraph.indent.is_none() {
                    paragraph.indent = Some(LIST_INDENT);
                }
                paragraph.runs = runs.clone();
            }
            // A rule renders as vertical whitespace, not a drawn line.
            Block::Rule => {
                writer.paragraph(Some("Normal"));
            }
            Block::CodeFence { lines } => {
                for line in lines {
                    let paragraph = writer.paragraph(Some("Normal"));
                    if !line.is_empty() {
                        paragraph.push_text(
                            line,
                            RunStyle {
                                font: Some(FIXED_WIDTH_FONT.to_owned()),
                                ..RunStyle::default()
                            },
                        );
                    }
                }
            }
            Block::Table { grid } => {
                if grid.is_empty() {
                    continue;
                }
                let page = writer.document().page;
                let placed = writer.table(table_from_grid(grid));
                apply_table_profile(placed, &page);
            }
        }
    }
}

/// Style for a heading level: level 1 prefers the title style when the
/// document has one; levels past 3 flatten to the level-3 mapping.
fn heading_style(level: u8, has_title_style: bool) -> &'static str {
    match level {
        0 | 1 => {
            if has_title_style {
                "Title"
            } else {
                "Heading 1"
            }
        }
        2 => "Heading 1",
        _ => "Heading 2",
    }
}

/// Build a rectangular table from a buffered grid: column count is the
/// widest row, short rows get trailing blank cells.
fn table_from_grid(grid: &TableGrid) -> Table {
    let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
    let rows = grid
        .iter()
        .map(|row| TableRow {
            cells: (0..cols)
                .map(|idx| {
                    let mut paragraph = Paragraph::default();
                    if let Some(runs) = row.get(idx) {
                        paragraph.runs = runs.clone();
                    }
                    TableCell {
                        paragraphs: vec![paragraph],
                    }
                })
                .collect(),
        })
        .collect();
    Table {
        rows,
        ..Table::default()
    }
}
