//! Template bootstrap and placeholder resolution.
//!
//! Before any content renders, the template decides where rendering starts:
//! the first body paragraph carrying the content placeholder becomes the
//! insertion anchor (and, once emptied, the reusable first slot). Contact
//! paragraphs are removed wholesale; company and date placeholders are
//! substituted everywhere, table cells included.

use std::path::Path;

use primer_docx::{Block, Document, Paragraph};
use primer_repo::resolve_company_name;

use crate::error::RenderError;
use crate::writer::CursorStart;

/// Content insertion point.
pub const CONTENT_PLACEHOLDER: &str = "{{CONTENT}}";

/// Paragraph removed wholesale when present.
pub const CONTACT_PLACEHOLDER: &str = "{{CONTACT}}";

/// Substituted with the resolved company name.
pub const COMPANY_PLACEHOLDER: &str = "{{COMPANY}}";

/// Substituted with the current date.
pub const DATE_PLACEHOLDER: &str = "{{DATE}}";

/// Literal fallback when no lead record resolves a company name.
pub const FALLBACK_COMPANY: &str = "Unknown Company";

/// Load or bootstrap the output document.
///
/// Without a template this is a blank document. A template path that does
/// not exist yet is synthesized first, so the first run against a fresh
/// directory behaves like every later run.
pub(crate) fn load_document(template_path: Option<&Path>) -> Result<Document, RenderError> {
    let Some(template_path) = template_path else {
        return Ok(Document::new());
    };

    ensure_template(template_path)?;
    if template_path.is_dir() {
        return Err(RenderError::TemplateIsDirectory(template_path.to_path_buf()));
    }
    Ok(Document::open(template_path)?)
}

/// Find the content placeholder, strip it in place, and work out where
/// rendering starts.
///
/// Must run after every block-removing mutation (the cursor is positional),
/// which is why contact-paragraph removal happens first.
pub(crate) fn locate_cursor(doc: &mut Document) -> CursorStart {
    let anchor = doc.blocks.iter().position(|block| match block {
        Block::Paragraph(paragraph) => paragraph.text().contains(CONTENT_PLACEHOLDER),
        Block::Table(_) => false,
    });
    let Some(index) = anchor else {
        tracing::debug!("no content placeholder, appending at end");
        return CursorStart::Append;
    };

    let Block::Paragraph(paragraph) = &mut doc.blocks[index] else {
        unreachable!("anchor position always points at a paragraph");
    };
    let stripped = paragraph.text().replace(CONTENT_PLACEHOLDER, "");
    let reusable = stripped.trim().is_empty();
    paragraph.set_text(stripped);
    CursorStart::At { index, reusable }
}

/// Synthesize the default template when the given path does not exist yet:
/// a company-title paragraph, a date paragraph, a page break and a bare
/// content placeholder. Persisted atomically so the first run is
/// idempotent.
fn ensure_template(path: &Path) -> Result<(), RenderError> {
    if path.exists() {
        return Ok(());
    }
    tracing::info!(path = %path.display(), "synthesizing default template");
    let mut doc = Document::new();
    doc.add_paragraph()
        .set_text(format!("{COMPANY_PLACEHOLDER} – Commercial Primer"));
    doc.add_paragraph()
        .set_text(format!("Date: {DATE_PLACEHOLDER}"));
    doc.add_page_break();
    doc.add_paragraph().set_text(CONTENT_PLACEHOLDER);
    doc.save(path)?;
    Ok(())
}

/// Resolve and substitute the company/date placeholders and drop contact
/// paragraphs, across body paragraphs and every table cell.
pub(crate) fn apply_placeholder_replacements(doc: &mut Document, markdown_path: &Path) {
    let company =
        resolve_company_name(markdown_path).unwrap_or_else(|| FALLBACK_COMPANY.to_owned());
    let date = today();
    substitute_placeholders(doc, &company, &date);
}

/// Placeholder substitution with explicit values (separated from the
/// company/date resolution for testability).
pub(crate) fn substitute_placeholders(doc: &mut Document, company: &str, date: &str) {
    doc.blocks.retain_mut(|block| match block {
        Block::Paragraph(paragraph) => process_paragraph(paragraph, company, date),
        Block::Table(table) => {
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    cell.paragraphs
                        .retain_mut(|paragraph| process_paragraph(paragraph, company, date));
                }
            }
            true
        }
    });
}

/// Returns `false` when the paragraph must be removed.
fn process_paragraph(paragraph: &mut Paragraph, company: &str, date: &str) -> bool {
    let text = paragraph.text();
    if text.contains(CONTACT_PLACEHOLDER) {
        return false;
    }
    if text.is_empty() {
        return true;
    }
    let updated = text
        .replace(COMPANY_PLACEHOLDER, company)
        .replace(DATE_PLACEHOLDER, date);
    if updated != text {
        paragraph.set_text(updated);
    }
    true
}

/// Current local date in ISO `YYYY-MM-DD` form.
fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use primer_docx::{Table, TableCell, TableRow};

    #[test]
    fn test_no_template_starts_blank_and_appends() {
        let mut doc = load_document(None).unwrap();
        assert!(doc.blocks.is_empty());
        assert_eq!(locate_cursor(&mut doc), CursorStart::Append);
    }

    #[test]
    fn test_missing_template_is_synthesized_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");

        let mut doc = load_document(Some(&path)).unwrap();
        assert!(path.is_file());
        let cursor = locate_cursor(&mut doc);
        // Banner, date, page break, then the emptied placeholder carrier.
        assert_eq!(doc.blocks.len(), 4);
        assert_eq!(cursor, CursorStart::At { index: 3, reusable: true });

        let first = doc.paragraphs().next().unwrap();
        assert_eq!(first.text(), "{{COMPANY}} – Commercial Primer");

        // The synthesized file is reused on the next run, not rewritten.
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();
        let mut again = load_document(Some(&path)).unwrap();
        assert_eq!(locate_cursor(&mut again), cursor);
        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_template_directory_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_document(Some(dir.path()));
        assert!(matches!(result, Err(RenderError::TemplateIsDirectory(_))));
    }

    #[test]
    fn test_placeholder_with_surrounding_text_is_anchor_not_reusable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");

        let mut template = Document::new();
        template.add_paragraph().set_text("Intro {{CONTENT}} outro");
        template.save(&path).unwrap();

        let mut doc = load_document(Some(&path)).unwrap();
        let cursor = locate_cursor(&mut doc);
        assert_eq!(cursor, CursorStart::At { index: 0, reusable: false });
        assert_eq!(doc.paragraphs().next().unwrap().text(), "Intro  outro");
    }

    #[test]
    fn test_template_without_placeholder_appends_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");

        let mut template = Document::new();
        template.add_paragraph().set_text("Just a banner");
        template.save(&path).unwrap();

        let mut doc = load_document(Some(&path)).unwrap();
        assert_eq!(locate_cursor(&mut doc), CursorStart::Append);
    }

    #[test]
    fn test_contact_removal_shifts_cursor_correctly() {
        let mut doc = Document::new();
        doc.add_paragraph().set_text("{{COMPANY}}");
        doc.add_paragraph().set_text("Reach us: {{CONTACT}}");
        doc.add_paragraph().set_text("{{CONTENT}}");

        substitute_placeholders(&mut doc, "Acme", "2026-08-05");
        let cursor = locate_cursor(&mut doc);

        // The contact paragraph is gone, so the carrier sits at index 1.
        assert_eq!(cursor, CursorStart::At { index: 1, reusable: true });
    }

    #[test]
    fn test_substitution_is_exhaustive_and_exclusive() {
        let mut doc = Document::new();
        doc.add_paragraph().set_text("{{COMPANY}} primer");
        doc.add_paragraph().set_text("Date: {{DATE}}");
        doc.add_paragraph().set_text("Contact: {{CONTACT}}");

        substitute_placeholders(&mut doc, "Acme Corp", "2026-08-05");

        let texts: Vec<_> = doc.paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["Acme Corp primer", "Date: 2026-08-05"]);
    }

    #[test]
    fn test_substitution_reaches_table_cells() {
        let mut doc = Document::new();
        let mut company_cell = Paragraph::default();
        company_cell.set_text("{{COMPANY}}");
        let mut contact_cell = Paragraph::default();
        contact_cell.set_text("{{CONTACT}}");
        doc.blocks.push(Block::Table(Table {
            rows: vec![TableRow {
                cells: vec![
                    TableCell {
                        paragraphs: vec![company_cell],
                    },
                    TableCell {
                        paragraphs: vec![contact_cell],
                    },
                ],
            }],
            ..Table::default()
        }));

        substitute_placeholders(&mut doc, "Globex", "2026-08-05");

        let Block::Table(table) = &doc.blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.rows[0].cells[0].paragraphs[0].text(), "Globex");
        assert!(table.rows[0].cells[1].paragraphs.is_empty());
    }

    #[test]
    fn test_untouched_paragraphs_keep_their_runs() {
        let mut doc = Document::new();
        let paragraph = doc.add_paragraph();
        paragraph.push_text("styled", primer_docx::RunStyle {
            bold: true,
            ..primer_docx::RunStyle::default()
        });

        substitute_placeholders(&mut doc, "Acme", "2026-08-05");

        let kept = doc.paragraphs().next().unwrap();
        assert_eq!(kept.runs.len(), 1);
        assert!(matches!(&kept.runs[0], primer_docx::Run::Text(run) if run.style.bold));
    }

    #[test]
    fn test_today_is_iso_formatted() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[4], b'-');
        assert_eq!(date.as_bytes()[7], b'-');
    }
}
