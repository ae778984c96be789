//! End-to-end pipeline tests: markdown file in, document package out.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use primer_docx::{Block, Document, Paragraph};
use primer_render::{RenderError, render_primer};

const SAMPLE: &str = "\
# Acme Primer

Opening paragraph with **bold** and `code`.

## Offering

- First point
- Second point

| Item | Price |
|------|-------|
| Widget | 10 |
";

fn render(dir: &Path, markdown: &str, template: Option<&Path>) -> Document {
    let md_path = dir.join("primer.md");
    let out_path = dir.join("out").join("primer.docx");
    fs::write(&md_path, markdown).unwrap();
    render_primer(&md_path, &out_path, template).unwrap();
    Document::open(&out_path).unwrap()
}

fn texts(doc: &Document) -> Vec<String> {
    doc.paragraphs().map(Paragraph::text).collect()
}

#[test]
fn test_render_without_template() {
    let dir = tempfile::tempdir().unwrap();
    let doc = render(dir.path(), SAMPLE, None);

    let paragraphs: Vec<_> = doc.paragraphs().collect();
    assert_eq!(paragraphs[0].text(), "Acme Primer");
    assert_eq!(paragraphs[0].style_id.as_deref(), Some("Title"));
    assert_eq!(paragraphs[2].text(), "Offering");
    assert_eq!(paragraphs[2].style_id.as_deref(), Some("Heading1"));
    assert_eq!(paragraphs[3].style_id.as_deref(), Some("ListBullet"));

    let table = doc
        .blocks
        .iter()
        .find_map(|block| match block {
            Block::Table(table) => Some(table),
            Block::Paragraph(_) => None,
        })
        .expect("table rendered");
    assert!(table.header_row);
    assert_eq!(table.rows[0].cells[0].paragraphs[0].text(), "Item");
}

#[test]
fn test_synthesized_template_output_matches_blank_render_after_banner() {
    let blank_dir = tempfile::tempdir().unwrap();
    let templated_dir = tempfile::tempdir().unwrap();
    let template_path = templated_dir.path().join("template.docx");

    let blank = render(blank_dir.path(), SAMPLE, None);
    let templated = render(templated_dir.path(), SAMPLE, Some(&template_path));

    // The template contributes three banner blocks (title, date, page
    // break); everything after them is structurally the blank render.
    assert_eq!(templated.blocks[3..], blank.blocks[..]);

    let banner = texts(&templated);
    assert_eq!(banner[0], "Unknown Company – Commercial Primer");
    assert!(banner[1].starts_with("Date: "));
    assert!(!banner[1].contains("{{DATE}}"));
}

#[test]
fn test_company_resolved_from_lead_record() {
    let dir = tempfile::tempdir().unwrap();
    let dossier = dir.path().join("_dossier");
    fs::create_dir_all(&dossier).unwrap();
    fs::write(
        dossier.join("lead_input.json"),
        r#"{"company_name": "Acme Corp"}"#,
    )
    .unwrap();

    let template_path = dir.path().join("template.docx");
    let doc = render(dir.path(), SAMPLE, Some(&template_path));

    assert_eq!(texts(&doc)[0], "Acme Corp – Commercial Primer");
}

#[test]
fn test_contact_paragraph_is_removed_from_custom_template() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.docx");

    let mut template = Document::new();
    template.add_paragraph().set_text("{{COMPANY}}");
    template.add_paragraph().set_text("Reach us: {{CONTACT}}");
    template.add_paragraph().set_text("{{CONTENT}}");
    template.save(&template_path).unwrap();

    let doc = render(dir.path(), "Body text.", Some(&template_path));
    let all = texts(&doc);

    assert!(all.iter().all(|text| !text.contains("{{CONTACT}}")));
    assert!(all.iter().any(|text| text == "Body text."));
    // Exactly the company banner survived ahead of the rendered body.
    assert_eq!(all[0], "Unknown Company");
}

#[test]
fn test_missing_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = render_primer(
        &dir.path().join("absent.md"),
        &dir.path().join("out.docx"),
        None,
    );
    assert!(matches!(result, Err(RenderError::Io { .. })));
}

#[test]
fn test_unwritable_destination_is_fatal_and_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let md_path = dir.path().join("primer.md");
    fs::write(&md_path, "text").unwrap();

    // The destination path is an existing directory, so the temporary
    // sibling cannot be renamed over it.
    let blocked = dir.path().join("blocked.docx");
    fs::create_dir(&blocked).unwrap();

    let result = render_primer(&md_path, &blocked, None);
    assert!(result.is_err());
    // No stray temporary file remains next to the destination.
    assert!(!dir.path().join("blocked.docx.tmp").exists());
}
