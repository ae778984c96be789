//! Package serialization and atomic persistence.
//!
//! Parts are built by direct string assembly with XML escaping; the shapes
//! involved are small and fixed, so a writer API buys nothing here.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::document::{Block, Break, Document, PageLayout, Paragraph, Run, Table};
use crate::error::DocxError;
use crate::styles::{StyleKind, StyleRegistry};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// WordprocessingML main namespace.
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#,
);

impl Document {
    /// Persist the document at `path`, creating parent directories.
    ///
    /// The package is written to a sibling `.tmp` path and renamed over the
    /// destination, so an interrupted save never leaves a truncated file at
    /// the final path.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| DocxError::io(parent, e))?;
        }

        let tmp = tmp_path(path);
        if let Err(err) = self.write_package(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(DocxError::io(path, source));
        }
        tracing::debug!(path = %path.display(), "saved document package");
        Ok(())
    }

    fn write_package(&self, path: &Path) -> Result<(), DocxError> {
        let file = File::create(path).map_err(|e| DocxError::io(path, e))?;
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, std::borrow::Cow<'_, str>); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.into()),
            ("_rels/.rels", PACKAGE_RELS.into()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.into()),
            ("word/document.xml", document_xml(self).into()),
            ("word/styles.xml", styles_xml(&self.styles).into()),
        ];
        for (name, content) in parts {
            zip.start_file(name, options.clone())
                .map_err(|e| DocxError::container(path, e))?;
            zip.write_all(content.as_bytes())
                .map_err(|e| DocxError::io(path, e))?;
        }
        zip.finish().map_err(|e| DocxError::container(path, e))?;
        Ok(())
    }
}

/// Sibling temporary path: `report.docx` -> `report.docx.tmp`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn document_xml(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECL);
    write!(out, r#"<w:document xmlns:w="{W_NS}"><w:body>"#).unwrap();
    for block in &doc.blocks {
        match block {
            Block::Paragraph(paragraph) => write_paragraph(&mut out, paragraph),
            Block::Table(table) => write_table(&mut out, table, &doc.page),
        }
    }
    write_section(&mut out, &doc.page);
    out.push_str("</w:body></w:document>");
    out
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    out.push_str("<w:p>");
    if paragraph.style_id.is_some() || paragraph.indent.is_some() {
        out.push_str("<w:pPr>");
        if let Some(style_id) = &paragraph.style_id {
            write!(out, r#"<w:pStyle w:val="{}"/>"#, escape_attr(style_id)).unwrap();
        }
        if let Some(indent) = &paragraph.indent {
            let left = indent.left.twentieths();
            let first = indent.first_line.twentieths();
            if first < 0 {
                write!(out, r#"<w:ind w:left="{left}" w:hanging="{}"/>"#, -first).unwrap();
            } else {
                write!(out, r#"<w:ind w:left="{left}" w:firstLine="{first}"/>"#).unwrap();
            }
        }
        out.push_str("</w:pPr>");
    }
    for run in &paragraph.runs {
        write_run(out, run);
    }
    out.push_str("</w:p>");
}

fn write_run(out: &mut String, run: &Run) {
    match run {
        Run::Break(Break::Line) => out.push_str("<w:r><w:br/></w:r>"),
        Run::Break(Break::Page) => out.push_str(r#"<w:r><w:br w:type="page"/></w:r>"#),
        Run::Text(text_run) => {
            out.push_str("<w:r>");
            let style = &text_run.style;
            if style.bold || style.italic || style.font.is_some() {
                out.push_str("<w:rPr>");
                if let Some(font) = &style.font {
                    let font = escape_attr(font);
                    write!(out, r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#).unwrap();
                }
                if style.bold {
                    out.push_str("<w:b/>");
                }
                if style.italic {
                    out.push_str("<w:i/>");
                }
                out.push_str("</w:rPr>");
            }
            write!(
                out,
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_text(&text_run.text)
            )
            .unwrap();
            out.push_str("</w:r>");
        }
    }
}

fn write_table(out: &mut String, table: &Table, page: &PageLayout) {
    let cols = table.column_count();
    out.push_str("<w:tbl><w:tblPr>");
    if let Some(pct) = table.width_pct {
        write!(out, r#"<w:tblW w:w="{pct}" w:type="pct"/>"#).unwrap();
    }
    if table.fixed_layout {
        out.push_str(r#"<w:tblLayout w:type="fixed"/>"#);
    }
    out.push_str("</w:tblPr>");

    if cols > 0 {
        out.push_str("<w:tblGrid>");
        let even = page.usable_width() / cols as i64;
        for idx in 0..cols {
            let width = table
                .col_widths
                .get(idx)
                .map_or(even, |pt| pt.twentieths());
            write!(out, r#"<w:gridCol w:w="{width}"/>"#).unwrap();
        }
        out.push_str("</w:tblGrid>");
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        out.push_str("<w:tr>");
        if row_idx == 0 && table.header_row {
            out.push_str("<w:trPr><w:tblHeader/></w:trPr>");
        }
        for cell in &row.cells {
            out.push_str("<w:tc>");
            if cell.paragraphs.is_empty() {
                // Every cell must end with a paragraph.
                out.push_str("<w:p/>");
            }
            for paragraph in &cell.paragraphs {
                write_paragraph(out, paragraph);
            }
            out.push_str("</w:tc>");
        }
        // Short rows get blank trailing cells so the grid stays rectangular.
        for _ in row.cells.len()..cols {
            out.push_str("<w:tc><w:p/></w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

fn write_section(out: &mut String, page: &PageLayout) {
    write!(
        out,
        concat!(
            r#"<w:sectPr><w:pgSz w:w="{width}" w:h="{height}"/>"#,
            r#"<w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" "#,
            r#"w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
        ),
        width = page.width,
        height = page.height,
        top = page.margin_top,
        right = page.margin_right,
        bottom = page.margin_bottom,
        left = page.margin_left,
    )
    .unwrap();
}

fn styles_xml(registry: &StyleRegistry) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str(XML_DECL);
    write!(out, r#"<w:styles xmlns:w="{W_NS}">"#).unwrap();
    for style in registry.iter() {
        let kind = match style.kind {
            StyleKind::Paragraph => "paragraph",
            StyleKind::Character => "character",
        };
        write!(
            out,
            r#"<w:style w:type="{kind}" w:styleId="{}"><w:name w:val="{}"/>"#,
            escape_attr(&style.style_id),
            escape_attr(&style.name),
        )
        .unwrap();

        if style.spacing_before.is_some()
            || style.spacing_after.is_some()
            || style.keep_with_next == Some(true)
        {
            out.push_str("<w:pPr>");
            if style.keep_with_next == Some(true) {
                out.push_str("<w:keepNext/>");
            }
            if style.spacing_before.is_some() || style.spacing_after.is_some() {
                out.push_str("<w:spacing");
                if let Some(before) = style.spacing_before {
                    write!(out, r#" w:before="{}""#, before.twentieths()).unwrap();
                }
                if let Some(after) = style.spacing_after {
                    write!(out, r#" w:after="{}""#, after.twentieths()).unwrap();
                }
                out.push_str("/>");
            }
            out.push_str("</w:pPr>");
        }

        if style.bold == Some(true) || style.font_size.is_some() {
            out.push_str("<w:rPr>");
            if style.bold == Some(true) {
                out.push_str("<w:b/>");
            }
            if let Some(size) = style.font_size {
                let half = size.half_points();
                write!(out, r#"<w:sz w:val="{half}"/><w:szCs w:val="{half}"/>"#).unwrap();
            }
            out.push_str("</w:rPr>");
        }
        out.push_str("</w:style>");
    }
    out.push_str("</w:styles>");
    out
}

/// Escape XML special characters for element text.
pub(crate) fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape XML special characters for attribute values.
pub(crate) fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}
