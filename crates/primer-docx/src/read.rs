//! Template package loading.
//!
//! Parses the parts the model understands and skips everything else, so
//! templates produced by full-featured word processors still load. Text is
//! reassembled from `w:t` content including entity references.

use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use crate::document::{
    Break, Document, Indent, PageLayout, Paragraph, Pt, Run, RunStyle, Table, TableCell, TableRow,
};
use crate::document::Block;
use crate::error::DocxError;
use crate::styles::{Style, StyleKind, StyleRegistry};

impl Document {
    /// Load a document package from `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not a valid package, or its
    /// main document part is missing or malformed. A missing styles part is
    /// tolerated and yields an empty style registry.
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let file = File::open(path).map_err(|e| DocxError::io(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| DocxError::container(path, e))?;

        let document_part = read_part(&mut archive, path, "word/document.xml")?.ok_or_else(|| {
            DocxError::MissingPart {
                path: path.to_path_buf(),
                part: "word/document.xml",
            }
        })?;
        let styles_part = read_part(&mut archive, path, "word/styles.xml")?;

        let mut doc = parse_document(&document_part)?;
        if let Some(styles_part) = styles_part {
            doc.styles = parse_styles(&styles_part)?;
        }
        tracing::debug!(
            path = %path.display(),
            blocks = doc.blocks.len(),
            "loaded document package"
        );
        Ok(doc)
    }
}

fn read_part(
    archive: &mut ZipArchive<File>,
    path: &Path,
    name: &str,
) -> Result<Option<String>, DocxError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(source) => return Err(DocxError::container(path, source)),
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| DocxError::io(path, e))?;
    Ok(Some(content))
}

fn parse_document(xml: &str) -> Result<Document, DocxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut doc = Document {
        blocks: Vec::new(),
        styles: StyleRegistry::empty(),
        page: PageLayout::default(),
    };
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    let paragraph = parse_paragraph(&mut reader)?;
                    doc.blocks.push(Block::Paragraph(paragraph));
                }
                b"w:tbl" => {
                    let table = parse_table(&mut reader)?;
                    doc.blocks.push(Block::Table(table));
                }
                b"w:sectPr" => parse_section(&mut reader, &mut doc.page)?,
                // Descend into w:document, w:body and any unknown wrapper.
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:p" => {
                doc.blocks.push(Block::Paragraph(Paragraph::default()));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(doc)
}

/// Parse until the matching `</w:p>`.
fn parse_paragraph(reader: &mut Reader<&[u8]>) -> Result<Paragraph, DocxError> {
    let mut paragraph = Paragraph::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:pPr" => parse_paragraph_props(reader, &mut paragraph)?,
                b"w:r" => parse_run(reader, &mut paragraph)?,
                // Hyperlinks and other wrappers are entered so their runs
                // are still collected.
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:p" => return Ok(paragraph),
            Event::Eof => return Ok(paragraph),
            _ => {}
        }
    }
}

fn parse_paragraph_props(
    reader: &mut Reader<&[u8]>,
    paragraph: &mut Paragraph,
) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:pStyle" => paragraph.style_id = attr_value(&e, "w:val"),
                b"w:ind" => {
                    let left = attr_number(&e, "w:left").unwrap_or(0);
                    let first_line = attr_number(&e, "w:firstLine")
                        .or_else(|| attr_number(&e, "w:hanging").map(|v| -v))
                        .unwrap_or(0);
                    paragraph.indent = Some(Indent {
                        left: Pt::from_twentieths(left),
                        first_line: Pt::from_twentieths(first_line),
                    });
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:pPr" => return Ok(()),
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// One parsed piece of a run, before its style is known.
enum RunPiece {
    Text(String),
    Break(Break),
}

fn parse_run(reader: &mut Reader<&[u8]>, paragraph: &mut Paragraph) -> Result<(), DocxError> {
    let mut style = RunStyle::default();
    let mut pieces = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:rPr" => parse_run_props(reader, &mut style)?,
                b"w:t" => pieces.push(RunPiece::Text(read_element_text(reader, b"w:t")?)),
                b"w:br" => pieces.push(RunPiece::Break(break_kind(&e))),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:br" => pieces.push(RunPiece::Break(break_kind(&e))),
                b"w:t" => pieces.push(RunPiece::Text(String::new())),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:r" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    for piece in pieces {
        match piece {
            RunPiece::Text(text) => paragraph.runs.push(Run::text(text, style.clone())),
            RunPiece::Break(kind) => paragraph.runs.push(Run::Break(kind)),
        }
    }
    Ok(())
}

fn break_kind(e: &BytesStart) -> Break {
    if attr_value(e, "w:type").as_deref() == Some("page") {
        Break::Page
    } else {
        Break::Line
    }
}

fn parse_run_props(reader: &mut Reader<&[u8]>, style: &mut RunStyle) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:b" => style.bold = on_off(&e),
                b"w:i" => style.italic = on_off(&e),
                b"w:rFonts" => style.font = attr_value(&e, "w:ascii"),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:rPr" => return Ok(()),
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// Parse until the matching `</w:tbl>`. Nested tables are flattened into
/// their cell's paragraph content, which this pipeline never produces.
fn parse_table(reader: &mut Reader<&[u8]>) -> Result<Table, DocxError> {
    let mut table = Table::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tblPr" => parse_table_props(reader, &mut table)?,
                b"w:tr" => {
                    let row = parse_table_row(reader, &mut table)?;
                    table.rows.push(row);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:tbl" => return Ok(table),
            Event::Eof => return Ok(table),
            _ => {}
        }
    }
}

fn parse_table_props(reader: &mut Reader<&[u8]>, table: &mut Table) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:tblW" => {
                    if attr_value(&e, "w:type").as_deref() == Some("pct") {
                        table.width_pct =
                            attr_value(&e, "w:w").and_then(|v| v.parse().ok());
                    }
                }
                b"w:tblLayout" => {
                    table.fixed_layout = attr_value(&e, "w:type").as_deref() == Some("fixed");
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:tblPr" => return Ok(()),
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

fn parse_table_row(reader: &mut Reader<&[u8]>, table: &mut Table) -> Result<TableRow, DocxError> {
    let mut row = TableRow::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tc" => {
                    let cell = parse_table_cell(reader)?;
                    row.cells.push(cell);
                }
                b"w:p" => {
                    // Stray paragraph outside a cell; keep parsing balanced.
                    let _ = parse_paragraph(reader)?;
                }
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:tblHeader" => {
                table.header_row = true;
            }
            Event::End(e) if e.name().as_ref() == b"w:tr" => return Ok(row),
            Event::Eof => return Ok(row),
            _ => {}
        }
    }
}

fn parse_table_cell(reader: &mut Reader<&[u8]>) -> Result<TableCell, DocxError> {
    let mut cell = TableCell::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:p" => {
                cell.paragraphs.push(parse_paragraph(reader)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"w:p" => {
                cell.paragraphs.push(Paragraph::default());
            }
            Event::End(e) if e.name().as_ref() == b"w:tc" => return Ok(cell),
            Event::Eof => return Ok(cell),
            _ => {}
        }
    }
}

fn parse_section(reader: &mut Reader<&[u8]>, page: &mut PageLayout) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:pgSz" => {
                    if let Some(width) = attr_number(&e, "w:w") {
                        page.width = width;
                    }
                    if let Some(height) = attr_number(&e, "w:h") {
                        page.height = height;
                    }
                }
                b"w:pgMar" => {
                    if let Some(top) = attr_number(&e, "w:top") {
                        page.margin_top = top;
                    }
                    if let Some(right) = attr_number(&e, "w:right") {
                        page.margin_right = right;
                    }
                    if let Some(bottom) = attr_number(&e, "w:bottom") {
                        page.margin_bottom = bottom;
                    }
                    if let Some(left) = attr_number(&e, "w:left") {
                        page.margin_left = left;
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:sectPr" => return Ok(()),
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

fn parse_styles(xml: &str) -> Result<StyleRegistry, DocxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut registry = StyleRegistry::empty();
    let mut current: Option<Style> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:style" => {
                    let style_id = attr_value(&e, "w:styleId").unwrap_or_default();
                    let kind = match attr_value(&e, "w:type").as_deref() {
                        Some("character") => StyleKind::Character,
                        _ => StyleKind::Paragraph,
                    };
                    let mut style = Style::new(style_id, "");
                    style.kind = kind;
                    current = Some(style);
                }
                // Attribute elements outside w:style (document defaults)
                // are ignored because `current` is None there.
                b"w:name" => {
                    if let Some(style) = current.as_mut()
                        && let Some(name) = attr_value(&e, "w:val")
                    {
                        style.name = name;
                    }
                }
                b"w:sz" => {
                    if let Some(style) = current.as_mut()
                        && let Some(half) = attr_number(&e, "w:val")
                    {
                        style.font_size = Some(Pt::from_half_points(half));
                    }
                }
                b"w:b" => {
                    if let Some(style) = current.as_mut() {
                        style.bold = Some(on_off(&e));
                    }
                }
                b"w:spacing" => {
                    if let Some(style) = current.as_mut() {
                        if let Some(before) = attr_number(&e, "w:before") {
                            style.spacing_before = Some(Pt::from_twentieths(before));
                        }
                        if let Some(after) = attr_number(&e, "w:after") {
                            style.spacing_after = Some(Pt::from_twentieths(after));
                        }
                    }
                }
                b"w:keepNext" => {
                    if let Some(style) = current.as_mut() {
                        style.keep_with_next = Some(on_off(&e));
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"w:style" => {
                if let Some(style) = current.take() {
                    registry.upsert(style);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(registry)
}

/// Accumulate text content until the matching end tag, decoding entity
/// references the way the event stream delivers them.
fn read_element_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String, DocxError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&reader.decoder().decode(&e)?),
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                text.push_str(&decode_entity(&entity));
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(e) if e.name().as_ref() == end => return Ok(text),
            Event::Eof => return Ok(text),
            _ => {}
        }
    }
}

fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

fn attr_value(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(std::borrow::Cow::into_owned))
}

fn attr_number(e: &BytesStart, name: &str) -> Option<i64> {
    attr_value(e, name).and_then(|value| value.parse().ok())
}

/// Toggle elements like `w:b` default to on; `w:val` can switch them off.
fn on_off(e: &BytesStart) -> bool {
    attr_value(e, "w:val").is_none_or(|v| !matches!(v.as_str(), "0" | "false" | "none" | "off"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_paragraph_with_styled_runs() {
        let xml = concat!(
            r#"<w:body><w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve"> tail</w:t></w:r></w:p></w:body>"#,
        );
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.blocks.len(), 1);
        let Block::Paragraph(paragraph) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.style_id.as_deref(), Some("Heading1"));
        assert_eq!(paragraph.text(), "Bold tail");
        assert_eq!(
            paragraph.runs[0],
            Run::text(
                "Bold",
                RunStyle {
                    bold: true,
                    ..RunStyle::default()
                }
            )
        );
    }

    #[test]
    fn test_parse_entity_references_in_text() {
        let xml = "<w:p><w:r><w:t>a &amp; b &lt;c&gt;</w:t></w:r></w:p>";
        let doc = parse_document(xml).unwrap();
        let Block::Paragraph(paragraph) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.text(), "a & b <c>");
    }

    #[test]
    fn test_parse_page_break_run() {
        let xml = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;
        let doc = parse_document(xml).unwrap();
        let Block::Paragraph(paragraph) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.runs, vec![Run::Break(Break::Page)]);
    }

    #[test]
    fn test_parse_table_with_header_row() {
        let xml = concat!(
            r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/>"#,
            r#"<w:tblLayout w:type="fixed"/></w:tblPr>"#,
            r#"<w:tr><w:trPr><w:tblHeader/></w:trPr>"#,
            r#"<w:tc><w:p><w:r><w:t>H1</w:t></w:r></w:p></w:tc>"#,
            r#"<w:tc><w:p><w:r><w:t>H2</w:t></w:r></w:p></w:tc></w:tr>"#,
            r#"<w:tr><w:tc><w:p><w:r><w:t>v</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>"#,
            r#"</w:tbl>"#,
        );
        let doc = parse_document(xml).unwrap();
        let Block::Table(table) = &doc.blocks[0] else {
            panic!("expected a table");
        };
        assert!(table.header_row);
        assert!(table.fixed_layout);
        assert_eq!(table.width_pct, Some(5000));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[1].paragraphs[0].text(), "H2");
        assert_eq!(table.rows[1].cells[1].paragraphs[0].text(), "");
    }

    #[test]
    fn test_unknown_markup_is_skipped() {
        let xml = concat!(
            r#"<w:body><w:bookmarkStart w:id="0" w:name="x"/>"#,
            r#"<w:p><w:proofErr w:type="spellStart"/><w:r><w:t>ok</w:t></w:r></w:p>"#,
            r#"<w:bookmarkEnd w:id="0"/></w:body>"#,
        );
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.blocks.len(), 1);
        let Block::Paragraph(paragraph) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.text(), "ok");
    }

    #[test]
    fn test_parse_section_geometry() {
        let xml = concat!(
            r#"<w:body><w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
            r#"<w:pgMar w:top="1417" w:right="1134" w:bottom="1417" w:left="1134"/>"#,
            r#"</w:sectPr></w:body>"#,
        );
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.page.width, 11906);
        assert_eq!(doc.page.margin_left, 1134);
        assert_eq!(doc.page.usable_width(), 11906 - 1134 - 1134);
    }

    #[test]
    fn test_parse_styles_registry() {
        let xml = concat!(
            r#"<w:styles><w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="22"/></w:rPr>"#,
            r#"</w:rPrDefault></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/>"#,
            r#"<w:pPr><w:keepNext/><w:spacing w:before="480" w:after="0"/></w:pPr>"#,
            r#"<w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#,
        );
        let registry = parse_styles(xml).unwrap();
        let style = registry.by_name("Heading 1").expect("style parsed");
        assert_eq!(style.font_size, Some(Pt(16.0)));
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.spacing_before, Some(Pt(24.0)));
        assert_eq!(style.spacing_after, Some(Pt(0.0)));
        assert_eq!(style.keep_with_next, Some(true));
    }

    #[test]
    fn test_on_off_values() {
        let mut start = BytesStart::new("w:b");
        assert!(on_off(&start));
        start.push_attribute(("w:val", "0"));
        assert!(!on_off(&start));
    }

    #[test]
    fn test_save_then_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("primer.docx");

        let mut doc = Document::new();
        if let Some(style) = doc.styles.by_name_mut("Heading 1") {
            style.font_size = Some(Pt(16.0));
            style.bold = Some(true);
        }
        let heading = doc.add_paragraph();
        heading.style_id = Some("Heading1".to_owned());
        heading.push_text("Overview & Scope", RunStyle::default());

        let body = doc.add_paragraph();
        body.style_id = Some("Normal".to_owned());
        body.push_text("plain ", RunStyle::default());
        body.push_text(
            "bold",
            RunStyle {
                bold: true,
                ..RunStyle::default()
            },
        );
        body.runs.push(Run::Break(Break::Line));
        body.push_text("after break", RunStyle::default());
        doc.add_page_break();

        doc.save(&path).unwrap();
        let reloaded = Document::open(&path).unwrap();

        assert_eq!(reloaded.blocks, doc.blocks);
        let style = reloaded.styles.by_name("Heading 1").expect("style kept");
        assert_eq!(style.font_size, Some(Pt(16.0)));
        assert_eq!(style.bold, Some(true));
    }

    #[test]
    fn test_save_leaves_no_temporary_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primer.docx");

        let mut doc = Document::new();
        doc.add_paragraph().set_text("first");
        doc.save(&path).unwrap();

        let mut updated = Document::new();
        updated.add_paragraph().set_text("second");
        updated.save(&path).unwrap();

        let reloaded = Document::open(&path).unwrap();
        assert_eq!(reloaded.paragraphs().next().map(Paragraph::text), Some("second".to_owned()));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("primer.docx")]);
    }
}
