//! Insertion-cursor document writer.
//!
//! Every new block lands immediately after the cursor, which then advances
//! to the block just written. That keeps document order correct whether
//! rendering starts mid-document (after a template placeholder) or at the
//! end of an empty document.

use primer_docx::{Block, Document, Paragraph, Table};

/// Where rendering starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CursorStart {
    /// No anchor: blocks append at the end of the body.
    Append,
    /// Insert after the block at `index`. When `reusable`, that block is an
    /// emptied carrier paragraph the first paragraph emission fills in
    /// place instead of inserting a new one.
    At { index: usize, reusable: bool },
}

/// Writes blocks through an insertion cursor.
#[derive(Debug)]
pub(crate) struct DocWriter<'a> {
    doc: &'a mut Document,
    state: CursorStart,
}

impl<'a> DocWriter<'a> {
    pub(crate) fn new(doc: &'a mut Document, start: CursorStart) -> Self {
        Self { doc, state: start }
    }

    /// Read access to the underlying document.
    pub(crate) fn document(&self) -> &Document {
        self.doc
    }

    /// Emit a paragraph with the given style name and return it for
    /// filling. A style name the document does not define is skipped, not
    /// an error.
    pub(crate) fn paragraph(&mut self, style_name: Option<&str>) -> &mut Paragraph {
        let style_id = style_name.and_then(|name| self.doc.style_id(name));
        let index = match self.state {
            CursorStart::Append => {
                self.doc.blocks.push(Block::Paragraph(Paragraph::default()));
                self.doc.blocks.len() - 1
            }
            CursorStart::At {
                index,
                reusable: true,
            } => {
                // One-time consumption of the carrier paragraph.
                self.state = CursorStart::At {
                    index,
                    reusable: false,
                };
                index
            }
            CursorStart::At {
                index,
                reusable: false,
            } => {
                let next = index + 1;
                self.doc
                    .blocks
                    .insert(next, Block::Paragraph(Paragraph::default()));
                self.state = CursorStart::At {
                    index: next,
                    reusable: false,
                };
                next
            }
        };
        let Block::Paragraph(paragraph) = &mut self.doc.blocks[index] else {
            unreachable!("cursor always points at the paragraph it just placed");
        };
        if style_id.is_some() {
            paragraph.style_id = style_id;
        }
        paragraph
    }

    /// Emit a table after the cursor, followed by an empty carrier
    /// paragraph the next emission may reuse (a table cannot be the last
    /// thing the cursor leaves behind). Returns the placed table.
    pub(crate) fn table(&mut self, table: Table) -> &mut Table {
        let table_index = match self.state {
            CursorStart::Append => {
                self.doc.blocks.push(Block::Table(table));
                self.doc.blocks.len() - 1
            }
            CursorStart::At { index, .. } => {
                let next = index + 1;
                self.doc.blocks.insert(next, Block::Table(table));
                next
            }
        };
        self.doc
            .blocks
            .insert(table_index + 1, Block::Paragraph(Paragraph::default()));
        self.state = CursorStart::At {
            index: table_index + 1,
            reusable: true,
        };
        let Block::Table(placed) = &mut self.doc.blocks[table_index] else {
            unreachable!("table was just placed at this index");
        };
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body_texts(doc: &Document) -> Vec<String> {
        doc.blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(paragraph) => paragraph.text(),
                Block::Table(_) => "<table>".to_owned(),
            })
            .collect()
    }

    #[test]
    fn test_append_mode_pushes_in_order() {
        let mut doc = Document::new();
        let mut writer = DocWriter::new(&mut doc, CursorStart::Append);
        writer.paragraph(None).set_text("one");
        writer.paragraph(None).set_text("two");
        assert_eq!(body_texts(&doc), vec!["one", "two"]);
    }

    #[test]
    fn test_insertion_after_anchor_preserves_order() {
        let mut doc = Document::new();
        doc.add_paragraph().set_text("banner");
        doc.add_paragraph().set_text("trailer");

        let mut writer = DocWriter::new(
            &mut doc,
            CursorStart::At {
                index: 0,
                reusable: false,
            },
        );
        writer.paragraph(None).set_text("first");
        writer.paragraph(None).set_text("second");

        assert_eq!(
            body_texts(&doc),
            vec!["banner", "first", "second", "trailer"]
        );
    }

    #[test]
    fn test_reusable_carrier_is_consumed_once() {
        let mut doc = Document::new();
        doc.add_paragraph(); // emptied placeholder carrier
        doc.add_paragraph().set_text("trailer");

        let mut writer = DocWriter::new(
            &mut doc,
            CursorStart::At {
                index: 0,
                reusable: true,
            },
        );
        writer.paragraph(None).set_text("first");
        writer.paragraph(None).set_text("second");

        // "first" filled the carrier instead of inserting a new paragraph.
        assert_eq!(body_texts(&doc), vec!["first", "second", "trailer"]);
    }

    #[test]
    fn test_missing_style_is_skipped() {
        let mut doc = Document::new();
        let mut writer = DocWriter::new(&mut doc, CursorStart::Append);
        let paragraph = writer.paragraph(Some("No Such Style"));
        assert_eq!(paragraph.style_id, None);

        let styled = writer.paragraph(Some("Heading 1"));
        assert_eq!(styled.style_id.as_deref(), Some("Heading1"));
    }

    #[test]
    fn test_table_leaves_reusable_paragraph_behind() {
        let mut doc = Document::new();
        doc.add_paragraph().set_text("trailer");

        let mut writer = DocWriter::new(
            &mut doc,
            CursorStart::At {
                index: 0,
                reusable: false,
            },
        );
        writer.table(Table::default());
        writer.paragraph(None).set_text("after table");

        // The paragraph after the table was reused, not inserted anew.
        assert_eq!(
            body_texts(&doc),
            vec!["trailer", "<table>", "after table"]
        );
    }

    #[test]
    fn test_table_in_append_mode() {
        let mut doc = Document::new();
        let mut writer = DocWriter::new(&mut doc, CursorStart::Append);
        writer.paragraph(None).set_text("intro");
        writer.table(Table::default());

        assert_eq!(body_texts(&doc), vec!["intro", "<table>", ""]);
    }
}
