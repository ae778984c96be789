//! Table grid buffering.
//!
//! Rows and cells are buffered between table open and close because the
//! grid's column count is only known once every row has been seen. Cells
//! hold finished run sequences; emission pads short rows.

use primer_docx::Run;

use crate::inline::RunCollector;

/// A fully buffered table: rows of cells of runs.
pub(crate) type TableGrid = Vec<Vec<Vec<Run>>>;

/// Buffers one table span of the event stream.
#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    rows: TableGrid,
    current_row: Option<Vec<Vec<Run>>>,
    current_cell: Option<RunCollector>,
}

impl TableBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Begin a new row (header and body rows alike).
    pub(crate) fn start_row(&mut self) {
        self.end_row();
        self.current_row = Some(Vec::new());
    }

    pub(crate) fn end_row(&mut self) {
        self.end_cell();
        if let Some(row) = self.current_row.take() {
            self.rows.push(row);
        }
    }

    pub(crate) fn start_cell(&mut self) {
        self.end_cell();
        self.current_cell = Some(RunCollector::new());
    }

    pub(crate) fn end_cell(&mut self) {
        if let Some(collector) = self.current_cell.take() {
            self.current_row
                .get_or_insert_with(Vec::new)
                .push(collector.finish());
        }
    }

    /// The collector of the open cell, if any. Inline events arriving
    /// outside a cell are dropped.
    pub(crate) fn collector_mut(&mut self) -> Option<&mut RunCollector> {
        self.current_cell.as_mut()
    }

    /// Close any open row and hand back the grid.
    pub(crate) fn finish(mut self) -> TableGrid {
        self.end_row();
        self.rows
    }
}
