//! Baseline style profile.
//!
//! The profile fills in font size, weight and spacing for the named styles
//! the renderer uses, but only where the document leaves them unset. A
//! template's own customizations always win. Applied once per render,
//! before any content is written.

use primer_docx::{Document, PageLayout, Pt, Style, Table};

/// Fixed-width face used for code spans and fenced code lines.
pub(crate) const FIXED_WIDTH_FONT: &str = "Consolas";

/// Baseline attributes for one named style.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StyleProfile {
    pub font_size: Option<Pt>,
    pub bold: Option<bool>,
    pub spacing_before: Option<Pt>,
    pub spacing_after: Option<Pt>,
    pub keep_with_next: Option<bool>,
}

/// The baseline profile table.
const BASELINE: &[(&str, StyleProfile)] = &[
    (
        "Title",
        StyleProfile {
            font_size: Some(Pt(18.0)),
            bold: Some(true),
            spacing_before: Some(Pt(24.0)),
            spacing_after: Some(Pt(12.0)),
            keep_with_next: Some(true),
        },
    ),
    (
        "Heading 1",
        StyleProfile {
            font_size: Some(Pt(16.0)),
            bold: Some(true),
            spacing_before: Some(Pt(24.0)),
            spacing_after: Some(Pt(0.0)),
            keep_with_next: Some(true),
        },
    ),
    (
        "Heading 2",
        StyleProfile {
            font_size: Some(Pt(14.0)),
            bold: Some(true),
            spacing_before: Some(Pt(10.0)),
            spacing_after: Some(Pt(0.0)),
            keep_with_next: Some(true),
        },
    ),
    (
        "Heading 3",
        StyleProfile {
            font_size: None,
            bold: Some(true),
            spacing_before: Some(Pt(10.0)),
            spacing_after: Some(Pt(0.0)),
            keep_with_next: Some(true),
        },
    ),
    (
        "Normal",
        StyleProfile {
            font_size: None,
            bold: None,
            spacing_before: Some(Pt(9.0)),
            spacing_after: Some(Pt(9.0)),
            keep_with_next: None,
        },
    ),
];

/// Merge baseline attributes into a style, filling only what is unset.
///
/// Pure so the fill-only-if-unset rule is testable without a document.
#[must_use]
pub fn merged(existing: &Style, baseline: &StyleProfile) -> Style {
    let mut style = existing.clone();
    if style.font_size.is_none() {
        style.font_size = baseline.font_size;
    }
    if style.bold.is_none() {
        style.bold = baseline.bold;
    }
    if style.spacing_before.is_none() {
        style.spacing_before = baseline.spacing_before;
    }
    if style.spacing_after.is_none() {
        style.spacing_after = baseline.spacing_after;
    }
    if style.keep_with_next.is_none() {
        style.keep_with_next = baseline.keep_with_next;
    }
    style
}

/// Apply the baseline profile to every style the document defines.
/// Styles missing from the registry are skipped.
pub(crate) fn apply_style_profile(doc: &mut Document) {
    for (name, profile) in BASELINE {
        if let Some(style) = doc.styles.by_name_mut(name) {
            let updated = merged(style, profile);
            *style = updated;
        }
    }
}

/// Table layout profile: fixed sizing at full page width, an even
/// two-column split of the usable width, and a repeating header row.
pub(crate) fn apply_table_profile(table: &mut Table, page: &PageLayout) {
    table.fixed_layout = true;
    table.width_pct = Some(5000);
    if table.column_count() == 2 {
        let half = Pt::from_twentieths(page.usable_width() / 2);
        table.col_widths = vec![half, half];
    }
    if !table.rows.is_empty() {
        table.header_row = true;
    }
}
