//! Named style registry.
//!
//! Styles carry only the attributes the pipeline's baseline profile touches;
//! every attribute is optional so "unset" stays distinguishable from an
//! explicit template value. Lookups are by style *name* (the vocabulary the
//! renderer speaks); serialization uses the style *id*.

use crate::document::Pt;

/// Style family (`w:type`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
}

/// A named paragraph or character style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Identifier referenced from `w:pStyle` (e.g. `Heading1`).
    pub style_id: String,
    /// Display name (e.g. `heading 1`); matched case-insensitively.
    pub name: String,
    pub kind: StyleKind,
    pub font_size: Option<Pt>,
    pub bold: Option<bool>,
    pub spacing_before: Option<Pt>,
    pub spacing_after: Option<Pt>,
    pub keep_with_next: Option<bool>,
}

impl Style {
    /// A paragraph style with all attributes unset.
    #[must_use]
    pub fn new(style_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            style_id: style_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The built-in styles a blank document starts with, matching the set a
/// stock word-processor template defines. All attributes are unset so the
/// baseline profile fills them.
const BUILTIN_STYLES: &[(&str, &str)] = &[
    ("Normal", "Normal"),
    ("Title", "Title"),
    ("Heading1", "heading 1"),
    ("Heading2", "heading 2"),
    ("Heading3", "heading 3"),
    ("ListBullet", "List Bullet"),
    ("ListNumber", "List Number"),
];

/// Ordered collection of named styles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleRegistry {
    styles: Vec<Style>,
}

impl StyleRegistry {
    /// An empty registry (used when a loaded package has no styles part).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry a blank document starts with.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            styles: BUILTIN_STYLES
                .iter()
                .map(|(id, name)| Style::new(*id, *name))
                .collect(),
        }
    }

    /// Look up a style by name, case-insensitively. Falls back to matching
    /// the id with spaces removed so `Heading 1` still resolves in packages
    /// that only carry ids.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Style> {
        self.position(name).map(|idx| &self.styles[idx])
    }

    /// Mutable variant of [`Self::by_name`].
    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Style> {
        self.position(name).map(move |idx| &mut self.styles[idx])
    }

    /// Resolve a style name to its id.
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.by_name(name).map(|style| style.style_id.as_str())
    }

    /// Insert a style, replacing any existing style with the same id.
    pub fn upsert(&mut self, style: Style) {
        match self
            .styles
            .iter_mut()
            .find(|existing| existing.style_id == style.style_id)
        {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
    }

    /// All styles in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Style> {
        self.styles.iter()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let by_name = self
            .styles
            .iter()
            .position(|style| style.name.eq_ignore_ascii_case(name));
        by_name.or_else(|| {
            let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
            self.styles
                .iter()
                .position(|style| style.style_id.eq_ignore_ascii_case(&compact))
        })
    }
}
