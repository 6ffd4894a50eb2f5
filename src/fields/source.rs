//! Field source trait for named-field extraction

use super::FieldValue;

/// Dual-phase accessor table over a named-field structure.
///
/// [`FIELDS`](Self::FIELDS) is the compile-time catalog of names this
/// structure can produce; it is consulted once, when a
/// [`FieldPlan`](super::FieldPlan) is validated against a configured
/// field-group list, so an unknown configured name fails at construction
/// rather than per row.
///
/// [`field`](Self::field) runs per row and must return a value for every
/// name in the catalog. Implementations are explicit `match` tables, one
/// arm per field — no runtime reflection.
pub trait FieldSource {
    /// Every field name this source can produce.
    const FIELDS: &'static [&'static str];

    /// Extract one field by name. Returns `None` for names outside
    /// [`FIELDS`](Self::FIELDS).
    fn field(&self, name: &str) -> Option<FieldValue>;
}
