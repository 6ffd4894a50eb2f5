//! Generic field extraction and row serialization.
//!
//! This module implements the contract between decoded event structures
//! and the tabular files the recorder writes: a structure exposes named
//! fields through an explicit accessor table ([`FieldSource`]), a
//! configured field group selects and orders them ([`FieldPlan`]), and
//! the plan renders header lines and delimiter-joined data rows from the
//! same ordered list.
//!
//! Validation is dual-phase in the same spirit as a connection-time
//! schema check: plans are validated once when a recorder is built
//! (unknown names fail fast), and per-row extraction afterwards cannot
//! encounter an unconfigured name.

mod plan;
mod source;
mod value;

pub use plan::{FRAME_ID_COL, FieldPlan, SESSION_TIME_COL};
pub use source::FieldSource;
pub use value::FieldValue;
