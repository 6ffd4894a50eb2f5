//! Startup-validated field extraction plans.
//!
//! A [`FieldPlan`] binds one configured field group to one
//! [`FieldSource`] implementation. Validation runs once, at recorder
//! construction: every configured name is checked against the source's
//! compile-time field catalog, so a typo in the group configuration fails
//! fast instead of failing on the first recorded row. Row rendering then
//! walks the same ordered list the header line was generated from.

use super::FieldSource;
use crate::config::FieldGroups;
use crate::types::PacketHeader;
use crate::{RecorderError, Result};
use std::fmt::Write;
use std::marker::PhantomData;

/// Column name of the session-time half of the join key.
pub const SESSION_TIME_COL: &str = "sessionTime";
/// Column name of the frame-identifier half of the join key.
pub const FRAME_ID_COL: &str = "frameIdentifier";

/// A validated, ordered extraction plan for one field group.
#[derive(Debug, Clone)]
pub struct FieldPlan<S: FieldSource> {
    group: String,
    fields: Vec<String>,
    _source: PhantomData<fn(&S)>,
}

impl<S: FieldSource> FieldPlan<S> {
    /// Resolve and validate `group` against the source's field catalog.
    ///
    /// # Errors
    ///
    /// [`RecorderError::MissingFieldGroup`] if the group is not configured,
    /// [`RecorderError::UnknownField`] if it names a field the source
    /// cannot produce.
    pub fn new(groups: &FieldGroups, group: &str) -> Result<Self> {
        let fields = groups.resolve(group)?.to_vec();
        for field in &fields {
            if !S::FIELDS.contains(&field.as_str()) {
                return Err(RecorderError::UnknownField {
                    group: group.to_string(),
                    field: field.clone(),
                });
            }
        }
        Ok(Self { group: group.to_string(), fields, _source: PhantomData })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Header line for streams without the join-key prefix.
    pub fn header(&self) -> String {
        let mut line = self.fields.join(",");
        line.push('\n');
        line
    }

    /// Header line for per-frame streams, prefixed with the join-key
    /// columns.
    pub fn keyed_header(&self) -> String {
        let mut line = format!("{SESSION_TIME_COL},{FRAME_ID_COL},");
        line.push_str(&self.fields.join(","));
        line.push('\n');
        line
    }

    /// Render one data row without the join-key prefix.
    pub fn row(&self, source: &S) -> Result<String> {
        let mut out = String::new();
        self.cells(&mut out, source)?;
        out.push('\n');
        Ok(out)
    }

    /// Render one data row prefixed with the header's join key.
    pub fn keyed_row(&self, header: &PacketHeader, source: &S) -> Result<String> {
        let mut out = String::new();
        let _ = write!(out, "{},{},", header.session_time, header.frame_identifier);
        self.cells(&mut out, source)?;
        out.push('\n');
        Ok(out)
    }

    fn cells(&self, out: &mut String, source: &S) -> Result<()> {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let value = source.field(field).ok_or_else(|| RecorderError::UnknownField {
                group: self.group.clone(),
                field: field.clone(),
            })?;
            value.render_into(out, field)?;
        }
        Ok(())
    }
}
