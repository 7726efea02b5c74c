//! # Validation Gate
//!
//! Field constraints for the command shapes. Every mutable field is required (not empty,
//! not only whitespace) and bounded in length, counted in characters.
//!
//! Validation returns a value: `Ok(())` or the full list of violations, so a caller can
//! report every problem with a request at once.

use crate::model::{CommandCreate, CommandUpdate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum lengths for the command fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    pub how_to: usize,
    pub platform: usize,
    pub command_line: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            how_to: 250,
            platform: 250,
            command_line: 250,
        }
    }
}

/// The rule a field broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum ViolationKind {
    Required,
    TooLong { max: usize, actual: usize },
}

/// One field that failed validation, named as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "{} is required", self.field),
            ViolationKind::TooLong { max, actual } => write!(
                f,
                "{} must be at most {} characters (got {})",
                self.field, max, actual
            ),
        }
    }
}

/// Every violation found in one shape. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Whether `field` is among the violations.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Shapes that carry the command's mutable fields.
pub trait Validate {
    fn validate(&self, limits: &FieldLimits) -> Result<(), ValidationErrors>;
}

fn check_fields(fields: [(&'static str, &str, usize); 3]) -> Result<(), ValidationErrors> {
    let violations: Vec<FieldViolation> = fields
        .into_iter()
        .filter_map(|(field, value, max)| {
            if value.trim().is_empty() {
                return Some(FieldViolation {
                    field,
                    kind: ViolationKind::Required,
                });
            }
            let actual = value.chars().count();
            (actual > max).then_some(FieldViolation {
                field,
                kind: ViolationKind::TooLong { max, actual },
            })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

impl Validate for CommandUpdate {
    fn validate(&self, limits: &FieldLimits) -> Result<(), ValidationErrors> {
        check_fields([
            ("howTo", self.how_to.as_str(), limits.how_to),
            ("platform", self.platform.as_str(), limits.platform),
            ("commandLine", self.command_line.as_str(), limits.command_line),
        ])
    }
}

impl Validate for CommandCreate {
    fn validate(&self, limits: &FieldLimits) -> Result<(), ValidationErrors> {
        check_fields([
            ("howTo", self.how_to.as_str(), limits.how_to),
            ("platform", self.platform.as_str(), limits.platform),
            ("commandLine", self.command_line.as_str(), limits.command_line),
        ])
    }
}
