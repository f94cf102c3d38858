//! Declarative attribute schemas and the generic validator
//!
//! Each resource kind declares its writable attributes once — name, type,
//! required flag, optional default — and one generic validator enforces the
//! whitelist for every kind. Unknown attributes, type mismatches, and
//! missing required fields reject the whole request.

use chrono::Utc;
use serde_json::Value;

use crate::core::error::ApiError;
use crate::core::store::Record;

/// Date format used by defaulted `date_created` fields (`MM/DD/YYYY`).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Today's date formatted `MM/DD/YYYY`.
pub fn current_date() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}

/// Accepted JSON value types for a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Bool,
    List,
}

impl FieldType {
    /// Strict type check. Numeric-looking strings are not numbers.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::List => value.is_array(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "boolean",
            FieldType::List => "list",
        }
    }
}

/// Default applied when an optional field is absent on create.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// A literal JSON value.
    Literal(Value),
    /// The current date, formatted `MM/DD/YYYY`.
    CurrentDate,
}

impl FieldDefault {
    fn resolve(&self) -> Value {
        match self {
            FieldDefault::Literal(value) => value.clone(),
            FieldDefault::CurrentDate => Value::String(current_date()),
        }
    }
}

/// Declaration of one writable attribute.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, ty: FieldType, default: FieldDefault) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: Some(default),
        }
    }
}

/// The attribute whitelist for one resource kind.
///
/// System-managed fields (`owner`, `engineering_change_id`) are not part of
/// the schema: clients can never set them, and a payload naming them is
/// rejected like any other unknown attribute.
#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(kind: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { kind, fields }
    }

    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The payload must be a flat JSON object.
    ///
    /// Duplicate keys cannot survive JSON object parsing, so the defensive
    /// duplicate check is structural here.
    fn as_object<'a>(&self, payload: &'a Value) -> Result<&'a Record, ApiError> {
        payload.as_object().ok_or_else(|| ApiError::InvalidBody {
            message: "expected a JSON object".to_string(),
        })
    }

    /// Reject unknown attributes and type mismatches.
    fn check_fields(&self, payload: &Record) -> Result<(), ApiError> {
        for (name, value) in payload {
            let Some(spec) = self.field(name) else {
                return Err(ApiError::InvalidAttribute {
                    field: name.clone(),
                    message: format!("not a recognized attribute of {}", self.kind),
                });
            };
            if !spec.ty.matches(value) {
                return Err(ApiError::InvalidAttribute {
                    field: name.clone(),
                    message: format!("must be of type {}", spec.ty.name()),
                });
            }
        }
        Ok(())
    }

    /// Validate a create or full-replace payload.
    ///
    /// Every field present must be whitelisted with the declared type, every
    /// required field must be present, and absent optionals receive their
    /// declared defaults. Returns the record to store; system fields are
    /// injected by the caller afterwards.
    pub fn validate_create(&self, payload: &Value) -> Result<Record, ApiError> {
        let payload = self.as_object(payload)?;
        self.check_fields(payload)?;

        let mut record = Record::new();
        for spec in &self.fields {
            match payload.get(spec.name) {
                Some(value) => {
                    record.insert(spec.name.to_string(), value.clone());
                }
                None if spec.required => {
                    return Err(ApiError::MissingRequired {
                        field: spec.name.to_string(),
                    });
                }
                None => {
                    if let Some(default) = &spec.default {
                        record.insert(spec.name.to_string(), default.resolve());
                    }
                }
            }
        }
        Ok(record)
    }

    /// Validate a partial-update payload against the stored record.
    ///
    /// An empty payload is rejected; otherwise fields absent from the
    /// payload inherit their prior stored values (including system fields
    /// such as `owner`, which are never writable).
    pub fn validate_patch(&self, payload: &Value, existing: &Record) -> Result<Record, ApiError> {
        let payload = self.as_object(payload)?;
        if payload.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        self.check_fields(payload)?;

        let mut record = existing.clone();
        for spec in &self.fields {
            if let Some(value) = payload.get(spec.name) {
                record.insert(spec.name.to_string(), value.clone());
            }
        }
        Ok(record)
    }
}
