//! # Patch Engine
//!
//! Applies an ordered list of [`PatchOperation`]s (`add`, `remove`, `replace`, `move`, `copy`,
//! `test`) to a fixed-shape record and returns the patched record, or the index of the first
//! operation that could not be applied.
//!
//! ## Semantics
//!
//! The record is serialized into a JSON document once, every operation runs against the
//! result of the previous one, and the final document is deserialized back into the record
//! type. The caller's value is never touched, so a failure anywhere leaves nothing applied.
//!
//! Because the record has a fixed shape, members cannot be created or deleted:
//!
//! * `add` and `replace` only write members the record already has. `add` may walk through a
//!   `null` member (an unset optional sub-record), in which case the container is created.
//! * `remove` on a record member resets it to its zero value (`""`, `0`, `false`, `[]`, a
//!   zeroed object, `null`). Array elements are really removed.
//! * Writing a value whose JSON type differs from the current one, or one the record type
//!   refuses to deserialize, fails with [`PatchError::TypeMismatch`].
//!
//! Paths are JSON Pointers (`/field/0/sub`, `~1` for `/`, `~0` for `~`). Member lookup tries
//! an exact match first, then an ASCII case-insensitive one, so `/howto` addresses `howTo`.
//! The empty pointer names the whole record: it can be read by `test` and as a `from`
//! source, but it is not a writable field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One instruction in a patch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    /// The `op` name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    /// The target path.
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

/// Why a single operation could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("test failed at '{path}': expected {expected}, found {actual}")]
    TestFailed {
        path: String,
        expected: Value,
        actual: Value,
    },
    #[error("path not found: '{path}'")]
    PathNotFound { path: String },
    #[error("type mismatch at '{path}': {reason}")]
    TypeMismatch { path: String, reason: String },
}

/// The first failing operation of a patch document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("patch operation {index} failed: {error}")]
pub struct PatchFailure {
    /// Zero-based position of the operation in the document.
    pub index: usize,
    #[source]
    pub error: PatchError,
}

/// Applies `operations` to a copy of `target`.
///
/// Returns the patched value, or the failure of the first operation that could not be
/// applied. `target` is only read.
pub fn apply_patch<S>(target: &S, operations: &[PatchOperation]) -> Result<S, PatchFailure>
where
    S: Serialize + DeserializeOwned,
{
    // A derived record always serializes; report the odd custom impl against the root.
    let mut document = serde_json::to_value(target).map_err(|e| PatchFailure {
        index: 0,
        error: PatchError::TypeMismatch {
            path: String::new(),
            reason: e.to_string(),
        },
    })?;

    for (index, operation) in operations.iter().enumerate() {
        apply_operation(&mut document, operation)
            .and_then(|mutated| {
                if mutated {
                    check_shape::<S>(&document, operation.path())
                } else {
                    Ok(())
                }
            })
            .map_err(|error| PatchFailure { index, error })?;
    }

    S::deserialize(document).map_err(|e| PatchFailure {
        index: operations.len().saturating_sub(1),
        error: PatchError::TypeMismatch {
            path: String::new(),
            reason: e.to_string(),
        },
    })
}

/// Runs one operation. Returns whether the document was written.
fn apply_operation(document: &mut Value, operation: &PatchOperation) -> Result<bool, PatchError> {
    match operation {
        PatchOperation::Test { path, value } => {
            let actual = resolve(document, path)?;
            if actual != value {
                return Err(PatchError::TestFailed {
                    path: path.clone(),
                    expected: value.clone(),
                    actual: actual.clone(),
                });
            }
            Ok(false)
        }
        PatchOperation::Add { path, value } => add(document, path, value.clone()).map(|_| true),
        PatchOperation::Replace { path, value } => {
            replace(document, path, value.clone()).map(|_| true)
        }
        PatchOperation::Remove { path } => remove(document, path).map(|_| true),
        PatchOperation::Copy { from, path } => {
            let value = resolve(document, from)?.clone();
            add(document, path, value).map(|_| true)
        }
        PatchOperation::Move { from, path } => {
            let source = canonical_segments(document, &parse_pointer(from)?);
            let target = canonical_segments(document, &parse_pointer(path)?);
            if target.len() > source.len() && target.starts_with(&source) {
                // A location cannot be moved into one of its own children
                return Err(not_found(path));
            }
            let value = resolve(document, from)?.clone();
            remove(document, from)?;
            add(document, path, value).map(|_| true)
        }
    }
}

fn check_shape<S: DeserializeOwned>(document: &Value, path: &str) -> Result<(), PatchError> {
    S::deserialize(document)
        .map(|_| ())
        .map_err(|e| PatchError::TypeMismatch {
            path: path.to_string(),
            reason: e.to_string(),
        })
}

// =============================================================================
// POINTER RESOLUTION
// =============================================================================

fn not_found(path: &str) -> PatchError {
    PatchError::PathNotFound {
        path: path.to_string(),
    }
}

fn parse_pointer(path: &str) -> Result<Vec<String>, PatchError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let rest = path.strip_prefix('/').ok_or_else(|| not_found(path))?;
    Ok(rest
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect())
}

fn member_key(map: &Map<String, Value>, segment: &str) -> Option<String> {
    if map.contains_key(segment) {
        return Some(segment.to_string());
    }
    map.keys()
        .find(|key| key.eq_ignore_ascii_case(segment))
        .cloned()
}

/// Spells each segment the way the member it resolves to is named, so pointers that differ
/// only in case compare equal. Segments past the first unresolved one are kept as given.
fn canonical_segments(document: &Value, segments: &[String]) -> Vec<String> {
    let mut current = Some(document);
    segments
        .iter()
        .map(|segment| {
            let (name, next) = match current {
                Some(Value::Object(map)) => match member_key(map, segment) {
                    Some(key) => {
                        let next = map.get(&key);
                        (key, next)
                    }
                    None => (segment.clone(), None),
                },
                Some(Value::Array(items)) => (
                    segment.clone(),
                    parse_index(segment).and_then(|i| items.get(i)),
                ),
                _ => (segment.clone(), None),
            };
            current = next;
            name
        })
        .collect()
}

fn parse_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

fn resolve<'a>(document: &'a Value, path: &str) -> Result<&'a Value, PatchError> {
    let mut current = document;
    for segment in parse_pointer(path)? {
        current = match current {
            Value::Object(map) => member_key(map, &segment).and_then(|key| map.get(&key)),
            Value::Array(items) => parse_index(&segment).and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| not_found(path))?;
    }
    Ok(current)
}

fn resolve_mut<'a>(
    document: &'a mut Value,
    segments: &[String],
    path: &str,
) -> Result<&'a mut Value, PatchError> {
    let mut current = document;
    for segment in segments {
        current = match current {
            Value::Object(map) => {
                let key = member_key(map, segment).ok_or_else(|| not_found(path))?;
                map.get_mut(&key)
            }
            Value::Array(items) => parse_index(segment).and_then(|i| items.get_mut(i)),
            _ => None,
        }
        .ok_or_else(|| not_found(path))?;
    }
    Ok(current)
}

// =============================================================================
// WRITES
// =============================================================================

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_kind(current: &Value, value: &Value, path: &str) -> Result<(), PatchError> {
    if current.is_null() || value.is_null() || kind(current) == kind(value) {
        return Ok(());
    }
    Err(PatchError::TypeMismatch {
        path: path.to_string(),
        reason: format!("expected {}, got {}", kind(current), kind(value)),
    })
}

fn zero_value(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(_) => Value::Bool(false),
        Value::Number(n) if n.is_f64() => Value::from(0.0),
        Value::Number(_) => Value::from(0),
        Value::String(_) => Value::String(String::new()),
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, member)| (key.clone(), zero_value(member)))
                .collect(),
        ),
    }
}

fn add(document: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    let segments = parse_pointer(path)?;
    let (last, parents) = segments.split_last().ok_or_else(|| not_found(path))?;

    // Members inside a container this operation created are free to be inserted.
    let mut created = false;
    let mut current = document;
    for segment in parents {
        if current.is_null() {
            *current = Value::Object(Map::new());
            created = true;
        }
        current = match current {
            Value::Object(map) => match member_key(map, segment) {
                Some(key) => map.get_mut(&key).ok_or_else(|| not_found(path))?,
                None if created => map.entry(segment.clone()).or_insert(Value::Null),
                None => return Err(not_found(path)),
            },
            Value::Array(items) => parse_index(segment)
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| not_found(path))?,
            _ => return Err(not_found(path)),
        };
    }
    if current.is_null() {
        *current = Value::Object(Map::new());
        created = true;
    }

    match current {
        Value::Object(map) => {
            let key = match member_key(map, last) {
                Some(key) => key,
                None if created => last.clone(),
                None => return Err(not_found(path)),
            };
            if let Some(existing) = map.get(&key) {
                check_kind(existing, &value, path)?;
            }
            map.insert(key, value);
            Ok(())
        }
        Value::Array(items) => {
            let index = if last == "-" {
                items.len()
            } else {
                parse_index(last)
                    .filter(|i| *i <= items.len())
                    .ok_or_else(|| not_found(path))?
            };
            items.insert(index, value);
            Ok(())
        }
        _ => Err(not_found(path)),
    }
}

fn replace(document: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    let segments = parse_pointer(path)?;
    if segments.is_empty() {
        return Err(not_found(path));
    }
    let target = resolve_mut(document, &segments, path)?;
    check_kind(target, &value, path)?;
    *target = value;
    Ok(())
}

fn remove(document: &mut Value, path: &str) -> Result<Value, PatchError> {
    let segments = parse_pointer(path)?;
    let (last, parents) = segments.split_last().ok_or_else(|| not_found(path))?;
    match resolve_mut(document, parents, path)? {
        Value::Object(map) => {
            let key = member_key(map, last).ok_or_else(|| not_found(path))?;
            let slot = map.get_mut(&key).ok_or_else(|| not_found(path))?;
            let zero = zero_value(slot);
            Ok(std::mem::replace(slot, zero))
        }
        Value::Array(items) => {
            let index = parse_index(last)
                .filter(|i| *i < items.len())
                .ok_or_else(|| not_found(path))?;
            Ok(items.remove(index))
        }
        _ => Err(not_found(path)),
    }
}
