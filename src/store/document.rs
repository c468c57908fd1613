//! Field paths, field-level merges and projections over JSON records

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};

/// The identifier field assigned on insert
pub const ID_FIELD: &str = "_id";

/// Resolve a dotted field path
pub fn lookup_path<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a dotted field path, creating intermediate objects as needed.
///
/// Returns whether the stored value changed.
pub fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) -> StoreResult<bool> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut target = doc;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            let entry = target
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            target = entry.as_object_mut().ok_or_else(|| {
                StoreError::backend(format!(
                    "cannot create field '{}' inside non-object value at '{}'",
                    leaf, segment
                ))
            })?;
        }
    }

    if target.get(leaf) == Some(&value) {
        return Ok(false);
    }
    target.insert(leaf.to_string(), value);
    Ok(true)
}

/// Apply a `$set`-style merge. Fields not named in `fields` are untouched.
///
/// Returns whether any stored value changed.
pub fn merge_fields(doc: &mut Map<String, Value>, fields: &Map<String, Value>) -> StoreResult<bool> {
    if let Some(new_id) = fields.get(ID_FIELD) {
        if doc.get(ID_FIELD) != Some(new_id) {
            return Err(StoreError::backend(
                "performing an update on the path '_id' would modify the immutable field '_id'",
            ));
        }
    }

    let mut changed = false;
    for (path, value) in fields {
        changed |= set_path(doc, path, value.clone())?;
    }
    Ok(changed)
}

/// A parsed field inclusion/exclusion specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    mode: ProjectionMode,
    fields: Vec<String>,
    include_id: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectionMode {
    Include,
    Exclude,
}

impl Projection {
    /// Parse a projection mapping such as `{"name": 1, "_id": 0}`
    pub fn parse(spec: &Map<String, Value>) -> StoreResult<Self> {
        let mut include_id = true;
        let mut mode = None;
        let mut fields = Vec::new();

        for (field, flag) in spec {
            let included = match flag {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                other => {
                    return Err(StoreError::backend(format!(
                        "unsupported projection value for '{}': {}",
                        field, other
                    )))
                }
            };

            if field == ID_FIELD {
                include_id = included;
                continue;
            }

            let field_mode = if included {
                ProjectionMode::Include
            } else {
                ProjectionMode::Exclude
            };
            match mode {
                Some(m) if m != field_mode => {
                    return Err(StoreError::backend(
                        "cannot mix inclusion and exclusion in a projection",
                    ))
                }
                _ => mode = Some(field_mode),
            }
            fields.push(field.clone());
        }

        Ok(Self {
            // Only `_id` named: behave as an exclusion projection.
            mode: mode.unwrap_or(ProjectionMode::Exclude),
            fields,
            include_id,
        })
    }

    /// Apply the projection to one record
    pub fn apply(&self, doc: &Map<String, Value>) -> Map<String, Value> {
        let mut out = match self.mode {
            ProjectionMode::Include => {
                let mut out = Map::new();
                for path in &self.fields {
                    if let Some(value) = lookup_path(doc, path) {
                        // Paths resolved from an object cannot collide with a scalar.
                        let _ = set_path(&mut out, path, value.clone());
                    }
                }
                if let Some(id) = doc.get(ID_FIELD) {
                    out.insert(ID_FIELD.to_string(), id.clone());
                }
                out
            }
            ProjectionMode::Exclude => {
                let mut out = doc.clone();
                for path in &self.fields {
                    remove_path(&mut out, path);
                }
                out
            }
        };

        if !self.include_id {
            out.remove(ID_FIELD);
        }
        out
    }
}

fn remove_path(doc: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = doc.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}
