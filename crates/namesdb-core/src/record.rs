//! Record construction from loosely-typed source data.
//!
//! Source rows are messy: blank dates, numbers typed as text, stray
//! columns. [`SourceRecord::from_raw`] keeps what fits the catalog, drops
//! blanks, and notes every value it could not coerce in `errors` instead of
//! failing the whole record.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  Error, Model, Result,
  catalog::{FieldKind, catalog},
};

/// The derived field queried by free-text search.
pub const FULLTEXT_FIELD: &str = "fulltext";

/// A record built from source data, ready to index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRecord {
  pub model:    Model,
  pub id:       String,
  /// Coerced field values, keyed by catalog field.
  pub fields:   Map<String, Value>,
  /// Lower-cased string values of every full-text field, space-joined.
  pub fulltext: String,
  /// `field:value` for each value that failed coercion.
  pub errors:   Vec<String>,
}

impl SourceRecord {
  /// Coerce `raw` against the catalog of `model`. Only a blank `id` is
  /// fatal.
  pub fn from_raw(
    model: Model,
    id: &str,
    raw: &Map<String, Value>,
  ) -> Result<Self> {
    let id_field = model.id_field();
    if id.trim().is_empty() {
      return Err(Error::MissingIdentifier { model, field: id_field });
    }
    let cat = catalog(model);
    let mut fields = Map::new();
    let mut errors = Vec::new();

    for field in cat.fields {
      if field.name == id_field {
        fields.insert(id_field.to_owned(), Value::String(id.to_owned()));
        continue;
      }
      let Some(value) = raw.get(field.name) else { continue };
      if is_blank(value) {
        continue;
      }
      match coerce(field.kind, value) {
        Some(v) => {
          fields.insert(field.name.to_owned(), v);
        }
        None => errors.push(format!("{}:{}", field.name, display(value))),
      }
    }

    let fulltext = cat
      .fulltext_fields()
      .filter_map(|name| fields.get(name)?.as_str())
      .map(str::to_lowercase)
      .collect::<Vec<_>>()
      .join(" ");

    Ok(Self { model, id: id.to_owned(), fields, fulltext, errors })
  }

  /// The document as stored: fields plus the `fulltext` field.
  pub fn to_document(&self) -> Map<String, Value> {
    let mut doc = self.fields.clone();
    doc.insert(FULLTEXT_FIELD.into(), Value::String(self.fulltext.clone()));
    doc
  }
}

fn is_blank(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.trim().is_empty(),
    _ => false,
  }
}

fn display(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn coerce(kind: FieldKind, value: &Value) -> Option<Value> {
  match kind {
    FieldKind::Keyword | FieldKind::Text => match value {
      Value::String(s) => Some(Value::String(s.trim().to_owned())),
      Value::Number(n) => Some(Value::String(n.to_string())),
      Value::Bool(b) => Some(Value::String(b.to_string())),
      _ => None,
    },
    FieldKind::Integer => match value {
      Value::Number(n) => n.as_i64().map(Value::from),
      Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
      _ => None,
    },
    FieldKind::Date => value.as_str().and_then(parse_date).map(Value::String),
    FieldKind::Relation(keys) => match value {
      Value::Array(items) => items
        .iter()
        .map(|item| project(item, keys))
        .collect::<Option<Vec<_>>>()
        .map(Value::Array),
      Value::Object(_) => project(value, keys),
      _ => None,
    },
  }
}

/// Normalise `YYYY-MM-DD` or RFC 3339 text.
fn parse_date(s: &str) -> Option<String> {
  let s = s.trim();
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(date.format("%Y-%m-%d").to_string());
  }
  DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.to_rfc3339())
}

/// Keep only a stub's declared keys.
fn project(item: &Value, keys: &[&str]) -> Option<Value> {
  let obj = item.as_object()?;
  let stub: Map<String, Value> = keys
    .iter()
    .filter_map(|k| Some(((*k).to_owned(), obj.get(*k)?.clone())))
    .filter(|(_, v)| !is_blank(v))
    .collect();
  Some(Value::Object(stub))
}
