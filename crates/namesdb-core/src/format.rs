//! Record formatters: engine documents in, public JSON objects out.
//!
//! Formatting never mutates its input. Every output object starts with the
//! same header:
//!
//! ```json
//! { "id": "...", "model": "person", "links": { "html": "...", "json": "..." },
//!   "title": "", "description": "" }
//! ```
//!
//! followed by the model's fields. List items carry the list projection and
//! a joined `highlights` string; detail objects carry every field, with
//! links added to each cross-reference stub and the record itself left out
//! of its own `family`.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::{
  Error, Model, Result,
  catalog::{FieldKind, catalog},
  docstore::Hit,
  routes::Routes,
};

/// Separator between fragments of one field.
const FRAGMENT_SEP: &str = " / ";

#[derive(Debug, Clone)]
pub struct Formatter {
  routes:       Routes,
  index_prefix: String,
}

impl Formatter {
  pub fn new(routes: Routes, index_prefix: impl Into<String>) -> Self {
    Self { routes, index_prefix: index_prefix.into() }
  }

  pub fn routes(&self) -> &Routes { &self.routes }

  /// Format a search hit as a list item. Returns `None` for a hit with an
  /// empty source.
  pub fn list_item(&self, hit: &Hit) -> Result<Option<Value>> {
    if hit.source.is_empty() {
      return Ok(None);
    }
    let model = Model::from_index(&self.index_prefix, &hit.index)?;
    self.list(model, &hit.source, &hit.highlight).map(Some)
  }

  /// List form: header, the list projection and a `highlights` string.
  pub fn list(
    &self,
    model: Model,
    doc: &Map<String, Value>,
    highlight: &BTreeMap<String, Vec<String>>,
  ) -> Result<Value> {
    let cat = catalog(model);
    let mut out = self.header(model, doc)?;
    for &field in cat.list_fields {
      if let Some(value) = present(doc, field) {
        out.insert(field.to_owned(), value.clone());
      }
    }
    let highlights = join_highlights(model, highlight);
    out.insert("highlights".into(), Value::String(highlights));
    Ok(Value::Object(out))
  }

  /// Detail form: header, every declared field, and linked relations.
  pub fn detail(&self, model: Model, doc: &Map<String, Value>) -> Result<Value> {
    let cat = catalog(model);
    let own_id = identifier(model, doc)?;
    let mut out = self.header(model, doc)?;
    for field in cat.fields {
      let Some(value) = present(doc, field.name) else { continue };
      let value = match field.kind {
        FieldKind::Relation(_) if field.name == "family" => {
          self.family(model, own_id, value)
        }
        FieldKind::Relation(_) => self.link_stubs(value),
        _ => value.clone(),
      };
      out.insert(field.name.to_owned(), value);
    }
    Ok(Value::Object(out))
  }

  fn header(
    &self,
    model: Model,
    doc: &Map<String, Value>,
  ) -> Result<Map<String, Value>> {
    let id = identifier(model, doc)?;
    let links = self.routes.links(model, id)?;
    let mut out = Map::new();
    out.insert("id".into(), json!(id));
    out.insert("model".into(), json!(model));
    out.insert("links".into(), json!(links));
    out.insert("title".into(), json!(""));
    out.insert("description".into(), json!(""));
    Ok(out)
  }

  /// `family` minus the record itself, each stub linked.
  fn family(&self, model: Model, own_id: &str, value: &Value) -> Value {
    let Value::Array(members) = value else {
      return self.link_stubs(value);
    };
    let id_field = model.id_field();
    let kept = members
      .iter()
      .filter(|m| m.get(id_field).and_then(Value::as_str) != Some(own_id))
      .map(|m| self.link_stub(m))
      .collect();
    Value::Array(kept)
  }

  /// Add links to a stub or to each stub of a list.
  fn link_stubs(&self, value: &Value) -> Value {
    match value {
      Value::Array(items) => {
        Value::Array(items.iter().map(|s| self.link_stub(s)).collect())
      }
      other => self.link_stub(other),
    }
  }

  fn link_stub(&self, stub: &Value) -> Value {
    let Value::Object(fields) = stub else {
      return stub.clone();
    };
    let mut out = fields.clone();
    if let Some((model, id)) = stub_target(fields)
      && let Ok(links) = self.routes.links(model, id)
    {
      out.insert("links".into(), json!(links));
    }
    Value::Object(out)
  }
}

/// The record's identifier, required in every form.
fn identifier(model: Model, doc: &Map<String, Value>) -> Result<&str> {
  let field = model.id_field();
  doc
    .get(field)
    .and_then(Value::as_str)
    .filter(|id| !id.is_empty())
    .ok_or(Error::MissingIdentifier { model, field })
}

/// The record a stub points at, judged by which identifier it carries.
fn stub_target(stub: &Map<String, Value>) -> Option<(Model, &str)> {
  [Model::FarRecord, Model::WraRecord, Model::Person, Model::FarPage]
    .into_iter()
    .find_map(|model| {
      let id = stub.get(model.id_field())?.as_str()?;
      (!id.is_empty()).then_some((model, id))
    })
}

/// A field with a value worth showing.
fn present<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
  doc.get(field).filter(|v| match v {
    Value::Null => false,
    Value::String(s) => !s.is_empty(),
    Value::Array(a) => !a.is_empty(),
    Value::Object(o) => !o.is_empty(),
    _ => true,
  })
}

/// Join highlight fragments as `field: "a / b", field2: "c"`, in catalog
/// field order.
pub fn join_highlights(
  model: Model,
  highlight: &BTreeMap<String, Vec<String>>,
) -> String {
  catalog(model)
    .fields
    .iter()
    .filter_map(|f| {
      let fragments = highlight.get(f.name)?;
      Some(format!("{}: \"{}\"", f.name, fragments.join(FRAGMENT_SEP)))
    })
    .collect::<Vec<_>>()
    .join(", ")
}
