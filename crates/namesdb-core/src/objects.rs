//! Archival objects linked to a person, held by an external repository API.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NrId;

/// Placeholder replaced by the person id in URL templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// A person's linked objects as reported upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedObjects {
  /// Human-facing page listing the objects.
  pub ui_url:  String,
  /// The API URL that was queried.
  pub api_url: String,
  /// Upstream HTTP status. Anything but 2xx comes with no objects.
  pub status:  u16,
  pub objects: Vec<Value>,
}

impl LinkedObjects {
  /// Read the object list out of an upstream reply: either a bare array or
  /// an object with an `objects` array.
  pub fn from_reply(
    ui_url: String,
    api_url: String,
    status: u16,
    reply: Value,
  ) -> Self {
    let objects = match reply {
      Value::Array(items) => items,
      Value::Object(mut map) => match map.remove("objects") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
      },
      _ => Vec::new(),
    };
    Self { ui_url, api_url, status, objects }
  }

  /// A failed lookup: status only.
  pub fn failed(ui_url: String, api_url: String, status: u16) -> Self {
    Self { ui_url, api_url, status, objects: Vec::new() }
  }
}

/// Fill `{id}` in a URL template.
pub fn expand(template: &str, id: &NrId) -> String {
  template.replace(ID_PLACEHOLDER, &id.to_string())
}

/// Source of archival objects linked to a person.
///
/// An upstream that answers with an error status is not an error here: the
/// status is reported in [`LinkedObjects::status`]. `Err` is kept for
/// transport failures (timeouts, refused connections, bad bodies).
pub trait ObjectSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn person_objects<'a>(
    &'a self,
    nr_id: &'a NrId,
  ) -> impl Future<Output = Result<LinkedObjects, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn id() -> NrId { "88922/nr1".parse().unwrap() }

  #[test]
  fn templates_expand() {
    assert_eq!(
      expand("https://ddr.example.org/api/0.2/names/{id}/objects", &id()),
      "https://ddr.example.org/api/0.2/names/88922/nr1/objects"
    );
  }

  #[test]
  fn reply_shapes() {
    let wrapped = LinkedObjects::from_reply(
      "ui".into(),
      "api".into(),
      200,
      json!({ "total": 1, "objects": [{ "id": "ddr-densho-1" }] }),
    );
    assert_eq!(wrapped.objects.len(), 1);
    let bare =
      LinkedObjects::from_reply("ui".into(), "api".into(), 200, json!([{}, {}]));
    assert_eq!(bare.objects.len(), 2);
    let odd = LinkedObjects::from_reply("ui".into(), "api".into(), 200, json!("x"));
    assert!(odd.objects.is_empty());
  }
}
