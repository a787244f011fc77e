//! Record kinds held in the document store, and the compound person id.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// The kind of document a hit or identifier refers to.
///
/// Each kind lives in its own index named `{prefix}{model}`, e.g.
/// `namesperson`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  IntoStaticStr,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Model {
  Person,
  FarRecord,
  WraRecord,
  FarPage,
}

impl Model {
  /// The models searched by default (FAR pages are browsed, not searched).
  pub const SEARCHABLE: [Model; 3] =
    [Model::Person, Model::FarRecord, Model::WraRecord];

  /// The document field holding this model's identifier.
  pub fn id_field(self) -> &'static str {
    match self {
      Self::Person => "nr_id",
      Self::FarRecord => "far_record_id",
      Self::WraRecord => "wra_record_id",
      Self::FarPage => "far_page_id",
    }
  }

  /// Name of the index holding this model's documents.
  pub fn index_name(self, prefix: &str) -> String {
    format!("{prefix}{}", self.as_ref())
  }

  /// Resolve the model of a hit from the index it came from.
  pub fn from_index(prefix: &str, index: &str) -> Result<Self> {
    index
      .strip_prefix(prefix)
      .and_then(|name| name.parse().ok())
      .ok_or_else(|| Error::UnknownModel(index.to_owned()))
  }

  /// Parse a model from its singular or plural URL form (`person`,
  /// `persons`).
  pub fn from_path(segment: &str) -> Result<Self> {
    segment
      .parse()
      .or_else(|_| segment.strip_suffix('s').unwrap_or(segment).parse())
      .map_err(|_| Error::UnknownModel(segment.to_owned()))
  }
}

// ─── Person identifier ───────────────────────────────────────────────────────

/// A person's archival identifier, `NAAN/NOID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NrId {
  pub naan: String,
  pub noid: String,
}

impl NrId {
  /// Build from the two URL path segments of a person route.
  pub fn from_parts(naan: &str, noid: &str) -> Result<Self> {
    if !is_id_segment(naan) || !is_id_segment(noid) {
      return Err(Error::InvalidIdentifier(format!("{naan}/{noid}")));
    }
    Ok(Self {
      naan: naan.to_owned(),
      noid: noid.to_owned(),
    })
  }
}

impl FromStr for NrId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let (naan, noid) = s
      .split_once('/')
      .ok_or_else(|| Error::InvalidIdentifier(s.to_owned()))?;
    Self::from_parts(naan, noid)
  }
}

impl fmt::Display for NrId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.naan, self.noid)
  }
}

/// Identifier path segments accepted by the record routes.
pub fn is_id_segment(s: &str) -> bool {
  !s.is_empty()
    && s
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index_names_use_prefix() {
    assert_eq!(Model::Person.index_name("names"), "namesperson");
    assert_eq!(Model::FarRecord.index_name("names"), "namesfarrecord");
  }

  #[test]
  fn model_from_index_strips_prefix() {
    assert_eq!(
      Model::from_index("names", "nameswrarecord").unwrap(),
      Model::WraRecord
    );
    assert!(Model::from_index("names", "ddrobject").is_err());
    assert!(Model::from_index("names", "namesbogus").is_err());
  }

  #[test]
  fn model_from_plural_path() {
    assert_eq!(Model::from_path("persons").unwrap(), Model::Person);
    assert_eq!(Model::from_path("farrecord").unwrap(), Model::FarRecord);
    assert_eq!(Model::from_path("farpages").unwrap(), Model::FarPage);
    assert!(Model::from_path("things").is_err());
  }

  #[test]
  fn nr_id_parses_and_displays() {
    let id: NrId = "88922/nr012345".parse().unwrap();
    assert_eq!(id.naan, "88922");
    assert_eq!(id.noid, "nr012345");
    assert_eq!(id.to_string(), "88922/nr012345");
  }

  #[test]
  fn nr_id_rejects_malformed() {
    assert!("88922".parse::<NrId>().is_err());
    assert!("88922/".parse::<NrId>().is_err());
    assert!("a/b/c".parse::<NrId>().is_err());
    assert!(NrId::from_parts("88922", "nr 1").is_err());
  }
}
