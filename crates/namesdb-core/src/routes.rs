//! Absolute URLs for records, rooted at the origin of the inbound request.

use serde::Serialize;
use url::Url;

use crate::{Error, Model, NrId, Result, model::is_id_segment};

/// Path prefix of the JSON API.
pub const API_PREFIX: &str = "api/1.0/";

/// An HTML page and its JSON twin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
  pub html: String,
  pub json: String,
}

/// URL builder bound to one origin (`scheme://host`).
#[derive(Debug, Clone)]
pub struct Routes {
  origin: Url,
}

impl Routes {
  /// Routes for `scheme://host`. Fails on a host that does not form a URL.
  pub fn new(scheme: &str, host: &str) -> Result<Self> {
    let origin = Url::parse(&format!("{scheme}://{host}/"))?;
    if origin.cannot_be_a_base() || origin.path() != "/" {
      return Err(Error::InvalidUrl(url::ParseError::InvalidDomainCharacter));
    }
    Ok(Self { origin })
  }

  pub fn origin(&self) -> &Url { &self.origin }

  /// The origin joined with an absolute request path.
  pub fn url_for(&self, path: &str) -> Result<Url> {
    Ok(self.origin.join(path)?)
  }

  /// `path` made absolute. `path` has no leading slash.
  pub fn absolute(&self, path: &str) -> String {
    format!("{}{path}", self.origin.as_str())
  }

  pub fn api(&self, path: &str) -> String {
    self.absolute(&format!("{API_PREFIX}{path}"))
  }

  /// HTML and JSON links for the record `id` of `model`.
  pub fn links(&self, model: Model, id: &str) -> Result<Links> {
    let path = record_path(model, id)?;
    Ok(Links { html: self.absolute(&path), json: self.api(&path) })
  }
}

/// Relative path of one record, shared by its HTML and JSON routes.
pub fn record_path(model: Model, id: &str) -> Result<String> {
  let invalid = || Error::InvalidIdentifier(id.to_owned());
  match model {
    Model::Person => {
      let nr_id: NrId = id.parse()?;
      Ok(format!("persons/{}/{}", nr_id.naan, nr_id.noid))
    }
    Model::FarRecord | Model::WraRecord => {
      if !is_id_segment(id) {
        return Err(invalid());
      }
      Ok(format!("{model}s/{id}"))
    }
    Model::FarPage => {
      let (facility, page) = split_far_page_id(id).ok_or_else(invalid)?;
      Ok(format!("farpages/{facility}/{page}"))
    }
  }
}

/// Split a FAR page id `{facility_id}_{page}`.
pub fn split_far_page_id(id: &str) -> Option<(&str, u32)> {
  let (facility, page) = id.rsplit_once('_')?;
  let page = page.parse().ok()?;
  is_id_segment(facility).then_some((facility, page))
}

pub fn far_page_id(facility_id: &str, page: u32) -> String {
  format!("{facility_id}_{page}")
}
