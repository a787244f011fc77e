//! [`DdrClient`]: archival objects linked to a person, from the digital
//! repository API.

use std::time::Duration;

use namesdb_core::{
  NrId,
  objects::{LinkedObjects, ObjectSource, expand},
};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{DdrConfig, Result};

#[derive(Debug, Clone)]
pub struct DdrClient {
  client:       Client,
  api_template: String,
  ui_template:  String,
  username:     Option<String>,
  password:     Option<String>,
}

impl DdrClient {
  pub fn new(config: &DdrConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      api_template: config.api_url.clone(),
      ui_template: config.ui_url.clone(),
      username: config.username.clone(),
      password: config.password.clone(),
    })
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.username {
      Some(user) => req.basic_auth(user, self.password.as_ref()),
      None => req,
    }
  }
}

impl ObjectSource for DdrClient {
  type Error = crate::Error;

  async fn person_objects(&self, nr_id: &NrId) -> Result<LinkedObjects> {
    let api_url = expand(&self.api_template, nr_id);
    let ui_url = expand(&self.ui_template, nr_id);
    debug!(%nr_id, url = %api_url, "fetching linked objects");

    let resp = self.auth(self.client.get(&api_url)).send().await?;
    let status = resp.status();
    if !status.is_success() {
      warn!(%nr_id, status = status.as_u16(), "object lookup failed upstream");
      return Ok(LinkedObjects::failed(ui_url, api_url, status.as_u16()));
    }
    let reply: Value = serde_json::from_str(&resp.text().await?)?;
    Ok(LinkedObjects::from_reply(ui_url, api_url, status.as_u16(), reply))
  }
}
