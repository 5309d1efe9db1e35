use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{GitmanError, Result};
use crate::models::TemplateKind;

pub const DEFAULT_GITIGNORE_API: &str = "https://www.toptal.com/developers/gitignore/api";
pub const DEFAULT_LICENSE_API: &str = "https://api.github.com/licenses";

/// Responsible for all communication with the remote template catalogs.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    gitignore_api: Url,
    license_api: Url,
}

/// Entry of GitHub's `/licenses` listing.
#[derive(serde::Deserialize)]
struct LicenseSummary {
    key: String,
}

/// GitHub's `/licenses/{key}` payload; only the body is used.
#[derive(serde::Deserialize)]
struct LicenseDetail {
    body: String,
}

impl ApiClient {
    /// Builds a client against the given catalog base URLs.
    pub fn new(gitignore_api: &str, license_api: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gitman"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GitmanError::Other(e.into()))?;

        Ok(Self {
            client,
            gitignore_api: parse_base(gitignore_api)?,
            license_api: parse_base(license_api)?,
        })
    }

    /// Fetches the full list of template names the remote catalog offers.
    pub async fn list_names(&self, kind: TemplateKind) -> Result<Vec<String>> {
        let what = format!("{kind} template list");
        match kind {
            TemplateKind::Gitignore => {
                let url = join_segment(&self.gitignore_api, "list")?;
                let body = self
                    .get(&url, &what)
                    .await?
                    .text()
                    .await
                    .map_err(|e| GitmanError::fetch(&what, e))?;
                Ok(parse_name_list(&body))
            }
            TemplateKind::License => {
                let payload = self
                    .get(&self.license_api, &what)
                    .await?
                    .bytes()
                    .await
                    .map_err(|e| GitmanError::fetch(&what, e))?;
                let licenses: Vec<LicenseSummary> = decode_json(&payload, &what)?;
                Ok(licenses
                    .into_iter()
                    .map(|l| l.key.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect())
            }
        }
    }

    /// Fetches one template body.
    pub async fn fetch_body(&self, kind: TemplateKind, name: &str) -> Result<Vec<u8>> {
        let what = format!("{kind} template '{name}'");
        match kind {
            TemplateKind::Gitignore => {
                let url = join_segment(&self.gitignore_api, name)?;
                let bytes = self
                    .get(&url, &what)
                    .await?
                    .bytes()
                    .await
                    .map_err(|e| GitmanError::fetch(&what, e))?;
                Ok(bytes.to_vec())
            }
            TemplateKind::License => {
                let url = join_segment(&self.license_api, name)?;
                let payload = self
                    .get(&url, &what)
                    .await?
                    .bytes()
                    .await
                    .map_err(|e| GitmanError::fetch(&what, e))?;
                let detail: LicenseDetail = decode_json(&payload, &what)?;
                Ok(detail.body.into_bytes())
            }
        }
    }

    async fn get(&self, url: &Url, what: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| GitmanError::fetch(what, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitmanError::fetch(what, format!("HTTP {status}")));
        }
        Ok(response)
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| GitmanError::fetch(format!("catalog endpoint '{raw}'"), e))
}

fn join_segment(base: &Url, segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GitmanError::fetch(format!("catalog endpoint '{base}'"), "URL cannot be a base"))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Decodes a JSON payload, reporting the serde error as a fetch failure.
fn decode_json<T: DeserializeOwned>(payload: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| GitmanError::fetch(what, format!("invalid JSON payload: {e}")))
}

/// Splits a comma and/or newline delimited listing into names.
pub fn parse_name_list(body: &str) -> Vec<String> {
    body.split([',', '\n'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
