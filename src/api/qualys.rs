//! Blocking client for the Qualys QPS REST 2.0 search endpoints.

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, trace};
use serde::Deserialize;
use serde_json::{Value, json};

use super::credentials::{CredentialProvider, Secret};
use super::{PlatformApi, TransportError};
use crate::error::{MigrationError, Result};
use crate::migration::{AssetRecord, KeyRecord};

const ACTIVATION_KEY_SEARCH: &str = "/qps/rest/2.0/search/ca/agentactkey";
const HOST_ASSET_SEARCH: &str = "/qps/rest/2.0/search/am/hostasset";
/// Host asset field holding the activation key an agent was installed with.
const ASSET_KEY_FIELD: &str = "agentInfo.activationKey";
const REQUESTED_WITH: &str = concat!("ca-migrate/", env!("CARGO_PKG_VERSION"));

/// Connection settings shared by the source and target clients.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub proxy_url: Option<String>,
    pub timeout: Duration,
    /// Records requested per search page.
    pub page_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy_url: None,
            timeout: Duration::from_secs(300),
            page_size: 100,
        }
    }
}

/// One subscription's API endpoint, authenticated with basic auth.
pub struct QualysClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: Secret,
    page_size: usize,
}

impl QualysClient {
    /// Build a client, asking `credentials` for the account to use.
    pub fn connect(
        api_url: &str,
        credentials: &mut dyn CredentialProvider,
        options: &ClientOptions,
    ) -> Result<Self> {
        let credentials = credentials.credentials()?;

        let mut builder = ureq::AgentBuilder::new()
            .timeout(options.timeout)
            .user_agent(REQUESTED_WITH);
        if let Some(proxy_url) = &options.proxy_url {
            let proxy = ureq::Proxy::new(proxy_url).map_err(|err| {
                MigrationError::argument(format!("invalid proxy URL {}: {}", proxy_url, err))
            })?;
            builder = builder.proxy(proxy);
        }

        debug!("Connecting to {} as {}", api_url, credentials.username);
        Ok(Self {
            agent: builder.build(),
            base_url: api_url.trim_end_matches('/').to_string(),
            authorization: credentials.basic_auth_header(),
            page_size: options.page_size.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a search to exhaustion, following `hasMoreRecords` / `lastId`.
    fn search(
        &self,
        path: &str,
        criteria: &[Value],
    ) -> std::result::Result<Vec<Value>, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let mut records = Vec::new();
        let mut after: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let body = search_request(criteria, after.as_deref(), self.page_size);
            let page = parse_page(&url, &self.post(&url, &body)?)?;
            debug!("{}: received {} record(s)", path, page.data.len());
            records.extend(page.data);

            match page.next_after {
                // A repeated lastId would page forever.
                Some(last_id) if !seen.insert(last_id.clone()) => {
                    return Err(TransportError::InvalidResponse {
                        url,
                        message: format!("pagination returned id {} more than once", last_id),
                    });
                }
                Some(last_id) => after = Some(last_id),
                None => break,
            }
        }

        Ok(records)
    }

    fn post(&self, url: &str, body: &Value) -> std::result::Result<String, TransportError> {
        trace!("POST {} {}", url, body);
        let response = self
            .agent
            .post(url)
            .set("Authorization", self.authorization.expose_secret())
            .set("X-Requested-With", REQUESTED_WITH)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_string(&body.to_string());

        match response {
            Ok(response) => response
                .into_string()
                .map_err(|err| TransportError::Request {
                    url: url.to_string(),
                    message: err.to_string(),
                }),
            Err(ureq::Error::Status(status, _)) => Err(TransportError::Status {
                url: url.to_string(),
                status,
            }),
            Err(ureq::Error::Transport(transport)) => Err(TransportError::Request {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

impl PlatformApi for QualysClient {
    fn fetch_all_activation_keys(&self) -> std::result::Result<Vec<KeyRecord>, TransportError> {
        let url = format!("{}{}", self.base_url, ACTIVATION_KEY_SEARCH);
        self.search(ACTIVATION_KEY_SEARCH, &[])?
            .into_iter()
            .map(|entry| key_from_entry(&url, entry))
            .collect()
    }

    fn fetch_assets_by_key(
        &self,
        key_id: &str,
    ) -> std::result::Result<Vec<AssetRecord>, TransportError> {
        let criteria = [criterion(ASSET_KEY_FIELD, "EQUALS", key_id)];
        Ok(self
            .search(HOST_ASSET_SEARCH, &criteria)?
            .into_iter()
            .map(AssetRecord::from_listing)
            .collect())
    }
}

fn criterion(field: &str, operator: &str, value: &str) -> Value {
    json!({ "field": field, "operator": operator, "value": value })
}

/// Body of one search page request.
fn search_request(criteria: &[Value], after: Option<&str>, page_size: usize) -> Value {
    let mut criteria = criteria.to_vec();
    if let Some(last_id) = after {
        criteria.push(criterion("id", "GREATER", last_id));
    }

    let mut request = json!({
        "ServiceRequest": {
            "preferences": { "limitResults": page_size }
        }
    });
    if !criteria.is_empty() {
        request["ServiceRequest"]["filters"] = json!({ "Criteria": criteria });
    }
    request
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    service_response: ServiceResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceResponse {
    response_code: String,
    #[serde(default)]
    has_more_records: Option<Value>,
    #[serde(default)]
    last_id: Option<Value>,
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    response_error_details: Option<ErrorDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetails {
    #[serde(default)]
    error_message: Option<String>,
}

/// One decoded search page.
#[derive(Debug, PartialEq)]
struct SearchPage {
    data: Vec<Value>,
    /// Id to continue after, when more records remain.
    next_after: Option<String>,
}

fn parse_page(url: &str, body: &str) -> std::result::Result<SearchPage, TransportError> {
    let invalid = |message: String| TransportError::InvalidResponse {
        url: url.to_string(),
        message,
    };

    let envelope: Envelope =
        serde_json::from_str(body).map_err(|err| invalid(err.to_string()))?;
    let response = envelope.service_response;

    if response.response_code != "SUCCESS" {
        return Err(TransportError::Platform {
            url: url.to_string(),
            message: response
                .response_error_details
                .and_then(|details| details.error_message)
                .unwrap_or_else(|| "no error details".to_string()),
            code: response.response_code,
        });
    }

    let has_more = match response.has_more_records {
        Some(Value::Bool(more)) => more,
        Some(Value::String(more)) => more.eq_ignore_ascii_case("true"),
        _ => false,
    };
    let next_after = if has_more {
        match response.last_id {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => return Err(invalid("hasMoreRecords set without lastId".to_string())),
        }
    } else {
        None
    };

    Ok(SearchPage {
        data: response.data,
        next_after,
    })
}

/// Unwrap one `{"AgentActKey": {...}}` listing entry.
fn key_from_entry(url: &str, entry: Value) -> std::result::Result<KeyRecord, TransportError> {
    let invalid = |message: &str| TransportError::InvalidResponse {
        url: url.to_string(),
        message: message.to_string(),
    };
    let fields = match entry {
        Value::Object(mut wrapper) => match wrapper.remove("AgentActKey") {
            Some(Value::Object(fields)) => fields,
            _ => return Err(invalid("activation key entry without AgentActKey object")),
        },
        _ => return Err(invalid("activation key entry is not an object")),
    };
    KeyRecord::from_fields(fields)
        .ok_or_else(|| invalid("activation key entry without activationKey"))
}
