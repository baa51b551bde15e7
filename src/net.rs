//! ICE server configuration for capture clients.
//!
//! Browser-side capture needs relay candidates to traverse restrictive
//! networks. When Twilio credentials are present in the environment a
//! short-lived TURN token is fetched; otherwise (or on any fetch failure)
//! the configuration falls back to a free public STUN server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

const FALLBACK_STUN_URL: &str = "stun:stun.l.google.com:19302";

/// One ICE server entry, in the shape WebRTC clients expect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// RTC configuration served to capture clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfiguration {
    pub ice_servers: Vec<IceServer>,
}

/// Relay credentials read from the process environment
#[derive(Debug, Clone)]
pub struct RelayCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl RelayCredentials {
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok()?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok()?;
        if account_sid.is_empty() || auth_token.is_empty() {
            return None;
        }
        Some(Self {
            account_sid,
            auth_token,
        })
    }
}

fn stun_fallback() -> Vec<IceServer> {
    vec![IceServer {
        urls: vec![FALLBACK_STUN_URL.to_string()],
        username: None,
        credential: None,
    }]
}

/// Build the RTC configuration, never failing: credentials missing or the
/// token fetch failing both degrade to the STUN fallback.
pub async fn rtc_configuration(client: &reqwest::Client) -> RtcConfiguration {
    let ice_servers = match RelayCredentials::from_env() {
        None => {
            warn!("Relay credentials are not set. Fallback to a free STUN server.");
            stun_fallback()
        }
        Some(credentials) => match fetch_twilio_ice_servers(client, &credentials).await {
            Ok(servers) if !servers.is_empty() => servers,
            Ok(_) => {
                warn!("Relay token contained no ICE servers, using STUN fallback");
                stun_fallback()
            }
            Err(e) => {
                error!("Failed to fetch relay ICE servers: {:#}", e);
                stun_fallback()
            }
        },
    };

    RtcConfiguration { ice_servers }
}

/// Create a short-lived token and read its ICE server list.
async fn fetch_twilio_ice_servers(
    client: &reqwest::Client,
    credentials: &RelayCredentials,
) -> Result<Vec<IceServer>> {
    let url = format!(
        "https://api.twilio.com/2010-04-01/Accounts/{}/Tokens.json",
        credentials.account_sid
    );

    let response = client
        .post(&url)
        .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
        .send()
        .await
        .context("Relay token request failed")?
        .error_for_status()
        .context("Relay token request rejected")?;

    let payload: Value = response
        .json()
        .await
        .context("Failed to parse relay token response")?;

    let servers = payload
        .get("ice_servers")
        .and_then(|v| v.as_array())
        .context("Relay token response missing ice_servers")?;

    Ok(servers.iter().filter_map(parse_ice_server).collect())
}

/// Twilio entries carry either a single `url` or a `urls` array.
fn parse_ice_server(entry: &Value) -> Option<IceServer> {
    let urls: Vec<String> = match entry.get("urls") {
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(Value::String(url)) => vec![url.clone()],
        _ => entry
            .get("url")
            .and_then(|v| v.as_str())
            .map(|u| vec![u.to_string()])
            .unwrap_or_default(),
    };

    if urls.is_empty() {
        return None;
    }

    Some(IceServer {
        urls,
        username: entry
            .get("username")
            .and_then(|v| v.as_str())
            .map(String::from),
        credential: entry
            .get("credential")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}
