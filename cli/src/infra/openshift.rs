//! OpenShift broker REST client: implements the platform ports.
//!
//! Talks to `https://<server>/broker/rest` with HTTP basic auth. Every broker
//! reply is wrapped in the same envelope:
//!
//! ```json
//! { "status": "ok", "data": { ... }, "messages": [ { "text": "..." } ] }
//! ```
//!
//! Message texts are kept as creation logs and used in error messages.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ports::{PlatformConnector, PlatformSession};
use crate::domain::EnableCiError;
use crate::domain::platform::{
    Account, Application, Cartridge, Credentials, Domain, EmbeddableCartridge, EmbeddedCapability,
    RegisteredKey,
};
use crate::domain::ssh::SshPublicKey;

/// Per-request timeout for broker calls. Application creation is slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Delay between reachability attempts.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Per-attempt timeout for a reachability request.
const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the REST root for a broker host or URL.
#[must_use]
pub fn broker_base(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let root = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    };
    if root.ends_with("/broker/rest") {
        root
    } else {
        format!("{root}/broker/rest")
    }
}

/// Whether an HTTP status from an application URL means it is serving.
///
/// A 404 or any 5xx is what the platform's proxy answers while the gear is
/// still starting.
#[must_use]
pub fn is_reachable(status: StatusCode) -> bool {
    status != StatusCode::NOT_FOUND && !status.is_server_error()
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    text: Option<String>,
}

fn join_messages(messages: &[Message]) -> Option<String> {
    let texts: Vec<&str> = messages
        .iter()
        .filter_map(|m| m.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    (!texts.is_empty()).then(|| texts.join("\n"))
}

#[derive(Debug, Deserialize)]
struct UserData {
    login: String,
}

/// Older brokers name the domain `id`, newer ones send both.
#[derive(Debug, Deserialize)]
struct DomainData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl DomainData {
    fn into_domain(self) -> Option<Domain> {
        self.name.or(self.id).map(|name| Domain { name })
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationData {
    name: String,
    framework: String,
    #[serde(default)]
    git_url: String,
    #[serde(default)]
    app_url: String,
}

impl ApplicationData {
    fn into_application(self, creation_log: Option<String>) -> Application {
        Application {
            name: self.name,
            cartridge: Cartridge::from(self.framework),
            git_url: self.git_url,
            app_url: self.app_url,
            creation_log,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CartridgeData {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    properties: Vec<PropertyData>,
}

#[derive(Debug, Deserialize)]
struct PropertyData {
    name: String,
    #[serde(default)]
    value: Option<String>,
}

impl CartridgeData {
    fn into_capability(self, creation_log: Option<String>) -> EmbeddedCapability {
        let url = self.url.or_else(|| {
            self.properties
                .into_iter()
                .find(|p| p.name.ends_with("_url"))
                .and_then(|p| p.value)
        });
        EmbeddedCapability {
            cartridge: EmbeddableCartridge::from(self.name),
            url,
            creation_log,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeyData {
    name: String,
    #[serde(rename = "type")]
    key_type: String,
    content: String,
}

impl From<KeyData> for RegisteredKey {
    fn from(k: KeyData) -> Self {
        Self {
            name: k.name,
            key_type: k.key_type,
            content: k.content,
        }
    }
}

#[derive(Serialize)]
struct CreateDomain<'a> {
    id: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct CreateApplication<'a> {
    name: &'a str,
    cartridge: &'a str,
}

#[derive(Serialize)]
struct EmbedCartridge<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct AddKey<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    key_type: &'a str,
    content: &'a str,
}

/// Decoded `data` plus the joined message texts.
struct Reply<T> {
    data: T,
    log: Option<String>,
}

// ── Connector ────────────────────────────────────────────────────────────────

/// Opens [`BrokerSession`]s.
pub struct BrokerConnector;

impl PlatformConnector for BrokerConnector {
    type Session = BrokerSession;

    async fn connect(
        &self,
        client_id: &str,
        credentials: &Credentials,
        endpoint: &str,
    ) -> Result<BrokerSession> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .user_agent(client_id)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;

        let session = BrokerSession {
            http,
            base: broker_base(endpoint),
            credentials: credentials.clone(),
        };
        tracing::debug!(base = %session.base, "probing broker api");
        session
            .call::<serde_json::Value>(session.request(Method::GET, "/api"), "GET /api")
            .await?;
        Ok(session)
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

/// An authenticated broker session. Cheap to clone.
#[derive(Clone)]
pub struct BrokerSession {
    http: Client,
    base: String,
    credentials: Credentials,
}

impl BrokerSession {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base))
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Reply<T>> {
        self.call(self.request(Method::GET, path), &format!("GET {path}"))
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Reply<T>> {
        self.call(
            self.request(Method::POST, path).json(body),
            &format!("POST {path}"),
        )
        .await
    }

    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<Reply<T>> {
        tracing::debug!(request = what, "broker call");
        let response = req
            .send()
            .await
            .map_err(|e| EnableCiError::Upstream(format!("{what}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EnableCiError::Upstream(format!("{what}: reading response: {e}")))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(EnableCiError::Upstream(format!(
                "authentication failed for user {}",
                self.credentials.user
            ))
            .into());
        }
        if !status.is_success() {
            let detail = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| join_messages(&e.messages))
                .unwrap_or_else(|| body.trim().to_string());
            return Err(EnableCiError::Upstream(format!("{what} failed ({status}): {detail}")).into());
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| EnableCiError::Upstream(format!("{what}: unexpected response: {e}")))?;
        let log = join_messages(&envelope.messages);
        let data = envelope
            .data
            .ok_or_else(|| EnableCiError::Upstream(format!("{what}: response carried no data")))?;
        Ok(Reply { data, log })
    }
}

impl PlatformSession for BrokerSession {
    async fn current_user(&self) -> Result<Account> {
        let reply: Reply<UserData> = self.get("/user").await?;
        Ok(Account {
            login: reply.data.login,
        })
    }

    async fn default_domain(&self) -> Result<Option<Domain>> {
        let reply: Reply<Vec<DomainData>> = self.get("/domains").await?;
        Ok(reply.data.into_iter().find_map(DomainData::into_domain))
    }

    async fn create_domain(&self, name: &str) -> Result<Domain> {
        let reply: Reply<DomainData> = self
            .post("/domains", &CreateDomain { id: name, name })
            .await?;
        Ok(reply.data.into_domain().unwrap_or_else(|| Domain {
            name: name.to_string(),
        }))
    }

    async fn applications(&self, domain: &Domain) -> Result<Vec<Application>> {
        let reply: Reply<Vec<ApplicationData>> = self
            .get(&format!("/domain/{}/applications", domain.name))
            .await?;
        Ok(reply
            .data
            .into_iter()
            .map(|a| a.into_application(None))
            .collect())
    }

    async fn create_application(
        &self,
        domain: &Domain,
        name: &str,
        cartridge: &Cartridge,
    ) -> Result<Application> {
        let reply: Reply<ApplicationData> = self
            .post(
                &format!("/domain/{}/applications", domain.name),
                &CreateApplication {
                    name,
                    cartridge: cartridge.as_str(),
                },
            )
            .await?;
        Ok(reply.data.into_application(reply.log))
    }

    fn wait_until_reachable(
        &self,
        application: &Application,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool>> + Send {
        let http = self.http.clone();
        let url = application.app_url.clone();
        async move {
            if url.is_empty() {
                return Ok(false);
            }
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                match http.get(&url).timeout(PROBE_REQUEST_TIMEOUT).send().await {
                    Ok(resp) if is_reachable(resp.status()) => return Ok(true),
                    Ok(resp) => tracing::debug!(%url, status = %resp.status(), "not reachable yet"),
                    Err(e) => tracing::debug!(%url, error = %e, "not reachable yet"),
                }
                if tokio::time::Instant::now() + POLL_INTERVAL >= deadline {
                    return Ok(false);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }

    async fn embedded_capability(
        &self,
        domain: &Domain,
        application: &Application,
        cartridge: &EmbeddableCartridge,
    ) -> Result<Option<EmbeddedCapability>> {
        let reply: Reply<Vec<CartridgeData>> = self
            .get(&format!(
                "/domain/{}/application/{}/cartridges",
                domain.name, application.name
            ))
            .await?;
        Ok(reply
            .data
            .into_iter()
            .filter(|c| c.kind.as_deref().is_none_or(|k| k == "embedded"))
            .find(|c| c.name == cartridge.as_str())
            .map(|c| c.into_capability(None)))
    }

    async fn add_embedded_capability(
        &self,
        domain: &Domain,
        application: &Application,
        cartridge: &EmbeddableCartridge,
    ) -> Result<EmbeddedCapability> {
        let reply: Reply<CartridgeData> = self
            .post(
                &format!(
                    "/domain/{}/application/{}/cartridges",
                    domain.name, application.name
                ),
                &EmbedCartridge {
                    name: cartridge.as_str(),
                },
            )
            .await?;
        Ok(reply.data.into_capability(reply.log))
    }

    async fn ssh_keys(&self) -> Result<Vec<RegisteredKey>> {
        let reply: Reply<Vec<KeyData>> = self.get("/user/keys").await?;
        Ok(reply.data.into_iter().map(RegisteredKey::from).collect())
    }

    async fn add_ssh_key(&self, name: &str, key: &SshPublicKey) -> Result<RegisteredKey> {
        let reply: Reply<KeyData> = self
            .post(
                "/user/keys",
                &AddKey {
                    name,
                    key_type: &key.key_type,
                    content: &key.content,
                },
            )
            .await?;
        Ok(reply.data.into())
    }
}
