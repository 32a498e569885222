//! Page-fetching sessions
//!
//! This module handles everything about talking to the gallery as a visitor:
//! - Acquiring a fresh session (new cookie jar, random user agent, warm-up visit)
//! - Loading pages and submitting the search form
//! - Decoding GBK and other legacy charsets
//! - Guaranteed release through `SessionGuard`
//!
//! The coordinator only ever holds one session at a time.

use crate::config::Config;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Hands out page-fetching sessions
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Session: Session;

    /// Opens a new session, ready to load listing pages
    async fn acquire(&self) -> Result<Self::Session>;
}

/// A live visitor session against the gallery
#[async_trait]
pub trait Session: Send {
    /// Loads a page and returns its HTML
    async fn fetch(&mut self, url: &Url) -> Result<String>;

    /// Posts an already-encoded form body and returns the resulting HTML
    async fn post_form(&mut self, url: &Url, body: &str) -> Result<String>;

    /// URL of the last loaded page, after redirects
    fn current_url(&self) -> Option<&Url>;

    /// Cookie header the session would send to `url`
    fn cookie_header(&self, url: &Url) -> Option<String>;

    /// User agent the session presents
    fn user_agent(&self) -> &str;

    /// Tears the session down; later calls fail with a session error
    fn release(&mut self);
}

/// Owns a session and releases it exactly once
///
/// Release happens on `release()`, on drop after an early return, and when
/// the future holding the guard is dropped by an interrupt.
pub struct SessionGuard<S: Session> {
    session: Option<S>,
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Releases the session now instead of at drop
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }
}

impl<S: Session> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        // only `release`/`drop` take the session, and both consume the guard
        self.session
            .as_ref()
            .expect("SessionGuard: session already released")
    }
}

impl<S: Session> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.session
            .as_mut()
            .expect("SessionGuard: session already released")
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Session factory backed by `reqwest` with per-session cookie jars
pub struct HttpPageFetcher {
    base_url: Url,
    user_agents: Vec<String>,
    timeout: Duration,
    warmup: crate::config::DelayRange,
    next_id: AtomicU64,
}

impl HttpPageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(&config.site.base_url)?,
            user_agents: config.http.user_agents.clone(),
            timeout: Duration::from_secs(config.http.page_timeout_secs),
            warmup: config.delays.warmup,
            next_id: AtomicU64::new(1),
        })
    }

    fn pick_user_agent(&self) -> String {
        if self.user_agents.is_empty() {
            return format!("wallpaper-harvest/{}", env!("CARGO_PKG_VERSION"));
        }
        self.user_agents[fastrand::usize(..self.user_agents.len())].clone()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    type Session = HttpSession;

    async fn acquire(&self) -> Result<HttpSession> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user_agent = self.pick_user_agent();
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .user_agent(user_agent.clone())
            .cookie_provider(jar.clone())
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| CrawlError::session(&self.base_url, e))?;

        let mut session = HttpSession {
            id,
            client: Some(client),
            jar,
            user_agent,
            current_url: None,
        };

        tracing::debug!("Session {} warming up at {}", id, self.base_url);
        session.fetch(&self.base_url).await?;
        let wait = self.warmup.sample();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        tracing::debug!("Session {} ready", id);
        Ok(session)
    }
}

/// One visitor session: a client, its cookies, and where it is
pub struct HttpSession {
    id: u64,
    client: Option<Client>,
    jar: Arc<Jar>,
    user_agent: String,
    current_url: Option<Url>,
}

impl HttpSession {
    fn client(&self, url: &Url) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| CrawlError::session(url, "session already released"))
    }

    async fn read_page(&mut self, url: &Url, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(CrawlError::session(url, format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CrawlError::session(url, e))?;

        self.current_url = Some(final_url);
        Ok(decode_body(&bytes, &content_type))
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn fetch(&mut self, url: &Url) -> Result<String> {
        tracing::trace!("Session {} GET {}", self.id, url);
        let response = self
            .client(url)?
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CrawlError::session(url, classify_request_error(&e)))?;
        self.read_page(url, response).await
    }

    async fn post_form(&mut self, url: &Url, body: &str) -> Result<String> {
        tracing::trace!("Session {} POST {}", self.id, url);
        let mut request = self
            .client(url)?
            .post(url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.to_string());
        if let Some(current) = &self.current_url {
            request = request.header(reqwest::header::REFERER, current.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| CrawlError::session(url, classify_request_error(&e)))?;
        self.read_page(url, response).await
    }

    fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }

    fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!("Session {} released", self.id);
        }
        self.current_url = None;
    }
}

/// Describes a request failure the way it shows up in logs
pub(crate) fn classify_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}

/// Decodes a page body using the charset from the header or the markup
///
/// Falls back to UTF-8 when neither names a known encoding.
pub fn decode_body(bytes: &[u8], content_type: &str) -> String {
    let encoding = charset_label(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(2048)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    Encoding::for_label(label.as_bytes())
}
