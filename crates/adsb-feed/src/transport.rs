use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::ACCEPT;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::FetchError;

const USER_AGENT: &str = concat!("adsb-display/", env!("CARGO_PKG_VERSION"));
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The only way the feed clients reach the network.
///
/// `get` resolves to the body of a successful response. `link_up` reports
/// whether the last attempt found a network path at all; `reconnect` tries
/// to re-establish one.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    fn link_up(&self) -> bool;

    fn reconnect(&self) -> impl Future<Output = Result<(), FetchError>> + Send;
}

/// reqwest-backed transport. Reconnect is a TCP probe against the feed host;
/// reqwest re-dials pooled connections on its own once the path is back.
pub struct HttpTransport {
    http: reqwest::Client,
    probe_addr: String,
    link_ok: AtomicBool,
}

impl HttpTransport {
    pub fn new(probe_url: &str, timeout: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(probe_url).with_context(|| format!("parse url {}", probe_url))?;
        let host = url.host_str().context("feed url has no host")?;
        let port = url.port_or_known_default().context("feed url has no port")?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            probe_addr: format!("{}:{}", host, port),
            link_ok: AtomicBool::new(true),
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("http: GET {}", url);
        let resp = match self.http.get(url).header(ACCEPT, "application/json").send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    self.link_ok.store(false, Ordering::Relaxed);
                }
                return Err(FetchError::Link(e.to_string()));
            }
        };
        self.link_ok.store(true, Ordering::Relaxed);

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Transport { status: status.as_u16() });
        }

        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Link(format!("read body: {}", e)))
    }

    fn link_up(&self) -> bool {
        self.link_ok.load(Ordering::Relaxed)
    }

    async fn reconnect(&self) -> Result<(), FetchError> {
        match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(&self.probe_addr)).await {
            Ok(Ok(_)) => {
                self.link_ok.store(true, Ordering::Relaxed);
                info!("http: link to {} restored", self.probe_addr);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("http: probe {} failed: {}", self.probe_addr, e);
                Err(FetchError::Link(e.to_string()))
            }
            Err(_) => {
                warn!("http: probe {} timed out", self.probe_addr);
                Err(FetchError::Link("probe timed out".into()))
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Body(Vec<u8>),
    Fail(FetchError),
}

#[derive(Debug)]
struct Route {
    prefix: String,
    replies: VecDeque<Reply>,
}

/// Canned-response transport. Replies are queued per URL prefix and served in
/// order; the last reply of a route repeats forever. Used for offline replay
/// of recorded payloads and for driving the station deterministically.
#[derive(Debug)]
pub struct ReplayTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
    link_ok: AtomicBool,
    reconnect_ok: AtomicBool,
}

impl Default for ReplayTransport {
    fn default() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            link_ok: AtomicBool::new(true),
            reconnect_ok: AtomicBool::new(true),
        }
    }
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_body(&self, prefix: &str, body: impl Into<Vec<u8>>) {
        self.push(prefix, Reply::Body(body.into()));
    }

    pub fn push_error(&self, prefix: &str, err: FetchError) {
        self.push(prefix, Reply::Fail(err));
    }

    /// Simulates losing (or regaining) the network path.
    pub fn set_link(&self, up: bool) {
        self.link_ok.store(up, Ordering::Relaxed);
    }

    pub fn set_reconnect_ok(&self, ok: bool) {
        self.reconnect_ok.store(ok, Ordering::Relaxed);
    }

    /// URLs requested so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, prefix: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes.iter_mut().find(|r| r.prefix == prefix) {
            Some(r) => r.replies.push_back(reply),
            None => routes.push(Route { prefix: prefix.to_string(), replies: VecDeque::from([reply]) }),
        }
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let route = routes
            .iter_mut()
            .filter(|r| url.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len())?;
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

impl Transport for ReplayTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(url.to_string());
        if !self.link_up() {
            return Err(FetchError::Link("replay link down".into()));
        }
        match self.next_reply(url) {
            Some(Reply::Body(b)) => Ok(b),
            Some(Reply::Fail(e)) => Err(e),
            None => Err(FetchError::Transport { status: 404 }),
        }
    }

    fn link_up(&self) -> bool {
        self.link_ok.load(Ordering::Relaxed)
    }

    async fn reconnect(&self) -> Result<(), FetchError> {
        if self.reconnect_ok.load(Ordering::Relaxed) {
            self.link_ok.store(true, Ordering::Relaxed);
            Ok(())
        } else {
            Err(FetchError::Link("replay reconnect refused".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_serves_queue_then_repeats_last() {
        let t = ReplayTransport::new();
        t.push_body("http://feed", "one");
        t.push_body("http://feed", "two");

        assert_eq!(t.get("http://feed/1/2/3").await.unwrap(), b"one");
        assert_eq!(t.get("http://feed/1/2/3").await.unwrap(), b"two");
        assert_eq!(t.get("http://feed/1/2/3").await.unwrap(), b"two");
        assert_eq!(t.requests().len(), 3);
    }

    #[tokio::test]
    async fn replay_picks_longest_prefix() {
        let t = ReplayTransport::new();
        t.push_body("http://host", "short");
        t.push_body("http://host/weather", "long");

        assert_eq!(t.get("http://host/weather?lat=1").await.unwrap(), b"long");
        assert_eq!(t.get("http://host/v2/point").await.unwrap(), b"short");
        assert_eq!(t.get("http://other/").await, Err(FetchError::Transport { status: 404 }));
    }

    #[tokio::test]
    async fn replay_link_down_until_reconnect() {
        let t = ReplayTransport::new();
        t.push_body("http://feed", "ok");
        t.set_link(false);
        assert!(matches!(t.get("http://feed").await, Err(FetchError::Link(_))));

        t.set_reconnect_ok(false);
        assert!(t.reconnect().await.is_err());
        assert!(!t.link_up());

        t.set_reconnect_ok(true);
        t.reconnect().await.unwrap();
        assert!(t.link_up());
        assert_eq!(t.get("http://feed").await.unwrap(), b"ok");
    }

    #[test]
    fn http_transport_derives_probe_address() {
        let t = HttpTransport::new("https://api.adsb.lol/v2/point", Duration::from_secs(5)).unwrap();
        assert_eq!(t.probe_addr, "api.adsb.lol:443");
        assert!(t.link_up());
        assert!(HttpTransport::new("not a url", Duration::from_secs(5)).is_err());
    }
}
