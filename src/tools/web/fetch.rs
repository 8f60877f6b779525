//! Page fetching with a private-network guard
//!
//! Fetches a URL and reduces the body to visible text. The whole fetch
//! (name resolution, redirects, body) runs under one deadline; exceeding it
//! yields [`FetchOutcome::TimedOut`] instead of an error.
//!
//! Unless private hosts are allowed, every address the client connects to is
//! checked: names go through [`GuardedResolver`], and IP-literal hosts are
//! checked on the first request and on every redirect hop.

use std::error::Error as StdError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use url::Host;

use super::extract::visible_text;
use crate::config::FetchConfig;
use crate::{Error, Result};

const MAX_REDIRECTS: usize = 10;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Predicate deciding which addresses are refused
type BlockList = fn(IpAddr) -> bool;

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Visible text of the page
    Text(String),
    /// The request exceeded the fetch timeout
    TimedOut,
}

/// Retrieves a page and returns its visible text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`
    ///
    /// # Errors
    ///
    /// Returns error on any non-timeout failure
    async fn fetch(&self, url: &str) -> Result<FetchOutcome>;
}

/// Refusal raised from inside the HTTP client
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Blocked(String);

/// DNS resolver that refuses names resolving to blocked addresses
///
/// Checking at connect time covers redirect targets and names that resolve
/// differently between requests.
struct GuardedResolver {
    blocked: BlockList,
}

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let blocked = self.blocked;
        Box::pin(async move {
            let host = name.as_str();
            let resolved: Vec<SocketAddr> = tokio::net::lookup_host((host, 0)).await?.collect();

            if let Some(addr) = resolved.iter().find(|addr| blocked(addr.ip())) {
                let refusal: BoxError = Box::new(Blocked(format!(
                    "{host} resolves to private/internal IP {}",
                    addr.ip()
                )));
                return Err(refusal);
            }

            let addrs: Addrs = Box::new(resolved.into_iter());
            Ok::<Addrs, BoxError>(addrs)
        })
    }
}

/// Reason to refuse `url` if its host is a blocked IP literal
fn literal_block(url: &Url, blocked: BlockList) -> Option<String> {
    let ip = match url.host()? {
        Host::Ipv4(ip) => IpAddr::V4(ip),
        Host::Ipv6(ip) => IpAddr::V6(ip),
        Host::Domain(_) => return None,
    };
    blocked(ip).then(|| format!("{ip} is a private/internal address"))
}

/// Follow up to [`MAX_REDIRECTS`] hops, refusing blocked IP-literal targets
fn guarded_redirects(blocked: BlockList) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match literal_block(attempt.url(), blocked) {
            Some(reason) => attempt.error(Blocked(reason)),
            None => attempt.follow(),
        }
    })
}

/// Find a guard refusal in a client error's source chain
fn blocked_cause(err: &reqwest::Error) -> Option<&Blocked> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(blocked) = cause.downcast_ref::<Blocked>() {
            return Some(blocked);
        }
        source = cause.source();
    }
    None
}

fn request_error(err: &reqwest::Error) -> Error {
    blocked_cause(err).map_or_else(
        || Error::WebFetch(format!("Request failed: {err}")),
        |blocked| Error::WebFetch(format!("Blocked: {blocked}")),
    )
}

/// HTTP page fetcher
pub struct WebFetcher {
    client: Client,
    timeout: Duration,
    blocked: Option<BlockList>,
}

impl WebFetcher {
    /// Create a fetcher from fetch configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let blocked = (!config.allow_private_hosts).then_some(is_blocked_ip as BlockList);
        Self::with_blocklist(config, blocked)
    }

    fn with_blocklist(config: &FetchConfig, blocked: Option<BlockList>) -> Result<Self> {
        let builder = Client::builder().user_agent(config.user_agent.as_str());
        let builder = match blocked {
            Some(blocked) => builder
                .dns_resolver(Arc::new(GuardedResolver { blocked }))
                .redirect(guarded_redirects(blocked)),
            None => builder.redirect(Policy::limited(MAX_REDIRECTS)),
        };
        let client = builder.build().map_err(Error::Http)?;

        Ok(Self {
            client,
            timeout: config.timeout,
            blocked,
        })
    }

    async fn fetch_html(&self, url: &str, parsed: Url) -> Result<String> {
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, %status, "page returned non-success status");
        }

        response.text().await.map_err(|e| request_error(&e))
    }
}

#[async_trait]
impl PageFetcher for WebFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        let parsed = Url::parse(url).map_err(|e| Error::WebFetch(format!("Invalid URL: {e}")))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::WebFetch(format!(
                "Invalid scheme: {scheme}. Only http and https are allowed"
            )));
        }

        if let Some(blocked) = self.blocked {
            if parsed.host().is_none() {
                return Err(Error::WebFetch("URL has no host".to_string()));
            }
            if let Some(reason) = literal_block(&parsed, blocked) {
                return Err(Error::WebFetch(format!("Blocked: {reason}")));
            }
        }

        match tokio::time::timeout(self.timeout, self.fetch_html(url, parsed)).await {
            Ok(html) => {
                let text = visible_text(&html?);
                tracing::debug!(url, chars = text.len(), "fetched page");
                Ok(FetchOutcome::Text(text))
            }
            Err(_) => {
                tracing::warn!(url, timeout = ?self.timeout, "page fetch timed out");
                Ok(FetchOutcome::TimedOut)
            }
        }
    }
}

/// Whether an address is internal: loopback, private, link-local, shared,
/// multicast, reserved or unspecified
#[must_use]
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_blocked_ipv4(ipv4),
        IpAddr::V6(ipv6) => is_blocked_ipv6(ipv6),
    }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    // 0.0.0.0/8 is "this network"
    a == 0
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        // 100.64.0.0/10 shared address space
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        || ip.is_multicast()
        // 240.0.0.0/4 reserved, includes broadcast
        || a >= 240
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(embedded) = embedded_ipv4(ip) {
        return is_blocked_ipv4(embedded);
    }
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_unique_local()
        || ip.is_unicast_link_local()
        || ip.is_multicast()
}

/// IPv4 address carried inside an IPv6 one (mapped, compatible, NAT64, 6to4)
fn embedded_ipv4(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    let o = ip.octets();
    match ip.segments() {
        [0x64, 0xff9b, 0, 0, 0, 0, _, _] => Some(Ipv4Addr::new(o[12], o[13], o[14], o[15])),
        [0x2002, ..] => Some(Ipv4Addr::new(o[2], o[3], o[4], o[5])),
        _ => ip.to_ipv4(),
    }
}
