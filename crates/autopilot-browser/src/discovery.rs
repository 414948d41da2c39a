//! Debugging endpoint discovery.
//!
//! IDE instances launched with `--remote-debugging-port` each claim one port
//! out of a fixed range. Discovery probes the whole range with a short
//! per-port timeout; a port answering `/json/version` with a parseable
//! payload is a live endpoint.

use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, PageInfo};

/// Ports an IDE instance may be listening on.
pub const PORT_RANGE: RangeInclusive<u16> = 9000..=9030;

/// Per-port probe timeout. Probes hit localhost; anything slower than this
/// is not an endpoint.
const PROBE_TIMEOUT: Duration = Duration::from_millis(800);

/// A live debugging endpoint found during a sweep.
#[derive(Debug, Clone)]
pub struct DebugEndpoint {
    pub port: u16,
    pub version: BrowserVersion,
}

impl DebugEndpoint {
    pub fn http_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

fn probe_client() -> Result<reqwest::Client, CdpError> {
    reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(CdpError::from)
}

/// Probe one port. `None` means nothing CDP-shaped answered.
pub async fn probe_port(client: &reqwest::Client, port: u16) -> Option<BrowserVersion> {
    let url = format!("http://127.0.0.1:{}/json/version", port);
    let version = client
        .get(&url)
        .send()
        .await
        .ok()?
        .json::<BrowserVersion>()
        .await
        .ok()?;
    trace!(port, browser = %version.browser, "endpoint answered");
    Some(version)
}

/// Sweep the whole port range and return every live endpoint, lowest port
/// first.
pub async fn discover() -> Result<Vec<DebugEndpoint>, CdpError> {
    let client = probe_client()?;
    let probes = PORT_RANGE.map(|port| {
        let client = client.clone();
        async move {
            probe_port(&client, port)
                .await
                .map(|version| DebugEndpoint { port, version })
        }
    });

    let endpoints: Vec<DebugEndpoint> = futures::future::join_all(probes)
        .await
        .into_iter()
        .flatten()
        .collect();

    debug!("discovered {} debugging endpoint(s)", endpoints.len());
    Ok(endpoints)
}

/// Whether any IDE debugging endpoint is reachable at all.
pub async fn is_available() -> bool {
    discover().await.map(|e| !e.is_empty()).unwrap_or(false)
}

/// List the pages behind one endpoint without holding a client open.
pub async fn list_pages(port: u16) -> Result<Vec<PageInfo>, CdpError> {
    let client = probe_client()?;
    let url = format!("http://127.0.0.1:{}/json/list", port);
    let pages: Vec<PageInfo> = client.get(&url).send().await?.json().await?;
    Ok(pages)
}
