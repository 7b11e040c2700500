//! `chromiumoxide` adapter for the page traits

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use log::{debug, trace};

use super::{ElementHandle, ObservedResponse, PageHandle};
use crate::crawl_engine::navigation::{NavigablePage, NavigationError, WaitStrategy};
use crate::network_observer::NetworkObserver;

/// Resource count must stay unchanged this long to count as idle
const IDLE_QUIET_PERIOD: Duration = Duration::from_millis(500);
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

const NETWORK_ACTIVITY_SCRIPT: &str = r"
    (() => ({
        readyState: document.readyState,
        resources: performance.getEntriesByType('resource').length
    }))()
";

const READY_STATE_SCRIPT: &str = "document.readyState";

const TAG_NAME_FN: &str = "function() { return this.tagName; }";

/// A live Chromium tab
#[derive(Clone)]
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn ready_state(&self) -> Result<String> {
        self.page
            .evaluate(READY_STATE_SCRIPT)
            .await
            .context("Failed to read document.readyState")?
            .into_value::<String>()
            .map_err(|e| anyhow!("readyState was not a string: {e}"))
    }

    /// Issue `Page.navigate`; CDP answers once the navigation has committed
    async fn commit_navigation(&self, url: &str) -> Result<()> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .context("Page.navigate failed")?;

        if let Some(error_text) = &response.result.error_text {
            return Err(anyhow!("Navigation to {url} failed: {error_text}"));
        }
        Ok(())
    }
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .with_context(|| format!("Failed to query selector '{selector}'"))?;

        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement(element)) as Box<dyn ElementHandle>)
            .collect())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let mut last_count: Option<u64> = None;
        let mut quiet_since = Instant::now();

        loop {
            if start.elapsed() >= timeout {
                return Err(anyhow!(
                    "Network did not become idle within {:.1}s",
                    timeout.as_secs_f64()
                ));
            }

            match self.page.evaluate(NETWORK_ACTIVITY_SCRIPT).await {
                Ok(result) => {
                    if let Ok(value) = result.into_value::<serde_json::Value>() {
                        let complete = value.get("readyState").and_then(|v| v.as_str())
                            == Some("complete");
                        let count = value.get("resources").and_then(|v| v.as_u64());

                        if count != last_count {
                            last_count = count;
                            quiet_since = Instant::now();
                        } else if complete && quiet_since.elapsed() >= IDLE_QUIET_PERIOD {
                            debug!(
                                "Network idle after {:.2}s ({} resources)",
                                start.elapsed().as_secs_f64(),
                                count.unwrap_or_default()
                            );
                            return Ok(());
                        }
                    }
                }
                Err(e) => trace!("Network activity probe failed: {e}"),
            }

            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl NavigablePage for ChromiumPage {
    async fn navigate(&self, url: &str, strategy: WaitStrategy) -> Result<(), NavigationError> {
        match strategy {
            WaitStrategy::Load => {
                self.page
                    .goto(url)
                    .await
                    .map_err(|e| NavigationError::Failed(e.to_string()))?;
                self.page
                    .wait_for_navigation()
                    .await
                    .map_err(|e| NavigationError::Failed(e.to_string()))?;
            }
            WaitStrategy::DomContentLoaded => {
                self.commit_navigation(url)
                    .await
                    .map_err(|e| NavigationError::Failed(format!("{e:#}")))?;
                loop {
                    // Probes fail while the old execution context is torn down
                    if let Ok(state) = self.ready_state().await
                        && (state == "interactive" || state == "complete")
                    {
                        break;
                    }
                    tokio::time::sleep(IDLE_POLL_INTERVAL).await;
                }
            }
            WaitStrategy::Commit => {
                self.commit_navigation(url)
                    .await
                    .map_err(|e| NavigationError::Failed(format!("{e:#}")))?;
            }
        }
        Ok(())
    }
}

struct ChromiumElement(Element);

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.0
            .attribute(name)
            .await
            .with_context(|| format!("Failed to read attribute '{name}'"))
    }

    async fn tag_name(&self) -> Result<String> {
        let returns = self
            .0
            .call_js_fn(TAG_NAME_FN, false)
            .await
            .context("Failed to read tagName")?;

        returns
            .result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_ascii_uppercase)
            .ok_or_else(|| anyhow!("tagName was not a string"))
    }

    async fn inner_text(&self) -> Result<Option<String>> {
        self.0.inner_text().await.context("Failed to read innerText")
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        let elements = self
            .0
            .find_elements(selector)
            .await
            .with_context(|| format!("Failed to query child selector '{selector}'"))?;

        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement(element)) as Box<dyn ElementHandle>)
            .collect())
    }
}

/// Forward every `Network.responseReceived` event of `page` into `observer`
///
/// Must be called before navigation so the page's own image requests are
/// seen. The returned task ends when the page closes; abort it to stop early.
pub async fn attach_network_observer(
    page: &Page,
    observer: Arc<NetworkObserver>,
) -> Result<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventResponseReceived>()
        .await
        .context("Failed to subscribe to network responses")?;

    let handle = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let response = &event.response;
            let content_type = header_value(response.headers.inner(), "content-type")
                .unwrap_or_else(|| response.mime_type.clone());

            observer.observe(&ObservedResponse {
                url: response.url.clone(),
                content_type,
                status: u16::try_from(response.status).unwrap_or_default(),
            });
        }
        debug!("Network response stream closed");
    });

    debug!("Network response interceptor registered");
    Ok(handle)
}

/// Case-insensitive header lookup in a CDP `Headers` JSON object
fn header_value(headers: &serde_json::Value, name: &str) -> Option<String> {
    headers
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
        .map(str::to_string)
}
