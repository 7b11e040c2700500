//! In-memory page and transport fakes shared by the integration tests

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::StreamExt;
use kodegen_tools_imagescrape::crawl_engine::{NavigablePage, NavigationError, WaitStrategy};
use kodegen_tools_imagescrape::image_downloader::{DownloadError, ImageTransport, TransportResponse};
use kodegen_tools_imagescrape::image_extractor::{BACKGROUND_SELECTOR, IMG_SELECTOR};
use kodegen_tools_imagescrape::{ElementHandle, PageHandle, ScrapeConfig};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Creates a temporary directory for test output
pub fn create_test_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Config with every wait shortened so pipeline tests run instantly
pub fn fast_config(output_dir: &Path, url: &str) -> ScrapeConfig {
    ScrapeConfig::builder()
        .output_dir(output_dir)
        .start_url(url)
        .network_idle_timeout(Duration::from_millis(10))
        .lazy_load_grace(Duration::ZERO)
        .device_picker_wait(Duration::ZERO)
        .download_backoff_base(Duration::from_millis(1))
        .download_timeout(Duration::from_secs(5))
        .build()
        .expect("test config is valid")
}

// ---------------------------------------------------------------------------
// Page fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: Option<String>,
    pub children: HashMap<String, Vec<FakeElement>>,
    /// Every attribute read fails
    pub broken: bool,
}

impl FakeElement {
    pub fn new(tag: &str, attributes: &[(&str, &str)]) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn img(attributes: &[(&str, &str)]) -> Self {
        Self::new("img", attributes)
    }

    pub fn styled(style: &str) -> Self {
        Self::new("div", &[("style", style)])
    }

    pub fn option(value: &str, text: &str) -> Self {
        let mut option = Self::new("option", &[("value", value)]);
        option.text = Some(text.to_string());
        option
    }

    pub fn select(attributes: &[(&str, &str)], options: Vec<FakeElement>) -> Self {
        let mut select = Self::new("select", attributes);
        select.children.insert("option".to_string(), options);
        select
    }

    pub fn broken() -> Self {
        Self {
            tag: "IMG".to_string(),
            broken: true,
            ..Self::default()
        }
    }
}

fn boxed(elements: &[FakeElement]) -> Vec<Box<dyn ElementHandle>> {
    elements
        .iter()
        .cloned()
        .map(|e| Box::new(e) as Box<dyn ElementHandle>)
        .collect()
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        if self.broken {
            return Err(anyhow!("element detached"));
        }
        Ok(self.attributes.get(name).cloned())
    }

    async fn tag_name(&self) -> Result<String> {
        Ok(self.tag.clone())
    }

    async fn inner_text(&self) -> Result<Option<String>> {
        Ok(self.text.clone())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        Ok(self.children.get(selector).map(|c| boxed(c)).unwrap_or_default())
    }
}

/// Selector → elements map; unknown selectors match nothing
#[derive(Debug, Default)]
pub struct FakePage {
    elements: HashMap<String, Vec<FakeElement>>,
    failing: HashSet<String>,
    pub idle_waits: AtomicUsize,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.elements.entry(selector.to_string()).or_default().extend(elements);
        self
    }

    pub fn with_images(self, images: Vec<FakeElement>) -> Self {
        self.with(IMG_SELECTOR, images)
    }

    pub fn with_backgrounds(self, styled: Vec<FakeElement>) -> Self {
        self.with(BACKGROUND_SELECTOR, styled)
    }

    /// Queries for `selector` fail outright
    pub fn failing_on(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        if self.failing.contains(selector) {
            return Err(anyhow!("execution context destroyed"));
        }
        Ok(self.elements.get(selector).map(|e| boxed(e)).unwrap_or_default())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<()> {
        self.idle_waits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted reaction of `FakeNavigator` to one navigation call
#[derive(Debug, Clone, Copy)]
pub enum NavStep {
    Succeed,
    Fail,
    /// Never completes; the caller's timeout must fire
    Hang,
}

/// Records navigation calls and replays `NavStep`s (then fails)
#[derive(Debug, Default)]
pub struct FakeNavigator {
    script: Mutex<VecDeque<NavStep>>,
    pub calls: Mutex<Vec<WaitStrategy>>,
}

impl FakeNavigator {
    pub fn new(steps: &[NavStep]) -> Self {
        Self {
            script: Mutex::new(steps.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<WaitStrategy> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NavigablePage for FakeNavigator {
    async fn navigate(&self, _url: &str, strategy: WaitStrategy) -> Result<(), NavigationError> {
        self.calls.lock().push(strategy);
        let step = self.script.lock().pop_front().unwrap_or(NavStep::Fail);
        match step {
            NavStep::Succeed => Ok(()),
            NavStep::Fail => Err(NavigationError::Failed("net::ERR_CONNECTION_RESET".into())),
            NavStep::Hang => {
                futures::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PageHandle for FakeNavigator {
    async fn query_all(&self, _selector: &str) -> Result<Vec<Box<dyn ElementHandle>>> {
        Ok(Vec::new())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<()> {
        Err(anyhow!("network never went idle"))
    }
}

// ---------------------------------------------------------------------------
// Transport fake
// ---------------------------------------------------------------------------

/// Scripted reaction of `FakeTransport` to one request
#[derive(Debug, Clone)]
pub enum Reply {
    Ok { content_type: &'static str, body: Vec<u8> },
    Status(u16),
    TransportError,
    Hang,
}

impl Reply {
    pub fn jpeg(body: &[u8]) -> Self {
        Self::Ok {
            content_type: "image/jpeg",
            body: body.to_vec(),
        }
    }
}

/// Decrements the in-flight count when the request (and its body) is dropped
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>, high_water: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        high_water.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Per-URL scripted replies with in-flight instrumentation
///
/// URLs without a script (or whose script ran out) get `fallback`. A request
/// counts as in flight until its body stream has been dropped, and `latency`
/// applies both before the headers and before the body.
#[derive(Debug)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Reply,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: AtomicUsize,
    pub requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new(fallback: Reply) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            latency: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn script(self, url: &str, replies: Vec<Reply>) -> Self {
        self.scripts.lock().insert(url.to_string(), replies.into());
        self
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| u.as_str() == url).count()
    }

    fn next_reply(&self, url: &str) -> Reply {
        self.scripts
            .lock()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl ImageTransport for FakeTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, DownloadError> {
        self.requests.lock().push(url.to_string());
        let guard = InFlightGuard::enter(&self.in_flight, &self.max_in_flight);

        let latency = self.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.next_reply(url) {
            Reply::Ok { content_type, body } => Ok(TransportResponse {
                status: 200,
                content_type: content_type.to_string(),
                body: futures::stream::once(async move {
                    if !latency.is_zero() {
                        tokio::time::sleep(latency).await;
                    }
                    drop(guard);
                    Ok::<_, DownloadError>(body)
                })
                .boxed(),
            }),
            Reply::Status(status) => Ok(TransportResponse {
                status,
                content_type: String::new(),
                body: futures::stream::empty().boxed(),
            }),
            Reply::TransportError => Err(DownloadError::Transport("connection reset".into())),
            Reply::Hang => {
                futures::future::pending::<()>().await;
                Err(DownloadError::Transport("unreachable".into()))
            }
        }
    }
}
