//! EXIF orientation lookup for displayed images.
//!
//! Photos taken on phones are often stored sideways with an EXIF tag saying
//! how to rotate them. [`OrientationResolver`] reads that tag once per URL
//! and remembers the answer in an [`OrientationCache`]; pages turn the code
//! into a CSS transform with [`Orientation::css_transform`].
//!
//! Lookups never fail. Anything that goes wrong (network, undecodable image,
//! no EXIF block) yields [`Orientation::Normal`], and that fallback is cached
//! like any other answer.
//!
//! Only images on the site's own origin or an allowed image host are ever
//! fetched. Other URLs report [`Orientation::Normal`] without I/O and are
//! not cached.

use std::future::Future;
use std::io::Cursor;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use image::{ImageDecoder, ImageReader};
use moka::future::Cache;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::{Host, Url};

pub use parti_poodles_core::Orientation;

/// Errors reading image metadata. Never surfaced past the resolver.
#[derive(Debug, Error)]
pub enum OrientationError {
    /// Fetching the image failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The image server answered with an error status.
    #[error("image fetch returned status {0}")]
    Status(u16),

    /// The bytes are not a decodable image.
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Reading the image bytes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Skip rules
// =============================================================================

/// Which URLs are never inspected, and which may be fetched.
///
/// Inline `data:` images and `blob:` references cannot be fetched by the
/// server. Images from normalized origins, or carrying a processed marker in
/// their query string, have already been rotated and had EXIF stripped.
///
/// A policy without a fetch scope fetches nothing.
#[derive(Debug, Clone, Default)]
pub struct OrientationPolicy {
    normalized_origins: Vec<String>,
    processed_markers: Vec<String>,
    site: Option<Url>,
    image_hosts: Vec<String>,
}

impl OrientationPolicy {
    /// Create a policy from host names and query-string markers.
    #[must_use]
    pub fn new(
        normalized_origins: impl IntoIterator<Item = String>,
        processed_markers: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            normalized_origins: normalized_origins
                .into_iter()
                .map(|host| host.trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
            processed_markers: processed_markers
                .into_iter()
                .map(|marker| marker.trim().to_string())
                .filter(|marker| !marker.is_empty())
                .collect(),
            site: None,
            image_hosts: Vec::new(),
        }
    }

    /// Allow fetching from the site's own origin and from `image_hosts`.
    ///
    /// Relative URLs resolve against `site`.
    #[must_use]
    pub fn with_fetch_scope(
        mut self,
        site: Url,
        image_hosts: impl IntoIterator<Item = String>,
    ) -> Self {
        self.site = Some(site);
        self.image_hosts = image_hosts
            .into_iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();
        self
    }

    /// The absolute URL to fetch for `url`, or `None` if it is off limits.
    ///
    /// Only `http` and `https` are fetched. Off-origin hosts must be listed,
    /// and loopback, private and link-local addresses never are.
    #[must_use]
    pub fn fetch_target(&self, url: &str) -> Option<Url> {
        let site = self.site.as_ref()?;
        let target = site.join(url.trim()).ok()?;
        if !matches!(target.scheme(), "http" | "https") {
            return None;
        }
        if target.origin() == site.origin() {
            return Some(target);
        }

        let host = target.host()?;
        let listed = target
            .host_str()
            .is_some_and(|name| self.image_hosts.iter().any(|h| h.eq_ignore_ascii_case(name)));
        (listed && !is_internal(&host)).then_some(target)
    }

    /// Whether `url` should be reported as [`Orientation::Normal`] without
    /// any I/O.
    #[must_use]
    pub fn should_skip(&self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || url.starts_with("data:") || url.contains("blob:") {
            return true;
        }

        if let Some((_, query)) = url.split_once('?') {
            if self
                .processed_markers
                .iter()
                .any(|marker| query.contains(marker.as_str()))
            {
                return true;
            }
        }

        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
            .is_some_and(|host| self.normalized_origins.iter().any(|origin| *origin == host))
    }
}

fn is_internal(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_internal_v4(*ip),
        Host::Ipv6(ip) => {
            let [first, ..] = ip.segments();
            ip.is_loopback()
                || ip.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || ip.to_ipv4_mapped().is_some_and(is_internal_v4)
        }
    }
}

const fn is_internal_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
}

// =============================================================================
// Cache
// =============================================================================

/// Resolved orientations by URL. Bounded; clones share storage.
#[derive(Clone)]
pub struct OrientationCache {
    entries: Cache<String, Orientation>,
}

impl OrientationCache {
    /// Create a cache holding at most `capacity` URLs.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Cached orientation for `url`.
    pub async fn get(&self, url: &str) -> Option<Orientation> {
        self.entries.get(url).await
    }

    /// Remember the orientation for `url`.
    pub async fn insert(&self, url: &str, orientation: Orientation) {
        self.entries.insert(url.to_string(), orientation).await;
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl std::fmt::Debug for OrientationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrientationCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

// =============================================================================
// Metadata sources
// =============================================================================

/// Reads the raw EXIF orientation code of an image.
pub trait MetadataSource: Send + Sync {
    /// The orientation code (1-8) or `None` if the image has no such tag.
    fn read_orientation(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<Option<u8>, OrientationError>> + Send;
}

/// Bytes read from the start of an image. The EXIF block sits in the
/// first segment of a JPEG.
pub const MAX_IMAGE_PREFIX: usize = 64 * 1024;

/// Fetches the start of an image over HTTP and decodes its EXIF block.
///
/// Redirects are not followed, so a fetch stays on the host the policy
/// approved.
#[derive(Debug, Clone)]
pub struct HttpExifSource {
    client: reqwest::Client,
}

impl HttpExifSource {
    /// Create a source.
    ///
    /// # Errors
    ///
    /// Returns `OrientationError` if the HTTP client fails to build.
    pub fn new() -> Result<Self, OrientationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

/// Orientation code of an encoded image.
///
/// # Errors
///
/// Returns `OrientationError::Decode` if the format is unknown or the header
/// is corrupt.
pub fn orientation_of(bytes: &[u8]) -> Result<u8, OrientationError> {
    use image::metadata::Orientation as Exif;

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let code = match decoder.orientation()? {
        Exif::NoTransforms => 1,
        Exif::FlipHorizontal => 2,
        Exif::Rotate180 => 3,
        Exif::FlipVertical => 4,
        Exif::Rotate90FlipH => 5,
        Exif::Rotate90 => 6,
        Exif::Rotate270FlipH => 7,
        Exif::Rotate270 => 8,
    };
    Ok(code)
}

impl MetadataSource for HttpExifSource {
    async fn read_orientation(&self, url: &Url) -> Result<Option<u8>, OrientationError> {
        let mut response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::RANGE,
                format!("bytes=0-{}", MAX_IMAGE_PREFIX - 1),
            )
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OrientationError::Status(status.as_u16()));
        }

        let mut bytes = Vec::with_capacity(MAX_IMAGE_PREFIX);
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_IMAGE_PREFIX - bytes.len();
            bytes.extend(chunk.iter().take(room));
            if bytes.len() >= MAX_IMAGE_PREFIX {
                break;
            }
        }
        orientation_of(&bytes).map(Some)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Skip rules, cache and metadata source put together.
#[derive(Debug)]
pub struct OrientationResolver<M> {
    source: M,
    cache: OrientationCache,
    policy: OrientationPolicy,
}

impl<M: MetadataSource> OrientationResolver<M> {
    /// Create a resolver.
    #[must_use]
    pub const fn new(source: M, cache: OrientationCache, policy: OrientationPolicy) -> Self {
        Self {
            source,
            cache,
            policy,
        }
    }

    /// The resolver's cache.
    #[must_use]
    pub const fn cache(&self) -> &OrientationCache {
        &self.cache
    }

    /// Orientation of the image at `url`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, url: &str) -> Orientation {
        if self.policy.should_skip(url) {
            return Orientation::Normal;
        }
        let Some(target) = self.policy.fetch_target(url) else {
            tracing::debug!("Image outside the fetch scope");
            return Orientation::Normal;
        };
        if let Some(cached) = self.cache.get(url).await {
            return cached;
        }

        let orientation = match self.source.read_orientation(&target).await {
            Ok(code) => code
                .and_then(|c| Orientation::from_code(i64::from(c)))
                .unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "Image orientation unavailable");
                Orientation::Normal
            }
        };
        self.cache.insert(url, orientation).await;
        orientation
    }
}

// =============================================================================
// Cancellable lookups
// =============================================================================

/// One image view's in-flight orientation lookup.
///
/// The current value starts at [`Orientation::Normal`] and is replaced once
/// the lookup finishes. Cancelling or dropping the task discards a result
/// that has not been published yet.
#[derive(Debug)]
pub struct OrientationTask {
    cancel: CancellationToken,
    state: watch::Receiver<Orientation>,
}

impl OrientationTask {
    /// Start looking up `url` in the background.
    pub fn spawn<M>(resolver: Arc<OrientationResolver<M>>, url: String) -> Self
    where
        M: MetadataSource + 'static,
    {
        let cancel = CancellationToken::new();
        let (publish, state) = watch::channel(Orientation::Normal);

        let token = cancel.clone();
        tokio::spawn(async move {
            let orientation = tokio::select! {
                biased;
                () = token.cancelled() => return,
                orientation = resolver.resolve(&url) => orientation,
            };
            if token.is_cancelled() {
                return;
            }
            // The receiver may already be gone.
            let _ = publish.send(orientation);
        });

        Self { cancel, state }
    }

    /// The most recently published orientation.
    #[must_use]
    pub fn current(&self) -> Orientation {
        *self.state.borrow()
    }

    /// Wait for the lookup to publish, or to end without publishing.
    pub async fn settled(&mut self) -> Orientation {
        if !self.cancel.is_cancelled() {
            // Err means the task ended without publishing.
            let _ = self.state.changed().await;
        }
        self.current()
    }

    /// Discard the lookup. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the lookup was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for OrientationTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Resolve CSS transforms for several images at once, in order.
///
/// Each image gets its own [`OrientationTask`]; if the caller's future is
/// dropped (the client went away) the outstanding lookups are cancelled.
pub async fn transforms_for<M>(
    resolver: &Arc<OrientationResolver<M>>,
    urls: impl IntoIterator<Item = String>,
) -> Vec<&'static str>
where
    M: MetadataSource + 'static,
{
    let mut tasks: Vec<OrientationTask> = urls
        .into_iter()
        .map(|url| OrientationTask::spawn(Arc::clone(resolver), url))
        .collect();
    let mut transforms = Vec::with_capacity(tasks.len());
    for task in &mut tasks {
        transforms.push(task.settled().await.css_transform());
    }
    transforms
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Answers from a table and counts how often it is asked.
    #[derive(Debug, Default)]
    struct FakeSource {
        codes: HashMap<String, u8>,
        reads: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeSource {
        fn with(url: &str, code: u8) -> Self {
            Self {
                codes: HashMap::from([(url.to_string(), code)]),
                ..Self::default()
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl MetadataSource for FakeSource {
        async fn read_orientation(&self, url: &Url) -> Result<Option<u8>, OrientationError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.codes.get(url.path()) {
                Some(code) => Ok(Some(*code)),
                None => Err(OrientationError::Status(404)),
            }
        }
    }

    fn policy() -> OrientationPolicy {
        OrientationPolicy::new(
            ["storage.googleapis.com".to_string()],
            ["orientation-fix".to_string()],
        )
        .with_fetch_scope(
            Url::parse("https://partipoodles.com.au").unwrap(),
            ["cdn.example.com".to_string(), "127.0.0.1".to_string()],
        )
    }

    fn resolver(source: FakeSource) -> OrientationResolver<FakeSource> {
        OrientationResolver::new(source, OrientationCache::new(100), policy())
    }

    #[test]
    fn test_fixed_transform_table() {
        assert_eq!(Orientation::transform(1), "");
        assert_eq!(Orientation::transform(3), "rotate(180deg)");
        assert_eq!(Orientation::transform(6), "rotate(90deg)");
        assert_eq!(Orientation::transform(8), "rotate(-90deg)");
        assert_eq!(Orientation::transform(0), "");
        assert_eq!(Orientation::transform(9), "");
    }

    #[test]
    fn test_policy_skips() {
        let policy = policy();
        assert!(policy.should_skip("data:image/png;base64,iVBORw0KGgo="));
        assert!(policy.should_skip("blob:https://partipoodles.com.au/1234"));
        assert!(policy.should_skip("https://storage.googleapis.com/bucket/milo.jpg"));
        assert!(policy.should_skip("/uploads/milo.jpg?orientation-fix=1"));
        assert!(policy.should_skip(""));

        assert!(!policy.should_skip("/images/milo.jpg"));
        assert!(!policy.should_skip("https://cdn.example.com/milo.jpg?w=400"));
        assert!(!policy.should_skip("https://storage.googleapis.com.evil.test/milo.jpg"));
    }

    #[test]
    fn test_fetch_target_stays_in_scope() {
        let policy = policy();
        let target = |url: &str| policy.fetch_target(url).map(String::from);

        assert_eq!(
            target("/images/milo.jpg").as_deref(),
            Some("https://partipoodles.com.au/images/milo.jpg")
        );
        assert!(target("https://cdn.example.com/milo.jpg").is_some());
        assert!(target("https://CDN.example.com/milo.jpg").is_some());

        // Unlisted hosts, protocol-relative tricks and other schemes
        assert_eq!(target("https://evil.example.net/milo.jpg"), None);
        assert_eq!(target("//evil.example.net/milo.jpg"), None);
        assert_eq!(target("http://partipoodles.com.au:8080/milo.jpg"), None);
        assert_eq!(target("file:///etc/passwd"), None);
        assert_eq!(target("ftp://cdn.example.com/milo.jpg"), None);

        // Internal addresses are refused even when listed
        assert_eq!(target("http://127.0.0.1:9000/admin"), None);
        assert_eq!(target("http://169.254.169.254/latest/meta-data"), None);
        assert_eq!(target("http://10.0.0.5/milo.jpg"), None);
        assert_eq!(target("http://[::1]/milo.jpg"), None);
        assert_eq!(target("http://localhost/milo.jpg"), None);
    }

    #[test]
    fn test_policy_without_scope_fetches_nothing() {
        let policy = OrientationPolicy::default();
        assert_eq!(policy.fetch_target("/images/milo.jpg"), None);
    }

    #[tokio::test]
    async fn test_off_scope_url_never_read_or_cached() {
        let resolver = resolver(FakeSource::with("/internal/secrets", 6));

        let url = "http://127.0.0.1:9000/internal/secrets";
        assert_eq!(resolver.resolve(url).await, Orientation::Normal);
        assert_eq!(resolver.source.reads(), 0);
        assert_eq!(resolver.cache().get(url).await, None);
    }

    #[tokio::test]
    async fn test_resolves_and_caches() {
        let resolver = resolver(FakeSource::with("/images/milo.jpg", 6));

        assert_eq!(resolver.resolve("/images/milo.jpg").await, Orientation::Rotate90);
        assert_eq!(resolver.resolve("/images/milo.jpg").await, Orientation::Rotate90);
        assert_eq!(resolver.source.reads(), 1);
        assert_eq!(
            resolver.resolve("/images/milo.jpg").await.css_transform(),
            "rotate(90deg)"
        );
    }

    #[tokio::test]
    async fn test_processed_marker_never_reads() {
        let resolver = resolver(FakeSource::with("/images/milo.jpg?orientation-fix", 6));

        let orientation = resolver.resolve("/images/milo.jpg?orientation-fix").await;
        assert_eq!(orientation, Orientation::Normal);
        assert_eq!(resolver.source.reads(), 0);
    }

    #[tokio::test]
    async fn test_failure_caches_normal() {
        let resolver = resolver(FakeSource::default());

        assert_eq!(resolver.resolve("/images/gone.jpg").await, Orientation::Normal);
        assert_eq!(resolver.resolve("/images/gone.jpg").await, Orientation::Normal);
        assert_eq!(resolver.source.reads(), 1);
        assert_eq!(
            resolver.cache().get("/images/gone.jpg").await,
            Some(Orientation::Normal)
        );
    }

    #[tokio::test]
    async fn test_out_of_range_code_is_normal() {
        let resolver = resolver(FakeSource::with("/images/odd.jpg", 12));
        assert_eq!(resolver.resolve("/images/odd.jpg").await, Orientation::Normal);
    }

    #[tokio::test]
    async fn test_injected_cache_is_shared() {
        let cache = OrientationCache::new(10);
        cache.insert("/images/milo.jpg", Orientation::Rotate270).await;
        let resolver = OrientationResolver::new(FakeSource::default(), cache.clone(), policy());

        assert_eq!(resolver.resolve("/images/milo.jpg").await, Orientation::Rotate270);
        assert_eq!(resolver.source.reads(), 0);

        cache.clear();
        resolver.resolve("/images/milo.jpg").await;
        assert_eq!(resolver.source.reads(), 1);
    }

    #[tokio::test]
    async fn test_task_publishes_result() {
        let resolver = Arc::new(resolver(FakeSource::with("/images/milo.jpg", 8)));

        let mut task = OrientationTask::spawn(resolver, "/images/milo.jpg".to_string());
        assert_eq!(task.settled().await, Orientation::Rotate270);
        assert_eq!(task.current(), Orientation::Rotate270);
    }

    #[tokio::test]
    async fn test_cancelled_task_discards_result() {
        let source = FakeSource {
            delay: Some(Duration::from_millis(50)),
            ..FakeSource::with("/images/milo.jpg", 6)
        };
        let resolver = Arc::new(resolver(source));

        let mut task = OrientationTask::spawn(Arc::clone(&resolver), "/images/milo.jpg".to_string());
        task.cancel();
        assert!(task.is_cancelled());
        assert_eq!(task.settled().await, Orientation::Normal);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(task.current(), Orientation::Normal);
    }

    #[tokio::test]
    async fn test_dropping_task_cancels_lookup() {
        let source = FakeSource {
            delay: Some(Duration::from_millis(50)),
            ..FakeSource::with("/images/milo.jpg", 6)
        };
        let resolver = Arc::new(resolver(source));

        let task = OrientationTask::spawn(Arc::clone(&resolver), "/images/milo.jpg".to_string());
        let token = task.cancel.clone();
        drop(task);
        assert!(token.is_cancelled());

        // The aborted lookup never reached the cache.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(resolver.cache().get("/images/milo.jpg").await, None);
    }

    #[tokio::test]
    async fn test_transforms_for_keeps_order() {
        let source = FakeSource {
            codes: HashMap::from([
                ("/a.jpg".to_string(), 6),
                ("/b.jpg".to_string(), 3),
            ]),
            ..FakeSource::default()
        };
        let resolver = Arc::new(resolver(source));

        let transforms = transforms_for(
            &resolver,
            ["/a.jpg", "/b.jpg", "data:image/png;base64,AA=="].map(String::from),
        )
        .await;
        assert_eq!(transforms, vec!["rotate(90deg)", "rotate(180deg)", ""]);
    }

    #[test]
    fn test_orientation_of_rejects_garbage() {
        assert!(orientation_of(b"definitely not an image").is_err());
    }
}
