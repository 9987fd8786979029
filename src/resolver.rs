use crate::config::{DiscoveryConfig, Environment};
use crate::detector::IpDetector;
use crate::errors::ResolveError;
use crate::model::{EndpointKind, ResolvedEndpoint};
use crate::net::probe::HttpProber;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Turns the detected backend address into GraphQL and WebSocket URLs
///
/// In production the configured URLs are returned as-is. In development the
/// first resolution is memoized for the lifetime of the resolver, independent
/// of the detector's TTL cache. Concurrent first callers share one discovery.
pub struct EndpointResolver {
    environment: Environment,
    detector: Arc<IpDetector>,
    // Swapped for a fresh cell on refresh; callers holding the old cell finish on it
    memo: RwLock<Arc<OnceCell<ResolvedEndpoint>>>,
}

impl EndpointResolver {
    pub fn new(environment: Environment, detector: Arc<IpDetector>) -> Self {
        Self {
            environment,
            detector,
            memo: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    /// Resolver backed by the HTTP prober
    pub fn from_config(
        config: DiscoveryConfig,
        environment: Environment,
    ) -> Result<Self, ResolveError> {
        config.validate()?;
        let prober = Arc::new(HttpProber::new(&config)?);
        let detector = Arc::new(IpDetector::new(config, prober));
        Ok(Self::new(environment, detector))
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn detector(&self) -> &Arc<IpDetector> {
        &self.detector
    }

    /// Resolve eagerly so later `current` calls succeed
    pub async fn init(&self) -> ResolvedEndpoint {
        self.endpoint().await
    }

    pub async fn resolve_graphql_url(&self) -> String {
        self.endpoint().await.graphql_url
    }

    pub async fn resolve_websocket_url(&self) -> String {
        self.endpoint().await.websocket_url
    }

    pub async fn resolve_url(&self, kind: EndpointKind) -> String {
        self.endpoint().await.url(kind).to_string()
    }

    /// Both URLs, resolving on first use
    pub async fn endpoint(&self) -> ResolvedEndpoint {
        if let Some(endpoint) = self.static_endpoint() {
            return endpoint;
        }

        let cell = Arc::clone(&*self.memo.read().await);
        cell.get_or_init(|| async {
            let detection = self.detector.detect(EndpointKind::Graphql).await;
            let config = self.detector.config();
            let endpoint = ResolvedEndpoint::for_address(&detection.address, config.port, &config.path);
            tracing::info!(
                address = %detection.address,
                source = ?detection.source,
                url = %endpoint.graphql_url,
                "endpoint resolved"
            );
            endpoint
        })
        .await
        .clone()
    }

    /// Endpoint already resolved, without triggering discovery
    ///
    /// Fails with `NotInitialized` in development when nothing has been resolved yet.
    pub async fn current(&self) -> Result<ResolvedEndpoint, ResolveError> {
        if let Some(endpoint) = self.static_endpoint() {
            return Ok(endpoint);
        }
        self.memo
            .read()
            .await
            .get()
            .cloned()
            .ok_or(ResolveError::NotInitialized)
    }

    /// Forget the memo and the detector cache, then resolve again
    pub async fn refresh(&self) -> ResolvedEndpoint {
        self.reset().await;
        self.endpoint().await
    }

    /// Drop all resolution state
    pub async fn teardown(&self) {
        self.reset().await;
    }

    async fn reset(&self) {
        *self.memo.write().await = Arc::new(OnceCell::new());
        self.detector.clear().await;
    }

    fn static_endpoint(&self) -> Option<ResolvedEndpoint> {
        match &self.environment {
            Environment::Production {
                graphql_url,
                websocket_url,
            } => Some(ResolvedEndpoint {
                graphql_url: graphql_url.clone(),
                websocket_url: websocket_url.clone(),
            }),
            Environment::Development => None,
        }
    }
}
