//! Per-client rate limiting using a token bucket.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Sustained requests per second replenished per client.
const PER_SECOND: u64 = 2;
/// Requests a client may burst before being throttled.
const BURST_SIZE: u32 = 100;

type Layer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build<K: KeyExtractor>(key_extractor: K) -> Layer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(PER_SECOND)
            .burst_size(BURST_SIZE)
            .key_extractor(key_extractor)
            .finish()
            .expect("rate limit quota is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Limits by socket peer address.
pub fn peer_layer() -> Layer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor)
}

/// Limits by the client address reported by a reverse proxy
/// (`X-Forwarded-For`, `X-Real-IP`, `Forwarded`), falling back to the peer.
pub fn proxy_layer() -> Layer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor)
}

/// Applies the limiter matching the deployment to `router`.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let api = rate_limit::apply(api::routes::api_routes(state.clone()), config.behind_proxy);
/// ```
pub fn apply<S>(router: Router<S>, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(proxy_layer())
    } else {
        router.layer(peer_layer())
    }
}
