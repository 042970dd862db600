// Unit tests for bounded connection checkout

use crate::error::InvokerError;
use crate::transport::pool::{ConnectionPool, route_key};

use std::time::Duration;

use url::Url;

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

/// **VALUE**: Verifies route keys include the default port.
///
/// **WHY THIS MATTERS**: `http://a` and `http://a:80` are the same route and must share
/// one per-route limit.
#[test]
fn given_urls_when_route_key_then_scheme_host_and_port() {
    assert_eq!(route_key(&url("http://a/x")), "http://a:80");
    assert_eq!(route_key(&url("http://a:80/y")), "http://a:80");
    assert_eq!(route_key(&url("https://b:8443/")), "https://b:8443");
}

/// **VALUE**: Verifies checkouts wait and then time out when a route is exhausted.
///
/// **WHY THIS MATTERS**: Exhaustion must neither fail instantly nor hang forever.
///
/// **BUG THIS CATCHES**: Would catch the per-route semaphore being ignored, or the wait
/// not being bounded by the connect timeout.
#[tokio::test]
async fn given_exhausted_route_when_acquiring_then_times_out_as_transport_error() {
    // GIVEN: One slot per route, already taken
    let pool = ConnectionPool::new(4, 1, Duration::from_millis(50));
    let _held = pool.acquire(&url("http://a/1")).await.unwrap();

    // WHEN: Another checkout on the same route
    let err = pool.acquire(&url("http://a/2")).await.unwrap_err();

    // THEN: Timeout transport error, while another route still has room
    assert!(matches!(
        err,
        InvokerError::Transport {
            is_timeout: true,
            ..
        }
    ));
    assert!(pool.acquire(&url("http://b/1")).await.is_ok());
}

/// **VALUE**: Verifies the total bound applies across routes.
#[tokio::test]
async fn given_total_exhausted_when_acquiring_other_route_then_times_out() {
    let pool = ConnectionPool::new(1, 1, Duration::from_millis(50));
    let _held = pool.acquire(&url("http://a/")).await.unwrap();

    assert!(pool.acquire(&url("http://b/")).await.is_err());
    assert_eq!(pool.available(), 0);
}

/// **VALUE**: Verifies dropping a permit returns the slot.
///
/// **BUG THIS CATCHES**: Would catch permits being forgotten instead of released.
#[tokio::test]
async fn given_released_permit_when_acquiring_again_then_succeeds() {
    let pool = ConnectionPool::new(1, 1, Duration::from_millis(50));

    let first = pool.acquire(&url("http://a/")).await.unwrap();
    drop(first);

    assert!(pool.acquire(&url("http://a/")).await.is_ok());
    assert_eq!(pool.available(), 1);
}

/// **VALUE**: Verifies a closed pool refuses checkouts without waiting, while held permits stay valid.
///
/// **WHY THIS MATTERS**: Disposal must not abort in-flight requests.
///
/// **BUG THIS CATCHES**: Would catch close() leaving new routes open.
#[tokio::test]
async fn given_closed_pool_when_acquiring_then_refused_immediately() {
    // GIVEN: A permit held before closing
    let pool = ConnectionPool::new(2, 2, Duration::from_secs(5));
    let held = pool.acquire(&url("http://a/")).await.unwrap();

    // WHEN: Closing, then acquiring on known and new routes
    pool.close();
    let known = pool.acquire(&url("http://a/")).await.unwrap_err();
    let fresh = pool.acquire(&url("http://new/")).await.unwrap_err();

    // THEN: Both refused as non-timeout transport errors
    for err in [known, fresh] {
        assert!(matches!(
            err,
            InvokerError::Transport {
                is_timeout: false,
                ..
            }
        ));
    }
    assert!(pool.is_closed());
    drop(held);
}
