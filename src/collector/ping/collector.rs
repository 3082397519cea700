//! ICMP ping prober.
//!
//! Sends one echo request per probe and reports whether a reply with a
//! non-zero round trip arrived within the timeout.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use thiserror::Error;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

use crate::collector::Prober;

/// Default probe timeout (4 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Reasons a single ping did not produce a round trip.
#[derive(Debug, Error)]
enum PingError {
    #[error("failed to resolve host: {0}")]
    Resolve(std::io::Error),

    #[error("failed to create ICMP client: {0}")]
    Client(std::io::Error),

    #[error("ping failed: {0}")]
    Ping(#[from] SurgeError),
}

/// ICMP echo prober.
///
/// Raw or datagram ICMP sockets may need elevated privileges; when the
/// socket cannot be opened every probe reports unreachable.
#[derive(Debug, Clone)]
pub struct PingProber {
    timeout: Duration,
}

impl PingProber {
    /// Create a prober with the given per-probe timeout.
    ///
    /// The timeout bounds the whole check, name resolution included.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Per-probe timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn ping(&self, address: &str) -> Result<Duration, PingError> {
        let ip_addr = resolve_host(address).await.map_err(PingError::Resolve)?;

        let client = match ip_addr {
            IpAddr::V4(_) => Client::new(&Config::default()),
            IpAddr::V6(_) => Client::new(&Config::builder().kind(ICMP::V6).build()),
        }
        .map_err(PingError::Client)?;

        let mut pinger = client.pinger(ip_addr, PingIdentifier(rand::random())).await;
        pinger.timeout(self.timeout);

        let (_, rtt) = pinger.ping(PingSequence(0), &[]).await?;
        Ok(rtt)
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Resolve hostname to IP address.
async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    // First, try to parse as an IP address directly
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    // Otherwise, resolve the hostname using tokio's DNS lookup
    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

#[async_trait::async_trait]
impl Prober for PingProber {
    async fn probe(&self, address: &str) -> bool {
        let start = Instant::now();
        let result = timeout(self.timeout, self.ping(address)).await;
        self.reduce(address, result, start.elapsed())
    }
}

impl PingProber {
    /// Collapse a bounded ping attempt into a reachability status.
    ///
    /// Only a reply with a non-zero round trip counts as reachable.
    fn reduce(
        &self,
        address: &str,
        result: Result<Result<Duration, PingError>, Elapsed>,
        elapsed: Duration,
    ) -> bool {
        match result {
            Ok(Ok(rtt)) if rtt > Duration::ZERO => {
                tracing::debug!(
                    address = %address,
                    latency_ms = rtt.as_secs_f64() * 1000.0,
                    "Ping probe successful"
                );
                true
            }
            Ok(Ok(_)) => {
                tracing::warn!(address = %address, "Ping probe returned zero latency");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    address = %address,
                    error = %e,
                    elapsed_ms = elapsed.as_millis(),
                    "Ping probe failed"
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    address = %address,
                    timeout_ms = self.timeout.as_millis(),
                    "Ping probe timed out"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_prober_defaults() {
        assert_eq!(PingProber::default().timeout(), DEFAULT_TIMEOUT);
        assert_eq!(
            PingProber::new(Duration::from_secs(1)).timeout(),
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_probe_empty_address_is_unreachable() {
        let prober = PingProber::new(Duration::from_millis(500));
        assert!(!prober.probe("").await);
    }

    #[tokio::test]
    async fn test_probe_malformed_address_is_unreachable() {
        let prober = PingProber::new(Duration::from_millis(500));
        assert!(!prober.probe("not a valid host name!").await);
    }

    #[test]
    fn test_reduce_reply_is_reachable() {
        let prober = PingProber::default();
        assert!(prober.reduce("10.0.0.1", Ok(Ok(Duration::from_millis(3))), Duration::ZERO));
    }

    #[test]
    fn test_reduce_zero_latency_is_unreachable() {
        let prober = PingProber::default();
        assert!(!prober.reduce("10.0.0.1", Ok(Ok(Duration::ZERO)), Duration::ZERO));
    }

    #[test]
    fn test_reduce_transport_error_is_unreachable() {
        let prober = PingProber::default();
        let refused = PingError::Client(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "operation not permitted",
        ));
        assert!(!prober.reduce("10.0.0.1", Ok(Err(refused)), Duration::ZERO));

        let unresolved = PingError::Resolve(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no addresses found",
        ));
        assert!(!prober.reduce("nas.invalid", Ok(Err(unresolved)), Duration::ZERO));
    }

    #[tokio::test]
    async fn test_reduce_timeout_is_unreachable() {
        let prober = PingProber::new(Duration::from_millis(10));
        let result = timeout(
            prober.timeout(),
            std::future::pending::<Result<Duration, PingError>>(),
        )
        .await;

        assert!(result.is_err());
        assert!(!prober.reduce("10.0.0.1", result, prober.timeout()));
    }
}
