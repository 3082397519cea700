//! Ping prober for checking network reachability via ICMP.
//!
//! - [`PingProber`]: ICMP echo probe reducing every outcome to reachable / unreachable

mod collector;

pub use collector::{DEFAULT_TIMEOUT, PingProber};
