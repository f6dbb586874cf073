//! Pacing: place topics on weeks, then flag what looks risky
//!
//! The distributor is a single forward pass over the topic list; it never
//! reorders, balances or truncates. The risk detector reads the result and
//! reports compression, overload and gaps. Neither blocks anything.

mod distributor;
mod risk;

pub use distributor::distribute;
pub use risk::RiskDetector;
