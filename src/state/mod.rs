//! Shared crawl state
//!
//! The frontier queue, the visited set, and the flag vault are the only
//! mutable state shared between workers. Each is constructed once per crawl
//! run and handed to workers behind an `Arc`; there are no process-wide
//! globals, so independent crawls can coexist in one process (useful for
//! tests).

mod frontier;
mod vault;

pub use frontier::Frontier;
pub use vault::FlagVault;
