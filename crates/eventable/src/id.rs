//! Identity minting.
//!
//! Every identity the crate hands out comes from this module: numeric object
//! ids for [`Context`](crate::Context) / [`Dispatcher`](crate::Dispatcher)
//! identity, and the lazily assigned `l<n>` listen ids.

use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every listen id (`l1`, `l2`, ...).
pub const LISTEN_ID_PREFIX: &str = "l";

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LISTEN_ID: AtomicU64 = AtomicU64::new(1);

/// A fresh process-unique object id.
pub(crate) fn next_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A fresh process-unique listen id.
pub(crate) fn next_listen_id() -> String {
    let n = NEXT_LISTEN_ID.fetch_add(1, Ordering::Relaxed);
    format!("{LISTEN_ID_PREFIX}{n}")
}
