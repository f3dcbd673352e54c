//! Deduplicated renderer warnings.
//!
//! A design with fifty layers pointing at the same broken image should not
//! produce fifty identical log lines. Warnings are keyed by component and
//! message and emitted through `tracing::warn!` once per key.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a degraded or rejected input (emits once per unique message).
///
/// Returns `true` when the warning was emitted by this call.
///
/// # Example
/// ```
/// use lumen_common::warning::warn_once;
///
/// let first = warn_once("image", "could not fetch 'missing.png'");
/// let second = warn_once("image", "could not fetch 'missing.png'");
/// assert!(first);
/// assert!(!second);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(target: "lumen", component, "{message}");
    }
    should_emit
}

/// Clear all recorded warnings (call between unrelated render sessions).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
