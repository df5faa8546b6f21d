//! Generic fan-in helpers used by the extraction orchestrator.

use std::fmt::Display;

use tokio::sync::mpsc;

/// Drains `rx` in arrival order. Returns once every sender has been dropped.
pub async fn to_vec<T>(mut rx: mpsc::Receiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

/// Drains `rx` and joins the error messages with `sep`.
///
/// Errors rendering to an empty message are skipped. No trailing separator is
/// emitted; zero errors yield an empty string.
pub async fn join_channel_errors<E: Display>(mut rx: mpsc::Receiver<E>, sep: &str) -> String {
    let mut messages = Vec::new();
    while let Some(err) = rx.recv().await {
        let msg = err.to_string();
        if !msg.is_empty() {
            messages.push(msg);
        }
    }
    messages.join(sep)
}

/// Keeps every element that differs from `T::default()`, in order.
pub fn remove_zero_entries<T: Default + PartialEq>(items: Vec<T>) -> Vec<T> {
    let zero = T::default();
    items.into_iter().filter(|item| *item != zero).collect()
}
