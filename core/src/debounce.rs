// storefront_client/src/debounce.rs

//! Collapses bursts of triggers into one action run with the latest value.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

/// Each `trigger` restarts the quiet window. When the window elapses without
/// another trigger, the action runs once with the most recent value.
/// Closing the debouncer flushes a value that is still waiting.
pub struct Debouncer<T> {
  sender: mpsc::UnboundedSender<T>,
  worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
  pub fn new<F, Fut>(quiet: Duration, mut action: F) -> Self
  where
    F: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let (sender, mut receiver) = mpsc::unbounded_channel::<T>();
    let worker = tokio::spawn(async move {
      while let Some(mut latest) = receiver.recv().await {
        loop {
          tokio::select! {
            next = receiver.recv() => match next {
              Some(value) => {
                trace!("Debounce window restarted.");
                latest = value;
              }
              None => {
                action(latest).await;
                return;
              }
            },
            _ = sleep(quiet) => {
              action(latest).await;
              break;
            }
          }
        }
      }
    });
    Self { sender, worker }
  }

  /// Returns `false` if the debouncer has already shut down.
  pub fn trigger(&self, value: T) -> bool {
    self.sender.send(value).is_ok()
  }

  /// Stops accepting triggers and waits for any pending action to finish.
  pub async fn close(self) {
    drop(self.sender);
    if let Err(e) = self.worker.await {
      tracing::warn!(error = %e, "Debounce worker ended abnormally.");
    }
  }
}
