//! Deferred content loading for the interactive target.
//!
//! A render never blocks on the network. The first request for a source
//! answers [`ContentState::Loading`] and hands the fetch to a worker thread;
//! the finished result lands in the shared [`ContentCaches`] and a
//! [`Completion`] is sent back over a channel. The stage drains the channel
//! and rebuilds whichever layers were waiting.
//!
//! `data:` sources need no I/O and resolve inline.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use lumen_common::FetchOptions;
use lumen_common::warning::warn_once;
use lumen_render::loader::abbreviate;
use lumen_render::{
    ContentCaches, ContentSource, ContentState, ImageAsset, LoadError, VectorDocument, load_image,
    load_vector,
};
use tracing::debug;

/// Which cache a fetch fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Decoded image.
    Image,
    /// Parsed vector document.
    Vector,
}

/// A finished background fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The source that was fetched.
    pub src: String,
    /// The cache it went into.
    pub kind: ContentKind,
    /// The failure, if any.
    pub error: Option<LoadError>,
}

/// A [`ContentSource`] that loads on worker threads.
#[derive(Debug)]
pub struct DeferredContent {
    options: FetchOptions,
    caches: Arc<ContentCaches>,
    in_flight: Mutex<HashSet<(String, ContentKind)>>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl DeferredContent {
    /// A source with its own caches.
    #[must_use]
    pub fn new(options: FetchOptions) -> Self {
        Self::with_caches(options, Arc::default())
    }

    /// A source sharing existing caches.
    #[must_use]
    pub fn with_caches(options: FetchOptions, caches: Arc<ContentCaches>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            options,
            caches,
            in_flight: Mutex::new(HashSet::new()),
            sender,
            receiver,
        }
    }

    /// The underlying caches.
    #[must_use]
    pub const fn caches(&self) -> &Arc<ContentCaches> {
        &self.caches
    }

    /// Number of fetches not yet reported.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget a source so the next request fetches it again.
    pub fn invalidate(&self, src: &str) -> bool {
        self.caches.invalidate(src)
    }

    /// Completions that have already arrived.
    pub fn poll(&self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.receiver.try_recv() {
            self.settle(&completion);
            done.push(completion);
        }
        done
    }

    /// Block until at least one completion arrives or `deadline` passes,
    /// then drain whatever else is ready.
    pub fn wait_until(&self, deadline: Instant) -> Vec<Completion> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.receiver.recv_timeout(remaining) {
            Ok(first) => {
                self.settle(&first);
                let mut done = vec![first];
                done.extend(self.poll());
                done
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => Vec::new(),
        }
    }

    fn settle(&self, completion: &Completion) {
        let _ = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(completion.src.clone(), completion.kind));
    }

    fn start(&self, src: &str, kind: ContentKind) {
        let key = (src.to_string(), kind);
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if !in_flight.insert(key.clone()) {
                return;
            }
        }
        debug!(target: "lumen::scene", src = %abbreviate(src), ?kind, "fetching in background");

        let caches = Arc::clone(&self.caches);
        let options = self.options.clone();
        let sender = self.sender.clone();
        let owned = src.to_string();
        let spawned = thread::Builder::new()
            .name("lumen-fetch".to_string())
            .spawn(move || {
                let completion = fetch(&caches, &options, owned, kind);
                // The stage may be gone; nobody is waiting then.
                let _ = sender.send(completion);
            });

        if let Err(err) = spawned {
            let _ = warn_once(
                "scene",
                &format!("cannot spawn fetch worker ({err}), loading inline"),
            );
            let completion = fetch(&self.caches, &self.options, src.to_string(), kind);
            let _ = self.sender.send(completion);
        }
    }
}

fn fetch(
    caches: &ContentCaches,
    options: &FetchOptions,
    src: String,
    kind: ContentKind,
) -> Completion {
    let error = match kind {
        ContentKind::Image => caches
            .images
            .get_or_load(&src, || load_image(&src, options))
            .err(),
        ContentKind::Vector => caches
            .vectors
            .get_or_load(&src, || load_vector(&src, options))
            .err(),
    };
    Completion { src, kind, error }
}

impl ContentSource for DeferredContent {
    fn image(&self, src: &str) -> ContentState<ImageAsset> {
        if src.starts_with("data:") {
            return self
                .caches
                .images
                .get_or_load(src, || load_image(src, &self.options))
                .into();
        }
        match self.caches.images.peek(src) {
            Some(result) => result.into(),
            None => {
                self.start(src, ContentKind::Image);
                ContentState::Loading
            }
        }
    }

    fn vector(&self, src: &str) -> ContentState<VectorDocument> {
        if src.starts_with("data:") {
            return self
                .caches
                .vectors
                .get_or_load(src, || load_vector(src, &self.options))
                .into();
        }
        match self.caches.vectors.peek(src) {
            Some(result) => result.into(),
            None => {
                self.start(src, ContentKind::Vector);
                ContentState::Loading
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_file_loads_in_background_once() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("absent.png").to_string_lossy().into_owned();
        let content = DeferredContent::new(FetchOptions::default());
        assert_eq!(content.image(&src), ContentState::Loading);
        // A repeat request, finished or not, never starts a second fetch.
        let _ = content.image(&src);
        assert_eq!(content.pending(), 1);

        let done = content.wait_until(Instant::now() + Duration::from_secs(5));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].kind, ContentKind::Image);
        assert!(done[0].error.is_some());
        assert_eq!(content.pending(), 0);
        assert!(matches!(content.image(&src), ContentState::Failed(_)));
    }

    #[test]
    fn test_data_sources_resolve_inline() {
        let content = DeferredContent::new(FetchOptions::default());
        let state = content.vector("data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg'/>");
        assert!(matches!(state, ContentState::Ready(_)));
        assert_eq!(content.pending(), 0);
    }
}
