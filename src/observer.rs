//! Read-only observation utilities for the event stream.
//!
//! Observers receive copies of each ingested event through a broadcast
//! fan-out (see [`IngestHandle::observe`](crate::ingest::IngestHandle));
//! they never hold or mutate recorder state. A display mirror that cannot
//! keep up with the native event rate can decimate its copy of the stream
//! — recording itself is never decimated.

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::wrappers::BroadcastStream;

use crate::types::TelemetryEvent;

/// Stream of observed events, one receiver per observer.
///
/// Yields `Err(Lagged)` items when an observer falls more than the
/// fan-out capacity behind; the recorder side is unaffected.
pub type EventStream = BroadcastStream<TelemetryEvent>;

/// Extension trait adding decimation to any event stream.
pub trait DecimateExt: Stream {
    /// Keep the first of every `keep_every` items and drop the rest.
    ///
    /// With `keep_every = 1` the stream is passed through unchanged.
    fn decimate(self, keep_every: u32) -> Decimate<Self>
    where
        Self: Sized,
    {
        Decimate::new(self, keep_every)
    }
}

impl<T: Stream> DecimateExt for T {}

pin_project! {
    /// A stream combinator that emits every n-th item.
    pub struct Decimate<S> {
        #[pin]
        stream: S,
        keep_every: u64,
        seen: u64,
    }
}

impl<S> Decimate<S> {
    pub fn new(stream: S, keep_every: u32) -> Self {
        Self { stream, keep_every: u64::from(keep_every.max(1)), seen: 0 }
    }
}

impl<S: Stream> Stream for Decimate<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(item) => {
                    let index = *this.seen;
                    *this.seen += 1;
                    if index % *this.keep_every == 0 {
                        return Poll::Ready(Some(item));
                    }
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
