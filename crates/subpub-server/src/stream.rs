//! Pull-style adapter over a broker subscription
//!
//! Callbacks push delivered values into an unbounded channel; [`EventStream`]
//! yields them as a [`Stream`]. Dropping the stream is the cancellation
//! signal: it revokes the subscription. The stream ends on its own once the
//! broker is closed and the last in-flight delivery has finished.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use subpub_core::{SubPub, Subscription};
use subpub_types::Result;
use tokio::sync::mpsc;
use tracing::debug;

/// Stream of values delivered to one subscription
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Bytes>,
    subscription: Subscription,
}

impl EventStream {
    /// Subscribe to `topic` and return the stream of its deliveries
    pub fn subscribe(broker: &dyn SubPub<Bytes>, topic: &str) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = broker.subscribe(
            topic,
            Arc::new(move |msg: Bytes| {
                // The receiver is gone only while the stream is being dropped.
                let _ = tx.send(msg);
            }),
        )?;

        Ok(Self { rx, subscription })
    }

    /// Topic this stream is subscribed to
    pub fn topic(&self) -> &str {
        self.subscription.topic()
    }
}

impl Stream for EventStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
        debug!(
            topic = %self.subscription.topic(),
            subscriber = %self.subscription.id(),
            "Event stream closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;
    use subpub_core::Broker;

    const WAIT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn test_stream_yields_deliveries() {
        let broker = Broker::<Bytes>::new();
        let mut events = EventStream::subscribe(&broker, "t").unwrap();
        assert_eq!(events.topic(), "t");

        broker.publish("t", Bytes::from_static(b"one")).unwrap();
        let first = tokio::time::timeout(WAIT, events.next()).await.unwrap();
        assert_eq!(first, Some(Bytes::from_static(b"one")));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let broker = Broker::<Bytes>::new();
        let events = EventStream::subscribe(&broker, "t").unwrap();
        assert_eq!(broker.subscriber_count("t"), 1);

        drop(events);
        assert_eq!(broker.subscriber_count("t"), 0);
        assert_eq!(broker.topic_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_ends_after_close() {
        let broker = Broker::<Bytes>::new();
        let mut events = EventStream::subscribe(&broker, "t").unwrap();

        broker.close_timeout(Duration::from_millis(100)).await.unwrap();

        let next = tokio::time::timeout(WAIT, events.next()).await.unwrap();
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn test_subscribe_after_close_fails() {
        let broker = Broker::<Bytes>::new();
        broker.close_timeout(Duration::from_millis(100)).await.unwrap();

        let result = EventStream::subscribe(&broker, "t");
        assert!(matches!(result, Err(e) if e.is_closed()));
    }
}
