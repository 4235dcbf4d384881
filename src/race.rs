//! Wait for the first matching item of a stream, with a deadline
//!
//! Two tasks feed a single-slot channel: an observer that scans the stream
//! and a timer. The caller takes whichever value lands first and drops the
//! receiver, so the losing task's later send fails and is discarded.

use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// How a race ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The observer saw a matching item first.
    Matched(T),
    /// The deadline passed first.
    Elapsed(Duration),
    /// The stream ended without producing a match.
    Closed,
}

/// Race `events` filtered by `matches` against a `deadline` timer.
///
/// Both branches run as spawned tasks. Neither is cancelled when the other
/// wins: the observer keeps its stream until the stream ends, the timer
/// runs out its sleep.
pub async fn first_match<S, T, F>(events: S, mut matches: F, deadline: Duration) -> Outcome<T>
where
    S: Stream<Item = T> + Send + 'static,
    T: Send + 'static,
    F: FnMut(&T) -> bool + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Outcome<T>>(1);

    let observer_tx = tx.clone();
    tokio::spawn(async move {
        let mut events = std::pin::pin!(events);
        let outcome = loop {
            match events.next().await {
                Some(item) if matches(&item) => break Outcome::Matched(item),
                Some(_) => {}
                None => break Outcome::Closed,
            }
        };
        if observer_tx.send(outcome).await.is_err() {
            tracing::debug!("Observer finished after the race was decided");
        }
    });

    tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        if tx.send(Outcome::Elapsed(deadline)).await.is_err() {
            tracing::trace!("Timer fired after the race was decided");
        }
    });

    // Both senders live in their tasks until they send, so recv only sees
    // None if both tasks died without sending.
    rx.recv().await.unwrap_or(Outcome::Closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn is_mpd(s: &String) -> bool {
        s.ends_with("/index.mpd")
    }

    #[tokio::test]
    async fn test_match_wins_before_deadline() {
        let events = stream::iter(vec![
            "https://cdn.example.com/player.js".to_string(),
            "https://cdn.example.com/stream/abc/index.mpd".to_string(),
            "https://cdn.example.com/stream/def/index.mpd".to_string(),
        ]);

        let outcome = first_match(events, is_mpd, Duration::from_secs(5)).await;

        assert_eq!(
            outcome,
            Outcome::Matched("https://cdn.example.com/stream/abc/index.mpd".to_string())
        );
    }

    #[tokio::test]
    async fn test_deadline_wins_when_stream_is_silent() {
        let events = stream::pending::<String>();

        let outcome = first_match(events, is_mpd, Duration::from_millis(50)).await;

        assert_eq!(outcome, Outcome::Elapsed(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_deadline_wins_over_late_match() {
        let events = stream::once(async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            "https://cdn.example.com/late/index.mpd".to_string()
        });

        let outcome = first_match(events, is_mpd, Duration::from_millis(50)).await;

        assert_eq!(outcome, Outcome::Elapsed(Duration::from_millis(50)));

        // The late match is dropped without disturbing anything.
        tokio::time::sleep(Duration::from_millis(600)).await;
    }

    #[tokio::test]
    async fn test_stream_ending_without_match_is_closed() {
        let events = stream::iter(vec!["https://example.com/a.js".to_string()]);

        let outcome = first_match(events, is_mpd, Duration::from_secs(5)).await;

        assert_eq!(outcome, Outcome::Closed);
    }

    #[tokio::test]
    async fn test_observer_stops_at_first_match() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let events = stream::iter(vec![
            "https://a.example/index.mpd".to_string(),
            "https://b.example/index.mpd".to_string(),
        ]);

        let outcome = first_match(
            events,
            move |s: &String| {
                counter.fetch_add(1, Ordering::SeqCst);
                is_mpd(s)
            },
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(
            outcome,
            Outcome::Matched("https://a.example/index.mpd".to_string())
        );
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
