//! Channel-backed response stream handed to streaming callers.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

use crate::error::RelayError;
use crate::node::ChatResponse;

/// Stream of response chunks produced by the failover engine.
///
/// Dropping the stream closes the channel; the forwarding task observes
/// the closed channel on its next send and stops without treating the
/// abandonment as a backend failure.
pub struct RelayStream {
    rx: mpsc::Receiver<Result<ChatResponse, RelayError>>,
}

impl RelayStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<ChatResponse, RelayError>>) -> Self {
        Self { rx }
    }
}

impl Stream for RelayStream {
    type Item = Result<ChatResponse, RelayError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
