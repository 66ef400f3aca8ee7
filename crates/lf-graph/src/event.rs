//! Change notification for graph observers.

use std::sync::mpsc::{self, Receiver, Sender};

use lf_core::{ConnectionId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeUpdated(NodeId),
    NodeRemoved(NodeId),
    ConnectionAdded(ConnectionId),
    ConnectionUpdated(ConnectionId),
    ConnectionRemoved(ConnectionId),
}

/// Per-graph subscriber list. Disconnected receivers are dropped on the next send.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    senders: Vec<Sender<GraphEvent>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Receiver<GraphEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}
