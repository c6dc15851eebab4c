/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for long-running solves.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for estimation and simulation solves.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// Progress events emitted while solving.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMsg {
    /// Preprocessing finished for a variable and traversal is about to start.
    VariableStarted {
        variable: String,
        num_locations: usize,
    },

    /// All query locations for a variable have been estimated.
    EstimationFinished {
        variable: String,
        missing: usize,
        degenerate: usize,
    },

    /// One realization of a variable has been fully simulated.
    RealizationFinished {
        variable: String,
        realization: usize,
        fallbacks: usize,
    },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        // A full or disconnected channel drops the message.
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The thread exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

#[inline]
pub(crate) fn emit(sink: &Option<Arc<dyn ProgressSink>>, msg: ProgressMsg) {
    if let Some(sink) = sink {
        sink.emit(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_sink_delivers_messages_in_order() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let store = received.clone();

        let (sink, handle) = closure_sink(16, move |msg| {
            store.lock().unwrap().push(msg);
        });

        sink.emit(ProgressMsg::Message { message: "first".into() });
        sink.emit(ProgressMsg::RealizationFinished {
            variable: "z".into(),
            realization: 3,
            fallbacks: 1,
        });
        drop(sink);
        handle.join().unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], ProgressMsg::Message { message: "first".into() });
        assert!(matches!(
            received[1],
            ProgressMsg::RealizationFinished { realization: 3, .. }
        ));
    }
}
