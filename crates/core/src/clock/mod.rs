use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    session::SessionId,
    timeline::{TickEvent, Timer},
    MetronomeError, Result,
};

/// Destination for ticks produced by the clock thread.
pub trait TickSink: Send + 'static {
    /// Returns `false` once nobody is listening any more.
    fn deliver(&self, event: TickEvent) -> bool;
}

impl<E> TickSink for Sender<E>
where
    E: From<TickEvent> + Send + 'static,
{
    fn deliver(&self, event: TickEvent) -> bool {
        self.send(E::from(event)).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    deadline: Instant,
    session: SessionId,
    tag: u64,
}

/// [`Timer`] backed by a single worker thread holding a deadline queue.
/// Every armed request is delivered exactly once, in deadline order.
#[derive(Debug)]
pub struct ThreadTimer {
    requests: Option<Sender<Pending>>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    pub fn spawn<S: TickSink>(sink: S) -> Result<Self> {
        let (requests, queue) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("metronome-clock".to_string())
            .spawn(move || run_queue(queue, sink))
            .map_err(MetronomeError::Startup)?;

        Ok(Self {
            requests: Some(requests),
            worker: Some(worker),
        })
    }
}

impl Timer for ThreadTimer {
    fn arm(&self, session: SessionId, tag: u64, interval: Duration) {
        let pending = Pending {
            deadline: Instant::now() + interval,
            session,
            tag,
        };
        let sent = self
            .requests
            .as_ref()
            .map(|requests| requests.send(pending).is_ok())
            .unwrap_or(false);
        if !sent {
            tracing::warn!(session = %session, tag, "clock thread has stopped; tick dropped");
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        // Closing the request channel wakes the worker and ends its loop.
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("clock thread panicked");
            }
        }
    }
}

fn run_queue<S: TickSink>(queue: Receiver<Pending>, sink: S) {
    let mut pending: BinaryHeap<Reverse<Pending>> = BinaryHeap::new();

    loop {
        let received = match pending.peek() {
            Some(Reverse(next)) => {
                queue.recv_timeout(next.deadline.saturating_duration_since(Instant::now()))
            }
            None => queue.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(request) => pending.push(Reverse(request)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        while let Some(Reverse(next)) = pending.peek().copied() {
            if next.deadline > now {
                break;
            }
            pending.pop();

            let event = TickEvent {
                fired_at: now,
                session: Some(next.session),
                tag: Some(next.tag),
            };
            if !sink.deliver(event) {
                tracing::debug!("tick receiver gone; stopping clock thread");
                return;
            }
        }
    }

    tracing::debug!(dropped = pending.len(), "clock thread shut down");
}
