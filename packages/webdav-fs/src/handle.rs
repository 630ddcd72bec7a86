//! Handles for requests running on a background thread.
//!
//! Every handle completes exactly once. The result is either collected with
//! [`RequestHandle::wait`] or delivered to a callback registered with
//! [`RequestHandle::on_complete`]. There is no cancellation: dropping a handle
//! discards the result, but the request still runs to completion.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The state of a background request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// Request is in progress
    Pending,
    /// Request completed successfully
    Complete,
    /// Request failed with an error
    Failed,
}

type Callback<T> = Box<dyn FnOnce(Result<T, Error>) + Send>;

enum Slot<T> {
    Pending(Option<Callback<T>>),
    Ready(Result<T, Error>),
    Taken,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    completed: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, result: Result<T, Error>) {
        let mut slot = self.lock();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Pending(Some(callback)) => {
                drop(slot);
                callback(result);
            }
            Slot::Pending(None) => {
                *slot = Slot::Ready(result);
                self.completed.notify_all();
            }
            // Completion only ever runs once per handle
            Slot::Ready(_) | Slot::Taken => {}
        }
    }
}

/// A request executing in the background.
pub struct RequestHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> RequestHandle<T> {
    /// Run `task` on a new thread and return a handle to its result.
    pub fn spawn<F>(task: F) -> Self
    where
        F: FnOnce() -> Result<T, Error> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::Pending(None)),
            completed: Condvar::new(),
        });

        let worker = shared.clone();
        thread::spawn(move || {
            let result = task();
            worker.complete(result);
        });

        Self { shared }
    }

    /// Register a callback for the result.
    ///
    /// If the request has already finished the callback runs immediately on
    /// the calling thread, otherwise on the worker thread when it finishes.
    pub fn on_complete<F>(self, callback: F)
    where
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        let mut slot = self.shared.lock();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(result) => {
                drop(slot);
                callback(result);
            }
            Slot::Pending(_) => {
                *slot = Slot::Pending(Some(Box::new(callback)));
            }
            Slot::Taken => {
                drop(slot);
                callback(Err(Error::HandleConsumed));
            }
        }
    }
}

impl<T> RequestHandle<T> {
    /// Block until the request completes and return its result.
    pub fn wait(self) -> Result<T, Error> {
        let mut slot = self.shared.lock();
        loop {
            match std::mem::replace(&mut *slot, Slot::Taken) {
                Slot::Ready(result) => return result,
                Slot::Taken => return Err(Error::HandleConsumed),
                pending @ Slot::Pending(_) => {
                    *slot = pending;
                    slot = self
                        .shared
                        .completed
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    pub fn state(&self) -> RequestState {
        match &*self.shared.lock() {
            Slot::Pending(_) => RequestState::Pending,
            Slot::Ready(Ok(_)) | Slot::Taken => RequestState::Complete,
            Slot::Ready(Err(_)) => RequestState::Failed,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() != RequestState::Pending
    }
}
