//! Single Flight
//!
//! Coalesces concurrent executions of the same asynchronous operation. The first caller runs the
//! operation, every caller arriving while it is in flight waits for and receives a clone of its
//! result. If the running caller is dropped before completion, one of the waiting callers takes
//! over.

use std::{cell::RefCell, future::Future};

use futures::channel::oneshot;

pub struct SingleFlight<T> {
    waiters: RefCell<Option<Vec<oneshot::Sender<T>>>>,
}

impl<T: Clone> SingleFlight<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            waiters: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.waiters.borrow().is_some()
    }

    pub async fn run<F, Fut>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let receiver = {
                let mut waiters = self.waiters.borrow_mut();
                if let Some(waiters) = waiters.as_mut() {
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    receiver
                } else {
                    *waiters = Some(vec![]);
                    break;
                }
            };
            if let Ok(value) = receiver.await {
                return value;
            }
        }

        let flight = Flight {
            waiters: &self.waiters,
        };
        let value = operation().await;
        let waiters = self.waiters.borrow_mut().take().unwrap_or_default();
        drop(flight);

        for waiter in waiters {
            let _ = waiter.send(value.clone());
        }

        value
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ends the flight when the running caller completes or is dropped.
struct Flight<'a, T> {
    waiters: &'a RefCell<Option<Vec<oneshot::Sender<T>>>>,
}

impl<T> Drop for Flight<'_, T> {
    fn drop(&mut self) {
        self.waiters.borrow_mut().take();
    }
}
