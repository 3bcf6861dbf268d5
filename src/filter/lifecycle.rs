//! Filtering lifecycle
//!
//! A [`FilterHandle`] drives a [`FilteringAlgorithm`] on one dedicated
//! background thread:
//!
//! ```text
//! Idle --boot--> Armed --run--> Running <--run/reboot--> Paused
//!                                   \________teardown________> Torn down
//! ```
//!
//! The run flag is guarded by a mutex and paired with a condition variable
//! the loop waits on. Reset and teardown are atomic flags polled between
//! steps; no request interrupts a step in flight.
//!
//! The algorithm sits in a shared slot. The filtering thread takes it out
//! for the duration of the recursion and puts it back before exiting, so
//! after [`wait`](FilterHandle::wait) the caller can inspect it again.

use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::filter::errors::FilterError;
use crate::filter::traits::FilteringAlgorithm;

/// State shared between the controlling thread and the filtering thread
#[derive(Debug, Default)]
struct Shared {
    run: Mutex<bool>,
    wake: Condvar,
    reset: AtomicBool,
    teardown: AtomicBool,
    step: AtomicUsize,
}

impl Shared {
    /// Lock the run flag; a poisoned lock still holds a valid bool
    fn lock_run(&self) -> MutexGuard<'_, bool> {
        self.run.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[inline]
    fn torn_down(&self) -> bool {
        self.teardown.load(Ordering::SeqCst)
    }

    #[inline]
    fn resetting(&self) -> bool {
        self.reset.load(Ordering::SeqCst)
    }
}

/// Lifecycle controller of a filtering algorithm
pub struct FilterHandle<A: FilteringAlgorithm> {
    slot: Arc<Mutex<Option<A>>>,
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl<A: FilteringAlgorithm> FilterHandle<A> {
    pub fn new(algorithm: A) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(algorithm))),
            shared: Arc::new(Shared::default()),
            thread: None,
        }
    }

    /// Spawn the filtering thread
    ///
    /// On failure the handle stays idle and `boot` may be retried. A
    /// teardown requested earlier stays in effect: the new thread exits
    /// without running a step.
    pub fn boot(&mut self) -> Result<(), FilterError> {
        if self.thread.is_some() {
            return Err(FilterError::AlreadyBooted);
        }

        let slot = Arc::clone(&self.slot);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("filtering".to_string())
            .spawn(move || filtering_recursion(&slot, &shared));

        match spawned {
            Ok(handle) => {
                info!("Filtering thread booted");
                self.thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!("Failed to spawn filtering thread: {}", e);
                Err(FilterError::ThreadSpawn { reason: e.to_string() })
            }
        }
    }

    /// Start, or resume, the recursion
    pub fn run(&self) {
        let mut run = self.shared.lock_run();
        *run = true;
        self.shared.wake.notify_one();
    }

    /// Restart the recursion from `initialization()` at the next step boundary
    pub fn reset(&self) {
        self.shared.reset.store(true, Ordering::SeqCst);
    }

    /// Reset and pause: the recursion restarts only after the next [`run`](Self::run)
    pub fn reboot(&self) {
        let mut run = self.shared.lock_run();
        self.shared.reset.store(true, Ordering::SeqCst);
        *run = false;
        self.shared.wake.notify_one();
    }

    /// Stop the recursion permanently after the current step
    pub fn teardown(&self) -> bool {
        let _run = self.shared.lock_run();
        self.shared.teardown.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
        info!("Filtering teardown requested");
        true
    }

    /// Block until the filtering thread exits
    ///
    /// Returns immediately when no thread is attached.
    pub fn wait(&mut self) -> Result<(), FilterError> {
        let Some(handle) = self.thread.take() else {
            warn!("Filtering thread is not running, nothing to wait for");
            return Ok(());
        };

        handle.join().map_err(|_| {
            error!("Filtering thread panicked");
            FilterError::ThreadJoin
        })
    }

    /// Whether the run flag is set
    pub fn is_running(&self) -> bool {
        *self.shared.lock_run()
    }

    /// Steps executed in the current (or last) pass of the recursion
    pub fn filtering_step(&self) -> usize {
        self.shared.step.load(Ordering::SeqCst)
    }

    /// Run `f` on the algorithm while it is not owned by the filtering thread
    ///
    /// Returns `None` while the recursion is in progress.
    pub fn with_algorithm<R>(&self, f: impl FnOnce(&mut A) -> R) -> Option<R> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_mut().map(f)
    }

    /// Take the algorithm back, waiting for the filtering thread first
    pub fn into_inner(mut self) -> Result<A, FilterError> {
        if self.thread.is_some() {
            self.teardown();
            self.wait()?;
        }
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.take().ok_or(FilterError::ThreadJoin)
    }
}

impl<A: FilteringAlgorithm> Drop for FilterHandle<A> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.teardown();
            let _ = self.wait();
        }
    }
}

/// Puts the algorithm back into its slot even if a step panics
struct SlotGuard<'a, A> {
    slot: &'a Mutex<Option<A>>,
    algorithm: Option<A>,
}

impl<A> Drop for SlotGuard<'_, A> {
    fn drop(&mut self) {
        if let Some(algorithm) = self.algorithm.take() {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(algorithm);
        }
    }
}

/// Body of the filtering thread
fn filtering_recursion<A: FilteringAlgorithm>(slot: &Mutex<Option<A>>, shared: &Shared) {
    let taken = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    let Some(algorithm) = taken else {
        error!("Filtering thread started without an algorithm");
        return;
    };
    let mut guard = SlotGuard {
        slot,
        algorithm: Some(algorithm),
    };
    let Some(algorithm) = guard.algorithm.as_mut() else {
        return;
    };

    loop {
        shared.reset.store(false, Ordering::SeqCst);
        shared.step.store(0, Ordering::SeqCst);

        {
            let run = shared.lock_run();
            let _run = shared
                .wake
                .wait_while(run, |run| !*run && !shared.torn_down())
                .unwrap_or_else(|e| e.into_inner());
        }

        if shared.torn_down() {
            break;
        }

        if !algorithm.initialization() {
            error!("Filter initialization failed, stopping the recursion");
            break;
        }

        let mut step = 0;
        while algorithm.run_condition(step) && !shared.torn_down() && !shared.resetting() {
            algorithm.filtering_step();
            step += 1;
            shared.step.store(step, Ordering::SeqCst);
        }

        let run = *shared.lock_run();
        if !(algorithm.run_condition(step) && (run || shared.resetting()) && !shared.torn_down()) {
            break;
        }
    }

    *shared.lock_run() = false;
}
