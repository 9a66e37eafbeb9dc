//! One-time static initialization of classes.
//!
//! Every class runs its static setup (the `<clinit>` body, provided by the embedder's
//! [`Natives`] hook) at most once, no matter how many threads ask for it.
//!
//! # State Machine
//!
//! ```text
//! Pending ──► InProgress(owner) ──► Done
//!                    │
//!                    └────────────► Failed(cause)
//! ```
//!
//! - The first caller moves `Pending` to `InProgress` and becomes the owner.
//! - Other threads block on a condition variable until the owner finishes.
//! - The owner re-entering (setup code touching its own class) returns immediately.
//! - `Failed` is terminal; every later caller gets [`Error::Initialization`] with the
//!   very same shared cause.
//! - A panic escaping the hook marks the class failed before unwinding further.
//!
//! The superclass is initialized before the class's own setup runs. Primitives and
//! arrays never run setup and are marked done on first request.

use std::{
    sync::Arc,
    thread::{self, ThreadId},
};

use parking_lot::{Condvar, Mutex};

use crate::{
    metadata::typesystem::{Class, ClassState},
    runtime::Natives,
    Error, Result,
};

enum InitStatus {
    Pending,
    InProgress(ThreadId),
    Done,
    Failed(Arc<Error>),
}

/// Per-class initialization lock: status behind a mutex plus a condition variable
/// signalled when the owner finishes
pub(crate) struct InitLock {
    status: Mutex<InitStatus>,
    finished: Condvar,
}

impl InitLock {
    pub(crate) fn new() -> Self {
        InitLock {
            status: Mutex::new(InitStatus::Pending),
            finished: Condvar::new(),
        }
    }

    /// Externally visible state, `None` while nothing has been attempted
    pub(crate) fn state(&self) -> Option<ClassState> {
        match &*self.status.lock() {
            InitStatus::Pending => None,
            InitStatus::InProgress(_) => Some(ClassState::Initializing),
            InitStatus::Done => Some(ClassState::Initialized),
            InitStatus::Failed(_) => Some(ClassState::Erroneous),
        }
    }

    fn finish(&self, outcome: std::result::Result<(), Arc<Error>>) {
        let mut status = self.status.lock();
        *status = match outcome {
            Ok(()) => InitStatus::Done,
            Err(cause) => InitStatus::Failed(cause),
        };
        self.finished.notify_all();
    }
}

/// Marks the class failed if the owning thread unwinds out of the setup hook
struct OwnerGuard<'a> {
    class: &'a Class,
    armed: bool,
}

impl OwnerGuard<'_> {
    fn complete(mut self, outcome: std::result::Result<(), Arc<Error>>) {
        self.armed = false;
        self.class.init.finish(outcome);
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(class = %self.class.name(), "static initializer panicked");
            self.class.init.finish(Err(Arc::new(Error::Error(format!(
                "static initializer of {} panicked",
                self.class.name()
            )))));
        }
    }
}

impl Class {
    fn initialization_error(&self, cause: Arc<Error>) -> Error {
        Error::Initialization {
            class: self.name().to_string(),
            cause,
        }
    }

    /// Run the static setup of this class (and its superclasses) if it has not run yet.
    ///
    /// Blocks while another thread is initializing the class. Returns immediately when
    /// called re-entrantly by the thread that is running the setup.
    ///
    /// # Errors
    /// Returns linking failures unchanged, and [`Error::Initialization`] if this class
    /// or one of its superclasses failed its setup, now or in an earlier attempt.
    pub fn initialize(&self, natives: &dyn Natives) -> Result<()> {
        if self.is_primitive() || self.is_array() {
            let mut status = self.init.status.lock();
            if matches!(*status, InitStatus::Pending) {
                *status = InitStatus::Done;
            }
            return Ok(());
        }

        self.ensure_linked()?;

        let current = thread::current().id();
        {
            let mut status = self.init.status.lock();
            loop {
                match &*status {
                    InitStatus::Done => return Ok(()),
                    InitStatus::Failed(cause) => return Err(self.initialization_error(cause.clone())),
                    InitStatus::InProgress(owner) if *owner == current => {
                        tracing::trace!(class = %self.name(), "re-entrant initialization request");
                        return Ok(());
                    }
                    InitStatus::InProgress(_) => self.init.finished.wait(&mut status),
                    InitStatus::Pending => {
                        *status = InitStatus::InProgress(current);
                        break;
                    }
                }
            }
        }

        tracing::debug!(class = %self.name(), "initializing class");
        let guard = OwnerGuard {
            class: self,
            armed: true,
        };

        let outcome = match self.superclass() {
            Some(super_class) => super_class.initialize(natives),
            None => Ok(()),
        }
        .and_then(|()| natives.run_initializer(self));

        match outcome {
            Ok(()) => {
                guard.complete(Ok(()));
                tracing::debug!(class = %self.name(), "initialized class");
                Ok(())
            }
            Err(error) => {
                let cause = match error {
                    Error::Initialization { cause, .. } => cause,
                    other => Arc::new(other),
                };
                tracing::warn!(class = %self.name(), error = %cause, "class initialization failed");
                guard.complete(Err(cause.clone()));
                Err(self.initialization_error(cause))
            }
        }
    }

    /// Returns `true` once static setup has completed successfully
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state() == ClassState::Initialized
    }
}
