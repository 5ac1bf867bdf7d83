//! Process-wide engine runtime lifecycle.
//!
//! The runtime is initialized once, before any engine call, and may be shut
//! down once at process exit. It cannot be restarted afterwards.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Ready,
    ShutDown,
}

/// A runtime lifecycle cell.
#[derive(Debug)]
pub struct Runtime {
    state: Mutex<RuntimeState>,
}

impl Runtime {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RuntimeState::Uninitialized),
        }
    }

    pub fn state(&self) -> RuntimeState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `init` on the first call. Later calls are no-ops.
    pub fn initialize_with<F>(&self, init: F) -> EngineResult<()>
    where
        F: FnOnce() -> EngineResult<()>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            RuntimeState::Ready => Ok(()),
            RuntimeState::ShutDown => Err(EngineError::RuntimeShutDown),
            RuntimeState::Uninitialized => {
                init()?;
                *state = RuntimeState::Ready;
                info!("Verification engine runtime initialized");
                Ok(())
            }
        }
    }

    pub fn initialize(&self) -> EngineResult<()> {
        self.initialize_with(|| Ok(()))
    }

    /// Shut down. Returns `false` if the runtime was not ready.
    pub fn shutdown(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let was_ready = *state == RuntimeState::Ready;
        *state = RuntimeState::ShutDown;
        if was_ready {
            debug!("Verification engine runtime shut down");
        }
        was_ready
    }

    pub fn ensure_ready(&self) -> EngineResult<()> {
        match self.state() {
            RuntimeState::Ready => Ok(()),
            RuntimeState::Uninitialized => Err(EngineError::NotInitialized),
            RuntimeState::ShutDown => Err(EngineError::RuntimeShutDown),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Runtime = Runtime::new();

/// The process-wide runtime.
pub fn global() -> &'static Runtime {
    &GLOBAL
}

/// Initialize the process-wide runtime. Idempotent.
pub fn initialize() -> EngineResult<()> {
    GLOBAL.initialize()
}

/// Shut down the process-wide runtime.
pub fn shutdown() -> bool {
    GLOBAL.shutdown()
}

/// Fail unless the process-wide runtime is ready.
pub fn ensure_ready() -> EngineResult<()> {
    GLOBAL.ensure_ready()
}
