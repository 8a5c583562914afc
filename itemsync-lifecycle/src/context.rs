//! Cancellation and deadlines for remote calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use itemsync_core::{Operation, Settings, Timeouts};

use crate::error::{LifecycleError, RemoteError};

/// Caller-supplied context for lifecycle operations.
///
/// Cloning shares the cancellation token.
#[derive(Debug, Clone)]
pub struct CallContext {
    timeouts: Timeouts,
    page_size: usize,
    token: CancellationToken,
}

impl CallContext {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            page_size: Settings::default().page_size,
            token: CancellationToken::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeouts: settings.timeouts.clone(),
            page_size: settings.page_size,
            token: CancellationToken::new(),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Start `operation`. Its deadline covers every remote call made
    /// through the returned scope.
    pub fn scope(&self, operation: Operation) -> OpScope {
        let timeout = self.timeouts.for_op(operation);
        OpScope {
            operation,
            timeout,
            deadline: Instant::now() + timeout,
            page_size: self.page_size.max(1),
            token: self.token.clone(),
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(Timeouts::default())
    }
}

/// One running operation: a shared deadline plus the caller's token.
#[derive(Debug, Clone)]
pub struct OpScope {
    operation: Operation,
    timeout: Duration,
    deadline: Instant,
    page_size: usize,
    token: CancellationToken,
}

impl OpScope {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Await a remote call, abandoning it on cancellation or deadline.
    pub async fn call<T, F>(&self, fut: F) -> Result<T, LifecycleError>
    where
        F: Future<Output = Result<T, RemoteError>> + Send,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(LifecycleError::Cancelled { operation: self.operation }),
            result = tokio::time::timeout_at(self.deadline, fut) => match result {
                Ok(outcome) => outcome.map_err(LifecycleError::from),
                Err(_) => Err(LifecycleError::Timeout {
                    operation: self.operation,
                    timeout: self.timeout,
                }),
            },
        }
    }
}
