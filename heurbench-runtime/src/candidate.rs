use anyhow::{anyhow, Result};
use serde_json::Value;
use std::{
    any::Any,
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};
use thiserror::Error;

/// An externally supplied solving procedure. Receives the instance fields as
/// positional arguments and returns its solution as JSON.
pub trait Candidate: Send + Sync {
    fn call(&self, arguments: &[Value]) -> Result<Value>;
}

impl<F> Candidate for F
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync,
{
    fn call(&self, arguments: &[Value]) -> Result<Value> {
        self(arguments)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CandidateFailure {
    #[error("candidate raised an error: {0}")]
    Raised(String),
    #[error("candidate panicked: {0}")]
    Panicked(String),
    #[error("candidate exceeded its time budget of {limit:?}")]
    TimedOut { limit: Duration },
}

/// Calls a candidate once per case, optionally under a wall-clock budget.
///
/// With a budget the call runs on a worker thread. A worker that overruns is
/// abandoned rather than killed, so a runaway candidate keeps its thread until it
/// returns on its own.
#[derive(Clone)]
pub struct CandidateInvoker {
    candidate: Arc<dyn Candidate>,
    timeout: Option<Duration>,
}

impl CandidateInvoker {
    pub fn new(candidate: Arc<dyn Candidate>) -> Self {
        Self {
            candidate,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn invoke(&self, arguments: Vec<Value>) -> Result<Value, CandidateFailure> {
        let limit = match self.timeout {
            Some(limit) => limit,
            None => return call_guarded(self.candidate.as_ref(), &arguments),
        };

        let (sender, receiver) = mpsc::channel();
        let candidate = Arc::clone(&self.candidate);
        thread::Builder::new()
            .name("candidate".to_string())
            .spawn(move || {
                // receiver is gone once the budget has expired
                let _ = sender.send(call_guarded(candidate.as_ref(), &arguments));
            })
            .map_err(|e| CandidateFailure::Raised(format!("cannot spawn worker: {}", e)))?;

        match receiver.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CandidateFailure::TimedOut { limit }),
            Err(RecvTimeoutError::Disconnected) => Err(CandidateFailure::Panicked(
                "worker exited without a result".to_string(),
            )),
        }
    }
}

fn call_guarded(candidate: &dyn Candidate, arguments: &[Value]) -> Result<Value, CandidateFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| candidate.call(arguments))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(CandidateFailure::Raised(format!("{:#}", e))),
        Err(payload) => Err(CandidateFailure::Panicked(panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Replays previously stored outputs, one per call, in invocation order.
#[derive(Debug, Default)]
pub struct ReplayCandidate {
    outputs: Mutex<VecDeque<Value>>,
}

impl ReplayCandidate {
    pub fn new(outputs: impl IntoIterator<Item = Value>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.outputs.lock().map_or(0, |outputs| outputs.len())
    }
}

impl Candidate for ReplayCandidate {
    fn call(&self, _arguments: &[Value]) -> Result<Value> {
        self.outputs
            .lock()
            .map_err(|_| anyhow!("replay queue is poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow!("no stored output left to replay"))
    }
}
