use std::{
    collections::VecDeque,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use txrelay::dispatch::PushBackend;

/// Push backend that records every call and answers from a script.
///
/// Scripted answers are consumed first; once exhausted the backend falls back
/// to its default answer.
#[derive(Debug)]
pub struct RecordingBackend {
    name: String,
    default: bool,
    script: Mutex<VecDeque<bool>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    pushed: Mutex<Vec<String>>,
}

impl RecordingBackend {
    /// Backend that always answers `accept`.
    pub fn new(name: &str, accept: bool) -> Self {
        Self {
            name: name.to_owned(),
            default: accept,
            script: Mutex::new(VecDeque::new()),
            delay: None,
            calls: AtomicUsize::new(0),
            pushed: Mutex::new(Vec::new()),
        }
    }

    /// Backend that accepts every push.
    pub fn accepting(name: &str) -> Arc<Self> { Arc::new(Self::new(name, true)) }

    /// Backend that refuses every push.
    pub fn refusing(name: &str) -> Arc<Self> { Arc::new(Self::new(name, false)) }

    /// Answer with `answers` in order before falling back to the default.
    #[must_use]
    pub fn with_script(self, answers: impl IntoIterator<Item = bool>) -> Self {
        *self.script.lock().expect("script lock") = answers.into_iter().collect();
        self
    }

    /// Sleep before answering, to widen race windows.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of push calls received.
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    /// Transactions received, in call order.
    pub fn pushed(&self) -> Vec<String> { self.pushed.lock().expect("pushed lock").clone() }
}

#[async_trait]
impl PushBackend for RecordingBackend {
    fn name(&self) -> &str { &self.name }

    async fn push(&self, raw_tx: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pushed
            .lock()
            .expect("pushed lock")
            .push(raw_tx.to_owned());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.lock().expect("script lock").pop_front();
        scripted.unwrap_or(self.default)
    }
}
