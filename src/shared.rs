use crate::config::SessionConfig;
use crate::dataset::{Dataset, Point};
use crate::error::Result;
use crate::init::InitMethod;
use crate::session::{ConvergeReport, InitReport, Session, SessionState, Snapshot, StepReport};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to a [`Session`] that can be shared across threads.
///
/// Each operation holds the lock for its full duration, so concurrent calls on
/// the same session are applied one after another.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new(Session::new())
    }
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn with_config(config: SessionConfig) -> Result<Self> {
        Ok(Self::new(Session::with_config(config)?))
    }

    /// Run several operations under one lock acquisition
    pub fn with<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut session = self.inner.lock();
        f(&mut session)
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().snapshot()
    }

    pub fn generate_dataset(&self, num_points: usize) -> Result<Snapshot> {
        self.inner.lock().generate_dataset(num_points)
    }

    pub fn load_dataset(&self, dataset: Dataset) -> Result<Snapshot> {
        self.inner.lock().load_dataset(dataset)
    }

    pub fn initialize(
        &self,
        k: usize,
        method: InitMethod,
        manual: Option<Vec<Point>>,
    ) -> Result<InitReport> {
        self.inner.lock().initialize(k, method, manual)
    }

    pub fn step(&self) -> Result<StepReport> {
        self.inner.lock().step()
    }

    pub fn converge(&self) -> Result<ConvergeReport> {
        self.inner.lock().converge()
    }

    pub fn reset(&self) -> Snapshot {
        self.inner.lock().reset()
    }
}
