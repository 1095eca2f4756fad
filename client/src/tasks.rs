//! Frame-driven local tasks for UI-spawned futures
//!
//! Game operations await network replies, but the render loop must keep
//! drawing. The proxy is `Rc` based, so operations run on a tokio `LocalSet`
//! owned by the window thread and driven for one scheduler tick per frame.
//! The network driver lives on a separate runtime, so a tick never blocks.

use std::future::Future;
use std::io;
use tokio::runtime::{Builder, Runtime};
use tokio::task::{JoinHandle, LocalSet};

pub struct LocalTasks {
    local: LocalSet,
    runtime: Runtime,
    handles: Vec<JoinHandle<()>>,
}

impl LocalTasks {
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            local: LocalSet::new(),
            runtime,
            handles: Vec::new(),
        })
    }

    pub fn spawn(&mut self, task: impl Future<Output = ()> + 'static) {
        self.handles.push(self.local.spawn_local(task));
    }

    /// Runs every task that is ready to make progress, drops the finished
    /// ones and returns how many are still pending.
    pub fn poll(&mut self) -> usize {
        self.runtime
            .block_on(self.local.run_until(tokio::task::yield_now()));
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
