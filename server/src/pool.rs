use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use smol::{
    Executor, Timer,
    channel::{self, Sender},
    lock::Semaphore,
};
use tracing::warn;

use crate::error::ServerError;

/// Fixed set of worker threads driving a shared executor.
///
/// At most `size` submitted tasks run at once; the rest wait for a permit
/// inside the pool, so submitting never blocks the caller. The pool tracks
/// in-flight tasks so shutdown can wait for them.
pub struct WorkerPool {
    executor: Arc<Executor<'static>>,
    permits: Arc<Semaphore>,
    task_count: Arc<AtomicUsize>,
    accepting_tasks: Arc<AtomicBool>,
    stop: Option<Sender<()>>,
    threads: Vec<JoinHandle<()>>,
}

struct TaskGuard(Arc<AtomicUsize>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerPool {
    pub fn new(size: usize) -> Result<Self, ServerError> {
        let size = size.max(1);
        let executor = Arc::new(Executor::new());
        let (stop, stopped) = channel::bounded::<()>(1);

        let mut threads = Vec::with_capacity(size);
        for index in 0..size {
            let executor = Arc::clone(&executor);
            let stopped = stopped.clone();
            let handle = thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(move || {
                    smol::block_on(executor.run(async {
                        let _ = stopped.recv().await;
                    }))
                })
                .map_err(ServerError::Worker)?;
            threads.push(handle);
        }

        Ok(Self {
            executor,
            permits: Arc::new(Semaphore::new(size)),
            task_count: Arc::new(AtomicUsize::new(0)),
            accepting_tasks: Arc::new(AtomicBool::new(true)),
            stop: Some(stop),
            threads,
        })
    }

    pub fn size(&self) -> usize {
        self.threads.len()
    }

    /// Queues `task`. Returns `false` once the pool stopped accepting work.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.accepting_tasks.load(Ordering::SeqCst) {
            return false;
        }

        self.task_count.fetch_add(1, Ordering::SeqCst);
        let guard = TaskGuard(Arc::clone(&self.task_count));
        let permits = Arc::clone(&self.permits);

        self.executor
            .spawn(async move {
                let _guard = guard;
                let _permit = permits.acquire_arc().await;
                task.await;
            })
            .detach();
        true
    }

    /// Stops accepting tasks and waits until every submitted task finished.
    pub async fn wait(&self) {
        self.accepting_tasks.store(false, Ordering::SeqCst);

        while self.task_count.load(Ordering::SeqCst) > 0 {
            Timer::after(Duration::from_millis(10)).await;
        }
    }

    /// Submitted tasks that have not finished, queued ones included.
    pub fn active_tasks(&self) -> usize {
        self.task_count.load(Ordering::SeqCst)
    }

    pub fn is_accepting_tasks(&self) -> bool {
        self.accepting_tasks.load(Ordering::SeqCst)
    }

    /// Stops the worker threads. Tasks still queued are dropped.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.accepting_tasks.store(false, Ordering::SeqCst);
        drop(self.stop.take());

        for handle in self.threads.drain(..) {
            let name = handle.thread().name().map(str::to_string);
            if handle.join().is_err() {
                warn!("Worker {:?} panicked", name);
            }
        }
    }
}
