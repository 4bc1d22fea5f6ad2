//! Worker pool for background fetch and parse jobs
//!
//! Work-stealing deques: new jobs go to a global injector, idle workers
//! steal from each other. Fetches are never cancelled once dispatched -
//! a completed-but-superseded fetch just warms the cache for a later
//! re-selection - so there is no stale-job filtering here.

use crossbeam::deque::{Injector, Worker};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Workers {
    pub fn new(num_threads: usize) -> Self {
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut locals: Vec<Worker<Job>> = Vec::new();
        let mut stealers = Vec::new();
        let mut handles = Vec::new();

        for _ in 0..num_threads.max(1) {
            let worker: Worker<Job> = Worker::new_fifo();
            stealers.push(worker.stealer());
            locals.push(worker);
        }

        for (worker_id, worker) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let handle = thread::Builder::new()
                .name(format!("visage-worker-{}", worker_id))
                .spawn(move || {
                    trace!("worker {} started", worker_id);

                    loop {
                        if let Some(job) = worker.pop() {
                            job();
                            continue;
                        }

                        if let Some(job) = injector.steal().success() {
                            job();
                            continue;
                        }

                        let mut found_work = false;
                        for stealer in &stealers {
                            if let Some(job) = stealer.steal().success() {
                                job();
                                found_work = true;
                                break;
                            }
                        }

                        if found_work {
                            continue;
                        }

                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }

                        thread::sleep(std::time::Duration::from_millis(1));
                    }

                    trace!("worker {} stopped", worker_id);
                })
                .expect("failed to spawn worker thread");

            handles.push(handle);
        }

        Self {
            injector,
            handles,
            shutdown,
        }
    }

    /// Run a closure on a worker thread. Fire-and-forget; share results
    /// through the part handles or a channel.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(f));
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        use std::time::{Duration, Instant};

        self.shutdown.store(true, Ordering::SeqCst);

        // Bounded join; stragglers die with the process
        let deadline = Instant::now() + Duration::from_millis(500);
        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("worker shutdown timeout, exiting anyway");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }
    }
}
