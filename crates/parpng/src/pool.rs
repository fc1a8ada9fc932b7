/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A small fixed size worker pool over scoped threads

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{debug, trace};

use crate::error::PngEncodeErrors;

/// Runs indexed jobs on a fixed number of threads
///
/// Workers claim job indices in increasing order from a shared counter.
/// The first failure stops further claims, jobs already running finish.
/// The pool holds no threads between calls, each [`run`](Self::run) is
/// a scope of its own.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WorkerPool {
    num_threads: usize
}

impl Default for WorkerPool {
    fn default() -> Self {
        WorkerPool::new(0)
    }
}

impl WorkerPool {
    /// Create a pool of `num_threads` workers
    ///
    /// Zero picks the parallelism reported by the OS
    pub fn new(num_threads: usize) -> WorkerPool {
        let num_threads = if num_threads == 0 {
            std::thread::available_parallelism().map_or(1, |x| x.get())
        } else {
            num_threads
        };
        WorkerPool { num_threads }
    }

    pub const fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Run `job(i)` for every `i` in `0..num_jobs`, returning results in index order
    ///
    /// # Errors
    /// The error of the lowest failing index. A job that panics is
    /// reported as [`PngEncodeErrors::InternalWorkerFailure`]. Jobs not
    /// claimed before a failure was observed are skipped.
    pub fn run<T, F>(&self, num_jobs: usize, job: F) -> Result<Vec<T>, PngEncodeErrors>
    where
        T: Send,
        F: Fn(usize) -> Result<T, PngEncodeErrors> + Sync
    {
        let next_job = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);

        let worker = || {
            let mut done = Vec::new();

            while !failed.load(Ordering::Acquire) {
                let index = next_job.fetch_add(1, Ordering::AcqRel);
                if index >= num_jobs {
                    break;
                }
                let result = catch_unwind(AssertUnwindSafe(|| job(index)))
                    .unwrap_or(Err(PngEncodeErrors::InternalWorkerFailure(index)));

                if let Err(err) = &result {
                    debug!("Job {index} failed: {err}");
                    failed.store(true, Ordering::Release);
                }
                done.push((index, result));
            }
            done
        };

        let num_workers = self.num_threads.min(num_jobs);
        let mut finished = Vec::with_capacity(num_jobs);

        if num_workers <= 1 {
            finished.extend(worker());
        } else {
            trace!("Running {num_jobs} jobs on {num_workers} threads");

            std::thread::scope(|s| {
                let handles: Vec<_> = (0..num_workers).map(|_| s.spawn(&worker)).collect();

                for handle in handles {
                    match handle.join() {
                        Ok(results) => finished.extend(results),
                        // the worker died outside a job, blame the job after the last claimed one
                        Err(_) => finished.push((
                            num_jobs,
                            Err(PngEncodeErrors::InternalWorkerFailure(num_jobs))
                        ))
                    }
                }
            });
        }
        finished.sort_unstable_by_key(|(index, _)| *index);

        let mut output = Vec::with_capacity(finished.len());
        for (_, result) in finished {
            output.push(result?);
        }
        if output.len() != num_jobs {
            // only reachable when a failure was recorded above
            return Err(PngEncodeErrors::InternalWorkerFailure(output.len()));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::WorkerPool;
    use crate::error::PngEncodeErrors;

    #[test]
    fn results_come_back_in_order() {
        for threads in [1, 2, 3, 8] {
            let pool = WorkerPool::new(threads);
            let out = pool.run(50, |i| Ok(i * i)).unwrap();

            assert_eq!(out, (0..50).map(|i| i * i).collect::<Vec<_>>());
        }
    }

    #[test]
    fn zero_jobs() {
        let out: Vec<u8> = WorkerPool::new(4).run(0, |_| Ok(1)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn lowest_failing_index_wins() {
        for threads in [1, 4] {
            let err = WorkerPool::new(threads)
                .run(20, |i| {
                    if i == 7 || i == 12 {
                        Err(PngEncodeErrors::InvalidConfig(if i == 7 { "seven" } else { "twelve" }))
                    } else {
                        Ok(i)
                    }
                })
                .unwrap_err();

            assert!(matches!(err, PngEncodeErrors::InvalidConfig("seven")), "{err:?}");
        }
    }

    #[test]
    fn panics_become_worker_failures() {
        for threads in [1, 3] {
            let err = WorkerPool::new(threads)
                .run(10, |i| {
                    if i == 4 {
                        panic!("band exploded");
                    }
                    Ok(i)
                })
                .unwrap_err();

            assert!(matches!(err, PngEncodeErrors::InternalWorkerFailure(4)));
        }
    }

    #[test]
    fn failure_stops_new_claims() {
        let started = AtomicUsize::new(0);
        let _ = WorkerPool::new(1).run(100, |i| {
            started.fetch_add(1, Ordering::Relaxed);
            if i == 2 {
                Err(PngEncodeErrors::InvalidConfig("stop"))
            } else {
                Ok(())
            }
        });
        assert_eq!(started.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn zero_threads_means_available_parallelism() {
        assert!(WorkerPool::new(0).num_threads() >= 1);
    }
}
