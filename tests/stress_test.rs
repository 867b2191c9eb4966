//! Stress tests for the pool. Run with --ignored.

use ctxpool::{wait_all, BackendKind, Config, ContextPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn pool_with(kind: BackendKind, num_threads: usize) -> ContextPool {
    let config = Config::builder()
        .num_threads(num_threads)
        .backend(kind)
        .build()
        .unwrap();
    ContextPool::with_config(config).unwrap()
}

#[test]
#[ignore]
fn stress_many_small_tasks() {
    for kind in [BackendKind::Channel, BackendKind::Locked] {
        let pool = pool_with(kind, 8);
        let sum = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let handles: Vec<_> = (0..10_000)
                .map(|_| {
                    let sum = Arc::clone(&sum);
                    pool.submit(move || {
                        sum.fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap()
                })
                .collect();
            wait_all(handles).unwrap();
        }

        assert_eq!(sum.load(Ordering::Relaxed), 100_000);
        sum.store(0, Ordering::Relaxed);
    }
}

#[test]
#[ignore]
fn stress_resize_churn_under_load() {
    for kind in [BackendKind::Channel, BackendKind::Locked] {
        let pool = Arc::new(pool_with(kind, 4));
        let executed = Arc::new(AtomicUsize::new(0));

        let resizer = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for round in 0..50usize {
                    pool.resize(1 + round % 8).unwrap();
                    thread::sleep(Duration::from_millis(2));
                }
                // End on a size that keeps draining the queue.
                pool.resize(4).unwrap();
            })
        };

        let mut handles = Vec::new();
        for _ in 0..20_000 {
            let executed = Arc::clone(&executed);
            handles.push(
                pool.submit(move || {
                    executed.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap(),
            );
        }

        resizer.join().unwrap();
        wait_all(handles).unwrap();
        assert_eq!(executed.load(Ordering::Relaxed), 20_000);
    }
}

#[test]
#[ignore]
fn stress_context_accounting() {
    #[derive(Default, Clone)]
    struct Tally {
        executed: u64,
    }

    for kind in [BackendKind::Channel, BackendKind::Locked] {
        let config = Config::builder()
            .num_threads(8)
            .backend(kind)
            .build()
            .unwrap();
        let pool: ContextPool<Tally> = ContextPool::with_config(config).unwrap();

        let handles: Vec<_> = (0..50_000)
            .map(|_| pool.submit_with(|tally| tally.executed += 1).unwrap())
            .collect();
        wait_all(handles).unwrap();

        let total: u64 = (0..pool.size())
            .map(|i| pool.get_context(i).unwrap().executed)
            .sum();
        assert_eq!(total, 50_000);
    }
}
