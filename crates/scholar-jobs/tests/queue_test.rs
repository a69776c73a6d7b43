//! Job queue lifecycle tests with stub executors.

use async_trait::async_trait;
use scholar_core::{
    ErrorKind, JobId, Pid, RefreshContext, RefreshStudentsRequest, RefreshSummary, Result,
    ScholarError,
};
use scholar_jobs::{
    Delivery, JobExecutor, JobPayload, JobQueue, JobQueueConfig, JobStatus, Subscription,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Reports each step, then succeeds or fails.
struct Scripted {
    steps: Vec<&'static str>,
    fail: bool,
}

#[async_trait]
impl JobExecutor for Scripted {
    async fn execute(&self, _payload: &JobPayload, ctx: &RefreshContext) -> Result<RefreshSummary> {
        for step in &self.steps {
            ctx.report(*step);
        }
        if self.fail {
            return Err(ScholarError::invalid("period range starts after it ends"));
        }
        Ok(RefreshSummary {
            created: self.steps.len() as u32,
            ..RefreshSummary::default()
        })
    }
}

/// Runs until its token fires.
struct UntilCancelled {
    succeed_anyway: bool,
}

#[async_trait]
impl JobExecutor for UntilCancelled {
    async fn execute(&self, _payload: &JobPayload, ctx: &RefreshContext) -> Result<RefreshSummary> {
        ctx.report("waiting");
        ctx.cancel_token().cancelled().await;
        if self.succeed_anyway {
            Ok(RefreshSummary::default())
        } else {
            Err(ScholarError::cancelled("refresh students"))
        }
    }
}

/// Runs until the gate opens.
struct Gated {
    gate: Arc<Notify>,
}

#[async_trait]
impl JobExecutor for Gated {
    async fn execute(&self, _payload: &JobPayload, _ctx: &RefreshContext) -> Result<RefreshSummary> {
        self.gate.notified().await;
        Ok(RefreshSummary::default())
    }
}

/// Counts executions that ran to completion.
struct Counting {
    finished: Arc<AtomicUsize>,
}

#[async_trait]
impl JobExecutor for Counting {
    async fn execute(&self, _payload: &JobPayload, _ctx: &RefreshContext) -> Result<RefreshSummary> {
        tokio::task::yield_now().await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(RefreshSummary::default())
    }
}

struct Panicking;

#[async_trait]
impl JobExecutor for Panicking {
    async fn execute(&self, _payload: &JobPayload, _ctx: &RefreshContext) -> Result<RefreshSummary> {
        panic!("executor bug");
    }
}

fn payload() -> JobPayload {
    JobPayload::RefreshStudents(RefreshStudentsRequest {
        start_pid: Pid::new(100),
        n: 3,
        purge: false,
    })
}

fn queue(executor: impl JobExecutor + 'static) -> JobQueue {
    queue_with(executor, JobQueueConfig::default())
}

fn queue_with(executor: impl JobExecutor + 'static, config: JobQueueConfig) -> JobQueue {
    JobQueue::new(Arc::new(executor), config)
}

/// Every status until the feed ends, skipping keep-alives.
async fn drain(mut sub: Subscription) -> Vec<JobStatus> {
    let collect = async move {
        let mut statuses = Vec::new();
        while let Some(delivery) = sub.recv().await {
            if let Delivery::Status(status) = delivery {
                statuses.push(status);
            }
        }
        statuses
    };
    tokio::time::timeout(Duration::from_secs(5), collect)
        .await
        .expect("feed ends")
}

/// Wait for the first status matching `pred`.
async fn wait_for(sub: &mut Subscription, pred: impl Fn(&JobStatus) -> bool) {
    let wait = async {
        while let Some(delivery) = sub.recv().await {
            if matches!(&delivery, Delivery::Status(s) if pred(s)) {
                return;
            }
        }
        panic!("feed ended first");
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("status arrives");
}

fn details(statuses: &[JobStatus]) -> Vec<&str> {
    statuses
        .iter()
        .filter_map(|s| match s {
            JobStatus::Running { detail } => Some(detail.as_str()),
            _ => None,
        })
        .collect()
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_job_runs_to_done() {
        let queue = queue(Scripted {
            steps: vec!["pid 100: created", "pid 101: absent"],
            fail: false,
        });
        let job = queue.publish(payload()).unwrap();
        let statuses = drain(queue.subscribe(job.id).unwrap()).await;

        assert_eq!(statuses.first(), Some(&JobStatus::Queued));
        assert_eq!(
            details(&statuses),
            [
                "refresh 3 students from pid 100",
                "pid 100: created",
                "pid 101: absent"
            ]
        );
        assert_eq!(
            statuses.last(),
            Some(&JobStatus::Done {
                summary: RefreshSummary {
                    created: 2,
                    ..RefreshSummary::default()
                }
            })
        );
        assert_eq!(statuses.iter().filter(|s| s.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_terminal() {
        let queue = queue(Scripted {
            steps: vec![],
            fail: true,
        });
        let job = queue.publish(payload()).unwrap();
        let statuses = drain(queue.subscribe(job.id).unwrap()).await;

        match statuses.last() {
            Some(JobStatus::Failed { error }) => assert_eq!(error.kind(), ErrorKind::Invalid),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_executor_fails_job() {
        let queue = queue(Panicking);
        let job = queue.publish(payload()).unwrap();
        let statuses = drain(queue.subscribe(job.id).unwrap()).await;

        match statuses.last() {
            Some(JobStatus::Failed { error }) => assert_eq!(error.kind(), ErrorKind::Internal),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let queue = queue(Scripted {
            steps: vec![],
            fail: false,
        });
        let first = queue.publish(payload()).unwrap();
        let second = queue.publish(payload()).unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_terminal() {
        let queue = queue(Scripted {
            steps: vec!["step"],
            fail: false,
        });
        let job = queue.publish(payload()).unwrap();
        drain(queue.subscribe(job.id).unwrap()).await;

        let statuses = drain(queue.subscribe(job.id).unwrap()).await;
        assert_eq!(statuses.len(), 1);
        assert!(matches!(statuses[0], JobStatus::Done { .. }));
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let queue = queue(Scripted {
            steps: vec![],
            fail: false,
        });
        let err = queue.subscribe(JobId::from_raw(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = queue.cancel(JobId::from_raw(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_finished_feeds_are_evicted() {
        let queue = queue_with(
            Scripted {
                steps: vec![],
                fail: false,
            },
            JobQueueConfig {
                finished_retention: 1,
                ..JobQueueConfig::default()
            },
        );
        let first = queue.publish(payload()).unwrap();
        drain(queue.subscribe(first.id).unwrap()).await;
        let second = queue.publish(payload()).unwrap();
        drain(queue.subscribe(second.id).unwrap()).await;

        let err = queue.subscribe(first.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(queue.subscribe(second.id).is_ok());
    }

    #[tokio::test]
    async fn test_keep_alive_while_quiet() {
        let gate = Arc::new(Notify::new());
        let queue = queue_with(
            Gated { gate: gate.clone() },
            JobQueueConfig {
                heartbeat_interval: Duration::from_millis(10),
                ..JobQueueConfig::default()
            },
        );
        let job = queue.publish(payload()).unwrap();
        let mut sub = queue.subscribe(job.id).unwrap();

        wait_for(&mut sub, |s| matches!(s, JobStatus::Running { .. })).await;
        assert_eq!(sub.recv().await, Some(Delivery::KeepAlive));

        gate.notify_one();
        let rest = drain(sub).await;
        assert!(matches!(rest.last(), Some(JobStatus::Done { .. })));
    }
}

mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_running_job() {
        let queue = queue(UntilCancelled {
            succeed_anyway: false,
        });
        let job = queue.publish(payload()).unwrap();
        let mut sub = queue.subscribe(job.id).unwrap();
        wait_for(&mut sub, |s| *s == JobStatus::Running { detail: "waiting".into() }).await;

        queue.cancel(job.id).unwrap();
        let rest = drain(sub).await;
        assert_eq!(rest, [JobStatus::Cancelled]);

        let err = queue.cancel(job.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cancelled_wins_over_success() {
        let queue = queue(UntilCancelled {
            succeed_anyway: true,
        });
        let job = queue.publish(payload()).unwrap();
        queue.cancel(job.id).unwrap();

        let statuses = drain(queue.subscribe(job.id).unwrap()).await;
        assert_eq!(statuses.last(), Some(&JobStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_after_done_is_not_found() {
        let queue = queue(Scripted {
            steps: vec![],
            fail: false,
        });
        let job = queue.publish(payload()).unwrap();
        drain(queue.subscribe(job.id).unwrap()).await;

        let err = queue.cancel(job.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

mod close_tests {
    use super::*;

    #[tokio::test]
    async fn test_close_rejects_new_work() {
        let queue = queue(Scripted {
            steps: vec![],
            fail: false,
        });
        let job = queue.publish(payload()).unwrap();
        queue.close().await.unwrap();
        assert!(queue.is_closed());

        let err = queue.publish(payload()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err = queue.subscribe(job.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        queue.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_waits_for_running_jobs() {
        let gate = Arc::new(Notify::new());
        let queue = queue(Gated { gate: gate.clone() });
        let job = queue.publish(payload()).unwrap();
        let sub = queue.subscribe(job.id).unwrap();

        let closing = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.close().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!closing.is_finished());

        gate.notify_one();
        closing.await.unwrap().unwrap();

        let statuses = drain(sub).await;
        assert!(matches!(statuses.last(), Some(JobStatus::Done { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_close_waits_for_jobs_published_concurrently() {
        let finished = Arc::new(AtomicUsize::new(0));
        let queue = queue(Counting {
            finished: finished.clone(),
        });

        let publishers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut accepted = 0;
                    while queue.publish(payload()).is_ok() {
                        accepted += 1;
                        tokio::task::yield_now().await;
                    }
                    accepted
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close().await.unwrap();
        let finished_at_close = finished.load(Ordering::SeqCst);

        let mut accepted = 0;
        for publisher in publishers {
            accepted += publisher.await.unwrap();
        }
        assert!(accepted > 0);
        assert_eq!(finished_at_close, accepted);
    }
}
