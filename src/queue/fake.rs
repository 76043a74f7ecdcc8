use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::IndexerError;

use super::{AggregateBlockJob, AggregateUserJob, TaskQueue};

#[derive(Default)]
pub struct FakeTaskQueue {
    pub aggregate_block_jobs: Mutex<Vec<AggregateBlockJob>>,
    pub aggregate_user_jobs: Mutex<Vec<AggregateUserJob>>,
}

impl FakeTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for FakeTaskQueue {
    async fn enqueue_aggregate_block(&self, job: AggregateBlockJob, _ttl: Duration) -> Result<(), IndexerError> {
        self.aggregate_block_jobs.lock().unwrap().push(job);
        Ok(())
    }

    async fn enqueue_aggregate_user(&self, job: AggregateUserJob, _ttl: Duration) -> Result<(), IndexerError> {
        self.aggregate_user_jobs.lock().unwrap().push(job);
        Ok(())
    }
}
