//! Background job status in Redis, one key per candidate with a TTL.

use chrono::{DateTime, Utc};
use redis::{Client as RedisClient, ErrorKind, RedisError};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const JOB_STATUS_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Queued,
    Cloning,
    Analyzing,
    Indexing,
    GeneratingQuestions,
    QuestionsReady,
    Evaluating,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub stage: JobStage,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub fn status_key(candidate_id: Uuid) -> String {
    format!("assessor:job:{candidate_id}")
}

#[derive(Clone)]
pub struct JobTracker {
    client: RedisClient,
    ttl_secs: u64,
}

impl JobTracker {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            ttl_secs: JOB_STATUS_TTL_SECS,
        }
    }

    pub async fn set(&self, candidate_id: Uuid, status: &JobStatus) -> Result<(), RedisError> {
        let payload = serde_json::to_string(status).map_err(|e| {
            RedisError::from((ErrorKind::TypeError, "unserializable job status", e.to_string()))
        })?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(status_key(candidate_id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
    }

    pub async fn get(&self, candidate_id: Uuid) -> Result<Option<JobStatus>, RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(status_key(candidate_id))
            .query_async(&mut conn)
            .await?;

        raw.map(|s| {
            serde_json::from_str(&s).map_err(|e| {
                RedisError::from((ErrorKind::TypeError, "invalid job status", e.to_string()))
            })
        })
        .transpose()
    }

    pub async fn clear(&self, candidate_id: Uuid) -> Result<(), RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(status_key(candidate_id))
            .query_async::<_, ()>(&mut conn)
            .await
    }

    /// Records a stage transition. Status is advisory, so Redis failures are only logged.
    pub async fn mark(&self, candidate_id: Uuid, stage: JobStage, error: Option<String>) {
        let status = JobStatus {
            stage,
            error,
            updated_at: Utc::now(),
        };
        if let Err(e) = self.set(candidate_id, &status).await {
            warn!("Could not record job stage {stage:?} for candidate {candidate_id}: {e}");
        }
    }
}
