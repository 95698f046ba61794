//! Job configuration.

use serde::{Deserialize, Serialize};
use trellis_common::types::JobId;
use trellis_common::utils::error::{Error, Result};

/// Identifier, name, and parallelism of a job.
///
/// Immutable once built; a [`JobRequest`](super::JobRequest) owns its copy.
/// Deserialization applies the same checks as the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJobConfig")]
pub struct JobConfig {
    job_id: JobId,
    name: String,
    workers: u32,
}

impl JobConfig {
    /// Key for the job identifier in [`JobConfig::from_kv`].
    pub const KEY_JOB_ID: &'static str = "job_id";
    /// Key for the job name in [`JobConfig::from_kv`].
    pub const KEY_JOB_NAME: &'static str = "job_name";
    /// Key for the worker count in [`JobConfig::from_kv`].
    pub const KEY_WORKERS: &'static str = "workers";

    /// Creates a single-worker configuration with a generated name.
    #[must_use]
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            name: format!("job_{}", job_id.as_u64()),
            workers: 1,
        }
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `workers` is zero.
    pub fn with_workers(mut self, workers: u32) -> Result<Self> {
        if workers == 0 {
            return Err(Error::invalid_config("worker count must be at least 1"));
        }
        self.workers = workers;
        Ok(self)
    }

    /// Builds a configuration from a flat `[key, value, key, value, ..]` list.
    ///
    /// Recognised keys are `job_id`, `job_name`, and `workers`. Missing keys
    /// keep the defaults of [`JobConfig::new`] with job id 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an odd-length list, an
    /// unknown key, an unparsable number, or a zero worker count.
    pub fn from_kv<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        if pairs.len() % 2 != 0 {
            return Err(Error::invalid_config(format!(
                "key/value list has odd length {}",
                pairs.len()
            )));
        }

        let mut job_id = JobId::default();
        let mut name = None;
        let mut workers = 1;
        for pair in pairs.chunks_exact(2) {
            let (key, value) = (pair[0].as_ref(), pair[1].as_ref());
            match key {
                Self::KEY_JOB_ID => {
                    job_id = JobId::new(parse_number(key, value)?);
                }
                Self::KEY_JOB_NAME => name = Some(value.to_string()),
                Self::KEY_WORKERS => {
                    workers = u32::try_from(parse_number(key, value)?).map_err(|_| {
                        Error::invalid_config(format!("`{key}` out of range: {value}"))
                    })?;
                }
                other => {
                    return Err(Error::invalid_config(format!(
                        "unknown configuration key `{other}`"
                    )));
                }
            }
        }

        let config = Self::new(job_id).with_workers(workers)?;
        Ok(match name {
            Some(name) => config.with_name(name),
            None => config,
        })
    }

    /// Returns the job identifier.
    #[must_use]
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the job name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of workers.
    #[must_use]
    pub fn workers(&self) -> u32 {
        self.workers
    }
}

#[derive(Deserialize)]
struct RawJobConfig {
    job_id: JobId,
    name: String,
    workers: u32,
}

impl TryFrom<RawJobConfig> for JobConfig {
    type Error = Error;

    fn try_from(raw: RawJobConfig) -> Result<Self> {
        Self::new(raw.job_id)
            .with_name(raw.name)
            .with_workers(raw.workers)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::invalid_config(format!("`{key}` is not a number ({value}): {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JobConfig::new(JobId::new(9));
        assert_eq!(config.job_id(), JobId::new(9));
        assert_eq!(config.name(), "job_9");
        assert_eq!(config.workers(), 1);
    }

    #[test]
    fn test_from_kv() {
        let config =
            JobConfig::from_kv(&["job_id", "42", "job_name", "friends", "workers", "4"]).unwrap();
        assert_eq!(config.job_id(), JobId::new(42));
        assert_eq!(config.name(), "friends");
        assert_eq!(config.workers(), 4);
    }

    #[test]
    fn test_from_kv_odd_length() {
        let err = JobConfig::from_kv(&["job_id", "1", "workers"]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_from_kv_rejects_bad_values() {
        assert!(JobConfig::from_kv(&["workers", "0"]).is_err());
        assert!(JobConfig::from_kv(&["workers", "four"]).is_err());
        assert!(JobConfig::from_kv(&["workers", "99999999999"]).is_err());
        assert!(JobConfig::from_kv(&["batch", "1"]).is_err());
    }

    #[test]
    fn test_from_kv_empty() {
        let config = JobConfig::from_kv::<&str>(&[]).unwrap();
        assert_eq!(config, JobConfig::new(JobId::default()));
    }

    #[test]
    fn test_deserialize_rejects_zero_workers() {
        let config = JobConfig::new(JobId::new(3)).with_name("zero");
        let mut json = serde_json::to_value(&config).unwrap();
        assert_eq!(serde_json::from_value::<JobConfig>(json.clone()).unwrap(), config);

        json["workers"] = 0.into();
        let err = serde_json::from_value::<JobConfig>(json).unwrap_err();
        assert!(err.to_string().contains("worker count must be at least 1"));
    }

    #[test]
    fn test_decode_frame_rejects_zero_workers() {
        use crate::job::JobRequest;
        use crate::plan::SinkDef;

        let config = JobConfig {
            job_id: JobId::new(4),
            name: "zero".to_string(),
            workers: 0,
        };
        let request = JobRequest::new(config, bytes::Bytes::new(), Vec::new(), SinkDef::default());
        let frame = request.encode_frame().unwrap();

        let err = JobRequest::decode_frame(&frame).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().contains("worker count must be at least 1"));
    }
}
