//! Worker pool, queue, and batching parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PipelineConfig {
    /// Compute worker count; 0 means use the CPU count, capped by
    /// `max_workers`.
    #[serde(default)]
    pub workers: usize,

    /// Upper bound on compute workers regardless of CPU count.
    #[serde(default = "default_max_workers")]
    #[validate(range(min = 1, max = 256))]
    pub max_workers: usize,

    /// Bounded work-queue capacity.
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, max = 65536))]
    pub queue_capacity: usize,

    /// Seconds ingestion waits on a full queue before dropping a file.
    #[serde(default = "default_queue_push_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub queue_push_timeout_secs: u64,

    /// Documents accumulated per worker before a batch flush.
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1, max = 10000))]
    pub batch_size: usize,

    /// Soft per-document body size limit in megabytes.
    #[serde(default = "default_memory_limit_mb")]
    #[validate(range(min = 1, max = 4096))]
    pub memory_limit_mb: usize,

    /// Soft per-document processing timeout in seconds; 0 disables it.
    #[serde(default)]
    pub document_timeout_secs: u64,
}

fn default_max_workers() -> usize {
    16
}

fn default_queue_capacity() -> usize {
    100
}

fn default_queue_push_timeout_secs() -> u64 {
    5
}

fn default_batch_size() -> usize {
    20
}

fn default_memory_limit_mb() -> usize {
    100
}

impl PipelineConfig {
    /// Effective compute worker count after applying defaults and caps.
    pub fn resolved_workers(&self) -> usize {
        let requested = if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        };
        requested.clamp(1, self.max_workers)
    }

    pub fn memory_limit_bytes(&self) -> usize {
        self.memory_limit_mb * 1024 * 1024
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            max_workers: default_max_workers(),
            queue_capacity: default_queue_capacity(),
            queue_push_timeout_secs: default_queue_push_timeout_secs(),
            batch_size: default_batch_size(),
            memory_limit_mb: default_memory_limit_mb(),
            document_timeout_secs: 0,
        }
    }
}
