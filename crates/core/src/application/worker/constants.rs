// Worker constants (No magic values)

/// Exponential backoff growth factor between transport retries
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Jitter applied to each backoff delay (±10%)
pub const BACKOFF_JITTER_RATIO: f64 = 0.1;

/// First worker id (ids are 1-based in logs)
pub const FIRST_WORKER_ID: usize = 1;
