// Single source of truth for all default values.

// --- Aggregation ---
pub const DEFAULT_SAMPLE_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

// --- Hashing ---
pub const DEFAULT_HASH_PRECISION: u32 = 2;

// --- Cache ---
pub const DEFAULT_LOCAL_CAPACITY: u64 = 100_000;
pub const DEFAULT_LOCAL_IDLE_SECS: u64 = 1_800; // 30 minutes of inactivity
pub const DEFAULT_SHARED_TTL_SECS: u64 = 86_400; // 24 hours from write
pub const DEFAULT_LEASE_TTL_SECS: u64 = 60;
pub const DEFAULT_LEASE_POLL_INTERVAL_MS: u64 = 250;
pub const DEFAULT_LEASE_WAIT_SECS: u64 = 150; // longer than one classifier timeout

// --- Classification ---
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 120;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
