/// Version tag mixed into every pattern hash. Bump when the canonical form changes.
pub const PATTERN_HASH_VERSION: &str = "bimclass.pattern.v1";

/// Hex length of a blake3 pattern hash.
pub const PATTERN_HASH_HEX_LEN: usize = 64;

/// Upper bound accepted for `aggregation.sample_size`.
pub const MAX_SAMPLE_SIZE: usize = 1_000;

/// Upper bound accepted for `hashing.precision`.
pub const MAX_HASH_PRECISION: u32 = 6;

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "BIMCLASS_LOG";
