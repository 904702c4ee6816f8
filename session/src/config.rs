use race_core::Params;

/// Session-level tuning, separate from the per-tick race constants
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub seed: u64,                        // Root seed for every generated stage
    pub sync_interval_ticks: u64,         // SYNC_STATE cadence
    pub track_transfer_timeout_ticks: u64, // Joiner gives up after this many ticks
    pub commentary_step: u32,             // Score gap between commentary requests
    pub commentary_min_interval_ms: u64,
    pub commentary_rate_limit_backoff_ms: u64,
    pub fixed_dt: f64,
    pub max_frame_dt: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            sync_interval_ticks: 2,
            track_transfer_timeout_ticks: 600,
            commentary_step: 600,
            commentary_min_interval_ms: 20_000,
            commentary_rate_limit_backoff_ms: 40_000,
            fixed_dt: Params::FIXED_DT,
            max_frame_dt: Params::MAX_FRAME_DT,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
