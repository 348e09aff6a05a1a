//! dBFS gain stage

use tracing::warn;

/// Gain used when the requested value is unusable
pub const DEFAULT_GAIN_DB: f64 = -3.0;

/// Gain applied to offline renders unless overridden
pub const RENDER_GAIN_DB: f64 = -6.0;

/// Convert dBFS to a linear multiplier: `10^(db / 20)`
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Clamp a requested gain to the usable range.
///
/// NaN and positive values fall back to [`DEFAULT_GAIN_DB`]; the stage never
/// amplifies past unity.
pub fn sanitize_gain_db(db: f64) -> f64 {
    if db.is_nan() || db > 0.0 {
        warn!(requested = db, fallback = DEFAULT_GAIN_DB, "gain out of range, using default");
        DEFAULT_GAIN_DB
    } else {
        db
    }
}

/// Single multiplier shared by whatever source is connected
#[derive(Debug, Clone, Copy)]
pub struct GainStage {
    db: f64,
    linear: f64,
}

impl GainStage {
    pub fn new(db: f64) -> Self {
        let db = sanitize_gain_db(db);
        Self {
            db,
            linear: db_to_linear(db),
        }
    }

    /// Set the gain in dBFS, returning the applied linear multiplier
    pub fn set_db(&mut self, db: f64) -> f64 {
        self.db = sanitize_gain_db(db);
        self.linear = db_to_linear(self.db);
        self.linear
    }

    pub fn db(&self) -> f64 {
        self.db
    }

    pub fn linear(&self) -> f64 {
        self.linear
    }

    pub fn apply(&self, sample: f64) -> f64 {
        sample * self.linear
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(DEFAULT_GAIN_DB)
    }
}
