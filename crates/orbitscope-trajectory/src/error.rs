//! Trajectory construction and loading errors.

use std::path::PathBuf;

/// Errors that reject a whole trajectory. No partial object is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    /// Neither the canonical `x/y/z/t` arrays nor legacy `segs` were present.
    #[error("trajectory must contain 'x', 'y', 'z', 't' arrays or a 'segs' list")]
    MissingArrays,

    /// A per-sample array does not match the sample count.
    #[error("'{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending array.
        field: &'static str,
        /// Sample count implied by `t`.
        expected: usize,
        /// Entries actually present.
        actual: usize,
    },

    /// Fewer samples than the representation needs.
    #[error("need at least {required} samples, got {actual}")]
    TooFewSamples {
        /// Minimum sample count.
        required: usize,
        /// Samples present.
        actual: usize,
    },

    /// Sample times are not strictly increasing.
    #[error("time at sample {index} ({current}) does not increase past {previous}")]
    NonIncreasingTime {
        /// Index of the offending sample.
        index: usize,
        /// Time of the preceding sample.
        previous: f64,
        /// Time of the offending sample.
        current: f64,
    },

    /// A time or coordinate is NaN or infinite.
    #[error("non-finite value at sample {index}")]
    NonFinite {
        /// Index of the offending sample.
        index: usize,
    },

    /// A looping cubic spline was requested with too few samples.
    #[error("periodic spline needs at least 3 samples, got {0}")]
    PeriodicTooFewSamples(usize),

    /// Only some samples carry a color.
    #[error("colors must be given for every sample or none")]
    PartialColors,

    /// A color entry does not have four components.
    #[error("color at sample {index} has {len} components, expected 4")]
    InvalidColor {
        /// Index of the offending color.
        index: usize,
        /// Components present.
        len: usize,
    },

    /// A delta-v annotation is malformed.
    #[error("{0} must be a list of 3 values")]
    InvalidDeltaV(&'static str),

    /// Per-sample delta-v arrays were only partially supplied.
    #[error("dvx, dvy and dvz must be given together")]
    PartialDeltaV,

    /// Analytic orbit parameters are unusable.
    #[error("invalid analytic orbit: {0}")]
    InvalidAnalytic(&'static str),

    /// The document is not valid JSON or has the wrong shape.
    #[error("malformed trajectory json: {0}")]
    Json(#[from] serde_json::Error),

    /// The trajectory file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
