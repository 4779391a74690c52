//! Construction errors for filter primitives.

/// Errors raised while building a filter.
///
/// These are configuration errors: they surface when a filter is created and
/// never while audio is being processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterError {
    /// A feedback gain with `|g| >= 1` (or a non-finite gain) was requested.
    NumericInstability {
        /// The rejected gain.
        gain: f32,
    },
    /// A delay line of zero samples was requested.
    ZeroDelay,
}

impl core::fmt::Display for FilterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NumericInstability { gain } => {
                write!(f, "feedback gain {gain} is unstable (|g| must be < 1)")
            }
            Self::ZeroDelay => write!(f, "delay length must be at least one sample"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FilterError {}
