//! Error types for format selection and timing-table validation.

/// Errors raised while selecting a format variant or building a timing table.
///
/// These are configuration-time errors: a core is never instantiated from an
/// invalid variant, so none of them can occur while a simulation is running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The format name is not one of the supported formats.
    #[error("unsupported video format '{name}' (supported: {supported})")]
    UnsupportedFormat {
        /// The rejected format name.
        name: String,
        /// Comma-separated list of supported format names.
        supported: String,
    },

    /// The lane count is not supported.
    #[error("unsupported lane count {0} (supported: 2, 4)")]
    UnsupportedLanes(u8),

    /// A timing parameter that must be positive is zero.
    #[error("timing parameter {0} must be positive")]
    ZeroParameter(&'static str),

    /// A total exceeds what the 12-bit pixel/line counters can hold.
    #[error("{name} = {value} exceeds the counter range (max {max})")]
    CounterOverflow {
        /// The parameter name (`H_TOTAL` or `V_TOTAL`).
        name: &'static str,
        /// The offending value.
        value: u32,
        /// The largest representable value.
        max: u16,
    },

    /// A variant profile reloads a counter past its total.
    #[error("{name} reload value {value} is outside 1..={total}")]
    ReloadOutOfRange {
        /// Which counter (`pixel` or `line`).
        name: &'static str,
        /// The computed reload value.
        value: u32,
        /// The counter's total.
        total: u16,
    },
}
