//! Simulation error types.
//!
//! The running core itself never fails; only the run setup and waveform
//! output can produce a [`SimError`].

use std::io;

use bridge_common::FormatError;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Neither a frame count nor a time limit was given, so the run would
    /// never stop.
    #[error("simulation has no stop condition (set a frame count or a time limit)")]
    NoStopCondition,

    /// The core's timing profile does not fit its timing table.
    #[error("invalid timing profile: {0}")]
    Format(#[from] FormatError),

    /// A waveform value change referenced a signal that was never registered.
    #[error("unregistered waveform signal '{0}'")]
    UnregisteredSignal(&'static str),

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stop_condition_display() {
        assert_eq!(
            SimError::NoStopCondition.to_string(),
            "simulation has no stop condition (set a frame count or a time limit)"
        );
    }

    #[test]
    fn unregistered_signal_display() {
        let e = SimError::UnregisteredSignal("lv_o");
        assert_eq!(e.to_string(), "unregistered waveform signal 'lv_o'");
    }

    #[test]
    fn format_display() {
        let e = SimError::Format(FormatError::ZeroParameter("H_SYNC"));
        assert!(e.to_string().starts_with("invalid timing profile: "));
    }

    #[test]
    fn waveform_io_display() {
        let e = SimError::WaveformIo(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(e.to_string().contains("waveform I/O error"));
    }
}
