use std::path::PathBuf;
use thiserror::Error;

/// Structural failures of the integration layer.
///
/// Data conditions (NaN, negative rates) are never reported here; they flow
/// through to the output unchanged.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("altitude and rate must have the same length (altitude: {altitude}, rate: {rate})")]
    ShapeMismatch { altitude: usize, rate: usize },

    #[error("altitude grid is not strictly monotonic at index {index}")]
    NonMonotonic { index: usize },

    #[error("{fluxes} energy fluxes but {channels} dissipation channels")]
    ChannelCount { fluxes: usize, channels: usize },

    #[error("channel {channel} has {found} samples, expected {expected}")]
    ChannelShape {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("failed to parse physical constants: {0}")]
    ConstantsParse(String),

    #[error("failed to read constants file {path}: {source}")]
    ConstantsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
