pub mod math_utils;
pub mod constants;
pub mod constants_parser;
pub mod error;
pub mod altitude_grid;
pub mod cumulative_integration;
pub mod convergence;
pub mod ionization;
pub mod validation;

pub use altitude_grid::{AltitudeGrid, GridOrientation};
pub use constants::PhysicalConstants;
pub use cumulative_integration::{
    column_total, integrate_channels_from_top, integrate_from_top, integrate_grid_from_top,
};
pub use error::{IntegrationError, Result};
pub use ionization::{IonizationColumn, calc_ionization, ionization_rate};
