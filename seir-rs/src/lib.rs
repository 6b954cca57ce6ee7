//! Deterministic SEIR compartmental model.
//!
//! A validated [`ParamSet`](params::ParamSet) is integrated by an
//! [`Integrator`](sim::Integrator) into a daily [`Trajectory`](sim::Trajectory),
//! which is then summarized by [`Metrics`](metrics::Metrics).
//!
//! ```
//! use seir::prelude::*;
//!
//! let params = ParamSet::new(0.3, 0.2, 0.1, 10_000.0, 100.0, 0.0, 0.0, 100).unwrap();
//! let trajectory = Integrator::default().run(&params).unwrap();
//! let metrics = Metrics::from_trajectory(&params, &trajectory).unwrap();
//! assert_eq!(trajectory.len(), 101);
//! assert_eq!(metrics.r0(), 0.3 / 0.1);
//! ```
pub mod error;
pub mod linelist;
pub mod metrics;
pub mod models;
pub mod params;
pub mod prelude;
pub mod scenario;
pub mod sim;

pub use crate::error::{Error, Result};

/// Basic representation of time. Trajectories are sampled once per day and
/// days are counted from 0.
pub type Time = u32;

/// Base Real type used by this crate. Uses an alias to easily change precision
/// if necessary.
pub type Real = f64;

/// Age of a synthetic patient.
pub type Age = u8;
