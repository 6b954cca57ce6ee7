//! Epidemiological parameters.
//!
//! Parameters come in two flavors: [`ParamValues`] is a plain bag of numbers
//! that may hold anything (it is what configuration files deserialize into)
//! and [`ParamSet`] is the validated, immutable version consumed by the
//! integrator. The only way to obtain a `ParamSet` is through validation.
mod constants;
mod param_set;

pub use constants::*;
pub use param_set::*;
