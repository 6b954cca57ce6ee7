use crate::{Real, Time};

///////////////////////////////////////////////////////////////////////////////
// Default params for a dengue outbreak
///////////////////////////////////////////////////////////////////////////////

pub const TRANSMISSION_RATE: Real = 0.4;
pub const LATENT_PERIOD: Real = 5.5;
pub const INFECTIOUS_PERIOD: Real = 7.0;
pub const INCUBATION_RATE: Real = 1.0 / LATENT_PERIOD;
pub const RECOVERY_RATE: Real = 1.0 / INFECTIOUS_PERIOD;
pub const POPULATION: Real = 1_000_000.0;
pub const INITIAL_EXPOSED: Real = 0.0;
pub const INITIAL_INFECTIOUS: Real = 100.0;
pub const INITIAL_RECOVERED: Real = 0.0;
pub const DURATION_DAYS: Time = 100;

/// Prevalence (in individuals) below which an epidemic is considered over.
pub const DECAY_THRESHOLD: Real = 1.0;
