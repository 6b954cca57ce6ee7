//! Synthetic line lists: one record per new case implied by a trajectory.
//!
//! The number of new cases on day `d >= 1` is the increase of the (truncated)
//! infectious count, `max(0, floor(I(d)) - floor(I(d-1)))`. Each case gets a
//! random time of day, age, severity and location. Generation is fully
//! determined by the seed, so the same trajectory and configuration always
//! produce the same records.
use std::fmt;

use getset::{CopyGetters, Getters};
use log::debug;
use rand::{distributions::WeightedIndex, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ensure_finite, Error, Result},
    sim::Trajectory,
    Age, Real, Time,
};

/// Kilometers per degree of latitude.
const KM_PER_DEGREE: Real = 111.32;

/// Give up on a location after this many rejected samples.
const MAX_LOCATION_ATTEMPTS: usize = 10_000;

/// Clinical severity of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        };
        write!(f, "{}", name)
    }
}

/// Latitude/longitude box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: Real,
    pub max_lat: Real,
    pub min_lon: Real,
    pub max_lon: Real,
}

impl GeoBounds {
    pub fn contains(&self, lat: Real, lon: Real) -> bool {
        self.min_lat <= lat && lat <= self.max_lat && self.min_lon <= lon && lon <= self.max_lon
    }
}

/// Approximate city limits of Colombo, Sri Lanka.
pub const COLOMBO_BOUNDS: GeoBounds = GeoBounds {
    min_lat: 6.85,
    max_lat: 6.98,
    min_lon: 79.82,
    max_lon: 79.90,
};

/// A single synthetic patient.
#[derive(Getters, CopyGetters, Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    /// Sequential identifier: P00001, P00002, ...
    #[getset(get = "pub")]
    id: String,

    #[getset(get_copy = "pub")]
    day: Time,

    #[getset(get_copy = "pub")]
    hour: u8,

    #[getset(get_copy = "pub")]
    minute: u8,

    #[getset(get_copy = "pub")]
    age: Age,

    #[getset(get_copy = "pub")]
    severity: Severity,

    #[getset(get_copy = "pub")]
    latitude: Real,

    #[getset(get_copy = "pub")]
    longitude: Real,
}

/// Configuration of the line list generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineListConfig {
    pub seed: u64,
    pub center_lat: Real,
    pub center_lon: Real,
    pub radius_km: Real,
    pub bounds: GeoBounds,
    pub min_age: Age,
    pub max_age: Age,

    /// Relative weights of mild, moderate and severe cases.
    pub severity_weights: [Real; 3],
}

impl Default for LineListConfig {
    fn default() -> Self {
        LineListConfig {
            seed: 0,
            center_lat: 6.9271,
            center_lon: 79.8612,
            radius_km: 20.0,
            bounds: COLOMBO_BOUNDS,
            min_age: 1,
            max_age: 90,
            severity_weights: [0.70, 0.25, 0.05],
        }
    }
}

impl LineListConfig {
    /// Check that the configuration can produce records.
    pub fn validate(&self) -> Result<()> {
        if ensure_finite("radius_km", self.radius_km)? <= 0.0 {
            return Err(Error::invalid(
                "radius_km",
                format!("must be > 0, got {}", self.radius_km),
            ));
        }
        ensure_finite("center_lat", self.center_lat)?;
        ensure_finite("center_lon", self.center_lon)?;
        let b = &self.bounds;
        for &(field, value) in &[
            ("bounds", b.min_lat),
            ("bounds", b.max_lat),
            ("bounds", b.min_lon),
            ("bounds", b.max_lon),
        ] {
            ensure_finite(field, value)?;
        }
        if !(b.min_lat < b.max_lat && b.min_lon < b.max_lon) {
            return Err(Error::invalid("bounds", "must have min < max on both axes"));
        }
        if !b.contains(self.center_lat, self.center_lon) {
            return Err(Error::invalid("bounds", "must contain the center point"));
        }
        if self.min_age > self.max_age {
            return Err(Error::invalid(
                "min_age",
                format!("must not exceed max_age ({} > {})", self.min_age, self.max_age),
            ));
        }
        WeightedIndex::new(&self.severity_weights)
            .map_err(|e| Error::invalid("severity_weights", e.to_string()))?;
        Ok(())
    }

    /// Generate one record per new case in the trajectory.
    ///
    /// All records are held in memory at once, roughly 100 bytes each. For a
    /// single-wave epidemic there are about as many records as individuals at
    /// the infectious peak; use [`total_cases`] to check before generating.
    pub fn generate(&self, trajectory: &Trajectory) -> Result<Vec<CaseRecord>> {
        self.validate()?;
        let severity = WeightedIndex::new(&self.severity_weights)
            .map_err(|e| Error::invalid("severity_weights", e.to_string()))?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut records = Vec::with_capacity(total_cases(trajectory));

        for (day, n) in new_cases(trajectory) {
            for _ in 0..n {
                let (latitude, longitude) = self.random_location(&mut rng)?;
                records.push(CaseRecord {
                    id: format!("P{:05}", records.len() + 1),
                    day,
                    hour: rng.gen_range(0..24),
                    minute: rng.gen_range(0..60),
                    age: rng.gen_range(self.min_age..=self.max_age),
                    severity: Severity::ALL[severity.sample(&mut rng)],
                    latitude,
                    longitude,
                });
            }
        }

        debug!("line list: {} cases in {} days", records.len(), trajectory.duration_days());
        Ok(records)
    }

    /// Uniform point in the disc around the center, rejected until it falls
    /// inside the bounding box.
    fn random_location<R: Rng>(&self, rng: &mut R) -> Result<(Real, Real)> {
        let km_per_lon = KM_PER_DEGREE * self.center_lat.to_radians().cos();
        for _ in 0..MAX_LOCATION_ATTEMPTS {
            let r = self.radius_km * rng.gen::<Real>().sqrt();
            let theta = 2.0 * std::f64::consts::PI * rng.gen::<Real>();
            let lat = self.center_lat + r * theta.sin() / KM_PER_DEGREE;
            let lon = self.center_lon + r * theta.cos() / km_per_lon;
            if self.bounds.contains(lat, lon) {
                return Ok((lat, lon));
            }
        }
        Err(Error::invalid(
            "bounds",
            format!(
                "no location found inside bounds after {} attempts",
                MAX_LOCATION_ATTEMPTS
            ),
        ))
    }
}

/// Number of new cases per day, skipping days without new cases.
pub fn new_cases(trajectory: &Trajectory) -> Vec<(Time, usize)> {
    trajectory
        .snapshots()
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].infectious().floor();
            let curr = w[1].infectious().floor();
            (curr > prev).then(|| (w[1].day(), (curr - prev) as usize))
        })
        .collect()
}

/// Number of records [`LineListConfig::generate`] produces for a trajectory.
pub fn total_cases(trajectory: &Trajectory) -> usize {
    new_cases(trajectory).iter().map(|&(_, n)| n).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::ParamSet, sim::Integrator};

    fn trajectory() -> Trajectory {
        let params = ParamSet::new(0.3, 0.2, 0.1, 10_000.0, 100.0, 0.0, 0.0, 60).unwrap();
        Integrator::default().run(&params).unwrap()
    }

    #[test]
    fn one_record_per_new_case() {
        let traj = trajectory();
        let cases = new_cases(&traj);
        let expected: usize = cases.iter().map(|(_, n)| n).sum();
        assert_eq!(total_cases(&traj), expected);
        let records = LineListConfig::default().generate(&traj).unwrap();
        assert_eq!(records.len(), expected);

        // The infectious count only grows until the peak, then decays.
        let (_, peak) = traj.peak_infectious().unwrap();
        assert_eq!(expected, peak.floor() as usize);
        assert!(cases.iter().all(|&(day, _)| day >= 1));
    }

    #[test]
    fn records_are_well_formed() {
        let config = LineListConfig::default();
        let records = config.generate(&trajectory()).unwrap();
        assert_eq!(records[0].id(), "P00001");
        assert_eq!(records[9].id(), "P00010");
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.id(), &format!("P{:05}", i + 1));
            assert!(rec.hour() < 24);
            assert!(rec.minute() < 60);
            assert!(rec.age() >= 1 && rec.age() <= 90);
            assert!(COLOMBO_BOUNDS.contains(rec.latitude(), rec.longitude()));
        }
        assert!(records.windows(2).all(|w| w[0].day() <= w[1].day()));
    }

    #[test]
    fn deterministic_for_seed() {
        let traj = trajectory();
        let config = LineListConfig::default();
        assert_eq!(config.generate(&traj).unwrap(), config.generate(&traj).unwrap());

        let other = LineListConfig {
            seed: 42,
            ..LineListConfig::default()
        };
        assert_ne!(config.generate(&traj).unwrap(), other.generate(&traj).unwrap());
    }

    #[test]
    fn severity_follows_weights() {
        let config = LineListConfig {
            severity_weights: [0.0, 0.0, 1.0],
            ..LineListConfig::default()
        };
        let records = config.generate(&trajectory()).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.severity() == Severity::Severe));
    }

    #[test]
    fn no_cases_without_outbreak() {
        let params = ParamSet::new(0.3, 0.2, 0.1, 1_000.0, 0.0, 0.0, 0.0, 30).unwrap();
        let traj = Integrator::default().run(&params).unwrap();
        assert!(new_cases(&traj).is_empty());
        assert!(LineListConfig::default().generate(&traj).unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_config() {
        let field = |config: LineListConfig| match config.validate() {
            Err(Error::InvalidParameter { field, .. }) => field,
            other => panic!("expected InvalidParameter, got {:?}", other),
        };
        let base = LineListConfig::default();
        assert_eq!(field(LineListConfig { radius_km: 0.0, ..base.clone() }), "radius_km");
        assert_eq!(field(LineListConfig { center_lat: 10.0, ..base.clone() }), "bounds");
        assert_eq!(field(LineListConfig { min_age: 50, max_age: 20, ..base.clone() }), "min_age");
        assert_eq!(
            field(LineListConfig { severity_weights: [0.0; 3], ..base.clone() }),
            "severity_weights"
        );
        assert_eq!(
            field(LineListConfig { severity_weights: [1.0, -1.0, 1.0], ..base.clone() }),
            "severity_weights"
        );
        let mut inverted = base.clone();
        inverted.bounds.min_lat = 7.0;
        assert_eq!(field(inverted), "bounds");
        assert!(base.validate().is_ok());
    }
}
