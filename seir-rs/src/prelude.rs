pub use crate::{
    error::{Error, Result},
    linelist::{CaseRecord, GeoBounds, LineListConfig, Severity},
    metrics::{Metrics, MetricsConfig},
    models::{Compartment, OdeSystem, SeirModel, SeirState},
    params::{ParamSet, ParamValues},
    scenario::{Outcome, Scenario},
    sim::{Integrator, Method, Snapshot, Trajectory},
    Age, Real, Time,
};
