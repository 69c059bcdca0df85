//! Deterministic compartmental models of malware spreading through a network
//!
//! Contagion integrates the classic SIR and SIS epidemic models, read as a metaphor for
//! computer networks: susceptible hosts are unpatched machines, infected hosts run the malware
//! and recovered hosts have been cleaned and hardened. Rendering the results is left to the
//! caller; this crate hands back plain time series and a handful of derived numbers.
//!
//! The core is a pure function, [`simulator::run`], which takes a
//! [`SimulationParameters`](parameters::SimulationParameters) and returns a
//! [`SimulationTrace`](trace::SimulationTrace). Nothing is cached between calls and no state is
//! shared, so runs may be made concurrently from any number of threads.
//!
//! ```rust
//! use contagion::prelude::*;
//!
//! let params = SimulationParameters::presentation_default(ModelKind::Sir);
//! let trace = run(&params).unwrap();
//! let metrics = DerivedMetrics::from_parameters(&params).unwrap();
//! assert_eq!(metrics.basic_reproduction_number, 20.0);
//! assert_eq!(trace.first().unwrap().infected, 50.0);
//! ```
//!
//! Alongside the integrator the crate provides:
//! * [`metrics`]: R₀, the peak-time estimate, herd-immunity threshold and the SIS endemic level.
//! * [`simulator::rates`]: the instantaneous right-hand side, for worked examples.
//! * [`runner`]: the command line entry point used by the `contagion` binary.
pub mod error;
pub mod log;
mod macros;
pub mod metrics;
pub mod numeric;
pub mod parameters;
pub mod prelude;
pub mod runner;
pub mod simulator;
pub mod trace;
