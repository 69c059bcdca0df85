//! Forward Euler integration of the SIR and SIS models.
//!
//! Both models share one loop. They differ only in where recovered individuals go: SIR moves
//! them to `R`, SIS returns them to `S`. The right-hand side of either system is
//! [`rates`]; a step adds `dt` times the rates to the current state.
//!
//! Samples are recorded before each update, so the sample at `t` is the state entering that
//! step and the first sample is the initial condition verbatim. Time is computed as `k * dt`
//! rather than accumulated, which keeps the grid strictly increasing without drift.
//!
//! Two safeguards keep the output displayable:
//! * Stability clamps. Euler steps can overshoot when `dt` is large relative to `beta * S`. Any
//!   compartment driven negative is floored to zero, and for SIS the infected count is capped at
//!   the population. Each clamp is counted in [`SimulationTrace::stability_clamps`] and logged,
//!   so clamping is never silent.
//! * Divergence detection. A non-finite compartment, or one more than
//!   [`MAX_POPULATION_MULTIPLE`] times the population, fails the run with
//!   [`EpidemicError::NumericOverflow`].

use crate::error::EpidemicError;
use crate::log::{debug, error, trace, warn};
use crate::parameters::{require_non_negative, ModelKind, SimulationParameters};
use crate::trace::{SimulationSample, SimulationTrace};

/// Upper bound on integration steps for a single run.
pub const MAX_STEPS: u64 = 10_000_000;

/// A compartment larger than this many populations means the step size is unstable.
pub const MAX_POPULATION_MULTIPLE: f64 = 10.0;

/// Compartment sizes at one instant. `recovered` is ignored by the SIS model.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CompartmentState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

impl CompartmentState {
    #[must_use]
    pub fn new(susceptible: f64, infected: f64, recovered: f64) -> Self {
        Self {
            susceptible,
            infected,
            recovered,
        }
    }

    /// The state at `t = 0` described by a parameter set.
    #[must_use]
    pub fn initial(params: &SimulationParameters) -> Self {
        Self {
            susceptible: params.initial_susceptible(),
            infected: params.initial_infected,
            recovered: match params.model {
                ModelKind::Sir => params.initial_recovered,
                ModelKind::Sis => 0.0,
            },
        }
    }

    fn sample(&self, model: ModelKind, t: f64) -> SimulationSample {
        SimulationSample {
            t,
            susceptible: self.susceptible,
            infected: self.infected,
            recovered: model.has_recovered().then_some(self.recovered),
        }
    }
}

/// Instantaneous derivatives of each compartment, per day, together with the two flows they are
/// built from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CompartmentRates {
    /// New infections per day, `beta * S * I`.
    pub infection_flow: f64,
    /// Recoveries per day, `gamma * I`.
    pub recovery_flow: f64,
    pub susceptible: f64,
    pub infected: f64,
    /// Always zero for SIS.
    pub recovered: f64,
}

/// Right-hand side of the model's ODE system at `state`.
///
/// For SIS with `S = N − I` this is the familiar `dI/dt = βI(N − I) − γI`.
#[must_use]
pub fn rates(model: ModelKind, beta: f64, gamma: f64, state: &CompartmentState) -> CompartmentRates {
    let infection_flow = beta * state.susceptible * state.infected;
    let recovery_flow = gamma * state.infected;
    let infected = infection_flow - recovery_flow;
    match model {
        ModelKind::Sir => CompartmentRates {
            infection_flow,
            recovery_flow,
            susceptible: -infection_flow,
            infected,
            recovered: recovery_flow,
        },
        ModelKind::Sis => CompartmentRates {
            infection_flow,
            recovery_flow,
            susceptible: -infection_flow + recovery_flow,
            infected,
            recovered: 0.0,
        },
    }
}

/// Like [`rates`], but validates its inputs first. Intended for callers that evaluate the
/// system at an arbitrary point, such as a worked example on a slide.
///
/// # Errors
///
/// Returns `EpidemicError::InvalidParameter` if a rate or compartment is negative or not finite.
pub fn checked_rates(
    model: ModelKind,
    beta: f64,
    gamma: f64,
    state: &CompartmentState,
) -> Result<CompartmentRates, EpidemicError> {
    require_non_negative("beta", beta)?;
    require_non_negative("gamma", gamma)?;
    require_non_negative("susceptible", state.susceptible)?;
    require_non_negative("infected", state.infected)?;
    require_non_negative("recovered", state.recovered)?;
    Ok(rates(model, beta, gamma, state))
}

/// Integrates the model described by `params` and returns the full trace.
///
/// Identical parameters always produce an identical trace.
///
/// # Errors
///
/// * `InvalidParameter` if `params` fails [`SimulationParameters::validate`].
/// * `StepLimitExceeded` if the run needs more than [`MAX_STEPS`] steps.
/// * `NumericOverflow` if a compartment diverges.
pub fn run(params: &SimulationParameters) -> Result<SimulationTrace, EpidemicError> {
    params.validate()?;

    let steps = params.step_count();
    if steps > MAX_STEPS {
        return Err(EpidemicError::StepLimitExceeded {
            steps,
            limit: MAX_STEPS,
        });
    }

    let model = params.model;
    let dt = params.step_size;
    let population = params.population;
    debug!(
        "running {} for {} days: beta={}, gamma={}, N={}, dt={} ({} steps)",
        model, params.duration_days, params.beta, params.gamma, population, dt, steps
    );

    #[allow(clippy::cast_possible_truncation)]
    let mut samples = Vec::with_capacity(steps as usize + 1);
    let mut state = CompartmentState::initial(params);
    let mut clamps = 0;

    for k in 0..=steps {
        #[allow(clippy::cast_precision_loss)]
        let t = k as f64 * dt;
        samples.push(state.sample(model, t));
        if k == steps {
            break;
        }

        let rates = rates(model, params.beta, params.gamma, &state);
        let mut next = CompartmentState {
            susceptible: state.susceptible + rates.susceptible * dt,
            infected: state.infected + rates.infected * dt,
            recovered: state.recovered + rates.recovered * dt,
        };
        check_divergence(&next, population, t + dt)?;
        clamps += clamp(model, population, &mut next, t + dt);
        state = next;
    }

    if clamps > 0 {
        warn!(
            "{} stability clamps applied during {} run; consider a smaller step than dt={}",
            clamps, model, dt
        );
    }
    Ok(SimulationTrace::new(model, population, samples, clamps))
}

fn check_divergence(
    state: &CompartmentState,
    population: f64,
    t: f64,
) -> Result<(), EpidemicError> {
    let bound = population * MAX_POPULATION_MULTIPLE;
    for (compartment, value) in [
        ("susceptible", state.susceptible),
        ("infected", state.infected),
        ("recovered", state.recovered),
    ] {
        if !value.is_finite() || value.abs() > bound {
            error!("{compartment} diverged to {value} at t={t}");
            return Err(EpidemicError::NumericOverflow {
                time: t,
                compartment,
                value,
            });
        }
    }
    Ok(())
}

/// Applies the stability clamps and returns how many fired.
fn clamp(model: ModelKind, population: f64, state: &mut CompartmentState, t: f64) -> usize {
    let mut fired = 0;
    for (name, value) in [
        ("susceptible", &mut state.susceptible),
        ("infected", &mut state.infected),
        ("recovered", &mut state.recovered),
    ] {
        if *value < 0.0 {
            trace!("t={t}: {name} overshot to {value}, floored to 0");
            *value = 0.0;
            fired += 1;
        }
    }
    if model == ModelKind::Sis && state.infected > population {
        trace!(
            "t={t}: infected overshot to {}, capped at N={population}",
            state.infected
        );
        state.infected = population;
        fired += 1;
    }
    fired
}
