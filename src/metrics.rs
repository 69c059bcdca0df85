//! Closed-form epidemiological quantities computed from parameters alone.
//!
//! R₀ here is population scaled, `(β / γ) · N`, because `β` is a per-pair mass-action
//! coefficient. With β = 0.0004, γ = 0.1 and N = 5000 this gives R₀ = 20.
//!
//! The peak-time estimate `ln(R₀ · S₀) / (β · S₀)`, floored at day 1, is a heuristic. It is not
//! the textbook SIR peak time. Use [`SimulationTrace::peak`] when the integrated peak matters.
//!
//! [`SimulationTrace::peak`]: crate::trace::SimulationTrace::peak

use crate::error::EpidemicError;
use crate::parameters::{require_non_negative, require_positive, ModelKind, SimulationParameters};
use serde::Serialize;

/// Earliest day a peak is reported at.
pub const MIN_PEAK_DAY: f64 = 1.0;

/// Population-scaled basic reproduction number `(beta / gamma) * population`.
///
/// `beta = 0` is accepted and yields zero (nothing spreads).
///
/// # Errors
///
/// Returns `EpidemicError::InvalidParameter` if `beta` is negative, `gamma` or `population` is
/// not positive, or any input is not finite.
pub fn basic_reproduction_number(
    beta: f64,
    gamma: f64,
    population: f64,
) -> Result<f64, EpidemicError> {
    require_non_negative("beta", beta)?;
    require_positive("gamma", gamma)?;
    require_positive("population", population)?;
    Ok((beta / gamma) * population)
}

/// Estimated day of peak infection, `ln(R0 * S0) / (beta * S0)`, never earlier than
/// [`MIN_PEAK_DAY`].
///
/// # Errors
///
/// Returns `EpidemicError::InvalidParameter` naming `initial_susceptible` when no host is
/// susceptible, naming `beta` when the logarithm is otherwise undefined (`R0 * S0 <= 0`) or the
/// denominator underflows to zero, and `EpidemicError::NumericOverflow` if the
/// result is not finite. NaN is never returned.
pub fn estimate_peak_time(
    beta: f64,
    gamma: f64,
    initial_susceptible: f64,
    population: f64,
) -> Result<f64, EpidemicError> {
    require_non_negative("initial_susceptible", initial_susceptible)?;
    let r0 = basic_reproduction_number(beta, gamma, population)?;

    if initial_susceptible == 0.0 {
        return Err(EpidemicError::invalid(
            "initial_susceptible",
            "no susceptible hosts, the peak time is undefined",
        ));
    }
    let growth = r0 * initial_susceptible;
    if growth <= 0.0 {
        return Err(EpidemicError::invalid(
            "beta",
            format!("R0 * S0 = {growth} must be positive for the logarithm to be defined"),
        ));
    }
    let speed = beta * initial_susceptible;
    if speed == 0.0 {
        return Err(EpidemicError::invalid(
            "beta",
            "beta * S0 underflows to zero, the peak time is undefined",
        ));
    }

    let days = growth.ln() / speed;
    if !days.is_finite() {
        return Err(EpidemicError::NumericOverflow {
            time: 0.0,
            compartment: "peak_time",
            value: days,
        });
    }
    Ok(days.max(MIN_PEAK_DAY))
}

/// Fraction of the population that must be immune to stop spread, `1 − 1/R0`. Zero when
/// `R0 <= 1`.
///
/// # Errors
///
/// Returns `EpidemicError::InvalidParameter` if `r0` is negative or not finite.
pub fn herd_immunity_threshold(r0: f64) -> Result<f64, EpidemicError> {
    require_non_negative("r0", r0)?;
    if r0 <= 1.0 {
        Ok(0.0)
    } else {
        Ok(1.0 - 1.0 / r0)
    }
}

/// Long-run infected level of the SIS model, `(1 − 1/R0) · N`. Zero when `R0 <= 1`: the infection
/// dies out instead of becoming endemic.
///
/// # Errors
///
/// Same as [`basic_reproduction_number`].
pub fn endemic_equilibrium(beta: f64, gamma: f64, population: f64) -> Result<f64, EpidemicError> {
    let r0 = basic_reproduction_number(beta, gamma, population)?;
    Ok(herd_immunity_threshold(r0)? * population)
}

/// Whether an outbreak grows or fades, decided by `R0 > 1`.
#[derive(Serialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutbreakOutlook {
    /// Each infected host infects more than one other; infections grow.
    Spreading,
    /// Each infected host is cleaned before infecting one other on average.
    Contained,
}

impl OutbreakOutlook {
    #[must_use]
    pub fn from_r0(r0: f64) -> Self {
        if r0 > 1.0 {
            OutbreakOutlook::Spreading
        } else {
            OutbreakOutlook::Contained
        }
    }
}

/// All derived quantities for one parameter set.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DerivedMetrics {
    pub basic_reproduction_number: f64,
    /// Days, see [`estimate_peak_time`].
    pub estimated_peak_time: f64,
    pub herd_immunity_threshold: f64,
    pub outlook: OutbreakOutlook,
    /// Only for SIS.
    pub endemic_equilibrium: Option<f64>,
}

impl DerivedMetrics {
    /// # Errors
    ///
    /// Returns an `EpidemicError` if the parameters are invalid or a metric is undefined for them.
    pub fn from_parameters(params: &SimulationParameters) -> Result<Self, EpidemicError> {
        params.validate()?;
        let r0 = basic_reproduction_number(params.beta, params.gamma, params.population)?;
        let estimated_peak_time = estimate_peak_time(
            params.beta,
            params.gamma,
            params.initial_susceptible(),
            params.population,
        )?;
        let endemic_equilibrium = match params.model {
            ModelKind::Sis => Some(endemic_equilibrium(
                params.beta,
                params.gamma,
                params.population,
            )?),
            ModelKind::Sir => None,
        };
        Ok(Self {
            basic_reproduction_number: r0,
            estimated_peak_time,
            herd_immunity_threshold: herd_immunity_threshold(r0)?,
            outlook: OutbreakOutlook::from_r0(r0),
            endemic_equilibrium,
        })
    }

    /// The peak estimate as a whole day, the way it is displayed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn peak_day(&self) -> u32 {
        self.estimated_peak_time.round() as u32
    }
}
