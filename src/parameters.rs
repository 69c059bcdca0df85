//! Inputs to a simulation run.
//!
//! A [`SimulationParameters`] value fully determines a trace: the model kind, the two rate
//! constants, the population split at `t = 0` and the integration grid. Parameter sets are plain
//! data; they can be built in code with [`SimulationParametersBuilder`], loaded from a JSON file
//! or taken from one of the named presets.

use crate::error::EpidemicError;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Relative slack, in units of machine epsilon, for treating `duration / step` as a whole number.
const STEP_RATIO_ULPS: f64 = 8.0;

/// Which compartmental model to integrate.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelKind {
    /// Susceptible, Infected, Recovered. Recovery confers permanent immunity.
    #[default]
    Sir,
    /// Susceptible, Infected. Recovered individuals become susceptible again.
    Sis,
}

impl ModelKind {
    /// True if the model carries a recovered compartment.
    #[must_use]
    pub fn has_recovered(self) -> bool {
        matches!(self, ModelKind::Sir)
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Sir => write!(f, "SIR"),
            ModelKind::Sis => write!(f, "SIS"),
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = EpidemicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sir" => Ok(ModelKind::Sir),
            "sis" => Ok(ModelKind::Sis),
            other => Err(EpidemicError::invalid(
                "model",
                format!("unknown model kind `{other}`, expected SIR or SIS"),
            )),
        }
    }
}

/// Everything a run needs. Rates are per individual per day; `beta` is the mass-action
/// coefficient, so `beta * S * I` is the number of new infections per day.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[builder(default, build_fn(error = "EpidemicError"))]
#[serde(default)]
pub struct SimulationParameters {
    pub model: ModelKind,
    /// Transmission coefficient (β).
    pub beta: f64,
    /// Recovery coefficient (γ).
    pub gamma: f64,
    /// Total population (N), constant for the run.
    pub population: f64,
    pub initial_infected: f64,
    /// Only meaningful for SIR; must be zero for SIS.
    pub initial_recovered: f64,
    /// Integration step (dt), in days.
    pub step_size: f64,
    pub duration_days: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::presentation_default(ModelKind::Sir)
    }
}

impl SimulationParameters {
    /// The parameter set the slides open with: 5000 hosts, 50 of them infected, β = 0.0004 and
    /// γ = 0.1 integrated for 100 days at dt = 0.1.
    #[must_use]
    pub fn presentation_default(model: ModelKind) -> Self {
        Self {
            model,
            beta: 0.0004,
            gamma: 0.1,
            population: 5000.0,
            initial_infected: 50.0,
            initial_recovered: 0.0,
            step_size: 0.1,
            duration_days: 100.0,
        }
    }

    /// A workplace of 100 computers, 10 of them infected, with β = 0.04 and γ = 0.02 (SIR).
    #[must_use]
    pub fn workplace() -> Self {
        Self {
            model: ModelKind::Sir,
            beta: 0.04,
            gamma: 0.02,
            population: 100.0,
            initial_infected: 10.0,
            initial_recovered: 0.0,
            step_size: 0.1,
            duration_days: 100.0,
        }
    }

    /// A cafe network of 20 computers, 4 of them infected, with β = 0.06 and γ = 0.04 (SIS).
    #[must_use]
    pub fn cafe_network() -> Self {
        Self {
            model: ModelKind::Sis,
            beta: 0.06,
            gamma: 0.04,
            population: 20.0,
            initial_infected: 4.0,
            initial_recovered: 0.0,
            step_size: 0.1,
            duration_days: 100.0,
        }
    }

    /// Loads a parameter set from a JSON file. Missing fields take their default values. The
    /// result is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns an `EpidemicError` if the file cannot be read, is not valid JSON, or describes an
    /// invalid parameter set.
    pub fn from_json_file(path: &Path) -> Result<Self, EpidemicError> {
        let reader = BufReader::new(File::open(path)?);
        let parameters: SimulationParameters = serde_json::from_reader(reader)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// `N − I₀ − R₀` for SIR, `N − I₀` for SIS.
    #[must_use]
    pub fn initial_susceptible(&self) -> f64 {
        match self.model {
            ModelKind::Sir => self.population - self.initial_infected - self.initial_recovered,
            ModelKind::Sis => self.population - self.initial_infected,
        }
    }

    /// Number of integration steps needed to reach `duration_days`. The grid ends at or after the
    /// horizon. A ratio a few ULPs above an integer (e.g. `1.1 / 0.1`) is division noise and is
    /// not bumped up an extra step.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn step_count(&self) -> u64 {
        let ratio = self.duration_days / self.step_size;
        let rounded = ratio.round();
        let noise = STEP_RATIO_ULPS * f64::EPSILON * rounded.max(1.0);
        let steps = if (ratio - rounded).abs() <= noise {
            rounded
        } else {
            ratio.ceil()
        };
        steps as u64
    }

    /// Checks every precondition of a run.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), EpidemicError> {
        require_positive("beta", self.beta)?;
        require_positive("gamma", self.gamma)?;
        require_positive("population", self.population)?;
        require_positive("step_size", self.step_size)?;
        require_positive("duration_days", self.duration_days)?;
        require_non_negative("initial_infected", self.initial_infected)?;
        require_non_negative("initial_recovered", self.initial_recovered)?;

        if self.initial_infected > self.population {
            return Err(EpidemicError::invalid(
                "initial_infected",
                format!(
                    "{} infected exceeds the population of {}",
                    self.initial_infected, self.population
                ),
            ));
        }
        match self.model {
            ModelKind::Sir => {
                if self.initial_infected + self.initial_recovered > self.population {
                    return Err(EpidemicError::invalid(
                        "initial_recovered",
                        format!(
                            "{} infected plus {} recovered exceeds the population of {}",
                            self.initial_infected, self.initial_recovered, self.population
                        ),
                    ));
                }
            }
            ModelKind::Sis => {
                if self.initial_recovered != 0.0 {
                    return Err(EpidemicError::invalid(
                        "initial_recovered",
                        "the SIS model has no recovered compartment",
                    ));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<(), EpidemicError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EpidemicError::invalid(
            field,
            format!("must be a finite number, got {value}"),
        ))
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), EpidemicError> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(EpidemicError::invalid(
            field,
            format!("must be positive, got {value}"),
        ))
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), EpidemicError> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(EpidemicError::invalid(
            field,
            format!("must not be negative, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_the_presentation_values() {
        let params = SimulationParameters::default();
        assert_eq!(params.model, ModelKind::Sir);
        assert_eq!(params.beta, 0.0004);
        assert_eq!(params.gamma, 0.1);
        assert_eq!(params.initial_susceptible(), 4950.0);
        assert_eq!(params.step_count(), 1000);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn builder_overrides_only_given_fields() {
        let params = SimulationParametersBuilder::default()
            .model(ModelKind::Sis)
            .beta(0.0008)
            .build()
            .unwrap();
        assert_eq!(params.model, ModelKind::Sis);
        assert_eq!(params.beta, 0.0008);
        assert_eq!(params.population, 5000.0);
        assert_eq!(params.initial_susceptible(), 4950.0);
    }

    #[test]
    fn presets_validate() {
        for params in [
            SimulationParameters::presentation_default(ModelKind::Sis),
            SimulationParameters::workplace(),
            SimulationParameters::cafe_network(),
        ] {
            assert!(params.validate().is_ok(), "{params:?}");
        }
        assert_eq!(SimulationParameters::cafe_network().initial_susceptible(), 16.0);
        assert_eq!(SimulationParameters::workplace().initial_susceptible(), 90.0);
    }

    #[test]
    fn negative_rate_is_rejected_with_field_name() {
        let params = SimulationParameters {
            beta: -0.1,
            ..Default::default()
        };
        let error = params.validate().unwrap_err();
        assert_eq!(error.field(), Some("beta"));

        let params = SimulationParameters {
            gamma: 0.0,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().field(), Some("gamma"));
    }

    #[test]
    fn infected_exceeding_population_is_rejected() {
        let params = SimulationParameters {
            initial_infected: 5001.0,
            ..Default::default()
        };
        let error = params.validate().unwrap_err();
        assert_eq!(error.field(), Some("initial_infected"));
        assert!(error.to_string().contains("exceeds the population"));
    }

    #[test]
    fn sir_split_must_fit_population() {
        let params = SimulationParameters {
            initial_infected: 3000.0,
            initial_recovered: 2500.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap_err().field(),
            Some("initial_recovered")
        );
    }

    #[test]
    fn sis_rejects_recovered() {
        let params = SimulationParameters {
            initial_recovered: 1.0,
            ..SimulationParameters::cafe_network()
        };
        assert_eq!(
            params.validate().unwrap_err().field(),
            Some("initial_recovered")
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for (params, field) in [
            (
                SimulationParameters {
                    step_size: f64::NAN,
                    ..Default::default()
                },
                "step_size",
            ),
            (
                SimulationParameters {
                    duration_days: f64::INFINITY,
                    ..Default::default()
                },
                "duration_days",
            ),
        ] {
            assert_eq!(params.validate().unwrap_err().field(), Some(field));
        }
    }

    #[test]
    fn step_count_covers_horizon() {
        let params = SimulationParameters {
            step_size: 0.3,
            duration_days: 1.0,
            ..Default::default()
        };
        // 0, 0.3, 0.6, 0.9, 1.2
        assert_eq!(params.step_count(), 4);

        let params = SimulationParameters {
            step_size: 0.25,
            duration_days: 1.0,
            ..Default::default()
        };
        assert_eq!(params.step_count(), 4);
    }

    #[test]
    fn step_count_ignores_division_noise() {
        // 1.1 / 0.1 == 11.000000000000002
        let params = SimulationParameters {
            step_size: 0.1,
            duration_days: 1.1,
            ..Default::default()
        };
        assert_eq!(params.step_count(), 11);
    }

    #[test]
    fn step_count_never_stops_short_of_horizon() {
        let params = SimulationParameters {
            step_size: 0.1,
            duration_days: 1.000_000_000_01,
            ..Default::default()
        };
        assert_eq!(params.step_count(), 11);
        #[allow(clippy::cast_precision_loss)]
        let end = params.step_count() as f64 * params.step_size;
        assert!(end >= params.duration_days);
    }

    #[test]
    fn model_kind_parses_case_insensitively() {
        assert_eq!("sis".parse::<ModelKind>().unwrap(), ModelKind::Sis);
        assert_eq!("SIR".parse::<ModelKind>().unwrap(), ModelKind::Sir);
        assert_eq!(
            "seir".parse::<ModelKind>().unwrap_err().field(),
            Some("model")
        );
    }

    #[test]
    fn load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model": "SIS", "beta": 0.06, "gamma": 0.04, "population": 20, "initial_infected": 4}}"#
        )
        .unwrap();
        let params = SimulationParameters::from_json_file(file.path()).unwrap();
        assert_eq!(params.model, ModelKind::Sis);
        assert_eq!(params.population, 20.0);
        // Unspecified fields fall back to the defaults.
        assert_eq!(params.step_size, 0.1);
    }

    #[test]
    fn load_invalid_json_file_reports_field() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"gamma": -1.0}}"#).unwrap();
        let error = SimulationParameters::from_json_file(file.path()).unwrap_err();
        assert_eq!(error.field(), Some("gamma"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let error =
            SimulationParameters::from_json_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(error, EpidemicError::IoError(_)));
    }
}
