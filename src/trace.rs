//! The output of a run: an ordered, immutable sequence of samples.
//!
//! A trace is owned by whoever asked for it. Nothing is cached or shared between runs; a new
//! parameter set means a new trace.

use crate::error::EpidemicError;
use crate::parameters::ModelKind;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

/// State of every compartment at one instant. `recovered` is `None` for SIS runs.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct SimulationSample {
    pub t: f64,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: Option<f64>,
}

impl SimulationSample {
    /// Sum of all compartments.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered.unwrap_or(0.0)
    }

    #[must_use]
    pub fn value(&self, compartment: Compartment) -> Option<f64> {
        match compartment {
            Compartment::Susceptible => Some(self.susceptible),
            Compartment::Infected => Some(self.infected),
            Compartment::Recovered => self.recovered,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Compartment {
    Susceptible,
    Infected,
    Recovered,
}

/// The samples produced by one run, in time order, plus what the caller needs to interpret
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationTrace {
    model: ModelKind,
    population: f64,
    samples: Vec<SimulationSample>,
    stability_clamps: usize,
}

impl SimulationTrace {
    pub(crate) fn new(
        model: ModelKind,
        population: f64,
        samples: Vec<SimulationSample>,
        stability_clamps: usize,
    ) -> Self {
        Self {
            model,
            population,
            samples,
            stability_clamps,
        }
    }

    #[must_use]
    pub fn model(&self) -> ModelKind {
        self.model
    }

    #[must_use]
    pub fn population(&self) -> f64 {
        self.population
    }

    #[must_use]
    pub fn samples(&self) -> &[SimulationSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationSample> {
        self.samples.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&SimulationSample> {
        self.samples.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&SimulationSample> {
        self.samples.last()
    }

    /// How many times the integrator had to clamp a compartment (a negative value floored to
    /// zero, or SIS infections capped at the population). Zero means every step was a plain
    /// Euler step.
    #[must_use]
    pub fn stability_clamps(&self) -> usize {
        self.stability_clamps
    }

    /// `(t, value)` pairs for one compartment, ready to plot. Empty for `Recovered` in an SIS
    /// trace.
    #[must_use]
    pub fn series(&self, compartment: Compartment) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter_map(|sample| sample.value(compartment).map(|value| (sample.t, value)))
            .collect()
    }

    /// The sample with the most simultaneous infections. Ties resolve to the earliest sample.
    #[must_use]
    pub fn peak(&self) -> Option<&SimulationSample> {
        self.samples.iter().reduce(|best, sample| {
            if sample.infected > best.infected {
                sample
            } else {
                best
            }
        })
    }

    /// Recovered count at the end of an SIR run; `None` for SIS.
    #[must_use]
    pub fn final_size(&self) -> Option<f64> {
        self.last().and_then(|sample| sample.recovered)
    }

    /// Writes the samples as CSV with a `t,susceptible,infected,recovered` header. The
    /// `recovered` column is empty for SIS.
    ///
    /// # Errors
    ///
    /// Returns an `EpidemicError` if serialization or the underlying write fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), EpidemicError> {
        let mut writer = csv::Writer::from_writer(writer);
        for sample in &self.samples {
            writer.serialize(sample)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the samples to a CSV file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an `EpidemicError` if the path is not a `.csv` file or cannot be written.
    pub fn write_csv_file(&self, path: &Path) -> Result<(), EpidemicError> {
        if path.extension().and_then(std::ffi::OsStr::to_str) != Some("csv") {
            return Err(EpidemicError::from(format!(
                "trace output must be a .csv file, got {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        self.write_csv(File::create(path)?)
    }
}

impl<'a> IntoIterator for &'a SimulationTrace {
    type Item = &'a SimulationSample;
    type IntoIter = std::slice::Iter<'a, SimulationSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
