use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use crate::error::EpidemicError;
use crate::log::{info, set_log_level, warn, LevelFilter};
use crate::metrics::DerivedMetrics;
use crate::parameters::{ModelKind, SimulationParameters};
use crate::simulator;
use crate::trace::SimulationTrace;
use clap::{Args, Command, FromArgMatches as _};

/// File name of the trace written into `--output-dir`.
pub const TRACE_FILE_NAME: &str = "trace.csv";

/// Default cli arguments for the runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Optional path for a JSON parameter file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory to write the trace CSV into
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Log level: off, error, warn, info, debug or trace. Logging is off unless given.
    #[arg(long)]
    pub log_level: Option<LevelFilter>,
}

/// Per-field overrides applied on top of the defaults or the config file
#[derive(Args, Debug, Default)]
pub struct ParameterArgs {
    /// Model kind, SIR or SIS
    #[arg(short, long)]
    pub model: Option<ModelKind>,

    /// Transmission coefficient
    #[arg(long)]
    pub beta: Option<f64>,

    /// Recovery coefficient
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Total population
    #[arg(long)]
    pub population: Option<f64>,

    #[arg(long)]
    pub initial_infected: Option<f64>,

    /// Only valid for SIR
    #[arg(long)]
    pub initial_recovered: Option<f64>,

    /// Integration step in days
    #[arg(long)]
    pub step_size: Option<f64>,

    #[arg(long)]
    pub duration_days: Option<f64>,
}

impl ParameterArgs {
    fn apply(&self, params: &mut SimulationParameters) {
        if let Some(model) = self.model {
            params.model = model;
        }
        let overrides = [
            (self.beta, &mut params.beta),
            (self.gamma, &mut params.gamma),
            (self.population, &mut params.population),
            (self.initial_infected, &mut params.initial_infected),
            (self.initial_recovered, &mut params.initial_recovered),
            (self.step_size, &mut params.step_size),
            (self.duration_days, &mut params.duration_days),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

/// Everything one invocation produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub parameters: SimulationParameters,
    /// `None` when a metric is undefined for the parameters, e.g. no susceptible hosts left.
    pub metrics: Option<DerivedMetrics>,
    pub trace: SimulationTrace,
    /// Where the trace was written, if anywhere.
    pub trace_path: Option<PathBuf>,
}

impl Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = &self.parameters;
        writeln!(
            f,
            "model: {} (beta={}, gamma={}, N={}, dt={}, {} days)",
            params.model,
            params.beta,
            params.gamma,
            params.population,
            params.step_size,
            params.duration_days
        )?;
        if let Some(metrics) = &self.metrics {
            writeln!(f, "R0: {:.2}", metrics.basic_reproduction_number)?;
            writeln!(f, "outlook: {:?}", metrics.outlook)?;
            writeln!(f, "estimated peak: day {}", metrics.peak_day())?;
            writeln!(
                f,
                "herd immunity threshold: {:.3}",
                metrics.herd_immunity_threshold
            )?;
            if let Some(level) = metrics.endemic_equilibrium {
                writeln!(f, "endemic equilibrium: {level:.1}")?;
            }
        }
        if let Some(peak) = self.trace.peak() {
            writeln!(
                f,
                "observed peak: t={:.1} with {:.1} infected",
                peak.t, peak.infected
            )?;
        }
        if let Some(size) = self.trace.final_size() {
            writeln!(f, "final size: {size:.1}")?;
        }
        write!(f, "stability clamps: {}", self.trace.stability_clamps())?;
        if let Some(path) = &self.trace_path {
            write!(f, "\ntrace written to {}", path.display())?;
        }
        Ok(())
    }
}

fn create_cli() -> Command {
    let cli = Command::new("contagion")
        .about("Integrates SIR/SIS models of malware spreading through a network");
    let cli = BaseArgs::augment_args(cli);
    ParameterArgs::augment_args(cli)
}

/// Parses the command line and runs one simulation.
///
/// # Errors
/// Returns an error if argument parsing fails, the parameters are invalid, the integration
/// diverges or the trace cannot be written.
pub fn run_with_args() -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let base_args = BaseArgs::from_arg_matches(&matches)?;
    let parameter_args = ParameterArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(&base_args, &parameter_args)?)
}

fn run_with_args_internal(
    args: &BaseArgs,
    overrides: &ParameterArgs,
) -> Result<RunOutcome, EpidemicError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let mut parameters = if args.config.is_empty() {
        SimulationParameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        SimulationParameters::from_json_file(Path::new(&args.config))?
    };
    overrides.apply(&mut parameters);

    let trace = simulator::run(&parameters)?;
    let metrics = match DerivedMetrics::from_parameters(&parameters) {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!("derived metrics unavailable: {error}");
            None
        }
    };

    let trace_path = if args.output_dir.is_empty() {
        None
    } else {
        let path = PathBuf::from(&args.output_dir).join(TRACE_FILE_NAME);
        trace.write_csv_file(&path)?;
        info!("wrote {} samples to {}", trace.len(), path.display());
        Some(path)
    };

    Ok(RunOutcome {
        parameters,
        metrics,
        trace,
        trace_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn base_args() -> BaseArgs {
        BaseArgs {
            config: String::new(),
            output_dir: String::new(),
            log_level: None,
        }
    }

    #[test]
    fn runs_presentation_default() {
        let outcome = run_with_args_internal(&base_args(), &ParameterArgs::default()).unwrap();
        assert_eq!(outcome.parameters, SimulationParameters::default());
        assert_eq!(outcome.trace.len(), 1001);
        let metrics = outcome.metrics.unwrap();
        assert_eq!(metrics.basic_reproduction_number, 20.0);
        assert!(outcome.trace_path.is_none());
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = ParameterArgs {
            model: Some(ModelKind::Sis),
            gamma: Some(0.2),
            duration_days: Some(10.0),
            ..Default::default()
        };
        let outcome = run_with_args_internal(&base_args(), &overrides).unwrap();
        assert_eq!(outcome.parameters.model, ModelKind::Sis);
        assert_eq!(outcome.parameters.gamma, 0.2);
        assert_eq!(outcome.parameters.beta, 0.0004);
        assert_eq!(outcome.trace.len(), 101);
    }

    #[test]
    fn config_file_then_overrides() {
        let args = BaseArgs {
            config: "tests/data/cafe_network.json".to_string(),
            ..base_args()
        };
        let overrides = ParameterArgs {
            gamma: Some(0.3),
            ..Default::default()
        };
        let outcome = run_with_args_internal(&args, &overrides).unwrap();
        assert_eq!(outcome.parameters.population, 20.0);
        assert_eq!(outcome.parameters.gamma, 0.3);
    }

    #[test]
    fn invalid_override_is_reported() {
        let overrides = ParameterArgs {
            initial_infected: Some(6000.0),
            ..Default::default()
        };
        let error = run_with_args_internal(&base_args(), &overrides).unwrap_err();
        assert_eq!(error.field(), Some("initial_infected"));
    }

    #[test]
    fn output_dir_receives_trace() {
        let dir = tempdir().unwrap();
        let args = BaseArgs {
            output_dir: dir.path().to_string_lossy().into_owned(),
            ..base_args()
        };
        let outcome = run_with_args_internal(&args, &ParameterArgs::default()).unwrap();
        let path = outcome.trace_path.unwrap();
        assert_eq!(path, dir.path().join(TRACE_FILE_NAME));
        let rows = csv::Reader::from_path(&path).unwrap().records().count();
        assert_eq!(rows, outcome.trace.len());
    }

    #[test]
    fn summary_lists_metrics() {
        let outcome = run_with_args_internal(&base_args(), &ParameterArgs::default()).unwrap();
        let summary = outcome.to_string();
        assert!(summary.contains("R0: 20.00"));
        assert!(summary.contains("estimated peak: day 6"));
        assert!(summary.contains("stability clamps: 0"));
        assert!(!summary.contains("endemic equilibrium"));
    }

    #[test]
    fn missing_metrics_do_not_fail_the_run() {
        // Everyone infected: S0 = 0, so the peak estimate is undefined.
        let overrides = ParameterArgs {
            initial_infected: Some(5000.0),
            ..Default::default()
        };
        let outcome = run_with_args_internal(&base_args(), &overrides).unwrap();
        assert!(outcome.metrics.is_none());
    }
}
