pub use crate::error::EpidemicError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::metrics::{
    basic_reproduction_number, endemic_equilibrium, estimate_peak_time, herd_immunity_threshold,
    DerivedMetrics, OutbreakOutlook,
};
pub use crate::parameters::{ModelKind, SimulationParameters, SimulationParametersBuilder};
pub use crate::simulator::{rates, run, CompartmentRates, CompartmentState};
pub use crate::trace::{Compartment, SimulationSample, SimulationTrace};
pub use crate::assert_almost_eq;
