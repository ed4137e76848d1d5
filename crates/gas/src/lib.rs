mod checks;
mod estimate;
mod overhead;

pub use checks::{validate_verification_gas, CheckError};
pub use estimate::{
    estimate_gas, EstimatorConfig, GasError, GasEstimate, Simulation, SimulationFailure,
    Simulator,
};
pub use overhead::Overhead;
