//! EntryPoint v0.6 bindings and decoding of the reverts it uses to report results.

pub mod abi;
pub mod errors;
pub mod execution;
pub mod reverts;

pub use errors::{RpcError, RpcErrorCode};
pub use execution::{decode_simulation_result, SimulationError};
