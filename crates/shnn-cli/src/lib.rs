//! hSNN dataset CLI crate
//!
//! Purpose:
//! - Provide command-line access to the event dataset pipeline in `shnn-dataset`.
//! - Expose the command modules as a library so they can be invoked from tests or
//!   downstream automation without spawning a process.
//!
//! Major commands (see [commands]):
//! - decode: print the events of one `.bs2` spike file (text or JSON).
//! - bin: bin one spike file onto the parameter time grid and dump the tensor as CSV.
//! - epoch: walk sequential minibatches over an index until the dataset is exhausted.
//! - targets: load a target spike table and check its shape against the parameters.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, calling DataCli::execute().
//! - Logs go to stderr so stdout stays machine readable.

pub mod commands;
pub mod error;

pub use commands::DataCli;
