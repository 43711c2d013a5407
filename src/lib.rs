//! Library surface for the config compiler and listener multiplexer, split
//! out of the binary so integration tests can drive both without shelling
//! out to the compiled executable.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod net;
pub mod router;
pub mod utils;
