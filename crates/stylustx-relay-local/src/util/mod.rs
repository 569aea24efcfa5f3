//! Process plumbing shared by relayer binaries.

mod sig_down;
#[cfg(feature = "telemetry")]
mod telemetry;

pub use sig_down::*;
#[cfg(feature = "telemetry")]
pub use telemetry::*;
