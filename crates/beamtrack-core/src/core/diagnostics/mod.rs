//! Beam diagnostics: reduced statistics of the bunch and CSV output.

pub mod moments;
pub mod output;

pub use moments::ReducedBeamCharacteristics;
pub use output::DiagnosticsError;
