use beamtrack::workflows::track::TrackingSetup;
use std::path::PathBuf;

pub struct AppConfig {
    pub deck_path: PathBuf,
    /// Element names in lattice order, parallel to `setup.lattice`.
    pub line: Vec<String>,
    pub setup: TrackingSetup,
}
