/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron rest energy (MeV).
pub const ELECTRON_MASS_MEV: f64 = 0.510_998_950;

/// Proton rest energy (MeV).
pub const PROTON_MASS_MEV: f64 = 938.272_088_16;
