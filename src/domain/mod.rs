pub mod meter;
pub mod plug;

pub use meter::MeterReading;
pub use plug::DeviceStatus;
