pub mod simulated_meter;
pub mod simulated_plug;

pub use simulated_meter::SimulatedMeterSource;
pub use simulated_plug::SimulatedPlugSource;
