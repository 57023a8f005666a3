//! # tellcore
//!
//! Typed bindings for telldus-core, the control library behind TellStick
//! transmitters. Devices, sensors and controllers are thin adapters over the
//! native library; all protocol and transport work happens inside it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tellcore::{Methods, TelldusCore};
//!
//! let core = TelldusCore::open()?;
//! let lamp = core.add_device("Lamp", "arctech", Some("selflearning"), [("house", "1234"), ("unit", "1")])?;
//! if lamp.methods(Methods::TURNON | Methods::DIM)?.contains(Methods::DIM) {
//!     lamp.dim(128)?;
//! }
//! # Ok::<(), tellcore::TelldusError>(())
//! ```
//!
//! The library is loaded from `TELLCORE_LIBRARY` when set, otherwise from the
//! platform default location. Tests and embedders can pass their own
//! [`NativeApi`] implementation to [`TelldusCore::new`].
//!
#[macro_use]
mod macros;
pub mod constants;
pub mod controller;
pub mod device;
pub mod error;
pub mod library;
pub mod native;
pub mod sensor;
pub mod telldus;

pub use constants::{ControllerType, DataType, DeviceType, Methods};
pub use controller::Controller;
pub use device::{Device, DeviceAttribute};
pub use error::{Result, TelldusError};
pub use library::Library;
pub use native::NativeApi;
pub use sensor::{Sensor, SensorValue};
pub use telldus::TelldusCore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}
