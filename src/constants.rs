//! Numeric tables from the telldus-core headers: device methods, device
//! types, sensor data types and controller types.

use serde::Serialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::os::raw::c_int;

/// Bitmask of device methods (`TELLSTICK_TURNON` and friends).
///
/// Passed to [`Device::methods`](crate::Device::methods) to announce what the
/// caller supports and returned to describe what the device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Methods(c_int);

impl Methods {
    pub const NONE: Methods = Methods(0);
    pub const TURNON: Methods = Methods(1);
    pub const TURNOFF: Methods = Methods(2);
    pub const BELL: Methods = Methods(4);
    pub const TOGGLE: Methods = Methods(8);
    pub const DIM: Methods = Methods(16);
    pub const LEARN: Methods = Methods(32);
    pub const EXECUTE: Methods = Methods(64);
    pub const UP: Methods = Methods(128);
    pub const DOWN: Methods = Methods(256);
    pub const STOP: Methods = Methods(512);

    const NAMED: &'static [(Methods, &'static str)] = &[
        (Methods::TURNON, "turnon"),
        (Methods::TURNOFF, "turnoff"),
        (Methods::BELL, "bell"),
        (Methods::TOGGLE, "toggle"),
        (Methods::DIM, "dim"),
        (Methods::LEARN, "learn"),
        (Methods::EXECUTE, "execute"),
        (Methods::UP, "up"),
        (Methods::DOWN, "down"),
        (Methods::STOP, "stop"),
    ];

    /// Every method this binding knows about.
    pub fn all() -> Methods {
        Methods::NAMED
            .iter()
            .fold(Methods::NONE, |acc, (m, _)| acc | *m)
    }

    pub fn from_raw(raw: c_int) -> Self {
        Methods(raw)
    }

    pub fn as_raw(self) -> c_int {
        self.0
    }

    pub fn contains(self, other: Methods) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the known methods set in this mask.
    pub fn names(self) -> Vec<&'static str> {
        Methods::NAMED
            .iter()
            .filter(|(m, _)| self.contains(*m))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for Methods {
    type Output = Methods;

    fn bitor(self, rhs: Methods) -> Methods {
        Methods(self.0 | rhs.0)
    }
}

impl BitOrAssign for Methods {
    fn bitor_assign(&mut self, rhs: Methods) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join("|"))
    }
}

define_native_enum! {
    /// Kind of a configured device (`TELLSTICK_TYPE_*`).
    pub enum DeviceType {
        Device = ("device", 1),
        Group = ("group", 2),
        Scene = ("scene", 3),
    }
}

define_native_enum! {
    /// Measurement kind reported by a sensor (`TELLSTICK_TEMPERATURE` etc.).
    ///
    /// Values are single bits; a sensor announces the kinds it supports as a
    /// bitmask.
    pub enum DataType {
        Temperature = ("temperature", 1),
        Humidity = ("humidity", 2),
        RainRate = ("rainrate", 4),
        RainTotal = ("raintotal", 8),
        WindDirection = ("winddirection", 16),
        WindAverage = ("windaverage", 32),
        WindGust = ("windgust", 64),
    }
}

define_native_enum! {
    /// Hardware family of a controller (`TELLSTICK_CONTROLLER_*`).
    pub enum ControllerType {
        TellStick = ("tellstick", 1),
        TellStickDuo = ("tellstick-duo", 2),
        TellStickNet = ("tellstick-net", 3),
    }
}

impl Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
