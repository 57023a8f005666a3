//! Configured telldus-core devices.
//!
//! A [`Device`] is only an identifier plus the shared native handle. Every
//! property read or write is a native round-trip; nothing is cached locally.

use crate::constants::{DeviceType, Methods};
use crate::error::{
    Result, TELLSTICK_ERROR_UNKNOWN_RESPONSE, TelldusError, check, check_bool,
};
use crate::native::{NativeApi, cstring};
use log::debug;
use std::fmt;
use std::os::raw::c_int;
use std::str::FromStr;
use std::sync::Arc;

/// Name-addressable device properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceAttribute {
    Name,
    Protocol,
    Model,
    /// Read-only
    Type,
}

impl DeviceAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceAttribute::Name => "name",
            DeviceAttribute::Protocol => "protocol",
            DeviceAttribute::Model => "model",
            DeviceAttribute::Type => "type",
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, DeviceAttribute::Type)
    }
}

impl FromStr for DeviceAttribute {
    type Err = TelldusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(DeviceAttribute::Name),
            "protocol" => Ok(DeviceAttribute::Protocol),
            "model" => Ok(DeviceAttribute::Model),
            "type" => Ok(DeviceAttribute::Type),
            _ => Err(TelldusError::UnknownAttribute(s.to_string())),
        }
    }
}

impl fmt::Display for DeviceAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device registered in telldus-core.
///
/// The id is fixed for the lifetime of the adapter. After [`remove`](Self::remove)
/// the adapter still exists but the id no longer refers to anything; further
/// calls are answered by the library, usually with an error.
#[derive(Clone)]
pub struct Device {
    id: c_int,
    native: Arc<dyn NativeApi>,
}

impl Device {
    pub(crate) fn new(id: c_int, native: Arc<dyn NativeApi>) -> Self {
        Self { id, native }
    }

    pub fn id(&self) -> c_int {
        self.id
    }

    fn native(&self) -> &dyn NativeApi {
        self.native.as_ref()
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    pub fn name(&self) -> Result<String> {
        Ok(self.native().name(self.id))
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        let name = cstring(name)?;
        check_bool(self.native(), self.native().set_name(self.id, &name))
    }

    pub fn protocol(&self) -> Result<String> {
        Ok(self.native().protocol(self.id))
    }

    pub fn set_protocol(&self, protocol: &str) -> Result<()> {
        let protocol = cstring(protocol)?;
        check_bool(self.native(), self.native().set_protocol(self.id, &protocol))
    }

    pub fn model(&self) -> Result<String> {
        Ok(self.native().model(self.id))
    }

    pub fn set_model(&self, model: &str) -> Result<()> {
        let model = cstring(model)?;
        check_bool(self.native(), self.native().set_model(self.id, &model))
    }

    /// Whether this is a plain device, a group or a scene.
    pub fn device_type(&self) -> Result<DeviceType> {
        let raw = self.raw_type()?;
        DeviceType::from_raw(raw).ok_or_else(|| {
            debug!("Device {} reported unknown type {}", self.id, raw);
            TelldusError::from_native(self.native(), TELLSTICK_ERROR_UNKNOWN_RESPONSE)
        })
    }

    /// Type code as reported by the library, without validation.
    pub fn raw_type(&self) -> Result<c_int> {
        check(self.native(), self.native().device_type(self.id))
    }

    /// Reads a property by name (`name`, `protocol`, `model` or `type`).
    ///
    /// `type` is rendered with its lowercase label. Unknown names fail with
    /// [`TelldusError::UnknownAttribute`] before any native call is made.
    pub fn get(&self, attribute: &str) -> Result<String> {
        match attribute.parse::<DeviceAttribute>()? {
            DeviceAttribute::Name => self.name(),
            DeviceAttribute::Protocol => self.protocol(),
            DeviceAttribute::Model => self.model(),
            DeviceAttribute::Type => self.device_type().map(|t| t.to_string()),
        }
    }

    /// Writes a property by name. `type` is read-only.
    pub fn set(&self, attribute: &str, value: &str) -> Result<()> {
        match attribute.parse::<DeviceAttribute>()? {
            DeviceAttribute::Name => self.set_name(value),
            DeviceAttribute::Protocol => self.set_protocol(value),
            DeviceAttribute::Model => self.set_model(value),
            DeviceAttribute::Type => Err(TelldusError::UnknownAttribute(attribute.to_string())),
        }
    }

    pub fn get_parameter(&self, name: &str, default_value: &str) -> Result<String> {
        let name = cstring(name)?;
        let default_value = cstring(default_value)?;
        Ok(self
            .native()
            .device_parameter(self.id, &name, &default_value))
    }

    pub fn set_parameter(&self, name: &str, value: &str) -> Result<()> {
        let name = cstring(name)?;
        let value = cstring(value)?;
        check_bool(
            self.native(),
            self.native().set_device_parameter(self.id, &name, &value),
        )
    }

    /// `device-<id> [<name>/<protocol>/<model>]`
    pub fn describe(&self) -> Result<String> {
        Ok(format!(
            "device-{} [{}/{}/{}]",
            self.id,
            self.name()?,
            self.protocol()?,
            self.model()?
        ))
    }

    /// Deletes the device from telldus-core.
    pub fn remove(&self) -> Result<()> {
        debug!("Removing device {}", self.id);
        check_bool(self.native(), self.native().remove_device(self.id))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn command(&self, name: &str, status: c_int) -> Result<()> {
        debug!("{} -> device {}: {}", name, self.id, status);
        check(self.native(), status).map(|_| ())
    }

    pub fn turn_on(&self) -> Result<()> {
        self.command("turn_on", self.native().turn_on(self.id))
    }

    pub fn turn_off(&self) -> Result<()> {
        self.command("turn_off", self.native().turn_off(self.id))
    }

    pub fn bell(&self) -> Result<()> {
        self.command("bell", self.native().bell(self.id))
    }

    /// Dims to `level` (0 is off, 255 is full).
    pub fn dim(&self, level: u8) -> Result<()> {
        self.command("dim", self.native().dim(self.id, level))
    }

    pub fn execute(&self) -> Result<()> {
        self.command("execute", self.native().execute(self.id))
    }

    pub fn up(&self) -> Result<()> {
        self.command("up", self.native().up(self.id))
    }

    pub fn down(&self) -> Result<()> {
        self.command("down", self.native().down(self.id))
    }

    pub fn stop(&self) -> Result<()> {
        self.command("stop", self.native().stop(self.id))
    }

    pub fn learn(&self) -> Result<()> {
        self.command("learn", self.native().learn(self.id))
    }

    /// Methods the device supports, restricted to those in `supported`.
    pub fn methods(&self, supported: Methods) -> Result<Methods> {
        let raw = check(
            self.native(),
            self.native().methods(self.id, supported.as_raw()),
        )?;
        Ok(Methods::from_raw(raw))
    }

    pub fn last_sent_command(&self, supported: Methods) -> Result<Methods> {
        let raw = check(
            self.native(),
            self.native().last_sent_command(self.id, supported.as_raw()),
        )?;
        Ok(Methods::from_raw(raw))
    }

    /// Value sent with the last command, e.g. the dim level.
    pub fn last_sent_value(&self) -> Result<String> {
        Ok(self.native().last_sent_value(self.id))
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device").field("id", &self.id).finish()
    }
}
