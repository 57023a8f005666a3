//! Entry point: enumeration of devices, sensors and controllers, and the
//! operations that are not tied to a single device.

use crate::controller::Controller;
use crate::device::Device;
use crate::error::{Result, TELLSTICK_ERROR_DEVICE_NOT_FOUND, TELLSTICK_ERROR_NOT_FOUND, check};
use crate::library::Library;
use crate::native::{ControllerRecord, NativeApi, SensorRecord, cstring};
use crate::sensor::Sensor;
use log::debug;
use std::os::raw::c_int;
use std::sync::Arc;

/// Facade over a telldus-core handle.
///
/// All adapters created here share the handle passed to [`new`](Self::new).
///
/// ```rust,no_run
/// use tellcore::TelldusCore;
///
/// let core = TelldusCore::open()?;
/// for device in core.devices()? {
///     println!("{}", device.describe()?);
/// }
/// # Ok::<(), tellcore::TelldusError>(())
/// ```
#[derive(Clone)]
pub struct TelldusCore {
    native: Arc<dyn NativeApi>,
}

impl TelldusCore {
    /// Uses an explicit native handle.
    pub fn new(native: Arc<dyn NativeApi>) -> Self {
        Self { native }
    }

    /// Uses the process-wide library, loading it if needed.
    pub fn open() -> Result<Self> {
        let library: Arc<dyn NativeApi> = Library::shared()?;
        Ok(Self::new(library))
    }

    fn native(&self) -> &dyn NativeApi {
        self.native.as_ref()
    }

    /// All registered devices, in native enumeration order.
    ///
    /// Every call queries the library again.
    pub fn devices(&self) -> Result<Vec<Device>> {
        let count = check(self.native(), self.native().number_of_devices())?;
        let mut devices = Vec::with_capacity(count as usize);
        for index in 0..count {
            let id = check(self.native(), self.native().device_id(index))?;
            devices.push(Device::new(id, Arc::clone(&self.native)));
        }
        debug!("Enumerated {} devices", devices.len());
        Ok(devices)
    }

    /// Wraps a known device id without asking the library.
    pub fn device(&self, id: c_int) -> Device {
        Device::new(id, Arc::clone(&self.native))
    }

    /// The next sensor reported by the library, if any.
    ///
    /// At most one sensor is returned per call. An exhausted sensor list is
    /// an empty result, every other failure is an error.
    pub fn sensors(&self) -> Result<Vec<Sensor>> {
        let mut record = SensorRecord::default();
        match check(self.native(), self.native().sensor(&mut record)) {
            Ok(_) => Ok(vec![Sensor::from_record(record, Arc::clone(&self.native))]),
            Err(e) if e.is_code(TELLSTICK_ERROR_DEVICE_NOT_FOUND) => {
                debug!("No sensors reported");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// The next controller reported by the library, if any.
    ///
    /// Same contract as [`sensors`](Self::sensors), with "not found" marking
    /// the end of the list.
    pub fn controllers(&self) -> Result<Vec<Controller>> {
        let mut record = ControllerRecord::default();
        match check(self.native(), self.native().controller(&mut record)) {
            Ok(_) => Ok(vec![Controller::from_record(
                record,
                Arc::clone(&self.native),
            )]),
            Err(e) if e.is_code(TELLSTICK_ERROR_NOT_FOUND) => {
                debug!("No controllers reported");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Creates and configures a new device.
    ///
    /// Sets name, protocol, model (when given) and then each parameter in
    /// order. This is not atomic: if a later step fails, the device created by
    /// the first step stays registered and the error is returned as is.
    pub fn add_device<K, V>(
        &self,
        name: &str,
        protocol: &str,
        model: Option<&str>,
        parameters: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Device>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let id = check(self.native(), self.native().add_device())?;
        debug!("Created device {}", id);
        let device = Device::new(id, Arc::clone(&self.native));

        device.set_name(name)?;
        device.set_protocol(protocol)?;
        if let Some(model) = model {
            device.set_model(model)?;
        }
        for (key, value) in parameters {
            device.set_parameter(key.as_ref(), value.as_ref())?;
        }
        Ok(device)
    }

    /// Sends a raw protocol string through the transmitter.
    ///
    /// `reserved` is passed through untouched; use 0.
    pub fn send_raw_command(&self, command: &str, reserved: c_int) -> Result<c_int> {
        let command = cstring(command)?;
        check(
            self.native(),
            self.native().send_raw_command(&command, reserved),
        )
    }

    /// Tells telldus-core that a TellStick with this USB identity was plugged in.
    pub fn connect_controller(&self, vid: c_int, pid: c_int, serial: &str) -> Result<()> {
        let serial = cstring(serial)?;
        self.native()
            .connect_tellstick_controller(vid, pid, &serial);
        Ok(())
    }

    /// Tells telldus-core that a TellStick with this USB identity was removed.
    pub fn disconnect_controller(&self, vid: c_int, pid: c_int, serial: &str) -> Result<()> {
        let serial = cstring(serial)?;
        self.native()
            .disconnect_tellstick_controller(vid, pid, &serial);
        Ok(())
    }
}

impl std::fmt::Debug for TelldusCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelldusCore").finish_non_exhaustive()
    }
}
