//! TellStick controllers.
//!
//! Besides the fields reported at discovery, controllers expose free-form
//! named values (`firmware`, `name`, ...) through a generic key/value API.
//! Which names exist depends on the hardware and is only known by asking.

use crate::constants::ControllerType;
use crate::error::{
    Result, TELLSTICK_ERROR_METHOD_NOT_SUPPORTED, TELLSTICK_ERROR_SYNTAX, TelldusError, check,
};
use crate::native::{ControllerRecord, NativeApi, cstring};
use log::debug;
use std::fmt;
use std::os::raw::c_int;
use std::sync::Arc;

#[derive(Clone)]
pub struct Controller {
    id: c_int,
    controller_type: c_int,
    name: String,
    available: bool,
    native: Arc<dyn NativeApi>,
}

impl Controller {
    pub(crate) fn from_record(record: ControllerRecord, native: Arc<dyn NativeApi>) -> Self {
        Self {
            id: record.id,
            controller_type: record.controller_type,
            name: record.name,
            available: record.available != 0,
            native,
        }
    }

    pub fn id(&self) -> c_int {
        self.id
    }

    /// Hardware family, `None` for types this binding does not know.
    pub fn controller_type(&self) -> Option<ControllerType> {
        ControllerType::from_raw(self.controller_type)
    }

    pub fn raw_type(&self) -> c_int {
        self.controller_type
    }

    /// Name at discovery time.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// Reads a named controller value.
    ///
    /// Names the controller does not support yield
    /// [`TelldusError::UnknownAttribute`].
    pub fn get(&self, name: &str) -> Result<String> {
        let key = cstring(name)?;
        let mut value = String::new();
        let status = self
            .native
            .controller_value(self.id, &key, &mut value);
        match check(self.native.as_ref(), status) {
            Ok(_) => Ok(value),
            Err(e) if e.is_code(TELLSTICK_ERROR_METHOD_NOT_SUPPORTED) => {
                debug!("Controller {} has no value '{}'", self.id, name);
                Err(TelldusError::UnknownAttribute(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Writes a named controller value.
    ///
    /// Names the controller rejects yield [`TelldusError::UnknownAttribute`].
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let key = cstring(name)?;
        let value = cstring(value)?;
        let status = self
            .native
            .set_controller_value(self.id, &key, &value);
        match check(self.native.as_ref(), status) {
            Ok(_) => Ok(()),
            Err(e) if e.is_code(TELLSTICK_ERROR_SYNTAX) => {
                debug!("Controller {} rejected value '{}'", self.id, name);
                Err(TelldusError::UnknownAttribute(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Forgets the controller in telldus-core.
    pub fn remove(&self) -> Result<()> {
        debug!("Removing controller {}", self.id);
        check(self.native.as_ref(), self.native.remove_controller(self.id)).map(|_| ())
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("type", &self.controller_type)
            .field("name", &self.name)
            .field("available", &self.available)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TELLSTICK_ERROR_COMMUNICATION, TELLSTICK_ERROR_PERMISSION_DENIED};
    use crate::native::stub::{Call, StubNative};

    fn controller(stub: &Arc<StubNative>) -> Controller {
        Controller::from_record(
            ControllerRecord {
                id: 1,
                controller_type: 2,
                name: "Duo".into(),
                available: 1,
            },
            stub.clone(),
        )
    }

    #[test]
    fn discovery_fields() {
        let stub = Arc::new(StubNative::new());
        let c = controller(&stub);
        assert_eq!(c.id(), 1);
        assert_eq!(c.controller_type(), Some(ControllerType::TellStickDuo));
        assert_eq!(c.name(), "Duo");
        assert!(c.available());
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn get_reads_native_value() {
        let stub = Arc::new(StubNative::new());
        stub.put_controller_value("firmware", "13");
        assert_eq!(controller(&stub).get("firmware").unwrap(), "13");
        assert_eq!(stub.calls(), vec![Call::ControllerValue(1, "firmware".into())]);
    }

    #[test]
    fn unsupported_get_is_unknown_attribute() {
        let stub = Arc::new(StubNative::new());
        stub.set_controller_status(TELLSTICK_ERROR_METHOD_NOT_SUPPORTED);
        assert_eq!(
            controller(&stub).get("serial"),
            Err(TelldusError::UnknownAttribute("serial".into()))
        );
    }

    #[test]
    fn syntax_error_on_set_is_unknown_attribute() {
        let stub = Arc::new(StubNative::new());
        stub.set_controller_status(TELLSTICK_ERROR_SYNTAX);
        assert_eq!(
            controller(&stub).set("bogus", "1"),
            Err(TelldusError::UnknownAttribute("bogus".into()))
        );
    }

    #[test]
    fn other_codes_propagate() {
        let stub = Arc::new(StubNative::new());
        let c = controller(&stub);

        stub.set_controller_status(TELLSTICK_ERROR_COMMUNICATION);
        assert!(c.get("firmware").unwrap_err().is_code(TELLSTICK_ERROR_COMMUNICATION));

        // SYNTAX is only remapped on set, METHOD_NOT_SUPPORTED only on get
        stub.set_controller_status(TELLSTICK_ERROR_SYNTAX);
        assert!(c.get("firmware").unwrap_err().is_code(TELLSTICK_ERROR_SYNTAX));
        stub.set_controller_status(TELLSTICK_ERROR_METHOD_NOT_SUPPORTED);
        assert!(
            c.set("name", "x")
                .unwrap_err()
                .is_code(TELLSTICK_ERROR_METHOD_NOT_SUPPORTED)
        );

        stub.set_controller_status(TELLSTICK_ERROR_PERMISSION_DENIED);
        assert!(c.set("name", "x").unwrap_err().is_code(TELLSTICK_ERROR_PERMISSION_DENIED));
    }

    #[test]
    fn set_then_get() {
        let stub = Arc::new(StubNative::new());
        let c = controller(&stub);
        c.set("name", "Upstairs").unwrap();
        assert_eq!(c.get("name").unwrap(), "Upstairs");
        // discovery-time name is not refreshed
        assert_eq!(c.name(), "Duo");
    }

    #[test]
    fn remove_forwards_id() {
        let stub = Arc::new(StubNative::new());
        controller(&stub).remove().unwrap();
        assert_eq!(stub.calls(), vec![Call::RemoveController(1)]);
    }
}
