//! The telldus-core call surface.
//!
//! [`NativeApi`] mirrors the C API one function per entry point: status codes
//! stay `c_int`, string arguments are `&CStr`, and out-parameters are written
//! into the record types below. Translating statuses into errors is left to
//! the callers (see [`crate::error`]), so an implementation only marshals.
//!
//! [`Library`](crate::Library) is the production implementation. Tests
//! substitute a recording stub.

use crate::error::Result;
use std::ffi::{CStr, CString};
use std::os::raw::c_int;

/// Converts a Rust string argument for the C API.
pub(crate) fn cstring(value: &str) -> Result<CString> {
    Ok(CString::new(value)?)
}

/// Out-parameters of `tdSensor`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorRecord {
    pub protocol: String,
    pub model: String,
    pub id: c_int,
    pub datatypes: c_int,
}

/// Out-parameters of `tdSensorValue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorReading {
    pub value: String,
    pub timestamp: c_int,
}

/// Out-parameters of `tdController`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerRecord {
    pub id: c_int,
    pub controller_type: c_int,
    pub name: String,
    pub available: c_int,
}

/// One method per telldus-core entry point used by the binding.
pub trait NativeApi: Send + Sync {
    fn init(&self);
    fn close(&self);

    /// `tdGetErrorString`
    fn error_string(&self, code: c_int) -> String;

    // Device registry
    fn number_of_devices(&self) -> c_int;
    fn device_id(&self, index: c_int) -> c_int;
    fn device_type(&self, id: c_int) -> c_int;
    fn add_device(&self) -> c_int;
    fn remove_device(&self, id: c_int) -> bool;

    fn name(&self, id: c_int) -> String;
    fn set_name(&self, id: c_int, name: &CStr) -> bool;
    fn protocol(&self, id: c_int) -> String;
    fn set_protocol(&self, id: c_int, protocol: &CStr) -> bool;
    fn model(&self, id: c_int) -> String;
    fn set_model(&self, id: c_int, model: &CStr) -> bool;
    fn device_parameter(&self, id: c_int, name: &CStr, default_value: &CStr) -> String;
    fn set_device_parameter(&self, id: c_int, name: &CStr, value: &CStr) -> bool;

    // Device commands
    fn methods(&self, id: c_int, methods_supported: c_int) -> c_int;
    fn turn_on(&self, id: c_int) -> c_int;
    fn turn_off(&self, id: c_int) -> c_int;
    fn bell(&self, id: c_int) -> c_int;
    fn dim(&self, id: c_int, level: u8) -> c_int;
    fn execute(&self, id: c_int) -> c_int;
    fn up(&self, id: c_int) -> c_int;
    fn down(&self, id: c_int) -> c_int;
    fn stop(&self, id: c_int) -> c_int;
    fn learn(&self, id: c_int) -> c_int;
    fn last_sent_command(&self, id: c_int, methods_supported: c_int) -> c_int;
    fn last_sent_value(&self, id: c_int) -> String;

    /// `tdSendRawCommand`
    fn send_raw_command(&self, command: &CStr, reserved: c_int) -> c_int;

    // Controllers
    fn connect_tellstick_controller(&self, vid: c_int, pid: c_int, serial: &CStr);
    fn disconnect_tellstick_controller(&self, vid: c_int, pid: c_int, serial: &CStr);
    fn controller(&self, out: &mut ControllerRecord) -> c_int;
    fn controller_value(&self, id: c_int, name: &CStr, out: &mut String) -> c_int;
    fn set_controller_value(&self, id: c_int, name: &CStr, value: &CStr) -> c_int;
    fn remove_controller(&self, id: c_int) -> c_int;

    // Sensors
    fn sensor(&self, out: &mut SensorRecord) -> c_int;
    fn sensor_value(
        &self,
        protocol: &CStr,
        model: &CStr,
        id: c_int,
        datatype: c_int,
        out: &mut SensorReading,
    ) -> c_int;
}

#[cfg(test)]
pub(crate) mod stub {
    //! Recording implementation of [`NativeApi`] with scripted results.

    use super::*;
    use crate::error::TELLSTICK_SUCCESS;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        NumberOfDevices,
        DeviceId(c_int),
        DeviceType(c_int),
        AddDevice,
        RemoveDevice(c_int),
        Name(c_int),
        SetName(c_int, String),
        Protocol(c_int),
        SetProtocol(c_int, String),
        Model(c_int),
        SetModel(c_int, String),
        DeviceParameter(c_int, String, String),
        SetDeviceParameter(c_int, String, String),
        Methods(c_int, c_int),
        TurnOn(c_int),
        TurnOff(c_int),
        Bell(c_int),
        Dim(c_int, u8),
        Execute(c_int),
        Up(c_int),
        Down(c_int),
        Stop(c_int),
        Learn(c_int),
        LastSentCommand(c_int, c_int),
        LastSentValue(c_int),
        SendRawCommand(String, c_int),
        Connect(c_int, c_int, String),
        Disconnect(c_int, c_int, String),
        Controller,
        ControllerValue(c_int, String),
        SetControllerValue(c_int, String, String),
        RemoveController(c_int),
        Sensor,
        SensorValue(String, String, c_int, c_int),
    }

    struct State {
        calls: Vec<Call>,
        error_strings: bool,
        device_ids: Vec<c_int>,
        next_device_id: c_int,
        device_type: c_int,
        names: HashMap<c_int, String>,
        protocols: HashMap<c_int, String>,
        models: HashMap<c_int, String>,
        parameters: HashMap<(c_int, String), String>,
        failing_setter: Option<&'static str>,
        command_status: c_int,
        methods: c_int,
        last_sent_value: String,
        sensor: std::result::Result<SensorRecord, c_int>,
        sensor_value: std::result::Result<SensorReading, c_int>,
        controller: std::result::Result<ControllerRecord, c_int>,
        controller_values: HashMap<String, String>,
        controller_status: c_int,
    }

    pub struct StubNative {
        state: Mutex<State>,
    }

    fn text(s: &CStr) -> String {
        s.to_string_lossy().into_owned()
    }

    impl StubNative {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(State {
                    calls: Vec::new(),
                    error_strings: true,
                    device_ids: Vec::new(),
                    next_device_id: 1,
                    device_type: 1,
                    names: HashMap::new(),
                    protocols: HashMap::new(),
                    models: HashMap::new(),
                    parameters: HashMap::new(),
                    failing_setter: None,
                    command_status: TELLSTICK_SUCCESS,
                    methods: 0,
                    last_sent_value: String::new(),
                    sensor: Err(crate::error::TELLSTICK_ERROR_DEVICE_NOT_FOUND),
                    sensor_value: Err(crate::error::TELLSTICK_ERROR_DEVICE_NOT_FOUND),
                    controller: Err(crate::error::TELLSTICK_ERROR_NOT_FOUND),
                    controller_values: HashMap::new(),
                    controller_status: TELLSTICK_SUCCESS,
                }),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.lock().calls.clone()
        }

        pub fn clear_calls(&self) {
            self.state.lock().calls.clear();
        }

        pub fn set_error_strings(&self, enabled: bool) {
            self.state.lock().error_strings = enabled;
        }

        pub fn set_devices(&self, ids: Vec<c_int>) {
            self.state.lock().device_ids = ids;
        }

        pub fn set_next_device_id(&self, id: c_int) {
            self.state.lock().next_device_id = id;
        }

        pub fn set_device_type(&self, raw: c_int) {
            self.state.lock().device_type = raw;
        }

        /// Makes one setter (`name`, `protocol`, `model` or `parameter`) return false.
        pub fn fail_setter(&self, which: &'static str) {
            self.state.lock().failing_setter = Some(which);
        }

        pub fn set_command_status(&self, status: c_int) {
            self.state.lock().command_status = status;
        }

        pub fn set_methods(&self, raw: c_int) {
            self.state.lock().methods = raw;
        }

        pub fn set_last_sent_value(&self, value: &str) {
            self.state.lock().last_sent_value = value.to_string();
        }

        pub fn set_sensor(&self, sensor: std::result::Result<SensorRecord, c_int>) {
            self.state.lock().sensor = sensor;
        }

        pub fn set_sensor_value(&self, value: std::result::Result<SensorReading, c_int>) {
            self.state.lock().sensor_value = value;
        }

        pub fn set_controller(&self, controller: std::result::Result<ControllerRecord, c_int>) {
            self.state.lock().controller = controller;
        }

        pub fn put_controller_value(&self, name: &str, value: &str) {
            self.state
                .lock()
                .controller_values
                .insert(name.to_string(), value.to_string());
        }

        /// Status returned by every controller value call, overriding the map.
        pub fn set_controller_status(&self, status: c_int) {
            self.state.lock().controller_status = status;
        }

        fn record(&self, call: Call) {
            self.state.lock().calls.push(call);
        }

        fn command(&self, call: Call) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(call);
            state.command_status
        }

        fn store(&self, which: &'static str, call: Call) -> bool {
            let mut state = self.state.lock();
            state.calls.push(call.clone());
            if state.failing_setter == Some(which) {
                return false;
            }
            match call {
                Call::SetName(id, v) => {
                    state.names.insert(id, v);
                }
                Call::SetProtocol(id, v) => {
                    state.protocols.insert(id, v);
                }
                Call::SetModel(id, v) => {
                    state.models.insert(id, v);
                }
                Call::SetDeviceParameter(id, k, v) => {
                    state.parameters.insert((id, k), v);
                }
                _ => {}
            }
            true
        }
    }

    impl NativeApi for StubNative {
        fn init(&self) {}

        fn close(&self) {}

        fn error_string(&self, code: c_int) -> String {
            if self.state.lock().error_strings {
                format!("stub error {code}")
            } else {
                String::new()
            }
        }

        fn number_of_devices(&self) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::NumberOfDevices);
            state.device_ids.len() as c_int
        }

        fn device_id(&self, index: c_int) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::DeviceId(index));
            state
                .device_ids
                .get(index as usize)
                .copied()
                .unwrap_or(crate::error::TELLSTICK_ERROR_DEVICE_NOT_FOUND)
        }

        fn device_type(&self, id: c_int) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::DeviceType(id));
            state.device_type
        }

        fn add_device(&self) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::AddDevice);
            let id = state.next_device_id;
            if id > 0 {
                state.device_ids.push(id);
            }
            id
        }

        fn remove_device(&self, id: c_int) -> bool {
            let mut state = self.state.lock();
            state.calls.push(Call::RemoveDevice(id));
            let before = state.device_ids.len();
            state.device_ids.retain(|d| *d != id);
            state.device_ids.len() != before
        }

        fn name(&self, id: c_int) -> String {
            let mut state = self.state.lock();
            state.calls.push(Call::Name(id));
            state.names.get(&id).cloned().unwrap_or_default()
        }

        fn set_name(&self, id: c_int, name: &CStr) -> bool {
            self.store("name", Call::SetName(id, text(name)))
        }

        fn protocol(&self, id: c_int) -> String {
            let mut state = self.state.lock();
            state.calls.push(Call::Protocol(id));
            state.protocols.get(&id).cloned().unwrap_or_default()
        }

        fn set_protocol(&self, id: c_int, protocol: &CStr) -> bool {
            self.store("protocol", Call::SetProtocol(id, text(protocol)))
        }

        fn model(&self, id: c_int) -> String {
            let mut state = self.state.lock();
            state.calls.push(Call::Model(id));
            state.models.get(&id).cloned().unwrap_or_default()
        }

        fn set_model(&self, id: c_int, model: &CStr) -> bool {
            self.store("model", Call::SetModel(id, text(model)))
        }

        fn device_parameter(&self, id: c_int, name: &CStr, default_value: &CStr) -> String {
            let mut state = self.state.lock();
            let (name, default_value) = (text(name), text(default_value));
            state
                .calls
                .push(Call::DeviceParameter(id, name.clone(), default_value.clone()));
            state
                .parameters
                .get(&(id, name))
                .cloned()
                .unwrap_or(default_value)
        }

        fn set_device_parameter(&self, id: c_int, name: &CStr, value: &CStr) -> bool {
            self.store(
                "parameter",
                Call::SetDeviceParameter(id, text(name), text(value)),
            )
        }

        fn methods(&self, id: c_int, methods_supported: c_int) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::Methods(id, methods_supported));
            state.methods & methods_supported
        }

        fn turn_on(&self, id: c_int) -> c_int {
            self.command(Call::TurnOn(id))
        }

        fn turn_off(&self, id: c_int) -> c_int {
            self.command(Call::TurnOff(id))
        }

        fn bell(&self, id: c_int) -> c_int {
            self.command(Call::Bell(id))
        }

        fn dim(&self, id: c_int, level: u8) -> c_int {
            self.command(Call::Dim(id, level))
        }

        fn execute(&self, id: c_int) -> c_int {
            self.command(Call::Execute(id))
        }

        fn up(&self, id: c_int) -> c_int {
            self.command(Call::Up(id))
        }

        fn down(&self, id: c_int) -> c_int {
            self.command(Call::Down(id))
        }

        fn stop(&self, id: c_int) -> c_int {
            self.command(Call::Stop(id))
        }

        fn learn(&self, id: c_int) -> c_int {
            self.command(Call::Learn(id))
        }

        fn last_sent_command(&self, id: c_int, methods_supported: c_int) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::LastSentCommand(id, methods_supported));
            state.methods & methods_supported
        }

        fn last_sent_value(&self, id: c_int) -> String {
            let mut state = self.state.lock();
            state.calls.push(Call::LastSentValue(id));
            state.last_sent_value.clone()
        }

        fn send_raw_command(&self, command: &CStr, reserved: c_int) -> c_int {
            self.command(Call::SendRawCommand(text(command), reserved))
        }

        fn connect_tellstick_controller(&self, vid: c_int, pid: c_int, serial: &CStr) {
            self.record(Call::Connect(vid, pid, text(serial)));
        }

        fn disconnect_tellstick_controller(&self, vid: c_int, pid: c_int, serial: &CStr) {
            self.record(Call::Disconnect(vid, pid, text(serial)));
        }

        fn controller(&self, out: &mut ControllerRecord) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::Controller);
            match &state.controller {
                Ok(record) => {
                    *out = record.clone();
                    TELLSTICK_SUCCESS
                }
                Err(code) => *code,
            }
        }

        fn controller_value(&self, id: c_int, name: &CStr, out: &mut String) -> c_int {
            let mut state = self.state.lock();
            let name = text(name);
            state.calls.push(Call::ControllerValue(id, name.clone()));
            if state.controller_status != TELLSTICK_SUCCESS {
                return state.controller_status;
            }
            match state.controller_values.get(&name) {
                Some(value) => {
                    *out = value.clone();
                    TELLSTICK_SUCCESS
                }
                None => crate::error::TELLSTICK_ERROR_METHOD_NOT_SUPPORTED,
            }
        }

        fn set_controller_value(&self, id: c_int, name: &CStr, value: &CStr) -> c_int {
            let mut state = self.state.lock();
            let (name, value) = (text(name), text(value));
            state
                .calls
                .push(Call::SetControllerValue(id, name.clone(), value.clone()));
            if state.controller_status != TELLSTICK_SUCCESS {
                return state.controller_status;
            }
            state.controller_values.insert(name, value);
            TELLSTICK_SUCCESS
        }

        fn remove_controller(&self, id: c_int) -> c_int {
            self.command(Call::RemoveController(id))
        }

        fn sensor(&self, out: &mut SensorRecord) -> c_int {
            let mut state = self.state.lock();
            state.calls.push(Call::Sensor);
            match &state.sensor {
                Ok(record) => {
                    *out = record.clone();
                    TELLSTICK_SUCCESS
                }
                Err(code) => *code,
            }
        }

        fn sensor_value(
            &self,
            protocol: &CStr,
            model: &CStr,
            id: c_int,
            datatype: c_int,
            out: &mut SensorReading,
        ) -> c_int {
            let mut state = self.state.lock();
            state
                .calls
                .push(Call::SensorValue(text(protocol), text(model), id, datatype));
            match &state.sensor_value {
                Ok(reading) => {
                    *out = reading.clone();
                    TELLSTICK_SUCCESS
                }
                Err(code) => *code,
            }
        }
    }
}
