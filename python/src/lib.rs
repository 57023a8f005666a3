//! Python bindings for the tellcore library.
//!
//! Exposes telldus-core with an attribute-style API: device and controller
//! properties are read and written as plain Python attributes
//! (`device.name = "Lamp"`, `controller.firmware`).

use ::tellcore::constants::{ControllerType, DataType, DeviceType, Methods};
use ::tellcore::error as codes;
use ::tellcore::{
    Controller as RsController, Device as RsDevice, Sensor as RsSensor,
    TelldusCore as RsTelldusCore, TelldusError as RsError,
};
use log::LevelFilter;
use pyo3::create_exception;
use pyo3::exceptions::{PyAttributeError, PyException, PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

create_exception!(
    tellcore,
    TelldusError,
    PyException,
    "Native telldus-core error. args are (code, message)."
);

fn to_py_err(err: RsError) -> PyErr {
    match err {
        RsError::Native { code, message } => TelldusError::new_err((code, message)),
        RsError::UnknownAttribute(name) => PyAttributeError::new_err(name),
        RsError::InvalidString(msg) => PyValueError::new_err(msg),
        RsError::Load(msg) => PyOSError::new_err(msg),
    }
}

trait IntoPyResult<T> {
    fn py(self) -> PyResult<T>;
}

impl<T> IntoPyResult<T> for ::tellcore::Result<T> {
    fn py(self) -> PyResult<T> {
        self.map_err(to_py_err)
    }
}

fn datatype(raw: i32) -> PyResult<DataType> {
    DataType::from_raw(raw)
        .ok_or_else(|| PyValueError::new_err(format!("Invalid datatype: {}", raw)))
}

/// Entry point for device, sensor and controller access.
#[pyclass(module = "tellcore")]
pub struct TelldusCore {
    inner: RsTelldusCore,
}

#[pymethods]
impl TelldusCore {
    #[new]
    pub fn new() -> PyResult<Self> {
        Ok(Self {
            inner: RsTelldusCore::open().py()?,
        })
    }

    pub fn devices(&self, py: Python<'_>) -> PyResult<Vec<Device>> {
        let devices = py.detach(|| self.inner.devices()).py()?;
        Ok(devices.into_iter().map(|inner| Device { inner }).collect())
    }

    pub fn sensors(&self, py: Python<'_>) -> PyResult<Vec<Sensor>> {
        let sensors = py.detach(|| self.inner.sensors()).py()?;
        Ok(sensors.into_iter().map(|inner| Sensor { inner }).collect())
    }

    pub fn controllers(&self, py: Python<'_>) -> PyResult<Vec<Controller>> {
        let controllers = py.detach(|| self.inner.controllers()).py()?;
        Ok(controllers
            .into_iter()
            .map(|inner| Controller { inner })
            .collect())
    }

    /// Creates a device; keyword arguments become device parameters.
    #[pyo3(signature = (name, protocol, model=None, **parameters))]
    pub fn add_device(
        &self,
        py: Python<'_>,
        name: &str,
        protocol: &str,
        model: Option<&str>,
        parameters: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<Device> {
        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(dict) = parameters {
            for (key, value) in dict.iter() {
                params.push((key.extract::<String>()?, value.str()?.extract::<String>()?));
            }
        }
        let inner = py
            .detach(|| self.inner.add_device(name, protocol, model, params))
            .py()?;
        Ok(Device { inner })
    }

    #[pyo3(signature = (command, reserved=0))]
    pub fn send_raw_command(&self, py: Python<'_>, command: &str, reserved: i32) -> PyResult<i32> {
        py.detach(|| self.inner.send_raw_command(command, reserved))
            .py()
    }

    pub fn connect_controller(&self, vid: i32, pid: i32, serial: &str) -> PyResult<()> {
        self.inner.connect_controller(vid, pid, serial).py()
    }

    pub fn disconnect_controller(&self, vid: i32, pid: i32, serial: &str) -> PyResult<()> {
        self.inner.disconnect_controller(vid, pid, serial).py()
    }
}

/// Device handle for Python.
#[pyclass(module = "tellcore")]
#[derive(Clone)]
pub struct Device {
    inner: RsDevice,
}

#[pymethods]
impl Device {
    #[getter]
    pub fn id(&self) -> i32 {
        self.inner.id()
    }

    /// `name`, `protocol`, `model` and `type`.
    pub fn __getattr__(&self, py: Python<'_>, name: &str) -> PyResult<Py<PyAny>> {
        if name == "type" {
            let raw = self.inner.raw_type().py()?;
            return Ok(raw.into_pyobject(py)?.into_any().unbind());
        }
        let value = self.inner.get(name).py()?;
        Ok(value.into_pyobject(py)?.into_any().unbind())
    }

    pub fn __setattr__(&self, name: &str, value: &str) -> PyResult<()> {
        self.inner.set(name, value).py()
    }

    pub fn __str__(&self) -> PyResult<String> {
        self.inner.describe().py()
    }

    pub fn __repr__(&self) -> String {
        format!("Device(id={})", self.inner.id())
    }

    pub fn remove(&self) -> PyResult<()> {
        self.inner.remove().py()
    }

    pub fn get_parameter(&self, name: &str, default_value: &str) -> PyResult<String> {
        self.inner.get_parameter(name, default_value).py()
    }

    pub fn set_parameter(&self, name: &str, value: &str) -> PyResult<()> {
        self.inner.set_parameter(name, value).py()
    }

    pub fn turn_on(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.turn_on()).py()
    }

    pub fn turn_off(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.turn_off()).py()
    }

    pub fn bell(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.bell()).py()
    }

    pub fn dim(&self, py: Python<'_>, level: u8) -> PyResult<()> {
        py.detach(|| self.inner.dim(level)).py()
    }

    pub fn execute(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.execute()).py()
    }

    pub fn up(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.up()).py()
    }

    pub fn down(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.down()).py()
    }

    pub fn stop(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.stop()).py()
    }

    pub fn learn(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.inner.learn()).py()
    }

    pub fn methods(&self, methods_supported: i32) -> PyResult<i32> {
        self.inner
            .methods(Methods::from_raw(methods_supported))
            .map(Methods::as_raw)
            .py()
    }

    pub fn last_sent_command(&self, methods_supported: i32) -> PyResult<i32> {
        self.inner
            .last_sent_command(Methods::from_raw(methods_supported))
            .map(Methods::as_raw)
            .py()
    }

    pub fn last_sent_value(&self) -> PyResult<String> {
        self.inner.last_sent_value().py()
    }
}

/// Sensor handle for Python.
#[pyclass(module = "tellcore")]
#[derive(Clone)]
pub struct Sensor {
    inner: RsSensor,
}

#[pymethods]
impl Sensor {
    #[getter]
    pub fn id(&self) -> i32 {
        self.inner.id()
    }

    #[getter]
    pub fn protocol(&self) -> String {
        self.inner.protocol().to_string()
    }

    #[getter]
    pub fn model(&self) -> String {
        self.inner.model().to_string()
    }

    #[getter]
    pub fn datatypes(&self) -> i32 {
        self.inner.datatype_mask()
    }

    pub fn has_value(&self, datatype: i32) -> PyResult<bool> {
        Ok(self.inner.has_datatype(self::datatype(datatype)?))
    }

    /// Returns `{"value": str, "timestamp": int}`.
    pub fn value<'py>(&self, py: Python<'py>, datatype: i32) -> PyResult<Bound<'py, PyDict>> {
        let dt = self::datatype(datatype)?;
        let reading = py.detach(|| self.inner.value(dt)).py()?;
        let dict = PyDict::new(py);
        dict.set_item("value", reading.value)?;
        dict.set_item("timestamp", reading.timestamp)?;
        Ok(dict)
    }

    pub fn __repr__(&self) -> String {
        format!(
            "Sensor(protocol='{}', model='{}', id={})",
            self.inner.protocol(),
            self.inner.model(),
            self.inner.id()
        )
    }
}

/// Controller handle for Python.
#[pyclass(module = "tellcore")]
#[derive(Clone)]
pub struct Controller {
    inner: RsController,
}

#[pymethods]
impl Controller {
    #[getter]
    pub fn id(&self) -> i32 {
        self.inner.id()
    }

    #[getter]
    pub fn r#type(&self) -> i32 {
        self.inner.raw_type()
    }

    #[getter]
    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    #[getter]
    pub fn available(&self) -> bool {
        self.inner.available()
    }

    pub fn __getattr__(&self, py: Python<'_>, name: &str) -> PyResult<String> {
        py.detach(|| self.inner.get(name)).py()
    }

    pub fn __setattr__(&self, py: Python<'_>, name: &str, value: &str) -> PyResult<()> {
        py.detach(|| self.inner.set(name, value)).py()
    }

    pub fn remove(&self) -> PyResult<()> {
        self.inner.remove().py()
    }

    pub fn __repr__(&self) -> String {
        format!(
            "Controller(id={}, name='{}', available={})",
            self.inner.id(),
            self.inner.name(),
            self.inner.available()
        )
    }
}

fn add_constants(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let error_codes = [
        ("TELLSTICK_SUCCESS", codes::TELLSTICK_SUCCESS),
        ("TELLSTICK_ERROR_NOT_FOUND", codes::TELLSTICK_ERROR_NOT_FOUND),
        ("TELLSTICK_ERROR_PERMISSION_DENIED", codes::TELLSTICK_ERROR_PERMISSION_DENIED),
        ("TELLSTICK_ERROR_DEVICE_NOT_FOUND", codes::TELLSTICK_ERROR_DEVICE_NOT_FOUND),
        ("TELLSTICK_ERROR_METHOD_NOT_SUPPORTED", codes::TELLSTICK_ERROR_METHOD_NOT_SUPPORTED),
        ("TELLSTICK_ERROR_COMMUNICATION", codes::TELLSTICK_ERROR_COMMUNICATION),
        ("TELLSTICK_ERROR_CONNECTING_SERVICE", codes::TELLSTICK_ERROR_CONNECTING_SERVICE),
        ("TELLSTICK_ERROR_UNKNOWN_RESPONSE", codes::TELLSTICK_ERROR_UNKNOWN_RESPONSE),
        ("TELLSTICK_ERROR_SYNTAX", codes::TELLSTICK_ERROR_SYNTAX),
        ("TELLSTICK_ERROR_BROKEN_PIPE", codes::TELLSTICK_ERROR_BROKEN_PIPE),
        ("TELLSTICK_ERROR_COMMUNICATING_SERVICE", codes::TELLSTICK_ERROR_COMMUNICATING_SERVICE),
        ("TELLSTICK_ERROR_CONFIG_SYNTAX", codes::TELLSTICK_ERROR_CONFIG_SYNTAX),
        ("TELLSTICK_ERROR_UNKNOWN", codes::TELLSTICK_ERROR_UNKNOWN),
    ];
    for (name, value) in error_codes {
        m.add(name, value)?;
    }

    let methods = [
        ("TELLSTICK_TURNON", Methods::TURNON),
        ("TELLSTICK_TURNOFF", Methods::TURNOFF),
        ("TELLSTICK_BELL", Methods::BELL),
        ("TELLSTICK_TOGGLE", Methods::TOGGLE),
        ("TELLSTICK_DIM", Methods::DIM),
        ("TELLSTICK_LEARN", Methods::LEARN),
        ("TELLSTICK_EXECUTE", Methods::EXECUTE),
        ("TELLSTICK_UP", Methods::UP),
        ("TELLSTICK_DOWN", Methods::DOWN),
        ("TELLSTICK_STOP", Methods::STOP),
    ];
    for (name, value) in methods {
        m.add(name, value.as_raw())?;
    }

    for dt in DeviceType::ALL {
        m.add(format!("TELLSTICK_TYPE_{}", dt.as_str().to_uppercase()), dt.as_raw())?;
    }
    for dt in DataType::ALL {
        m.add(format!("TELLSTICK_{}", dt.as_str().to_uppercase()), dt.as_raw())?;
    }
    for ct in ControllerType::ALL {
        let suffix = ct.as_str().to_uppercase().replace('-', "_");
        m.add(format!("TELLSTICK_CONTROLLER_{}", suffix), ct.as_raw())?;
    }
    Ok(())
}

#[pymodule]
fn tellcore(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    let _ = py.import("logging")?;

    // Initialize logging bridge from Rust to Python
    let _ = pyo3_log::try_init();

    #[pyfunction]
    fn _tellcore_atexit() {
        log::set_max_level(LevelFilter::Off);
        ::tellcore::Library::shutdown();
    }

    #[pyfunction]
    fn version() -> &'static str {
        ::tellcore::version()
    }

    m.add_function(pyo3::wrap_pyfunction!(_tellcore_atexit, m)?)?;
    m.add_function(pyo3::wrap_pyfunction!(version, m)?)?;

    let atexit = py.import("atexit")?;
    atexit.call_method1("register", (m.getattr("_tellcore_atexit")?,))?;

    m.add("TelldusError", py.get_type::<TelldusError>())?;
    m.add_class::<TelldusCore>()?;
    m.add_class::<Device>()?;
    m.add_class::<Sensor>()?;
    m.add_class::<Controller>()?;
    add_constants(m)?;

    Ok(())
}
