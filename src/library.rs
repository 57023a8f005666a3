//! Dynamic loading of the telldus-core shared library.
//!
//! [`Library`] resolves every entry point once at load time and implements
//! [`NativeApi`] on top of the raw function pointers. A process-wide instance
//! is available through [`Library::shared`]; it is loaded on first use and
//! can be released again with [`Library::shutdown`].

use crate::error::{Result, TelldusError};
use crate::native::{ControllerRecord, NativeApi, SensorReading, SensorRecord};
use libloading::Library as DynLibrary;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::ffi::{CStr, OsStr, OsString};
use std::os::raw::{c_char, c_int, c_uchar};
use std::sync::Arc;

/// Environment variable overriding the library path.
pub const LIBRARY_ENV: &str = "TELLCORE_LIBRARY";

#[cfg(target_os = "windows")]
pub const DEFAULT_LIBRARY: &str = "TelldusCore.dll";
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY: &str = "/Library/Frameworks/TelldusCore.framework/TelldusCore";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_LIBRARY: &str = "libtelldus-core.so.2";

// Out-buffer sizes handed to the library
const SENSOR_TEXT_LEN: usize = 20;
const SENSOR_VALUE_LEN: usize = 20;
const CONTROLLER_NAME_LEN: usize = 255;
const CONTROLLER_VALUE_LEN: usize = 255;

static SHARED: Mutex<Option<Arc<Library>>> = parking_lot::const_mutex(None);

// telldus-core is built with WINAPI (stdcall) on Windows and plain C elsewhere,
// which is exactly what "system" selects.
type VoidFn = unsafe extern "system" fn();
type ReleaseStringFn = unsafe extern "system" fn(*mut c_char);
type ErrorStringFn = unsafe extern "system" fn(c_int) -> *mut c_char;
type CountFn = unsafe extern "system" fn() -> c_int;
type IdFn = unsafe extern "system" fn(c_int) -> c_int;
type BoolIdFn = unsafe extern "system" fn(c_int) -> bool;
type StringIdFn = unsafe extern "system" fn(c_int) -> *mut c_char;
type SetStringFn = unsafe extern "system" fn(c_int, *const c_char) -> bool;
type GetParameterFn =
    unsafe extern "system" fn(c_int, *const c_char, *const c_char) -> *mut c_char;
type SetParameterFn = unsafe extern "system" fn(c_int, *const c_char, *const c_char) -> bool;
type MaskFn = unsafe extern "system" fn(c_int, c_int) -> c_int;
type DimFn = unsafe extern "system" fn(c_int, c_uchar) -> c_int;
type RawCommandFn = unsafe extern "system" fn(*const c_char, c_int) -> c_int;
type UsbControllerFn = unsafe extern "system" fn(c_int, c_int, *const c_char);
type ControllerFn =
    unsafe extern "system" fn(*mut c_int, *mut c_int, *mut c_char, c_int, *mut c_int) -> c_int;
type ControllerValueFn =
    unsafe extern "system" fn(c_int, *const c_char, *mut c_char, c_int) -> c_int;
type SetControllerValueFn =
    unsafe extern "system" fn(c_int, *const c_char, *const c_char) -> c_int;
type SensorFn = unsafe extern "system" fn(
    *mut c_char,
    c_int,
    *mut c_char,
    c_int,
    *mut c_int,
    *mut c_int,
) -> c_int;
type SensorValueFn = unsafe extern "system" fn(
    *const c_char,
    *const c_char,
    c_int,
    c_int,
    *mut c_char,
    c_int,
    *mut c_int,
) -> c_int;

macro_rules! native_symbols {
    ($($field:ident: $ty:ty = $sym:literal),* $(,)?) => {
        /// Resolved entry points. Valid for as long as the owning library is loaded.
        struct Symbols {
            $($field: $ty,)*
        }

        impl Symbols {
            /// # Safety
            /// Each declared type must match the exported C signature.
            unsafe fn resolve(lib: &DynLibrary) -> Result<Self> {
                Ok(Self {
                    $($field: unsafe {
                        *lib.get::<$ty>(concat!($sym, "\0").as_bytes())
                            .map_err(|e| TelldusError::Load(format!("{}: {}", $sym, e)))?
                    },)*
                })
            }
        }
    };
}

native_symbols! {
    init: VoidFn = "tdInit",
    close: VoidFn = "tdClose",
    release_string: ReleaseStringFn = "tdReleaseString",
    error_string: ErrorStringFn = "tdGetErrorString",
    number_of_devices: CountFn = "tdGetNumberOfDevices",
    device_id: IdFn = "tdGetDeviceId",
    device_type: IdFn = "tdGetDeviceType",
    add_device: CountFn = "tdAddDevice",
    remove_device: BoolIdFn = "tdRemoveDevice",
    name: StringIdFn = "tdGetName",
    set_name: SetStringFn = "tdSetName",
    protocol: StringIdFn = "tdGetProtocol",
    set_protocol: SetStringFn = "tdSetProtocol",
    model: StringIdFn = "tdGetModel",
    set_model: SetStringFn = "tdSetModel",
    device_parameter: GetParameterFn = "tdGetDeviceParameter",
    set_device_parameter: SetParameterFn = "tdSetDeviceParameter",
    methods: MaskFn = "tdMethods",
    turn_on: IdFn = "tdTurnOn",
    turn_off: IdFn = "tdTurnOff",
    bell: IdFn = "tdBell",
    dim: DimFn = "tdDim",
    execute: IdFn = "tdExecute",
    up: IdFn = "tdUp",
    down: IdFn = "tdDown",
    stop: IdFn = "tdStop",
    learn: IdFn = "tdLearn",
    last_sent_command: MaskFn = "tdLastSentCommand",
    last_sent_value: StringIdFn = "tdLastSentValue",
    send_raw_command: RawCommandFn = "tdSendRawCommand",
    connect_tellstick_controller: UsbControllerFn = "tdConnectTellStickController",
    disconnect_tellstick_controller: UsbControllerFn = "tdDisconnectTellStickController",
    controller: ControllerFn = "tdController",
    controller_value: ControllerValueFn = "tdControllerValue",
    set_controller_value: SetControllerValueFn = "tdSetControllerValue",
    remove_controller: IdFn = "tdRemoveController",
    sensor: SensorFn = "tdSensor",
    sensor_value: SensorValueFn = "tdSensorValue",
}

/// A loaded telldus-core library.
///
/// Loading calls `tdInit`; dropping the last reference calls `tdClose`.
pub struct Library {
    symbols: Symbols,
    path: OsString,
    // Keeps the symbols above valid; dropped after `Drop::drop` ran tdClose.
    _lib: DynLibrary,
}

impl Library {
    /// Loads the library named by `TELLCORE_LIBRARY`, or the platform default.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(LIBRARY_ENV).unwrap_or_else(|| DEFAULT_LIBRARY.into());
        Self::load_from(path)
    }

    /// Loads the library from an explicit path or file name.
    pub fn load_from<P: AsRef<OsStr>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_os_string();
        debug!("Loading telldus-core from {}", path.to_string_lossy());

        // SAFETY: telldus-core has no load-time initialisers with preconditions.
        let lib = unsafe { DynLibrary::new(&path) }?;
        // SAFETY: the type aliases above follow telldus-core.h.
        let symbols = unsafe { Symbols::resolve(&lib)? };

        let library = Self {
            symbols,
            path,
            _lib: lib,
        };
        library.init();
        info!("Loaded telldus-core from {}", library.path.to_string_lossy());
        Ok(library)
    }

    /// Returns the process-wide library, loading it on first use.
    ///
    /// Concurrent first callers are serialized; the library is loaded once.
    pub fn shared() -> Result<Arc<Library>> {
        let mut guard = SHARED.lock();
        if let Some(lib) = guard.as_ref() {
            return Ok(Arc::clone(lib));
        }
        let lib = Arc::new(Library::load()?);
        *guard = Some(Arc::clone(&lib));
        Ok(lib)
    }

    /// Releases the process-wide library.
    ///
    /// Handles obtained earlier keep it loaded until they are dropped; the next
    /// call to [`shared`](Self::shared) loads a fresh instance. Returns false if
    /// nothing was loaded.
    pub fn shutdown() -> bool {
        let released = SHARED.lock().take();
        match released {
            Some(lib) => {
                if Arc::strong_count(&lib) > 1 {
                    warn!("telldus-core released while still in use; closing when last handle drops");
                }
                true
            }
            None => false,
        }
    }

    /// Path or name the library was loaded from.
    pub fn path(&self) -> &OsStr {
        &self.path
    }

    /// Copies a library-owned string and hands it back with `tdReleaseString`.
    fn take_string(&self, ptr: *mut c_char) -> String {
        if ptr.is_null() {
            return String::new();
        }
        // SAFETY: non-null results are NUL-terminated and valid until released.
        let text = unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned();
        unsafe { (self.symbols.release_string)(ptr) };
        text
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        self.close();
        info!("Closed telldus-core ({})", self.path.to_string_lossy());
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library").field("path", &self.path).finish()
    }
}

/// Reads a NUL-terminated string out of a fixed-size buffer.
fn buffer_to_string(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

// SAFETY (all blocks below): arguments are valid C strings or buffers whose
// length is passed alongside, and the symbols match telldus-core.h.
impl NativeApi for Library {
    fn init(&self) {
        unsafe { (self.symbols.init)() }
    }

    fn close(&self) {
        unsafe { (self.symbols.close)() }
    }

    fn error_string(&self, code: c_int) -> String {
        let ptr = unsafe { (self.symbols.error_string)(code) };
        self.take_string(ptr)
    }

    fn number_of_devices(&self) -> c_int {
        unsafe { (self.symbols.number_of_devices)() }
    }

    fn device_id(&self, index: c_int) -> c_int {
        unsafe { (self.symbols.device_id)(index) }
    }

    fn device_type(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.device_type)(id) }
    }

    fn add_device(&self) -> c_int {
        unsafe { (self.symbols.add_device)() }
    }

    fn remove_device(&self, id: c_int) -> bool {
        unsafe { (self.symbols.remove_device)(id) }
    }

    fn name(&self, id: c_int) -> String {
        let ptr = unsafe { (self.symbols.name)(id) };
        self.take_string(ptr)
    }

    fn set_name(&self, id: c_int, name: &CStr) -> bool {
        unsafe { (self.symbols.set_name)(id, name.as_ptr()) }
    }

    fn protocol(&self, id: c_int) -> String {
        let ptr = unsafe { (self.symbols.protocol)(id) };
        self.take_string(ptr)
    }

    fn set_protocol(&self, id: c_int, protocol: &CStr) -> bool {
        unsafe { (self.symbols.set_protocol)(id, protocol.as_ptr()) }
    }

    fn model(&self, id: c_int) -> String {
        let ptr = unsafe { (self.symbols.model)(id) };
        self.take_string(ptr)
    }

    fn set_model(&self, id: c_int, model: &CStr) -> bool {
        unsafe { (self.symbols.set_model)(id, model.as_ptr()) }
    }

    fn device_parameter(&self, id: c_int, name: &CStr, default_value: &CStr) -> String {
        let ptr =
            unsafe { (self.symbols.device_parameter)(id, name.as_ptr(), default_value.as_ptr()) };
        self.take_string(ptr)
    }

    fn set_device_parameter(&self, id: c_int, name: &CStr, value: &CStr) -> bool {
        unsafe { (self.symbols.set_device_parameter)(id, name.as_ptr(), value.as_ptr()) }
    }

    fn methods(&self, id: c_int, methods_supported: c_int) -> c_int {
        unsafe { (self.symbols.methods)(id, methods_supported) }
    }

    fn turn_on(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.turn_on)(id) }
    }

    fn turn_off(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.turn_off)(id) }
    }

    fn bell(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.bell)(id) }
    }

    fn dim(&self, id: c_int, level: u8) -> c_int {
        unsafe { (self.symbols.dim)(id, level) }
    }

    fn execute(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.execute)(id) }
    }

    fn up(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.up)(id) }
    }

    fn down(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.down)(id) }
    }

    fn stop(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.stop)(id) }
    }

    fn learn(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.learn)(id) }
    }

    fn last_sent_command(&self, id: c_int, methods_supported: c_int) -> c_int {
        unsafe { (self.symbols.last_sent_command)(id, methods_supported) }
    }

    fn last_sent_value(&self, id: c_int) -> String {
        let ptr = unsafe { (self.symbols.last_sent_value)(id) };
        self.take_string(ptr)
    }

    fn send_raw_command(&self, command: &CStr, reserved: c_int) -> c_int {
        unsafe { (self.symbols.send_raw_command)(command.as_ptr(), reserved) }
    }

    fn connect_tellstick_controller(&self, vid: c_int, pid: c_int, serial: &CStr) {
        unsafe { (self.symbols.connect_tellstick_controller)(vid, pid, serial.as_ptr()) }
    }

    fn disconnect_tellstick_controller(&self, vid: c_int, pid: c_int, serial: &CStr) {
        unsafe { (self.symbols.disconnect_tellstick_controller)(vid, pid, serial.as_ptr()) }
    }

    fn controller(&self, out: &mut ControllerRecord) -> c_int {
        let mut id: c_int = 0;
        let mut controller_type: c_int = 0;
        let mut available: c_int = 0;
        let mut name = [0 as c_char; CONTROLLER_NAME_LEN];
        let status = unsafe {
            (self.symbols.controller)(
                &mut id,
                &mut controller_type,
                name.as_mut_ptr(),
                name.len() as c_int,
                &mut available,
            )
        };
        if status == crate::error::TELLSTICK_SUCCESS {
            *out = ControllerRecord {
                id,
                controller_type,
                name: buffer_to_string(&name),
                available,
            };
        }
        status
    }

    fn controller_value(&self, id: c_int, name: &CStr, out: &mut String) -> c_int {
        let mut value = [0 as c_char; CONTROLLER_VALUE_LEN];
        let status = unsafe {
            (self.symbols.controller_value)(
                id,
                name.as_ptr(),
                value.as_mut_ptr(),
                value.len() as c_int,
            )
        };
        if status == crate::error::TELLSTICK_SUCCESS {
            *out = buffer_to_string(&value);
        }
        status
    }

    fn set_controller_value(&self, id: c_int, name: &CStr, value: &CStr) -> c_int {
        unsafe { (self.symbols.set_controller_value)(id, name.as_ptr(), value.as_ptr()) }
    }

    fn remove_controller(&self, id: c_int) -> c_int {
        unsafe { (self.symbols.remove_controller)(id) }
    }

    fn sensor(&self, out: &mut SensorRecord) -> c_int {
        let mut protocol = [0 as c_char; SENSOR_TEXT_LEN];
        let mut model = [0 as c_char; SENSOR_TEXT_LEN];
        let mut id: c_int = 0;
        let mut datatypes: c_int = 0;
        let status = unsafe {
            (self.symbols.sensor)(
                protocol.as_mut_ptr(),
                protocol.len() as c_int,
                model.as_mut_ptr(),
                model.len() as c_int,
                &mut id,
                &mut datatypes,
            )
        };
        if status == crate::error::TELLSTICK_SUCCESS {
            *out = SensorRecord {
                protocol: buffer_to_string(&protocol),
                model: buffer_to_string(&model),
                id,
                datatypes,
            };
        }
        status
    }

    fn sensor_value(
        &self,
        protocol: &CStr,
        model: &CStr,
        id: c_int,
        datatype: c_int,
        out: &mut SensorReading,
    ) -> c_int {
        let mut value = [0 as c_char; SENSOR_VALUE_LEN];
        let mut timestamp: c_int = 0;
        let status = unsafe {
            (self.symbols.sensor_value)(
                protocol.as_ptr(),
                model.as_ptr(),
                id,
                datatype,
                value.as_mut_ptr(),
                value.len() as c_int,
                &mut timestamp,
            )
        };
        if status == crate::error::TELLSTICK_SUCCESS {
            *out = SensorReading {
                value: buffer_to_string(&value),
                timestamp,
            };
        }
        status
    }
}
