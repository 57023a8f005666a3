//! Error types and result definitions for the tellcore crate.
//! Includes the telldus-core status codes and translation of native return values.

use crate::native::NativeApi;
use log::debug;
use std::os::raw::c_int;
use thiserror::Error;

/// Represents all possible errors raised by the binding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelldusError {
    /// A native call returned a status outside its success convention.
    #[error("telldus-core error {code}: {message}")]
    Native { code: c_int, message: String },

    /// The attribute name is not known to the adapter (or is read-only).
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The shared library or one of its symbols could not be loaded
    #[error("Failed to load telldus-core: {0}")]
    Load(String),

    /// A string argument cannot be passed to C (interior NUL byte)
    #[error("Invalid string argument: {0}")]
    InvalidString(String),
}

/// A specialized Result type for telldus-core operations.
pub type Result<T> = std::result::Result<T, TelldusError>;

impl From<std::ffi::NulError> for TelldusError {
    fn from(err: std::ffi::NulError) -> Self {
        TelldusError::InvalidString(err.to_string())
    }
}

impl From<libloading::Error> for TelldusError {
    fn from(err: libloading::Error) -> Self {
        TelldusError::Load(err.to_string())
    }
}

impl TelldusError {
    /// Builds a native error, asking the library for its message.
    pub fn from_native(native: &dyn NativeApi, code: c_int) -> Self {
        let mut message = native.error_string(code);
        if message.is_empty() {
            message = error_description(code)
                .unwrap_or("Unknown error")
                .to_string();
        }
        TelldusError::Native { code, message }
    }

    /// The native status code, if this error came from the library.
    pub fn code(&self) -> Option<c_int> {
        match self {
            TelldusError::Native { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true when this is a native error carrying `code`.
    pub fn is_code(&self, code: c_int) -> bool {
        self.code() == Some(code)
    }
}

/// Translates an `int` status: negative values are errors, anything else is
/// returned unchanged.
pub(crate) fn check(native: &dyn NativeApi, status: c_int) -> Result<c_int> {
    if status < TELLSTICK_SUCCESS {
        debug!(
            "Native call failed with {} ({})",
            status,
            error_code_name(status).unwrap_or("?")
        );
        return Err(TelldusError::from_native(native, status));
    }
    Ok(status)
}

/// Translates a `bool` status where `true` is the only success value.
pub(crate) fn check_bool(native: &dyn NativeApi, ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        debug!("Native call reported failure");
        Err(TelldusError::from_native(native, TELLSTICK_ERROR_UNKNOWN))
    }
}

// telldus-core status codes
define_error_codes! {
    TELLSTICK_SUCCESS = 0 => "Success",
    TELLSTICK_ERROR_NOT_FOUND = -1 => "TellStick not found",
    TELLSTICK_ERROR_PERMISSION_DENIED = -2 => "Permission denied",
    TELLSTICK_ERROR_DEVICE_NOT_FOUND = -3 => "Device not found",
    TELLSTICK_ERROR_METHOD_NOT_SUPPORTED = -4 => "The method you tried to use is not supported by the device",
    TELLSTICK_ERROR_COMMUNICATION = -5 => "An error occurred while communicating with TellStick",
    TELLSTICK_ERROR_CONNECTING_SERVICE = -6 => "Could not connect to the Telldus Service",
    TELLSTICK_ERROR_UNKNOWN_RESPONSE = -7 => "Received an unknown response",
    TELLSTICK_ERROR_SYNTAX = -8 => "Syntax error",
    TELLSTICK_ERROR_BROKEN_PIPE = -9 => "Broken pipe",
    TELLSTICK_ERROR_COMMUNICATING_SERVICE = -10 => "An error occurred while communicating with the Telldus Service",
    TELLSTICK_ERROR_CONFIG_SYNTAX = -11 => "Syntax error in the configuration file",
    TELLSTICK_ERROR_UNKNOWN = -99 => "Unknown error",
}
