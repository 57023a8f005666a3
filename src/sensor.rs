//! Sensors reported by telldus-core.

use crate::constants::DataType;
use crate::error::{Result, check};
use crate::native::{NativeApi, SensorReading, SensorRecord, cstring};
use serde::Serialize;
use std::fmt;
use std::os::raw::c_int;
use std::sync::Arc;

/// A single measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorValue {
    pub datatype: DataType,
    /// The value exactly as reported by the library (e.g. `"21.5"`).
    pub value: String,
    /// Unix time of the measurement.
    pub timestamp: i64,
}

/// A sensor as discovered by `tdSensor`.
///
/// Protocol, model, id and the supported data types are captured at discovery;
/// values are fetched on demand.
#[derive(Clone)]
pub struct Sensor {
    protocol: String,
    model: String,
    id: c_int,
    datatypes: c_int,
    native: Arc<dyn NativeApi>,
}

impl Sensor {
    pub(crate) fn from_record(record: SensorRecord, native: Arc<dyn NativeApi>) -> Self {
        Self {
            protocol: record.protocol,
            model: record.model,
            id: record.id,
            datatypes: record.datatypes,
            native,
        }
    }

    pub fn id(&self) -> c_int {
        self.id
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw bitmask of supported data types.
    pub fn datatype_mask(&self) -> c_int {
        self.datatypes
    }

    pub fn has_datatype(&self, datatype: DataType) -> bool {
        self.datatypes & datatype.as_raw() != 0
    }

    /// Supported data types, lowest bit first.
    pub fn datatypes(&self) -> impl Iterator<Item = DataType> + '_ {
        DataType::ALL
            .iter()
            .copied()
            .filter(move |dt| self.has_datatype(*dt))
    }

    /// Fetches the latest value of one data type.
    pub fn value(&self, datatype: DataType) -> Result<SensorValue> {
        let protocol = cstring(&self.protocol)?;
        let model = cstring(&self.model)?;
        let mut reading = SensorReading::default();
        check(
            self.native.as_ref(),
            self.native.sensor_value(
                &protocol,
                &model,
                self.id,
                datatype.as_raw(),
                &mut reading,
            ),
        )?;
        Ok(SensorValue {
            datatype,
            value: reading.value,
            timestamp: i64::from(reading.timestamp),
        })
    }
}

impl fmt::Debug for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sensor")
            .field("protocol", &self.protocol)
            .field("model", &self.model)
            .field("id", &self.id)
            .field("datatypes", &self.datatypes)
            .finish()
    }
}
