//! Dataset parameters
//!
//! [`ParamStore`] is the read-only key-value view of a parameter file.
//! [`DatasetParams`] is the typed, validated subset the pipeline consumes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Default number of output classes
pub const DEFAULT_NUM_CLASSES: u32 = 10;

/// Largest sensor extent addressable by the 8-bit record fields
pub const MAX_EXTENT: u32 = 256;

/// Largest channel count addressable by the record's channel bit
pub const MAX_CHANNELS: u32 = 2;

/// One value of the parameter store
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Str(String),
    /// Boolean value
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{:?}", v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Read-only mapping of named configuration values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamStore {
    values: BTreeMap<String, ParamValue>,
}

impl ParamStore {
    /// Parse a TOML document. Nested tables are flattened into dotted keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        let mut values = BTreeMap::new();
        flatten_table("", &table, &mut values);
        Ok(Self { values })
    }

    /// Load a TOML parameter file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::from_io(path, e))?;
        let store = Self::from_toml_str(&text)?;
        log::info!("Loaded {} parameters from {}", store.len(), path.display());
        Ok(store)
    }

    /// Build a store from explicit key/value pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Raw lookup
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get an integer. Floats with no fractional part are accepted.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.require(key)? {
            ParamValue::Int(v) => Ok(*v),
            ParamValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Ok(*v as i64),
            other => Err(DatasetError::invalid_parameter(key, other.to_string(), "an integer")),
        }
    }

    /// Get a number, widening integers
    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            ParamValue::Int(v) => Ok(*v as f64),
            ParamValue::Float(v) => Ok(*v),
            other => Err(DatasetError::invalid_parameter(key, other.to_string(), "a number")),
        }
    }

    /// Get a string
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            ParamValue::Str(v) => Ok(v),
            other => Err(DatasetError::invalid_parameter(key, other.to_string(), "a string")),
        }
    }

    fn require(&self, key: &str) -> Result<&ParamValue> {
        self.values
            .get(key)
            .ok_or_else(|| DatasetError::missing_parameter(key))
    }
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, ParamValue>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Integer(v) => {
                out.insert(full_key, ParamValue::Int(*v));
            }
            toml::Value::Float(v) => {
                out.insert(full_key, ParamValue::Float(*v));
            }
            toml::Value::String(v) => {
                out.insert(full_key, ParamValue::Str(v.clone()));
            }
            toml::Value::Boolean(v) => {
                out.insert(full_key, ParamValue::Bool(*v));
            }
            toml::Value::Table(inner) => flatten_table(&full_key, inner, out),
            toml::Value::Array(_) | toml::Value::Datetime(_) => {
                log::debug!("Ignoring non-scalar parameter {}", full_key);
            }
        }
    }
}

/// How multiple events in one (unit, bin) cell are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyMode {
    /// Cell is 1 if at least one event landed in it
    #[default]
    Binary,
    /// Cell counts the events that landed in it
    Count,
}

impl FromStr for OccupancyMode {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "count" => Ok(Self::Count),
            other => Err(DatasetError::invalid_parameter(
                "occupancy",
                other,
                "\"binary\" or \"count\"",
            )),
        }
    }
}

/// Validated dataset parameters.
///
/// Every constructor validates, and the fields are only readable through
/// accessors, so a `DatasetParams` value always describes a non-empty time
/// grid and a sensor within the supported extents.
///
/// ```compile_fail
/// use shnn_dataset::DatasetParams;
///
/// let mut params = DatasetParams::new(0.0, 350.0, 1.0, 34, 34, 2).unwrap();
/// params.t_res = 0.0;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDatasetParams")]
pub struct DatasetParams {
    t_start: f64,
    t_end: f64,
    t_res: f64,
    input_x: u32,
    input_y: u32,
    input_channels: u32,
    num_classes: u32,
    occupancy: OccupancyMode,
}

#[derive(Deserialize)]
struct RawDatasetParams {
    t_start: f64,
    t_end: f64,
    t_res: f64,
    input_x: u32,
    input_y: u32,
    input_channels: u32,
    #[serde(default = "default_num_classes")]
    num_classes: u32,
    #[serde(default)]
    occupancy: OccupancyMode,
}

fn default_num_classes() -> u32 {
    DEFAULT_NUM_CLASSES
}

impl TryFrom<RawDatasetParams> for DatasetParams {
    type Error = DatasetError;

    fn try_from(raw: RawDatasetParams) -> Result<Self> {
        let params = Self {
            t_start: raw.t_start,
            t_end: raw.t_end,
            t_res: raw.t_res,
            input_x: raw.input_x,
            input_y: raw.input_y,
            input_channels: raw.input_channels,
            num_classes: raw.num_classes,
            occupancy: raw.occupancy,
        };
        params.validate()?;
        Ok(params)
    }
}

impl DatasetParams {
    /// Create new parameters with validation
    pub fn new(
        t_start: f64,
        t_end: f64,
        t_res: f64,
        input_x: u32,
        input_y: u32,
        input_channels: u32,
    ) -> Result<Self> {
        let params = Self {
            t_start,
            t_end,
            t_res,
            input_x,
            input_y,
            input_channels,
            num_classes: DEFAULT_NUM_CLASSES,
            occupancy: OccupancyMode::Binary,
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the number of output classes
    pub fn with_num_classes(mut self, num_classes: u32) -> Result<Self> {
        if num_classes == 0 {
            return Err(DatasetError::invalid_parameter(
                "num_classes",
                "0",
                ">= 1",
            ));
        }
        self.num_classes = num_classes;
        Ok(self)
    }

    /// Set the collision policy
    pub fn with_occupancy(mut self, occupancy: OccupancyMode) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Build from a parameter store
    pub fn from_store(store: &ParamStore) -> Result<Self> {
        let num_classes = if store.contains("num_classes") {
            to_u32("num_classes", store.get_int("num_classes")?)?
        } else {
            DEFAULT_NUM_CLASSES
        };
        let occupancy = if store.contains("occupancy") {
            store.get_str("occupancy")?.parse::<OccupancyMode>()?
        } else {
            OccupancyMode::default()
        };

        let params = Self {
            t_start: store.get_float("t_start")?,
            t_end: store.get_float("t_end")?,
            t_res: store.get_float("t_res")?,
            input_x: to_u32("input_x", store.get_int("input_x")?)?,
            input_y: to_u32("input_y", store.get_int("input_y")?)?,
            input_channels: to_u32("input_channels", store.get_int("input_channels")?)?,
            num_classes,
            occupancy,
        };
        params.validate()?;
        Ok(params)
    }

    /// Load and validate a TOML parameter file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_store(&ParamStore::from_file(path)?)
    }

    /// Parse and validate a TOML parameter document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::from_store(&ParamStore::from_toml_str(text)?)
    }

    /// Check every invariant
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("t_start", self.t_start),
            ("t_end", self.t_end),
            ("t_res", self.t_res),
        ] {
            if !value.is_finite() {
                return Err(DatasetError::invalid_parameter(name, value.to_string(), "a finite number"));
            }
        }
        if self.t_res <= 0.0 {
            return Err(DatasetError::invalid_parameter(
                "t_res",
                self.t_res.to_string(),
                "> 0",
            ));
        }
        if self.t_end <= self.t_start {
            return Err(DatasetError::invalid_parameter(
                "t_end",
                format!("{} (with t_start={})", self.t_end, self.t_start),
                "> t_start",
            ));
        }
        if self.num_time_bins() == 0 {
            return Err(DatasetError::invalid_parameter(
                "t_res",
                format!("{} (window {})", self.t_res, self.t_end - self.t_start),
                "<= t_end - t_start",
            ));
        }
        check_extent("input_x", self.input_x, MAX_EXTENT)?;
        check_extent("input_y", self.input_y, MAX_EXTENT)?;
        check_extent("input_channels", self.input_channels, MAX_CHANNELS)?;
        if self.num_classes == 0 {
            return Err(DatasetError::invalid_parameter("num_classes", "0", ">= 1"));
        }
        Ok(())
    }

    /// Window start (raw time units)
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// Window end, exclusive (raw time units)
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    /// Bin width (raw time units)
    pub fn t_res(&self) -> f64 {
        self.t_res
    }

    /// Sensor width
    pub fn input_x(&self) -> u32 {
        self.input_x
    }

    /// Sensor height
    pub fn input_y(&self) -> u32 {
        self.input_y
    }

    /// Number of polarity channels
    pub fn input_channels(&self) -> u32 {
        self.input_channels
    }

    /// Number of output classes
    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    /// Collision policy
    pub fn occupancy(&self) -> OccupancyMode {
        self.occupancy
    }

    /// Number of time bins in the window
    pub fn num_time_bins(&self) -> usize {
        ((self.t_end - self.t_start) / self.t_res).floor() as usize
    }

    /// Number of spatial-channel units (rows of a binned tensor)
    pub fn input_size(&self) -> usize {
        self.input_x as usize * self.input_y as usize * self.input_channels as usize
    }

    /// Row of unit `(x, y, channel)`, channel outermost, x innermost.
    ///
    /// Returns `None` if the coordinates fall outside the configured extents.
    #[inline]
    pub fn flat_index(&self, x: u8, y: u8, channel: u8) -> Option<usize> {
        let (x, y, channel) = (u32::from(x), u32::from(y), u32::from(channel));
        if x >= self.input_x || y >= self.input_y || channel >= self.input_channels {
            return None;
        }
        Some(((channel * self.input_y + y) * self.input_x + x) as usize)
    }

    /// Time bin of `timestamp`, or `None` if it falls outside the window
    #[inline]
    pub fn bin_index(&self, timestamp: u32) -> Option<usize> {
        let bin = ((f64::from(timestamp) - self.t_start) / self.t_res).floor();
        if bin < 0.0 || bin >= self.num_time_bins() as f64 {
            None
        } else {
            Some(bin as usize)
        }
    }
}

fn to_u32(name: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| DatasetError::invalid_parameter(name, value.to_string(), "a non-negative integer"))
}

fn check_extent(name: &str, value: u32, max: u32) -> Result<()> {
    if value == 0 || value > max {
        return Err(DatasetError::invalid_parameter(
            name,
            value.to_string(),
            format!("1..={}", max),
        ));
    }
    Ok(())
}
