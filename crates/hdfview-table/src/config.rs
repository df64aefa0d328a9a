//! Table view settings.
//!
//! Settings are plain serde data stored as TOML. Missing keys take their
//! defaults, so an empty file is a valid configuration.
//!
//! ```
//! use hdfview_table::config::TableViewConfig;
//! use hdfview_table::format::NumberFormat;
//!
//! let config = TableViewConfig::from_toml_str(
//!     r#"
//! convert_enum_names = true
//! index_base = 1
//!
//! [number_format]
//! kind = "fixed"
//! decimals = 3
//! "#,
//! )?;
//! assert!(config.convert_enum_names);
//! assert_eq!(config.number_format, NumberFormat::Fixed { decimals: 3 });
//! # Ok::<(), hdfview_table::error::ConfigError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::format::NumberFormat;

/// User-facing options of a compound table view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableViewConfig {
    /// Show enum members by name instead of by value.
    pub convert_enum_names: bool,
    /// Formatting of floating-point members.
    pub number_format: NumberFormat,
    /// First row number shown in cell labels, 0 or 1.
    pub index_base: usize,
    /// Refuse every edit.
    pub read_only: bool,
}

impl TableViewConfig {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Writes settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| ConfigError::io(path, e))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        self.check()?;
        Ok(toml::to_string(self)?)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.index_base > 1 {
            return Err(ConfigError::InvalidIndexBase(self.index_base));
        }
        Ok(())
    }
}
