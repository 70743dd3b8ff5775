//! Configuration types for camfilter
//!
//! Loaded from TOML:
//!
//! ```toml
//! [processor]
//! frame_budget_ms = 33
//! orientation = { rotation = 90, mirror = false }
//!
//! [filters]
//! default = "Warm"
//!
//! [[filters.catalog]]
//! name = "Warm"
//! path = "luts/warm.cube"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lut::{read_table, TableFormat};
use crate::processing::{FrameProcessor, Orientation};
use crate::registry::{FilterContext, FilterRegistry, NO_FILTER};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processor: ProcessorConfig,
    pub filters: FilterConfig,
    /// Directory relative catalog paths resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Frame processor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Warn when a frame takes longer than this
    pub frame_budget_ms: Option<u64>,
    /// Rotation/mirroring applied to each output frame
    pub orientation: Orientation,
}

impl ProcessorConfig {
    pub fn with_frame_budget_ms(mut self, ms: u64) -> Self {
        self.frame_budget_ms = Some(ms);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Filter catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter activated at startup
    pub default: String,
    /// Tables to load into the registry
    pub catalog: Vec<FilterEntry>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default: NO_FILTER.to_string(),
            catalog: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = name.into();
        self
    }

    pub fn with_entry(mut self, entry: FilterEntry) -> Self {
        self.catalog.push(entry);
        self
    }
}

/// One table in the filter catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Name used to activate the filter
    pub name: String,
    /// Table file
    pub path: PathBuf,
    /// Table format (inferred from the extension when omitted)
    #[serde(default)]
    pub format: Option<TableFormat>,
}

impl FilterEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: TableFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Resolved format for this entry
    pub fn table_format(&self) -> TableFormat {
        self.format
            .unwrap_or_else(|| TableFormat::from_path(&self.path))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn with_processor(mut self, processor: ProcessorConfig) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load every catalog table into a registry
    pub fn build_registry(&self) -> Result<FilterRegistry> {
        let mut builder = FilterRegistry::builder();
        for entry in &self.filters.catalog {
            let path = self.resolve(&entry.path);
            let cube = read_table(&path, entry.table_format()).map_err(|e| {
                Error::Config(format!(
                    "filter '{}' ({}): {}",
                    entry.name,
                    path.display(),
                    e
                ))
            })?;
            builder = builder.register(entry.name.clone(), cube)?;
        }
        Ok(builder.build())
    }

    /// Build the registry and activate the configured default filter
    pub fn build_context(&self) -> Result<FilterContext> {
        let context = FilterContext::new(self.build_registry()?);
        context.activate(&self.filters.default)?;
        Ok(context)
    }

    /// Build a context and a processor configured from this file
    pub fn build_processor(&self) -> Result<FrameProcessor> {
        let context = Arc::new(self.build_context()?);
        Ok(FrameProcessor::from_config(context, &self.processor))
    }
}
