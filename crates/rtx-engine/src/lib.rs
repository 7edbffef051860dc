//! rtx Engine
//!
//! Converts between an editable HTML view and a strict XML data format,
//! driven by two-way filter rules.
//!
//! # Example
//! ```rust,ignore
//! use rtx_engine::{DataProcessor, ProcessorConfig};
//! use rtx_engine::filter::{FilterRuleSetConfiguration, ElementFilterRuleConfig, rename_to};
//!
//! let rules = FilterRuleSetConfiguration::new().with_element(
//!     "b",
//!     ElementFilterRuleConfig::new()
//!         .with_to_data(rename_to("strong"))
//!         .with_to_view_target("strong", rename_to("b")),
//! );
//! let processor = DataProcessor::from_configurations(ProcessorConfig::default(), Some(&rules), None);
//! let data = processor.to_data("<p><b>bold</b></p>")?;
//! let view = processor.to_view(&data)?;
//! ```

mod config;
mod processor;

pub use config::{ProcessorConfig, RICHTEXT_NAMESPACE};
pub use processor::{DataProcessor, ProcessorError};

// Re-export sub-crates
pub use rtx_dom as dom;
pub use rtx_filter as filter;
pub use rtx_markup as markup;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
