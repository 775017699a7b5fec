#![cfg_attr(docsrs, feature(doc_cfg))]
//! Flatten IP-XACT / SPIRIT register descriptions into `node` register maps.
//!
//! ```rust,no_run
//! use regmap_core::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! # fn run() -> Result<(), regmap_core::RegMapError> {
//! let stats = convert_file(
//!     Path::new("block.xml"),
//!     Path::new("block_regmap.xml"),
//!     &ConvertOptions::default(),
//! )?;
//! println!("{} registers, {} nodes", stats.registers, stats.nodes);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use ipxact_xml::XmlError;
use thiserror::Error;

pub mod attrs;
pub mod convert;
pub mod flatten;
pub mod mask;
pub mod node;

pub use attrs::{AttributeExtractor, AttributeMapping, Permission};
pub use convert::{convert_file, convert_str, ConvertOptions};
pub use flatten::{flatten, FlattenStats, SplitState, TreeFlattener};
pub use node::OutputNode;

/// Error type produced while converting register descriptions.
#[derive(Debug, Error)]
pub enum RegMapError {
    /// The input document does not exist.
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    /// An `access` element holds something other than `read-only` or `read-write`.
    #[error("unrecognized access kind: '{0}'")]
    UnrecognizedAccessKind(String),
    /// A register has no usable `name` element.
    #[error("register #{index} has no name")]
    MalformedRegister { index: usize },
    /// A `bitWidth` or `bitOffset` value is not an unsigned integer.
    #[error("invalid {element} value: '{value}'")]
    InvalidInteger { element: &'static str, value: String },
    /// Reading the input or writing the output failed.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document could not be parsed or serialized.
    #[error(transparent)]
    Xml(#[from] XmlError),
}
