//! Micro-information extraction for HTML documents
//!
//! Extracts structured data embedded in HTML and normalizes it into one item
//! graph:
//! - Microformats (mf2, with mf1 backwards compatibility)
//! - Microdata (itemscope/itemprop/itemref)
//! - JSON-LD (with remote context caching)
//! - RDFa Lite
//! - Link types (`rel` on link, a and area)
//!
//! Items of every format are queried the same way, by profiled name or by alias:
//!
//! ```no_run
//! use micrometa::{FormatSet, Parser, ParserConfig};
//!
//! let mut parser = Parser::new(ParserConfig::default());
//! let model = parser.extract("https://example.com/", None, FormatSet::ALL)?;
//! for card in model.items(["h-card"]) {
//!     println!("{:?}", card.first_property(["name", "nickname"])?);
//! }
//! # Ok::<(), micrometa::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod factory;
pub mod ffi;
pub mod fetch;
pub mod format;
pub mod jsonld;
pub mod logger;
pub mod microformats;
pub mod model;
pub mod parser;
pub mod rdfa;

pub use cache::{DocumentCache, MemoryCache};
pub use config::ParserConfig;
pub use error::{Error, Result};
pub use factory::{Diagnostic, ItemFactory, ParsingResult};
pub use ffi::*;
pub use format::{Format, FormatSet};
pub use logger::{Logger, SharedLogger, StrictLogger, TracingLogger};
pub use model::*;
pub use parser::Parser;
