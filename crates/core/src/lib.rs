//! LSIF dump to static, browsable source site.

pub mod annotate;
pub mod config;
pub mod error;
pub mod logging;
pub mod lsif;
pub mod paths;
pub mod render;
pub mod semantic;
pub mod site;
pub mod source;
pub mod tree;

pub use config::{SiteConfig, UriMap};
pub use error::{Result, SiteError};
pub use site::{BuildReport, CheckOutcome, SiteBuilder};
