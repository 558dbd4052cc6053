//! # reporter-renderer
//!
//! Notebook side of the report pipeline: execute the template notebook
//! against a new spreadsheet with papermill, then convert the executed
//! notebook to HTML with `jupyter nbconvert`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use reporter_core::{ArtifactChain, Filename, NamingStrategy, SystemRunner, ToolsConfig};
//! use reporter_renderer::{html, notebook};
//!
//! fn render(template: &Path) -> Result<(), reporter_renderer::RenderError> {
//!     let tools = ToolsConfig::default();
//!     let chain = ArtifactChain::derive(
//!         &Filename::from("report.xlsx"),
//!         NamingStrategy::default(),
//!         Path::new("."),
//!     );
//!     notebook::run_report(&SystemRunner, &tools, template, &chain)?;
//!     let out = html::render_html(&SystemRunner, &tools, &chain)?;
//!     println!("nbconvert: {}", out.status_label());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod html;
pub mod notebook;

pub use error::RenderError;
pub use html::render_html;
pub use notebook::{run_report, FILENAME_PARAMETER};
