//! # Silhouette Tracing Library
//!
//! Turns raster artwork on a white background into a filled vector
//! silhouette: a single compound path with holes, laid out on a page and
//! written as SVG.
//!
//! ## Core Features
//!
//! - **Background Matting**: Near-white pixels and a one pixel fringe become transparent
//! - **Hierarchical Contours**: Outlines, holes, and islands inside holes are kept as a tree
//! - **Relative Simplification**: Douglas-Peucker tolerance scales with each contour's perimeter
//! - **Even-Odd Composition**: Holes render as holes regardless of nesting depth
//! - **Export**: SVG documents and GeoJSON contour dumps
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use silhouette::Pipeline;
//!
//! // Defaults: 600px trace raster, 144pt square page
//! let pipeline = Pipeline::builder().build();
//!
//! let output = pipeline.process_file("logo.png")?;
//! output.document.save_svg("logo.svg")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use silhouette::{Pipeline, ResizePolicy, DirectorySink};
//!
//! let pipeline = Pipeline::builder()
//!     .resize_policy(ResizePolicy::PreserveAspectBounded)
//!     .target_bound(288)
//!     .simplify_tolerance(0.001)
//!     .with_diagnostics(Arc::new(DirectorySink::new("debug")))
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod document;
pub mod diagnostics;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{TraceError, Result};
pub use types::{
    BinaryMask, ContourNode, ContourTree, Dimensions, FillRule, PathDescriptor, Polygon, Subpath, Unit,
};
pub use config::{ResizePolicy, Rounding, TraceConfig};
pub use traits::*;
pub use algorithms::{
    DouglasPeuckerSimplifier, ImageprocContourExtractor, Matte, PathComposer, TargetBound,
    WhiteBackgroundMatte,
};
pub use document::{Placement, VectorDocument};
pub use diagnostics::{DirectorySink, NoopSink, RecordingSink, Stage};
pub use pipeline::{Pipeline, TraceOutput, builder::PipelineBuilder};
