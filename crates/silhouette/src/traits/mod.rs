use image::DynamicImage;
use crate::{
    error::Result,
    types::{BinaryMask, ContourTree, Polygon},
    algorithms::matte::Matte,
    diagnostics::Stage,
};

/// Trait for background removal algorithms
pub trait BackgroundMatte: Send + Sync {
    /// Derive transparency for background pixels of the input image
    fn matte(&self, image: &DynamicImage) -> Result<Matte>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract nested contours from a binary mask
    fn extract(&self, mask: &BinaryMask) -> Result<ContourTree>;
}

/// Trait for polygon simplification algorithms
pub trait PolygonSimplifier: Send + Sync {
    /// Reduce the point count of a closed polygon.
    ///
    /// `tolerance_factor` is relative; implementations derive their absolute
    /// tolerance from the polygon itself.
    fn simplify(&self, polygon: &Polygon, tolerance_factor: f64) -> Result<Polygon>;
}

/// Receiver for intermediate rasters produced while tracing
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, stage: Stage, image: &DynamicImage);

    /// When false the pipeline skips building diagnostic images.
    fn enabled(&self) -> bool {
        true
    }
}
