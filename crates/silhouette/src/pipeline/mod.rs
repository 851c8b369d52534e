pub mod builder;

use std::{path::Path, sync::Arc};

use image::DynamicImage;
use crate::{
    algorithms::{dimensions, simplification::simplify_tree, PathComposer},
    config::TraceConfig,
    diagnostics::Stage,
    document::VectorDocument,
    error::Result,
    traits::{BackgroundMatte, ContourExtractor, DiagnosticSink, PolygonSimplifier},
    types::{ContourTree, Dimensions, PathDescriptor},
};

/// Everything produced for one image.
#[derive(Debug, Clone)]
pub struct TraceOutput {
    /// Size of the decoded source image
    pub source: Dimensions,
    /// Simplified contours the path was composed from
    pub contours: ContourTree,
    pub document: VectorDocument,
}

impl TraceOutput {
    pub fn path(&self) -> &PathDescriptor {
        &self.document.path
    }

    /// True when no foreground shape survived; not an error.
    pub fn is_blank(&self) -> bool {
        self.document.is_blank()
    }
}

/// Raster to vector pipeline: matte, resample, classify, extract, simplify,
/// compose, and lay out on a page.
pub struct Pipeline {
    config: TraceConfig,
    matte: Box<dyn BackgroundMatte>,
    contour_extractor: Box<dyn ContourExtractor>,
    simplifier: Box<dyn PolygonSimplifier>,
    composer: PathComposer,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        config: TraceConfig,
        matte: Box<dyn BackgroundMatte>,
        contour_extractor: Box<dyn ContourExtractor>,
        simplifier: Box<dyn PolygonSimplifier>,
        composer: PathComposer,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            config,
            matte,
            contour_extractor,
            simplifier,
            composer,
            diagnostics,
        }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    fn record(&self, stage: Stage, build: impl FnOnce() -> DynamicImage) {
        if self.diagnostics.enabled() {
            self.diagnostics.record(stage, &build());
        }
    }

    /// Process a decoded image through the entire pipeline
    pub fn process(&self, image: &DynamicImage) -> Result<TraceOutput> {
        let config = &self.config;
        let source = Dimensions::pixels(image.width(), image.height());

        // Step 1: Remove the white background
        let matte = self.matte.matte(image)?;
        self.record(Stage::WhiteMask, || DynamicImage::ImageLuma8(matte.background.clone()));
        self.record(Stage::Matted, || DynamicImage::ImageRgba8(matte.image.clone()));

        // Step 2: Resample to the trace resolution
        let raster = dimensions::raster_dimensions(source, config.raster_bound, config.rounding)?;
        let matte = if raster == matte.dimensions() {
            matte
        } else {
            let resized = matte.resized(raster);
            self.record(Stage::Resampled, || DynamicImage::ImageRgba8(resized.image.clone()));
            resized
        };

        // Step 3: Classify foreground
        let mask = matte.foreground_mask(config.dark_threshold);
        self.record(Stage::ForegroundMask, || DynamicImage::ImageLuma8(mask.as_image().clone()));

        // Step 4: Extract the contour hierarchy
        let extracted = self.contour_extractor.extract(&mask)?;

        // Step 5: Simplify each contour, dropping any that collapse
        let contours = simplify_tree(&extracted, self.simplifier.as_ref(), config.simplify_tolerance_factor)?;

        // Step 6: Compose the compound path and place it on a page
        let path = self.composer.compose(&contours);
        let page = dimensions::page_dimensions(raster, config.resize_policy, config.target_bound, config.rounding)?;
        let mut document = VectorDocument::build(path, page.width, page.height, raster.width, raster.height)?;
        if !config.background {
            document = document.without_background();
        }

        tracing::debug!(
            source = %format!("{}x{}", source.width, source.height),
            raster = %format!("{}x{}", raster.width, raster.height),
            page = %format!("{}x{}", page.width, page.height),
            contours = extracted.len(),
            kept = contours.len(),
            points_before = extracted.total_points(),
            points_after = contours.total_points(),
            "traced image"
        );

        Ok(TraceOutput {
            source,
            contours,
            document,
        })
    }

    /// Decode an encoded image (PNG, JPEG, TIFF) and process it
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<TraceOutput> {
        let image = image::load_from_memory(bytes)?;
        self.process(&image)
    }

    /// Open an image file and process it
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<TraceOutput> {
        let image = image::open(path)?;
        self.process(&image)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} page bound {}pt, raster bound {}, tolerance factor {}, min area {}",
            self.config.resize_policy,
            self.config.target_bound,
            self.config
                .raster_bound
                .map(|b| b.to_string())
                .unwrap_or_else(|| "native".to_string()),
            self.config.simplify_tolerance_factor,
            self.config.min_contour_area,
        )
    }
}
