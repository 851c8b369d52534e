use std::sync::Arc;

use crate::{
    pipeline::Pipeline,
    config::{ResizePolicy, Rounding, TraceConfig},
    diagnostics::NoopSink,
    traits::{BackgroundMatte, ContourExtractor, DiagnosticSink, PolygonSimplifier},
    types::FillRule,
    algorithms::{
        DouglasPeuckerSimplifier,
        ImageprocContourExtractor,
        PathComposer,
        WhiteBackgroundMatte,
    },
};

/// Builder for creating processing pipelines with a fluent API
///
/// Components left unset are built from the configuration in [`Self::build`],
/// so the order of calls does not matter.
pub struct PipelineBuilder {
    config: TraceConfig,
    matte: Option<Box<dyn BackgroundMatte>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<Box<dyn PolygonSimplifier>>,
    fill_rule: FillRule,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: TraceConfig::default(),
            matte: None,
            contour_extractor: None,
            simplifier: None,
            fill_rule: FillRule::EvenOdd,
            diagnostics: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.config.resize_policy = policy;
        self
    }

    pub fn target_bound(mut self, bound: u32) -> Self {
        self.config.target_bound = bound;
        self
    }

    /// `None` traces at the source resolution
    pub fn raster_bound(mut self, bound: Option<u32>) -> Self {
        self.config.raster_bound = bound;
        self
    }

    pub fn simplify_tolerance(mut self, factor: f64) -> Self {
        self.config.simplify_tolerance_factor = factor;
        self
    }

    pub fn min_contour_area(mut self, area: f64) -> Self {
        self.config.min_contour_area = area;
        self
    }

    pub fn white_threshold(mut self, threshold: u8) -> Self {
        self.config.white_threshold = threshold;
        self
    }

    pub fn dark_threshold(mut self, threshold: u8) -> Self {
        self.config.dark_threshold = threshold;
        self
    }

    /// Trace holes; when false only outer boundaries are kept
    pub fn holes(mut self, holes: bool) -> Self {
        self.config.holes = holes;
        self
    }

    /// Paint the white page background beneath the path
    pub fn background(mut self, background: bool) -> Self {
        self.config.background = background;
        self
    }

    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.config.rounding = rounding;
        self
    }

    /// Set the background matte (replaces any existing one)
    pub fn set_matte<M>(mut self, matte: M) -> Self
    where
        M: BackgroundMatte + 'static,
    {
        self.matte = Some(Box::new(matte));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the polygon simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PolygonSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    pub fn fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Send intermediate rasters to `sink`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let config = self.config;

        let matte = self.matte.unwrap_or_else(|| {
            Box::new(WhiteBackgroundMatte {
                white_threshold: config.white_threshold,
            })
        });

        let contour_extractor = self.contour_extractor.unwrap_or_else(|| {
            Box::new(ImageprocContourExtractor {
                min_area: config.min_contour_area,
                holes: config.holes,
            })
        });

        let simplifier = self.simplifier
            .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier));

        let diagnostics = self.diagnostics
            .unwrap_or_else(|| Arc::new(NoopSink));

        Pipeline::new(
            config,
            matte,
            contour_extractor,
            simplifier,
            PathComposer::new(self.fill_rule),
            diagnostics,
        )
    }

    /// Fixed square page of `bound` points
    pub fn build_uniform_square(bound: u32) -> Pipeline {
        Self::new()
            .resize_policy(ResizePolicy::UniformSquare)
            .target_bound(bound)
            .build()
    }

    /// Page with the artwork's aspect ratio, longest side `bound` points
    pub fn build_preserve_aspect(bound: u32) -> Pipeline {
        Self::new()
            .resize_policy(ResizePolicy::PreserveAspectBounded)
            .target_bound(bound)
            .build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
