//! Optional capture of intermediate rasters.
//!
//! The pipeline hands each intermediate image to a [`DiagnosticSink`]. The
//! default [`NoopSink`] discards everything and tells the pipeline not to
//! bother building the images at all.

use std::{
    path::PathBuf,
    sync::Mutex,
};

use image::DynamicImage;
use strum::{Display, EnumIter, IntoStaticStr};
use crate::traits::DiagnosticSink;

/// Pipeline stage an intermediate raster was captured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Dilated near-white mask
    WhiteMask,
    /// RGBA raster after alpha was cleared on background
    Matted,
    /// Matted raster after resampling to the trace size
    Resampled,
    /// Binary foreground mask handed to contour extraction
    ForegroundMask,
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _stage: Stage, _image: &DynamicImage) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Writes each stage as `<prefix><stage>.png` under a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    pub dir: PathBuf,
    pub prefix: String,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), prefix: String::new() }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn path_for(&self, stage: Stage) -> PathBuf {
        self.dir.join(format!("{}{}.png", self.prefix, stage))
    }
}

impl DiagnosticSink for DirectorySink {
    fn record(&self, stage: Stage, image: &DynamicImage) {
        let target = self.path_for(stage);
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "cannot create diagnostics directory");
            return;
        }
        if let Err(e) = image.save(&target) {
            tracing::warn!(path = %target.display(), error = %e, "failed to write diagnostic image");
        }
    }
}

/// Keeps `(stage, width, height)` of everything recorded, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(Stage, u32, u32)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(Stage, u32, u32)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.records().into_iter().map(|(stage, _, _)| stage).collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, stage: Stage, image: &DynamicImage) {
        if let Ok(mut records) = self.records.lock() {
            records.push((stage, image.width(), image.height()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn directory_sink_writes_png_per_stage() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("debug")).with_prefix("glyph_");
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([255])));

        sink.record(Stage::WhiteMask, &image);

        let written = sink.path_for(Stage::WhiteMask);
        assert!(written.ends_with("glyph_white_mask.png"));
        let reloaded = image::open(&written).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (4, 3));
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        let image = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        sink.record(Stage::Matted, &image);
        sink.record(Stage::ForegroundMask, &image);
        assert_eq!(sink.stages(), vec![Stage::Matted, Stage::ForegroundMask]);
        assert!(sink.enabled());
        assert!(!NoopSink.enabled());
    }
}
