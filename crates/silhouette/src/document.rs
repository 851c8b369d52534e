use serde::{Deserialize, Serialize};
use crate::{
    error::{Result, TraceError},
    types::{Dimensions, PathDescriptor, Unit},
};

/// Uniform mapping from document coordinates onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Placement {
    pub fn apply(&self, [x, y]: [f64; 2]) -> [f64; 2] {
        [x * self.scale + self.offset_x, y * self.scale + self.offset_y]
    }
}

/// A single page holding the traced path.
///
/// `coordinates` is the space the path's points live in (the traced mask
/// size); `page` is the physical size in points. The content is scaled
/// uniformly to fit the page and centred, like SVG's `xMidYMid meet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub page: Dimensions,
    pub coordinates: Dimensions,
    /// Full-page fill painted beneath the path
    pub background: Option<String>,
    pub fill: String,
    pub path: PathDescriptor,
}

impl VectorDocument {
    pub const DEFAULT_BACKGROUND: &'static str = "white";
    pub const DEFAULT_FILL: &'static str = "black";

    pub fn build(
        path: PathDescriptor,
        page_width: u32,
        page_height: u32,
        coordinate_width: u32,
        coordinate_height: u32,
    ) -> Result<Self> {
        for (width, height) in [(page_width, page_height), (coordinate_width, coordinate_height)] {
            if width == 0 || height == 0 {
                return Err(TraceError::InvalidDimension { width, height });
            }
        }

        Ok(Self {
            page: Dimensions::new(page_width, page_height, Unit::Points),
            coordinates: Dimensions::new(coordinate_width, coordinate_height, Unit::DocumentUnits),
            background: Some(Self::DEFAULT_BACKGROUND.to_string()),
            fill: Self::DEFAULT_FILL.to_string(),
            path,
        })
    }

    pub fn without_background(mut self) -> Self {
        self.background = None;
        self
    }

    pub fn placement(&self) -> Placement {
        let (pw, ph) = (self.page.width as f64, self.page.height as f64);
        let (cw, ch) = (self.coordinates.width as f64, self.coordinates.height as f64);
        let scale = (pw / cw).min(ph / ch);
        Placement {
            scale,
            offset_x: (pw - cw * scale) / 2.0,
            offset_y: (ph - ch * scale) / 2.0,
        }
    }

    /// The whole page as `[x, y, width, height]` in document coordinates.
    ///
    /// Extends past the coordinate space when the page is letterboxed, so a
    /// background drawn with it leaves no uncovered margin.
    pub fn canvas_rect(&self) -> [f64; 4] {
        let scale = self.placement().scale;
        let width = self.page.width as f64 / scale;
        let height = self.page.height as f64 / scale;
        [
            (self.coordinates.width as f64 - width) / 2.0,
            (self.coordinates.height as f64 - height) / 2.0,
            width,
            height,
        ]
    }

    pub fn is_blank(&self) -> bool {
        self.path.is_empty()
    }
}
