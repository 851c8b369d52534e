use geo_types::{Coord, LineString};
use image::{GrayImage, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use crate::error::{Result, TraceError};

/// Unit a [`Dimensions`] pair is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[derive(Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Unit {
    #[default]
    Pixels,
    Points,
    DocumentUnits,
}

/// A width/height pair in a declared unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub unit: Unit,
}

impl Dimensions {
    pub fn new(width: u32, height: u32, unit: Unit) -> Self {
        Self { width, height, unit }
    }

    pub fn pixels(width: u32, height: u32) -> Self {
        Self::new(width, height, Unit::Pixels)
    }

    pub fn points(width: u32, height: u32) -> Self {
        Self::new(width, height, Unit::Points)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Foreground/background classification of a raster, same size as its source.
///
/// Foreground pixels are stored as 255 so the buffer can be handed straight to
/// `imageproc`'s border follower, which treats any non-zero pixel as set.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    pub const FOREGROUND: u8 = 255;

    /// Build a mask by evaluating `f` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let image = GrayImage::from_fn(width, height, |x, y| {
            if f(x, y) {
                Luma([Self::FOREGROUND])
            } else {
                Luma([0])
            }
        });
        Self { image }
    }

    /// Wrap a grayscale image, treating every non-zero pixel as foreground.
    pub fn from_gray(image: &GrayImage) -> Self {
        Self::from_fn(image.width(), image.height(), |x, y| image.get_pixel(x, y)[0] > 0)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] == Self::FOREGROUND
    }

    pub fn foreground_count(&self) -> usize {
        self.image.pixels().filter(|p| p[0] == Self::FOREGROUND).count()
    }

    /// True when no pixel is classified foreground.
    pub fn is_empty(&self) -> bool {
        !self.image.pixels().any(|p| p[0] == Self::FOREGROUND)
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// A closed polygon; the last point implicitly connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three points cannot enclose any area.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// The points as an explicitly closed ring (first point repeated at the end).
    pub fn to_closed_ring(&self) -> LineString<f64> {
        let mut ring = LineString::new(
            self.points
                .iter()
                .map(|&[x, y]| Coord { x, y })
                .collect(),
        );
        ring.close();
        ring
    }

    /// Convert to geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> geo_types::Polygon<f64> {
        geo_types::Polygon::new(self.to_closed_ring(), vec![])
    }

    /// Shoelace area; the sign encodes the winding direction.
    pub fn signed_area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().signed_area()
    }

    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Length of the closed boundary, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        use geo::EuclideanLength;
        if self.points.len() < 2 {
            return 0.0;
        }
        self.to_closed_ring().euclidean_length()
    }

    pub fn bounding_box(&self) -> ([f64; 2], [f64; 2]) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for &[x, y] in &self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        ([min_x, min_y], [max_x, max_y])
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.points.iter().rev().copied().collect())
    }

    /// Reverse the point order if needed so the signed area is positive
    /// (`positive == true`) or negative. Zero-area polygons are left alone.
    pub fn oriented(self, positive: bool) -> Self {
        let area = self.signed_area();
        if area == 0.0 || (area > 0.0) == positive {
            self
        } else {
            self.reversed()
        }
    }
}

/// One extracted boundary together with its place in the nesting hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourNode {
    pub polygon: Polygon,
    /// Index of the enclosing node in [`ContourTree::nodes`].
    pub parent: Option<usize>,
    /// Nesting depth; even depths are filled outlines, odd depths are holes.
    pub depth: usize,
}

impl ContourNode {
    pub fn is_hole(&self) -> bool {
        self.depth % 2 == 1
    }
}

/// Nested contours extracted from a single mask.
///
/// Parents always precede their children in `nodes`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContourTree {
    pub nodes: Vec<ContourNode>,
    /// Dimensions of the mask the contours were traced on
    pub width: u32,
    pub height: u32,
}

impl ContourTree {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { nodes: Vec::new(), width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| i)
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(index))
            .map(|(i, _)| i)
    }

    pub fn outer_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_hole()).count()
    }

    pub fn hole_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_hole()).count()
    }

    /// Node indices in depth-first pre-order: each node is followed by its subtree.
    ///
    /// Nodes whose parent index is out of range are not reachable and are left out.
    pub fn walk(&self) -> Vec<usize> {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut stack = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(p) if p < self.nodes.len() => children[p].push(i),
                Some(_) => {}
                None => stack.push(i),
            }
        }
        stack.reverse();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(children[index].iter().rev().copied());
        }

        order
    }

    /// Check the hierarchy invariants: every parent precedes its child, roots
    /// sit at even depth, and a child is an odd number of levels below its
    /// parent so even-odd filling matches `is_hole`.
    pub fn validate(&self) -> Result<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                None if node.depth % 2 != 0 => {
                    return Err(TraceError::InvalidContourTree(format!(
                        "root contour {i} has odd depth {}",
                        node.depth
                    )));
                }
                None => {}
                Some(p) if p >= i => {
                    return Err(TraceError::InvalidContourTree(format!(
                        "contour {i} names parent {p}, which does not precede it"
                    )));
                }
                Some(p) => {
                    let parent_depth = self.nodes[p].depth;
                    if node.depth <= parent_depth || (node.depth - parent_depth) % 2 == 0 {
                        return Err(TraceError::InvalidContourTree(format!(
                            "contour {i} at depth {} cannot nest in contour {p} at depth {parent_depth}",
                            node.depth
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn total_points(&self) -> usize {
        self.nodes.iter().map(|n| n.polygon.len()).sum()
    }
}

/// Fill rule a path is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FillRule {
    #[default]
    EvenOdd,
    NonZero,
}

impl FillRule {
    /// Value of the SVG `fill-rule` attribute.
    pub fn svg_value(&self) -> &'static str {
        match self {
            FillRule::EvenOdd => "evenodd",
            FillRule::NonZero => "nonzero",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub polygon: Polygon,
    pub is_hole: bool,
}

/// A single compound path: every outline and hole as one closed subpath each.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub subpaths: Vec<Subpath>,
    pub fill_rule: FillRule,
}

impl PathDescriptor {
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subpaths.len()
    }

    pub fn total_points(&self) -> usize {
        self.subpaths.iter().map(|s| s.polygon.len()).sum()
    }

    /// Render as SVG path data: `M x,y L x,y ... Z` per subpath.
    ///
    /// Coordinates use `f64`'s shortest round-trip formatting, so nothing is
    /// lost to fixed-precision rounding.
    pub fn to_svg_path_data(&self) -> String {
        let mut parts = Vec::new();

        for subpath in &self.subpaths {
            let Some(([x0, y0], rest)) = subpath.polygon.points.split_first() else {
                continue;
            };
            parts.push(format!("M {},{}", x0, y0));
            for [x, y] in rest {
                parts.push(format!("L {},{}", x, y));
            }
            parts.push("Z".to_string());
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]])
    }

    #[test]
    fn polygon_metrics() {
        let p = square(10.0);
        assert_eq!(p.area(), 100.0);
        assert_eq!(p.perimeter(), 40.0);
        assert_eq!(p.bounding_box(), ([0.0, 0.0], [10.0, 10.0]));
        assert!(!p.is_degenerate());
    }

    #[test]
    fn orientation_flips_sign() {
        let p = square(4.0);
        let positive = p.clone().oriented(true);
        let negative = p.oriented(false);
        assert!(positive.signed_area() > 0.0);
        assert!(negative.signed_area() < 0.0);
        assert_eq!(positive.reversed(), negative);
    }

    #[test]
    fn tree_walk_is_preorder() {
        let node = |parent, depth| ContourNode { polygon: square(1.0), parent, depth };
        let tree = ContourTree {
            nodes: vec![node(None, 0), node(None, 0), node(Some(0), 1), node(Some(2), 2)],
            width: 10,
            height: 10,
        };
        assert_eq!(tree.walk(), vec![0, 2, 3, 1]);
        assert_eq!(tree.outer_count(), 3);
        assert_eq!(tree.hole_count(), 1);
    }

    #[test]
    fn tree_walk_handles_deep_nesting() {
        let nodes: Vec<ContourNode> = (0..2000)
            .map(|i| ContourNode {
                polygon: square(1.0),
                parent: if i == 0 { None } else { Some(i - 1) },
                depth: i,
            })
            .collect();
        let tree = ContourTree { nodes, width: 10, height: 10 };
        assert_eq!(tree.walk(), (0..2000).collect::<Vec<_>>());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn validate_rejects_broken_hierarchies() {
        let node = |parent, depth| ContourNode { polygon: square(1.0), parent, depth };
        let tree = |nodes| ContourTree { nodes, width: 10, height: 10 };

        // Parent index past the end
        let err = tree(vec![node(Some(7), 1)]).validate().unwrap_err();
        assert!(matches!(err, TraceError::InvalidContourTree(_)));
        // Parent listed after its child
        assert!(tree(vec![node(Some(1), 1), node(None, 0)]).validate().is_err());
        // Hole parity disagrees with nesting
        assert!(tree(vec![node(None, 0), node(Some(0), 2)]).validate().is_err());
        assert!(tree(vec![node(None, 1)]).validate().is_err());

        assert!(tree(vec![node(None, 0), node(Some(0), 1), node(None, 0)]).validate().is_ok());
        assert!(tree(vec![node(Some(7), 1)]).walk().is_empty());
    }

    #[test]
    fn svg_path_data_keeps_full_precision() {
        let path = PathDescriptor {
            subpaths: vec![Subpath {
                polygon: Polygon::new(vec![[0.125, 1.0], [2.5, 3.0], [4.0, 0.333]]),
                is_hole: false,
            }],
            fill_rule: FillRule::EvenOdd,
        };
        assert_eq!(path.to_svg_path_data(), "M 0.125,1 L 2.5,3 L 4,0.333 Z");
    }

    #[test]
    fn binary_mask_counts() {
        let mask = BinaryMask::from_fn(4, 4, |x, y| x == y);
        assert_eq!(mask.foreground_count(), 4);
        assert!(mask.get(2, 2));
        assert!(!mask.get(1, 2));
        assert!(!mask.is_empty());
        assert!(BinaryMask::from_fn(3, 3, |_, _| false).is_empty());
    }
}
