use crate::{
    error::Result,
    traits::ContourExtractor,
    types::{BinaryMask, ContourNode, ContourTree, Polygon},
};

/// Border-following extractor built on `imageproc::contours::find_contours`.
///
/// Returns the full nesting hierarchy. Outer boundaries are oriented with a
/// positive signed area and holes with a negative one, so every hole winds
/// opposite to the outline that contains it.
#[derive(Debug, Clone)]
pub struct ImageprocContourExtractor {
    /// Contours enclosing this area or less (in mask pixels) are dropped
    pub min_area: f64,
    /// When false only top-level outer boundaries are returned
    pub holes: bool,
}

impl Default for ImageprocContourExtractor {
    fn default() -> Self {
        Self {
            min_area: 5.0,
            holes: true,
        }
    }
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract(&self, mask: &BinaryMask) -> Result<ContourTree> {
        if mask.is_empty() {
            return Ok(ContourTree::empty(mask.width(), mask.height()));
        }

        let contours = imageproc::contours::find_contours::<i32>(mask.as_image());

        let depths: Vec<usize> = (0..contours.len())
            .map(|i| {
                let mut depth = 0;
                let mut parent = contours[i].parent;
                while let Some(p) = parent {
                    depth += 1;
                    parent = contours[p].parent;
                }
                depth
            })
            .collect();

        // Parents must be placed before their children.
        let mut order: Vec<usize> = (0..contours.len()).collect();
        order.sort_by_key(|&i| depths[i]);

        let mut placed: Vec<Option<usize>> = vec![None; contours.len()];
        let mut nodes: Vec<ContourNode> = Vec::new();
        let mut discarded = 0usize;

        for i in order {
            let depth = depths[i];
            if !self.holes && depth > 0 {
                continue;
            }

            let polygon = Polygon::new(
                contours[i]
                    .points
                    .iter()
                    .map(|p| [p.x as f64, p.y as f64])
                    .collect(),
            );

            if polygon.area() <= self.min_area {
                discarded += 1;
                continue;
            }

            // Nearest ancestor that survived filtering
            let mut parent = contours[i].parent;
            while let Some(p) = parent {
                if placed[p].is_some() {
                    break;
                }
                parent = contours[p].parent;
            }

            // A node whose hole/outline role no longer alternates with its
            // surviving ancestor would fill the wrong way under even-odd.
            let parent = parent.and_then(|p| placed[p]);
            let ancestor_depth = parent.map(|p| nodes[p].depth);
            let alternates = match ancestor_depth {
                Some(d) => (depth - d) % 2 == 1,
                None => depth % 2 == 0,
            };
            if !alternates {
                discarded += 1;
                continue;
            }

            placed[i] = Some(nodes.len());
            nodes.push(ContourNode {
                polygon: polygon.oriented(depth % 2 == 0),
                parent,
                depth,
            });
        }

        tracing::debug!(
            found = contours.len(),
            kept = nodes.len(),
            discarded,
            "extracted contours"
        );

        Ok(ContourTree {
            nodes,
            width: mask.width(),
            height: mask.height(),
        })
    }
}
