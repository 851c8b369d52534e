use crate::{
    error::{Result, TraceError},
    traits::PolygonSimplifier,
    types::{ContourNode, ContourTree, Polygon},
};

/// Douglas-Peucker simplifier using geo crate's implementation.
///
/// The absolute tolerance is `tolerance_factor * perimeter`, so large and
/// small shapes are simplified to the same relative fidelity.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl DouglasPeuckerSimplifier {
    pub fn epsilon(polygon: &Polygon, tolerance_factor: f64) -> f64 {
        tolerance_factor * polygon.perimeter()
    }
}

impl PolygonSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, polygon: &Polygon, tolerance_factor: f64) -> Result<Polygon> {
        use geo::Simplify;

        if polygon.is_degenerate() {
            return Err(TraceError::SimplificationDegenerate { points: polygon.len() });
        }

        let epsilon = Self::epsilon(polygon, tolerance_factor);

        // Simplify the explicitly closed ring so the closing edge is honoured,
        // then drop the repeated start point again.
        let simplified = polygon.to_closed_ring().simplify(&epsilon);
        let mut points: Vec<[f64; 2]> = simplified
            .coords()
            .map(|coord| [coord.x, coord.y])
            .collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        let result = Polygon::new(points);
        if result.is_degenerate() {
            return Err(TraceError::SimplificationDegenerate { points: result.len() });
        }

        Ok(result)
    }
}

/// Simplify every node of `tree`.
///
/// A node whose polygon degenerates is dropped together with its whole
/// subtree; a hole or island left without its enclosing outline would flip
/// under even-odd filling. Fails with [`TraceError::InvalidContourTree`] if
/// the hierarchy does not list parents before children.
pub fn simplify_tree(
    tree: &ContourTree,
    simplifier: &dyn PolygonSimplifier,
    tolerance_factor: f64,
) -> Result<ContourTree> {
    tree.validate()?;

    let mut placed: Vec<Option<usize>> = vec![None; tree.nodes.len()];
    let mut nodes = Vec::with_capacity(tree.nodes.len());

    // Parents precede children, so a dropped parent is already known.
    for (i, node) in tree.nodes.iter().enumerate() {
        let parent = match node.parent {
            Some(p) => match placed[p] {
                Some(new_index) => Some(new_index),
                None => continue,
            },
            None => None,
        };

        match simplifier.simplify(&node.polygon, tolerance_factor) {
            Ok(polygon) => {
                placed[i] = Some(nodes.len());
                nodes.push(ContourNode {
                    polygon,
                    parent,
                    depth: node.depth,
                });
            }
            Err(TraceError::SimplificationDegenerate { points }) => {
                tracing::debug!(index = i, points, depth = node.depth, "dropping degenerate contour");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(ContourTree {
        nodes,
        width: tree.width,
        height: tree.height,
    })
}
