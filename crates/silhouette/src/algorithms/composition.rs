use crate::types::{ContourTree, FillRule, PathDescriptor, Subpath};

/// Flattens a contour tree into one compound path.
#[derive(Debug, Clone, Default)]
pub struct PathComposer {
    pub fill_rule: FillRule,
}

impl PathComposer {
    pub fn new(fill_rule: FillRule) -> Self {
        Self { fill_rule }
    }

    /// Emit one closed subpath per node, each outline followed by its subtree.
    ///
    /// Polygons are copied as-is; winding was fixed at extraction time.
    pub fn compose(&self, tree: &ContourTree) -> PathDescriptor {
        let subpaths = tree
            .walk()
            .into_iter()
            .map(|i| &tree.nodes[i])
            .filter(|node| !node.polygon.is_empty())
            .map(|node| Subpath {
                polygon: node.polygon.clone(),
                is_hole: node.is_hole(),
            })
            .collect();

        PathDescriptor {
            subpaths,
            fill_rule: self.fill_rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContourNode, Polygon};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon {
        Polygon::new(vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]])
    }

    #[test]
    fn empty_tree_composes_to_empty_path() {
        let path = PathComposer::default().compose(&ContourTree::empty(10, 10));
        assert!(path.is_empty());
        assert_eq!(path.fill_rule, FillRule::EvenOdd);
        assert_eq!(path.to_svg_path_data(), "");
    }

    #[test]
    fn outers_without_holes_map_one_to_one() {
        let polygons = vec![rect(0.0, 0.0, 5.0, 5.0), rect(10.0, 0.0, 3.0, 7.0), rect(0.0, 10.0, 2.0, 2.0)];
        let tree = ContourTree {
            nodes: polygons
                .iter()
                .cloned()
                .map(|polygon| ContourNode { polygon, parent: None, depth: 0 })
                .collect(),
            width: 20,
            height: 20,
        };

        let path = PathComposer::default().compose(&tree);
        assert_eq!(path.len(), 3);
        for (subpath, polygon) in path.subpaths.iter().zip(&polygons) {
            assert_eq!(&subpath.polygon, polygon);
            assert!(!subpath.is_hole);
        }
    }

    #[test]
    fn holes_follow_their_outline() {
        let tree = ContourTree {
            nodes: vec![
                ContourNode { polygon: rect(0.0, 0.0, 10.0, 10.0), parent: None, depth: 0 },
                ContourNode { polygon: rect(20.0, 0.0, 10.0, 10.0), parent: None, depth: 0 },
                ContourNode { polygon: rect(2.0, 2.0, 4.0, 4.0).reversed(), parent: Some(0), depth: 1 },
            ],
            width: 40,
            height: 20,
        };

        let path = PathComposer::default().compose(&tree);
        let roles: Vec<bool> = path.subpaths.iter().map(|s| s.is_hole).collect();
        assert_eq!(roles, vec![false, true, false]);
        assert_eq!(
            path.to_svg_path_data(),
            "M 0,0 L 10,0 L 10,10 L 0,10 Z \
             M 2,6 L 6,6 L 6,2 L 2,2 Z \
             M 20,0 L 30,0 L 30,10 L 20,10 Z"
        );
    }
}
