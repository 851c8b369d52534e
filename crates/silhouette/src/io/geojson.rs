use geojson::{Feature, FeatureCollection, Geometry, Value};
use crate::{
    error::{Result, TraceError},
    types::{ContourNode, ContourTree, Polygon},
};

fn ring_coordinates(polygon: &Polygon) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = polygon.points.iter().map(|&[x, y]| vec![x, y]).collect();
    // GeoJSON rings are explicitly closed
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl ContourTree {
    /// One Polygon feature per contour, holes included, in node order.
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::with_capacity(self.nodes.len());

        for (i, node) in self.nodes.iter().enumerate() {
            let geometry = Geometry::new(Value::Polygon(vec![ring_coordinates(&node.polygon)]));

            let mut properties = serde_json::Map::new();
            properties.insert("depth".to_string(), serde_json::Value::from(node.depth));
            properties.insert("is_hole".to_string(), serde_json::Value::Bool(node.is_hole()));
            properties.insert(
                "parent".to_string(),
                node.parent.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null),
            );
            properties.insert("area".to_string(), number(node.polygon.area()));
            properties.insert("perimeter".to_string(), number(node.polygon.perimeter()));
            properties.insert("points".to_string(), serde_json::Value::from(node.polygon.len()));

            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
                properties: Some(properties),
                foreign_members: None,
            });
        }

        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert("image_width".to_string(), serde_json::Value::from(self.width));
        foreign_members.insert("image_height".to_string(), serde_json::Value::from(self.height));
        foreign_members.insert("contour_count".to_string(), serde_json::Value::from(self.nodes.len()));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Load a ContourTree from a GeoJSON string written by [`Self::to_geojson_string`]
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let geojson: FeatureCollection = geojson_str.parse()?;

        let foreign_members = geojson.foreign_members.as_ref()
            .ok_or_else(|| TraceError::InvalidContourTree("missing image metadata".to_string()))?;
        let dimension = |key: &str| {
            foreign_members.get(key)
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .ok_or_else(|| TraceError::InvalidContourTree(format!("missing or invalid {key}")))
        };
        let width = dimension("image_width")?;
        let height = dimension("image_height")?;

        let mut nodes = Vec::new();
        // Parent indices refer to feature positions, so nothing may be skipped.
        for (i, feature) in geojson.features.into_iter().enumerate() {
            let Some(Geometry { value: Value::Polygon(rings), .. }) = feature.geometry else {
                return Err(TraceError::InvalidContourTree(format!("feature {i} is not a polygon")));
            };
            let Some(ring) = rings.first() else {
                return Err(TraceError::InvalidContourTree(format!("feature {i} has no exterior ring")));
            };

            let mut points: Vec<[f64; 2]> = ring
                .iter()
                .filter(|coord| coord.len() >= 2)
                .map(|coord| [coord[0], coord[1]])
                .collect();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }

            let properties = feature.properties.unwrap_or_default();
            let depth = properties.get("depth").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            let parent = properties.get("parent").and_then(|v| v.as_u64()).map(|v| v as usize);

            nodes.push(ContourNode {
                polygon: Polygon::new(points),
                parent,
                depth,
            });
        }

        let tree = ContourTree { nodes, width, height };
        tree.validate()?;
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed_tree() -> ContourTree {
        let outer = Polygon::new(vec![[0.0, 0.0], [8.0, 0.0], [8.0, 8.0], [0.0, 8.0]]);
        let hole = Polygon::new(vec![[2.0, 2.0], [2.0, 6.0], [6.0, 6.0], [6.0, 2.0]]);
        ContourTree {
            nodes: vec![
                ContourNode { polygon: outer, parent: None, depth: 0 },
                ContourNode { polygon: hole, parent: Some(0), depth: 1 },
            ],
            width: 10,
            height: 10,
        }
    }

    #[test]
    fn features_carry_hierarchy() {
        let collection = framed_tree().to_geojson().unwrap();
        assert_eq!(collection.features.len(), 2);

        let hole = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(hole["is_hole"], serde_json::Value::Bool(true));
        assert_eq!(hole["parent"], serde_json::Value::from(0));
        assert_eq!(hole["area"], serde_json::Value::from(16.0));

        let members = collection.foreign_members.unwrap();
        assert_eq!(members["image_width"], serde_json::Value::from(10));

        match &collection.features[0].geometry.as_ref().unwrap().value {
            Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn string_reloads_to_same_tree() {
        let tree = framed_tree();
        let text = tree.to_geojson_string().unwrap();
        assert_eq!(ContourTree::from_geojson_string(&text).unwrap(), tree);
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        let err = ContourTree::from_geojson_string(text).unwrap_err();
        assert!(matches!(err, TraceError::InvalidContourTree(_)));
    }

    fn collection_with(features: &str) -> String {
        format!(
            r#"{{"type":"FeatureCollection","image_width":10,"image_height":10,"features":[{features}]}}"#
        )
    }

    fn square_feature(parent: &str, depth: usize) -> String {
        format!(
            r#"{{"type":"Feature","geometry":{{"type":"Polygon","coordinates":[[[0,0],[4,0],[4,4],[0,4],[0,0]]]}},"properties":{{"parent":{parent},"depth":{depth}}}}}"#
        )
    }

    #[test]
    fn out_of_range_parent_is_rejected() {
        let text = collection_with(&square_feature("7", 1));
        let err = ContourTree::from_geojson_string(&text).unwrap_err();
        assert!(matches!(err, TraceError::InvalidContourTree(_)));
    }

    #[test]
    fn parent_after_child_is_rejected() {
        let text = collection_with(&format!("{},{}", square_feature("1", 1), square_feature("null", 0)));
        let err = ContourTree::from_geojson_string(&text).unwrap_err();
        assert!(matches!(err, TraceError::InvalidContourTree(_)));

        let ordered = collection_with(&format!("{},{}", square_feature("null", 0), square_feature("0", 1)));
        let tree = ContourTree::from_geojson_string(&ordered).unwrap();
        assert_eq!(tree.nodes[1].parent, Some(0));
    }

    #[test]
    fn non_polygon_feature_is_rejected() {
        let point = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{}}"#;
        assert!(ContourTree::from_geojson_string(&collection_with(point)).is_err());
    }
}
