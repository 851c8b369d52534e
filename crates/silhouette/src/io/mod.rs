pub mod geojson;
pub mod svg;
