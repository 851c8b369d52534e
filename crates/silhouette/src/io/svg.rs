use std::{fmt::Display, io::Cursor, path::Path};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};
use crate::{
    document::VectorDocument,
    error::{Result, TraceError},
};

fn xml_error(e: impl Display) -> TraceError {
    TraceError::Xml(e.to_string())
}

impl VectorDocument {
    /// Serialize as a standalone SVG document.
    ///
    /// The root declares the page in `pt` and the coordinate space as the
    /// `viewBox`; the path is a single `<path>` with the document's fill rule.
    pub fn to_svg_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        svg.push_attribute(("version", "1.1"));
        svg.push_attribute(("width", format!("{}pt", self.page.width).as_str()));
        svg.push_attribute(("height", format!("{}pt", self.page.height).as_str()));
        svg.push_attribute((
            "viewBox",
            format!("0 0 {} {}", self.coordinates.width, self.coordinates.height).as_str(),
        ));
        svg.push_attribute(("preserveAspectRatio", "xMidYMid meet"));
        writer.write_event(Event::Start(svg)).map_err(xml_error)?;

        if let Some(background) = &self.background {
            let [x, y, width, height] = self.canvas_rect();
            let mut rect = BytesStart::new("rect");
            rect.push_attribute(("x", x.to_string().as_str()));
            rect.push_attribute(("y", y.to_string().as_str()));
            rect.push_attribute(("width", width.to_string().as_str()));
            rect.push_attribute(("height", height.to_string().as_str()));
            rect.push_attribute(("fill", background.as_str()));
            writer.write_event(Event::Empty(rect)).map_err(xml_error)?;
        }

        if !self.path.is_empty() {
            let mut group = BytesStart::new("g");
            group.push_attribute(("fill", self.fill.as_str()));
            group.push_attribute(("stroke", "none"));
            writer.write_event(Event::Start(group)).map_err(xml_error)?;

            let data = self.path.to_svg_path_data();
            let mut path = BytesStart::new("path");
            path.push_attribute(("d", data.as_str()));
            path.push_attribute(("fill-rule", self.path.fill_rule.svg_value()));
            writer.write_event(Event::Empty(path)).map_err(xml_error)?;

            writer.write_event(Event::End(BytesEnd::new("g"))).map_err(xml_error)?;
        }

        writer.write_event(Event::End(BytesEnd::new("svg"))).map_err(xml_error)?;

        String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let svg = self.to_svg_string()?;
        std::fs::write(path, svg)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        document::VectorDocument,
        types::{FillRule, PathDescriptor, Polygon, Subpath},
    };

    fn ring_path() -> PathDescriptor {
        let outer = Polygon::new(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let hole = Polygon::new(vec![[3.0, 3.0], [3.0, 7.0], [7.0, 7.0], [7.0, 3.0]]);
        PathDescriptor {
            subpaths: vec![
                Subpath { polygon: outer, is_hole: false },
                Subpath { polygon: hole, is_hole: true },
            ],
            fill_rule: FillRule::EvenOdd,
        }
    }

    #[test]
    fn svg_declares_page_and_coordinate_space() {
        let doc = VectorDocument::build(ring_path(), 144, 144, 20, 10).unwrap();
        let svg = doc.to_svg_string().unwrap();

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains(r#"width="144pt""#));
        assert!(svg.contains(r#"height="144pt""#));
        assert!(svg.contains(r#"viewBox="0 0 20 10""#));
        assert!(svg.contains(r#"preserveAspectRatio="xMidYMid meet""#));
        assert!(svg.contains(r#"fill-rule="evenodd""#));
        assert!(svg.contains("M 0,0 L 10,0 L 10,10 L 0,10 Z M 3,3 L 3,7 L 7,7 L 7,3 Z"));
    }

    #[test]
    fn background_covers_the_letterboxed_page() {
        let doc = VectorDocument::build(ring_path(), 144, 144, 20, 10).unwrap();
        let svg = doc.to_svg_string().unwrap();
        // background precedes the path so the path paints over it
        let rect = svg.find("<rect").unwrap();
        let path = svg.find("<path").unwrap();
        assert!(rect < path);
        assert!(svg.contains(r#"y="-5""#));
        assert!(svg.contains(r#"width="20""#));
        assert!(svg.contains(r#"height="20""#));
        assert!(svg.contains(r#"fill="white""#));
    }

    #[test]
    fn blank_document_has_only_background() {
        let doc = VectorDocument::build(PathDescriptor::default(), 144, 144, 20, 20).unwrap();
        let svg = doc.to_svg_string().unwrap();
        assert!(svg.contains("<rect"));
        assert!(!svg.contains("<path"));

        let bare = doc.without_background().to_svg_string().unwrap();
        assert!(!bare.contains("<rect"));
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("ring.svg");
        let doc = VectorDocument::build(ring_path(), 72, 36, 20, 10).unwrap();
        doc.save_svg(&target).unwrap();
        let written = std::fs::read_to_string(&target).unwrap();
        assert_eq!(written, doc.to_svg_string().unwrap());
    }
}
