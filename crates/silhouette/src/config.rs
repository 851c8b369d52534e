use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// How the output page is sized from the traced coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[derive(Display, EnumString, EnumIter, VariantNames, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResizePolicy {
    /// Fixed `target_bound` x `target_bound` page; the artwork is scaled
    /// uniformly and centred inside it.
    #[default]
    UniformSquare,
    /// Page takes the artwork's aspect ratio, longest side = `target_bound`.
    PreserveAspectBounded,
}

/// How scaled dimensions are converted back to whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[derive(Display, EnumString, EnumIter, VariantNames, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Rounding {
    /// Truncate; may lose up to one unit per axis.
    #[default]
    Floor,
    Nearest,
}

impl Rounding {
    pub fn apply(&self, value: f64) -> u32 {
        let rounded = match self {
            Rounding::Floor => value.floor(),
            Rounding::Nearest => value.round(),
        };
        (rounded as u32).max(1)
    }
}

/// Every tunable of the vectorization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TraceConfig {
    /// Page bound in points
    #[schemars(range(min = 1))]
    pub target_bound: u32,

    /// Longest-side bound the matted raster is resampled to before tracing.
    /// `None` traces at source resolution.
    pub raster_bound: Option<u32>,

    /// Douglas-Peucker tolerance as a fraction of each polygon's perimeter
    #[schemars(range(min = 0.0, max = 0.05))]
    pub simplify_tolerance_factor: f64,

    /// Contours enclosing this many square pixels or fewer are dropped
    pub min_contour_area: f64,

    /// A pixel whose R, G and B all reach this value is background
    pub white_threshold: u8,

    /// A pixel whose mean colour is below this value is foreground
    pub dark_threshold: u8,

    pub resize_policy: ResizePolicy,

    pub rounding: Rounding,

    /// Keep hole contours; when false only outer boundaries are traced
    pub holes: bool,

    /// Paint a white rectangle under the path covering the whole page
    pub background: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            target_bound: 144,
            raster_bound: Some(600),
            simplify_tolerance_factor: 0.0001,
            min_contour_area: 5.0,
            white_threshold: 245,
            dark_threshold: 128,
            resize_policy: ResizePolicy::UniformSquare,
            rounding: Rounding::Floor,
            holes: true,
            background: true,
        }
    }
}

impl TraceConfig {
    /// Get the JSON schema for the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(TraceConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn policies_parse_from_kebab_case() {
        assert_eq!(
            ResizePolicy::from_str("uniform-square").unwrap(),
            ResizePolicy::UniformSquare
        );
        assert_eq!(
            ResizePolicy::from_str("preserve-aspect-bounded").unwrap(),
            ResizePolicy::PreserveAspectBounded
        );
        assert_eq!(ResizePolicy::PreserveAspectBounded.to_string(), "preserve-aspect-bounded");
        assert!(ResizePolicy::from_str("stretch").is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: TraceConfig =
            serde_json::from_str(r#"{ "target_bound": 72, "resize_policy": "preserve-aspect-bounded" }"#)
                .unwrap();
        assert_eq!(config.target_bound, 72);
        assert_eq!(config.resize_policy, ResizePolicy::PreserveAspectBounded);
        assert_eq!(config.white_threshold, 245);
        assert_eq!(config.raster_bound, Some(600));
    }

    #[test]
    fn rounding_never_yields_zero() {
        assert_eq!(Rounding::Floor.apply(0.4), 1);
        assert_eq!(Rounding::Floor.apply(7.9), 7);
        assert_eq!(Rounding::Nearest.apply(7.5), 8);
    }
}
