use crate::{
    config::{ResizePolicy, Rounding},
    error::{Result, TraceError},
    types::{Dimensions, Unit},
};

/// Bound a resize is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetBound {
    /// The longer side becomes exactly this long.
    LongestSide(u32),
    /// Both axes are scaled by `bound / max(width, height)` so the result fits
    /// a `bound` x `bound` box.
    Square(u32),
}

impl TargetBound {
    pub fn value(&self) -> u32 {
        match *self {
            TargetBound::LongestSide(bound) | TargetBound::Square(bound) => bound,
        }
    }
}

fn validate(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TraceError::InvalidDimension { width, height });
    }
    Ok(())
}

/// Scale `width` x `height` to `bound`, keeping the aspect ratio.
///
/// Results are at least 1 in each axis. With [`Rounding::Floor`] the
/// non-pinned side may come out up to one unit short.
pub fn compute(width: u32, height: u32, bound: TargetBound, rounding: Rounding) -> Result<(u32, u32)> {
    validate(width, height)?;
    let target = bound.value();
    validate(target, target)?;

    let (w, h) = (width as f64, height as f64);
    let dims = match bound {
        TargetBound::LongestSide(_) => {
            // Pin the dominant side to the bound and derive the other from the
            // ratio, so extreme ratios never drift on the long side.
            let aspect = w / h;
            if width >= height {
                (target, rounding.apply(target as f64 / aspect))
            } else {
                (rounding.apply(target as f64 * aspect), target)
            }
        }
        TargetBound::Square(_) => {
            // The larger side is exactly the bound; only the other is scaled.
            let t = target as f64;
            if width >= height {
                (target, rounding.apply(h * t / w))
            } else {
                (rounding.apply(w * t / h), target)
            }
        }
    };

    Ok(dims)
}

/// Size of the raster that is traced, given the source size and an optional
/// longest-side bound.
pub fn raster_dimensions(source: Dimensions, raster_bound: Option<u32>, rounding: Rounding) -> Result<Dimensions> {
    validate(source.width, source.height)?;
    match raster_bound {
        Some(bound) => {
            let (width, height) = compute(source.width, source.height, TargetBound::LongestSide(bound), rounding)?;
            Ok(Dimensions::pixels(width, height))
        }
        None => Ok(Dimensions::pixels(source.width, source.height)),
    }
}

/// Physical page size (in points) for a document whose coordinate space is
/// `coordinates`.
pub fn page_dimensions(
    coordinates: Dimensions,
    policy: ResizePolicy,
    bound: u32,
    rounding: Rounding,
) -> Result<Dimensions> {
    validate(coordinates.width, coordinates.height)?;
    validate(bound, bound)?;

    let (width, height) = match policy {
        ResizePolicy::UniformSquare => (bound, bound),
        ResizePolicy::PreserveAspectBounded => {
            compute(coordinates.width, coordinates.height, TargetBound::Square(bound), rounding)?
        }
    };

    Ok(Dimensions::new(width, height, Unit::Points))
}
