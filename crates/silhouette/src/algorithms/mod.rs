pub mod dimensions;
pub mod matte;
pub mod extraction;
pub mod simplification;
pub mod composition;

pub use dimensions::*;
pub use matte::*;
pub use extraction::*;
pub use simplification::*;
pub use composition::*;
