pub mod noise;
pub mod height;
pub mod color;

pub use noise::{SeededRng, SimplexNoise, build_permutation};
pub use height::{HeightField, NoiseParams, apply_flatness, MAX_OCTAVES};
pub use color::{SurfaceBlend, SurfaceWeights};
