mod frustum;

pub use frustum::{extract_frustum_planes, Frustum, Plane};
