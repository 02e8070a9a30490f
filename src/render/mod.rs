// ============================================
// Render Module - Видимость чанков
// ============================================

pub mod culling;

pub use culling::{Frustum, Plane};
