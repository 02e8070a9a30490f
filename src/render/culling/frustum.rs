// ============================================
// Frustum Culling - Отсечение чанков по пирамиде видимости
// ============================================

use ultraviolet::{Mat4, Vec3};

use crate::terrain::mesh::Aabb;

/// Длина нормали, ниже которой плоскость считается вырожденной
const DEGENERATE_EPSILON: f32 = 1e-5;

/// Плоскость a*x + b*y + c*z + d = 0; внутренность frustum: расстояние >= 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Пропускает всё: (0, 0, 0, 0)
    pub const PASS_ALL: Plane = Plane {
        normal: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
        d: 0.0,
    };

    /// Нормализует по длине (a, b, c); вырожденная плоскость -> PASS_ALL
    pub fn from_coefficients(coefficients: [f32; 4]) -> Self {
        let [a, b, c, d] = coefficients;
        let len = (a * a + b * b + c * c).sqrt();
        if !(len >= DEGENERATE_EPSILON) {
            return Plane::PASS_ALL;
        }
        Plane {
            normal: Vec3::new(a / len, b / len, c / len),
            d: d / len,
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Бокс целиком по отрицательную сторону плоскости
    #[inline]
    pub fn excludes(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let extent = aabb.half_extents();
        let radius = extent.x * self.normal.x.abs()
            + extent.y * self.normal.y.abs()
            + extent.z * self.normal.z.abs();
        self.signed_distance(center) < -radius
    }
}

/// Извлекает 6 плоскостей из view-projection матрицы (column-major, m[col][row]).
/// Порядок: left, right, bottom, top, near, far. Плоскости не нормализованы.
pub fn extract_frustum_planes(vp: &[[f32; 4]; 4]) -> [[f32; 4]; 6] {
    let m = vp;
    [
        // Left:   row3 + row0
        [m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]],
        // Right:  row3 - row0
        [m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]],
        // Bottom: row3 + row1
        [m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]],
        // Top:    row3 - row1
        [m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]],
        // Near:   row3 + row2
        [m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]],
        // Far:    row3 - row2
        [m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]],
    ]
}

fn columns(m: &Mat4) -> [[f32; 4]; 4] {
    let c = &m.cols;
    [
        [c[0].x, c[0].y, c[0].z, c[0].w],
        [c[1].x, c[1].y, c[1].z, c[1].w],
        [c[2].x, c[2].y, c[2].z, c[2].w],
        [c[3].x, c[3].y, c[3].z, c[3].w],
    ]
}

/// Шесть нормализованных плоскостей; пересчитывается каждый кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        Self::from_columns(&columns(view_proj))
    }

    pub fn from_columns(vp: &[[f32; 4]; 4]) -> Self {
        let raw = extract_frustum_planes(vp);
        Self {
            planes: raw.map(Plane::from_coefficients),
        }
    }

    /// Консервативный тест: false только если бокс целиком вне одной из плоскостей.
    /// Бокс вокруг камеры виден, только если выходит за near-плоскость;
    /// бокс меньше расстояния до near целиком перед глазом отсекается.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        !self.planes.iter().any(|plane| plane.excludes(aabb))
    }
}
