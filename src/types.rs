// src/types.rs
//
// Common shared types for the rosace simulator.
//
// The whole system lives in fixed, tiny dimensions (3-D latent state,
// 2-D observation / action), so we use plain arrays instead of a linear
// algebra crate and keep the handful of products we need as free
// functions here.

/// 3-D latent state (true or estimated).
pub type Vec3 = [f64; 3];

/// 2-D observation: projection of a latent state.
pub type Obs2 = [f64; 2];

/// 2-D action applied to the world.
pub type Action2 = [f64; 2];

/// 3×3 dynamics matrix.
pub type Mat3 = [[f64; 3]; 3];

/// 2×3 projection matrix (latent → observed).
pub type Mat2x3 = [[f64; 3]; 2];

/// 3×2 lift matrix (action → latent, or pseudo-inverse of the projection).
pub type Mat3x2 = [[f64; 2]; 3];

/// `M · v` for a 3×3 matrix.
pub fn mat3_mul_vec3(m: &Mat3, v: &Vec3) -> Vec3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// `M · v` for a 2×3 matrix (projection).
pub fn mat2x3_mul_vec3(m: &Mat2x3, v: &Vec3) -> Obs2 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
    ]
}

/// `M · v` for a 3×2 matrix (action lift / pseudo-inverse correction).
pub fn mat3x2_mul_vec2(m: &Mat3x2, v: &[f64; 2]) -> Vec3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1],
        m[1][0] * v[0] + m[1][1] * v[1],
        m[2][0] * v[0] + m[2][1] * v[1],
    ]
}

/// Euclidean norm of a 2-D vector.
pub fn norm2(v: &[f64; 2]) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

/// Euclidean norm of a 3-D vector.
pub fn norm3(v: &Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Component-wise difference of two 2-D vectors.
pub fn sub2(a: &Obs2, b: &Obs2) -> Obs2 {
    [a[0] - b[0], a[1] - b[1]]
}

/// Component-wise sum of two 3-D vectors.
pub fn add3(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Component-wise difference of two 3-D vectors.
pub fn sub3(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mat3_identity_preserves_vector() {
        let id: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let v = [1.5, -2.0, 0.25];
        assert_eq!(mat3_mul_vec3(&id, &v), v);
    }

    #[test]
    fn norms_match_pythagoras() {
        assert!((norm2(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert!((norm3(&[2.0, 3.0, 6.0]) - 7.0).abs() < 1e-12);
    }
}
