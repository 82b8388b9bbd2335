use proptest::num::f32::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;
use voxmc_geom::{Vec3, face_normal};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
fn vapprox(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e4)
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Cross product is orthogonal to both inputs (relative to their magnitudes).
    #[test]
    fn cross_is_orthogonal(a in arb_vec3(), b in arb_vec3()) {
        let c = a.cross(b);
        let scale = a.length() * b.length() * c.length();
        prop_assert!(a.dot(c).abs() <= 1e-2 + 1e-4 * scale);
        prop_assert!(b.dot(c).abs() <= 1e-2 + 1e-4 * scale);
    }

    // Normalizing a non-degenerate vector yields unit length.
    #[test]
    fn normalized_has_unit_length(a in arb_vec3()) {
        prop_assume!(a.length() > 1e-3);
        prop_assert!(approx(a.normalized().length(), 1.0, 1e-4));
    }

    // Midpoint is equidistant from both endpoints.
    #[test]
    fn midpoint_is_centered(a in arb_vec3(), b in arb_vec3()) {
        let m = a.midpoint(b);
        prop_assert!(vapprox(m - a, b - m, 1e-2));
    }

    // Reversing the winding negates the face normal.
    #[test]
    fn face_normal_flips_with_winding(a in arb_vec3(), b in arb_vec3(), c in arb_vec3()) {
        let n = face_normal(a, b, c);
        prop_assume!(n.length() > 0.5);
        let r = face_normal(a, c, b);
        prop_assert!(vapprox(n + r, Vec3::ZERO, 1e-3));
    }
}
