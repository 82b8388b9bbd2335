use proptest::prelude::*;
use voxmc_mesh::{ExtractParams, extract};
use voxmc_vox::VoxModel;

fn arb_model() -> impl Strategy<Value = VoxModel> {
    (1usize..=4, 1usize..=4, 1usize..=4)
        .prop_flat_map(|(sx, sy, sz)| {
            (
                Just((sx, sy, sz)),
                proptest::collection::vec(0u8..=1, sx * sy * sz),
            )
        })
        .prop_map(|((sx, sy, sz), voxels)| {
            let mut m = VoxModel::new(sx, sy, sz);
            m.voxels = voxels;
            m
        })
}

fn lattice_params() -> ExtractParams {
    ExtractParams {
        scale: 1.0,
        upscale: 1.0,
        ..ExtractParams::default()
    }
}

proptest! {
    // Structural sanity of any extraction: parallel position/normal arrays,
    // in-range indices, unit normals orthogonal to their triangle.
    #[test]
    fn extraction_is_well_formed(m in arb_model()) {
        let mesh = extract(&m, &lattice_params()).unwrap();
        prop_assert_eq!(mesh.positions.len(), mesh.normals.len());
        for tri in &mesh.triangles {
            for &i in tri {
                prop_assert!((i as usize) < mesh.positions.len());
            }
            let a = mesh.positions[tri[0] as usize];
            let b = mesh.positions[tri[1] as usize];
            let c = mesh.positions[tri[2] as usize];
            let n = mesh.normals[tri[0] as usize];
            prop_assert!((n.length() - 1.0).abs() < 1e-4);
            prop_assert!(n.dot(b - a).abs() < 1e-4);
            prop_assert!(n.dot(c - a).abs() < 1e-4);
        }
    }

    // A mirrored volume produces a mirrored surface: same triangle count.
    #[test]
    fn mirroring_preserves_triangle_count(m in arb_model(), fx: bool, fy: bool, fz: bool) {
        let base = extract(&m, &lattice_params()).unwrap();
        let mut flipped = m.clone();
        flipped.flip(fx, fy, fz);
        let mirrored = extract(&flipped, &lattice_params()).unwrap();
        prop_assert_eq!(base.triangle_count(), mirrored.triangle_count());
    }

    // Occupancy alone decides the surface; palette colors never do.
    #[test]
    fn palette_indices_do_not_change_surface(m in arb_model()) {
        let base = extract(&m, &lattice_params()).unwrap();
        let mut recolored = m.clone();
        for v in recolored.voxels.iter_mut() {
            if *v != 0 {
                *v = 200;
            }
        }
        let same = extract(&recolored, &lattice_params()).unwrap();
        prop_assert_eq!(base.triangle_count(), same.triangle_count());
    }
}
