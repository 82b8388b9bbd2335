use std::collections::HashMap;

use voxmc_geom::Vec3;
use voxmc_mesh::{ExtractParams, Mesh, VertexPlacement, extract};
use voxmc_vox::VoxModel;

fn lattice_params() -> ExtractParams {
    ExtractParams {
        scale: 1.0,
        upscale: 1.0,
        ..ExtractParams::default()
    }
}

fn single_voxel() -> VoxModel {
    let mut m = VoxModel::new(3, 3, 3);
    m.set(1, 1, 1, 1);
    m
}

/// 2x2x2 solid block missing one corner voxel.
fn block_minus_corner() -> VoxModel {
    let mut m = VoxModel::new(2, 2, 2);
    m.voxels.fill(1);
    m.set(0, 0, 0, 0);
    m
}

fn quantize(v: Vec3) -> [i64; 3] {
    // Lattice-unit meshes only place vertices on half-integer coordinates.
    [
        (v.x * 2.0).round() as i64,
        (v.y * 2.0).round() as i64,
        (v.z * 2.0).round() as i64,
    ]
}

/// Every undirected edge of a closed triangle mesh is shared by exactly two
/// triangles.
fn assert_watertight(mesh: &Mesh) {
    let mut edges: HashMap<([i64; 3], [i64; 3]), u32> = HashMap::new();
    for tri in &mesh.triangles {
        let p = [
            quantize(mesh.positions[tri[0] as usize]),
            quantize(mesh.positions[tri[1] as usize]),
            quantize(mesh.positions[tri[2] as usize]),
        ];
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let key = if p[a] <= p[b] { (p[a], p[b]) } else { (p[b], p[a]) };
            *edges.entry(key).or_insert(0) += 1;
        }
    }
    assert!(!edges.is_empty());
    for (edge, count) in edges {
        assert_eq!(count, 2, "edge {edge:?} shared by {count} triangles");
    }
}

#[test]
fn zero_sized_volume_yields_empty_mesh() {
    let mesh = extract(&VoxModel::empty(), &ExtractParams::default()).unwrap();
    assert!(mesh.is_empty());
    assert_eq!(mesh.vertex_count(), 0);
}

#[test]
fn all_air_volume_yields_empty_mesh() {
    let mesh = extract(&VoxModel::new(8, 8, 8), &ExtractParams::default()).unwrap();
    assert!(mesh.is_empty());
}

#[test]
fn single_voxel_yields_eight_corner_triangles() {
    // Eight surrounding cells, each in the one-corner-occupied
    // configuration contributing a single triangle.
    let mesh = extract(&single_voxel(), &lattice_params()).unwrap();
    assert_eq!(mesh.triangle_count(), 8);
    assert_eq!(mesh.vertex_count(), 24);
    assert_watertight(&mesh);
}

#[test]
fn single_voxel_normals_point_outward() {
    let mesh = extract(&single_voxel(), &lattice_params()).unwrap();
    let center = Vec3::new(1.0, 1.0, 1.0);
    for tri in &mesh.triangles {
        let a = mesh.positions[tri[0] as usize];
        let b = mesh.positions[tri[1] as usize];
        let c = mesh.positions[tri[2] as usize];
        let centroid = (a + b + c) / 3.0;
        let n = mesh.normals[tri[0] as usize];
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(
            (centroid - center).dot(n) > 0.0,
            "normal {n:?} points into the solid at {centroid:?}"
        );
    }
}

#[test]
fn block_minus_corner_is_watertight() {
    let mesh = extract(&block_minus_corner(), &lattice_params()).unwrap();
    assert!(!mesh.is_empty());
    assert_watertight(&mesh);
}

#[test]
fn upscaling_never_reduces_triangle_count() {
    let model = block_minus_corner();
    let coarse = extract(&model, &lattice_params()).unwrap();
    let fine = extract(
        &model,
        &ExtractParams {
            scale: 1.0,
            upscale: 2.0,
            ..ExtractParams::default()
        },
    )
    .unwrap();
    assert!(coarse.triangle_count() < fine.triangle_count());
}

#[test]
fn scale_and_offset_apply_after_extraction() {
    let offset = Vec3::new(10.0, -1.0, 0.5);
    let mesh = extract(
        &single_voxel(),
        &ExtractParams {
            scale: 2.0,
            upscale: 1.0,
            offset,
            ..ExtractParams::default()
        },
    )
    .unwrap();
    let mut centroid = Vec3::ZERO;
    for p in &mesh.positions {
        centroid += *p;
    }
    centroid = centroid / mesh.vertex_count() as f32;
    let expected = Vec3::new(1.0, 1.0, 1.0) * 2.0 + offset;
    assert!((centroid - expected).length() < 1e-4);
}

#[test]
fn upscale_preserves_world_extent() {
    // A finer lattice must not grow the model in world units.
    let model = single_voxel();
    let fine = extract(
        &model,
        &ExtractParams {
            scale: 1.0,
            upscale: 3.0,
            ..ExtractParams::default()
        },
    )
    .unwrap();
    for p in &fine.positions {
        assert!(p.x >= 0.0 && p.x <= 3.0);
        assert!(p.y >= 0.0 && p.y <= 3.0);
        assert!(p.z >= 0.0 && p.z <= 3.0);
    }
}

#[test]
fn corner_snap_collapses_isolated_voxel() {
    let mesh = extract(
        &single_voxel(),
        &ExtractParams {
            scale: 1.0,
            upscale: 1.0,
            placement: VertexPlacement::CornerSnap,
            ..ExtractParams::default()
        },
    )
    .unwrap();
    assert!(mesh.is_empty());
}

#[test]
fn corner_snap_keeps_block_faces_on_lattice() {
    let mut model = VoxModel::new(2, 2, 2);
    model.voxels.fill(1);
    let mesh = extract(
        &model,
        &ExtractParams {
            scale: 1.0,
            upscale: 1.0,
            placement: VertexPlacement::CornerSnap,
            ..ExtractParams::default()
        },
    )
    .unwrap();
    assert!(!mesh.is_empty());
    for p in &mesh.positions {
        assert_eq!(p.x.fract(), 0.0);
        assert_eq!(p.y.fract(), 0.0);
        assert_eq!(p.z.fract(), 0.0);
    }
}

#[test]
fn name_is_carried_through() {
    let mesh = extract(
        &single_voxel(),
        &ExtractParams {
            name: Some("crate_01".to_string()),
            ..lattice_params()
        },
    )
    .unwrap();
    assert_eq!(mesh.name.as_deref(), Some("crate_01"));
}
