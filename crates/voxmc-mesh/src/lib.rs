//! Marching Cubes surface extraction over binary voxel occupancy.
//!
//! A voxel is "inside" when its palette index is non-zero. Every 2x2x2
//! lattice cell (including a one-cell border of empty space, so models
//! touching the volume boundary still close) is classified by an 8-bit
//! corner code and triangulated from the static lookup table. Output is a
//! triangle soup with flat per-triangle normals pointing out of the solid.
#![forbid(unsafe_code)]

mod tables;

use rayon::prelude::*;
use thiserror::Error;
use voxmc_geom::{Vec3, face_normal};
use voxmc_vox::VoxModel;

use tables::{CORNER_OFFSETS, EDGE_CORNERS, NO_EDGE, TRI_TABLE};

/// Upper bound on the resampled occupancy grid, in cells.
const MAX_GRID_CELLS: usize = 1 << 30;

/// Where on a sign-changing cell edge the emitted vertex lands. Fixed per
/// invocation; it decides whether the output reads smooth or blocky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexPlacement {
    /// Midpoint of the edge. This is what density interpolation degenerates
    /// to on a binary field, and the default.
    #[default]
    EdgeMidpoint,
    /// Snap to the occupied endpoint, keeping coplanar voxel faces
    /// axis-aligned. Configurations whose vertices all collapse onto one
    /// corner (isolated voxels, lone corners) emit nothing in this mode.
    CornerSnap,
}

#[derive(Clone, Debug)]
pub struct ExtractParams {
    /// Uniform multiplier from lattice units to world units.
    pub scale: f32,
    /// Occupancy resampling factor applied before extraction; values below
    /// 1.0 are treated as 1.0 (no resampling).
    pub upscale: f32,
    /// Translation added to every vertex after scaling.
    pub offset: Vec3,
    pub placement: VertexPlacement,
    /// Carried through to the exported object name.
    pub name: Option<String>,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            scale: 0.03125,
            upscale: 3.0,
            offset: Vec3::ZERO,
            placement: VertexPlacement::default(),
            name: None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("upscaled occupancy grid {sx}x{sy}x{sz} is too large")]
    OutOfMemory { sx: usize, sy: usize, sz: usize },
}

/// Extraction output. `normals` parallels `positions`; the three vertices
/// of a triangle share its face normal (flat shading).
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub name: Option<String>,
}

impl Mesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Binary occupancy sampled on the (possibly resampled) lattice.
struct OccupancyGrid {
    sx: usize,
    sy: usize,
    sz: usize,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    fn from_model(model: &VoxModel) -> Self {
        Self {
            sx: model.sx,
            sy: model.sy,
            sz: model.sz,
            cells: model.voxels.iter().map(|&v| (v != 0) as u8).collect(),
        }
    }

    /// Nearest-neighbor resample to `factor` times the source resolution.
    /// Slabs along Z are independent, so they fill in parallel.
    fn resampled(model: &VoxModel, factor: f32) -> Result<Self, MeshError> {
        let sx = (model.sx as f32 * factor).round() as usize;
        let sy = (model.sy as f32 * factor).round() as usize;
        let sz = (model.sz as f32 * factor).round() as usize;
        let total = sx
            .checked_mul(sy)
            .and_then(|v| v.checked_mul(sz))
            .filter(|&v| v <= MAX_GRID_CELLS)
            .ok_or(MeshError::OutOfMemory { sx, sy, sz })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(total)
            .map_err(|_| MeshError::OutOfMemory { sx, sy, sz })?;
        cells.resize(total, 0u8);

        let inv = 1.0 / factor;
        cells
            .par_chunks_mut(sx * sy)
            .enumerate()
            .for_each(|(z, slab)| {
                let mz = nearest(z, inv, model.sz);
                for y in 0..sy {
                    let my = nearest(y, inv, model.sy);
                    for x in 0..sx {
                        let mx = nearest(x, inv, model.sx);
                        slab[y * sx + x] = (model.get_raw(mx, my, mz) != 0) as u8;
                    }
                }
            });

        Ok(Self { sx, sy, sz, cells })
    }

    /// Out-of-range samples read as empty; that is what closes the surface
    /// at the volume boundary.
    #[inline]
    fn get(&self, x: i32, y: i32, z: i32) -> bool {
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= self.sx
            || y as usize >= self.sy
            || z as usize >= self.sz
        {
            return false;
        }
        self.cells[x as usize + self.sx * (y as usize + self.sy * z as usize)] != 0
    }
}

/// Map an upscaled lattice index back to its source sample.
#[inline]
fn nearest(i: usize, inv: f32, limit: usize) -> usize {
    (((i as f32 + 0.5) * inv) as usize).min(limit - 1)
}

/// Walk every cell of the (optionally upscaled) lattice and triangulate the
/// occupancy boundary. An empty or zero-sized volume yields an empty mesh.
pub fn extract(model: &VoxModel, params: &ExtractParams) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh {
        name: params.name.clone(),
        ..Mesh::default()
    };
    if model.is_empty() {
        return Ok(mesh);
    }

    let factor = params.upscale.max(1.0);
    let grid = if factor > 1.0 {
        OccupancyGrid::resampled(model, factor)?
    } else {
        OccupancyGrid::from_model(model)
    };
    let to_world = params.scale / factor;

    for z in -1..grid.sz as i32 {
        for y in -1..grid.sy as i32 {
            for x in -1..grid.sx as i32 {
                let mut code = 0usize;
                for (bit, &(dx, dy, dz)) in CORNER_OFFSETS.iter().enumerate() {
                    if grid.get(x + dx, y + dy, z + dz) {
                        code |= 1 << bit;
                    }
                }
                if code == 0 || code == 0xFF {
                    continue;
                }
                emit_cell(&mut mesh, code, x, y, z, params, to_world);
            }
        }
    }

    log::debug!(
        "extracted {} triangles from {}x{}x{} lattice (upscale {factor})",
        mesh.triangle_count(),
        grid.sx,
        grid.sy,
        grid.sz,
    );
    Ok(mesh)
}

#[inline]
fn corner_lattice(x: i32, y: i32, z: i32, corner: usize) -> Vec3 {
    let (dx, dy, dz) = CORNER_OFFSETS[corner];
    Vec3::new((x + dx) as f32, (y + dy) as f32, (z + dz) as f32)
}

#[inline]
fn edge_vertex(code: usize, edge: usize, x: i32, y: i32, z: i32, placement: VertexPlacement) -> Vec3 {
    let (a, b) = EDGE_CORNERS[edge];
    let pa = corner_lattice(x, y, z, a);
    let pb = corner_lattice(x, y, z, b);
    match placement {
        VertexPlacement::EdgeMidpoint => pa.midpoint(pb),
        VertexPlacement::CornerSnap => {
            if code & (1 << a) != 0 {
                pa
            } else {
                pb
            }
        }
    }
}

fn emit_cell(mesh: &mut Mesh, code: usize, x: i32, y: i32, z: i32, params: &ExtractParams, to_world: f32) {
    for tri in &TRI_TABLE[code] {
        if tri[0] == NO_EDGE {
            break;
        }
        // The reference table winds clockwise seen from outside under this
        // corner convention, so the triple is emitted reversed; the face
        // normal then points away from the occupied region.
        let l0 = edge_vertex(code, tri[0] as usize, x, y, z, params.placement);
        let l1 = edge_vertex(code, tri[2] as usize, x, y, z, params.placement);
        let l2 = edge_vertex(code, tri[1] as usize, x, y, z, params.placement);

        let w0 = l0 * to_world + params.offset;
        let w1 = l1 * to_world + params.offset;
        let w2 = l2 * to_world + params.offset;

        let n = face_normal(w0, w1, w2);
        if n == Vec3::ZERO {
            // Collapsed by corner snapping; zero-area triangles carry no
            // surface and are dropped.
            continue;
        }

        let base = mesh.positions.len() as u32;
        mesh.positions.extend_from_slice(&[w0, w1, w2]);
        mesh.normals.extend_from_slice(&[n, n, n]);
        mesh.triangles.push([base, base + 1, base + 2]);
    }
}
