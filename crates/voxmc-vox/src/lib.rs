//! Dense voxel volume plus the chunked `.vox` container codec.
#![forbid(unsafe_code)]

mod codec;
mod error;
mod palette;

pub use error::VoxError;
pub use palette::Rgba;

/// Largest voxel count a SIZE chunk may declare before decode refuses it.
pub const MAX_VOLUME_VOXELS: usize = 1 << 30;

/// A dense voxel grid with a 256-entry color palette.
///
/// Voxel values are palette indices; 0 means empty air, 1..=255 index into
/// `palette`. Storage is a flat array addressed as `x + sx * (y + sy * z)`,
/// which is also the order the container format assumes.
#[derive(Clone, Debug)]
pub struct VoxModel {
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub voxels: Vec<u8>,
    pub palette: [Rgba; 256],
    /// True when the palette came from an RGBA chunk rather than the
    /// built-in default table.
    pub palette_from_file: bool,
}

impl VoxModel {
    /// Zero-filled volume of the given dimensions with the default palette.
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self {
            sx,
            sy,
            sz,
            voxels: vec![0; sx * sy * sz],
            palette: palette::DEFAULT_PALETTE,
            palette_from_file: false,
        }
    }

    /// Unallocated 0x0x0 volume; what decode starts from before SIZE.
    pub fn empty() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a `.vox` container. See [`VoxError`] for the failure taxonomy.
    pub fn decode(bytes: &[u8]) -> Result<Self, VoxError> {
        codec::decode(bytes)
    }

    /// Serialize back into the container layout `decode` expects.
    ///
    /// Voxel coordinates are stored as single bytes, so only the first 256
    /// slices along each axis are representable; anything beyond that is a
    /// model the wire format cannot carry.
    pub fn encode(&self) -> Vec<u8> {
        codec::encode(self)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.sx * (y + self.sy * z)
    }

    /// Unchecked read; callers guarantee coordinates are in range.
    #[inline]
    pub fn get_raw(&self, x: usize, y: usize, z: usize) -> u8 {
        self.voxels[self.idx(x, y, z)]
    }

    /// Unchecked write; used by decode and the flip planes.
    #[inline]
    pub fn set_raw(&mut self, x: usize, y: usize, z: usize, v: u8) {
        let i = self.idx(x, y, z);
        self.voxels[i] = v;
    }

    /// Bounds-checked read. Anything outside `[0, size)` reads as empty.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> u8 {
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= self.sx
            || y as usize >= self.sy
            || z as usize >= self.sz
        {
            return 0;
        }
        self.get_raw(x as usize, y as usize, z as usize)
    }

    /// Bounds-checked write; out-of-range coordinates are a no-op.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, v: u8) {
        if x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
        {
            self.set_raw(x as usize, y as usize, z as usize, v);
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.voxels.iter().filter(|&&v| v != 0).count()
    }

    /// True when there is nothing to mesh: zero-sized or all air.
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|&v| v == 0)
    }

    /// Mirror the voxel array in place along any combination of axes.
    ///
    /// Paired slices symmetric about the axis midline swap; the middle slice
    /// of an odd dimension stays put. Applying the same combination twice
    /// restores the original array.
    pub fn flip(&mut self, fx: bool, fy: bool, fz: bool) {
        if fx {
            for z in 0..self.sz {
                for y in 0..self.sy {
                    for x in 0..self.sx / 2 {
                        let a = self.idx(x, y, z);
                        let b = self.idx(self.sx - 1 - x, y, z);
                        self.voxels.swap(a, b);
                    }
                }
            }
        }
        if fy {
            for z in 0..self.sz {
                for y in 0..self.sy / 2 {
                    for x in 0..self.sx {
                        let a = self.idx(x, y, z);
                        let b = self.idx(x, self.sy - 1 - y, z);
                        self.voxels.swap(a, b);
                    }
                }
            }
        }
        if fz {
            for z in 0..self.sz / 2 {
                for y in 0..self.sy {
                    for x in 0..self.sx {
                        let a = self.idx(x, y, z);
                        let b = self.idx(x, y, self.sz - 1 - z);
                        self.voxels.swap(a, b);
                    }
                }
            }
        }
    }

    /// Reallocate to dimensions declared by a SIZE chunk.
    pub(crate) fn alloc_checked(&mut self, sx: i32, sy: i32, sz: i32) -> Result<(), VoxError> {
        if sx <= 0 || sy <= 0 || sz <= 0 {
            return Err(VoxError::CorruptVoxelData {
                reason: format!("SIZE declares non-positive dimensions {sx}x{sy}x{sz}"),
            });
        }
        let total = (sx as usize)
            .checked_mul(sy as usize)
            .and_then(|v| v.checked_mul(sz as usize))
            .filter(|&v| v <= MAX_VOLUME_VOXELS)
            .ok_or(VoxError::OutOfMemory { sx, sy, sz })?;
        self.sx = sx as usize;
        self.sy = sy as usize;
        self.sz = sz as usize;
        self.voxels.clear();
        self.voxels
            .try_reserve_exact(total)
            .map_err(|_| VoxError::OutOfMemory { sx, sy, sz })?;
        self.voxels.resize(total, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_outside_bounds_is_air() {
        let mut m = VoxModel::new(2, 2, 2);
        m.set(0, 0, 0, 7);
        assert_eq!(m.get(0, 0, 0), 7);
        assert_eq!(m.get(-1, 0, 0), 0);
        assert_eq!(m.get(0, 2, 0), 0);
        assert_eq!(m.get(0, 0, 100), 0);
    }

    #[test]
    fn set_outside_bounds_is_noop() {
        let mut m = VoxModel::new(2, 2, 2);
        m.set(5, 0, 0, 9);
        m.set(0, -3, 0, 9);
        assert!(m.is_empty());
    }

    #[test]
    fn flip_moves_single_voxel_across_midline() {
        let mut m = VoxModel::new(4, 3, 2);
        m.set(0, 0, 0, 1);
        m.flip(true, false, false);
        assert_eq!(m.get(0, 0, 0), 0);
        assert_eq!(m.get(3, 0, 0), 1);
        m.flip(false, true, true);
        assert_eq!(m.get(3, 2, 1), 1);
    }

    #[test]
    fn flip_leaves_odd_middle_slice() {
        let mut m = VoxModel::new(3, 1, 1);
        m.set(1, 0, 0, 5);
        m.flip(true, false, false);
        assert_eq!(m.get(1, 0, 0), 5);
    }

    #[test]
    fn alloc_rejects_huge_volume() {
        let mut m = VoxModel::empty();
        let err = m.alloc_checked(100_000, 100_000, 100_000).unwrap_err();
        assert!(matches!(err, VoxError::OutOfMemory { .. }));
    }
}
