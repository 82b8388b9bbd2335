//! Field-by-field container parsing. The format is little-endian and
//! chunk-structured; every declared length is validated against the buffer
//! before it is trusted, so a hostile file can at worst produce a clean
//! [`VoxError`].

use crate::VoxModel;
use crate::error::VoxError;
use crate::palette::Rgba;

const MAGIC: [u8; 4] = *b"VOX ";
const VERSION: i32 = 150;

const TAG_MAIN: [u8; 4] = *b"MAIN";
const TAG_SIZE: [u8; 4] = *b"SIZE";
const TAG_XYZI: [u8; 4] = *b"XYZI";
const TAG_RGBA: [u8; 4] = *b"RGBA";

/// Metadata chunks the format defines but this converter deliberately
/// ignores: multi-model packing, materials, scene graph, layers.
const IGNORED_TAGS: [[u8; 4]; 9] = [
    *b"PACK", *b"MATT", *b"MATL", *b"DICT", *b"nTRN", *b"nGRP", *b"nSHP", *b"LAYR", *b"rOBJ",
];

/// Bounds-checked little-endian reader over the input buffer.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8], VoxError> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => {
                let s = &self.data[self.pos..end];
                self.pos = end;
                Ok(s)
            }
            None => Err(VoxError::TruncatedStream {
                offset: self.pos,
                needed: n,
                len: self.data.len(),
            }),
        }
    }

    #[inline]
    fn read_tag(&mut self) -> Result<[u8; 4], VoxError> {
        let s = self.take(4)?;
        Ok([s[0], s[1], s[2], s[3]])
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, VoxError> {
        Ok(u32::from_le_bytes(self.read_tag()?))
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, VoxError> {
        Ok(i32::from_le_bytes(self.read_tag()?))
    }

    /// Jump to an absolute offset (used to land on a chunk's end).
    fn seek(&mut self, to: usize) -> Result<(), VoxError> {
        if to > self.data.len() {
            return Err(VoxError::TruncatedStream {
                offset: self.pos,
                needed: to - self.data.len(),
                len: self.data.len(),
            });
        }
        self.pos = to;
        Ok(())
    }
}

/// Chunk header: tag, own content length, and `end`, the absolute offset
/// just past the chunk and all its nested children. Purely a parsing cursor
/// construct; nothing of it survives decode.
struct Chunk {
    tag: [u8; 4],
    content_len: u32,
    end: usize,
}

impl Chunk {
    fn read(cur: &mut Cursor<'_>) -> Result<Self, VoxError> {
        let tag = cur.read_tag()?;
        let content_len = cur.read_u32()?;
        let children_len = cur.read_u32()?;
        let end = cur
            .pos
            .checked_add(content_len as usize)
            .and_then(|v| v.checked_add(children_len as usize))
            .ok_or_else(|| VoxError::CorruptVoxelData {
                reason: format!(
                    "chunk {} declares lengths overflowing the address space",
                    printable(tag)
                ),
            })?;
        Ok(Self {
            tag,
            content_len,
            end,
        })
    }
}

fn printable(tag: [u8; 4]) -> String {
    String::from_utf8_lossy(&tag).into_owned()
}

pub(crate) fn decode(bytes: &[u8]) -> Result<VoxModel, VoxError> {
    let mut cur = Cursor::new(bytes);

    let magic = cur.read_tag()?;
    if magic != MAGIC {
        return Err(VoxError::InvalidMagic { found: magic });
    }

    let version = cur.read_i32()?;
    if version != VERSION {
        return Err(VoxError::UnsupportedVersion { found: version });
    }

    let main = Chunk::read(&mut cur).map_err(|_| VoxError::MissingRootChunk)?;
    if main.tag != TAG_MAIN {
        return Err(VoxError::MissingRootChunk);
    }
    // The root carries no content of its own worth reading.
    if main.content_len > 0 {
        cur.seek(cur.pos + main.content_len as usize)?;
    }

    let mut model = VoxModel::empty();
    while cur.pos < main.end {
        let chunk = Chunk::read(&mut cur)?;
        match chunk.tag {
            TAG_SIZE => {
                let sx = cur.read_i32()?;
                let sy = cur.read_i32()?;
                let sz = cur.read_i32()?;
                model.alloc_checked(sx, sy, sz)?;
            }
            TAG_XYZI => {
                read_xyzi(&mut cur, &mut model)?;
            }
            TAG_RGBA => {
                // 255 entries for palette slots 1..=255; slot 0 is reserved
                // and has no bytes of its own. Any trailing payload is
                // consumed by the end-of-chunk seek below.
                for slot in 1..=255usize {
                    let c = cur.take(4)?;
                    model.palette[slot] = Rgba::new(c[0], c[1], c[2], c[3]);
                }
                model.palette_from_file = true;
            }
            tag if IGNORED_TAGS.contains(&tag) => {}
            tag => {
                log::warn!(
                    "unknown chunk {:?} at 0x{:x}, skipping",
                    printable(tag),
                    cur.pos
                );
            }
        }
        if chunk.end >= main.end {
            break;
        }
        cur.seek(chunk.end)?;
    }

    Ok(model)
}

fn read_xyzi(cur: &mut Cursor<'_>, model: &mut VoxModel) -> Result<(), VoxError> {
    let count = cur.read_i32()?;
    if count <= 0 {
        return Err(VoxError::CorruptVoxelData {
            reason: format!("XYZI declares {count} voxels"),
        });
    }
    if model.voxels.is_empty() {
        return Err(VoxError::CorruptVoxelData {
            reason: "XYZI chunk appears before any SIZE chunk".to_string(),
        });
    }
    let mut dropped = 0usize;
    for _ in 0..count {
        let t = cur.take(4)?;
        let (x, y, z) = (t[0] as usize, t[1] as usize, t[2] as usize);
        if x < model.sx && y < model.sy && z < model.sz {
            model.set_raw(x, y, z, t[3]);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        log::warn!("dropped {dropped} voxels outside the declared dimensions");
    }
    Ok(())
}

pub(crate) fn encode(model: &VoxModel) -> Vec<u8> {
    let occupied = model.occupied_count();
    let xyzi_content = 4 + 4 * occupied;
    // SIZE + XYZI + RGBA, each with a 12-byte header.
    let children_len = (12 + 12) + (12 + xyzi_content) + (12 + 1024);

    let mut out = Vec::with_capacity(8 + 12 + children_len);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());

    push_chunk_header(&mut out, TAG_MAIN, 0, children_len as u32);

    push_chunk_header(&mut out, TAG_SIZE, 12, 0);
    out.extend_from_slice(&(model.sx as i32).to_le_bytes());
    out.extend_from_slice(&(model.sy as i32).to_le_bytes());
    out.extend_from_slice(&(model.sz as i32).to_le_bytes());

    push_chunk_header(&mut out, TAG_XYZI, xyzi_content as u32, 0);
    out.extend_from_slice(&(occupied as i32).to_le_bytes());
    for z in 0..model.sz {
        for y in 0..model.sy {
            for x in 0..model.sx {
                let v = model.get_raw(x, y, z);
                if v > 0 {
                    out.extend_from_slice(&[x as u8, y as u8, z as u8, v]);
                }
            }
        }
    }

    // Slots 1..=255 first, then the reserved slot 0 as the trailing unused
    // entry, mirroring what decode reads back.
    push_chunk_header(&mut out, TAG_RGBA, 1024, 0);
    for slot in (1..=255usize).chain([0]) {
        let c = model.palette[slot];
        out.extend_from_slice(&[c.r, c.g, c.b, c.a]);
    }

    out
}

fn push_chunk_header(out: &mut Vec<u8>, tag: [u8; 4], content_len: u32, children_len: u32) {
    out.extend_from_slice(&tag);
    out.extend_from_slice(&content_len.to_le_bytes());
    out.extend_from_slice(&children_len.to_le_bytes());
}
