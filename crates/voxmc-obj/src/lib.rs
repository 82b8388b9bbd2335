//! Wavefront OBJ export for extracted meshes, plus the MTL side-file that
//! binds a diffuse texture to the exported object.
//!
//! Output is flat-shaded: one `vn` line per triangle, and every face
//! references its own normal (`f a//n b//n c//n`, 1-based).
#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use voxmc_mesh::Mesh;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("obj write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Knobs for a single OBJ export.
#[derive(Clone, Debug, Default)]
pub struct ObjOptions {
    /// Emitted as an `o` line. Falls back to the mesh's own name.
    pub object_name: Option<String>,
    /// Material name. When set, the file references `<material>.mtl` and
    /// tags all faces with `usemtl <material>`.
    pub material: Option<String>,
}

/// Writes `mesh` as OBJ text to `w`. Any stream failure aborts the write;
/// a partially written stream is not a usable artifact.
pub fn write_obj<W: Write>(mesh: &Mesh, opts: &ObjOptions, w: &mut W) -> Result<(), ObjError> {
    if let Some(material) = &opts.material {
        writeln!(w, "mtllib {material}.mtl")?;
    }
    if let Some(name) = opts.object_name.as_ref().or(mesh.name.as_ref()) {
        writeln!(w, "o {name}")?;
    }
    for p in &mesh.positions {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }
    // Flat shading: the three vertices of a triangle carry the same normal,
    // so one vn per triangle is enough.
    for tri in &mesh.triangles {
        let n = mesh.normals[tri[0] as usize];
        writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    if let Some(material) = &opts.material {
        writeln!(w, "usemtl {material}")?;
    }
    for (i, tri) in mesh.triangles.iter().enumerate() {
        let n = i + 1;
        writeln!(
            w,
            "f {}//{n} {}//{n} {}//{n}",
            tri[0] + 1,
            tri[1] + 1,
            tri[2] + 1
        )?;
    }
    Ok(())
}

/// Writes `mesh` to `path`, buffered.
pub fn save_obj<P: AsRef<Path>>(mesh: &Mesh, opts: &ObjOptions, path: P) -> Result<(), ObjError> {
    let mut w = BufWriter::new(File::create(path)?);
    write_obj(mesh, opts, &mut w)?;
    w.flush()?;
    Ok(())
}

/// Writes an MTL definition for `material` pointing its diffuse map at
/// `texture`.
pub fn write_mtl<W: Write>(material: &str, texture: &str, w: &mut W) -> Result<(), ObjError> {
    writeln!(w, "newmtl {material}")?;
    writeln!(w, "Ka 1.0 1.0 1.0")?;
    writeln!(w, "Kd 1.0 1.0 1.0")?;
    writeln!(w, "Ks 0.0 0.0 0.0")?;
    writeln!(w, "d 1.0")?;
    writeln!(w, "illum 2")?;
    writeln!(w, "map_Kd {texture}")?;
    Ok(())
}

pub fn save_mtl<P: AsRef<Path>>(material: &str, texture: &str, path: P) -> Result<(), ObjError> {
    let mut w = BufWriter::new(File::create(path)?);
    write_mtl(material, texture, &mut w)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmc_geom::Vec3;

    fn tri_mesh() -> Mesh {
        Mesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            normals: vec![Vec3::new(0.0, 0.0, 1.0); 3],
            triangles: vec![[0, 1, 2]],
            name: Some("tri".to_string()),
        }
    }

    fn render(mesh: &Mesh, opts: &ObjOptions) -> String {
        let mut buf = Vec::new();
        write_obj(mesh, opts, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn single_triangle_layout() {
        let text = render(&tri_mesh(), &ObjOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "o tri",
                "v 0 0 0",
                "v 1 0 0",
                "v 0 1 0",
                "vn 0 0 1",
                "f 1//1 2//1 3//1",
            ]
        );
    }

    #[test]
    fn object_name_overrides_mesh_name() {
        let opts = ObjOptions {
            object_name: Some("custom".to_string()),
            material: None,
        };
        let text = render(&tri_mesh(), &opts);
        assert!(text.contains("o custom\n"));
        assert!(!text.contains("o tri"));
    }

    #[test]
    fn material_adds_mtllib_and_usemtl() {
        let opts = ObjOptions {
            object_name: None,
            material: Some("skin".to_string()),
        };
        let text = render(&tri_mesh(), &opts);
        assert!(text.starts_with("mtllib skin.mtl\n"));
        let usemtl = text.find("usemtl skin\n").unwrap();
        let face = text.find("f 1//1").unwrap();
        assert!(usemtl < face);
    }

    #[test]
    fn one_normal_per_triangle() {
        let mut mesh = tri_mesh();
        mesh.positions.extend([
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ]);
        mesh.normals.extend([Vec3::new(0.0, 0.0, -1.0); 3]);
        mesh.triangles.push([3, 4, 5]);
        let text = render(&mesh, &ObjOptions::default());
        assert_eq!(text.matches("\nvn ").count(), 2);
        assert!(text.contains("f 4//2 5//2 6//2\n"));
    }

    #[test]
    fn empty_mesh_writes_header_only() {
        let mesh = Mesh::default();
        let text = render(&mesh, &ObjOptions::default());
        assert_eq!(text, "");
    }

    #[test]
    fn mtl_references_texture() {
        let mut buf = Vec::new();
        write_mtl("skin", "textures/skin.png", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("newmtl skin\n"));
        assert!(text.contains("map_Kd textures/skin.png\n"));
        assert!(text.contains("illum 2\n"));
    }
}
