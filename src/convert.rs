//! Single-file conversion pipeline: VOX bytes in, OBJ (and optionally MTL)
//! out.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use thiserror::Error;
use voxmc_geom::Vec3;
use voxmc_mesh::{ExtractParams, MeshError, VertexPlacement, extract};
use voxmc_obj::{ObjError, ObjOptions, save_mtl, save_obj};
use voxmc_vox::{VoxError, VoxModel};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot decode {path}: {source}")]
    Decode { path: PathBuf, source: VoxError },
    #[error("cannot mesh {path}: {source}")]
    Mesh { path: PathBuf, source: MeshError },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: ObjError },
}

#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub scale: f32,
    pub upscale: f32,
    pub offset: Vec3,
    pub flip: [bool; 3],
    pub placement: VertexPlacement,
    /// Object name for the OBJ `o` line; the input file stem when absent.
    pub object_name: Option<String>,
    /// Texture image path; presence turns on MTL side-file generation.
    pub texture: Option<String>,
}

/// Converts one VOX file to one OBJ file, printing the original tool's
/// `[LFVS]` stage letters as each phase completes.
pub fn convert_file(
    input: &Path,
    output: &Path,
    opts: &ConvertOptions,
) -> Result<(), ConvertError> {
    stage('[');

    let bytes = fs::read(input).map_err(|source| ConvertError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let mut model = VoxModel::decode(&bytes).map_err(|source| ConvertError::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    stage('L');

    let [fx, fy, fz] = opts.flip;
    if fx || fy || fz {
        model.flip(fx, fy, fz);
        stage('F');
    }

    let params = ExtractParams {
        scale: opts.scale,
        upscale: opts.upscale,
        offset: opts.offset,
        placement: opts.placement,
        name: opts.object_name.clone().or_else(|| file_stem(input)),
    };
    let mesh = extract(&model, &params).map_err(|source| ConvertError::Mesh {
        path: input.to_path_buf(),
        source,
    })?;
    stage('V');

    // The mtllib line names `<material>.mtl`, so the material takes the
    // output file's stem and the side file lands next to the OBJ.
    let material = opts.texture.as_ref().and_then(|_| file_stem(output));
    let obj_opts = ObjOptions {
        object_name: None,
        material: material.clone(),
    };
    save_obj(&mesh, &obj_opts, output).map_err(|source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    if let (Some(texture), Some(material)) = (&opts.texture, &material) {
        let mtl_path = output.with_extension("mtl");
        save_mtl(material, texture, &mtl_path).map_err(|source| ConvertError::Write {
            path: mtl_path,
            source,
        })?;
    }
    stage('S');
    stage(']');

    log::debug!(
        "{}: {} voxels -> {} vertices, {} triangles",
        input.display(),
        model.occupied_count(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

fn stage(c: char) {
    print!("{c}");
    let _ = io::stdout().flush();
}
