//! `voxmc`: converts MagicaVoxel VOX models into Marching Cubes OBJ meshes,
//! one file at a time or over a whole directory tree.
#![forbid(unsafe_code)]

mod batch;
mod convert;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use voxmc_geom::Vec3;
use voxmc_mesh::VertexPlacement;

use crate::convert::{ConvertOptions, convert_file};

#[derive(Parser, Debug)]
#[command(
    name = "voxmc",
    version,
    about = "Converts MagicaVoxel VOX models into Marching Cubes OBJ meshes"
)]
struct Cli {
    /// Input VOX file
    #[arg(short = 'i', long = "in", value_name = "INPUT_VOX")]
    input: Option<PathBuf>,

    /// Output OBJ file (overwrites an existing file)
    #[arg(short = 'o', long = "out", value_name = "OUTPUT_OBJ")]
    output: Option<PathBuf>,

    /// Input directory scanned recursively for VOX files (use with --output-dir)
    #[arg(long, value_name = "INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Output directory mirroring the input tree (use with --input-dir)
    #[arg(long, value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Scale of the output mesh
    #[arg(short = 's', long, default_value_t = 0.03125)]
    scale: f32,

    /// Upscaling factor of the conversion
    #[arg(short = 'u', long, default_value_t = 3.0)]
    upscale: f32,

    /// Mirror the model along the X axis
    #[arg(long)]
    flip_x: bool,

    /// Mirror the model along the Y axis
    #[arg(long)]
    flip_y: bool,

    /// Mirror the model along the Z axis
    #[arg(long)]
    flip_z: bool,

    /// World-space X translation added to every vertex
    #[arg(long, default_value_t = 0.0)]
    offset_x: f32,

    /// World-space Y translation added to every vertex
    #[arg(long, default_value_t = 0.0)]
    offset_y: f32,

    /// World-space Z translation added to every vertex
    #[arg(long, default_value_t = 0.0)]
    offset_z: f32,

    /// Object name written into the OBJ (defaults to the input file stem)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Texture image to reference from a generated MTL side file
    #[arg(long, value_name = "IMAGE")]
    texture: Option<String>,

    /// Snap vertices to voxel corners instead of edge midpoints
    #[arg(long)]
    blocky: bool,

    /// Show conversion timing
    #[arg(short = 't', long)]
    time: bool,
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            scale: self.scale,
            upscale: self.upscale,
            offset: Vec3::new(self.offset_x, self.offset_y, self.offset_z),
            flip: [self.flip_x, self.flip_y, self.flip_z],
            placement: if self.blocky {
                VertexPlacement::CornerSnap
            } else {
                VertexPlacement::EdgeMidpoint
            },
            object_name: self.name.clone(),
            texture: self.texture.clone(),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let opts = cli.convert_options();
    let overall = Instant::now();

    let code = match (&cli.input_dir, &cli.output_dir) {
        (Some(input_dir), Some(output_dir)) => {
            if !input_dir.is_dir() {
                log::error!("input directory {} is not a directory", input_dir.display());
                return ExitCode::FAILURE;
            }
            match batch::run_batch(input_dir, output_dir, &opts, cli.time) {
                Ok(0) => ExitCode::SUCCESS,
                Ok(failures) => {
                    log::error!("{failures} files failed to convert");
                    ExitCode::FAILURE
                }
                Err(err) => {
                    log::error!("batch aborted: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        (None, None) => match (&cli.input, &cli.output) {
            (Some(input), Some(output)) => {
                print!("[*] {} ", input.display());
                match convert_file(input, output, &opts) {
                    Ok(()) => {
                        println!();
                        ExitCode::SUCCESS
                    }
                    Err(err) => {
                        println!();
                        log::error!("{err}");
                        ExitCode::FAILURE
                    }
                }
            }
            _ => {
                log::error!("either --in/--out or --input-dir/--output-dir is required");
                ExitCode::FAILURE
            }
        },
        _ => {
            log::error!("--input-dir and --output-dir must be used together");
            ExitCode::FAILURE
        }
    };

    if cli.time {
        println!("Done in: {:.3}s", overall.elapsed().as_secs_f64());
    }
    code
}
