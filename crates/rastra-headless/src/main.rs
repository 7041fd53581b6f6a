//! Headless host loop: renders a spinning textured cube offscreen and writes
//! the last frame's color image to a PNG.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::{Quat, Vec3};
use log::LevelFilter;

use rastra_engine::backend::WgpuBackend;
use rastra_engine::color::Color;
use rastra_engine::device::{Gpu, GpuInit};
use rastra_engine::dispatch::RasterizeSizing;
use rastra_engine::logging::{LoggingConfig, init_logging};
use rastra_engine::object::{MeshData, RenderObject};
use rastra_engine::transform::{Camera, DirectionalLight, Placement};
use rastra_engine::{Rasterizer, RasterizerInit, RasterizerSettings};

#[derive(Parser, Debug)]
#[command(about = "Render a cube with the compute rasterizer and save it as PNG")]
struct Args {
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Number of frames to run; the cube turns a little every frame
    #[arg(long, default_value_t = 1)]
    frames: u32,
    /// Where to write the final color image
    #[arg(long, short, default_value = "rastra.png")]
    output: PathBuf,
    /// Request a software adapter
    #[arg(long)]
    fallback_adapter: bool,
    /// Size rasterize dispatches from the running frame triangle count
    #[arg(long)]
    cumulative: bool,
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        default_level: if args.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        ..LoggingConfig::default()
    });

    if args.width == 0 || args.height == 0 {
        bail!("cannot write a {}x{} image", args.width, args.height);
    }

    let gpu = Gpu::new_blocking(GpuInit {
        force_fallback_adapter: args.fallback_adapter,
        ..GpuInit::default()
    })?;
    let info = gpu.adapter_info();
    log::info!("adapter: {} ({:?})", info.name, info.backend);

    let settings = RasterizerSettings {
        clear_color: Color::from_u8(24, 26, 32, 255),
        ambient_color: Color::rgb(0.15, 0.15, 0.18),
    };
    let init = RasterizerInit {
        rasterize_sizing: if args.cumulative { RasterizeSizing::Cumulative } else { RasterizeSizing::PerObject },
        ..RasterizerInit::default()
    };
    let mut rasterizer = Rasterizer::new(WgpuBackend::new(&gpu), args.width, args.height, settings, init)
        .context("failed to build rasterizer")?;

    rasterizer.set_frame_listener(|vertices, triangles| {
        log::info!("frame: {vertices} vertices, {triangles} triangles");
    });

    let checker = checker_texels(8, Color::WHITE, Color::rgb(0.9, 0.35, 0.1));
    let diffuse = rasterizer
        .backend()
        .upload_texture("checker", 8, 8, &checker)
        .context("failed to upload diffuse texture")?;
    let cube = rasterizer.backend().upload_mesh("cube", &cube_mesh(), diffuse);

    let camera = Camera::new(Placement::from_position(Vec3::new(0.0, 1.5, -4.0)).with_rotation(
        Quat::from_rotation_x(20f32.to_radians()),
    ));
    let light = DirectionalLight {
        forward: Vec3::new(-0.4, -1.0, 0.6).normalize(),
        color: Color::rgb(1.0, 0.95, 0.85),
    };

    for frame in 0..args.frames.max(1) {
        let angle = frame as f32 * 3f32.to_radians();
        let placement = Placement::default()
            .with_rotation(Quat::from_rotation_y(0.6 + angle) * Quat::from_rotation_x(0.3));

        rasterizer.clear()?;
        rasterizer.set_attributes(&camera, &light)?;
        rasterizer.draw_call(&RenderObject::new(placement, &cube))?;
        rasterizer.update_frame()?;
    }

    let pixels = rasterizer
        .backend()
        .read_image(rasterizer.color_image())
        .context("failed to read back color image")?;
    let image = image::RgbaImage::from_raw(args.width, args.height, pixels)
        .context("color readback has the wrong size")?;
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("wrote {}", args.output.display());
    rasterizer.release()?;
    Ok(())
}

/// Unit cube centered on the origin, one quad of four vertices per face.
fn cube_mesh() -> MeshData {
    // (normal, u axis, v axis)
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];
    const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut mesh = MeshData::default();
    for (normal, u, v) in FACES {
        let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
        let base = mesh.vertex_count();
        for [s, t] in CORNERS {
            let p = n * 0.5 + u * (s - 0.5) + v * (t - 0.5);
            mesh.positions.push(p.to_array());
            mesh.normals.push(normal);
            mesh.uvs.push([s, t]);
        }
        mesh.indices.push([base, base + 1, base + 2]);
        mesh.indices.push([base, base + 2, base + 3]);
    }
    mesh
}

fn checker_texels(size: u32, a: Color, b: Color) -> Vec<u8> {
    let to_u8 = |c: Color| c.to_array().map(|x| (x.clamp(0.0, 1.0) * 255.0).round() as u8);
    let (a, b) = (to_u8(a), to_u8(b));

    (0..size * size)
        .flat_map(|i| if ((i % size) + (i / size)) % 2 == 0 { a } else { b })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_is_closed_and_consistent() {
        let mesh = cube_mesh();
        assert!(mesh.is_consistent());
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.positions.iter().all(|p| p.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn checker_alternates() {
        let texels = checker_texels(2, Color::WHITE, Color::BLACK);
        assert_eq!(texels, vec![255, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn args_parse_defaults() {
        let args = Args::parse_from(["rastra-headless"]);
        assert_eq!((args.width, args.height, args.frames), (640, 480, 1));
        assert!(!args.cumulative);
    }
}
