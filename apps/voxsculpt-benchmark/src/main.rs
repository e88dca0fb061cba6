//! Voxsculpt edit benchmark.
//!
//! Generates a noise terrain, then times a scripted sequence of edits on it.
//! Set `RUST_LOG=debug` to see block generation, `trace` for per-edit spans.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use glam::{Affine3A, IVec3, Quat, Vec3};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxsculpt_core::{Aabb, Box3i};
use voxsculpt_voxel::{ChannelId, VoxelBuffer};
use voxsculpt_world::{TerrainConfig, TerrainGenerator, VoxelData, VoxelDataConfig};
use voxsculpt_edit::{MeshSdf, Mode, TerrainBackend, VoxelTool};

const WORLD_EXTENT: i32 = 96;
const EDIT_COUNT: usize = 64;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Voxsculpt edit benchmark");

    let generator = TerrainGenerator::new(TerrainConfig {
        seed: 7,
        base_height: 0.0,
        terrain_height: 24.0,
        ..Default::default()
    });
    let data = Arc::new(
        VoxelData::new(VoxelDataConfig::default()).with_generator(Arc::new(generator)),
    );

    let start = Instant::now();
    let area = Box3i::from_center_extents(IVec3::ZERO, IVec3::splat(WORLD_EXTENT));
    let created = data.pre_generate_box(area);
    info!(
        blocks = created,
        memory_kib = data.memory_usage() / 1024,
        "Generated terrain in {:.1?}",
        start.elapsed()
    );

    let mut tool = VoxelTool::new(TerrainBackend::new(Arc::clone(&data)));
    tool.config_mut().set_channel(ChannelId::Sdf);

    report("spheres", EDIT_COUNT, || {
        for i in 0..EDIT_COUNT {
            let mode = if i % 3 == 0 { Mode::Remove } else { Mode::Add };
            tool.config_mut().set_mode(mode);
            tool.do_sphere(orbit(i, 40.0), 6.0)?;
        }
        Ok(())
    })?;

    tool.config_mut().set_mode(Mode::Remove);
    report("paths", EDIT_COUNT / 8, || {
        for i in 0..EDIT_COUNT / 8 {
            let positions = [orbit(i, 20.0), orbit(i + 16, 30.0), orbit(i + 32, 20.0)];
            tool.do_path(&positions, &[3.0, 5.0, 3.0])?;
        }
        Ok(())
    })?;

    report("smooth", EDIT_COUNT / 4, || {
        for i in 0..EDIT_COUNT / 4 {
            tool.smooth_sphere(orbit(i * 4, 40.0), 8.0, 2)?;
        }
        Ok(())
    })?;

    tool.config_mut().set_mode(Mode::Add);
    report("grow", EDIT_COUNT / 4, || {
        for i in 0..EDIT_COUNT / 4 {
            tool.grow_sphere(orbit(i * 4, 30.0), 6.0, 0.5)?;
        }
        Ok(())
    })?;

    let mesh = MeshSdf::bake_from_fn(
        IVec3::splat(24),
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
        |p| p.length() - 0.75,
    );
    report("mesh stamps", EDIT_COUNT / 8, || {
        for i in 0..EDIT_COUNT / 8 {
            let transform = Affine3A::from_scale_rotation_translation(
                Vec3::splat(10.0),
                Quat::from_rotation_y(i as f32),
                orbit(i * 8, 50.0),
            );
            tool.do_mesh_chunked(&mesh, &data, &transform, 0.0, false)?;
        }
        Ok(())
    })?;

    let mut snapshot = VoxelBuffer::new(IVec3::splat(32));
    let start = Instant::now();
    tool.copy(IVec3::splat(-16), &mut snapshot, ChannelId::Sdf.mask())
        .context("copying snapshot")?;
    tool.paste(IVec3::new(16, -16, 16), &snapshot, ChannelId::Sdf.mask())
        .context("pasting snapshot")?;
    info!("Copy and paste of 32^3 voxels in {:.1?}", start.elapsed());

    info!(
        dirty_blocks = data.dirty_blocks(0).len(),
        memory_kib = data.memory_usage() / 1024,
        "Done"
    );
    Ok(())
}

/// Point on a circle around the origin, a bit above the ground.
fn orbit(i: usize, radius: f32) -> Vec3 {
    let angle = i as f32 * std::f32::consts::TAU / EDIT_COUNT as f32;
    Vec3::new(angle.cos() * radius, 4.0, angle.sin() * radius)
}

fn report<F>(name: &str, count: usize, run: F) -> anyhow::Result<()>
where
    F: FnOnce() -> voxsculpt_edit::Result<()>,
{
    let start = Instant::now();
    run().with_context(|| format!("{name} benchmark"))?;
    let elapsed = start.elapsed();
    let per_edit = elapsed.checked_div(count as u32).unwrap_or(Duration::ZERO);
    info!("{name}: {count} edits in {elapsed:.1?} ({per_edit:.1?} per edit)");
    Ok(())
}
