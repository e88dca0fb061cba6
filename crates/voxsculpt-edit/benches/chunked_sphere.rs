use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{IVec3, Vec3};

use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, VoxelBuffer};
use voxsculpt_world::{TerrainConfig, TerrainGenerator, VoxelData, VoxelDataConfig};
use voxsculpt_edit::{BufferBackend, Mode, TerrainBackend, VoxelTool};

fn terrain_tool() -> VoxelTool<TerrainBackend> {
    let generator = TerrainGenerator::new(TerrainConfig::flat(0.0));
    let data = VoxelData::new(VoxelDataConfig::default()).with_generator(Arc::new(generator));
    data.pre_generate_box(Box3i::from_center_extents(IVec3::ZERO, IVec3::splat(64)));

    let mut tool = VoxelTool::new(TerrainBackend::new(Arc::new(data)));
    tool.config_mut().set_channel(ChannelId::Sdf);
    tool
}

fn bench_terrain_sphere_r8(c: &mut Criterion) {
    let mut tool = terrain_tool();

    c.bench_function("terrain_sphere_r8", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let mode = if frame % 2 == 0 { Mode::Add } else { Mode::Remove };
            tool.config_mut().set_mode(mode);
            tool.do_sphere(black_box(Vec3::new(3.5, 0.0, -2.5)), black_box(8.0))
        });
    });
}

fn bench_terrain_sphere_r24(c: &mut Criterion) {
    let mut tool = terrain_tool();

    c.bench_function("terrain_sphere_r24", |b| {
        b.iter(|| tool.do_sphere(black_box(Vec3::ZERO), black_box(24.0)));
    });
}

fn bench_buffer_sphere_r24(c: &mut Criterion) {
    let mut tool = VoxelTool::new(BufferBackend::new(VoxelBuffer::new(IVec3::splat(64))));
    tool.config_mut().set_channel(ChannelId::Sdf);

    c.bench_function("buffer_sphere_r24", |b| {
        b.iter(|| tool.do_sphere(black_box(Vec3::splat(32.0)), black_box(24.0)));
    });
}

fn bench_smooth_sphere(c: &mut Criterion) {
    let mut tool = terrain_tool();

    c.bench_function("terrain_smooth_r8_blur2", |b| {
        b.iter(|| tool.smooth_sphere(black_box(Vec3::ZERO), black_box(8.0), 2));
    });
}

criterion_group!(
    benches,
    bench_terrain_sphere_r8,
    bench_terrain_sphere_r24,
    bench_buffer_sphere_r24,
    bench_smooth_sphere,
);
criterion_main!(benches);
