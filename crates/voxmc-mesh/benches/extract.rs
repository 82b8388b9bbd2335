use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use voxmc_mesh::{ExtractParams, extract};
use voxmc_vox::VoxModel;

fn sphere_model(n: usize) -> VoxModel {
    let mut m = VoxModel::new(n, n, n);
    let c = (n as f32 - 1.0) * 0.5;
    let r = n as f32 * 0.5 - 1.0;
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let dx = x as f32 - c;
                let dy = y as f32 - c;
                let dz = z as f32 - c;
                if (dx * dx + dy * dy + dz * dz).sqrt() <= r {
                    m.set_raw(x, y, z, 1);
                }
            }
        }
    }
    m
}

fn bench_extract(c: &mut Criterion) {
    let model = sphere_model(24);

    c.bench_function("extract sphere24 upscale1", |b| {
        let params = ExtractParams {
            upscale: 1.0,
            ..ExtractParams::default()
        };
        b.iter(|| extract(black_box(&model), &params).unwrap())
    });

    c.bench_function("extract sphere24 upscale3", |b| {
        let params = ExtractParams {
            upscale: 3.0,
            ..ExtractParams::default()
        };
        b.iter(|| extract(black_box(&model), &params).unwrap())
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
