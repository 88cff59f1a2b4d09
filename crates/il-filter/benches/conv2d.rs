use criterion::{Criterion, black_box, criterion_group, criterion_main};
use il_core::{Img, Size};
use il_filter::{Kernel, convolve, median};

fn build_slanted_u8(width: usize, height: usize) -> Img<u8> {
    let theta = 20.0f32.to_radians();
    let nx = theta.cos();
    let ny = theta.sin();
    let t = nx * (0.5 * width as f32) + ny * (0.5 * height as f32);

    let mut data = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let d = nx * x as f32 + ny * y as f32 - t;
            data[y * width + x] = if d >= 0.0 { 255 } else { 0 };
        }
    }

    Img::from_planes(Size::new(width, height), vec![data]).expect("valid image")
}

fn bench_gauss3_u8(c: &mut Criterion) {
    let src = build_slanted_u8(1280, 1024);
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");
    let k = Kernel::gauss3();

    c.bench_function("convolve_gauss3_u8_1280x1024", |b| {
        b.iter(|| {
            convolve(black_box(&src), &mut dst, black_box(&k)).expect("convolve");
            black_box(dst.channel(0).read()[0]);
        });
    });
}

fn bench_gauss3_f32(c: &mut Criterion) {
    let src = build_slanted_u8(1280, 1024).convert::<f32>();
    let mut dst = Img::<f32>::with_channels(Size::new(1, 1), 1).expect("valid image");
    let k = Kernel::gauss3();

    c.bench_function("convolve_gauss3_f32_1280x1024", |b| {
        b.iter(|| {
            convolve(black_box(&src), &mut dst, black_box(&k)).expect("convolve");
            black_box(dst.channel(0).read()[0]);
        });
    });
}

fn bench_median3_u8(c: &mut Criterion) {
    let src = build_slanted_u8(640, 512);
    let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");

    c.bench_function("median3_u8_640x512", |b| {
        b.iter(|| {
            median(black_box(&src), &mut dst, Size::new(3, 3)).expect("median");
            black_box(dst.channel(0).read()[0]);
        });
    });
}

criterion_group!(benches, bench_gauss3_u8, bench_gauss3_f32, bench_median3_u8);
criterion_main!(benches);
