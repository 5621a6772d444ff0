use criterion::{BenchmarkGroup, Criterion, criterion_group, criterion_main, measurement::WallTime};
use rawdng::Raster;
use rawdng::packed::pack_strip;
use rawdng::tags::TiffCommonTag;
use rawdng::{Directory, DngEncoder};
use std::{hint::black_box, time::Duration};

/// A 24 MP frame, the typical sensor size fed into the encoder.
const WIDTH: usize = 6000;
const HEIGHT: usize = 4000;

fn test_frame(bits: u16) -> Raster<u16> {
  let limit = (1_u64 << bits) - 1;
  let data = (0..WIDTH * HEIGHT).map(|i| (i as u64 % (limit + 1)) as u16).collect();
  Raster::new(WIDTH, HEIGHT, data).expect("frame dimensions are fixed")
}

fn bench_pack_strip(group: &mut BenchmarkGroup<'_, WallTime>, bits: u16) {
  let raster = test_frame(bits);
  group.bench_with_input(format!("pack_{}bit", bits), &raster, |b, raster| {
    b.iter(|| pack_strip(black_box(raster), black_box(bits)).expect("packing failed"))
  });
}

fn packing_strips(c: &mut Criterion) {
  let mut group = c.benchmark_group("packing-strips");
  group.sample_size(20).measurement_time(Duration::from_secs(10));

  bench_pack_strip(&mut group, 10);
  bench_pack_strip(&mut group, 12);
  bench_pack_strip(&mut group, 14);

  group.finish();
}

fn encoding_frames(c: &mut Criterion) {
  let mut group = c.benchmark_group("encoding-frames");
  group.sample_size(20).measurement_time(Duration::from_secs(10));

  for bits in [12_u16, 16] {
    let raster = test_frame(bits);
    let mut tags = Directory::new();
    tags.add_tag(TiffCommonTag::ImageWidth, WIDTH as u32);
    tags.add_tag(TiffCommonTag::ImageLength, HEIGHT as u32);
    tags.add_tag(TiffCommonTag::BitsPerSample, bits);
    let mut encoder = DngEncoder::new();
    encoder.set_tags(tags);

    group.bench_with_input(format!("encode_{}bit", bits), &raster, |b, raster| {
      b.iter(|| encoder.convert_to_vec(black_box(raster)).expect("encoding failed"))
    });
  }

  group.finish();
}

criterion_group!(benches, packing_strips, encoding_frames);
criterion_main!(benches);
