//! Benchmarks for the packet scan and targeted decode.
//!
//! Run with: cargo bench
//!
//! File-based benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::{hint::black_box, path::Path};

use criterion::{BatchSize, Criterion, Throughput};
use ffmpeg_next::util::log::Level as LogLevel;
use scenestill::{
    CandidateDetector, DetectionOptions, MediaFile, OutputOptions, PacketSizeTracker, ScenePass,
    TargetedExtractor, VideoPacket,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";
const SYNTHETIC_PACKETS: usize = 100_000;

/// Noisy P-frame sizes with an oversized packet every ~10 seconds at 25 fps.
fn synthetic_packets() -> Vec<VideoPacket> {
    let mut state: u64 = 0x5eed;
    (0..SYNTHETIC_PACKETS)
        .map(|index| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let noise = (state >> 33) as usize % 4_000;
            let size = if index % 250 == 125 { 120_000 } else { 1_000 + noise };
            VideoPacket {
                pts: Some(index as i64),
                dts: Some(index as i64),
                timestamp: index as f64 / 25.0,
                size,
                is_keyframe: index % 250 == 0,
            }
        })
        .collect()
}

fn benchmark_detector(criterion: &mut Criterion) {
    let packets = synthetic_packets();
    let options = DetectionOptions::default();

    let mut group = criterion.benchmark_group("detector");
    group.throughput(Throughput::Elements(packets.len() as u64));

    group.bench_function("tracker + detector, 100k packets", |bencher| {
        bencher.iter(|| {
            let mut tracker = PacketSizeTracker::new(options.rolling_window_size);
            let mut detector = CandidateDetector::new(&options);
            let mut found = 0usize;
            for packet in &packets {
                let baseline = tracker.observe(packet.size);
                if detector.offer(black_box(packet), baseline).is_some() {
                    found += 1;
                }
            }
            black_box(found)
        });
    });

    group.bench_function("tracker only, 100k packets", |bencher| {
        bencher.iter(|| {
            let mut tracker = PacketSizeTracker::new(options.rolling_window_size);
            for packet in &packets {
                black_box(tracker.observe(packet.size));
            }
        });
    });

    group.finish();
}

fn benchmark_sample_video(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let media = MediaFile::new(SAMPLE_VIDEO).unwrap();
    let pass = ScenePass::new(DetectionOptions::default());

    criterion.bench_function("packet scan (sample video)", |bencher| {
        bencher.iter(|| black_box(pass.run(&media).unwrap()));
    });

    let candidates = pass.run(&media).unwrap();
    if candidates.is_empty() {
        return;
    }

    criterion.bench_function("targeted decode (sample video)", |bencher| {
        bencher.iter_batched(
            || tempfile::tempdir().unwrap(),
            |directory| {
                TargetedExtractor::new(OutputOptions::new())
                    .run(&media, candidates.clone(), directory.path())
                    .unwrap()
            },
            BatchSize::PerIteration,
        );
    });
}

criterion::criterion_group!(benches, benchmark_detector, benchmark_sample_video);
criterion::criterion_main!(benches);
