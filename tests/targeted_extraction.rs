//! Targeted decode tests over an in-memory source.

mod common;

use std::collections::HashSet;

use common::{DecodeBehavior, FakePacket, FakeSource, packet};
use scenestill::{Candidate, FrameTypeEstimate, ImageFormat, OutputOptions, TargetedExtractor};

fn candidate(pts: i64, timestamp: f64) -> Candidate {
    Candidate {
        pts: Some(pts),
        timestamp,
        size: 100_000,
        baseline: 1_000.0,
        ratio: 100.0,
        frame_type: FrameTypeEstimate::Intra,
    }
}

/// 100 packets, 0.1 s apart.
fn source() -> FakeSource {
    FakeSource::from_sizes(&[1_000; 100], 0.1)
}

#[test]
fn empty_candidate_list_never_opens_the_source() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, Vec::new(), dir.path())
        .expect("extract");

    assert!(report.images.is_empty());
    assert_eq!(source.stats().opens, 0);
    assert_eq!(source.stats().decodes, 0);
}

#[test]
fn one_still_per_candidate() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");
    let candidates = vec![candidate(10, 1.0), candidate(42, 4.2), candidate(77, 7.7)];

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, candidates, dir.path())
        .expect("extract");

    let names: Vec<String> = report
        .images
        .iter()
        .map(|saved| saved.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["scene_1.00s.jpg", "scene_4.20s.jpg", "scene_7.70s.jpg"]);
    for saved in &report.images {
        assert!(saved.path.exists());
        assert_eq!((saved.width, saved.height), (8, 6));
        assert_eq!(saved.frame_type, FrameTypeEstimate::Intra);
    }
    assert_eq!(source.stats().decodes, 3);
}

#[test]
fn reading_stops_after_the_last_candidate() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, vec![candidate(5, 0.5), candidate(12, 1.2)], dir.path())
        .expect("extract");

    assert_eq!(report.images.len(), 2);
    assert_eq!(report.packets_read, 13);
    assert_eq!(source.stats().packets_read, 13);
    assert_eq!(source.stats().decodes, 2);
}

#[test]
fn missing_candidate_is_reported_as_unmatched() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, vec![candidate(20, 2.0), candidate(500, 50.0)], dir.path())
        .expect("extract");

    assert_eq!(report.images.len(), 1);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.packets_read, 100);
}

#[test]
fn failed_decodes_are_skipped() {
    let mut source = source();
    source.set_decode(20, DecodeBehavior::Fail);
    source.set_decode(30, DecodeBehavior::NoFrame);
    let dir = tempfile::tempdir().expect("tempdir");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(
            &source,
            vec![candidate(20, 2.0), candidate(30, 3.0), candidate(40, 4.0)],
            dir.path(),
        )
        .expect("extract");

    assert_eq!(report.decode_failures, 2);
    assert_eq!(report.images.len(), 1);
    assert_eq!(report.images[0].timestamp, 4.0);
}

#[test]
fn write_failures_do_not_abort_the_batch() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, vec![candidate(10, 1.0), candidate(50, 5.0)], &missing)
        .expect("extract");

    assert!(report.images.is_empty());
    assert_eq!(report.write_failures, 2);
    assert_eq!(source.stats().decodes, 2);
}

#[test]
fn colliding_file_names_keep_the_later_still() {
    let packets = (0..10)
        .map(|index| FakePacket {
            packet: packet(index, 1.0 + index as f64 * 0.001, 1_000, false),
            decode: DecodeBehavior::Frame,
        })
        .collect();
    let source = FakeSource::new(packets);
    let dir = tempfile::tempdir().expect("tempdir");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, vec![candidate(1, 1.001), candidate(4, 1.004)], dir.path())
        .expect("extract");

    assert_eq!(report.images.len(), 1);
    assert_eq!(report.images[0].timestamp, 1.004);
    assert!(dir.path().join("scene_1.00s.jpg").exists());
}

#[test]
fn duplicate_candidates_decode_once() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");

    let report = TargetedExtractor::new(OutputOptions::new())
        .run(&source, vec![candidate(10, 1.0), candidate(10, 1.0)], dir.path())
        .expect("extract");

    assert_eq!(report.images.len(), 1);
    assert_eq!(source.stats().decodes, 1);
}

#[test]
fn every_still_maps_back_to_a_candidate() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");
    let candidates: Vec<Candidate> = (1..9).map(|i| candidate(i * 11, i as f64 * 1.1)).collect();
    let output = OutputOptions::new();

    let report = TargetedExtractor::new(output.clone())
        .run(&source, candidates.clone(), dir.path())
        .expect("extract");

    let known: HashSet<u64> = candidates.iter().map(|c| c.timestamp.to_bits()).collect();
    assert_eq!(report.images.len(), candidates.len());
    for saved in &report.images {
        assert!(known.contains(&saved.timestamp.to_bits()));
        assert_eq!(saved.path, dir.path().join(output.file_name(saved.timestamp)));
    }
}

#[test]
fn png_output_and_custom_prefix() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");
    let output = OutputOptions::new()
        .format(ImageFormat::Png)
        .filename_prefix("cut");

    let report = TargetedExtractor::new(output)
        .run(&source, vec![candidate(4, 0.4)], dir.path())
        .expect("extract");

    let path = dir.path().join("cut_0.40s.png");
    assert_eq!(report.images[0].path, path);
    let reopened = image::open(&path).expect("readable png");
    assert_eq!((reopened.width(), reopened.height()), (8, 6));
}

#[test]
fn decode_each_hands_over_images_without_writing() {
    let source = source();
    let dir = tempfile::tempdir().expect("tempdir");
    let mut seen = Vec::new();

    let summary = TargetedExtractor::new(OutputOptions::new())
        .decode_each(
            &source,
            vec![candidate(3, 0.3), candidate(9, 0.9)],
            dir.path(),
            |extracted| seen.push(extracted),
        )
        .expect("decode");

    assert_eq!(summary.decoded, 2);
    assert_eq!(summary.packets_read, 10);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].timestamp(), 0.3);
    assert_eq!(seen[1].path, dir.path().join("scene_0.90s.jpg"));
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}
