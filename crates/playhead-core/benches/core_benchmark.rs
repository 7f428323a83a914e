//! Benchmark tests for playhead-core operations
//!
//! Run with: cargo bench -p playhead-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use tokio::time::Instant;

use playhead_core::analytics::AnalyticsAccumulator;
use playhead_core::captions::{parse_captions, CaptionScheduler};
use playhead_core::coordinator::{map_key, KeyInput};
use playhead_core::format::{format_progress, format_time};
use playhead_core::theme::{css_variables, ControlOptions, Theme};
use playhead_core::types::*;

// ============================================================================
// Helpers
// ============================================================================

fn create_cues(count: usize) -> Vec<CaptionCue> {
    (0..count)
        .map(|i| {
            let start = i as f64 * 3.0;
            CaptionCue::new(format!("Cue number {}", i), start, start + 2.5)
        })
        .collect()
}

fn create_vtt(count: usize) -> String {
    let mut vtt = String::from("WEBVTT\n\n");
    for i in 0..count {
        let start = i * 3;
        vtt.push_str(&format!(
            "{}\n00:{:02}:{:02}.000 --> 00:{:02}:{:02}.500\nLine <i>{}</i>\n\n",
            i,
            start / 60,
            start % 60,
            (start + 2) / 60,
            (start + 2) % 60,
            i
        ));
    }
    vtt
}

// ============================================================================
// Caption Benchmarks
// ============================================================================

fn bench_caption_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("caption_scheduler");

    for count in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("playthrough", count), &count, |b, &count| {
            let mut scheduler = CaptionScheduler::new(create_cues(count));
            let end = count as f64 * 3.0;
            b.iter(|| {
                let mut time = 0.0;
                let mut changes = 0;
                while time < end {
                    if scheduler.update(black_box(time), true).is_some() {
                        changes += 1;
                    }
                    time += 0.25;
                }
                changes
            })
        });
    }

    group.finish();
}

fn bench_caption_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("caption_parsing");

    for count in [10, 200] {
        let vtt = create_vtt(count);
        group.bench_with_input(BenchmarkId::new("webvtt", count), &vtt, |b, vtt| {
            b.iter(|| parse_captions(black_box(vtt)))
        });
    }

    group.finish();
}

// ============================================================================
// Formatting & Keyboard Benchmarks
// ============================================================================

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    group.bench_function("format_time", |b| b.iter(|| format_time(black_box(3725.4))));
    group.bench_function("format_progress", |b| {
        b.iter(|| format_progress(black_box(65.0), black_box(600.0)))
    });

    group.finish();
}

fn bench_keyboard(c: &mut Criterion) {
    let keys: Vec<KeyInput> = ["Space", "K", "ArrowLeft", "Shift+.", "Digit7", "?", "F13"]
        .iter()
        .filter_map(|k| k.parse().ok())
        .collect();

    c.bench_function("map_key", |b| {
        b.iter(|| keys.iter().filter_map(|k| map_key(black_box(*k))).count())
    });
}

// ============================================================================
// Analytics & Theme Benchmarks
// ============================================================================

fn bench_analytics(c: &mut Criterion) {
    let chapters = vec![
        Chapter::new("Intro", 0.0, 60.0),
        Chapter::new("Main", 60.0, 540.0),
        Chapter::new("Outro", 540.0, 600.0),
    ];

    c.bench_function("analytics_observe", |b| {
        b.iter(|| {
            let mut analytics = AnalyticsAccumulator::new(chapters.clone(), Duration::from_millis(400));
            let start = Instant::now();
            for i in 0..600 {
                let state = PlaybackState {
                    is_playing: true,
                    is_loading: false,
                    current_time: i as f64,
                    duration: 600.0,
                    ..Default::default()
                };
                analytics.observe(&state, start + Duration::from_secs(i));
            }
            analytics.snapshot()
        })
    });
}

fn bench_theme(c: &mut Criterion) {
    let options = ControlOptions::default();
    c.bench_function("css_variables", |b| {
        b.iter(|| css_variables(black_box(Theme::Dark), &options).to_css_block(":root"))
    });
}

criterion_group!(caption_benches, bench_caption_scheduler, bench_caption_parsing);

criterion_group!(interaction_benches, bench_format, bench_keyboard);

criterion_group!(state_benches, bench_analytics, bench_theme);

criterion_main!(caption_benches, interaction_benches, state_benches);
