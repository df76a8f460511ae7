// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use proteus::render::render_markdown;

// Benchmark identity (keep stable):
// - Group name in this file: `render.markdown`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `story_small`, `long_lists`).
// - If implementations move/deduplicate, update the wiring but do not rename
//   group or case IDs.

fn story_small() -> String {
    "**As a** user\n**I want** export data\n**So that** I can back it up\n\n\
     **Acceptance Criteria**\n\n- Export completes in <5s"
        .to_owned()
}

fn bug_rich() -> String {
    "Save button missing\n\n**Scenario**\n\n1. Open the editor\n2. Navigate away\n\
     3. Navigate back\n\n**Expected result**\n\nThe save button is visible\n\n\
     **Actual result**\n\nThe toolbar renders without the button"
        .to_owned()
}

fn long_lists() -> String {
    let mut out = String::from("**Technical Information**\n");
    for i in 0..200 {
        out.push_str(&format!("\n- shard {i} rebalanced"));
    }
    out.push_str("\n\n**Steps**\n");
    for i in 0..200 {
        out.push_str(&format!("\n{}. replay batch {i}", i + 1));
    }
    out
}

fn benches_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render.markdown");
    let small = story_small();
    group.bench_function("story_small", move |b| {
        b.iter(|| black_box(render_markdown(black_box(&small))).len())
    });
    let bug = bug_rich();
    group.bench_function("bug_rich", move |b| {
        b.iter(|| black_box(render_markdown(black_box(&bug))).len())
    });
    let lists = long_lists();
    group.bench_function("long_lists", move |b| {
        b.iter(|| black_box(render_markdown(black_box(&lists))).len())
    });
    group.finish();
}

criterion_group!(benches, benches_render);
criterion_main!(benches);
