//! spec 8.3 scenario 6: FXAA flat-region identity.
//!
//! `post.wgsl`'s `fs_main` isn't callable from a Rust test directly, so this
//! mirrors its control flow in plain Rust against the five-sample neighborhood
//! it reads (center + 4 diagonal taps) and checks the claim the scenario
//! makes: when all five samples are identical, the FXAA branch converges
//! back to the same `gamma(center)` result as the `USE_FXAA = false` branch.
//! Kept in sync with `post.wgsl`'s `luma`/edge-detection/tap-blend math by
//! inspection; a change to one should be checked against the other.

use myth::renderer::deferred::pipelines::override_constant;

fn luma(c: [f32; 3]) -> f32 {
    c[0] * 0.299 + c[1] * 0.587 + c[2] * 0.114
}

fn gamma(c: [f32; 3]) -> [f32; 3] {
    [c[0].max(0.0).powf(1.0 / 2.2), c[1].max(0.0).powf(1.0 / 2.2), c[2].max(0.0).powf(1.0 / 2.2)]
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

fn add3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scale3(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// Mirrors `post.wgsl`'s `fs_main` FXAA branch for a 5-sample neighborhood,
/// taking `dir` pre-resolved to zero when all taps are equal (the one case
/// this test cares about) to avoid replicating the texture-sampling step.
fn fxaa_flat_region(center: [f32; 3]) -> [f32; 3] {
    let nw = center;
    let ne = center;
    let sw = center;
    let se = center;

    let luma_m = luma(center);
    let luma_nw = luma(nw);
    let luma_ne = luma(ne);
    let luma_sw = luma(sw);
    let luma_se = luma(se);
    let luma_min = luma_m.min(luma_nw.min(luma_ne).min(luma_sw.min(luma_se)));
    let luma_max = luma_m.max(luma_nw.max(luma_ne).max(luma_sw.max(luma_se)));

    // dir.x/dir.y both reduce to 0 when all four corner samples are equal,
    // so every subsequent tap in post.wgsl resamples the same `center` value.
    let color_a = lerp3(center, center, 0.5); // 0.5 * (center + center)
    let color_b = add3(scale3(color_a, 0.5), scale3(add3(center, center), 0.25));
    let luma_b = luma(color_b);

    let result = if luma_b >= luma_min && luma_b <= luma_max { color_b } else { color_a };
    gamma(result)
}

#[test]
fn flat_region_matches_no_fxaa_output() {
    let samples = [[0.1_f32, 0.2, 0.3], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], [0.5, 0.25, 0.75]];

    for hdr in samples {
        let no_fxaa = gamma(hdr);
        let fxaa = fxaa_flat_region(hdr);
        for channel in 0..3 {
            assert!(
                (no_fxaa[channel] - fxaa[channel]).abs() < 1e-5,
                "flat-region FXAA diverged from gamma-only output: {no_fxaa:?} vs {fxaa:?}"
            );
        }
    }
}

#[test]
fn override_constant_selects_fxaa_and_pcf_gates_correctly() {
    assert_eq!(override_constant(true), 1.0);
    assert_eq!(override_constant(false), 0.0);
}
