//! Property tests for proportional resizing

use rand::Rng;
use studio_preview::raster::fit_within;

#[test]
fn fit_within_holds_for_random_sizes() {
    let mut rng = rand::thread_rng();

    for _ in 0..5_000 {
        let w: u32 = rng.gen_range(1..=12_000);
        let h: u32 = rng.gen_range(1..=12_000);
        let max: u32 = rng.gen_range(1..=2_000);

        let (out_w, out_h) = fit_within(w, h, max);

        if w <= max && h <= max {
            assert_eq!((out_w, out_h), (w, h), "in-bounds image changed: {}x{} max {}", w, h, max);
            continue;
        }

        assert_eq!(out_w.max(out_h), max, "longer edge for {}x{} max {}", w, h, max);
        assert!(out_w >= 1 && out_h >= 1);

        // The shorter edge is the proportional value rounded to the nearest pixel
        let (long, short, out_short) = if w > h { (w, h, out_h) } else { (h, w, out_w) };
        let exact = short as f64 * max as f64 / long as f64;
        assert!(
            (out_short as f64 - exact).abs() <= 0.5 + 1e-9 || out_short == 1,
            "{}x{} max {} gave {}x{} (exact short edge {})",
            w,
            h,
            max,
            out_w,
            out_h,
            exact
        );
    }
}
