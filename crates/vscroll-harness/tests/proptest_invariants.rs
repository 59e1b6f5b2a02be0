//! Property-based invariant tests for the range window and scroll anchors.
//!
//! These hold for any list of positive, fractional item heights:
//!
//! 1. Visible ⊆ render ⊆ [0, len) after any scroll sequence, and the
//!    spacers plus rendered rows add up to the total height.
//! 2. Capturing an anchor and scrolling to it again leaves the offset
//!    bit-for-bit unchanged.
//! 3. Growing a row above the viewport shifts the offset by exactly the
//!    growth when every height is a dyadic fraction.

use proptest::prelude::*;
use vscroll::{ScrollAlign, ScrollToOptions, ScrollerConfig};
use vscroll_harness::{Row, SimHost, SimViewport};

// ── Helpers ─────────────────────────────────────────────────────────────

fn heights_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..200.0, 1..=max_len)
}

/// Heights in quarter pixels, so every sum is exact in `f64`.
fn dyadic_heights_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((4u32..=800).prop_map(|q| f64::from(q) / 4.0), 1..=max_len)
}

fn rows_from(heights: &[f64]) -> Vec<Row> {
    heights
        .iter()
        .enumerate()
        .map(|(i, &h)| Row::new(i as u64, h))
        .collect()
}

fn host_for(heights: &[f64], viewport: u32) -> SimHost {
    SimHost::new(
        ScrollerConfig::default(),
        rows_from(heights),
        SimViewport::new(f64::from(viewport)),
    )
    .unwrap()
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ranges_stay_contained(
        heights in heights_strategy(300),
        viewport in 50u32..=900,
        fractions in prop::collection::vec(0.0f64..=1.0, 1..12),
    ) {
        let mut host = host_for(&heights, viewport);
        for f in fractions {
            let top = f * host.scroller().total_height();
            host.user_scroll_to(top);
            let s = host.scroller();
            let render = s.get_render_range();
            let visible = s.get_visible_range();
            prop_assert!(render.end <= heights.len());
            prop_assert!(visible.is_empty() || render.contains_range(&visible),
                "visible {:?} outside render {:?}", visible, render);
            if let Err(msg) = host.check_invariants() {
                prop_assert!(false, "{}", msg);
            }
        }
        prop_assert_eq!(host.unsettled_loops(), 0);
    }

    #[test]
    fn anchor_round_trip_is_stable(
        heights in heights_strategy(300),
        viewport in 50u32..=900,
        pick in any::<prop::sample::Index>(),
        align in prop_oneof![
            Just(ScrollAlign::Start),
            Just(ScrollAlign::Center),
            Just(ScrollAlign::End),
        ],
    ) {
        let mut host = host_for(&heights, viewport);
        let index = pick.index(heights.len());
        host.scroller_mut().scroll_to_index(index, ScrollToOptions::align(align));
        host.settle();

        let top = host.viewport().top();
        let anchor = host.scroller().get_scroll_anchor().unwrap();
        host.scroller_mut().scroll_to_anchor(&anchor);
        host.settle();

        prop_assert_eq!(host.viewport().top(), top,
            "anchor round trip moved the offset");
    }

    #[test]
    fn growth_above_viewport_shifts_by_exact_delta(
        heights in dyadic_heights_strategy(300),
        viewport in 50u32..=900,
        pick in any::<prop::sample::Index>(),
        growth in (1u32..=400).prop_map(|q| f64::from(q) / 8.0),
    ) {
        prop_assume!(heights.len() >= 2);
        let mut host = host_for(&heights, viewport);
        let target = 1 + pick.index(heights.len() - 1);
        host.scroller_mut().scroll_to_index(target, ScrollToOptions::align(ScrollAlign::Start));
        host.settle();

        let top = host.viewport().top();
        let state = host.scroller().get_scroll_state();
        // Away from both edges, so neither clamping nor stick-to-bottom applies.
        prop_assume!(top > 0.0 && top + 2.0 < state.scroll_height - state.client_height);
        let anchor = host.scroller().get_scroll_anchor().unwrap();
        prop_assume!(anchor.index >= 1);
        let grown = anchor.index - 1;
        let before = host.screen_y(anchor.key);

        host.set_true_height(grown as u64, heights[grown] + growth);

        prop_assert_eq!(host.viewport().top(), top + growth);
        prop_assert_eq!(host.screen_y(anchor.key), before);
        if let Err(msg) = host.check_invariants() {
            prop_assert!(false, "{}", msg);
        }
    }
}
