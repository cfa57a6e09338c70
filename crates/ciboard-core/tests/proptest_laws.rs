use ciboard_core::codec::FilterCodec;
use ciboard_core::diff::{AggregateSummary, diff};
use ciboard_core::pagination::PaginationCursor;
use ciboard_core::reducer::FilterReducer;
use ciboard_core::route::{RouteCodec, RouteDefaults};
use ciboard_core::state::FilterState;
use proptest::prelude::*;

#[path = "generators.rs"]
mod generators;
use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    // Codec

    #[test]
    fn decode_encode_is_canonicalize(state in arb_raw_state()) {
        let schema = schema();
        let codec = FilterCodec::new(&schema);
        let decoded = codec.decode(&codec.encode(&state));
        prop_assert_eq!(decoded, state.canonicalize(&schema));
    }

    #[test]
    fn decode_always_yields_canonical_state(raw in arb_record()) {
        let schema = schema();
        let codec = FilterCodec::new(&schema);
        let state = codec.decode(&raw);
        prop_assert!(state.is_canonical(&schema));
    }

    #[test]
    fn encode_is_stable(state in arb_state()) {
        let schema = schema();
        let codec = FilterCodec::new(&schema);
        let once = codec.encode(&state);
        let twice = codec.encode(&codec.decode(&once));
        prop_assert_eq!(once, twice);
    }

    // Reducer

    #[test]
    fn toggle_is_symmetric(state in arb_state(), arch in arb_arch(), config in arb_key()) {
        let schema = schema();
        let reducer = FilterReducer::new(&schema);
        let state = state.canonicalize(&schema);

        let there = reducer.toggle(&state, "archs", &arch).expect("toggle");
        let back = reducer.toggle(&there, "archs", &arch).expect("toggle");
        prop_assert_eq!(&back, &state);

        let there = reducer.toggle(&state, "configs", &config).expect("toggle");
        prop_assert_ne!(&there, &state);
        let back = reducer.toggle(&there, "configs", &config).expect("toggle");
        prop_assert_eq!(back, state);
    }

    #[test]
    fn reducer_results_are_canonical(state in arb_state(), arch in arb_arch()) {
        let schema = schema();
        let reducer = FilterReducer::new(&schema);
        let state = state.canonicalize(&schema);
        let toggled = reducer.toggle(&state, "archs", &arch).expect("toggle");
        prop_assert!(toggled.is_canonical(&schema));
        let cleared = reducer.clear_section(&toggled, "configs").expect("clear");
        prop_assert!(cleared.is_canonical(&schema));
    }

    #[test]
    fn clear_all_is_idempotent(state in arb_raw_state()) {
        let schema = schema();
        let reducer = FilterReducer::new(&schema);
        let once = reducer.clear_all(&state);
        prop_assert_eq!(&once, &FilterState::new());
        prop_assert_eq!(reducer.clear_all(&once), once);
    }

    // Diff

    #[test]
    fn diff_flags_follow_state(
        state in arb_state(),
        counts in prop::collection::vec((arb_arch(), 0u64..100), 0..6),
    ) {
        let schema = schema();
        let state = state.canonicalize(&schema);
        let global: AggregateSummary =
            counts.iter().map(|(k, n)| ("archs", k.as_str(), *n)).collect();
        let current: AggregateSummary =
            counts.iter().map(|(k, n)| ("archs", k.as_str(), n / 2)).collect();
        let view = diff(&global, &current, &state);

        for key in selected(&state, "archs") {
            prop_assert!(view["archs"][&key].selected);
        }
        if let Some(rows) = view.get("archs") {
            let source = if state.is_active("archs") { &current } else { &global };
            for (key, entry) in rows {
                prop_assert_eq!(entry.selected, state.is_selected("archs", key));
                prop_assert_eq!(entry.available, source.count("archs", key).unwrap_or(0));
            }
        }
    }

    // Pagination

    #[test]
    fn cursor_window_is_in_bounds(page in 0usize..50, size in 0usize..30, total in 0usize..500) {
        let c = PaginationCursor::new(page, size, total);
        prop_assert!(c.start_index() <= c.end_index());
        prop_assert!(c.end_index() <= c.total_items());
        prop_assert!(c.page_index() < c.page_count());

        for moved in [c.forward(), c.back(), c.set_page_size(size + 3)] {
            prop_assert!(moved.start_index() <= moved.end_index());
            prop_assert!(moved.end_index() <= moved.total_items());
        }
    }

    #[test]
    fn resize_keeps_invariant(page in 0usize..50, size in 1usize..30, total in 0usize..500, next in 0usize..500) {
        let c = PaginationCursor::new(page, size, total).resize(next);
        prop_assert!(c.start_index() <= c.end_index());
        prop_assert!(c.end_index() <= next);
        prop_assert_eq!(PaginationCursor::new(page, size, total).resize(0).page_index(), 0);
    }

    #[test]
    fn forward_then_back_returns(page in 0usize..50, size in 1usize..30, total in 0usize..500) {
        let c = PaginationCursor::new(page, size, total);
        if c.has_next() {
            prop_assert_eq!(c.forward().back(), c);
        }
    }

    // Route

    #[test]
    fn route_round_trip(raw in arb_record()) {
        let schema = schema();
        let codec = RouteCodec::new(&schema, RouteDefaults::default());
        let search = codec.decode(&raw);
        let again = codec.decode(&codec.encode(&search));
        prop_assert_eq!(again, search);
    }

    #[test]
    fn route_keeps_unknown_keys(raw in arb_record()) {
        let schema = schema();
        let codec = RouteCodec::new(&schema, RouteDefaults::default());
        let encoded = codec.encode(&codec.decode(&raw));
        for key in ["origin", "duration"] {
            prop_assert_eq!(encoded.get(key), raw.get(key));
        }
    }
}
