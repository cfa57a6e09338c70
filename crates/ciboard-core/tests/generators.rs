#![allow(dead_code)]

use ciboard_core::codec::QueryRecord;
use ciboard_core::schema::FilterSchema;
use ciboard_core::state::{FilterState, Selection};
use proptest::prelude::*;
use std::collections::BTreeSet;

pub const ARCHS: [&str; 3] = ["arm64", "x86", "riscv"];
pub const TABLE: [&str; 3] = ["all", "failed", "success"];

pub fn schema() -> FilterSchema {
    FilterSchema::builder("laws")
        .closed_set("archs", ARCHS)
        .boolean_set("configs")
        .range("duration")
        .single_enum("table", TABLE, "all")
        .text("path")
        .index_mapping("commits")
        .build()
        .expect("law schema must build")
}

/// Well-formed value-key for an open boolean-set.
pub fn arb_key() -> impl Strategy<Value = String> + Clone {
    "[a-z0-9_+.-]{1,10}"
}

/// Any short string, including separators and whitespace.
pub fn arb_junk() -> impl Strategy<Value = String> + Clone {
    "[a-z ,0-9-]{0,6}"
}

/// Plain decimal index, as used for tree positions.
pub fn arb_index() -> impl Strategy<Value = String> + Clone {
    "0|[1-9][0-9]{0,2}"
}

pub fn arb_commit() -> impl Strategy<Value = String> + Clone {
    "[0-9a-f]{6,12}"
}

pub fn arb_arch() -> impl Strategy<Value = String> + Clone {
    prop::sample::select(ARCHS.to_vec()).prop_map(str::to_string)
}

fn arb_keys(key: impl Strategy<Value = String>) -> impl Strategy<Value = Selection> {
    prop::collection::btree_set(key, 0..5).prop_map(Selection::Keys)
}

fn arb_range() -> impl Strategy<Value = Selection> {
    (
        prop::option::of(-1000i64..1000),
        prop::option::of(-1000i64..1000),
    )
        .prop_map(|(min, max)| Selection::Range { min, max })
}

fn arb_entries(
    key: impl Strategy<Value = String>,
    value: impl Strategy<Value = String>,
) -> impl Strategy<Value = Selection> {
    prop::collection::btree_map(key, value, 0..4).prop_map(Selection::Entries)
}

fn arb_choice() -> impl Strategy<Value = Selection> {
    prop::sample::select(TABLE.to_vec()).prop_map(|v| Selection::Choice(v.to_string()))
}

/// States whose sections are all admissible under [`schema`], though not
/// necessarily canonical (empty sets, inverted ranges, default choices).
pub fn arb_state() -> impl Strategy<Value = FilterState> {
    (
        prop::option::of(arb_keys(arb_arch())),
        prop::option::of(arb_keys(arb_key())),
        prop::option::of(arb_range()),
        prop::option::of(arb_choice()),
        prop::option::of(arb_key().prop_map(Selection::Choice)),
        prop::option::of(arb_entries(arb_index(), arb_commit())),
    )
        .prop_map(|(archs, configs, duration, table, path, commits)| {
            [
                ("archs", archs),
                ("configs", configs),
                ("duration", duration),
                ("table", table),
                ("path", path),
                ("commits", commits),
            ]
            .into_iter()
            .filter_map(|(name, sel)| sel.map(|s| (name.to_string(), s)))
            .collect::<FilterState>()
        })
}

/// States with arbitrary junk: unknown sections, bad keys, kind mismatches.
pub fn arb_raw_state() -> impl Strategy<Value = FilterState> {
    let section = prop::sample::select(vec![
        "archs",
        "configs",
        "duration",
        "table",
        "path",
        "commits",
        "compilers",
    ]);
    let selection = prop_oneof![
        arb_keys(arb_junk()),
        arb_keys(arb_arch()),
        arb_range(),
        arb_choice(),
        arb_junk().prop_map(Selection::Choice),
        arb_entries(arb_junk(), arb_junk()),
        arb_entries(arb_index(), arb_commit()),
    ];
    prop::collection::vec((section, selection), 0..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(name, sel)| (name.to_string(), sel))
            .collect::<FilterState>()
    })
}

/// Query records mixing filter keys, route keys and unknown keys.
pub fn arb_record() -> impl Strategy<Value = QueryRecord> {
    let key = prop::sample::select(vec![
        "archs",
        "configs",
        "durationMin",
        "durationMax",
        "table",
        "duration",
        "path",
        "commits",
        "intervalInDays",
        "treeSearch",
        "currentPageTab",
        "sort",
        "sortDirection",
        "page",
        "pageSize",
        "origin",
    ]);
    let value = prop_oneof![
        arb_junk(),
        arb_arch(),
        prop::sample::select(TABLE.to_vec()).prop_map(str::to_string),
        (-50i64..50).prop_map(|n| n.to_string()),
        (arb_index(), arb_commit()).prop_map(|(i, c)| format!("{i}:{c}")),
        "[0-9a-z]{0,2}:[0-9a-z ]{0,3}(,[0-9]:[a-f]{0,3})?",
        prop::sample::select(vec!["asc", "desc", "false", "global.tests", "boots"])
            .prop_map(str::to_string),
    ];
    prop::collection::btree_map(key.prop_map(str::to_string), value, 0..10)
}

pub fn selected(state: &FilterState, section: &str) -> BTreeSet<String> {
    state
        .selected_keys(section)
        .into_iter()
        .map(str::to_string)
        .collect()
}
