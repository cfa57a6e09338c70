#![no_main]

use ciboard_core::codec::{FilterCodec, QueryRecord};
use ciboard_core::views;
use libfuzzer_sys::fuzz_target;

/// Split `key=value&...` the way a browser query string arrives.
fn record(text: &str) -> QueryRecord {
    text.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(schema) = views::tree_details() else {
        return;
    };
    let codec = FilterCodec::new(&schema);
    let state = codec.decode(&record(text));
    assert!(state.is_canonical(&schema));
    assert_eq!(codec.decode(&codec.encode(&state)), state);
});
