#![no_main]

use ciboard_core::codec::QueryRecord;
use ciboard_core::route::{RouteCodec, RouteDefaults};
use ciboard_core::views;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|pairs: Vec<(String, String)>| {
    let Ok(schema) = views::hardware_details() else {
        return;
    };
    let codec = RouteCodec::new(&schema, RouteDefaults::default());
    let raw: QueryRecord = pairs.into_iter().collect();
    let search = codec.decode(&raw);
    let encoded = codec.encode(&search);
    assert_eq!(codec.encode(&codec.decode(&encoded)), encoded);
});
