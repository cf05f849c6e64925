#![no_main]

use comic_bubbles::codec::{decode_bubble_spec, encode_bubble_spec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Nicht-endliche Koordinaten (z.B. 1e50 → inf) lassen sich nicht als JSON schreiben.
    if let Ok(spec) = decode_bubble_spec(text) {
        if let Ok(encoded) = encode_bubble_spec(&spec) {
            if let Ok(again) = decode_bubble_spec(&encoded) {
                assert_eq!(again, spec);
            }
        }
    }
});
