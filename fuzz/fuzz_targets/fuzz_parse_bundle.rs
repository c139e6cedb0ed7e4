#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The parser must reject arbitrary input without panicking or reading
    // out of bounds; any Err is a correct outcome here.
    let _ = fava_crypto::bundle::parse_bundle(data);
});
