// SPDX-License-Identifier: MIT
#![no_main]

use libfuzzer_sys::fuzz_target;
use snaptriage::classifier::{detect_category, detect_sensitivity, extract_entities};

fuzz_target!(|text: &str| {
    let _ = detect_category(text);
    let _ = extract_entities(text);
    let _ = detect_sensitivity(text);
});
