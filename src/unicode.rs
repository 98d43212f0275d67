// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use icu_normalizer::ComposingNormalizerBorrowed;

/// Returns the NFC form of `s`.
///
/// All strings that enter the value model (string values, map keys, object
/// attribute names, refined string prefixes) pass through here so that
/// byte-wise comparison of two strings is also canonical comparison.
pub fn normalize_string(s: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    if nfc.is_normalized(s) {
        return s.to_owned();
    }
    String::from(nfc.normalize(s))
}
