use std::collections::BTreeMap;

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parses `a=1&b=2` pairs into `into`. A pair without `=` maps to an empty
/// value, values keep any further `=`, and later keys overwrite earlier ones.
/// Empty segments (`a=1&&b=2`) are skipped. No percent-decoding is applied.
pub(crate) fn parse_pairs(input: &str, into: &mut BTreeMap<String, String>) {
    for pair in input.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        into.insert(key.to_string(), value.to_string());
    }
}
