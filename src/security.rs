use subtle::ConstantTimeEq;

/// Constant-time string comparison, used for the admin API key.
///
/// Only the length check short-circuits; equal-length inputs take the same
/// time regardless of where they differ.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
