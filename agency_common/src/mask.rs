//! Display-only obfuscation of API keys.
//!
//! Masking never touches the stored or transmitted value. It is applied when a key is rendered for an admin.

/// The fixed run of bullets that replaces the hidden part of a key.
pub const MASK: &str = "••••••••";
/// Number of characters left visible at each end of a long key.
pub const MASK_EDGE_LEN: usize = 4;

/// Masks a key for display.
///
/// Keys of 8 characters or fewer are replaced entirely by [`MASK`]. Longer keys keep their first and last four
/// characters, with [`MASK`] in between. Lengths are counted in characters, not bytes.
pub fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 2 * MASK_EDGE_LEN {
        return MASK.to_string();
    }
    let head = key.chars().take(MASK_EDGE_LEN).collect::<String>();
    let tail = key.chars().skip(len - MASK_EDGE_LEN).collect::<String>();
    format!("{head}{MASK}{tail}")
}
