mod helpers;
mod mask;
mod secret;

pub use helpers::parse_boolean_flag;
pub use mask::{mask_key, MASK, MASK_EDGE_LEN};
pub use secret::Secret;
