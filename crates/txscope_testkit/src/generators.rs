//! Property-based test generators.

use proptest::prelude::*;
use txscope_core::TransactionPolicy;

/// Strategy over every transaction policy combination.
pub fn policies() -> impl Strategy<Value = TransactionPolicy> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(read_only, visible, keep_open)| {
        TransactionPolicy::new()
            .read_only(read_only)
            .visible_in_context(visible)
            .keep_open(keep_open)
    })
}

/// Strategy over plausible logical unit names.
pub fn unit_names() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}
