//! Property-based test generators using proptest.

use crate::fixtures::TestItem;
use depot_core::{Key, KeyPart};
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for a single key part, covering every scalar variant.
///
/// Text parts include characters that require escaping in file names.
pub fn key_part() -> impl Strategy<Value = KeyPart> {
    prop_oneof![
        "[a-zA-Z0-9 _/~%=.:-]{0,16}".prop_map(KeyPart::Text),
        any::<i64>().prop_map(KeyPart::Int),
        any::<bool>().prop_map(KeyPart::Bool),
        any::<u128>().prop_map(|n| KeyPart::Uuid(Uuid::from_u128(n))),
    ]
}

/// Strategy for a key with arity 1 to 4.
pub fn key() -> impl Strategy<Value = Key> {
    prop::collection::vec(key_part(), 1..=4).prop_map(Key::composite)
}

/// Strategy for a [`TestItem`] with a file-name-safe identity.
pub fn test_item() -> impl Strategy<Value = TestItem> {
    (
        "[a-z0-9]{1,12}",
        "[a-zA-Z0-9 ]{0,24}",
        any::<i64>(),
    )
        .prop_map(|(id, value, score)| TestItem { id, value, score })
}
