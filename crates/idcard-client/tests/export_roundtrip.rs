//! Export documents round-trip every record attribute.

use idcard_client::{CardRecord, CardScope};
use idcard_core::{IdentityType, SignerId, Timestamp};
use idcard_model::{CustomFields, Signature, SignedModel};
use proptest::prelude::*;

fn scope() -> impl Strategy<Value = CardScope> {
    prop_oneof![Just(CardScope::Application), Just(CardScope::Global)]
}

proptest! {
    #[test]
    fn export_then_import_is_identity(
        identity in "[a-z]{1,16}(@[a-z]{1,8}\\.com)?",
        public_key in prop::collection::vec(any::<u8>(), 1..64),
        created_at in 0i64..4_102_444_800,
        fields in prop::collection::btree_map("[a-z_]{1,8}", "[ -~]{0,16}", 0..4),
        signers in prop::collection::btree_set("[a-z0-9]{1,10}", 0..4),
        scope in scope(),
        issued in prop::option::of(0i64..4_102_444_800),
    ) {
        let mut model = SignedModel::generate(
            &public_key,
            &identity,
            Timestamp::from_epoch_secs(created_at).unwrap(),
            None,
        )
        .unwrap();
        for signer in signers {
            let sig = Signature::new(SignerId::new(signer.clone()).unwrap(), signer.into_bytes()).unwrap();
            model.add_signature(sig).unwrap();
        }
        let custom_fields: CustomFields = fields;
        let record = CardRecord::new(
            model,
            IdentityType::email(),
            custom_fields,
            scope,
            issued.map(|s| Timestamp::from_epoch_secs(s).unwrap()),
        )
        .unwrap();

        let back = CardRecord::import(&record.export().unwrap()).unwrap();
        prop_assert_eq!(back, record);
    }
}
