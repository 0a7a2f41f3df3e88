//! Known-answer and rejection tests for identifier derivation.

use reef_sdk::error::IdentifierError;
use reef_sdk::ids::{namespace_path, MosaicId, MosaicNonce, NamespaceId, UnresolvedId};

fn hex_key(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("valid hex"))
        .collect()
}

/// Network reference fixtures: (owner public key, nonce, expected mosaic id).
const MOSAIC_VECTORS: [(&str, u32, &str); 5] = [
    (
        "4AFF7B4BA8C1C26A7917575993346627CB6C80DE62CD92F7F9AEDB7064A3DE62",
        0xB76F_E378,
        "3AD842A8C0AFC518",
    ),
    (
        "3811EDF245F1D30171FF1474B24C4366FECA365A8457AAFA084F3DE4AEA0BA60",
        0x2183_2A2A,
        "24C54740A9F3893F",
    ),
    (
        "3104D468D20491EC12C988C50CAD9282256052907415359201C46CBD7A0BCD75",
        0x2ADB_B332,
        "43908F2DEEA04245",
    ),
    (
        "6648E16513F351E9907B0EA34377E25F579BE640D4698B28E06585A21E94CFE2",
        0xB917_5E0F,
        "183172772BD29E78",
    ),
    (
        "1C05C40D38463FE725CF0584A3A69E3B0D6B780196A88C50624E49B921EE1404",
        0xF607_7DDD,
        "423DB0B12F787422",
    ),
];

#[test]
fn mosaic_id_matches_reference_vectors() {
    for (owner_hex, nonce, expected) in MOSAIC_VECTORS {
        let id = MosaicId::from_nonce_and_owner(MosaicNonce(nonce), &hex_key(owner_hex));
        assert_eq!(id.to_hex(), expected, "owner {owner_hex}");
    }
}

#[test]
fn mosaic_id_high_bit_is_always_cleared() {
    for (owner_hex, nonce, _) in MOSAIC_VECTORS {
        let id = MosaicId::from_nonce_and_owner(MosaicNonce(nonce), &hex_key(owner_hex));
        assert_eq!(id.raw() >> 63, 0);
    }
}

#[test]
fn mosaic_id_is_deterministic() {
    let owner = hex_key(MOSAIC_VECTORS[0].0);
    let a = MosaicId::from_nonce_and_owner(MosaicNonce(7), &owner);
    let b = MosaicId::from_nonce_and_owner(MosaicNonce(7), &owner);
    assert_eq!(a, b);
    // A different nonce must move the id.
    let c = MosaicId::from_nonce_and_owner(MosaicNonce(8), &owner);
    assert_ne!(a, c);
}

#[test]
fn root_namespace_matches_reference_vector() {
    let id = NamespaceId::from_name("nem", None).expect("valid name");
    assert_eq!(id.raw(), 9_562_080_086_528_621_131);
    assert_eq!(id.to_hex(), "84B3552D375FFA4B");
}

#[test]
fn namespace_id_high_bit_is_always_set() {
    for name in ["nem", "a", "0", "token-gold", "under_score"] {
        let id = NamespaceId::from_name(name, None).expect("valid name");
        assert_eq!(id.raw() >> 63, 1, "name {name}");
    }
}

#[test]
fn child_namespace_hashes_its_parent() {
    let root = NamespaceId::from_name("nem", None).expect("valid name");
    let child = NamespaceId::from_name("subnem", Some(root)).expect("valid name");
    assert_eq!(child.raw(), 16_440_672_666_685_223_858);
    // Same name under no parent is a different namespace.
    let orphan = NamespaceId::from_name("subnem", None).expect("valid name");
    assert_ne!(child, orphan);
}

#[test]
fn namespace_path_returns_every_level_in_order() {
    let ids = namespace_path("nem.subnem").expect("valid path");
    assert_eq!(
        ids.iter().map(|id| id.raw()).collect::<Vec<_>>(),
        vec![9_562_080_086_528_621_131, 16_440_672_666_685_223_858],
    );
}

#[test]
fn namespace_path_folds_like_manual_chaining() {
    let foo = NamespaceId::from_name("foo", None).expect("valid name");
    let bar = NamespaceId::from_name("bar", Some(foo)).expect("valid name");
    let baz = NamespaceId::from_name("baz", Some(bar)).expect("valid name");
    assert_eq!(namespace_path("foo.bar.baz").expect("valid path"), vec![foo, bar, baz]);
}

#[test]
fn namespace_name_is_validated_before_hashing() {
    for bad in ["", "Foo", "-foo", "foo.bar", "bet@", "ze^a", "_leading"] {
        let result = NamespaceId::from_name(bad, None);
        assert!(
            matches!(result, Err(IdentifierError::InvalidName { ref name }) if name.as_str() == bad),
            "expected rejection of {bad:?}, got {result:?}"
        );
    }
}

#[test]
fn namespace_path_rejects_bad_segments() {
    for bad in [".", "..", ".a", "a..a", "alpha.bet@.zeta", "A", ""] {
        assert!(
            matches!(namespace_path(bad), Err(IdentifierError::InvalidName { .. })),
            "expected rejection of {bad:?}"
        );
    }
}

#[test]
fn namespace_path_rejects_more_than_three_levels() {
    let result = namespace_path("a.b.c.d");
    assert!(matches!(
        result,
        Err(IdentifierError::TooManySegments { count: 4, .. })
    ));
}

#[test]
fn unresolved_id_discriminates_on_the_high_bit() {
    let namespace = NamespaceId::from_name("nem", None).expect("valid name");
    match UnresolvedId::from_raw(namespace.raw()) {
        UnresolvedId::Namespace(id) => assert_eq!(id, namespace),
        other => panic!("expected a namespace id, got {other:?}"),
    }

    let mosaic = MosaicId::from_raw(0x3AD8_42A8_C0AF_C518);
    match UnresolvedId::from_raw(mosaic.raw()) {
        UnresolvedId::Mosaic(id) => assert_eq!(id, mosaic),
        other => panic!("expected a mosaic id, got {other:?}"),
    }
}

#[test]
fn ids_render_as_sixteen_hex_characters() {
    let small = MosaicId::from_raw(0x1F);
    assert_eq!(small.to_hex(), "000000000000001F");
    assert_eq!(small.to_hex().len(), 16);
}
