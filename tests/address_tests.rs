//! P2SH address derivation and base58check decoding

use hashlock_tx::network::{MAINNET, REGTEST, TESTNET};
use hashlock_tx::*;

#[test]
fn test_known_addresses() {
    let vectors: [(&[u8], &str, &str); 3] = [
        (
            b"Btrust Builders",
            "2MwDHax5L9jXVGmnhN2YECEx63ickZaf7n9",
            "35f5XD9JYH294zA9gtvMaHxpqNQapdVWGp",
        ),
        (
            b"",
            "2MwXA2YjS5YqSXEX7CeTywj5XuJbat9dLCU",
            "35xwxooQU6L6KStZXWr7Kn6GgxPR1q3757",
        ),
        (
            b"test",
            "2Mtbfh55LR7wX5sWWFzMHrfCTvMSC6e3nTo",
            "333TdL9JofSAt5sxarjREiDCi1E2MgSQF9",
        ),
    ];

    for (preimage, testnet, mainnet) in vectors {
        let redeem = build_hash_lock(preimage);
        assert_eq!(derive_address(&redeem, &TESTNET).as_str(), testnet);
        assert_eq!(derive_address(&redeem, &MAINNET).as_str(), mainnet);
    }
}

#[test]
fn test_derive_is_idempotent() {
    let redeem = build_hash_lock(b"Btrust Builders");
    let first = derive_address(&redeem, &TESTNET);
    for _ in 0..10 {
        assert_eq!(derive_address(&redeem, &TESTNET), first);
    }
}

#[test]
fn test_regtest_shares_testnet_prefix() {
    let redeem = build_hash_lock(b"Btrust Builders");
    assert_eq!(
        derive_address(&redeem, &REGTEST).as_str(),
        derive_address(&redeem, &TESTNET).as_str()
    );
}

#[test]
fn test_decode_round_trip() {
    let redeem = build_hash_lock(b"Btrust Builders");
    let address = derive_address(&redeem, &TESTNET);
    let (version, hash) = decode_address(address.as_str(), &TESTNET).unwrap();
    assert_eq!(version, 0xc4);
    assert_eq!(hash, redeem.script_hash());
}

#[test]
fn test_tampered_checksum() {
    let result = decode_address("2MwDHax5L9jXVGmnhN2YECEx63ickZaf7n8", &TESTNET);
    assert_eq!(result, Err(AddressError::BadChecksum));
}

#[test]
fn test_invalid_base58_character() {
    let result = decode_address("2MwDHax5L9jXVGmnhN2YECEx63ickZaf7n0", &TESTNET);
    assert!(matches!(result, Err(AddressError::InvalidBase58(_))));
}

#[test]
fn test_wrong_length() {
    // base58 of 21 bytes
    let short = bs58::encode([0xc4u8; 21]).into_string();
    assert_eq!(
        decode_address(&short, &TESTNET),
        Err(AddressError::BadLength(21))
    );
}

#[test]
fn test_parse_address_kinds() {
    let p2pkh = parse_address("mv4rnyY3Su5gjcDNzbMLKBQkBicCtHUtFB", &TESTNET).unwrap();
    assert_eq!(p2pkh.kind, AddressKind::PubkeyHash);
    assert_eq!(
        hex::encode(p2pkh.hash),
        "9f9a7abd600c0caa03983a77c8c3df8e062cb2fa"
    );
    assert_eq!(
        hex::encode(p2pkh.script_pubkey()),
        "76a9149f9a7abd600c0caa03983a77c8c3df8e062cb2fa88ac"
    );

    let p2sh = parse_address("2N4dyn5ZzEuw61YJjSVxHM19EbGxjT8v5Ze", &TESTNET).unwrap();
    assert_eq!(p2sh.kind, AddressKind::ScriptHash);
    assert_eq!(
        hex::encode(p2sh.script_pubkey()),
        "a9147cf716a6b7b539052b3c57894e000a16ac62a95e87"
    );
}

#[test]
fn test_parse_address_rejects_other_network() {
    let result = parse_address("35f5XD9JYH294zA9gtvMaHxpqNQapdVWGp", &TESTNET);
    assert_eq!(result, Err(AddressError::UnsupportedVersion(0x05)));
}
