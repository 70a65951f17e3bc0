//! Wire format: varints, transaction (de)serialization and ids

use hashlock_tx::codec::*;
use hashlock_tx::*;

/// Funding transaction for "Btrust Builders", 100000 units, spending
/// the default testnet outpoint with a P2PKH input.
const FUNDING_HEX: &str = "010000000190c575d6dd413f310246fe1f37e18eb10b943c262ed83b89852c8e2b3b8b8667000000006a47304402207ca80d518f9a981b1b0575496a4b018abbfbab46d8dd50be5f4ab83e1b6909df0220452a00231aac50e59e805932f2225ec60f9a4b95f7c5ca1ed696231cd0ac3e2801210302da315eb15e050e3ecf6a903af22def10b6da9685836e17384ce845a8f3a37affffffff01a08601000000000017a9142b82aca6a490542944bdceb48aec066dc7cb1b618700000000";
const FUNDING_TXID: &str = "2b0109bc603422ca5a05e50280c5c7449b07e88b10f77272d7f369c8abf3d262";

#[test]
fn test_varint_encoding_boundaries() {
    let cases: [(u64, &str); 7] = [
        (0, "00"),
        (0xfc, "fc"),
        (0xfd, "fdfd00"),
        (0xffff, "fdffff"),
        (0x10000, "fe00000100"),
        (0xffff_ffff, "feffffffff"),
        (0x1_0000_0000, "ff0000000001000000"),
    ];
    for (n, expected) in cases {
        let mut out = Vec::new();
        write_varint(n, &mut out);
        assert_eq!(hex::encode(&out), expected);
        assert_eq!(varint_size(n), out.len());
    }
}

#[test]
fn test_decode_known_funding_transaction() {
    let tx = from_hex(FUNDING_HEX).unwrap();
    assert_eq!(tx.version, 1);
    assert_eq!(tx.inputs.len(), 1);
    assert_eq!(display_hash(&tx.inputs[0].prevout.hash), DEFAULT_FUNDING_TXID);
    assert_eq!(tx.inputs[0].prevout.index, 0);
    assert_eq!(tx.inputs[0].sequence, SEQUENCE_FINAL);
    assert_eq!(tx.outputs.len(), 1);
    assert_eq!(tx.outputs[0].value, 100000);
    assert_eq!(
        hex::encode(&tx.outputs[0].script_pubkey),
        "a9142b82aca6a490542944bdceb48aec066dc7cb1b6187"
    );
    assert_eq!(tx.lock_time, 0);

    assert_eq!(to_hex(&tx), FUNDING_HEX);
    assert_eq!(serialized_size(&tx), FUNDING_HEX.len() / 2);
    assert_eq!(txid_hex(&tx), FUNDING_TXID);
}

#[test]
fn test_txid_byte_order() {
    let tx = from_hex(FUNDING_HEX).unwrap();
    let internal = tx_id(&tx);
    assert_eq!(parse_txid(FUNDING_TXID).unwrap(), internal);
    assert_eq!(internal[0], 0x62);
    assert_eq!(internal[31], 0x2b);
}

#[test]
fn test_empty_scripts_round_trip() {
    let tx = Transaction {
        version: 2,
        inputs: vec![TransactionInput::unsigned(
            OutPoint {
                hash: [0xab; 32],
                index: 7,
            },
            0,
        )],
        outputs: vec![TransactionOutput {
            value: 0,
            script_pubkey: vec![],
        }],
        lock_time: 500_000,
    };
    let bytes = serialize(&tx);
    assert_eq!(bytes.len(), 4 + 1 + 41 + 1 + 9 + 4);
    assert_eq!(deserialize(&bytes).unwrap(), tx);
}

#[test]
fn test_truncated_lock_time() {
    let hex = &FUNDING_HEX[..FUNDING_HEX.len() - 2];
    assert_eq!(
        from_hex(hex),
        Err(CodecError::Truncated {
            field: "lock_time",
            needed: 4,
            remaining: 3,
        })
    );
}

#[test]
fn test_trailing_bytes() {
    let hex = format!("{}00", FUNDING_HEX);
    assert_eq!(from_hex(&hex), Err(CodecError::TrailingBytes(1)));
}

#[test]
fn test_invalid_hex() {
    assert!(matches!(from_hex("0100zz"), Err(CodecError::InvalidHex(_))));
    assert!(matches!(from_hex("010"), Err(CodecError::InvalidHex(_))));
}

#[test]
fn test_oversized_input_count() {
    assert_eq!(
        from_hex("01000000fdffff"),
        Err(CodecError::Truncated {
            field: "input_count",
            needed: 0xffff * 41,
            remaining: 0,
        })
    );
}

#[test]
fn test_script_length_beyond_input() {
    // one input whose script claims 0x50 bytes
    let mut hex = String::from("0100000001");
    hex.push_str(&"00".repeat(36));
    hex.push_str("50");
    hex.push_str(&"00".repeat(8));
    assert!(matches!(
        from_hex(&hex),
        Err(CodecError::Truncated { field: "script_sig", needed: 0x50, .. })
    ));
}

#[test]
fn test_parse_txid_wrong_length() {
    assert!(matches!(parse_txid("abcd"), Err(CodecError::InvalidHex(_))));
}
