//! Script encoding: hash-lock layout, data pushes and unlocking scripts

use hashlock_tx::hash::sha256;
use hashlock_tx::script::*;
use hashlock_tx::*;

#[test]
fn test_hash_lock_layout_for_known_preimage() {
    let redeem = build_hash_lock(b"Btrust Builders");
    let bytes = redeem.as_bytes();

    assert_eq!(bytes.len(), 35);
    assert_eq!(bytes[0], OP_SHA256);
    assert_eq!(bytes[1], 0x20);
    assert_eq!(&bytes[2..34], &sha256(b"Btrust Builders"));
    assert_eq!(bytes[34], OP_EQUAL);
    assert_eq!(
        to_asm(bytes),
        "OP_SHA256 16e05614526c1ebd3a170a430a1906a6484fdd203ab7ce6690a54938f5c44d7d OP_EQUAL"
    );
}

#[test]
fn test_hash_lock_empty_preimage() {
    let redeem = build_hash_lock(b"");
    assert_eq!(
        redeem.to_hex(),
        "a820e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85587"
    );
}

#[test]
fn test_hash_lock_is_deterministic() {
    assert_eq!(build_hash_lock(b"test"), build_hash_lock(b"test"));
    assert_ne!(build_hash_lock(b"test"), build_hash_lock(b"Test"));
}

#[test]
fn test_push_data_boundaries() {
    let cases: [(usize, &[u8]); 6] = [
        (1, &[0x01]),
        (75, &[0x4b]),
        (76, &[OP_PUSHDATA1, 76]),
        (255, &[OP_PUSHDATA1, 0xff]),
        (256, &[OP_PUSHDATA2, 0x00, 0x01]),
        (520, &[OP_PUSHDATA2, 0x08, 0x02]),
    ];
    for (len, prefix) in cases {
        let data = vec![0xcd; len];
        let script = ScriptBuilder::new().push_data(&data).into_bytes();
        assert_eq!(&script[..prefix.len()], prefix, "push of {} bytes", len);
        assert_eq!(script.len(), prefix.len() + len);
    }
}

#[test]
fn test_push_data_uses_small_integer_opcodes() {
    assert_eq!(ScriptBuilder::new().push_data(&[]).into_bytes(), vec![OP_0]);
    assert_eq!(ScriptBuilder::new().push_data(&[1]).into_bytes(), vec![OP_1]);
    assert_eq!(ScriptBuilder::new().push_data(&[16]).into_bytes(), vec![OP_16]);
    assert_eq!(ScriptBuilder::new().push_data(&[0x81]).into_bytes(), vec![OP_1NEGATE]);
    assert_eq!(ScriptBuilder::new().push_data(&[17]).into_bytes(), vec![0x01, 17]);
}

#[test]
fn test_unlocking_script_order() {
    let redeem = build_hash_lock(b"Btrust Builders");
    let signature = vec![0x30; 71];
    let script = build_unlocking_script(&signature, b"Btrust Builders", redeem.as_bytes());

    let pushes: Vec<Vec<u8>> = instructions(&script)
        .map(|ins| match ins.unwrap() {
            Instruction::Push { data, .. } => data.to_vec(),
            Instruction::Op(op) => panic!("unexpected opcode {:02x}", op),
        })
        .collect();
    assert_eq!(pushes.len(), 3);
    assert_eq!(pushes[0], signature);
    assert_eq!(pushes[1], b"Btrust Builders".to_vec());
    assert_eq!(pushes[2], redeem.as_bytes().to_vec());
    assert!(is_push_only(&script));
}

#[test]
fn test_locking_scripts_classify() {
    let hash = [0x11; 20];
    assert_eq!(classify(&p2sh_script_pubkey(&hash)), ScriptKind::P2sh);
    assert_eq!(classify(&p2pkh_script_pubkey(&hash)), ScriptKind::P2pkh);
    assert_eq!(classify(build_hash_lock(b"x").as_bytes()), ScriptKind::NonStandard);

    let mut p2pk = vec![0x21];
    p2pk.extend_from_slice(&[0x02; 33]);
    p2pk.push(OP_CHECKSIG);
    assert_eq!(classify(&p2pk), ScriptKind::P2pk);
}

#[test]
fn test_truncated_push_is_reported() {
    let script = [0x05, 0x01, 0x02];
    let mut iter = instructions(&script);
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
    assert!(!is_push_only(&script));
}

#[test]
fn test_redeem_script_hashes() {
    let redeem = build_hash_lock(b"Btrust Builders");
    assert_eq!(redeem.embedded_hash(), sha256(b"Btrust Builders"));
    assert_eq!(
        hex::encode(redeem.script_hash()),
        "2b82aca6a490542944bdceb48aec066dc7cb1b61"
    );
}
