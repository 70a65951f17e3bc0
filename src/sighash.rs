//! Legacy signature hash and ECDSA signing over secp256k1

use crate::codec::{write_input, write_output, write_varint};
use crate::constants::*;
use crate::error::SignError;
use crate::hash::sha256d;
use crate::keys::KeyPair;
use crate::script::strip_codeseparators;
use crate::types::*;
use log::debug;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};

/// Digest returned for SIGHASH_SINGLE without a matching output: uint256 1.
const SIGHASH_ONE: Hash = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// SigHash: 𝒯𝒳 × ℕ × 𝕊 × u32 → ℍ
///
/// Serializes a copy of `tx` in which:
/// 1. input `input_index` carries `subscript` (OP_CODESEPARATOR removed), every other input an empty script
/// 2. NONE drops all outputs; SINGLE keeps outputs up to `input_index`, blanking the earlier ones
/// 3. under NONE and SINGLE the other inputs' sequences are zero
/// 4. ANYONECANPAY keeps only the signing input
///
/// then appends `sighash_type` as u32 LE and double-SHA256s the result.
pub fn sighash(
    tx: &Transaction,
    input_index: usize,
    subscript: &[u8],
    sighash_type: u32,
) -> Result<Hash, SignError> {
    if input_index >= tx.inputs.len() {
        return Err(SignError::InputIndexOutOfRange {
            index: input_index,
            inputs: tx.inputs.len(),
        });
    }

    let base_type = sighash_type & 0x1f;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Ok(SIGHASH_ONE);
    }

    let script_code = strip_codeseparators(subscript);
    let mut s = Vec::with_capacity(crate::codec::serialized_size(tx) + script_code.len() + 4);

    s.extend_from_slice(&tx.version.to_le_bytes());

    let signed_inputs: Vec<usize> = if anyone_can_pay {
        vec![input_index]
    } else {
        (0..tx.inputs.len()).collect()
    };
    write_varint(signed_inputs.len() as u64, &mut s);
    for i in signed_inputs {
        let mut input = tx.inputs[i].clone();
        if i == input_index {
            input.script_sig = script_code.clone();
        } else {
            input.script_sig.clear();
            if base_type == SIGHASH_NONE || base_type == SIGHASH_SINGLE {
                input.sequence = 0;
            }
        }
        write_input(&input, &mut s);
    }

    match base_type {
        SIGHASH_NONE => write_varint(0, &mut s),
        SIGHASH_SINGLE => {
            write_varint(input_index as u64 + 1, &mut s);
            for _ in 0..input_index {
                write_output(
                    &TransactionOutput {
                        value: -1,
                        script_pubkey: Vec::new(),
                    },
                    &mut s,
                );
            }
            write_output(&tx.outputs[input_index], &mut s);
        }
        _ => {
            write_varint(tx.outputs.len() as u64, &mut s);
            for output in &tx.outputs {
                write_output(output, &mut s);
            }
        }
    }

    s.extend_from_slice(&tx.lock_time.to_le_bytes());
    s.extend_from_slice(&sighash_type.to_le_bytes());

    Ok(sha256d(&s))
}

/// DER-encoded, low-S, RFC6979 ECDSA signature over a 32-byte digest.
pub fn sign_hash(hash: &Hash, key: &KeyPair) -> ByteString {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(*hash);
    secp.sign_ecdsa(&message, key.secret_key())
        .serialize_der()
        .to_vec()
}

/// Sign: DER(ECDSA(sighash)) ‖ sighash_type as one byte
pub fn sign(
    tx: &Transaction,
    input_index: usize,
    subscript: &[u8],
    sighash_type: u32,
    key: &KeyPair,
) -> Result<ByteString, SignError> {
    let hash = sighash(tx, input_index, subscript, sighash_type)?;
    let mut signature = sign_hash(&hash, key);
    signature.push(sighash_type as u8);
    debug!(
        "signed input {} sighash {} ({} bytes)",
        input_index,
        hex::encode(hash),
        signature.len()
    );
    Ok(signature)
}

/// Verify a DER signature (trailing sighash byte already removed) against a digest.
///
/// High-S signatures are normalized first, as legacy validation accepts them.
pub fn verify_der(der: &[u8], pubkey: &[u8], hash: &Hash) -> bool {
    let pubkey = match PublicKey::from_slice(pubkey) {
        Ok(pk) => pk,
        Err(_) => return false,
    };
    let mut signature = match Signature::from_der(der) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    signature.normalize_s();

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&Message::from_digest(*hash), &signature, &pubkey)
        .is_ok()
}

/// True if `der` encodes an S value in the lower half of the curve order.
pub fn is_low_s(der: &[u8]) -> bool {
    match Signature::from_der(der) {
        Ok(sig) => {
            let mut normalized = sig;
            normalized.normalize_s();
            normalized == sig
        }
        Err(_) => false,
    }
}
