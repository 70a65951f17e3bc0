//! Script execution engine used to check signed inputs before they leave the builder

use crate::constants::*;
use crate::error::{HashLockError, Result};
use crate::hash::{hash160, sha256, sha256d};
use crate::script::{
    classify, find_and_delete, instructions, is_push_only, Instruction, ScriptBuilder,
};
use crate::sighash::{sighash, verify_der};
use crate::types::*;
use ripemd::Ripemd160;
use sha2::Digest;

/// Signature verification seam for OP_CHECKSIG
pub trait SignatureChecker {
    /// `signature` includes the trailing sighash type byte; `script_code` is the
    /// script currently executing, from the last OP_CODESEPARATOR on, with
    /// every push of `signature` already removed.
    fn check_sig(&self, signature: &[u8], pubkey: &[u8], script_code: &[u8]) -> bool;
}

/// Checker that rejects every signature
pub struct NoSignatures;

impl SignatureChecker for NoSignatures {
    fn check_sig(&self, _signature: &[u8], _pubkey: &[u8], _script_code: &[u8]) -> bool {
        false
    }
}

/// Checks signatures against the legacy sighash of one transaction input
pub struct TransactionSignatureChecker<'a> {
    tx: &'a Transaction,
    input_index: usize,
}

impl<'a> TransactionSignatureChecker<'a> {
    pub fn new(tx: &'a Transaction, input_index: usize) -> Self {
        Self { tx, input_index }
    }
}

impl SignatureChecker for TransactionSignatureChecker<'_> {
    fn check_sig(&self, signature: &[u8], pubkey: &[u8], script_code: &[u8]) -> bool {
        let (sighash_type, der) = match signature.split_last() {
            Some(parts) => parts,
            None => return false,
        };
        match sighash(self.tx, self.input_index, script_code, *sighash_type as u32) {
            Ok(hash) => verify_der(der, pubkey, &hash),
            Err(_) => false,
        }
    }
}

/// Stack element truthiness: any non-zero byte, except a lone sign bit (negative zero)
pub fn cast_to_bool(item: &[u8]) -> bool {
    for (i, byte) in item.iter().enumerate() {
        if *byte != 0 {
            return !(i == item.len() - 1 && *byte == 0x80);
        }
    }
    false
}

fn bool_item(value: bool) -> ByteString {
    if value {
        vec![1]
    } else {
        vec![]
    }
}

/// EvalScript: 𝕊 × 𝒮𝒯 → {true, false}
///
/// 1. Reject scripts over L_script bytes
/// 2. For each instruction: count non-push ops against L_ops, execute, check |S| ≤ L_stack
/// 3. Return false as soon as an operation fails
///
/// Limit violations, malformed pushes and unsupported opcodes are errors.
pub fn eval_script(
    script: &[u8],
    stack: &mut Vec<ByteString>,
    checker: &dyn SignatureChecker,
) -> Result<bool> {
    if script.len() > MAX_SCRIPT_SIZE {
        return Err(HashLockError::ScriptExecution(format!(
            "Script of {} bytes exceeds limit",
            script.len()
        )));
    }

    let mut op_count = 0;
    let mut code_start = 0;
    let mut iter = instructions(script);

    while let Some(instruction) = iter.next() {
        match instruction? {
            Instruction::Push { data, .. } => {
                if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(HashLockError::ScriptExecution(format!(
                        "Push of {} bytes exceeds element limit",
                        data.len()
                    )));
                }
                stack.push(data.to_vec());
            }
            Instruction::Op(opcode) => {
                if opcode > OP_16 {
                    op_count += 1;
                    if op_count > MAX_SCRIPT_OPS {
                        return Err(HashLockError::ScriptExecution(
                            "Operation limit exceeded".to_string(),
                        ));
                    }
                }
                if opcode == OP_CODESEPARATOR {
                    code_start = iter.offset();
                    continue;
                }
                if !execute_opcode(opcode, stack, &script[code_start..], checker)? {
                    return Ok(false);
                }
            }
        }

        if stack.len() > MAX_STACK_SIZE {
            return Err(HashLockError::ScriptExecution("Stack overflow".to_string()));
        }
    }

    Ok(true)
}

fn pop_two(stack: &mut Vec<ByteString>) -> Option<(ByteString, ByteString)> {
    if stack.len() < 2 {
        return None;
    }
    let a = stack.pop()?;
    let b = stack.pop()?;
    Some((b, a))
}

/// Execute a single non-push opcode
fn execute_opcode(
    opcode: u8,
    stack: &mut Vec<ByteString>,
    script_code: &[u8],
    checker: &dyn SignatureChecker,
) -> Result<bool> {
    match opcode {
        OP_1NEGATE => {
            stack.push(vec![0x81]);
            Ok(true)
        }

        OP_1..=OP_16 => {
            stack.push(vec![opcode - OP_1 + 1]);
            Ok(true)
        }

        OP_NOP => Ok(true),

        OP_VERIFY => match stack.pop() {
            Some(item) => Ok(cast_to_bool(&item)),
            None => Ok(false),
        },

        OP_RETURN => Ok(false),

        OP_DROP => Ok(stack.pop().is_some()),

        OP_DUP => match stack.last().cloned() {
            Some(item) => {
                stack.push(item);
                Ok(true)
            }
            None => Ok(false),
        },

        OP_SWAP => match pop_two(stack) {
            Some((a, b)) => {
                stack.push(b);
                stack.push(a);
                Ok(true)
            }
            None => Ok(false),
        },

        OP_EQUAL => match pop_two(stack) {
            Some((a, b)) => {
                stack.push(bool_item(a == b));
                Ok(true)
            }
            None => Ok(false),
        },

        OP_EQUALVERIFY => match pop_two(stack) {
            Some((a, b)) => Ok(a == b),
            None => Ok(false),
        },

        OP_RIPEMD160 | OP_SHA256 | OP_HASH160 | OP_HASH256 => {
            let item = match stack.pop() {
                Some(item) => item,
                None => return Ok(false),
            };
            let digest = match opcode {
                OP_RIPEMD160 => Ripemd160::digest(&item).to_vec(),
                OP_SHA256 => sha256(&item).to_vec(),
                OP_HASH160 => hash160(&item).to_vec(),
                _ => sha256d(&item).to_vec(),
            };
            stack.push(digest);
            Ok(true)
        }

        OP_CHECKSIG | OP_CHECKSIGVERIFY => {
            let (signature, pubkey) = match pop_two(stack) {
                Some(pair) => pair,
                None => return Ok(false),
            };
            let signature_push = ScriptBuilder::new().push_data(&signature).into_bytes();
            let script_code = find_and_delete(script_code, &signature_push);
            let valid = checker.check_sig(&signature, &pubkey, &script_code);
            if opcode == OP_CHECKSIGVERIFY {
                Ok(valid)
            } else {
                stack.push(bool_item(valid));
                Ok(true)
            }
        }

        _ => Err(HashLockError::ScriptExecution(format!(
            "Unsupported opcode 0x{:02x}",
            opcode
        ))),
    }
}

/// VerifyScript: 𝕊 × 𝕊 → {true, false}
///
/// For unlocking script ss and locking script spk:
/// 1. Execute ss on an empty stack, then spk on the result
/// 2. Require a true top element
/// 3. If spk is P2SH: ss must be push-only; pop the serialized redeem script from
///    the stack left by ss and execute it on the remainder, again requiring a true top
pub fn verify_script(
    script_sig: &[u8],
    script_pubkey: &[u8],
    checker: &dyn SignatureChecker,
) -> Result<bool> {
    let mut stack = Vec::new();

    if !eval_script(script_sig, &mut stack, checker)? {
        return Ok(false);
    }
    let stack_after_sig = stack.clone();

    if !eval_script(script_pubkey, &mut stack, checker)? {
        return Ok(false);
    }
    if !stack.last().map_or(false, |top| cast_to_bool(top)) {
        return Ok(false);
    }

    if classify(script_pubkey) == ScriptKind::P2sh {
        if !is_push_only(script_sig) {
            return Err(HashLockError::ScriptExecution(
                "P2SH unlocking script must be push-only".to_string(),
            ));
        }
        let mut stack = stack_after_sig;
        let redeem_script = match stack.pop() {
            Some(script) => script,
            None => return Ok(false),
        };
        if !eval_script(&redeem_script, &mut stack, checker)? {
            return Ok(false);
        }
        return Ok(stack.last().map_or(false, |top| cast_to_bool(top)));
    }

    Ok(true)
}
