//! Script construction: hash-lock redeem scripts, unlocking scripts and standard locking scripts

use crate::constants::*;
use crate::error::{HashLockError, Result};
use crate::hash::sha256;
use crate::types::*;
use log::{debug, trace};

/// Appends opcodes and data pushes to a script byte sequence
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptBuilder {
    script: ByteString,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.script.push(opcode);
        self
    }

    /// Push `data` using the smallest encoding that yields the same stack item:
    ///
    /// - empty → OP_0, `[1..=16]` → OP_1..OP_16, `[0x81]` → OP_1NEGATE
    /// - 1..=75 bytes → direct length byte
    /// - up to 255 / 65535 bytes → OP_PUSHDATA1 / OP_PUSHDATA2
    /// - otherwise OP_PUSHDATA4
    pub fn push_data(mut self, data: &[u8]) -> Self {
        match data.len() {
            0 => self.script.push(OP_0),
            1 if (1..=16).contains(&data[0]) => self.script.push(OP_1 - 1 + data[0]),
            1 if data[0] == 0x81 => self.script.push(OP_1NEGATE),
            len if len < OP_PUSHDATA1 as usize => {
                self.script.push(len as u8);
                self.script.extend_from_slice(data);
            }
            len if len <= 0xff => {
                self.script.push(OP_PUSHDATA1);
                self.script.push(len as u8);
                self.script.extend_from_slice(data);
            }
            len if len <= 0xffff => {
                self.script.push(OP_PUSHDATA2);
                self.script.extend_from_slice(&(len as u16).to_le_bytes());
                self.script.extend_from_slice(data);
            }
            len => {
                self.script.push(OP_PUSHDATA4);
                self.script.extend_from_slice(&(len as u32).to_le_bytes());
                self.script.extend_from_slice(data);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn into_bytes(self) -> ByteString {
        self.script
    }
}

/// BuildHashLock: 𝔹* → 𝕊
///
/// `OP_SHA256 <32: SHA256(preimage)> OP_EQUAL`, 35 bytes for every preimage.
pub fn build_hash_lock(preimage: &[u8]) -> RedeemScript {
    let hash = sha256(preimage);
    let script = ScriptBuilder::new()
        .push_opcode(OP_SHA256)
        .push_data(&hash)
        .push_opcode(OP_EQUAL)
        .into_bytes();
    debug!("hash-lock commits to {}", hex::encode(hash));
    RedeemScript(script)
}

/// P2SH unlocking script: `<signature> <preimage> <redeem script>`
pub fn build_unlocking_script(signature: &[u8], preimage: &[u8], redeem_script: &[u8]) -> ByteString {
    let script = ScriptBuilder::new()
        .push_data(signature)
        .push_data(preimage)
        .push_data(redeem_script)
        .into_bytes();
    trace!("unlocking script {}", hex::encode(&script));
    script
}

/// P2PKH unlocking script: `<signature> <pubkey>`
pub fn build_p2pkh_unlocking_script(signature: &[u8], pubkey: &[u8]) -> ByteString {
    ScriptBuilder::new()
        .push_data(signature)
        .push_data(pubkey)
        .into_bytes()
}

/// `OP_HASH160 <script hash> OP_EQUAL`
pub fn p2sh_script_pubkey(script_hash: &Hash160) -> ByteString {
    ScriptBuilder::new()
        .push_opcode(OP_HASH160)
        .push_data(script_hash)
        .push_opcode(OP_EQUAL)
        .into_bytes()
}

/// `OP_DUP OP_HASH160 <pubkey hash> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh_script_pubkey(pubkey_hash: &Hash160) -> ByteString {
    ScriptBuilder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(pubkey_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_bytes()
}

/// One parsed script element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// OP_0 or any length-prefixed push, with the opcode that introduced it
    Push { opcode: u8, data: &'a [u8] },
    Op(u8),
}

/// Iterator over the instructions of a script; yields an error once on a truncated push
pub struct Instructions<'a> {
    script: &'a [u8],
    pos: usize,
}

pub fn instructions(script: &[u8]) -> Instructions<'_> {
    Instructions { script, pos: 0 }
}

impl<'a> Instructions<'a> {
    /// Byte offset of the next instruction.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.script.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn read_len(&mut self, width: usize) -> Option<usize> {
        let bytes = self.take(width)?;
        let mut buf = [0u8; 4];
        buf[..width].copy_from_slice(bytes);
        Some(u32::from_le_bytes(buf) as usize)
    }

    fn fail(&mut self, offset: usize) -> Option<Result<Instruction<'a>>> {
        self.pos = self.script.len();
        Some(Err(HashLockError::ScriptExecution(format!(
            "truncated push at offset {}",
            offset
        ))))
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let opcode = *self.script.get(self.pos)?;
        self.pos += 1;

        let len = match opcode {
            OP_0 => 0,
            0x01..=0x4b => opcode as usize,
            OP_PUSHDATA1 => match self.read_len(1) {
                Some(len) => len,
                None => return self.fail(offset),
            },
            OP_PUSHDATA2 => match self.read_len(2) {
                Some(len) => len,
                None => return self.fail(offset),
            },
            OP_PUSHDATA4 => match self.read_len(4) {
                Some(len) => len,
                None => return self.fail(offset),
            },
            _ => return Some(Ok(Instruction::Op(opcode))),
        };

        match self.take(len) {
            Some(data) => Some(Ok(Instruction::Push { opcode, data })),
            None => self.fail(offset),
        }
    }
}

/// True if every element pushes data (OP_1NEGATE and OP_1..OP_16 included)
pub fn is_push_only(script: &[u8]) -> bool {
    instructions(script).all(|ins| match ins {
        Ok(Instruction::Push { .. }) => true,
        Ok(Instruction::Op(op)) => op == OP_1NEGATE || (OP_1..=OP_16).contains(&op),
        Err(_) => false,
    })
}

/// Recognise the standard locking script shapes
pub fn classify(script: &[u8]) -> ScriptKind {
    match script {
        [OP_DUP, OP_HASH160, 0x14, .., OP_EQUALVERIFY, OP_CHECKSIG] if script.len() == 25 => {
            ScriptKind::P2pkh
        }
        [OP_HASH160, 0x14, .., OP_EQUAL] if script.len() == 23 => ScriptKind::P2sh,
        [0x21, .., OP_CHECKSIG] if script.len() == 35 => ScriptKind::P2pk,
        [0x41, .., OP_CHECKSIG] if script.len() == 67 => ScriptKind::P2pk,
        _ => ScriptKind::NonStandard,
    }
}

/// Remove every OP_CODESEPARATOR, keeping push payloads intact
pub fn strip_codeseparators(script: &[u8]) -> ByteString {
    let mut out = Vec::with_capacity(script.len());
    let mut pos = 0;
    for ins in instructions(script) {
        let start = pos;
        match ins {
            Ok(Instruction::Push { opcode, data }) => {
                pos += 1 + data.len()
                    + match opcode {
                        OP_PUSHDATA1 => 1,
                        OP_PUSHDATA2 => 2,
                        OP_PUSHDATA4 => 4,
                        _ => 0,
                    };
                out.extend_from_slice(&script[start..pos]);
            }
            Ok(Instruction::Op(op)) => {
                pos += 1;
                if op != OP_CODESEPARATOR {
                    out.push(op);
                }
            }
            // Unparseable tail is kept verbatim
            Err(_) => {
                out.extend_from_slice(&script[start..]);
                break;
            }
        }
    }
    out
}

/// FindAndDelete: remove every instruction-aligned occurrence of `pattern`
///
/// Matching restarts at each instruction boundary, so a pattern that only
/// appears inside a push payload is left alone.
pub fn find_and_delete(script: &[u8], pattern: &[u8]) -> ByteString {
    if pattern.is_empty() {
        return script.to_vec();
    }
    let mut out = Vec::with_capacity(script.len());
    let mut pos = 0;
    loop {
        while script[pos..].starts_with(pattern) {
            pos += pattern.len();
        }
        let mut iter = instructions(&script[pos..]);
        match iter.next() {
            Some(Ok(_)) => {
                let end = pos + iter.offset();
                out.extend_from_slice(&script[pos..end]);
                pos = end;
            }
            Some(Err(_)) => {
                out.extend_from_slice(&script[pos..]);
                break;
            }
            None => break,
        }
    }
    out
}

fn opcode_name(opcode: u8) -> String {
    let name = match opcode {
        OP_1NEGATE => "OP_1NEGATE",
        OP_NOP => "OP_NOP",
        OP_VERIFY => "OP_VERIFY",
        OP_RETURN => "OP_RETURN",
        OP_DROP => "OP_DROP",
        OP_DUP => "OP_DUP",
        OP_SWAP => "OP_SWAP",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_RIPEMD160 => "OP_RIPEMD160",
        OP_SHA256 => "OP_SHA256",
        OP_HASH160 => "OP_HASH160",
        OP_HASH256 => "OP_HASH256",
        OP_CODESEPARATOR => "OP_CODESEPARATOR",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
        OP_1..=OP_16 => return format!("OP_{}", opcode - OP_1 + 1),
        _ => return format!("OP_UNKNOWN(0x{:02x})", opcode),
    };
    name.to_string()
}

/// Human-readable disassembly, e.g. `OP_SHA256 <hex> OP_EQUAL`
pub fn to_asm(script: &[u8]) -> String {
    let mut parts = Vec::new();
    for ins in instructions(script) {
        match ins {
            Ok(Instruction::Push { opcode: OP_0, .. }) => parts.push("OP_0".to_string()),
            Ok(Instruction::Push { data, .. }) => parts.push(hex::encode(data)),
            Ok(Instruction::Op(op)) => parts.push(opcode_name(op)),
            Err(_) => {
                parts.push("[error]".to_string());
                break;
            }
        }
    }
    parts.join(" ")
}
