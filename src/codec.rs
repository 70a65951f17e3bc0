//! Transaction wire format: serialization, deserialization and transaction ids
//!
//! ```text
//! version:i32 | n_in:varint | inputs | n_out:varint | outputs | lock_time:u32
//! input  = prev_txid:32 | prev_index:u32 | script_len:varint | script | sequence:u32
//! output = value:i64 | script_len:varint | script
//! ```
//!
//! All integers are little-endian.

use crate::error::CodecError;
use crate::hash::sha256d;
use crate::types::*;
use log::trace;

/// Number of bytes the compact-size encoding of `n` occupies.
pub fn varint_size(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Append the compact-size encoding of `n`.
pub fn write_varint(n: u64, out: &mut Vec<u8>) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

fn write_script(script: &[u8], out: &mut Vec<u8>) {
    write_varint(script.len() as u64, out);
    out.extend_from_slice(script);
}

pub fn write_outpoint(outpoint: &OutPoint, out: &mut Vec<u8>) {
    out.extend_from_slice(&outpoint.hash);
    out.extend_from_slice(&outpoint.index.to_le_bytes());
}

pub fn write_input(input: &TransactionInput, out: &mut Vec<u8>) {
    write_outpoint(&input.prevout, out);
    write_script(&input.script_sig, out);
    out.extend_from_slice(&input.sequence.to_le_bytes());
}

pub fn write_output(output: &TransactionOutput, out: &mut Vec<u8>) {
    out.extend_from_slice(&output.value.to_le_bytes());
    write_script(&output.script_pubkey, out);
}

/// Exact length of `serialize(tx)`.
pub fn serialized_size(tx: &Transaction) -> usize {
    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| 32 + 4 + varint_size(i.script_sig.len() as u64) + i.script_sig.len() + 4)
        .sum();
    let outputs: usize = tx
        .outputs
        .iter()
        .map(|o| 8 + varint_size(o.script_pubkey.len() as u64) + o.script_pubkey.len())
        .sum();
    4 + varint_size(tx.inputs.len() as u64)
        + inputs
        + varint_size(tx.outputs.len() as u64)
        + outputs
        + 4
}

/// Serialize: 𝒯𝒳 → 𝔹*
pub fn serialize(tx: &Transaction) -> ByteString {
    let mut out = Vec::with_capacity(serialized_size(tx));
    out.extend_from_slice(&tx.version.to_le_bytes());
    write_varint(tx.inputs.len() as u64, &mut out);
    for input in &tx.inputs {
        write_input(input, &mut out);
    }
    write_varint(tx.outputs.len() as u64, &mut out);
    for output in &tx.outputs {
        write_output(output, &mut out);
    }
    out.extend_from_slice(&tx.lock_time.to_le_bytes());
    out
}

/// Cursor over the input bytes; every read states the field it is for
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, field: &'static str, needed: usize) -> Result<&'a [u8], CodecError> {
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                field,
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(field, N)?);
        Ok(buf)
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.array(field)?))
    }

    fn varint(&mut self, field: &'static str) -> Result<u64, CodecError> {
        let [prefix] = self.array::<1>(field)?;
        let (value, min) = match prefix {
            0xfd => (u16::from_le_bytes(self.array(field)?) as u64, 0xfd),
            0xfe => (u32::from_le_bytes(self.array(field)?) as u64, 0x1_0000),
            0xff => (u64::from_le_bytes(self.array(field)?), 0x1_0000_0000),
            n => return Ok(n as u64),
        };
        // A wider prefix than the value needs would re-serialize to different bytes
        if value < min {
            return Err(CodecError::NonCanonicalVarint { field, value });
        }
        Ok(value)
    }

    /// Length-prefixed byte string; a length beyond the input is truncation.
    fn var_bytes(&mut self, field: &'static str) -> Result<ByteString, CodecError> {
        let len = self.varint(field)?;
        let len = usize::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
        Ok(self.take(field, len)?.to_vec())
    }

    /// Element count; each element needs at least `min_size` bytes.
    fn count(&mut self, field: &'static str, min_size: usize) -> Result<usize, CodecError> {
        let n = self.varint(field)?;
        let n = usize::try_from(n).map_err(|_| CodecError::LengthOverflow(n))?;
        let needed = n.checked_mul(min_size).ok_or(CodecError::LengthOverflow(n as u64))?;
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                field,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(n)
    }
}

/// Smallest possible encodings, used to bound counts before allocating
const MIN_INPUT_SIZE: usize = 32 + 4 + 1 + 4;
const MIN_OUTPUT_SIZE: usize = 8 + 1;

fn read_input(reader: &mut Reader<'_>) -> Result<TransactionInput, CodecError> {
    let hash = reader.array::<32>("prev_txid")?;
    let index = reader.u32("prev_index")?;
    let script_sig = reader.var_bytes("script_sig")?;
    let sequence = reader.u32("sequence")?;
    Ok(TransactionInput {
        prevout: OutPoint { hash, index },
        script_sig,
        sequence,
    })
}

fn read_output(reader: &mut Reader<'_>) -> Result<TransactionOutput, CodecError> {
    let value = i64::from_le_bytes(reader.array("value")?);
    let script_pubkey = reader.var_bytes("script_pubkey")?;
    Ok(TransactionOutput {
        value,
        script_pubkey,
    })
}

/// Deserialize: 𝔹* → 𝒯𝒳
///
/// The whole buffer must be consumed by exactly one transaction.
pub fn deserialize(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let mut reader = Reader::new(bytes);
    let version = i32::from_le_bytes(reader.array("version")?);

    let n_inputs = reader.count("input_count", MIN_INPUT_SIZE)?;
    let mut inputs = Vec::with_capacity(n_inputs);
    for _ in 0..n_inputs {
        inputs.push(read_input(&mut reader)?);
    }

    let n_outputs = reader.count("output_count", MIN_OUTPUT_SIZE)?;
    let mut outputs = Vec::with_capacity(n_outputs);
    for _ in 0..n_outputs {
        outputs.push(read_output(&mut reader)?);
    }

    let lock_time = reader.u32("lock_time")?;
    if reader.remaining() > 0 {
        return Err(CodecError::TrailingBytes(reader.remaining()));
    }

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

/// TxId: double-SHA256 of the serialization, internal (non-reversed) byte order.
pub fn tx_id(tx: &Transaction) -> Hash {
    let id = sha256d(&serialize(tx));
    trace!("txid {}", display_hash(&id));
    id
}

/// Hash in display order (byte-reversed hex), as explorers show txids.
pub fn display_hash(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

pub fn txid_hex(tx: &Transaction) -> String {
    display_hash(&tx_id(tx))
}

/// Parse a display-order txid into the internal byte order.
pub fn parse_txid(s: &str) -> Result<Hash, CodecError> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 32 {
        return Err(CodecError::InvalidHex(format!(
            "txid must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    hash.reverse();
    Ok(hash)
}

pub fn decode_hex(s: &str) -> Result<ByteString, CodecError> {
    hex::decode(s.trim()).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

pub fn to_hex(tx: &Transaction) -> String {
    hex::encode(serialize(tx))
}

pub fn from_hex(s: &str) -> Result<Transaction, CodecError> {
    deserialize(&decode_hex(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint { hash: [0xab; 32], index: 1 },
                script_sig: vec![0x51, 0x52],
                sequence: 0xffffffff,
            }],
            outputs: vec![
                TransactionOutput {
                    value: 100000,
                    script_pubkey: vec![0xa9; 23],
                },
                TransactionOutput {
                    value: 0,
                    script_pubkey: vec![],
                },
            ],
            lock_time: 500,
        }
    }

    #[test]
    fn test_varint_boundaries() {
        let cases: [(u64, &str); 7] = [
            (0, "00"),
            (0xfc, "fc"),
            (0xfd, "fdfd00"),
            (0xffff, "fdffff"),
            (0x10000, "fe00000100"),
            (0xffffffff, "feffffffff"),
            (0x100000000, "ff0000000001000000"),
        ];
        for (n, expected) in cases {
            let mut out = Vec::new();
            write_varint(n, &mut out);
            assert_eq!(hex::encode(&out), expected, "varint {}", n);
            assert_eq!(varint_size(n), out.len());
        }
    }

    #[test]
    fn test_serialize_layout() {
        let tx = sample_transaction();
        let bytes = serialize(&tx);
        assert_eq!(bytes.len(), serialized_size(&tx));
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..37], &[0xab; 32]);
        assert_eq!(&bytes[37..41], &[1, 0, 0, 0]);
        assert_eq!(&bytes[41..44], &[2, 0x51, 0x52]);
        assert_eq!(&bytes[44..48], &[0xff; 4]);
        assert_eq!(bytes[48], 2);
        assert_eq!(&bytes[49..57], &100000i64.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 4..], &500u32.to_le_bytes());
    }

    #[test]
    fn test_deserialize_round_trip() {
        let tx = sample_transaction();
        assert_eq!(deserialize(&serialize(&tx)).unwrap(), tx);
    }

    #[test]
    fn test_deserialize_truncated() {
        let bytes = serialize(&sample_transaction());
        for cut in [0, 3, 4, 40, bytes.len() - 1] {
            let result = deserialize(&bytes[..cut]);
            assert!(
                matches!(result, Err(CodecError::Truncated { .. })),
                "cut at {} gave {:?}",
                cut,
                result
            );
        }
    }

    #[test]
    fn test_deserialize_trailing_bytes() {
        let mut bytes = serialize(&sample_transaction());
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(deserialize(&bytes), Err(CodecError::TrailingBytes(2)));
    }

    #[test]
    fn test_deserialize_huge_script_length_is_truncation() {
        let mut bytes = vec![1, 0, 0, 0, 1];
        bytes.extend_from_slice(&[0; 36]);
        bytes.extend_from_slice(&[0xfe, 0xff, 0xff, 0xff, 0x7f]);
        let result = deserialize(&bytes);
        assert!(matches!(
            result,
            Err(CodecError::Truncated { field: "script_sig", .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_non_canonical_varint() {
        // input count 1 written as fd 01 00
        let mut bytes = vec![1, 0, 0, 0, 0xfd, 0x01, 0x00];
        bytes.extend_from_slice(&[0; 36]);
        bytes.extend_from_slice(&[0x00, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes.len(), 53);
        assert_eq!(
            deserialize(&bytes),
            Err(CodecError::NonCanonicalVarint {
                field: "input_count",
                value: 1,
            })
        );

        // the same transaction with a minimal count decodes and re-serializes exactly
        let mut canonical = vec![1, 0, 0, 0, 0x01];
        canonical.extend_from_slice(&bytes[7..]);
        let tx = deserialize(&canonical).unwrap();
        assert_eq!(serialize(&tx), canonical);
    }

    #[test]
    fn test_deserialize_non_canonical_script_length() {
        let cases: [(&[u8], u64); 3] = [
            (&[0xfd, 0xfc, 0x00], 0xfc),
            (&[0xfe, 0xff, 0xff, 0x00, 0x00], 0xffff),
            (&[0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00], 0xffff_ffff),
        ];
        for (prefix, value) in cases {
            let mut bytes = vec![1, 0, 0, 0, 1];
            bytes.extend_from_slice(&[0; 36]);
            bytes.extend_from_slice(prefix);
            bytes.extend_from_slice(&[0; 64]);
            assert_eq!(
                deserialize(&bytes),
                Err(CodecError::NonCanonicalVarint {
                    field: "script_sig",
                    value,
                })
            );
        }
    }

    #[test]
    fn test_deserialize_huge_input_count_is_truncation() {
        let bytes = [1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x0f];
        assert!(deserialize(&bytes).is_err());
    }

    #[test]
    fn test_tx_id_display_order() {
        let tx = sample_transaction();
        let id = tx_id(&tx);
        let mut reversed = id;
        reversed.reverse();
        assert_eq!(txid_hex(&tx), hex::encode(reversed));
        assert_eq!(parse_txid(&txid_hex(&tx)).unwrap(), id);
    }

    #[test]
    fn test_parse_txid_rejects_bad_input() {
        assert!(matches!(parse_txid("zz"), Err(CodecError::InvalidHex(_))));
        assert!(matches!(parse_txid("abcd"), Err(CodecError::InvalidHex(_))));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(matches!(from_hex("0g"), Err(CodecError::InvalidHex(_))));
    }
}
