//! Transaction assembly: funding a hash-lock P2SH output and spending it

use crate::address::{derive_address, Address};
use crate::codec::{tx_id, txid_hex};
use crate::config::BuilderConfig;
use crate::constants::*;
use crate::error::{HashLockError, Result, ValueError};
use crate::interpreter::{verify_script, TransactionSignatureChecker};
use crate::keys::KeyPair;
use crate::script::{build_p2pkh_unlocking_script, build_unlocking_script, classify, ScriptBuilder};
use crate::sighash::sign;
use crate::types::*;
use log::{debug, info};

/// Optional second output of a spending transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOutput {
    pub address: Address,
    pub amount: i64,
}

fn check_money_range(value: i64) -> Result<()> {
    if !(0..=MAX_MONEY).contains(&value) {
        return Err(ValueError::OutOfRange(value).into());
    }
    Ok(())
}

/// Run the interpreter over a signed input and fail unless it satisfies `script_pubkey`.
fn verify_input(tx: &Transaction, input_index: usize, script_pubkey: &[u8]) -> Result<()> {
    let checker = TransactionSignatureChecker::new(tx, input_index);
    let script_sig = &tx.inputs[input_index].script_sig;
    match verify_script(script_sig, script_pubkey, &checker) {
        Ok(true) => Ok(()),
        Ok(false) => Err(HashLockError::Verification {
            input: input_index,
            reason: "script evaluated to false".to_string(),
        }),
        Err(e) => Err(HashLockError::Verification {
            input: input_index,
            reason: e.to_string(),
        }),
    }
}

/// BuildFunding: 𝕊 × ℤ × 𝒪 × 𝕊 × 𝒦 → 𝒯𝒳
///
/// 1. One input spending `prev_outpoint`, one output of `amount` to P2SH(redeem_script)
/// 2. Sign input 0 with `prev_script_pubkey` (the script being spent) as subscript
/// 3. Unlocking script by the spent script's kind: P2PKH → `<sig> <pubkey>`, P2PK → `<sig>`
pub fn build_funding(
    redeem_script: &RedeemScript,
    amount: i64,
    prev_outpoint: OutPoint,
    prev_script_pubkey: &[u8],
    key: &KeyPair,
    config: &BuilderConfig,
) -> Result<Transaction> {
    check_money_range(amount)?;

    let network = config.network.params();
    let address = derive_address(redeem_script, &network);

    let mut tx = Transaction::new(config.version, config.lock_time);
    tx.inputs
        .push(TransactionInput::unsigned(prev_outpoint, config.sequence));
    tx.outputs.push(TransactionOutput {
        value: amount,
        script_pubkey: address.script_pubkey(),
    });

    let signature = sign(&tx, 0, prev_script_pubkey, config.sighash_type, key)
        .map_err(|e| HashLockError::signing(0, e))?;

    tx.inputs[0].script_sig = match classify(prev_script_pubkey) {
        ScriptKind::P2pkh => build_p2pkh_unlocking_script(&signature, &key.public_key_bytes()),
        ScriptKind::P2pk => ScriptBuilder::new().push_data(&signature).into_bytes(),
        kind => {
            return Err(HashLockError::UnsupportedScript(format!(
                "cannot fund from a {:?} output",
                kind
            )))
        }
    };

    if config.verify {
        verify_input(&tx, 0, prev_script_pubkey)?;
    }

    info!(
        "funding transaction {} pays {} to {}",
        txid_hex(&tx),
        amount,
        address
    );
    Ok(tx)
}

/// BuildSpending: 𝒯𝒳 × 𝕊 × 𝔹* × 𝒜 × 𝒜? × ℤ × 𝒦 → 𝒯𝒳
///
/// 1. Spend (txid(funding_tx), 0)
/// 2. Destination receives funding value − fee − change; change output only when requested
/// 3. Sign input 0 with the redeem script as subscript
/// 4. Unlocking script `<sig> <preimage> <redeem script>`
pub fn build_spending(
    funding_tx: &Transaction,
    redeem_script: &RedeemScript,
    preimage: &[u8],
    dest_address: &Address,
    change: Option<&ChangeOutput>,
    fee: i64,
    key: &KeyPair,
    config: &BuilderConfig,
) -> Result<Transaction> {
    let funding_output = funding_tx
        .outputs
        .first()
        .ok_or(HashLockError::MissingOutput(0))?;
    check_money_range(funding_output.value)?;
    check_money_range(fee)?;

    let change_amount = match change {
        Some(change) => {
            check_money_range(change.amount)?;
            change.amount
        }
        None => 0,
    };

    let dest_value = funding_output.value - fee - change_amount;
    if dest_value < 0 {
        return Err(ValueError::NegativeOutput {
            output: 0,
            value: dest_value,
        }
        .into());
    }

    let prevout = OutPoint {
        hash: tx_id(funding_tx),
        index: 0,
    };
    debug!("spending {}:0 worth {}", txid_hex(funding_tx), funding_output.value);

    let mut tx = Transaction::new(config.version, config.lock_time);
    tx.inputs
        .push(TransactionInput::unsigned(prevout, config.sequence));
    tx.outputs.push(TransactionOutput {
        value: dest_value,
        script_pubkey: dest_address.script_pubkey(),
    });
    if let Some(change) = change {
        tx.outputs.push(TransactionOutput {
            value: change.amount,
            script_pubkey: change.address.script_pubkey(),
        });
    }

    let signature = sign(&tx, 0, redeem_script.as_bytes(), config.sighash_type, key)
        .map_err(|e| HashLockError::signing(0, e))?;
    tx.inputs[0].script_sig = build_unlocking_script(&signature, preimage, redeem_script.as_bytes());

    if config.verify {
        verify_input(&tx, 0, &funding_output.script_pubkey)?;
    }

    info!(
        "spending transaction {} pays {} to {}",
        txid_hex(&tx),
        dest_value,
        dest_address
    );
    Ok(tx)
}
