pub mod circuit;
pub mod error;
pub mod keys;
pub mod storage;
pub mod word;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use tfhe::boolean::prelude::{ClientKey, ServerKey};

use crate::adder::circuit::{ripple_carry_add, Execution};
use crate::adder::error::Error;
use crate::adder::keys::ParameterSet;
use crate::adder::storage::{Answer, CloudData};
use crate::adder::word::{decrypt_word, encrypt_word};
use crate::config::Files;
use crate::timing;

/// Decrypted output of the cloud's computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum {
    pub value: i32,
    pub carry_out: bool,
}

pub(crate) fn keygen(files: &Files, params: ParameterSet) -> Result<()> {
    info!("generating {:?} keys", params);
    let started = Instant::now();
    let (client_key, server_key) = keys::generate(params);
    info!("keys generated in {:.2?}", started.elapsed());

    keys::save(&files.secret_key, &client_key).context("exporting secret key")?;
    keys::save(&files.cloud_key, &server_key).context("exporting cloud key")?;
    info!(
        "secret key in {}, cloud key in {}",
        files.secret_key.display(),
        files.cloud_key.display()
    );
    Ok(())
}

/// Encrypts both operands and the carry bit by bit and exports them for the cloud.
pub(crate) fn alice(files: &Files, lhs: i32, rhs: i32, carry: i32) -> Result<()> {
    if carry != 0 && carry != 1 {
        return Err(Error::InvalidCarry(carry).into());
    }

    let client_key: ClientKey = keys::load(&files.secret_key).context("reading secret key")?;

    info!("asking the cloud for {} + {} (carry {})", lhs, rhs, carry);
    let data = CloudData {
        lhs: encrypt_word(&client_key, lhs),
        rhs: encrypt_word(&client_key, rhs),
        carry: encrypt_word(&client_key, carry),
    };
    data.write(&files.cloud_data)
        .context("exporting ciphertexts")?;
    timing::stamp(&files.start_time).context("recording start time")?;

    info!(
        "{} ciphertexts written to {}",
        CloudData::CIPHERTEXTS,
        files.cloud_data.display()
    );
    Ok(())
}

/// Adds the two encrypted operands under the cloud key. Sees no plaintext.
pub(crate) fn cloud(files: &Files) -> Result<()> {
    let server_key: ServerKey = keys::load(&files.cloud_key).context("reading cloud key")?;
    let data = CloudData::read(&files.cloud_data).context("reading ciphertexts")?;

    let mut exec = Execution::new(server_key);
    let started = Instant::now();
    let (sum, carry_out) = ripple_carry_add(&mut exec, &data.lhs, &data.rhs, &data.carry[0]);
    info!(
        "evaluated {} gates in {:.2?}",
        exec.ct_operations_count(),
        started.elapsed()
    );

    Answer { sum, carry_out }
        .write(&files.answer_data)
        .context("exporting answer")?;
    info!("answer written to {}", files.answer_data.display());
    Ok(())
}

pub(crate) fn verify(files: &Files) -> Result<Sum> {
    let client_key: ClientKey = keys::load(&files.secret_key).context("reading secret key")?;
    let answer = Answer::read(&files.answer_data).context("reading answer")?;

    let sum = Sum {
        value: decrypt_word(&client_key, &answer.sum)?,
        carry_out: client_key.decrypt(&answer.carry_out),
    };
    info!("sum {} (carry out {})", sum.value, sum.carry_out);
    Ok(sum)
}
