use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use tfhe::boolean::prelude::Ciphertext;

use crate::adder::error::{Error, Result};
use crate::adder::word::{check_len, EncryptedWord, WORD_BITS};

/// Writes the ciphertexts of every word back to back, in order.
pub fn write_ciphertexts(path: &Path, words: &[&[Ciphertext]]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for word in words {
        for ct in word.iter() {
            bincode::serialize_into(&mut writer, ct).map_err(|e| Error::bincode(path, e))?;
            count += 1;
        }
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    debug!("wrote {} ciphertexts to {}", count, path.display());
    Ok(())
}

/// Reads exactly `count` ciphertexts. A file holding more is an error.
pub fn read_ciphertexts(path: &Path, count: usize) -> Result<Vec<Ciphertext>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut cts = Vec::with_capacity(count);
    for _ in 0..count {
        cts.push(bincode::deserialize_from(&mut reader).map_err(|e| Error::bincode(path, e))?);
    }

    let mut probe = [0u8; 1];
    if reader.read(&mut probe).map_err(|e| Error::io(path, e))? != 0 {
        return Err(Error::TrailingData {
            path: path.to_path_buf(),
            count,
        });
    }
    debug!("read {} ciphertexts from {}", count, path.display());
    Ok(cts)
}

/// What the client hands to the cloud: both operands and the carry word.
pub struct CloudData {
    pub lhs: EncryptedWord,
    pub rhs: EncryptedWord,
    pub carry: EncryptedWord,
}

impl CloudData {
    pub const CIPHERTEXTS: usize = 3 * WORD_BITS;

    pub fn write(&self, path: &Path) -> Result<()> {
        check_len(self.lhs.len())?;
        check_len(self.rhs.len())?;
        check_len(self.carry.len())?;
        write_ciphertexts(path, &[
            self.lhs.as_slice(),
            self.rhs.as_slice(),
            self.carry.as_slice(),
        ])
    }

    pub fn read(path: &Path) -> Result<Self> {
        let mut cts = read_ciphertexts(path, Self::CIPHERTEXTS)?;
        let carry = cts.split_off(2 * WORD_BITS);
        let rhs = cts.split_off(WORD_BITS);
        Ok(Self {
            lhs: cts,
            rhs,
            carry,
        })
    }
}

/// What the cloud sends back: the sum word followed by the carry-out bit.
pub struct Answer {
    pub sum: EncryptedWord,
    pub carry_out: Ciphertext,
}

impl Answer {
    pub const CIPHERTEXTS: usize = WORD_BITS + 1;

    pub fn write(&self, path: &Path) -> Result<()> {
        check_len(self.sum.len())?;
        write_ciphertexts(path, &[self.sum.as_slice(), std::slice::from_ref(&self.carry_out)])
    }

    pub fn read(path: &Path) -> Result<Self> {
        let mut sum = read_ciphertexts(path, Self::CIPHERTEXTS)?;
        let carry_out = sum.pop().ok_or(Error::WordLength {
            expected: WORD_BITS,
            actual: 0,
        })?;
        Ok(Self { sum, carry_out })
    }
}
