use tfhe::boolean::prelude::{Ciphertext, ClientKey};

use crate::adder::error::{Error, Result};

pub const WORD_BITS: usize = 32;

/// A 32-bit integer encrypted bit by bit, least significant bit first.
pub type EncryptedWord = Vec<Ciphertext>;

pub fn bits_of(value: i32) -> [bool; WORD_BITS] {
    let mut bits = [false; WORD_BITS];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (value >> i) & 1 == 1;
    }
    bits
}

pub fn word_from_bits(bits: &[bool]) -> Result<i32> {
    check_len(bits.len())?;
    Ok(bits
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, bit)| acc | ((*bit as u32) << i)) as i32)
}

pub fn encrypt_word(client_key: &ClientKey, value: i32) -> EncryptedWord {
    bits_of(value)
        .iter()
        .map(|bit| client_key.encrypt(*bit))
        .collect()
}

pub fn decrypt_word(client_key: &ClientKey, word: &[Ciphertext]) -> Result<i32> {
    let bits: Vec<bool> = word.iter().map(|ct| client_key.decrypt(ct)).collect();
    word_from_bits(&bits)
}

pub(crate) fn check_len(actual: usize) -> Result<()> {
    if actual != WORD_BITS {
        return Err(Error::WordLength {
            expected: WORD_BITS,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adder::keys::ParameterSet;

    #[test]
    fn bits_are_lsb_first() {
        let bits = bits_of(0b1011);
        assert_eq!(&bits[..5], &[true, true, false, true, false]);
        assert!(bits[5..].iter().all(|b| !b));
    }

    #[test]
    fn negative_values_keep_sign_bit() {
        let bits = bits_of(-1);
        assert!(bits.iter().all(|b| *b));
        assert_eq!(word_from_bits(&bits).unwrap(), -1);

        let bits = bits_of(i32::MIN);
        assert!(bits[31]);
        assert_eq!(word_from_bits(&bits).unwrap(), i32::MIN);
    }

    #[test]
    fn bits_rebuild_the_word() {
        for v in [0, 1, 1073741823, i32::MAX, -123456, 0x5555_5555] {
            assert_eq!(word_from_bits(&bits_of(v)).unwrap(), v);
        }
    }

    #[test]
    fn short_bit_slice_is_rejected() {
        let err = word_from_bits(&[true; 31]).unwrap_err();
        assert!(matches!(
            err,
            Error::WordLength {
                expected: 32,
                actual: 31
            }
        ));
    }

    #[test]
    fn encrypted_word_decrypts() {
        let client_key = ClientKey::new(&ParameterSet::Default.parameters());

        let word = encrypt_word(&client_key, 1073741823);
        assert_eq!(word.len(), WORD_BITS);
        assert_eq!(decrypt_word(&client_key, &word).unwrap(), 1073741823);

        let word = encrypt_word(&client_key, -7);
        assert_eq!(decrypt_word(&client_key, &word).unwrap(), -7);
    }

    #[test]
    fn tfhe_lib_parameters_encrypt_words() {
        let client_key = ClientKey::new(&ParameterSet::TfheLib.parameters());

        let word = encrypt_word(&client_key, i32::MIN + 12345);
        assert_eq!(decrypt_word(&client_key, &word).unwrap(), i32::MIN + 12345);
    }
}
