use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::{debug, info};
use rand::RngCore;

use crate::adder::error::{Error, Result};
use crate::config::Files;
use crate::timing::append_record;

const BLOCK: usize = 16;
const SIZE_FIELD: usize = 16;
const HEADER: usize = SIZE_FIELD + BLOCK;

const KEY_TIME_COLUMNS: [&str; 4] = [
    "totalkeysealtime",
    "readkeytime",
    "encryptkeytime",
    "writekeytime",
];

/// Symmetric AES key used to seal the cloud key for transport.
#[derive(Clone, PartialEq, Eq)]
pub struct TransportKey(Vec<u8>);

impl TransportKey {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        match bytes.len() {
            16 | 24 | 32 => Ok(Self(bytes)),
            n => Err(Error::TransportKeyLength(n)),
        }
    }
}

impl FromStr for TransportKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(hex::decode(s.trim())?)
    }
}

impl fmt::Debug for TransportKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TransportKey(AES-{})", self.0.len() * 8)
    }
}

fn encrypt_with<C: BlockEncryptMut + KeyIvInit>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    let cipher = C::new_from_slices(key, iv).map_err(|_| Error::TransportKeyLength(key.len()))?;
    let len = buf.len();
    cipher
        .encrypt_padded_mut::<NoPadding>(buf, len)
        .map_err(|_| Error::TransportKeyLength(key.len()))?;
    Ok(())
}

fn decrypt_with<C: BlockDecryptMut + KeyIvInit>(
    key: &[u8],
    iv: &[u8],
    buf: &mut [u8],
    origin: &Path,
) -> Result<()> {
    let cipher = C::new_from_slices(key, iv).map_err(|_| Error::TransportKeyLength(key.len()))?;
    cipher
        .decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|_| Error::SealedFormat {
            path: origin.to_path_buf(),
            reason: "body is not block aligned",
        })?;
    Ok(())
}

/// Seals `plain` under `iv`: a 16-digit zero-padded ASCII length, the IV,
/// then AES-CBC over the contents padded with spaces to a whole block.
pub fn seal_with_iv(key: &TransportKey, iv: &[u8; BLOCK], plain: &[u8]) -> Result<Vec<u8>> {
    let mut body = plain.to_vec();
    let padded = plain.len().div_ceil(BLOCK) * BLOCK;
    body.resize(padded, b' ');

    match key.0.len() {
        16 => encrypt_with::<cbc::Encryptor<aes::Aes128>>(&key.0, iv, &mut body)?,
        24 => encrypt_with::<cbc::Encryptor<aes::Aes192>>(&key.0, iv, &mut body)?,
        _ => encrypt_with::<cbc::Encryptor<aes::Aes256>>(&key.0, iv, &mut body)?,
    }

    let mut sealed = Vec::with_capacity(HEADER + body.len());
    sealed.extend_from_slice(format!("{:0>16}", plain.len()).as_bytes());
    sealed.extend_from_slice(iv);
    sealed.extend_from_slice(&body);
    Ok(sealed)
}

pub fn seal(key: &TransportKey, plain: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; BLOCK];
    rand::thread_rng().fill_bytes(&mut iv);
    seal_with_iv(key, &iv, plain)
}

/// Reverses [`seal`]. `origin` names the sealed file in errors.
pub fn open(key: &TransportKey, sealed: &[u8], origin: &Path) -> Result<Vec<u8>> {
    let bad = |reason| Error::SealedFormat {
        path: origin.to_path_buf(),
        reason,
    };
    if sealed.len() < HEADER {
        return Err(bad("shorter than its header"));
    }

    let size = std::str::from_utf8(&sealed[..SIZE_FIELD])
        .ok()
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| bad("size field is not a decimal number"))?;
    let iv = &sealed[SIZE_FIELD..HEADER];
    let mut body = sealed[HEADER..].to_vec();
    if body.len() % BLOCK != 0 {
        return Err(bad("body is not block aligned"));
    }
    if size > body.len() {
        return Err(bad("size field exceeds the body"));
    }

    match key.0.len() {
        16 => decrypt_with::<cbc::Decryptor<aes::Aes128>>(&key.0, iv, &mut body, origin)?,
        24 => decrypt_with::<cbc::Decryptor<aes::Aes192>>(&key.0, iv, &mut body, origin)?,
        _ => decrypt_with::<cbc::Decryptor<aes::Aes256>>(&key.0, iv, &mut body, origin)?,
    }
    body.truncate(size);
    Ok(body)
}

/// Seconds spent in each phase of sealing the cloud key.
#[derive(Debug, Clone, Copy)]
pub struct SealTimes {
    pub total: f64,
    pub read: f64,
    pub encrypt: f64,
    pub write: f64,
}

/// Seals the cloud key for transport and logs how long it took.
pub(crate) fn seal_cloud_key(files: &Files, key: &TransportKey) -> anyhow::Result<SealTimes> {
    let started = Instant::now();
    let plain = fs::read(&files.cloud_key)
        .map_err(|e| Error::io(&files.cloud_key, e))
        .context("reading cloud key")?;
    let read = started.elapsed().as_secs_f64();

    let encrypt_started = Instant::now();
    let sealed = seal(key, &plain)?;
    let encrypt = encrypt_started.elapsed().as_secs_f64();

    let write_started = Instant::now();
    fs::write(&files.sealed_cloud_key, &sealed)
        .map_err(|e| Error::io(&files.sealed_cloud_key, e))
        .context("writing sealed cloud key")?;
    let write = write_started.elapsed().as_secs_f64();

    let times = SealTimes {
        total: started.elapsed().as_secs_f64(),
        read,
        encrypt,
        write,
    };
    info!(
        "sealed {} bytes into {} ({} bytes) with {:?}",
        plain.len(),
        files.sealed_cloud_key.display(),
        sealed.len(),
        key
    );
    debug!("{:?}", times);

    let row = [times.total, times.read, times.encrypt, times.write].map(|t| format!("{:.6}", t));
    append_record(&files.key_time_log, &KEY_TIME_COLUMNS, &row).context("recording key times")?;
    Ok(times)
}

/// Restores the cloud key from its sealed copy.
pub(crate) fn open_cloud_key(files: &Files, key: &TransportKey) -> anyhow::Result<()> {
    let sealed = fs::read(&files.sealed_cloud_key)
        .map_err(|e| Error::io(&files.sealed_cloud_key, e))
        .context("reading sealed cloud key")?;
    let plain = open(key, &sealed, &files.sealed_cloud_key)?;
    fs::write(&files.cloud_key, &plain)
        .map_err(|e| Error::io(&files.cloud_key, e))
        .context("writing cloud key")?;
    info!(
        "opened {} into {} ({} bytes)",
        files.sealed_cloud_key.display(),
        files.cloud_key.display(),
        plain.len()
    );
    Ok(())
}
