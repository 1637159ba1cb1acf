use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tfhe::boolean::parameters::{BooleanParameters, DEFAULT_PARAMETERS, TFHE_LIB_PARAMETERS};
use tfhe::boolean::prelude::{ClientKey, ServerKey};

use crate::adder::error::{Error, Result};

/// Gate bootstrapping parameter sets the keys can be generated with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ParameterSet {
    /// tfhe-rs defaults.
    #[default]
    Default,
    /// The parameters of the C TFHE library.
    TfheLib,
}

impl ParameterSet {
    pub fn parameters(self) -> BooleanParameters {
        match self {
            Self::Default => DEFAULT_PARAMETERS,
            Self::TfheLib => TFHE_LIB_PARAMETERS,
        }
    }
}

/// Generates a fresh secret key and the cloud key derived from it.
///
/// The cloud key holds the bootstrapping and key switching keys and is the
/// expensive half; it can be handed to an untrusted party.
pub fn generate(params: ParameterSet) -> (ClientKey, ServerKey) {
    let client_key = ClientKey::new(&params.parameters());
    let server_key = ServerKey::new(&client_key);
    (client_key, server_key)
}

pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value).map_err(|e| Error::bincode(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let value =
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| Error::bincode(path, e))?;
    debug!("read {}", path.display());
    Ok(value)
}
