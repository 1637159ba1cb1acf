use std::path::PathBuf;

use clap::Args;

pub const SECRET_KEY_FILE: &str = "secret.key";
pub const CLOUD_KEY_FILE: &str = "cloud.key";
pub const SEALED_CLOUD_KEY_FILE: &str = "cloud.key.hacklab";
pub const CLOUD_DATA_FILE: &str = "cloud.data";
pub const ANSWER_DATA_FILE: &str = "answer.data";
pub const START_TIME_FILE: &str = "starttime.txt";
pub const END_TIME_FILE: &str = "endtime.txt";
pub const TIME_LOG_FILE: &str = "totaltime.csv";
pub const KEY_TIME_LOG_FILE: &str = "pubkeysendtime.csv";

/// Where each role reads and writes its artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Args)]
pub struct Files {
    /// Secret (client) key, never leaves the data owner.
    #[arg(long, global = true, default_value = SECRET_KEY_FILE)]
    pub secret_key: PathBuf,

    /// Cloud (server) key used for homomorphic evaluation.
    #[arg(long, global = true, default_value = CLOUD_KEY_FILE)]
    pub cloud_key: PathBuf,

    /// AES-CBC sealed copy of the cloud key, for transport.
    #[arg(long, global = true, default_value = SEALED_CLOUD_KEY_FILE)]
    pub sealed_cloud_key: PathBuf,

    /// Encrypted operands sent to the cloud.
    #[arg(long, global = true, default_value = CLOUD_DATA_FILE)]
    pub cloud_data: PathBuf,

    /// Encrypted result sent back by the cloud.
    #[arg(long, global = true, default_value = ANSWER_DATA_FILE)]
    pub answer_data: PathBuf,

    #[arg(long, global = true, default_value = START_TIME_FILE)]
    pub start_time: PathBuf,

    #[arg(long, global = true, default_value = END_TIME_FILE)]
    pub end_time: PathBuf,

    #[arg(long, global = true, default_value = TIME_LOG_FILE)]
    pub time_log: PathBuf,

    #[arg(long, global = true, default_value = KEY_TIME_LOG_FILE)]
    pub key_time_log: PathBuf,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            secret_key: SECRET_KEY_FILE.into(),
            cloud_key: CLOUD_KEY_FILE.into(),
            sealed_cloud_key: SEALED_CLOUD_KEY_FILE.into(),
            cloud_data: CLOUD_DATA_FILE.into(),
            answer_data: ANSWER_DATA_FILE.into(),
            start_time: START_TIME_FILE.into(),
            end_time: END_TIME_FILE.into(),
            time_log: TIME_LOG_FILE.into(),
            key_time_log: KEY_TIME_LOG_FILE.into(),
        }
    }
}
