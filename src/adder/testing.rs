use std::path::Path;

use crate::config::Files;

/// Default file names resolved under `dir`.
pub(crate) fn files_in(dir: &Path) -> Files {
    let defaults = Files::default();
    Files {
        secret_key: dir.join(defaults.secret_key),
        cloud_key: dir.join(defaults.cloud_key),
        sealed_cloud_key: dir.join(defaults.sealed_cloud_key),
        cloud_data: dir.join(defaults.cloud_data),
        answer_data: dir.join(defaults.answer_data),
        start_time: dir.join(defaults.start_time),
        end_time: dir.join(defaults.end_time),
        time_log: dir.join(defaults.time_log),
        key_time_log: dir.join(defaults.key_time_log),
    }
}
