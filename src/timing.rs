use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use log::{debug, info};

use crate::adder::error::{Error, Result};
use crate::config::Files;

const ROUND_TIME_COLUMN: &str = "totalkeysendtime";

/// Writes the current Unix time, in seconds, to `path`.
pub fn stamp(path: &Path) -> Result<f64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    fs::write(path, now.to_string()).map_err(|e| Error::io(path, e))?;
    debug!("stamped {} with {}", path.display(), now);
    Ok(now)
}

pub fn read_timestamp(path: &Path) -> Result<f64> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| Error::InvalidTimestamp {
            path: path.to_path_buf(),
            value: raw.trim().to_string(),
        })
}

/// `HH:MM:SS.ffffff`. Negative spans are clamped to zero.
pub fn format_elapsed(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0).floor();
    let rem = secs - hours * 3600.0;
    let minutes = (rem / 60.0).floor();
    let seconds = rem - minutes * 60.0;
    format!("{:0>2}:{:0>2}:{:09.6}", hours as u64, minutes as u64, seconds)
}

/// Appends `row` to a CSV file, writing `header` first if the file is new.
pub fn append_record(path: &Path, header: &[&str], row: &[String]) -> Result<()> {
    let fresh = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    let mut out = String::new();
    if fresh {
        out.push_str(&header.join(","));
        out.push('\n');
    }
    out.push_str(&row.join(","));
    out.push('\n');
    file.write_all(out.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    if fresh {
        info!("created {}", path.display());
    } else {
        info!("appended to {}", path.display());
    }
    Ok(())
}

/// Connects to `addr`, reads until the peer closes, and stores the bytes.
pub fn receive_timestamp(addr: &str, path: &Path) -> Result<f64> {
    let network = |source| Error::Network {
        addr: addr.to_string(),
        source,
    };
    let mut stream = TcpStream::connect(addr).map_err(network)?;
    let mut data = Vec::new();
    stream.read_to_end(&mut data).map_err(network)?;
    debug!("received {} bytes", data.len());

    fs::write(path, &data).map_err(|e| Error::io(path, e))?;
    read_timestamp(path)
}

/// Appends the client-to-answer round time to the time log.
pub(crate) fn record_round(files: &Files) -> anyhow::Result<String> {
    let start = read_timestamp(&files.start_time).context("reading start time")?;
    let end = read_timestamp(&files.end_time).context("reading end time")?;

    let elapsed = format_elapsed(end - start);
    info!("total round time: {} ({:.6}s)", elapsed, end - start);
    append_record(&files.time_log, &[ROUND_TIME_COLUMN], &[elapsed.clone()])
        .context("recording round time")?;
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adder::testing::files_in;
    use tempfile::tempdir;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(format_elapsed(0.0), "00:00:00.000000");
        assert_eq!(format_elapsed(309.5), "00:05:09.500000");
        assert_eq!(format_elapsed(3723.25), "01:02:03.250000");
        assert_eq!(format_elapsed(-4.0), "00:00:00.000000");
    }

    #[test]
    fn timestamps_round_trip_through_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("starttime.txt");

        let written = stamp(&path).unwrap();
        assert_eq!(read_timestamp(&path).unwrap(), written);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endtime.txt");
        fs::write(&path, "soon\n").unwrap();

        let err = read_timestamp(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { ref value, .. } if value == "soon"));
    }

    #[test]
    fn header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("totaltime.csv");

        append_record(&path, &["totalkeysendtime"], &["00:00:01.000000".into()]).unwrap();
        append_record(&path, &["totalkeysendtime"], &["00:00:02.000000".into()]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "totalkeysendtime\n00:00:01.000000\n00:00:02.000000\n"
        );
    }

    #[test]
    fn end_time_arrives_over_tcp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endtime.txt");

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            conn.write_all(b"1700000000.25").unwrap();
        });

        let end = receive_timestamp(&addr.to_string(), &path).unwrap();
        server.join().unwrap();

        assert_eq!(end, 1700000000.25);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1700000000.25");
    }

    #[test]
    fn refused_connection_names_the_peer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endtime.txt");

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = receive_timestamp(&addr, &path).unwrap_err();
        assert!(matches!(err, Error::Network { addr: ref a, .. } if *a == addr));
        assert!(err.to_string().contains(&addr));
        assert!(!path.exists());
    }

    #[test]
    fn round_time_is_logged() {
        let dir = tempdir().unwrap();
        let files = files_in(dir.path());
        fs::write(&files.start_time, "1000.5").unwrap();
        fs::write(&files.end_time, "4723.75\n").unwrap();

        assert_eq!(record_round(&files).unwrap(), "01:02:03.250000");
        assert_eq!(
            fs::read_to_string(&files.time_log).unwrap(),
            "totalkeysendtime\n01:02:03.250000\n"
        );
    }

    #[test]
    fn round_time_needs_both_stamps() {
        let dir = tempdir().unwrap();
        let files = files_in(dir.path());
        fs::write(&files.start_time, "1000.5").unwrap();

        let err = record_round(&files).unwrap_err();
        assert!(format!("{:#}", err).contains("reading end time"));
        assert!(!files.time_log.exists());
    }
}
