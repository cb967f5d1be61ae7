use std::path::Path;

use log::info;

use crate::{RacewatchError, session::SessionRecord};

/// Write the samples of `record` to `file` as JSON lines, in timestamp order. Returns the number
/// of samples written.
pub fn write_session(file: &Path, record: &SessionRecord) -> Result<usize, RacewatchError> {
    let samples = record
        .telemetry
        .as_ref()
        .map(|t| t.samples())
        .unwrap_or_default();
    serde_jsonlines::write_json_lines(file, samples)
        .map_err(|e| RacewatchError::WriterError { source: e })?;
    info!(
        "Wrote {} samples of session {} to {:?}",
        samples.len(),
        record.id,
        file
    );
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RawSessionRecord, SessionStatus};
    use crate::telemetry::Sample;
    use tempfile::TempDir;

    #[test]
    fn test_write_sorted_samples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        let record = SessionRecord::from_raw(
            "s1",
            RawSessionRecord::new("TEST", SessionStatus::Finished).with_samples(vec![
                Sample {
                    timestamp: 2.,
                    speed_kph: 20.,
                    ..Sample::default()
                },
                Sample {
                    timestamp: 1.,
                    speed_kph: 10.,
                    ..Sample::default()
                },
            ]),
        );

        assert_eq!(write_session(&path, &record).unwrap(), 2);
        let written = serde_jsonlines::json_lines::<Sample, _>(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].timestamp, 1.);
    }

    #[test]
    fn test_write_session_without_telemetry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.jsonl");
        let record =
            SessionRecord::from_raw("s2", RawSessionRecord::new("TEST", SessionStatus::Live));
        assert_eq!(write_session(&path, &record).unwrap(), 0);
        assert!(path.exists());
    }
}
