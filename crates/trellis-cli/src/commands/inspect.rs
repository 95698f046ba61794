//! Frame inspection command.

use std::path::Path;

use anyhow::{Context, Result};
use trellis::JobRequest;

use super::{JobSummary, print_jobs};
use crate::OutputFormat;

/// Run the inspect command.
pub fn run(path: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let frame =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let request = JobRequest::decode_frame(&frame)
        .with_context(|| format!("{} is not a valid job frame", path.display()))?;
    tracing::info!(path = %path.display(), bytes = frame.len(), "decoded job frame");

    let summary = JobSummary::new(&request, None).with_frame(path.display().to_string(), frame.len());
    print_jobs(&[(summary, &request)], format.into(), quiet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis::{JobConfig, JobId, Traversal};

    #[test]
    fn test_inspect_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.frame");
        let request = trellis::lower(&Traversal::v().count(), JobConfig::new(JobId::new(3))).unwrap();
        std::fs::write(&path, request.encode_frame().unwrap()).unwrap();

        assert!(run(&path, OutputFormat::Json, true).is_ok());
    }

    #[test]
    fn test_inspect_rejects_corrupt_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.frame");
        std::fs::write(&path, b"not a frame").unwrap();

        let err = run(&path, OutputFormat::Table, true).unwrap_err();
        assert!(format!("{err:#}").contains("not a valid job frame"));
    }

    #[test]
    fn test_inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("missing"), OutputFormat::Table, true).is_err());
    }
}
