//! The finished job request and its wire frame.
//!
//! A frame is laid out as
//!
//! ```text
//! +-----------+------------------------+-----------+
//! | len: u32  | bincode(JobRequest)    | crc: u32  |
//! +-----------+------------------------+-----------+
//! ```
//!
//! with both integers little-endian and the checksum computed over the
//! payload only.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use trellis_common::utils::error::{Error, Result};

use super::config::JobConfig;
use crate::plan::explain::PlanDisplay;
use crate::plan::{OperatorDef, SinkDef};

const LEN_BYTES: usize = 4;
const CRC_BYTES: usize = 4;

/// A complete, immutable description of a distributed job.
///
/// Produced by [`JobBuilder::build`](super::JobBuilder::build).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    config: JobConfig,
    source: Bytes,
    plan: Vec<OperatorDef>,
    sink: SinkDef,
}

impl JobRequest {
    pub(crate) fn new(
        config: JobConfig,
        source: Bytes,
        plan: Vec<OperatorDef>,
        sink: SinkDef,
    ) -> Self {
        Self {
            config,
            source,
            plan,
            sink,
        }
    }

    /// Returns the job configuration.
    #[must_use]
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Returns the opaque source payload.
    #[must_use]
    pub fn source(&self) -> &Bytes {
        &self.source
    }

    /// Returns the operator list, excluding any reduce absorbed by the sink.
    #[must_use]
    pub fn plan(&self) -> &[OperatorDef] {
        &self.plan
    }

    /// Returns the sink.
    #[must_use]
    pub fn sink(&self) -> &SinkDef {
        &self.sink
    }

    /// Returns the operators as the runtime executes them: the plan followed
    /// by the reduce held in the sink, if any.
    #[must_use]
    pub fn operators(&self) -> Vec<OperatorDef> {
        let mut ops = self.plan.clone();
        ops.extend(self.sink.reduce_operator());
        ops
    }

    /// Encodes the request as a length-prefixed, checksummed frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails or the payload does
    /// not fit a 32-bit length.
    pub fn encode_frame(&self) -> Result<Vec<u8>> {
        let data = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let len = u32::try_from(data.len())
            .map_err(|_| Error::Serialization(format!("frame too large: {} bytes", data.len())))?;
        let checksum = crc32fast::hash(&data);

        let mut frame = Vec::with_capacity(LEN_BYTES + data.len() + CRC_BYTES);
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&data);
        frame.extend_from_slice(&checksum.to_le_bytes());
        Ok(frame)
    }

    /// Decodes a frame produced by [`JobRequest::encode_frame`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] on a truncated frame, trailing bytes,
    /// a checksum mismatch, or an undecodable payload.
    pub fn decode_frame(frame: &[u8]) -> Result<Self> {
        let Some((len_bytes, rest)) = frame.split_first_chunk::<LEN_BYTES>() else {
            return Err(Error::Serialization("frame shorter than its header".into()));
        };
        let len = u32::from_le_bytes(*len_bytes) as usize;
        if rest.len() != len + CRC_BYTES {
            return Err(Error::Serialization(format!(
                "frame length mismatch: header says {len}, found {}",
                rest.len().saturating_sub(CRC_BYTES)
            )));
        }

        let (data, crc_bytes) = rest.split_at(len);
        let expected = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        let actual = crc32fast::hash(data);
        if expected != actual {
            return Err(Error::Serialization(format!(
                "checksum mismatch: expected {expected:#010x}, got {actual:#010x}"
            )));
        }

        let (request, read) =
            bincode::serde::decode_from_slice(data, bincode::config::standard())
                .map_err(|e| Error::Serialization(e.to_string()))?;
        if read != data.len() {
            return Err(Error::Serialization(format!(
                "{} trailing bytes after request",
                data.len() - read
            )));
        }
        Ok(request)
    }
}

impl fmt::Display for JobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Job {} \"{}\" workers={} source={}B",
            self.config.job_id(),
            self.config.name(),
            self.config.workers(),
            self.source.len()
        )?;
        PlanDisplay::new(&self.plan, &self.sink).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobBuilder;
    use crate::plan::{AccumKind, OpKind, Scope};
    use trellis_common::types::JobId;

    fn sample() -> JobRequest {
        let mut job = JobBuilder::new(JobConfig::new(JobId::new(7)).with_name("sample"));
        job.add_source(Bytes::from_static(b"V()"))
            .filter(Bytes::from_static(b"age>17"))
            .exchange(Bytes::from_static(b"id"))
            .group_by(Scope::Global, AccumKind::Count, Bytes::from_static(b"label"));
        job.build().unwrap()
    }

    #[test]
    fn test_operators_includes_sink_reduce() {
        let request = sample();
        assert_eq!(request.plan().len(), 1);
        let ops = request.operators();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[1].op, OpKind::GroupBy(_)));
        assert!(ops[1].channel.is_shuffle());
    }

    #[test]
    fn test_frame_round_trip() {
        let request = sample();
        let frame = request.encode_frame().unwrap();
        assert_eq!(JobRequest::decode_frame(&frame).unwrap(), request);
    }

    #[test]
    fn test_frame_detects_corruption() {
        let mut frame = sample().encode_frame().unwrap();
        let mid = frame.len() / 2;
        frame[mid] ^= 0xff;
        assert!(matches!(
            JobRequest::decode_frame(&frame),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_frame_detects_truncation() {
        let frame = sample().encode_frame().unwrap();
        assert!(JobRequest::decode_frame(&frame[..2]).is_err());
        assert!(JobRequest::decode_frame(&frame[..frame.len() - 1]).is_err());
    }

    #[test]
    fn test_display_header() {
        let rendered = sample().to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Job job#7 \"sample\" workers=1 source=3B"));
        assert_eq!(lines.next(), Some("Filter [Pipeline] 6B"));
        assert_eq!(lines.next(), Some("SinkGroupBy [Exchange[2B]] count"));
    }
}
