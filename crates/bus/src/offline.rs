// SPDX-License-Identifier: MIT

//! Offline-contents protocol: a large `contents` payload is written to a
//! side file and the envelope on the wire carries only a reference, resolved
//! transparently by the consumer (grounded on original_source's
//! `gobcore.message_broker.offline_contents.load_message`, used by
//! `gobworkflow/task/queue.py` and `gobworkflow/workflow/start.py`).

use crate::error::BusError;
use gobw_core::{Contents, Envelope};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Contents above this size are offloaded rather than inlined, mirroring
/// the original's rationale for the side-channel (AMQP message size limits).
pub const OFFLOAD_THRESHOLD_BYTES: usize = 64 * 1024;

/// Writes `value` to `dir` if it's larger than [`OFFLOAD_THRESHOLD_BYTES`]
/// and rewrites `envelope.contents` to reference it; otherwise inlines it.
pub fn save_message(envelope: &mut Envelope, value: serde_json::Value, dir: &Path) -> Result<(), BusError> {
    let encoded = serde_json::to_vec(&value)?;
    if encoded.len() <= OFFLOAD_THRESHOLD_BYTES {
        envelope.contents = Some(Contents::inline(value));
        return Ok(());
    }

    std::fs::create_dir_all(dir)?;
    let digest = Sha256::digest(&encoded);
    let file_name = format!("{:x}.json", digest);
    let path = dir.join(&file_name);
    std::fs::write(&path, &encoded)?;

    envelope.contents = Some(Contents::Offline(gobw_core::OfflineRef {
        offline_path: path.to_string_lossy().into_owned(),
    }));
    Ok(())
}

/// Resolves `envelope.contents`, reading the side file if it was offloaded.
/// Transparent to callers: they always get the JSON value back, never the
/// reference (spec.md "honour the offline-contents protocol").
pub fn load_message(envelope: &Envelope) -> Result<Option<serde_json::Value>, BusError> {
    match &envelope.contents {
        None => Ok(None),
        Some(Contents::Inline(value)) => Ok(Some(value.clone())),
        Some(Contents::Offline(offline_ref)) => {
            let bytes = std::fs::read(PathBuf::from(&offline_ref.offline_path))?;
            Ok(Some(serde_json::from_slice(&bytes)?))
        }
    }
}

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;
