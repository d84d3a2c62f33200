// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("amqp error: {0}")]
    Amqp(#[from] lapin::Error),
    #[error("offline contents I/O error: {0}")]
    OfflineContents(#[from] std::io::Error),
    #[error("failed to (de)serialize envelope: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("delivery had no offline directory configured")]
    NoOfflineDir,
}
