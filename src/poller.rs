// This file is part of the terraform-provider-meshstack project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wait for building block runs to settle
//!
//! The [`Poller`] only re-fetches the building block: the status is always
//! the one reported by meshStack.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::building_block::{BuildingBlock, BuildingBlockReader, BuildingBlockStatus};
use crate::client::ClientError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Errors raised while waiting on a building block
///
/// Every variant but [`PollError::Fetch`] without prior fetch carries the
/// last building block observed, which must still be written into the state.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("building block {uuid} failed")]
    Failed {
        uuid: String,
        building_block: Box<BuildingBlock>,
    },
    #[error("building block {uuid} disappeared while waiting for its completion")]
    Vanished {
        uuid: String,
        last_known: Option<Box<BuildingBlock>>,
    },
    #[error("waiting for building block {uuid} was cancelled")]
    Cancelled {
        uuid: String,
        last_known: Option<Box<BuildingBlock>>,
    },
    #[error("building block {uuid} did not settle within {timeout:?}")]
    DeadlineExceeded {
        uuid: String,
        timeout: Duration,
        last_known: Option<Box<BuildingBlock>>,
    },
    #[error("could not read building block {uuid}: {source}")]
    Fetch {
        uuid: String,
        #[source]
        source: ClientError,
        last_known: Option<Box<BuildingBlock>>,
    },
}

impl PollError {
    /// Last building block fetched before the error, if any
    pub fn last_known(&self) -> Option<&BuildingBlock> {
        match self {
            PollError::Failed { building_block, .. } => Some(building_block),
            PollError::Vanished { last_known, .. }
            | PollError::Cancelled { last_known, .. }
            | PollError::DeadlineExceeded { last_known, .. }
            | PollError::Fetch { last_known, .. } => last_known.as_deref(),
        }
    }

    /// Take the last building block fetched before the error, if any
    pub fn into_last_known(self) -> Option<BuildingBlock> {
        match self {
            PollError::Failed { building_block, .. } => Some(*building_block),
            PollError::Vanished { last_known, .. }
            | PollError::Cancelled { last_known, .. }
            | PollError::DeadlineExceeded { last_known, .. }
            | PollError::Fetch { last_known, .. } => last_known.map(|bb| *bb),
        }
    }
}

/// Why a pause between two polls was cut short
enum Interrupt {
    Cancelled,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    /// Time between two reads
    pub interval: Duration,
    /// Time after which the poller gives up
    pub timeout: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl Poller {
    /// Poll until the building block run is either `SUCCEEDED` or `FAILED`
    pub async fn poll_until_completion<R>(
        &self,
        reader: &R,
        uuid: &str,
        cancel: &CancellationToken,
    ) -> Result<BuildingBlock, PollError>
    where
        R: BuildingBlockReader + ?Sized,
    {
        let deadline = Instant::now() + self.timeout;
        let mut last_known: Option<Box<BuildingBlock>> = None;

        loop {
            match reader.read_building_block(uuid).await {
                Ok(Some(building_block)) => {
                    let status = &building_block.status.status;
                    debug!(uuid, %status, "polled building block");
                    match status {
                        BuildingBlockStatus::Succeeded => {
                            info!(uuid, "building block succeeded");
                            return Ok(building_block);
                        }
                        BuildingBlockStatus::Failed => {
                            warn!(uuid, "building block failed");
                            return Err(PollError::Failed {
                                uuid: uuid.to_owned(),
                                building_block: Box::new(building_block),
                            });
                        }
                        _ => last_known = Some(Box::new(building_block)),
                    }
                }
                Ok(None) => {
                    return Err(PollError::Vanished {
                        uuid: uuid.to_owned(),
                        last_known,
                    })
                }
                Err(source) => {
                    return Err(PollError::Fetch {
                        uuid: uuid.to_owned(),
                        source,
                        last_known,
                    })
                }
            }

            if let Err(interrupt) = self.pause(cancel, deadline).await {
                return Err(self.interrupted(interrupt, uuid, last_known));
            }
        }
    }

    /// Poll until the building block cannot be found anymore
    pub async fn poll_until_deletion<R>(
        &self,
        reader: &R,
        uuid: &str,
        cancel: &CancellationToken,
    ) -> Result<(), PollError>
    where
        R: BuildingBlockReader + ?Sized,
    {
        let deadline = Instant::now() + self.timeout;
        let mut last_known: Option<Box<BuildingBlock>> = None;

        loop {
            match reader.read_building_block(uuid).await {
                Ok(None) => {
                    info!(uuid, "building block deleted");
                    return Ok(());
                }
                Ok(Some(building_block)) => {
                    debug!(uuid, status = %building_block.status.status, "building block still exists");
                    last_known = Some(Box::new(building_block));
                }
                Err(source) => {
                    return Err(PollError::Fetch {
                        uuid: uuid.to_owned(),
                        source,
                        last_known,
                    })
                }
            }

            if let Err(interrupt) = self.pause(cancel, deadline).await {
                return Err(self.interrupted(interrupt, uuid, last_known));
            }
        }
    }

    /// Wait for the next poll
    async fn pause(&self, cancel: &CancellationToken, deadline: Instant) -> Result<(), Interrupt> {
        if cancel.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(Interrupt::Deadline);
        }
        let wake_up = (now + self.interval).min(deadline);
        tokio::select! {
            _ = cancel.cancelled() => Err(Interrupt::Cancelled),
            _ = sleep_until(wake_up) => {
                if wake_up >= deadline {
                    Err(Interrupt::Deadline)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn interrupted(
        &self,
        interrupt: Interrupt,
        uuid: &str,
        last_known: Option<Box<BuildingBlock>>,
    ) -> PollError {
        let uuid = uuid.to_owned();
        match interrupt {
            Interrupt::Cancelled => PollError::Cancelled { uuid, last_known },
            Interrupt::Deadline => PollError::DeadlineExceeded {
                uuid,
                timeout: self.timeout,
                last_known,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::{Method, StatusCode};

    use super::*;
    use crate::client::building_block::{
        BuildingBlockMetadata, BuildingBlockRunStatus, BuildingBlockSpec,
    };

    pub(crate) fn building_block(uuid: &str, status: BuildingBlockStatus) -> BuildingBlock {
        BuildingBlock {
            api_version: "v2-preview".to_owned(),
            kind: "meshBuildingBlock".to_owned(),
            metadata: BuildingBlockMetadata {
                uuid: uuid.to_owned(),
                ..Default::default()
            },
            spec: BuildingBlockSpec::default(),
            status: BuildingBlockRunStatus {
                status,
                outputs: vec![],
                force_purge: false,
            },
        }
    }

    pub(crate) fn server_error() -> ClientError {
        ClientError::Status {
            method: Method::GET,
            url: "https://meshstack.example.com".to_owned(),
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
    }

    type Reply = Result<Option<BuildingBlock>, ClientError>;

    /// Reader replaying scripted replies, the last one forever
    #[derive(Default)]
    pub(crate) struct ScriptedReader {
        replies: Mutex<VecDeque<Reply>>,
        reads: Mutex<usize>,
        /// Cancel this token when serving the read with that index
        cancel_on: Option<(usize, CancellationToken)>,
    }

    impl ScriptedReader {
        pub(crate) fn new<I: IntoIterator<Item = Reply>>(replies: I) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                ..Default::default()
            }
        }

        pub(crate) fn reads(&self) -> usize {
            *self.reads.lock().unwrap()
        }
    }

    #[async_trait]
    impl BuildingBlockReader for ScriptedReader {
        async fn read_building_block(
            &self,
            _uuid: &str,
        ) -> Result<Option<BuildingBlock>, ClientError> {
            let index = {
                let mut reads = self.reads.lock().unwrap();
                *reads += 1;
                *reads - 1
            };
            if let Some((cancel_index, token)) = &self.cancel_on {
                if *cancel_index == index {
                    token.cancel();
                }
            }
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                match replies.front() {
                    Some(Ok(reply)) => Ok(reply.clone()),
                    Some(Err(_)) | None => Err(server_error()),
                }
            }
        }
    }

    fn poller() -> Poller {
        Poller {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completion_waits_for_success() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block("bb", BuildingBlockStatus::Pending))),
            Ok(Some(building_block("bb", BuildingBlockStatus::Succeeded))),
        ]);
        let started = Instant::now();

        let result = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.status.status, BuildingBlockStatus::Succeeded);
        assert_eq!(reader.reads(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_goes_through_every_waiting_status() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block(
                "bb",
                BuildingBlockStatus::WaitingForDependentInput,
            ))),
            Ok(Some(building_block(
                "bb",
                BuildingBlockStatus::WaitingForOperatorInput,
            ))),
            Ok(Some(building_block("bb", BuildingBlockStatus::Pending))),
            Ok(Some(building_block("bb", BuildingBlockStatus::InProgress))),
            Ok(Some(building_block("bb", BuildingBlockStatus::Succeeded))),
        ]);

        let result = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await;

        assert!(result.is_ok());
        assert_eq!(reader.reads(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_is_an_error_carrying_the_building_block() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block("bb", BuildingBlockStatus::InProgress))),
            Ok(Some(building_block("bb", BuildingBlockStatus::Failed))),
        ]);

        let err = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Failed { .. }));
        assert_eq!(
            err.last_known().map(|bb| &bb.status.status),
            Some(&BuildingBlockStatus::Failed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_returns_the_last_observed_state() {
        let cancel = CancellationToken::new();
        let reader = ScriptedReader {
            cancel_on: Some((1, cancel.clone())),
            ..ScriptedReader::new([
                Ok(Some(building_block("bb", BuildingBlockStatus::Pending))),
                Ok(Some(building_block("bb", BuildingBlockStatus::InProgress))),
                Ok(Some(building_block("bb", BuildingBlockStatus::Succeeded))),
            ])
        };

        let err = poller()
            .poll_until_completion(&reader, "bb", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { .. }));
        assert_eq!(reader.reads(), 2);
        assert_eq!(
            err.into_last_known().map(|bb| bb.status.status),
            Some(BuildingBlockStatus::InProgress)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_polling() {
        let reader = ScriptedReader::new([Ok(Some(building_block(
            "bb",
            BuildingBlockStatus::WaitingForOperatorInput,
        )))]);
        let started = Instant::now();

        let err = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::DeadlineExceeded { .. }));
        assert_eq!(started.elapsed(), Duration::from_secs(60));
        // 0s, 5s, ..., 55s
        assert_eq!(reader.reads(), 12);
        assert!(err.last_known().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_keep_the_last_good_state() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block("bb", BuildingBlockStatus::InProgress))),
            Err(server_error()),
        ]);

        let err = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Fetch { .. }));
        assert_eq!(
            err.last_known().map(|bb| &bb.status.status),
            Some(&BuildingBlockStatus::InProgress)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_error_has_no_state() {
        let reader = ScriptedReader::new([Err(server_error())]);

        let err = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Fetch { .. }));
        assert!(err.last_known().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn vanishing_during_completion_is_an_error() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block("bb", BuildingBlockStatus::Pending))),
            Ok(None),
        ]);

        let err = poller()
            .poll_until_completion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Vanished { .. }));
        assert!(err.last_known().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_waits_until_not_found() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block("bb", BuildingBlockStatus::InProgress))),
            Ok(None),
        ]);

        poller()
            .poll_until_deletion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reader.reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_reports_fetch_errors() {
        let reader = ScriptedReader::new([
            Ok(Some(building_block("bb", BuildingBlockStatus::InProgress))),
            Err(server_error()),
        ]);

        let err = poller()
            .poll_until_deletion(&reader, "bb", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PollError::Fetch {
                source: ClientError::Status { .. },
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_can_be_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let reader = ScriptedReader::new([Ok(Some(building_block(
            "bb",
            BuildingBlockStatus::InProgress,
        )))]);

        let err = poller()
            .poll_until_deletion(&reader, "bb", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { .. }));
        assert_eq!(reader.reads(), 1);
    }
}
