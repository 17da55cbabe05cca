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

//! Create, read and delete building blocks against a [`BuildingBlockApi`]

use tf_provider::{AttributePath, Diagnostics};
use tf_provider::value::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::building_block::BuildingBlockApi;
use crate::poller::Poller;
use crate::utils::{report, required_str};

use super::state::ResourceState;

/// Default of `wait_for_completion`
pub(crate) const WAIT_FOR_COMPLETION: bool = true;

pub(crate) fn wait_for_completion(state: &ResourceState<'_>) -> bool {
    state.wait_for_completion.unwrap_or(WAIT_FOR_COMPLETION)
}

/// Create the building block, then wait for its run if requested
///
/// Once the building block exists, a state is always returned, even when
/// waiting fails: the last building block observed is written in the state,
/// and the failure is reported as an error.
pub(crate) async fn create<'a, A>(
    api: &A,
    poller: &Poller,
    cancel: &CancellationToken,
    diags: &mut Diagnostics,
    planned: &ResourceState<'a>,
) -> Option<ResourceState<'a>>
where
    A: BuildingBlockApi + ?Sized,
{
    let Value::Value(spec) = &planned.spec else {
        diags.error_short("Building block spec must be known", AttributePath::new("spec"));
        return None;
    };
    let remote_spec = spec.to_remote(diags)?;

    let created = match api.create_building_block(&remote_spec).await {
        Ok(created) => created,
        Err(err) => {
            report(diags, "Failed to create building block", err);
            return None;
        }
    };
    let uuid = created.metadata.uuid.clone();
    info!(uuid, status = %created.status.status, "building block created");

    let wait = wait_for_completion(planned);
    let building_block = if wait {
        match poller.poll_until_completion(api, &uuid, cancel).await {
            Ok(building_block) => building_block,
            Err(err) => {
                warn!(uuid, error = %err, "building block did not complete");
                report(diags, "Building block did not complete", &err);
                err.into_last_known().unwrap_or(created)
            }
        }
    } else {
        created
    };

    ResourceState::from_remote(diags, &building_block, Value::Value(wait), Some(spec))
}

/// Refresh the state, `None` if the building block does not exist anymore
pub(crate) async fn read<'a, A>(
    api: &A,
    diags: &mut Diagnostics,
    state: &ResourceState<'a>,
) -> Option<ResourceState<'a>>
where
    A: BuildingBlockApi + ?Sized,
{
    let uuid = required_str(diags, &state.id, AttributePath::new("id"))?;
    match api.read_building_block(uuid).await {
        Ok(Some(building_block)) => ResourceState::from_remote(
            diags,
            &building_block,
            Value::Value(wait_for_completion(state)),
            state.spec.as_ref_option(),
        ),
        Ok(None) => {
            warn!(uuid, "building block not found, removing it from the state");
            None
        }
        Err(err) => {
            report(diags, "Failed to read building block", err);
            None
        }
    }
}

/// Import an existing building block by its uuid
pub(crate) async fn import<'a, A>(
    api: &A,
    diags: &mut Diagnostics,
    uuid: &str,
) -> Option<ResourceState<'a>>
where
    A: BuildingBlockApi + ?Sized,
{
    match api.read_building_block(uuid).await {
        Ok(Some(building_block)) => ResourceState::from_remote(
            diags,
            &building_block,
            Value::Value(WAIT_FOR_COMPLETION),
            None,
        ),
        Ok(None) => {
            diags.root_error("Building block not found", format!("No building block has uuid `{uuid}`"));
            None
        }
        Err(err) => {
            report(diags, "Failed to read building block", err);
            None
        }
    }
}

/// Delete the building block, then wait for it to disappear if requested
pub(crate) async fn destroy<A>(
    api: &A,
    poller: &Poller,
    cancel: &CancellationToken,
    diags: &mut Diagnostics,
    prior: &ResourceState<'_>,
) -> Option<()>
where
    A: BuildingBlockApi + ?Sized,
{
    let uuid = required_str(diags, &prior.id, AttributePath::new("id"))?;
    if let Err(err) = api.delete_building_block(uuid).await {
        report(diags, "Failed to delete building block", err);
        return None;
    }
    info!(uuid, "building block deletion requested");

    if wait_for_completion(prior) {
        if let Err(err) = poller.poll_until_deletion(api, uuid, cancel).await {
            report(diags, "Building block was not deleted", err);
            return None;
        }
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::building_block::convert::tests::configured_spec;
    use crate::client::building_block::{
        BuildingBlock, BuildingBlockReader, BuildingBlockSpec, BuildingBlockStatus,
    };
    use crate::client::ClientError;
    use crate::io_value::{InputValue, WireIo};
    use crate::poller::tests::{building_block, server_error, ScriptedReader};
    use crate::utils::string_value;

    use super::*;

    /// In-memory meshStack: creation returns `created`, reads follow `reader`
    struct FakeApi {
        created: BuildingBlock,
        reader: ScriptedReader,
        fail_create: bool,
        sent: Mutex<Vec<BuildingBlockSpec>>,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(created: BuildingBlock, reader: ScriptedReader) -> Self {
            Self {
                created,
                reader,
                fail_create: false,
                sent: Mutex::default(),
                deleted: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl BuildingBlockReader for FakeApi {
        async fn read_building_block(
            &self,
            uuid: &str,
        ) -> Result<Option<BuildingBlock>, ClientError> {
            self.reader.read_building_block(uuid).await
        }
    }

    #[async_trait]
    impl BuildingBlockApi for FakeApi {
        async fn create_building_block(
            &self,
            spec: &BuildingBlockSpec,
        ) -> Result<BuildingBlock, ClientError> {
            if self.fail_create {
                return Err(server_error());
            }
            self.sent.lock().unwrap().push(spec.clone());
            Ok(self.created.clone())
        }

        async fn delete_building_block(&self, uuid: &str) -> Result<(), ClientError> {
            self.deleted.lock().unwrap().push(uuid.to_owned());
            Ok(())
        }
    }

    fn poller() -> Poller {
        Poller {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }

    fn planned(wait_for_completion: Option<bool>) -> ResourceState<'static> {
        ResourceState {
            id: Value::Unknown,
            wait_for_completion: wait_for_completion.into(),
            metadata: Value::Unknown,
            spec: Value::Value(configured_spec()),
            status: Value::Unknown,
        }
    }

    fn with_outputs(mut building_block: BuildingBlock) -> BuildingBlock {
        building_block.status.outputs = vec![WireIo {
            key: "bucket".to_owned(),
            value: serde_json::Value::from("my-bucket"),
            value_type: "STRING".to_owned(),
        }];
        building_block
    }

    fn status_of(state: &ResourceState) -> String {
        state.status.as_ref_option().unwrap().status.to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn create_waits_for_success() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Pending),
            ScriptedReader::new([
                Ok(Some(building_block("bb-1", BuildingBlockStatus::InProgress))),
                Ok(Some(with_outputs(building_block(
                    "bb-1",
                    BuildingBlockStatus::Succeeded,
                )))),
            ]),
        );
        let mut diags = Diagnostics::default();

        let state = create(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &planned(None),
        )
        .await
        .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.id, string_value("bb-1"));
        assert_eq!(state.wait_for_completion, Value::Value(true));
        assert_eq!(status_of(&state), "SUCCEEDED");
        let outputs = state.status.as_ref_option().unwrap().outputs.as_ref_option().unwrap();
        assert_eq!(
            outputs["bucket"].as_ref_option().unwrap().value_string,
            string_value("my-bucket")
        );

        let sent = api.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].inputs.len(), 2);
        assert_eq!(sent[0].display_name, "bucket");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_runs_are_persisted_with_an_error() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Pending),
            ScriptedReader::new([Ok(Some(building_block(
                "bb-1",
                BuildingBlockStatus::Failed,
            )))]),
        );
        let mut diags = Diagnostics::default();

        let state = create(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &planned(Some(true)),
        )
        .await
        .unwrap();

        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "Building block did not complete");
        assert_eq!(status_of(&state), "FAILED");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_persist_the_created_building_block() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Pending),
            ScriptedReader::new([Err(server_error())]),
        );
        let mut diags = Diagnostics::default();

        let state = create(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &planned(Some(true)),
        )
        .await
        .unwrap();

        assert_eq!(diags.errors.len(), 1);
        assert_eq!(status_of(&state), "PENDING");
    }

    #[tokio::test(start_paused = true)]
    async fn create_without_waiting_returns_immediately() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Pending),
            ScriptedReader::default(),
        );
        let mut diags = Diagnostics::default();

        let state = create(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &planned(Some(false)),
        )
        .await
        .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(status_of(&state), "PENDING");
        assert_eq!(api.reader.reads(), 0);
    }

    #[tokio::test]
    async fn inputs_with_several_values_are_not_sent() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Pending),
            ScriptedReader::default(),
        );
        let mut planned = planned(None);
        if let Value::Value(spec) = &mut planned.spec {
            spec.inputs.as_mut_option().unwrap().insert(
                Cow::Borrowed("both"),
                Value::Value(InputValue {
                    value_bool: Value::Value(true),
                    value_string: string_value("intended"),
                    ..Default::default()
                }),
            );
        }
        let mut diags = Diagnostics::default();

        let state = create(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &planned,
        )
        .await;

        assert!(state.is_none());
        assert_eq!(diags.errors[0].summary, "Input has several values");
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("spec").attribute("inputs").key("both")
        );
        assert!(api.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_creations_have_no_state() {
        let mut api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Pending),
            ScriptedReader::default(),
        );
        api.fail_create = true;
        let mut diags = Diagnostics::default();

        let state = create(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &planned(None),
        )
        .await;

        assert!(state.is_none());
        assert_eq!(diags.errors[0].summary, "Failed to create building block");
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_waits_until_the_building_block_is_gone() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Succeeded),
            ScriptedReader::new([
                Ok(Some(building_block("bb-1", BuildingBlockStatus::InProgress))),
                Ok(None),
            ]),
        );
        let mut prior = planned(None);
        prior.id = string_value("bb-1");
        let mut diags = Diagnostics::default();

        let result = destroy(
            &api,
            &poller(),
            &CancellationToken::new(),
            &mut diags,
            &prior,
        )
        .await;

        assert_eq!(result, Some(()));
        assert!(diags.errors.is_empty());
        assert_eq!(*api.deleted.lock().unwrap(), ["bb-1"]);
        assert_eq!(api.reader.reads(), 2);
    }

    #[tokio::test]
    async fn missing_building_blocks_leave_the_state() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Succeeded),
            ScriptedReader::new([Ok(None)]),
        );
        let mut prior = planned(None);
        prior.id = string_value("bb-1");
        let mut diags = Diagnostics::default();

        assert!(read(&api, &mut diags, &prior).await.is_none());
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn import_reads_by_uuid() {
        let api = FakeApi::new(
            building_block("bb-1", BuildingBlockStatus::Succeeded),
            ScriptedReader::new([Ok(Some(building_block(
                "bb-1",
                BuildingBlockStatus::Succeeded,
            )))]),
        );
        let mut diags = Diagnostics::default();

        let state = import(&api, &mut diags, "bb-1").await.unwrap();

        assert_eq!(state.id, string_value("bb-1"));
        assert_eq!(state.wait_for_completion, Value::Value(true));
    }
}
