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

use async_trait::async_trait;
use tracing::{info, warn};

use tf_provider::{AttributePath, Diagnostics, Resource};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};

use crate::client::SharedClient;
use crate::utils::{report, WithSchema};

use super::state::{ResourceSchema, State};

#[derive(Debug, Clone)]
pub struct WorkspaceResource {
    client: SharedClient,
}

impl WorkspaceResource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

/// Plan the computed attributes of a workspace
pub(crate) fn plan<'a>(
    prior: Option<&State<'a>>,
    proposed: State<'a>,
) -> (State<'a>, Vec<AttributePath>) {
    let mut state = proposed;
    let mut trigger_replace = Vec::new();

    let prior_metadata = prior.and_then(|prior| prior.metadata.as_ref_option());
    if let Value::Value(metadata) = &mut state.metadata {
        match prior_metadata {
            Some(prior_metadata) if prior_metadata.name == metadata.name => {
                metadata.created_on = prior_metadata.created_on.clone();
                metadata.deleted_on = prior_metadata.deleted_on.clone();
            }
            _ => {
                if prior_metadata.is_some() {
                    trigger_replace.push(AttributePath::new("metadata").attribute("name"));
                }
                metadata.created_on = Value::Unknown;
                metadata.deleted_on = Value::Unknown;
            }
        }
        if metadata.tags.is_null() {
            metadata.tags = Value::Unknown;
        }
    }

    (state, trigger_replace)
}

#[async_trait]
impl Resource for WorkspaceResource {
    type State<'a> = State<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ResourceSchema::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let Some(name) = state.name() else {
            diags.root_error_short("Workspace state has no name");
            return None;
        };
        match client.read_workspace(name).await {
            Ok(Some(workspace)) => Some((State::from_remote(&workspace), private_state)),
            Ok(None) => {
                warn!(name, "workspace was deleted outside of terraform");
                None
            }
            Err(err) => {
                report(diags, "Failed to read workspace", err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (state, _) = plan(None, proposed_state);
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let (state, trigger_replace) = plan(Some(&prior_state), proposed_state);
        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let workspace = planned_state.to_remote(diags)?;
        match client.create_workspace(&workspace).await {
            Ok(workspace) => {
                info!(name = %workspace.metadata.name, "workspace created");
                Some((State::from_remote(&workspace), planned_private_state))
            }
            Err(err) => {
                report(diags, "Failed to create workspace", err);
                None
            }
        }
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let workspace = planned_state.to_remote(diags)?;
        match client.update_workspace(&workspace).await {
            Ok(workspace) => Some((State::from_remote(&workspace), planned_private_state)),
            Err(err) => {
                report(diags, "Failed to update workspace", err);
                None
            }
        }
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags)?;
        let Some(name) = prior_state.name() else {
            diags.root_error_short("Workspace state has no name");
            return None;
        };
        match client.delete_workspace(name).await {
            Ok(()) => {
                info!(name, "workspace deleted");
                Some(())
            }
            Err(err) => {
                report(diags, "Failed to delete workspace", err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        match client.read_workspace(&id).await {
            Ok(Some(workspace)) => Some((State::from_remote(&workspace), Default::default())),
            Ok(None) => {
                diags.root_error(
                    "Workspace not found",
                    format!("No workspace is named `{id}`"),
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to import workspace", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::string_value;

    use super::super::state::{StateMetadata, StateSpec};
    use super::*;

    fn state(name: &str) -> State<'static> {
        State {
            metadata: Value::Value(StateMetadata {
                name: string_value(name),
                created_on: string_value("2024-01-01T00:00:00Z"),
                ..Default::default()
            }),
            spec: Value::Value(StateSpec {
                display_name: string_value("Platform"),
            }),
        }
    }

    #[test]
    fn created_workspaces_have_unknown_computed_values() {
        let mut proposed = state("platform");
        if let Value::Value(metadata) = &mut proposed.metadata {
            metadata.created_on = Value::Null;
        }

        let (state, trigger_replace) = plan(None, proposed);
        let metadata = state.metadata.as_ref_option().unwrap();

        assert!(trigger_replace.is_empty());
        assert!(metadata.created_on.is_unknown());
        assert!(metadata.tags.is_unknown());
    }

    #[test]
    fn renamed_workspaces_are_replaced() {
        let (state, trigger_replace) = plan(Some(&state("platform")), state("other"));

        assert_eq!(
            trigger_replace,
            [AttributePath::new("metadata").attribute("name")]
        );
        assert!(state.metadata.as_ref_option().unwrap().created_on.is_unknown());
    }

    #[test]
    fn display_name_changes_are_updated_in_place() {
        let mut proposed = state("platform");
        proposed.spec = Value::Value(StateSpec {
            display_name: string_value("Renamed"),
        });
        if let Value::Value(metadata) = &mut proposed.metadata {
            metadata.created_on = Value::Unknown;
        }

        let (state, trigger_replace) = plan(Some(&state("platform")), proposed);

        assert!(trigger_replace.is_empty());
        assert_eq!(
            state.metadata.as_ref_option().unwrap().created_on,
            string_value("2024-01-01T00:00:00Z")
        );
    }
}
