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

use crate::client::project::{parse_project_identifier, project_identifier};
use crate::client::SharedClient;
use crate::utils::{report, WithSchema};

use super::state::{ResourceSchema, State};

#[derive(Debug, Clone)]
pub struct ProjectResource {
    client: SharedClient,
}

impl ProjectResource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

/// Plan the computed attributes of a project
///
/// The name and the owning workspace identify the project: changing them replaces it.
pub(crate) fn plan<'a>(
    prior: Option<&State<'a>>,
    proposed: State<'a>,
) -> (State<'a>, Vec<AttributePath>) {
    let mut state = proposed;
    let mut trigger_replace = Vec::new();

    let prior_metadata = prior.and_then(|prior| prior.metadata.as_ref_option());
    if let Value::Value(metadata) = &mut state.metadata {
        if let Some(prior_metadata) = prior_metadata {
            if prior_metadata.name != metadata.name {
                trigger_replace.push(AttributePath::new("metadata").attribute("name"));
            }
            if prior_metadata.owned_by_workspace != metadata.owned_by_workspace {
                trigger_replace
                    .push(AttributePath::new("metadata").attribute("owned_by_workspace"));
            }
        }
        match prior_metadata {
            Some(prior_metadata) if trigger_replace.is_empty() => {
                metadata.created_on = prior_metadata.created_on.clone();
                metadata.deleted_on = prior_metadata.deleted_on.clone();
            }
            _ => {
                metadata.created_on = Value::Unknown;
                metadata.deleted_on = Value::Unknown;
            }
        }
    }
    if let Value::Value(spec) = &mut state.spec {
        if spec.tags.is_null() {
            spec.tags = Value::Unknown;
        }
    }

    (state, trigger_replace)
}

#[async_trait]
impl Resource for ProjectResource {
    type State<'a> = State<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ResourceSchema::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Some((workspace, name)) = config.identifier() {
            if workspace.contains('.') || name.contains('.') {
                diags.error(
                    "Invalid project identifier",
                    "Workspace and project names cannot contain `.`",
                    AttributePath::new("metadata"),
                );
                return None;
            }
        }
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
        let Some((workspace, name)) = state.identifier() else {
            diags.root_error_short("Project state has no identifier");
            return None;
        };
        match client.read_project(workspace, name).await {
            Ok(Some(project)) => Some((State::from_remote(&project), private_state)),
            Ok(None) => {
                warn!(workspace, name, "project was deleted outside of terraform");
                None
            }
            Err(err) => {
                report(diags, "Failed to read project", err);
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
        let project = planned_state.to_remote(diags)?;
        match client.create_project(&project).await {
            Ok(project) => {
                info!(project = %project.identifier(), "project created");
                Some((State::from_remote(&project), planned_private_state))
            }
            Err(err) => {
                report(diags, "Failed to create project", err);
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
        let project = planned_state.to_remote(diags)?;
        match client.update_project(&project).await {
            Ok(project) => Some((State::from_remote(&project), planned_private_state)),
            Err(err) => {
                report(diags, "Failed to update project", err);
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
        let Some((workspace, name)) = prior_state.identifier() else {
            diags.root_error_short("Project state has no identifier");
            return None;
        };
        match client.delete_project(workspace, name).await {
            Ok(()) => {
                info!(workspace, name, "project deleted");
                Some(())
            }
            Err(err) => {
                report(diags, "Failed to delete project", err);
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
        let Some((workspace, name)) = parse_project_identifier(&id) else {
            diags.root_error(
                "Invalid project identifier",
                format!("Expected `<workspace>.<name>`, got `{id}`"),
            );
            return None;
        };
        match client.read_project(workspace, name).await {
            Ok(Some(project)) => Some((State::from_remote(&project), Default::default())),
            Ok(None) => {
                diags.root_error(
                    "Project not found",
                    format!("No project is identified by `{}`", project_identifier(workspace, name)),
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to import project", err);
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

    fn state(workspace: &str, name: &str) -> State<'static> {
        State {
            metadata: Value::Value(StateMetadata {
                name: string_value(name),
                owned_by_workspace: string_value(workspace),
                created_on: string_value("2024-01-01T00:00:00Z"),
                deleted_on: Value::Null,
            }),
            spec: Value::Value(StateSpec {
                display_name: string_value("Development"),
                tags: Value::Value(Default::default()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn moving_a_project_replaces_it() {
        let (state, trigger_replace) = plan(
            Some(&state("platform", "dev")),
            state("other", "dev"),
        );

        assert_eq!(
            trigger_replace,
            [AttributePath::new("metadata").attribute("owned_by_workspace")]
        );
        assert!(state.metadata.as_ref_option().unwrap().created_on.is_unknown());
    }

    #[test]
    fn spec_changes_are_updated_in_place() {
        let mut proposed = state("platform", "dev");
        if let Value::Value(spec) = &mut proposed.spec {
            spec.payment_method_identifier = string_value("card");
        }

        let (state, trigger_replace) = plan(Some(&state("platform", "dev")), proposed);

        assert!(trigger_replace.is_empty());
        assert_eq!(
            state.metadata.as_ref_option().unwrap().created_on,
            string_value("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn unset_tags_are_computed() {
        let mut proposed = state("platform", "dev");
        if let Value::Value(spec) = &mut proposed.spec {
            spec.tags = Value::Null;
        }

        let (state, _) = plan(None, proposed);

        assert!(state.spec.as_ref_option().unwrap().tags.is_unknown());
    }
}
