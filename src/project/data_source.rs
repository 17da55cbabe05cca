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

use tf_provider::{AttributePath, DataSource, Diagnostics};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};

use crate::client::project::project_identifier;
use crate::client::SharedClient;
use crate::utils::{report, required_str, required_value, WithSchema};

use super::state::{DataSourceSchema, ListState, State};

#[derive(Debug, Clone)]
pub struct ProjectDataSource {
    client: SharedClient,
}

impl ProjectDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ProjectDataSource {
    type State<'a> = State<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(DataSourceSchema::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let metadata_path = AttributePath::new("metadata");
        let metadata = required_value(diags, &config.metadata, metadata_path.clone())?;
        let name = required_str(diags, &metadata.name, metadata_path.clone().attribute("name"));
        let workspace = required_str(
            diags,
            &metadata.owned_by_workspace,
            metadata_path.clone().attribute("owned_by_workspace"),
        );
        let (workspace, name) = (workspace?, name?);

        match client.read_project(workspace, name).await {
            Ok(Some(project)) => Some(State::from_remote(&project)),
            Ok(None) => {
                diags.error(
                    "Project not found",
                    format!(
                        "No project is identified by `{}`",
                        project_identifier(workspace, name)
                    ),
                    metadata_path,
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to read project", err);
                None
            }
        }
    }
}

/// `meshstack_projects`: every project of a workspace
#[derive(Debug, Clone)]
pub struct ProjectsDataSource {
    client: SharedClient,
}

impl ProjectsDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ProjectsDataSource {
    type State<'a> = ListState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ListState::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let workspace = required_str(
            diags,
            &config.workspace_identifier,
            AttributePath::new("workspace_identifier"),
        )?;

        match client.list_projects(workspace).await {
            Ok(projects) => Some(ListState {
                projects: Value::Value(
                    projects
                        .iter()
                        .map(|project| Value::Value(State::from_remote(project)))
                        .collect(),
                ),
                ..config
            }),
            Err(err) => {
                report(diags, "Failed to list projects", err);
                None
            }
        }
    }
}
