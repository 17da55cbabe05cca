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

//! The meshStack provider
//!
//! Resources and data sources get a [`SharedClient`] when they are built,
//! and the client is set when Terraform configures the provider.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use tf_provider::{map, AttributePath, Diagnostics, DynamicDataSource, DynamicResource, Provider};
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::ValueEmpty;

use crate::binding::BindingResource;
use crate::building_block::{BuildingBlockDataSource, BuildingBlockResource};
use crate::client::binding::{
    ProjectGroupBinding, ProjectUserBinding, WorkspaceGroupBinding, WorkspaceUserBinding,
};
use crate::client::{validate_endpoint, MeshStackClient, SharedClient};
use crate::config::{env_lookup, ProviderConfig};
use crate::integration::IntegrationsDataSource;
use crate::platform::PlatformDataSource;
use crate::poller::Poller;
use crate::project::{ProjectDataSource, ProjectResource, ProjectsDataSource};
use crate::tag_definition::{
    TagDefinitionDataSource, TagDefinitionResource, TagDefinitionsDataSource,
};
use crate::tenant::{TenantDataSource, TenantResource};
use crate::utils::{known_str, report};
use crate::workspace::{WorkspaceDataSource, WorkspaceResource};

#[derive(Debug)]
pub struct MeshStackProvider {
    client: SharedClient,
    poller: Poller,
    /// Cancelled on interrupt or when the provider is dropped, interrupting pending polls
    cancel: CancellationToken,
}

impl MeshStackProvider {
    pub fn new(poller: Poller) -> Self {
        Self {
            client: SharedClient::default(),
            poller,
            cancel: CancellationToken::new(),
        }
    }

    /// Token shared by every resource waiting on meshStack
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Default for MeshStackProvider {
    fn default() -> Self {
        Self::new(Poller::default())
    }
}

impl Drop for MeshStackProvider {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl Provider for MeshStackProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "endpoint" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "URL of the meshStack API, defaults to $MESHSTACK_ENDPOINT",
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "apikey" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "API key used to log in, defaults to $MESHSTACK_API_KEY",
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "apisecret" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "Secret of the API key, defaults to $MESHSTACK_API_SECRET",
                        ),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                },
                blocks: Default::default(),
                description: Description::plain("Manage meshStack objects"),
                deprecated: false,
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        // The endpoint can only be checked here when it is set in the provider block
        if let Some(endpoint) = known_str(&config.endpoint) {
            if let Err(err) = validate_endpoint(endpoint) {
                diags.error(
                    "Invalid meshStack endpoint",
                    err.to_string(),
                    AttributePath::new("endpoint"),
                );
                return None;
            }
        }
        Some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let client_config = config.resolve(diags, env_lookup)?;
        let client = match MeshStackClient::new(client_config) {
            Ok(client) => client,
            Err(err) => {
                report(diags, "Failed to configure the meshStack client", err);
                return None;
            }
        };
        info!(
            endpoint = client.endpoint(),
            %terraform_version,
            "meshstack provider configured"
        );
        if !self.client.configure(client) {
            diags.root_warning(
                "Provider already configured",
                "The first configuration of the meshstack provider is kept",
            );
        }
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        let client = &self.client;
        Some(map! {
            "meshstack_building_block_v2" => BuildingBlockResource::new(
                client.clone(),
                self.poller,
                self.cancel.clone(),
            ),
            "meshstack_project" => ProjectResource::new(client.clone()),
            "meshstack_workspace" => WorkspaceResource::new(client.clone()),
            "meshstack_tenant" => TenantResource::new(client.clone()),
            "meshstack_tag_definition" => TagDefinitionResource::new(client.clone()),
            "meshstack_project_user_binding" =>
                BindingResource::<ProjectUserBinding>::new(client.clone()),
            "meshstack_project_group_binding" =>
                BindingResource::<ProjectGroupBinding>::new(client.clone()),
            "meshstack_workspace_user_binding" =>
                BindingResource::<WorkspaceUserBinding>::new(client.clone()),
            "meshstack_workspace_group_binding" =>
                BindingResource::<WorkspaceGroupBinding>::new(client.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        let client = &self.client;
        Some(map! {
            "meshstack_building_block_v2" => BuildingBlockDataSource::new(client.clone()),
            "meshstack_project" => ProjectDataSource::new(client.clone()),
            "meshstack_projects" => ProjectsDataSource::new(client.clone()),
            "meshstack_workspace" => WorkspaceDataSource::new(client.clone()),
            "meshstack_tenant" => TenantDataSource::new(client.clone()),
            "meshstack_tag_definition" => TagDefinitionDataSource::new(client.clone()),
            "meshstack_tag_definitions" => TagDefinitionsDataSource::new(client.clone()),
            "meshstack_platform" => PlatformDataSource::new(client.clone()),
            "meshstack_integrations" => IntegrationsDataSource::new(client.clone()),
        })
    }
}
