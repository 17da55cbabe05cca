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

//! `meshstack_integrations` data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::{map, DataSource, Diagnostics};
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueList, ValueString};

use crate::client::integration::Integration;
use crate::client::SharedClient;
use crate::utils::{
    known_str, optional_string_value, report, string_attribute, string_value, WithSchema,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct State<'a> {
    #[serde(borrow = "'a")]
    pub workspace_identifier: ValueString<'a>,
    pub integrations: ValueList<Value<StateIntegration<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateIntegration<'a> {
    #[serde(borrow = "'a")]
    pub uuid: ValueString<'a>,
    pub owned_by_workspace: ValueString<'a>,
    pub created_on: ValueString<'a>,
    pub display_name: ValueString<'a>,
    #[serde(rename = "type")]
    pub config_type: ValueString<'a>,
    /// Type specific settings, JSON encoded
    pub config: ValueString<'a>,
    pub is_built_in: ValueBool,
}

impl<'a> StateIntegration<'a> {
    pub fn from_remote(integration: &Integration) -> Self {
        let config = &integration.spec.config;
        Self {
            uuid: string_value(&integration.metadata.uuid),
            owned_by_workspace: string_value(&integration.metadata.owned_by_workspace),
            created_on: optional_string_value(integration.metadata.created_on.as_deref()),
            display_name: string_value(&integration.spec.display_name),
            config_type: string_value(&config.config_type),
            config: string_value(serde_json::Value::Object(config.settings.clone()).to_string()),
            is_built_in: Value::Value(integration.status.is_built_in),
        }
    }
}

pub(crate) fn select<'a>(
    integrations: &[Integration],
    workspace: Option<&str>,
) -> Vec<Value<StateIntegration<'a>>> {
    integrations
        .iter()
        .filter(|integration| {
            workspace.map_or(true, |workspace| {
                integration.metadata.owned_by_workspace == workspace
            })
        })
        .map(|integration| Value::Value(StateIntegration::from_remote(integration)))
        .collect()
}

impl<'a> WithSchema for State<'a> {
    fn schema() -> Schema {
        let computed = |description| string_attribute(description, AttributeConstraint::Computed);
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "workspace_identifier" => string_attribute(
                        "Only list the integrations of this workspace",
                        AttributeConstraint::Optional,
                    ),
                    "integrations" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "uuid" => computed("UUID of the integration"),
                            "owned_by_workspace" => computed("Workspace owning the integration"),
                            "created_on" => computed("Creation date"),
                            "display_name" => computed("Display name of the integration"),
                            "type" => computed("Type of the integration, like `github`"),
                            "config" => computed("Settings of the integration, JSON encoded"),
                            "is_built_in" => Attribute {
                                attr_type: AttributeType::Bool,
                                description: Description::plain(
                                    "Whether the integration is provided by meshStack",
                                ),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("Integrations"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                blocks: Default::default(),
                description: Description::plain("List the meshStack integrations"),
                deprecated: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegrationsDataSource {
    client: SharedClient,
}

impl IntegrationsDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for IntegrationsDataSource {
    type State<'a> = State<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(State::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;

        match client.list_integrations().await {
            Ok(integrations) => Some(State {
                integrations: Value::Value(select(
                    &integrations,
                    known_str(&config.workspace_identifier),
                )),
                ..config
            }),
            Err(err) => {
                report(diags, "Failed to list integrations", err);
                None
            }
        }
    }
}
