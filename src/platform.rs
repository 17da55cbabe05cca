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

//! `meshstack_platform` data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::{map, AttributePath, DataSource, Diagnostics};
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueString};

use crate::client::platform::Platform;
use crate::client::SharedClient;
use crate::utils::{
    optional_string_value, report, required_str, required_value, string_attribute, string_list,
    string_value, WithSchema,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct State<'a> {
    #[serde(borrow = "'a")]
    pub metadata: Value<StateMetadata<'a>>,
    pub spec: Value<StateSpec<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateMetadata<'a> {
    #[serde(borrow = "'a")]
    pub uuid: ValueString<'a>,
    pub name: ValueString<'a>,
    pub owned_by_workspace: ValueString<'a>,
    pub created_on: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSpec<'a> {
    #[serde(borrow = "'a")]
    pub display_name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub endpoint: ValueString<'a>,
    pub support_url: ValueString<'a>,
    pub documentation_url: ValueString<'a>,
    pub location: ValueString<'a>,
    pub contributing_workspaces: ValueList<ValueString<'a>>,
    pub availability: Value<StateAvailability<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateAvailability<'a> {
    #[serde(borrow = "'a")]
    pub restriction: ValueString<'a>,
    pub publication_state: ValueString<'a>,
    pub restricted_to_workspaces: ValueList<ValueString<'a>>,
}

impl<'a> State<'a> {
    pub fn from_remote(platform: &Platform) -> Self {
        let spec = &platform.spec;
        Self {
            metadata: Value::Value(StateMetadata {
                uuid: string_value(&platform.metadata.uuid),
                name: string_value(&platform.metadata.name),
                owned_by_workspace: string_value(&platform.metadata.owned_by_workspace),
                created_on: optional_string_value(platform.metadata.created_on.as_deref()),
            }),
            spec: Value::Value(StateSpec {
                display_name: string_value(&spec.display_name),
                description: string_value(&spec.description),
                endpoint: string_value(&spec.endpoint),
                support_url: optional_string_value(spec.support_url.as_deref()),
                documentation_url: optional_string_value(spec.documentation_url.as_deref()),
                location: string_value(&spec.location_ref.name),
                contributing_workspaces: string_list(spec.contributing_workspaces.iter().cloned()),
                availability: Value::Value(StateAvailability {
                    restriction: string_value(&spec.availability.restriction),
                    publication_state: string_value(&spec.availability.publication_state),
                    restricted_to_workspaces: string_list(
                        spec.availability.restricted_to_workspaces.iter().cloned(),
                    ),
                }),
            }),
        }
    }
}

fn computed(description: &str) -> Attribute {
    string_attribute(description, AttributeConstraint::Computed)
}

fn computed_list(description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::List(AttributeType::String.into()),
        description: Description::plain(description),
        constraint: AttributeConstraint::Computed,
        ..Default::default()
    }
}

impl<'a> WithSchema for State<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "metadata" => Attribute {
                        attr_type: AttributeType::AttributeSingle(map! {
                            "uuid" => string_attribute(
                                "UUID of the platform",
                                AttributeConstraint::Required,
                            ),
                            "name" => computed("Identifier of the platform"),
                            "owned_by_workspace" => computed("Workspace operating the platform"),
                            "created_on" => computed("Creation date"),
                        }),
                        description: Description::plain("Metadata of the platform"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "spec" => Attribute {
                        attr_type: AttributeType::AttributeSingle(map! {
                            "display_name" => computed("Display name of the platform"),
                            "description" => computed("Description of the platform"),
                            "endpoint" => computed("Endpoint of the platform"),
                            "support_url" => computed("Support page of the platform"),
                            "documentation_url" => computed("Documentation of the platform"),
                            "location" => computed("Location the platform belongs to"),
                            "contributing_workspaces" => computed_list(
                                "Workspaces allowed to contribute to the platform",
                            ),
                            "availability" => Attribute {
                                attr_type: AttributeType::AttributeSingle(map! {
                                    "restriction" => computed("Who can use the platform"),
                                    "publication_state" => computed(
                                        "Publication state in the marketplace",
                                    ),
                                    "restricted_to_workspaces" => computed_list(
                                        "Workspaces the platform is restricted to",
                                    ),
                                }),
                                description: Description::plain("Availability of the platform"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("Specification of the platform"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                blocks: Default::default(),
                description: Description::plain("Read an existing meshStack platform"),
                deprecated: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDataSource {
    client: SharedClient,
}

impl PlatformDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for PlatformDataSource {
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
        let metadata = required_value(diags, &config.metadata, AttributePath::new("metadata"))?;
        let uuid_path = AttributePath::new("metadata").attribute("uuid");
        let uuid = required_str(diags, &metadata.uuid, uuid_path.clone())?;

        match client.read_platform(uuid).await {
            Ok(Some(platform)) => Some(State::from_remote(&platform)),
            Ok(None) => {
                diags.error(
                    "Platform not found",
                    format!("No platform has uuid `{uuid}`"),
                    uuid_path,
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to read platform", err);
                None
            }
        }
    }
}
