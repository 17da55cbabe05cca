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

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tf_provider::{map, AttributePath, Diagnostics};
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};

use crate::client::tenant::{Quota, Tenant, TenantSpec};
use crate::utils::{
    known_str, optional_string_value, required_str, required_value, string_attribute,
    string_value, tags_attribute, tags_to_state, with_constraint, TagsValue, WithSchema,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct State<'a> {
    #[serde(borrow = "'a")]
    pub metadata: Value<StateMetadata<'a>>,
    pub spec: Value<StateSpec<'a>>,
    pub status: Value<StateStatus<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateMetadata<'a> {
    #[serde(borrow = "'a")]
    pub uuid: ValueString<'a>,
    pub owned_by_workspace: ValueString<'a>,
    pub owned_by_project: ValueString<'a>,
    pub created_on: ValueString<'a>,
    pub marked_for_deletion_on: ValueString<'a>,
    pub deleted_on: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSpec<'a> {
    #[serde(borrow = "'a")]
    pub platform_identifier: ValueString<'a>,
    pub local_id: ValueString<'a>,
    pub landing_zone_identifier: ValueString<'a>,
    pub quotas: ValueList<Value<StateQuota<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateQuota<'a> {
    #[serde(borrow = "'a")]
    pub key: ValueString<'a>,
    pub value: ValueNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateStatus<'a> {
    #[serde(borrow = "'a")]
    pub tenant_name: ValueString<'a>,
    pub platform_type_identifier: ValueString<'a>,
    pub platform_workspace_identifier: ValueString<'a>,
    pub tags: TagsValue<'a>,
}

/// Tenant creation request extracted from a state
#[derive(Debug, Clone, PartialEq)]
pub struct TenantRequest {
    pub workspace: String,
    pub project: String,
    pub spec: TenantSpec,
}

impl<'a> State<'a> {
    pub fn uuid(&self) -> Option<&str> {
        known_str(&self.metadata.as_ref_option()?.uuid)
    }

    pub fn from_remote(tenant: &Tenant) -> Self {
        Self {
            metadata: Value::Value(StateMetadata {
                uuid: string_value(&tenant.metadata.uuid),
                owned_by_workspace: string_value(&tenant.metadata.owned_by_workspace),
                owned_by_project: string_value(&tenant.metadata.owned_by_project),
                created_on: optional_string_value(tenant.metadata.created_on.as_deref()),
                marked_for_deletion_on: optional_string_value(
                    tenant.metadata.marked_for_deletion_on.as_deref(),
                ),
                deleted_on: optional_string_value(tenant.metadata.deleted_on.as_deref()),
            }),
            spec: Value::Value(StateSpec {
                platform_identifier: string_value(&tenant.spec.platform_identifier),
                local_id: optional_string_value(tenant.spec.local_id.as_deref()),
                landing_zone_identifier: optional_string_value(
                    tenant.spec.landing_zone_identifier.as_deref(),
                ),
                quotas: Value::Value(
                    tenant
                        .spec
                        .quotas
                        .iter()
                        .map(|quota| {
                            Value::Value(StateQuota {
                                key: string_value(&quota.key),
                                value: Value::Value(quota.value),
                            })
                        })
                        .collect(),
                ),
            }),
            status: Value::Value(StateStatus {
                tenant_name: string_value(&tenant.status.tenant_name),
                platform_type_identifier: string_value(&tenant.status.platform_type_identifier),
                platform_workspace_identifier: optional_string_value(
                    tenant.status.platform_workspace_identifier.as_deref(),
                ),
                tags: tags_to_state(&tenant.status.tags),
            }),
        }
    }

    pub fn to_remote(&self, diags: &mut Diagnostics) -> Option<TenantRequest> {
        let metadata_path = AttributePath::new("metadata");
        let spec_path = AttributePath::new("spec");
        let metadata = required_value(diags, &self.metadata, metadata_path.clone())?;
        let spec = required_value(diags, &self.spec, spec_path.clone())?;
        let workspace = required_str(
            diags,
            &metadata.owned_by_workspace,
            metadata_path.clone().attribute("owned_by_workspace"),
        );
        let project = required_str(
            diags,
            &metadata.owned_by_project,
            metadata_path.attribute("owned_by_project"),
        );
        let platform = required_str(
            diags,
            &spec.platform_identifier,
            spec_path.clone().attribute("platform_identifier"),
        );

        let mut quotas = Vec::new();
        for (index, quota) in spec.quotas.iter().flatten().enumerate() {
            let quota_path = spec_path.clone().attribute("quotas").index(index as i64);
            let Some(quota) = required_value(diags, quota, quota_path.clone()) else {
                continue;
            };
            let key = required_str(diags, &quota.key, quota_path.clone().attribute("key"));
            let value = required_value(diags, &quota.value, quota_path.attribute("value"));
            if let (Some(key), Some(value)) = (key, value) {
                quotas.push(Quota {
                    key: key.to_owned(),
                    value: *value,
                });
            }
        }

        let request = TenantRequest {
            workspace: workspace?.to_owned(),
            project: project?.to_owned(),
            spec: TenantSpec {
                platform_identifier: platform?.to_owned(),
                local_id: known_str(&spec.local_id).map(str::to_owned),
                landing_zone_identifier: known_str(&spec.landing_zone_identifier)
                    .map(str::to_owned),
                quotas,
            },
        };
        if diags.errors.is_empty() {
            Some(request)
        } else {
            None
        }
    }
}

fn metadata_attributes() -> HashMap<String, Attribute> {
    map! {
        "uuid" => string_attribute("UUID of the tenant", AttributeConstraint::Computed),
        "owned_by_workspace" => string_attribute(
            "Workspace owning the tenant",
            AttributeConstraint::Required,
        ),
        "owned_by_project" => string_attribute(
            "Project owning the tenant",
            AttributeConstraint::Required,
        ),
        "created_on" => string_attribute("Creation date", AttributeConstraint::Computed),
        "marked_for_deletion_on" => string_attribute(
            "Date the deletion was requested",
            AttributeConstraint::Computed,
        ),
        "deleted_on" => string_attribute("Deletion date", AttributeConstraint::Computed),
    }
}

fn spec_attributes() -> HashMap<String, Attribute> {
    map! {
        "platform_identifier" => string_attribute(
            "Platform of the tenant, as `<platform>.<location>`",
            AttributeConstraint::Required,
        ),
        "local_id" => string_attribute(
            "Identifier of the tenant on the platform",
            AttributeConstraint::OptionalComputed,
        ),
        "landing_zone_identifier" => string_attribute(
            "Landing zone applied to the tenant",
            AttributeConstraint::Optional,
        ),
        "quotas" => Attribute {
            attr_type: AttributeType::AttributeList(map! {
                "key" => string_attribute("Name of the quota", AttributeConstraint::Required),
                "value" => Attribute {
                    attr_type: AttributeType::Number,
                    description: Description::plain("Value of the quota"),
                    constraint: AttributeConstraint::Required,
                    ..Default::default()
                },
            }),
            description: Description::plain("Quotas of the tenant"),
            constraint: AttributeConstraint::OptionalComputed,
            ..Default::default()
        },
    }
}

fn status_attributes() -> HashMap<String, Attribute> {
    map! {
        "tenant_name" => string_attribute("Full name of the tenant", AttributeConstraint::Computed),
        "platform_type_identifier" => string_attribute(
            "Type of the platform",
            AttributeConstraint::Computed,
        ),
        "platform_workspace_identifier" => string_attribute(
            "Workspace owning the platform",
            AttributeConstraint::Computed,
        ),
        "tags" => tags_attribute(AttributeConstraint::Computed),
    }
}

fn schema(
    metadata: HashMap<String, Attribute>,
    spec: HashMap<String, Attribute>,
    spec_constraint: AttributeConstraint,
    description: &str,
) -> Schema {
    Schema {
        version: 1,
        block: Block {
            version: 1,
            attributes: map! {
                "metadata" => Attribute {
                    attr_type: AttributeType::AttributeSingle(metadata),
                    description: Description::plain("Metadata of the tenant"),
                    constraint: AttributeConstraint::Required,
                    ..Default::default()
                },
                "spec" => Attribute {
                    attr_type: AttributeType::AttributeSingle(spec),
                    description: Description::plain("Specification of the tenant"),
                    constraint: spec_constraint,
                    ..Default::default()
                },
                "status" => Attribute {
                    attr_type: AttributeType::AttributeSingle(status_attributes()),
                    description: Description::plain("Status of the tenant"),
                    constraint: AttributeConstraint::Computed,
                    ..Default::default()
                },
            },
            blocks: Default::default(),
            description: Description::plain(description),
            deprecated: false,
        },
    }
}

pub struct ResourceSchema;
pub struct DataSourceSchema;

impl WithSchema for ResourceSchema {
    fn schema() -> Schema {
        schema(
            metadata_attributes(),
            spec_attributes(),
            AttributeConstraint::Required,
            "meshStack tenant, any change replaces the tenant",
        )
    }
}

impl WithSchema for DataSourceSchema {
    fn schema() -> Schema {
        let mut metadata = with_constraint(metadata_attributes(), AttributeConstraint::Computed);
        metadata.insert(
            "uuid".to_owned(),
            string_attribute("UUID of the tenant", AttributeConstraint::Required),
        );
        schema(
            metadata,
            with_constraint(spec_attributes(), AttributeConstraint::Computed),
            AttributeConstraint::Computed,
            "Read an existing meshStack tenant",
        )
    }
}
