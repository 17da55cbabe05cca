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

use tf_provider::map;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueList, ValueMap, ValueString};

use crate::io_value::{
    combined_attributes, input_attributes, output_attributes, CombinedValue, InputValue,
    OutputValue,
};
use crate::utils::{string_attribute, with_constraint, WithSchema};

pub(crate) const TARGET_KINDS: &[&str] = &["meshTenant", "meshWorkspace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub wait_for_completion: ValueBool,
    pub metadata: Value<StateMetadata<'a>>,
    pub spec: Value<StateSpec<'a>>,
    pub status: Value<StateStatus<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DataSourceState<'a> {
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
    pub created_on: ValueString<'a>,
    pub marked_for_deletion_on: ValueString<'a>,
    pub marked_for_deletion_by: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSpec<'a> {
    #[serde(borrow = "'a")]
    pub display_name: ValueString<'a>,
    pub building_block_definition_version_ref: Value<StateDefinitionRef<'a>>,
    pub target_ref: Value<StateTargetRef<'a>>,
    pub inputs: ValueMap<'a, Value<InputValue<'a>>>,
    pub combined_inputs: ValueMap<'a, Value<CombinedValue<'a>>>,
    pub parent_building_blocks: ValueList<Value<StateParent<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateDefinitionRef<'a> {
    #[serde(borrow = "'a")]
    pub uuid: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateTargetRef<'a> {
    #[serde(borrow = "'a")]
    pub kind: ValueString<'a>,
    pub uuid: ValueString<'a>,
    pub identifier: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateParent<'a> {
    #[serde(borrow = "'a")]
    pub building_block_uuid: ValueString<'a>,
    pub definition_uuid: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateStatus<'a> {
    #[serde(borrow = "'a")]
    pub status: ValueString<'a>,
    pub force_purge: ValueBool,
    pub outputs: ValueMap<'a, Value<OutputValue<'a>>>,
}

impl<'a> StateSpec<'a> {
    /// The part of the spec written by the practitioner
    pub fn configured(&self) -> Self {
        Self {
            combined_inputs: Value::Null,
            ..self.clone()
        }
    }
}

fn metadata_attributes() -> HashMap<String, Attribute> {
    map! {
        "uuid" => string_attribute("UUID of the building block", AttributeConstraint::Computed),
        "owned_by_workspace" => string_attribute(
            "Workspace owning the building block",
            AttributeConstraint::Computed,
        ),
        "created_on" => string_attribute("Creation date", AttributeConstraint::Computed),
        "marked_for_deletion_on" => string_attribute(
            "Date the deletion was requested",
            AttributeConstraint::Computed,
        ),
        "marked_for_deletion_by" => string_attribute(
            "User that requested the deletion",
            AttributeConstraint::Computed,
        ),
    }
}

fn spec_attributes() -> HashMap<String, Attribute> {
    map! {
        "display_name" => string_attribute(
            "Display name of the building block",
            AttributeConstraint::Required,
        ),
        "building_block_definition_version_ref" => Attribute {
            attr_type: AttributeType::AttributeSingle(map! {
                "uuid" => string_attribute(
                    "UUID of the building block definition version",
                    AttributeConstraint::Required,
                ),
            }),
            description: Description::plain("Building block definition version to instantiate"),
            constraint: AttributeConstraint::Required,
            ..Default::default()
        },
        "target_ref" => Attribute {
            attr_type: AttributeType::AttributeSingle(map! {
                "kind" => string_attribute(
                    "Kind of the target, either `meshTenant` or `meshWorkspace`",
                    AttributeConstraint::Required,
                ),
                "uuid" => string_attribute(
                    "UUID of the target tenant",
                    AttributeConstraint::Optional,
                ),
                "identifier" => string_attribute(
                    "Identifier of the target workspace",
                    AttributeConstraint::Optional,
                ),
            }),
            description: Description::plain("Object the building block is attached to"),
            constraint: AttributeConstraint::Required,
            ..Default::default()
        },
        "inputs" => Attribute {
            attr_type: AttributeType::AttributeMap(input_attributes()),
            description: Description::plain(
                "Inputs of the building block, each input must set exactly one `value_*` attribute",
            ),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        },
        "combined_inputs" => Attribute {
            attr_type: AttributeType::AttributeMap(with_constraint(
                combined_attributes(),
                AttributeConstraint::Computed,
            )),
            description: Description::plain(
                "Inputs of the building block as merged by meshStack with the static inputs",
            ),
            constraint: AttributeConstraint::Computed,
            ..Default::default()
        },
        "parent_building_blocks" => Attribute {
            attr_type: AttributeType::AttributeList(map! {
                "building_block_uuid" => string_attribute(
                    "UUID of the parent building block",
                    AttributeConstraint::Required,
                ),
                "definition_uuid" => string_attribute(
                    "UUID of the definition of the parent building block",
                    AttributeConstraint::Required,
                ),
            }),
            description: Description::plain("Building blocks this building block depends on"),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        },
    }
}

fn status_attributes() -> HashMap<String, Attribute> {
    map! {
        "status" => string_attribute(
            "Status of the last run of the building block",
            AttributeConstraint::Computed,
        ),
        "force_purge" => Attribute {
            attr_type: AttributeType::Bool,
            description: Description::plain("Whether the deletion ignores failures"),
            constraint: AttributeConstraint::Computed,
            ..Default::default()
        },
        "outputs" => Attribute {
            attr_type: AttributeType::AttributeMap(with_constraint(
                output_attributes(),
                AttributeConstraint::Computed,
            )),
            description: Description::plain("Outputs of the building block"),
            constraint: AttributeConstraint::Computed,
            ..Default::default()
        },
    }
}

impl<'a> WithSchema for ResourceState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => string_attribute(
                        "UUID of the building block",
                        AttributeConstraint::Computed,
                    ),
                    "wait_for_completion" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain(
                            "Wait for the building block run to complete on creation and deletion (default: true)",
                        ),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "metadata" => Attribute {
                        attr_type: AttributeType::AttributeSingle(metadata_attributes()),
                        description: Description::plain("Metadata of the building block"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "spec" => Attribute {
                        attr_type: AttributeType::AttributeSingle(spec_attributes()),
                        description: Description::plain("Specification of the building block"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::AttributeSingle(status_attributes()),
                        description: Description::plain("Status of the building block"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                blocks: Default::default(),
                description: Description::plain(
                    "Building block instantiated from a building block definition version",
                ),
                deprecated: false,
            },
        }
    }
}

impl<'a> WithSchema for DataSourceState<'a> {
    fn schema() -> Schema {
        let mut metadata = metadata_attributes();
        metadata.insert(
            "uuid".to_owned(),
            string_attribute("UUID of the building block", AttributeConstraint::Required),
        );

        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "metadata" => Attribute {
                        attr_type: AttributeType::AttributeSingle(metadata),
                        description: Description::plain("Metadata of the building block"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "spec" => Attribute {
                        attr_type: AttributeType::AttributeSingle(with_constraint(
                            spec_attributes(),
                            AttributeConstraint::Computed,
                        )),
                        description: Description::plain("Specification of the building block"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::AttributeSingle(status_attributes()),
                        description: Description::plain("Status of the building block"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                blocks: Default::default(),
                description: Description::plain("Read an existing building block"),
                deprecated: false,
            },
        }
    }
}
