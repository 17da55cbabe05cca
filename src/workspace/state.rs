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
use tf_provider::value::{Value, ValueString};

use crate::client::workspace::{Workspace, WorkspaceMetadata, WorkspaceSpec};
use crate::utils::{
    optional_string_value, required_str, required_value, string_attribute, string_value,
    tags_attribute, tags_from_state, tags_to_state, with_constraint, TagsValue, WithSchema,
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
    pub name: ValueString<'a>,
    pub created_on: ValueString<'a>,
    pub deleted_on: ValueString<'a>,
    pub tags: TagsValue<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSpec<'a> {
    #[serde(borrow = "'a")]
    pub display_name: ValueString<'a>,
}

impl<'a> State<'a> {
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref_option()?.name.as_deref_option()
    }

    pub fn from_remote(workspace: &Workspace) -> Self {
        Self {
            metadata: Value::Value(StateMetadata {
                name: string_value(&workspace.metadata.name),
                created_on: optional_string_value(workspace.metadata.created_on.as_deref()),
                deleted_on: optional_string_value(workspace.metadata.deleted_on.as_deref()),
                tags: tags_to_state(&workspace.metadata.tags),
            }),
            spec: Value::Value(StateSpec {
                display_name: string_value(&workspace.spec.display_name),
            }),
        }
    }

    pub fn to_remote(&self, diags: &mut Diagnostics) -> Option<Workspace> {
        let metadata_path = AttributePath::new("metadata");
        let spec_path = AttributePath::new("spec");
        let metadata = required_value(diags, &self.metadata, metadata_path.clone())?;
        let spec = required_value(diags, &self.spec, spec_path.clone())?;
        let name = required_str(diags, &metadata.name, metadata_path.attribute("name"));
        let display_name = required_str(
            diags,
            &spec.display_name,
            spec_path.attribute("display_name"),
        );

        Some(Workspace::new(
            WorkspaceMetadata {
                name: name?.to_owned(),
                tags: tags_from_state(&metadata.tags),
                ..Default::default()
            },
            WorkspaceSpec {
                display_name: display_name?.to_owned(),
            },
        ))
    }
}

fn metadata_attributes() -> HashMap<String, Attribute> {
    map! {
        "name" => string_attribute(
            "Identifier of the workspace, changing it replaces the workspace",
            AttributeConstraint::Required,
        ),
        "created_on" => string_attribute("Creation date", AttributeConstraint::Computed),
        "deleted_on" => string_attribute("Deletion date", AttributeConstraint::Computed),
        "tags" => tags_attribute(AttributeConstraint::OptionalComputed),
    }
}

fn spec_attributes() -> HashMap<String, Attribute> {
    map! {
        "display_name" => string_attribute(
            "Display name of the workspace",
            AttributeConstraint::Required,
        ),
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
                    description: Description::plain("Metadata of the workspace"),
                    constraint: AttributeConstraint::Required,
                    ..Default::default()
                },
                "spec" => Attribute {
                    attr_type: AttributeType::AttributeSingle(spec),
                    description: Description::plain("Specification of the workspace"),
                    constraint: spec_constraint,
                    ..Default::default()
                },
            },
            blocks: Default::default(),
            description: Description::plain(description),
            deprecated: false,
        },
    }
}

/// Resource flavour of the state
pub struct ResourceSchema;
/// Data source flavour of the state, only the name is configured
pub struct DataSourceSchema;

impl WithSchema for ResourceSchema {
    fn schema() -> Schema {
        schema(
            metadata_attributes(),
            spec_attributes(),
            AttributeConstraint::Required,
            "meshStack workspace",
        )
    }
}

impl WithSchema for DataSourceSchema {
    fn schema() -> Schema {
        let mut metadata = with_constraint(metadata_attributes(), AttributeConstraint::Computed);
        metadata.insert(
            "name".to_owned(),
            string_attribute("Identifier of the workspace", AttributeConstraint::Required),
        );
        schema(
            metadata,
            with_constraint(spec_attributes(), AttributeConstraint::Computed),
            AttributeConstraint::Computed,
            "Read an existing meshStack workspace",
        )
    }
}
