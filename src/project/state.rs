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
use tf_provider::value::{Value, ValueList, ValueString};

use crate::client::project::{Project, ProjectMetadata, ProjectSpec};
use crate::utils::{
    known_str, optional_string_value, required_str, required_value, string_attribute,
    string_value, tags_attribute, tags_from_state, tags_to_state, with_constraint, TagsValue,
    WithSchema,
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
    pub owned_by_workspace: ValueString<'a>,
    pub created_on: ValueString<'a>,
    pub deleted_on: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSpec<'a> {
    #[serde(borrow = "'a")]
    pub display_name: ValueString<'a>,
    pub tags: TagsValue<'a>,
    pub payment_method_identifier: ValueString<'a>,
    pub substitute_payment_method_identifier: ValueString<'a>,
}

/// State of the `meshstack_projects` data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ListState<'a> {
    #[serde(borrow = "'a")]
    pub workspace_identifier: ValueString<'a>,
    pub projects: ValueList<Value<State<'a>>>,
}

impl<'a> StateMetadata<'a> {
    /// Workspace and name of the project, when both are known
    pub fn identifier(&self) -> Option<(&str, &str)> {
        Some((known_str(&self.owned_by_workspace)?, known_str(&self.name)?))
    }
}

impl<'a> State<'a> {
    pub fn identifier(&self) -> Option<(&str, &str)> {
        self.metadata.as_ref_option()?.identifier()
    }

    pub fn from_remote(project: &Project) -> Self {
        Self {
            metadata: Value::Value(StateMetadata {
                name: string_value(&project.metadata.name),
                owned_by_workspace: string_value(&project.metadata.owned_by_workspace),
                created_on: optional_string_value(project.metadata.created_on.as_deref()),
                deleted_on: optional_string_value(project.metadata.deleted_on.as_deref()),
            }),
            spec: Value::Value(StateSpec {
                display_name: string_value(&project.spec.display_name),
                tags: tags_to_state(&project.spec.tags),
                payment_method_identifier: optional_string_value(
                    project.spec.payment_method_identifier.as_deref(),
                ),
                substitute_payment_method_identifier: optional_string_value(
                    project.spec.substitute_payment_method_identifier.as_deref(),
                ),
            }),
        }
    }

    pub fn to_remote(&self, diags: &mut Diagnostics) -> Option<Project> {
        let metadata_path = AttributePath::new("metadata");
        let spec_path = AttributePath::new("spec");
        let metadata = required_value(diags, &self.metadata, metadata_path.clone())?;
        let spec = required_value(diags, &self.spec, spec_path.clone())?;
        let name = required_str(diags, &metadata.name, metadata_path.clone().attribute("name"));
        let workspace = required_str(
            diags,
            &metadata.owned_by_workspace,
            metadata_path.attribute("owned_by_workspace"),
        );
        let display_name = required_str(
            diags,
            &spec.display_name,
            spec_path.attribute("display_name"),
        );

        Some(Project::new(
            ProjectMetadata {
                name: name?.to_owned(),
                owned_by_workspace: workspace?.to_owned(),
                ..Default::default()
            },
            ProjectSpec {
                display_name: display_name?.to_owned(),
                tags: tags_from_state(&spec.tags),
                payment_method_identifier: known_str(&spec.payment_method_identifier)
                    .map(str::to_owned),
                substitute_payment_method_identifier: known_str(
                    &spec.substitute_payment_method_identifier,
                )
                .map(str::to_owned),
            },
        ))
    }
}

fn metadata_attributes() -> HashMap<String, Attribute> {
    map! {
        "name" => string_attribute(
            "Identifier of the project, changing it replaces the project",
            AttributeConstraint::Required,
        ),
        "owned_by_workspace" => string_attribute(
            "Identifier of the workspace owning the project, changing it replaces the project",
            AttributeConstraint::Required,
        ),
        "created_on" => string_attribute("Creation date", AttributeConstraint::Computed),
        "deleted_on" => string_attribute("Deletion date", AttributeConstraint::Computed),
    }
}

fn spec_attributes() -> HashMap<String, Attribute> {
    map! {
        "display_name" => string_attribute(
            "Display name of the project",
            AttributeConstraint::Required,
        ),
        "tags" => tags_attribute(AttributeConstraint::OptionalComputed),
        "payment_method_identifier" => string_attribute(
            "Payment method charged for the project",
            AttributeConstraint::Optional,
        ),
        "substitute_payment_method_identifier" => string_attribute(
            "Payment method used once the main payment method expires",
            AttributeConstraint::Optional,
        ),
    }
}

fn project_attributes(
    metadata: HashMap<String, Attribute>,
    spec: HashMap<String, Attribute>,
    spec_constraint: AttributeConstraint,
) -> HashMap<String, Attribute> {
    map! {
        "metadata" => Attribute {
            attr_type: AttributeType::AttributeSingle(metadata),
            description: Description::plain("Metadata of the project"),
            constraint: AttributeConstraint::Required,
            ..Default::default()
        },
        "spec" => Attribute {
            attr_type: AttributeType::AttributeSingle(spec),
            description: Description::plain("Specification of the project"),
            constraint: spec_constraint,
            ..Default::default()
        },
    }
}

fn computed_project_attributes() -> HashMap<String, Attribute> {
    with_constraint(
        project_attributes(
            metadata_attributes(),
            spec_attributes(),
            AttributeConstraint::Computed,
        ),
        AttributeConstraint::Computed,
    )
}

fn schema(attributes: HashMap<String, Attribute>, description: &str) -> Schema {
    Schema {
        version: 1,
        block: Block {
            version: 1,
            attributes,
            blocks: Default::default(),
            description: Description::plain(description),
            deprecated: false,
        },
    }
}

/// Resource flavour of the state
pub struct ResourceSchema;
/// Data source flavour of the state, only the identifier is configured
pub struct DataSourceSchema;

impl WithSchema for ResourceSchema {
    fn schema() -> Schema {
        schema(
            project_attributes(
                metadata_attributes(),
                spec_attributes(),
                AttributeConstraint::Required,
            ),
            "meshStack project, imported as `<workspace>.<name>`",
        )
    }
}

impl WithSchema for DataSourceSchema {
    fn schema() -> Schema {
        let mut attributes = computed_project_attributes();
        if let Some(metadata) = attributes.get_mut("metadata") {
            metadata.constraint = AttributeConstraint::Required;
            if let AttributeType::AttributeSingle(metadata) = &mut metadata.attr_type {
                for key in ["name", "owned_by_workspace"] {
                    if let Some(attribute) = metadata.get_mut(key) {
                        attribute.constraint = AttributeConstraint::Required;
                    }
                }
            }
        }
        schema(attributes, "Read an existing meshStack project")
    }
}

impl<'a> WithSchema for ListState<'a> {
    fn schema() -> Schema {
        schema(
            map! {
                "workspace_identifier" => string_attribute(
                    "Workspace whose projects are listed",
                    AttributeConstraint::Required,
                ),
                "projects" => Attribute {
                    attr_type: AttributeType::AttributeList(computed_project_attributes()),
                    description: Description::plain("Projects of the workspace"),
                    constraint: AttributeConstraint::Computed,
                    ..Default::default()
                },
            },
            "List the projects of a meshStack workspace",
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn project() -> Project {
        Project::new(
            ProjectMetadata {
                name: "dev".to_owned(),
                owned_by_workspace: "platform".to_owned(),
                created_on: Some("2024-01-01T00:00:00Z".to_owned()),
                deleted_on: None,
            },
            ProjectSpec {
                display_name: "Development".to_owned(),
                tags: BTreeMap::from([("env".to_owned(), vec!["dev".to_owned()])]),
                payment_method_identifier: Some("card".to_owned()),
                substitute_payment_method_identifier: None,
            },
        )
    }

    #[test]
    fn states_are_identified_by_workspace_and_name() {
        let state = State::from_remote(&project());
        assert_eq!(state.identifier(), Some(("platform", "dev")));
        assert_eq!(State::default().identifier(), None);
    }

    #[test]
    fn states_convert_back_without_computed_fields() {
        let mut diags = Diagnostics::default();
        let remote = State::from_remote(&project())
            .to_remote(&mut diags)
            .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(remote.metadata.created_on, None);
        assert_eq!(remote.metadata.name, "dev");
        assert_eq!(remote.spec, project().spec);
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let state = State {
            metadata: Value::Value(Default::default()),
            spec: Value::Value(Default::default()),
        };
        let mut diags = Diagnostics::default();

        assert!(state.to_remote(&mut diags).is_none());
        assert_eq!(diags.errors.len(), 3);
    }

    #[test]
    fn data_source_requires_the_identifier() {
        let schema = DataSourceSchema::schema();
        let AttributeType::AttributeSingle(metadata) =
            &schema.block.attributes["metadata"].attr_type
        else {
            panic!("metadata is not a nested attribute");
        };
        assert_eq!(metadata["name"].constraint, AttributeConstraint::Required);
        assert_eq!(metadata["created_on"].constraint, AttributeConstraint::Computed);
    }
}
