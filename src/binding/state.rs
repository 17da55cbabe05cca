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

use crate::client::binding::{Binding, BindingKind, TargetRef};
use crate::utils::{
    known_str, optional_string_value, required_str, required_value, string_attribute,
    string_value,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct State<'a> {
    #[serde(borrow = "'a")]
    pub metadata: Value<StateName<'a>>,
    pub role_ref: Value<StateName<'a>>,
    pub target_ref: Value<StateTargetRef<'a>>,
    pub subject: Value<StateName<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateName<'a> {
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateTargetRef<'a> {
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    pub owned_by_workspace: ValueString<'a>,
}

fn name_of<'b>(value: &'b Value<StateName<'_>>) -> Option<&'b str> {
    known_str(&value.as_ref_option()?.name)
}

fn required_name<'b>(
    diags: &mut Diagnostics,
    value: &'b Value<StateName<'_>>,
    attribute: &'static str,
) -> Option<&'b str> {
    let path = AttributePath::new(attribute);
    let value = required_value(diags, value, path.clone())?;
    required_str(diags, &value.name, path.attribute("name"))
}

fn state_name<'a>(name: &str) -> Value<StateName<'a>> {
    Value::Value(StateName {
        name: string_value(name),
    })
}

impl<'a> State<'a> {
    pub fn name(&self) -> Option<&str> {
        name_of(&self.metadata)
    }

    pub fn from_remote(binding: &Binding) -> Self {
        Self {
            metadata: state_name(&binding.metadata.name),
            role_ref: state_name(&binding.role_ref.name),
            target_ref: Value::Value(StateTargetRef {
                name: string_value(&binding.target_ref.name),
                owned_by_workspace: optional_string_value(
                    binding.target_ref.owned_by_workspace.as_deref(),
                ),
            }),
            subject: state_name(&binding.subject.name),
        }
    }

    /// Check the target matches what the binding kind expects
    pub fn validate<K: BindingKind>(&self, diags: &mut Diagnostics) {
        let Some(target) = self.target_ref.as_ref_option() else {
            return;
        };
        let path = AttributePath::new("target_ref").attribute("owned_by_workspace");
        match (K::TARGET_IN_WORKSPACE, target.owned_by_workspace.is_null()) {
            (true, true) => diags.error(
                "Missing target workspace",
                format!("The {} of the binding lives in a workspace", K::TARGET),
                path,
            ),
            (false, false) => diags.error(
                "Unexpected target workspace",
                format!("The {} of the binding is not owned by a workspace", K::TARGET),
                path,
            ),
            _ => (),
        }
    }

    pub fn to_remote<K: BindingKind>(&self, diags: &mut Diagnostics) -> Option<Binding> {
        let name = required_name(diags, &self.metadata, "metadata");
        let role = required_name(diags, &self.role_ref, "role_ref");
        let subject = required_name(diags, &self.subject, "subject");
        let target_path = AttributePath::new("target_ref");
        let target = required_value(diags, &self.target_ref, target_path.clone())?;
        let target_name = required_str(diags, &target.name, target_path.attribute("name"));
        self.validate::<K>(diags);

        let binding = Binding::new::<K>(
            name?.to_owned(),
            role?.to_owned(),
            TargetRef {
                name: target_name?.to_owned(),
                owned_by_workspace: known_str(&target.owned_by_workspace).map(str::to_owned),
            },
            subject?.to_owned(),
        );
        if diags.errors.is_empty() {
            Some(binding)
        } else {
            None
        }
    }
}

fn name_attribute(description: String) -> Attribute {
    Attribute {
        attr_type: AttributeType::AttributeSingle(map! {
            "name" => string_attribute(description.clone(), AttributeConstraint::Required),
        }),
        description: Description::plain(description),
        constraint: AttributeConstraint::Required,
        ..Default::default()
    }
}

fn target_attributes<K: BindingKind>() -> HashMap<String, Attribute> {
    let workspace_description = if K::TARGET_IN_WORKSPACE {
        format!("Workspace owning the {}, required", K::TARGET)
    } else {
        format!("Must not be set: a {} is not owned by a workspace", K::TARGET)
    };
    map! {
        "name" => string_attribute(
            format!("Identifier of the {}", K::TARGET),
            AttributeConstraint::Required,
        ),
        "owned_by_workspace" => string_attribute(
            workspace_description,
            AttributeConstraint::Optional,
        ),
    }
}

pub fn schema<K: BindingKind>() -> Schema {
    Schema {
        version: 1,
        block: Block {
            version: 1,
            attributes: map! {
                "metadata" => name_attribute("Name of the binding".to_owned()),
                "role_ref" => name_attribute(format!(
                    "Role given to the {} on the {}",
                    K::SUBJECT,
                    K::TARGET
                )),
                "target_ref" => Attribute {
                    attr_type: AttributeType::AttributeSingle(target_attributes::<K>()),
                    description: Description::plain(format!("The {} of the binding", K::TARGET)),
                    constraint: AttributeConstraint::Required,
                    ..Default::default()
                },
                "subject" => name_attribute(format!("The {} given the role", K::SUBJECT)),
            },
            blocks: Default::default(),
            description: Description::plain(format!(
                "Binding of a {} to a {} with a role, any change replaces the binding",
                K::SUBJECT,
                K::TARGET
            )),
            deprecated: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::client::binding::{ProjectUserBinding, WorkspaceGroupBinding};

    use super::*;

    fn state(owned_by_workspace: Option<&str>) -> State<'static> {
        State {
            metadata: state_name("dev-alice"),
            role_ref: state_name("Project Admin"),
            target_ref: Value::Value(StateTargetRef {
                name: string_value("dev"),
                owned_by_workspace: optional_string_value(owned_by_workspace),
            }),
            subject: state_name("alice@example.com"),
        }
    }

    #[test]
    fn project_bindings_target_a_workspace_project() {
        let mut diags = Diagnostics::default();
        let binding = state(Some("platform"))
            .to_remote::<ProjectUserBinding>(&mut diags)
            .unwrap();

        assert_eq!(binding.kind, "meshProjectUserBinding");
        assert_eq!(binding.target_ref.owned_by_workspace.as_deref(), Some("platform"));
        assert_eq!(State::from_remote(&binding), state(Some("platform")));
    }

    #[test]
    fn project_bindings_need_the_workspace() {
        let mut diags = Diagnostics::default();
        assert!(state(None)
            .to_remote::<ProjectUserBinding>(&mut diags)
            .is_none());
        assert_eq!(diags.errors[0].summary, "Missing target workspace");
    }

    #[test]
    fn workspace_bindings_reject_a_workspace() {
        let mut diags = Diagnostics::default();
        state(Some("platform")).validate::<WorkspaceGroupBinding>(&mut diags);
        assert_eq!(diags.errors[0].summary, "Unexpected target workspace");

        let mut diags = Diagnostics::default();
        state(None).validate::<WorkspaceGroupBinding>(&mut diags);
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn missing_names_are_reported_where_they_are() {
        let mut binding = state(Some("platform"));
        binding.subject = Value::Value(StateName { name: Value::Null });
        let mut diags = Diagnostics::default();

        assert!(binding.to_remote::<ProjectUserBinding>(&mut diags).is_none());
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("subject").attribute("name")
        );
    }
}
