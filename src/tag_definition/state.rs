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
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};

use crate::utils::{string_attribute, with_constraint, WithSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct State<'a> {
    #[serde(borrow = "'a")]
    pub metadata: Value<StateMetadata<'a>>,
    pub spec: Value<StateSpec<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateMetadata<'a> {
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateSpec<'a> {
    #[serde(borrow = "'a")]
    pub target_kind: ValueString<'a>,
    pub key: ValueString<'a>,
    pub display_name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub value_type: Value<StateValueType<'a>>,
    pub sensitive: ValueBool,
    pub once_editable: ValueBool,
    pub restricted: ValueBool,
    pub mandatory: ValueBool,
    pub immutable: ValueBool,
}

/// Exactly one of the fields is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateValueType<'a> {
    #[serde(borrow = "'a")]
    pub string: Value<StateValueString<'a>>,
    pub email: Value<StateValueString<'a>>,
    pub integer: Value<StateValueInteger>,
    pub number: Value<StateValueNumber>,
    pub single_select: Value<StateValueSingleSelect<'a>>,
    pub multi_select: Value<StateValueMultiSelect<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateValueString<'a> {
    #[serde(borrow = "'a")]
    pub default_value: ValueString<'a>,
    pub validation_regex: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateValueInteger {
    pub default_value: ValueNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateValueNumber {
    pub default_value: Value<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateValueSingleSelect<'a> {
    #[serde(borrow = "'a")]
    pub options: ValueList<ValueString<'a>>,
    pub default_value: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateValueMultiSelect<'a> {
    #[serde(borrow = "'a")]
    pub options: ValueList<ValueString<'a>>,
    pub default_value: ValueList<ValueString<'a>>,
}

/// State of the `meshstack_tag_definitions` data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ListState<'a> {
    #[serde(borrow = "'a")]
    pub target_kind: ValueString<'a>,
    pub tag_definitions: ValueList<Value<State<'a>>>,
}

impl<'a> State<'a> {
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref_option()?.name.as_deref_option()
    }
}

fn flag(description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::Bool,
        description: Description::plain(description),
        constraint: AttributeConstraint::OptionalComputed,
        ..Default::default()
    }
}

fn nested(attributes: HashMap<String, Attribute>, description: &str) -> Attribute {
    Attribute {
        attr_type: AttributeType::AttributeSingle(attributes),
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    }
}

fn string_list_attribute(description: &str, constraint: AttributeConstraint) -> Attribute {
    Attribute {
        attr_type: AttributeType::List(AttributeType::String.into()),
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

fn value_string_attributes() -> HashMap<String, Attribute> {
    map! {
        "default_value" => string_attribute("Default value", AttributeConstraint::Optional),
        "validation_regex" => string_attribute(
            "Regular expression values must match",
            AttributeConstraint::Optional,
        ),
    }
}

fn value_type_attributes() -> HashMap<String, Attribute> {
    map! {
        "string" => nested(value_string_attributes(), "Free text tag"),
        "email" => nested(value_string_attributes(), "Email address tag"),
        "integer" => nested(
            map! {
                "default_value" => Attribute {
                    attr_type: AttributeType::Number,
                    description: Description::plain("Default value"),
                    constraint: AttributeConstraint::Optional,
                    ..Default::default()
                },
            },
            "Integer tag",
        ),
        "number" => nested(
            map! {
                "default_value" => Attribute {
                    attr_type: AttributeType::Number,
                    description: Description::plain("Default value"),
                    constraint: AttributeConstraint::Optional,
                    ..Default::default()
                },
            },
            "Decimal number tag",
        ),
        "single_select" => nested(
            map! {
                "options" => string_list_attribute(
                    "Allowed values",
                    AttributeConstraint::Required,
                ),
                "default_value" => string_attribute("Default value", AttributeConstraint::Optional),
            },
            "Tag holding one of the options",
        ),
        "multi_select" => nested(
            map! {
                "options" => string_list_attribute(
                    "Allowed values",
                    AttributeConstraint::Required,
                ),
                "default_value" => string_list_attribute(
                    "Default values",
                    AttributeConstraint::Optional,
                ),
            },
            "Tag holding some of the options",
        ),
    }
}

fn metadata_attributes() -> HashMap<String, Attribute> {
    map! {
        "name" => string_attribute(
            "Name of the tag definition, `<target_kind>.<key>`",
            AttributeConstraint::Computed,
        ),
    }
}

fn spec_attributes() -> HashMap<String, Attribute> {
    map! {
        "target_kind" => string_attribute(
            "Kind of meshObject the tag applies to, changing it replaces the tag definition",
            AttributeConstraint::Required,
        ),
        "key" => string_attribute(
            "Key of the tag, changing it replaces the tag definition",
            AttributeConstraint::Required,
        ),
        "display_name" => string_attribute("Display name of the tag", AttributeConstraint::Required),
        "description" => string_attribute(
            "Description of the tag",
            AttributeConstraint::OptionalComputed,
        ),
        "value_type" => Attribute {
            attr_type: AttributeType::AttributeSingle(value_type_attributes()),
            description: Description::plain("Type of the tag values, exactly one type must be set"),
            constraint: AttributeConstraint::Required,
            ..Default::default()
        },
        "sensitive" => flag("Whether the values are hidden (default: false)"),
        "once_editable" => flag("Whether the value can only be set once (default: false)"),
        "restricted" => flag("Whether only administrators can set the value (default: false)"),
        "mandatory" => flag("Whether the tag must be set (default: false)"),
        "immutable" => flag("Whether the value can never change (default: false)"),
    }
}

fn tag_definition_attributes(
    metadata_constraint: AttributeConstraint,
    spec_constraint: AttributeConstraint,
) -> HashMap<String, Attribute> {
    map! {
        "metadata" => Attribute {
            attr_type: AttributeType::AttributeSingle(metadata_attributes()),
            description: Description::plain("Metadata of the tag definition"),
            constraint: metadata_constraint,
            ..Default::default()
        },
        "spec" => Attribute {
            attr_type: AttributeType::AttributeSingle(spec_attributes()),
            description: Description::plain("Specification of the tag definition"),
            constraint: spec_constraint,
            ..Default::default()
        },
    }
}

fn computed_tag_definition_attributes() -> HashMap<String, Attribute> {
    with_constraint(
        tag_definition_attributes(AttributeConstraint::Computed, AttributeConstraint::Computed),
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

pub struct ResourceSchema;
pub struct DataSourceSchema;

impl WithSchema for ResourceSchema {
    fn schema() -> Schema {
        schema(
            tag_definition_attributes(AttributeConstraint::Computed, AttributeConstraint::Required),
            "meshStack tag definition, imported by name",
        )
    }
}

impl WithSchema for DataSourceSchema {
    fn schema() -> Schema {
        let mut attributes = computed_tag_definition_attributes();
        attributes.insert(
            "metadata".to_owned(),
            Attribute {
                attr_type: AttributeType::AttributeSingle(map! {
                    "name" => string_attribute(
                        "Name of the tag definition, `<target_kind>.<key>`",
                        AttributeConstraint::Required,
                    ),
                }),
                description: Description::plain("Metadata of the tag definition"),
                constraint: AttributeConstraint::Required,
                ..Default::default()
            },
        );
        schema(attributes, "Read an existing meshStack tag definition")
    }
}

impl<'a> WithSchema for ListState<'a> {
    fn schema() -> Schema {
        schema(
            map! {
                "target_kind" => string_attribute(
                    "Only list the tag definitions of this kind of meshObject",
                    AttributeConstraint::Optional,
                ),
                "tag_definitions" => Attribute {
                    attr_type: AttributeType::AttributeList(computed_tag_definition_attributes()),
                    description: Description::plain("Tag definitions"),
                    constraint: AttributeConstraint::Computed,
                    ..Default::default()
                },
            },
            "List the meshStack tag definitions",
        )
    }
}
