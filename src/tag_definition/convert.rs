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

use tf_provider::{AttributePath, Diagnostics};
use tf_provider::value::Value;

use crate::client::tag_definition::{
    TagDefinition, TagDefinitionSpec, TagValueInteger, TagValueMultiSelect, TagValueNumber,
    TagValueSingleSelect, TagValueString, TagValueType, TARGET_KINDS,
};
use crate::utils::{
    known_str, known_strings, optional_string_value, required_str, required_value, string_list,
    string_value,
};

use super::state::{
    State, StateMetadata, StateSpec, StateValueInteger, StateValueMultiSelect, StateValueNumber,
    StateValueSingleSelect, StateValueString, StateValueType,
};

impl<'a> StateValueString<'a> {
    fn from_remote(value: &TagValueString) -> Self {
        Self {
            default_value: optional_string_value(value.default_value.as_deref()),
            validation_regex: optional_string_value(value.validation_regex.as_deref()),
        }
    }

    fn to_remote(&self) -> TagValueString {
        TagValueString {
            default_value: known_str(&self.default_value).map(str::to_owned),
            validation_regex: known_str(&self.validation_regex).map(str::to_owned),
        }
    }
}

impl<'a> StateValueType<'a> {
    fn from_remote(value_type: &TagValueType) -> Self {
        Self {
            string: value_type
                .string
                .as_ref()
                .map(StateValueString::from_remote)
                .into(),
            email: value_type
                .email
                .as_ref()
                .map(StateValueString::from_remote)
                .into(),
            integer: value_type
                .integer
                .as_ref()
                .map(|integer| StateValueInteger {
                    default_value: integer.default_value.into(),
                })
                .into(),
            number: value_type
                .number
                .as_ref()
                .map(|number| StateValueNumber {
                    default_value: number.default_value.into(),
                })
                .into(),
            single_select: value_type
                .single_select
                .as_ref()
                .map(|select| StateValueSingleSelect {
                    options: string_list(select.options.iter().cloned()),
                    default_value: optional_string_value(select.default_value.as_deref()),
                })
                .into(),
            multi_select: value_type
                .multi_select
                .as_ref()
                .map(|select| StateValueMultiSelect {
                    options: string_list(select.options.iter().cloned()),
                    default_value: match &select.default_value {
                        Some(values) => string_list(values.iter().cloned()),
                        None => Value::Null,
                    },
                })
                .into(),
        }
    }

    fn to_remote(&self) -> TagValueType {
        TagValueType {
            string: self
                .string
                .as_ref_option()
                .map(StateValueString::to_remote),
            email: self.email.as_ref_option().map(StateValueString::to_remote),
            integer: self.integer.as_ref_option().map(|integer| TagValueInteger {
                default_value: integer.default_value.as_ref_option().copied(),
            }),
            number: self.number.as_ref_option().map(|number| TagValueNumber {
                default_value: number.default_value.as_ref_option().copied(),
            }),
            single_select: self
                .single_select
                .as_ref_option()
                .map(|select| TagValueSingleSelect {
                    options: known_strings(&select.options),
                    default_value: known_str(&select.default_value).map(str::to_owned),
                }),
            multi_select: self
                .multi_select
                .as_ref_option()
                .map(|select| TagValueMultiSelect {
                    options: known_strings(&select.options),
                    default_value: select
                        .default_value
                        .is_value()
                        .then(|| known_strings(&select.default_value)),
                }),
        }
    }

    /// Number of value types that are set or may be set once known
    fn population(&self) -> (usize, usize) {
        let fields = [
            self.string.as_ref().map(|_| ()),
            self.email.as_ref().map(|_| ()),
            self.integer.as_ref().map(|_| ()),
            self.number.as_ref().map(|_| ()),
            self.single_select.as_ref().map(|_| ()),
            self.multi_select.as_ref().map(|_| ()),
        ];
        let known = fields.iter().filter(|field| field.is_value()).count();
        let unknown = fields.iter().filter(|field| field.is_unknown()).count();
        (known, unknown)
    }
}

impl<'a> StateSpec<'a> {
    pub fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Some(kind) = known_str(&self.target_kind) {
            if !TARGET_KINDS.contains(&kind) {
                diags.error(
                    "Invalid target kind",
                    format!(
                        "Tags cannot be defined for `{kind}`, expected one of: {}",
                        TARGET_KINDS.join(", ")
                    ),
                    attr_path.clone().attribute("target_kind"),
                );
            }
        }

        if let Value::Value(value_type) = &self.value_type {
            match value_type.population() {
                (0, 0) => diags.error(
                    "Tag value type is missing",
                    "Exactly one of `string`, `email`, `integer`, `number`, `single_select` or `multi_select` must be set",
                    attr_path.attribute("value_type"),
                ),
                (known, _) if known > 1 => diags.error(
                    "Tag value type is ambiguous",
                    format!("{known} value types are set, but exactly one must be set"),
                    attr_path.attribute("value_type"),
                ),
                _ => (),
            }
        }
    }
}

impl<'a> State<'a> {
    pub fn from_remote(tag_definition: &TagDefinition) -> Self {
        let spec = &tag_definition.spec;
        Self {
            metadata: Value::Value(StateMetadata {
                name: string_value(&tag_definition.metadata.name),
            }),
            spec: Value::Value(StateSpec {
                target_kind: string_value(&spec.target_kind),
                key: string_value(&spec.key),
                display_name: string_value(&spec.display_name),
                description: string_value(&spec.description),
                value_type: Value::Value(StateValueType::from_remote(&spec.value_type)),
                sensitive: Value::Value(spec.sensitive),
                once_editable: Value::Value(spec.once_editable),
                restricted: Value::Value(spec.restricted),
                mandatory: Value::Value(spec.mandatory),
                immutable: Value::Value(spec.immutable),
            }),
        }
    }

    pub fn to_remote(&self, diags: &mut Diagnostics) -> Option<TagDefinition> {
        let spec_path = AttributePath::new("spec");
        let spec = required_value(diags, &self.spec, spec_path.clone())?;
        let target_kind = required_str(
            diags,
            &spec.target_kind,
            spec_path.clone().attribute("target_kind"),
        );
        let key = required_str(diags, &spec.key, spec_path.clone().attribute("key"));
        let display_name = required_str(
            diags,
            &spec.display_name,
            spec_path.clone().attribute("display_name"),
        );
        let value_type = required_value(
            diags,
            &spec.value_type,
            spec_path.clone().attribute("value_type"),
        );
        spec.validate(diags, spec_path);

        let tag_definition = TagDefinition::new(TagDefinitionSpec {
            target_kind: target_kind?.to_owned(),
            key: key?.to_owned(),
            display_name: display_name?.to_owned(),
            description: known_str(&spec.description).unwrap_or_default().to_owned(),
            value_type: value_type?.to_remote(),
            sensitive: spec.sensitive.unwrap_or(false),
            once_editable: spec.once_editable.unwrap_or(false),
            restricted: spec.restricted.unwrap_or(false),
            mandatory: spec.mandatory.unwrap_or(false),
            immutable: spec.immutable.unwrap_or(false),
        });
        if diags.errors.is_empty() {
            Some(tag_definition)
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn environment_tag() -> TagDefinition {
        TagDefinition::new(TagDefinitionSpec {
            target_kind: "meshProject".to_owned(),
            key: "environment".to_owned(),
            display_name: "Environment".to_owned(),
            description: "Stage of the project".to_owned(),
            value_type: TagValueType {
                single_select: Some(TagValueSingleSelect {
                    options: vec!["dev".to_owned(), "prod".to_owned()],
                    default_value: Some("dev".to_owned()),
                }),
                ..Default::default()
            },
            mandatory: true,
            ..Default::default()
        })
    }

    fn spec<'s>(state: &'s mut State<'static>) -> &'s mut StateSpec<'static> {
        state.spec.as_mut_option().unwrap()
    }

    #[test]
    fn remote_tag_definitions_convert_back() {
        let mut diags = Diagnostics::default();
        let remote = State::from_remote(&environment_tag())
            .to_remote(&mut diags)
            .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(remote, environment_tag());
        assert_eq!(remote.metadata.name, "meshProject.environment");
    }

    #[test]
    fn value_type_must_be_set() {
        let mut state = State::from_remote(&environment_tag());
        spec(&mut state).value_type = Value::Value(Default::default());
        let mut diags = Diagnostics::default();

        assert!(state.to_remote(&mut diags).is_none());
        assert_eq!(diags.errors[0].summary, "Tag value type is missing");
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("spec").attribute("value_type")
        );
    }

    #[test]
    fn value_type_must_be_unique() {
        let mut state = State::from_remote(&environment_tag());
        if let Value::Value(value_type) = &mut spec(&mut state).value_type {
            value_type.integer = Value::Value(Default::default());
        }
        let mut diags = Diagnostics::default();
        spec(&mut state).validate(&mut diags, AttributePath::new("spec"));

        assert_eq!(diags.errors[0].summary, "Tag value type is ambiguous");
    }

    #[test]
    fn unknown_value_types_are_checked_at_apply() {
        let mut state = State::from_remote(&environment_tag());
        spec(&mut state).value_type = Value::Value(StateValueType {
            email: Value::Unknown,
            ..Default::default()
        });
        let mut diags = Diagnostics::default();
        spec(&mut state).validate(&mut diags, AttributePath::new("spec"));

        assert!(diags.errors.is_empty());
    }

    #[test]
    fn target_kind_must_be_taggable() {
        let mut state = State::from_remote(&environment_tag());
        spec(&mut state).target_kind = string_value("meshTenant");
        let mut diags = Diagnostics::default();
        spec(&mut state).validate(&mut diags, AttributePath::new("spec"));

        assert_eq!(diags.errors[0].summary, "Invalid target kind");
    }

    #[test]
    fn unset_flags_default_to_false() {
        let mut state = State::from_remote(&environment_tag());
        spec(&mut state).mandatory = Value::Null;
        let mut diags = Diagnostics::default();

        assert!(!state.to_remote(&mut diags).unwrap().spec.mandatory);
    }
}
