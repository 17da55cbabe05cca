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

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use tf_provider::{AttributePath, Diagnostics};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description, Schema};
use tf_provider::value::{Value, ValueList, ValueMap, ValueString};

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

/// Build an owned string value
pub(crate) fn string_value<'a, S: Into<String>>(value: S) -> ValueString<'a> {
    Value::Value(Cow::Owned(value.into()))
}

/// Build a string value that is null when the remote field is absent
pub(crate) fn optional_string_value<'a>(value: Option<&str>) -> ValueString<'a> {
    match value {
        Some(value) => string_value(value),
        None => Value::Null,
    }
}

/// Get a known string out of a value, `None` when null or unknown
pub(crate) fn known_str<'b>(value: &'b ValueString<'_>) -> Option<&'b str> {
    value.as_deref_option()
}

/// Get a string out of a value, reporting an error when it is null or unknown
pub(crate) fn required_str<'b>(
    diags: &mut Diagnostics,
    value: &'b ValueString<'_>,
    attr_path: AttributePath,
) -> Option<&'b str> {
    required_value(diags, value, attr_path).map(|value| value.as_ref())
}

/// Get the content of a value, reporting an error when it is null or unknown
pub(crate) fn required_value<'b, T>(
    diags: &mut Diagnostics,
    value: &'b Value<T>,
    attr_path: AttributePath,
) -> Option<&'b T> {
    match value {
        Value::Value(value) => Some(value),
        Value::Null => {
            diags.error_short("Missing required attribute", attr_path);
            None
        }
        Value::Unknown => {
            diags.error_short("Attribute must be known at apply time", attr_path);
            None
        }
    }
}

/// Convert a list of strings into a state list
pub(crate) fn string_list<'a, I, S>(items: I) -> ValueList<ValueString<'a>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Value(items.into_iter().map(string_value).collect())
}

/// Collect the known strings of a state list
pub(crate) fn known_strings(values: &ValueList<ValueString<'_>>) -> Vec<String> {
    values
        .iter()
        .flatten()
        .filter_map(|value| value.as_deref_option())
        .map(str::to_owned)
        .collect()
}

/// meshObject tags are a map from tag name to a list of values
pub(crate) type TagsValue<'a> = ValueMap<'a, ValueList<ValueString<'a>>>;

pub(crate) fn tags_to_state<'a>(tags: &BTreeMap<String, Vec<String>>) -> TagsValue<'a> {
    Value::Value(
        tags.iter()
            .map(|(name, values)| (Cow::Owned(name.clone()), string_list(values.iter().cloned())))
            .collect(),
    )
}

pub(crate) fn tags_from_state(tags: &TagsValue<'_>) -> BTreeMap<String, Vec<String>> {
    tags.iter()
        .flatten()
        .map(|(name, values)| (name.to_string(), known_strings(values)))
        .collect()
}

pub(crate) fn tags_attribute(constraint: AttributeConstraint) -> Attribute {
    Attribute {
        attr_type: AttributeType::Map(AttributeType::List(AttributeType::String.into()).into()),
        description: Description::plain("Tags of the object, each tag holding a list of values"),
        constraint,
        ..Default::default()
    }
}

/// Attribute helper for the many plain string attributes of meshObjects
pub(crate) fn string_attribute<D: ToString>(
    description: D,
    constraint: AttributeConstraint,
) -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

/// Mark every attribute of a nested attribute set with the same constraint
pub(crate) fn with_constraint(
    mut attributes: HashMap<String, Attribute>,
    constraint: AttributeConstraint,
) -> HashMap<String, Attribute> {
    for attribute in attributes.values_mut() {
        attribute.constraint = constraint.clone();
        match &mut attribute.attr_type {
            AttributeType::AttributeSingle(nested)
            | AttributeType::AttributeList(nested)
            | AttributeType::AttributeSet(nested)
            | AttributeType::AttributeMap(nested) => {
                *nested = with_constraint(std::mem::take(nested), constraint.clone());
            }
            _ => (),
        }
    }
    attributes
}

/// Report a failed remote call as an error diagnostic
pub(crate) fn report<E: std::fmt::Display>(diags: &mut Diagnostics, summary: &'static str, err: E) {
    diags.root_error(summary, err.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_survive_state_conversion() {
        let tags = BTreeMap::from([
            ("environment".to_owned(), vec!["dev".to_owned(), "qa".to_owned()]),
            ("owner".to_owned(), vec![]),
        ]);

        assert_eq!(tags_from_state(&tags_to_state(&tags)), tags);
    }

    #[test]
    fn null_and_unknown_strings_are_not_known() {
        assert_eq!(known_str(&ValueString::Null), None);
        assert_eq!(known_str(&ValueString::Unknown), None);
        assert_eq!(known_str(&string_value("abc")), Some("abc"));
    }

    #[test]
    fn required_str_reports_missing_values() {
        let mut diags = Diagnostics::default();
        assert!(required_str(&mut diags, &ValueString::Null, AttributePath::new("name")).is_none());
        assert!(
            required_str(&mut diags, &ValueString::Unknown, AttributePath::new("name")).is_none()
        );
        assert_eq!(diags.errors.len(), 2);
    }

    #[test]
    fn nested_constraints_are_rewritten() {
        let attributes = with_constraint(
            HashMap::from([(
                "nested".to_owned(),
                Attribute {
                    attr_type: AttributeType::AttributeSingle(HashMap::from([(
                        "leaf".to_owned(),
                        string_attribute("leaf", AttributeConstraint::Required),
                    )])),
                    ..Default::default()
                },
            )]),
            AttributeConstraint::Computed,
        );

        let AttributeType::AttributeSingle(nested) = &attributes["nested"].attr_type else {
            panic!("nested attribute lost its type");
        };
        assert_eq!(nested["leaf"].constraint, AttributeConstraint::Computed);
    }
}
