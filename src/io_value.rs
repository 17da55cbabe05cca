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

//! Building block input and output values
//!
//! On the wire, an input or output is a `{key, value, valueType}` triple.
//! In Terraform, the same value is an object with one optional attribute per type
//! (`value_string`, `value_int`, ...), where exactly one attribute is set.
//! [`IoValue`] sits in between: once extracted, a value has exactly one type.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};

use crate::utils::{string_list, string_value};

/// Type tag of a building block input or output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoType {
    String,
    Integer,
    Boolean,
    SingleSelect,
    MultiSelect,
    Code,
    File,
    /// Deprecated by meshStack, only ever read back
    List,
}

impl IoType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoType::String => "STRING",
            IoType::Integer => "INTEGER",
            IoType::Boolean => "BOOLEAN",
            IoType::SingleSelect => "SINGLE_SELECT",
            IoType::MultiSelect => "MULTI_SELECT",
            IoType::Code => "CODE",
            IoType::File => "FILE",
            IoType::List => "LIST",
        }
    }
}

impl Display for IoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IoType {
    type Err = IoValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "STRING" => IoType::String,
            "INTEGER" => IoType::Integer,
            "BOOLEAN" => IoType::Boolean,
            "SINGLE_SELECT" => IoType::SingleSelect,
            "MULTI_SELECT" => IoType::MultiSelect,
            "CODE" => IoType::Code,
            "FILE" => IoType::File,
            "LIST" => IoType::List,
            _ => return Err(IoValueError::UnknownType(s.to_owned())),
        })
    }
}

/// Errors raised while converting values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IoValueError {
    #[error("no value present")]
    NoValue,
    #[error("unknown value type `{0}`")]
    UnknownType(String),
    #[error("value of `{key}` is not a valid {expected}: {found}")]
    Decode {
        key: String,
        expected: IoType,
        found: String,
    },
}

/// Input or output as exchanged with the meshStack API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireIo {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    pub value_type: String,
}

/// A value holding exactly one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoValue {
    String(String),
    Int(i64),
    Bool(bool),
    SingleSelect(String),
    MultiSelect(Vec<String>),
    Code(String),
    /// Opaque file handle
    File(String),
    /// JSON encoded list of objects
    List(String),
}

impl IoValue {
    pub fn io_type(&self) -> IoType {
        match self {
            IoValue::String(_) => IoType::String,
            IoValue::Int(_) => IoType::Integer,
            IoValue::Bool(_) => IoType::Boolean,
            IoValue::SingleSelect(_) => IoType::SingleSelect,
            IoValue::MultiSelect(_) => IoType::MultiSelect,
            IoValue::Code(_) => IoType::Code,
            IoValue::File(_) => IoType::File,
            IoValue::List(_) => IoType::List,
        }
    }

    /// Decode a value received from the API
    pub fn from_wire(wire: &WireIo) -> Result<Self, IoValueError> {
        let io_type = wire.value_type.parse::<IoType>()?;
        let value = &wire.value;
        let mismatch = || IoValueError::Decode {
            key: wire.key.clone(),
            expected: io_type,
            found: value.to_string(),
        };
        let as_string = || value.as_str().map(str::to_owned).ok_or_else(mismatch);

        Ok(match io_type {
            IoType::String => IoValue::String(as_string()?),
            IoType::Integer => IoValue::Int(as_integer(value).ok_or_else(mismatch)?),
            IoType::Boolean => IoValue::Bool(value.as_bool().ok_or_else(mismatch)?),
            IoType::SingleSelect => IoValue::SingleSelect(as_string()?),
            IoType::MultiSelect => IoValue::MultiSelect(
                value
                    .as_array()
                    .and_then(|items| {
                        items
                            .iter()
                            .map(|item| item.as_str().map(str::to_owned))
                            .collect::<Option<Vec<_>>>()
                    })
                    .ok_or_else(mismatch)?,
            ),
            IoType::Code => IoValue::Code(as_string()?),
            IoType::File => IoValue::File(as_string()?),
            IoType::List => match value {
                serde_json::Value::Array(_) => IoValue::List(value.to_string()),
                serde_json::Value::String(encoded) if is_json_array(encoded) => {
                    IoValue::List(encoded.clone())
                }
                _ => return Err(mismatch()),
            },
        })
    }

    /// Encode the value for an API request
    pub fn to_wire<K: Into<String>>(&self, key: K) -> Result<WireIo, IoValueError> {
        let key = key.into();
        let value = match self {
            IoValue::String(s)
            | IoValue::SingleSelect(s)
            | IoValue::Code(s)
            | IoValue::File(s) => serde_json::Value::from(s.as_str()),
            IoValue::Int(i) => serde_json::Value::from(*i),
            IoValue::Bool(b) => serde_json::Value::from(*b),
            IoValue::MultiSelect(items) => serde_json::Value::from(items.clone()),
            IoValue::List(encoded) => match serde_json::from_str(encoded) {
                Ok(list @ serde_json::Value::Array(_)) => list,
                _ => {
                    return Err(IoValueError::Decode {
                        key,
                        expected: IoType::List,
                        found: encoded.clone(),
                    })
                }
            },
        };
        Ok(WireIo {
            key,
            value,
            value_type: self.io_type().as_str().to_owned(),
        })
    }
}

fn as_integer(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn is_json_array(encoded: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(encoded),
        Ok(serde_json::Value::Array(_))
    )
}

/// Input value as written by the practitioner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InputValue<'a> {
    #[serde(borrow = "'a")]
    pub value_string: ValueString<'a>,
    pub value_int: ValueNumber,
    pub value_bool: ValueBool,
    pub value_single_select: ValueString<'a>,
    pub value_multi_select: ValueList<ValueString<'a>>,
    pub value_code: ValueString<'a>,
}

/// Input value after meshStack merged static and user inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CombinedValue<'a> {
    #[serde(borrow = "'a")]
    pub value_string: ValueString<'a>,
    pub value_int: ValueNumber,
    pub value_bool: ValueBool,
    pub value_single_select: ValueString<'a>,
    pub value_multi_select: ValueList<ValueString<'a>>,
    pub value_code: ValueString<'a>,
    pub value_file: ValueString<'a>,
    pub value_list: ValueString<'a>,
}

/// Output value of a building block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputValue<'a> {
    #[serde(borrow = "'a")]
    pub value_string: ValueString<'a>,
    pub value_int: ValueNumber,
    pub value_bool: ValueBool,
    pub value_code: ValueString<'a>,
}

/// Extract the single value of an input.
///
/// Fields are inspected in a fixed order: bool, int, single select, multi select, string, code.
/// The first field that is known and not null wins.
/// An empty multi select is considered absent.
pub fn extract_value(input: &InputValue<'_>) -> Result<IoValue, IoValueError> {
    if let Value::Value(b) = input.value_bool {
        return Ok(IoValue::Bool(b));
    }
    if let Value::Value(i) = input.value_int {
        return Ok(IoValue::Int(i));
    }
    if let Value::Value(s) = &input.value_single_select {
        return Ok(IoValue::SingleSelect(s.to_string()));
    }
    if let Value::Value(items) = &input.value_multi_select {
        if !items.is_empty() {
            return Ok(IoValue::MultiSelect(crate::utils::known_strings(
                &input.value_multi_select,
            )));
        }
    }
    if let Value::Value(s) = &input.value_string {
        return Ok(IoValue::String(s.to_string()));
    }
    if let Value::Value(s) = &input.value_code {
        return Ok(IoValue::Code(s.to_string()));
    }
    Err(IoValueError::NoValue)
}

/// How many value fields of an input are set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Population {
    pub known: usize,
    pub unknown: usize,
}

/// Count the populated fields of an input, to validate the exactly-one-of contract
pub fn population(input: &InputValue<'_>) -> Population {
    let mut population = Population::default();
    let mut count = |is_value: bool, is_unknown: bool| {
        if is_value {
            population.known += 1;
        } else if is_unknown {
            population.unknown += 1;
        }
    };
    count(input.value_bool.is_value(), input.value_bool.is_unknown());
    count(input.value_int.is_value(), input.value_int.is_unknown());
    count(
        input.value_single_select.is_value(),
        input.value_single_select.is_unknown(),
    );
    count(
        input
            .value_multi_select
            .as_ref()
            .map_or(false, |items| !items.is_empty()),
        input.value_multi_select.is_unknown(),
    );
    count(input.value_string.is_value(), input.value_string.is_unknown());
    count(input.value_code.is_value(), input.value_code.is_unknown());
    population
}

/// Populate exactly the field matching the value type
pub fn to_surface<'a>(value: &IoValue) -> CombinedValue<'a> {
    let mut surface = CombinedValue::default();
    match value {
        IoValue::String(s) => surface.value_string = string_value(s.as_str()),
        IoValue::Int(i) => surface.value_int = Value::Value(*i),
        IoValue::Bool(b) => surface.value_bool = Value::Value(*b),
        IoValue::SingleSelect(s) => surface.value_single_select = string_value(s.as_str()),
        IoValue::MultiSelect(items) => {
            surface.value_multi_select = string_list(items.iter().cloned())
        }
        IoValue::Code(s) => surface.value_code = string_value(s.as_str()),
        IoValue::File(s) => surface.value_file = string_value(s.as_str()),
        IoValue::List(s) => surface.value_list = string_value(s.as_str()),
    }
    surface
}

/// Keep only the fields an output may carry
pub fn to_output_projection<'a>(combined: &CombinedValue<'a>) -> OutputValue<'a> {
    OutputValue {
        value_string: combined.value_string.clone(),
        value_int: combined.value_int,
        value_bool: combined.value_bool,
        value_code: combined.value_code.clone(),
    }
}

/// Keep only the fields an input may carry, `None` for file and list values
pub fn to_input_projection<'a>(combined: &CombinedValue<'a>) -> Option<InputValue<'a>> {
    if combined.value_file.is_value() || combined.value_list.is_value() {
        return None;
    }
    Some(InputValue {
        value_string: combined.value_string.clone(),
        value_int: combined.value_int,
        value_bool: combined.value_bool,
        value_single_select: combined.value_single_select.clone(),
        value_multi_select: combined.value_multi_select.clone(),
        value_code: combined.value_code.clone(),
    })
}

/// Decode a list of wire values into surface values keyed by name
pub fn decode_all<'a>(
    wires: &[WireIo],
) -> Result<std::collections::BTreeMap<Cow<'a, str>, Value<CombinedValue<'a>>>, IoValueError> {
    wires
        .iter()
        .map(|wire| {
            let value = IoValue::from_wire(wire)?;
            Ok((Cow::Owned(wire.key.clone()), Value::Value(to_surface(&value))))
        })
        .collect()
}

fn value_attribute(attr_type: AttributeType, description: &str) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    }
}

fn value_attributes(types: &[IoType]) -> HashMap<String, Attribute> {
    types
        .iter()
        .map(|io_type| {
            let (name, attribute) = match io_type {
                IoType::String => (
                    "value_string",
                    value_attribute(AttributeType::String, "String value"),
                ),
                IoType::Integer => (
                    "value_int",
                    value_attribute(AttributeType::Number, "Integer value"),
                ),
                IoType::Boolean => (
                    "value_bool",
                    value_attribute(AttributeType::Bool, "Boolean value"),
                ),
                IoType::SingleSelect => (
                    "value_single_select",
                    value_attribute(AttributeType::String, "Selected option"),
                ),
                IoType::MultiSelect => (
                    "value_multi_select",
                    value_attribute(
                        AttributeType::List(AttributeType::String.into()),
                        "Selected options",
                    ),
                ),
                IoType::Code => (
                    "value_code",
                    value_attribute(AttributeType::String, "Code value"),
                ),
                IoType::File => (
                    "value_file",
                    value_attribute(AttributeType::String, "File handle"),
                ),
                IoType::List => (
                    "value_list",
                    Attribute {
                        deprecated: true,
                        ..value_attribute(AttributeType::String, "JSON encoded list of objects")
                    },
                ),
            };
            (name.to_owned(), attribute)
        })
        .collect()
}

/// Nested attributes of an [`InputValue`]
pub fn input_attributes() -> HashMap<String, Attribute> {
    value_attributes(&[
        IoType::String,
        IoType::Integer,
        IoType::Boolean,
        IoType::SingleSelect,
        IoType::MultiSelect,
        IoType::Code,
    ])
}

/// Nested attributes of a [`CombinedValue`]
pub fn combined_attributes() -> HashMap<String, Attribute> {
    value_attributes(&[
        IoType::String,
        IoType::Integer,
        IoType::Boolean,
        IoType::SingleSelect,
        IoType::MultiSelect,
        IoType::Code,
        IoType::File,
        IoType::List,
    ])
}

/// Nested attributes of an [`OutputValue`]
pub fn output_attributes() -> HashMap<String, Attribute> {
    value_attributes(&[IoType::String, IoType::Integer, IoType::Boolean, IoType::Code])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn wire(key: &str, value: serde_json::Value, value_type: &str) -> WireIo {
        WireIo {
            key: key.to_owned(),
            value,
            value_type: value_type.to_owned(),
        }
    }

    fn single_field_inputs() -> Vec<InputValue<'static>> {
        vec![
            InputValue {
                value_string: string_value("hello"),
                ..Default::default()
            },
            InputValue {
                value_int: Value::Value(-42),
                ..Default::default()
            },
            InputValue {
                value_bool: Value::Value(false),
                ..Default::default()
            },
            InputValue {
                value_single_select: string_value("eu-west"),
                ..Default::default()
            },
            InputValue {
                value_multi_select: string_list(["a", "b"]),
                ..Default::default()
            },
            InputValue {
                value_code: string_value("resource \"x\" {}"),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn single_field_inputs_round_trip() {
        for input in single_field_inputs() {
            let value = extract_value(&input).unwrap();
            let surface = to_surface(&value);
            assert_eq!(to_input_projection(&surface), Some(input.clone()));

            let wire = value.to_wire("key").unwrap();
            assert_eq!(IoValue::from_wire(&wire).unwrap(), value);
        }
    }

    #[test]
    fn file_and_list_round_trip_through_the_wire() {
        for wire in [
            wire("file", json!("files/handle-1"), "FILE"),
            wire("list", json!([{"name": "a"}, {"name": "b"}]), "LIST"),
        ] {
            let value = IoValue::from_wire(&wire).unwrap();
            assert_eq!(value.to_wire(wire.key.as_str()).unwrap(), wire);
        }
    }

    #[test]
    fn empty_input_has_no_value() {
        assert_eq!(
            extract_value(&InputValue::default()),
            Err(IoValueError::NoValue)
        );
        assert_eq!(population(&InputValue::default()), Population::default());
    }

    #[test]
    fn empty_multi_select_is_absent() {
        let input = InputValue {
            value_multi_select: Value::Value(vec![]),
            ..Default::default()
        };
        assert_eq!(extract_value(&input), Err(IoValueError::NoValue));
        assert_eq!(population(&input).known, 0);
    }

    #[test]
    fn unknown_fields_are_not_extracted() {
        let input = InputValue {
            value_bool: Value::Unknown,
            value_string: string_value("fallback"),
            ..Default::default()
        };
        assert_eq!(
            extract_value(&input),
            Ok(IoValue::String("fallback".to_owned()))
        );
        assert_eq!(
            population(&input),
            Population {
                known: 1,
                unknown: 1
            }
        );
    }

    // Pins the precedence used when several fields are set: bool > int > single select
    // > multi select > string > code.
    #[test]
    fn several_fields_follow_extraction_order() {
        let mut input = InputValue {
            value_string: string_value("s"),
            value_int: Value::Value(1),
            value_bool: Value::Value(true),
            value_single_select: string_value("single"),
            value_multi_select: string_list(["m"]),
            value_code: string_value("c"),
        };
        assert_eq!(population(&input).known, 6);

        let mut winners = Vec::new();
        loop {
            let Ok(value) = extract_value(&input) else {
                break;
            };
            winners.push(value.io_type());
            match value.io_type() {
                IoType::Boolean => input.value_bool = Value::Null,
                IoType::Integer => input.value_int = Value::Null,
                IoType::SingleSelect => input.value_single_select = Value::Null,
                IoType::MultiSelect => input.value_multi_select = Value::Null,
                IoType::String => input.value_string = Value::Null,
                IoType::Code => input.value_code = Value::Null,
                IoType::File | IoType::List => unreachable!(),
            }
        }
        assert_eq!(
            winners,
            [
                IoType::Boolean,
                IoType::Integer,
                IoType::SingleSelect,
                IoType::MultiSelect,
                IoType::String,
                IoType::Code,
            ]
        );
    }

    #[test]
    fn multi_select_keeps_order() {
        let input = InputValue {
            value_multi_select: string_list(["a", "b"]),
            ..Default::default()
        };
        let wire = extract_value(&input).unwrap().to_wire("regions").unwrap();
        assert_eq!(wire.value_type, "MULTI_SELECT");
        assert_eq!(wire.value, json!(["a", "b"]));

        let surface = to_surface(&IoValue::from_wire(&wire).unwrap());
        assert_eq!(surface.value_multi_select, string_list(["a", "b"]));
    }

    #[test]
    fn surface_populates_a_single_field() {
        let surface = to_surface(&IoValue::File("handle".to_owned()));
        assert_eq!(surface.value_file, string_value("handle"));
        assert_eq!(
            CombinedValue {
                value_file: Value::Null,
                ..surface
            },
            CombinedValue::default()
        );
    }

    #[test]
    fn output_projection_drops_select_file_and_list() {
        let combined = CombinedValue {
            value_string: string_value("s"),
            value_int: Value::Value(3),
            value_bool: Value::Value(true),
            value_single_select: string_value("single"),
            value_multi_select: string_list(["m"]),
            value_code: string_value("c"),
            value_file: string_value("f"),
            value_list: string_value("[]"),
        };
        let output = to_output_projection(&combined);
        assert_eq!(
            output,
            OutputValue {
                value_string: string_value("s"),
                value_int: Value::Value(3),
                value_bool: Value::Value(true),
                value_code: string_value("c"),
            }
        );

        for value in [
            IoValue::SingleSelect("x".to_owned()),
            IoValue::MultiSelect(vec!["x".to_owned()]),
            IoValue::File("x".to_owned()),
            IoValue::List("[]".to_owned()),
        ] {
            assert_eq!(
                to_output_projection(&to_surface(&value)),
                OutputValue::default()
            );
        }
    }

    #[test]
    fn integers_accept_integral_floats() {
        assert_eq!(
            IoValue::from_wire(&wire("count", json!(3.0), "INTEGER")),
            Ok(IoValue::Int(3))
        );
    }

    #[test]
    fn mismatched_values_are_decode_errors() {
        for wire in [
            wire("count", json!("three"), "INTEGER"),
            wire("count", json!(3.5), "INTEGER"),
            wire("flag", json!("true"), "BOOLEAN"),
            wire("name", json!(12), "STRING"),
            wire("regions", json!(["a", 1]), "MULTI_SELECT"),
            wire("list", json!("not json"), "LIST"),
            wire("missing", serde_json::Value::Null, "CODE"),
        ] {
            assert!(
                matches!(IoValue::from_wire(&wire), Err(IoValueError::Decode { .. })),
                "{wire:?} should not decode"
            );
        }
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert_eq!(
            IoValue::from_wire(&wire("k", json!("v"), "FLOAT")),
            Err(IoValueError::UnknownType("FLOAT".to_owned()))
        );
    }

    #[test]
    fn string_encoded_lists_are_sent_as_arrays() {
        let read = wire("list", json!("[1, 2]"), "LIST");
        let value = IoValue::from_wire(&read).unwrap();
        assert_eq!(value.to_wire("list").unwrap().value, json!([1, 2]));
    }

    #[test]
    fn list_surface_must_hold_a_json_list() {
        assert!(IoValue::List("{\"a\": 1}".to_owned()).to_wire("k").is_err());
    }

    #[test]
    fn wire_values_use_camel_case() {
        let wire: WireIo =
            serde_json::from_value(json!({"key": "k", "value": true, "valueType": "BOOLEAN"}))
                .unwrap();
        assert_eq!(IoValue::from_wire(&wire), Ok(IoValue::Bool(true)));
    }

    #[test]
    fn decode_all_keys_values_by_name() {
        let decoded = decode_all(&[
            wire("a", json!("x"), "STRING"),
            wire("b", json!(2), "INTEGER"),
        ])
        .unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded.get("b"),
            Some(&Value::Value(CombinedValue {
                value_int: Value::Value(2),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn schemas_match_surface_records() {
        assert_eq!(input_attributes().len(), 6);
        assert_eq!(combined_attributes().len(), 8);
        assert!(combined_attributes()["value_list"].deprecated);
        let outputs = output_attributes();
        assert_eq!(outputs.len(), 4);
        assert!(!outputs.contains_key("value_single_select"));
    }
}
