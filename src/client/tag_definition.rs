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

use serde::{Deserialize, Serialize};

use super::{ClientError, MeshStackClient};

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshtagdefinition.v1.hal+json";
pub const API_VERSION: &str = "v1";
pub const KIND: &str = "meshTagDefinition";
const PATH: &str = "/api/meshobjects/meshtagdefinitions";
const EMBEDDED_KEY: &str = "meshTagDefinitions";

/// meshObject kinds a tag can be defined for
pub const TARGET_KINDS: &[&str] = &[
    "meshProject",
    "meshWorkspace",
    "meshLandingZone",
    "meshPaymentMethod",
    "meshBuildingBlockDefinition",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDefinition {
    pub api_version: String,
    pub kind: String,
    pub metadata: TagDefinitionMetadata,
    pub spec: TagDefinitionSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TagDefinitionMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagDefinitionSpec {
    pub target_kind: String,
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub value_type: TagValueType,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub once_editable: bool,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub immutable: bool,
}

/// Type of the values of a tag, exactly one field is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagValueType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<TagValueString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<TagValueString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer: Option<TagValueInteger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<TagValueNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_select: Option<TagValueSingleSelect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_select: Option<TagValueMultiSelect>,
}

impl TagValueType {
    /// Number of value types that are set
    pub fn populated(&self) -> usize {
        [
            self.string.is_some(),
            self.email.is_some(),
            self.integer.is_some(),
            self.number.is_some(),
            self.single_select.is_some(),
            self.multi_select.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagValueString {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagValueInteger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagValueNumber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagValueSingleSelect {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagValueMultiSelect {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<String>>,
}

impl TagDefinition {
    pub fn new(spec: TagDefinitionSpec) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata: TagDefinitionMetadata {
                name: tag_definition_name(&spec.target_kind, &spec.key),
            },
            spec,
        }
    }
}

/// Name of a tag definition: `<targetKind>.<key>`
pub fn tag_definition_name(target_kind: &str, key: &str) -> String {
    format!("{target_kind}.{key}")
}

impl MeshStackClient {
    pub async fn read_tag_definition(
        &self,
        name: &str,
    ) -> Result<Option<TagDefinition>, ClientError> {
        self.get(&format!("{PATH}/{name}"), MEDIA_TYPE).await
    }

    pub async fn list_tag_definitions(&self) -> Result<Vec<TagDefinition>, ClientError> {
        self.list(PATH, MEDIA_TYPE, EMBEDDED_KEY, &[]).await
    }

    pub async fn create_tag_definition(
        &self,
        tag_definition: &TagDefinition,
    ) -> Result<TagDefinition, ClientError> {
        self.post(PATH, MEDIA_TYPE, tag_definition).await
    }

    pub async fn update_tag_definition(
        &self,
        tag_definition: &TagDefinition,
    ) -> Result<TagDefinition, ClientError> {
        self.put(
            &format!("{PATH}/{}", tag_definition.metadata.name),
            MEDIA_TYPE,
            tag_definition,
        )
        .await
    }

    pub async fn delete_tag_definition(&self, name: &str) -> Result<(), ClientError> {
        self.delete(&format!("{PATH}/{name}"), MEDIA_TYPE).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tag_definitions_decode_from_the_api() {
        let tag: TagDefinition = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "meshTagDefinition",
            "metadata": {"name": "meshProject.environment"},
            "spec": {
                "targetKind": "meshProject",
                "key": "environment",
                "displayName": "Environment",
                "description": "Stage of the project",
                "valueType": {
                    "singleSelect": {"options": ["dev", "prod"], "defaultValue": "dev"}
                },
                "sensitive": false,
                "onceEditable": false,
                "restricted": true,
                "mandatory": true,
                "immutable": false
            }
        }))
        .unwrap();

        assert_eq!(tag.spec.value_type.populated(), 1);
        let single_select = tag.spec.value_type.single_select.unwrap();
        assert_eq!(single_select.options, ["dev", "prod"]);
        assert_eq!(single_select.default_value.as_deref(), Some("dev"));
        assert!(tag.spec.restricted);
    }

    #[test]
    fn names_are_derived_from_kind_and_key() {
        let tag = TagDefinition::new(TagDefinitionSpec {
            target_kind: "meshWorkspace".to_owned(),
            key: "cost-center".to_owned(),
            display_name: "Cost center".to_owned(),
            value_type: TagValueType {
                integer: Some(TagValueInteger::default()),
                ..Default::default()
            },
            ..Default::default()
        });

        assert_eq!(tag.metadata.name, "meshWorkspace.cost-center");
        let body = serde_json::to_value(&tag).unwrap();
        assert_eq!(body["spec"]["valueType"], json!({"integer": {}}));
    }
}
