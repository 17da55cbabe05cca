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

use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::io_value::WireIo;

use super::{ClientError, MeshStackClient};

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshbuildingblock.v2-preview.hal+json";
pub const API_VERSION: &str = "v2-preview";
pub const KIND: &str = "meshBuildingBlock";
const PATH: &str = "/api/meshobjects/meshbuildingblocks";

/// Status of a building block run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildingBlockStatus {
    WaitingForDependentInput,
    WaitingForOperatorInput,
    Pending,
    InProgress,
    Succeeded,
    Failed,
    /// Status this provider does not know about, never terminal
    Other(String),
}

impl BuildingBlockStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BuildingBlockStatus::WaitingForDependentInput => "WAITING_FOR_DEPENDENT_INPUT",
            BuildingBlockStatus::WaitingForOperatorInput => "WAITING_FOR_OPERATOR_INPUT",
            BuildingBlockStatus::Pending => "PENDING",
            BuildingBlockStatus::InProgress => "IN_PROGRESS",
            BuildingBlockStatus::Succeeded => "SUCCEEDED",
            BuildingBlockStatus::Failed => "FAILED",
            BuildingBlockStatus::Other(status) => status,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildingBlockStatus::Succeeded | BuildingBlockStatus::Failed
        )
    }
}

impl From<String> for BuildingBlockStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "WAITING_FOR_DEPENDENT_INPUT" => BuildingBlockStatus::WaitingForDependentInput,
            "WAITING_FOR_OPERATOR_INPUT" => BuildingBlockStatus::WaitingForOperatorInput,
            "PENDING" => BuildingBlockStatus::Pending,
            "IN_PROGRESS" => BuildingBlockStatus::InProgress,
            "SUCCEEDED" => BuildingBlockStatus::Succeeded,
            "FAILED" => BuildingBlockStatus::Failed,
            _ => BuildingBlockStatus::Other(value),
        }
    }
}

impl From<BuildingBlockStatus> for String {
    fn from(value: BuildingBlockStatus) -> Self {
        match value {
            BuildingBlockStatus::Other(status) => status,
            status => status.as_str().to_owned(),
        }
    }
}

impl Display for BuildingBlockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlock {
    pub api_version: String,
    pub kind: String,
    pub metadata: BuildingBlockMetadata,
    pub spec: BuildingBlockSpec,
    pub status: BuildingBlockRunStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlockMetadata {
    pub uuid: String,
    #[serde(default)]
    pub owned_by_workspace: String,
    #[serde(default)]
    pub created_on: String,
    #[serde(default)]
    pub marked_for_deletion_on: Option<String>,
    #[serde(default)]
    pub marked_for_deletion_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlockSpec {
    pub display_name: String,
    pub building_block_definition_version_ref: DefinitionVersionRef,
    pub target_ref: TargetRef,
    #[serde(default)]
    pub inputs: Vec<WireIo>,
    #[serde(default)]
    pub parent_building_blocks: Vec<ParentBuildingBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DefinitionVersionRef {
    pub uuid: String,
}

/// Object the building block is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TargetRef {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParentBuildingBlock {
    pub building_block_uuid: String,
    pub definition_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlockRunStatus {
    pub status: BuildingBlockStatus,
    #[serde(default)]
    pub outputs: Vec<WireIo>,
    #[serde(default)]
    pub force_purge: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildingBlockCreate<'a> {
    api_version: &'static str,
    kind: &'static str,
    spec: &'a BuildingBlockSpec,
}

/// Read access to building blocks, as needed to follow their lifecycle
#[async_trait]
pub trait BuildingBlockReader: Send + Sync {
    /// Get the current state of a building block, `None` if it does not exist
    async fn read_building_block(&self, uuid: &str) -> Result<Option<BuildingBlock>, ClientError>;
}

/// Building block operations used by the building block resource
#[async_trait]
pub trait BuildingBlockApi: BuildingBlockReader {
    async fn create_building_block(
        &self,
        spec: &BuildingBlockSpec,
    ) -> Result<BuildingBlock, ClientError>;
    async fn delete_building_block(&self, uuid: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl BuildingBlockReader for MeshStackClient {
    async fn read_building_block(&self, uuid: &str) -> Result<Option<BuildingBlock>, ClientError> {
        self.get(&format!("{PATH}/{uuid}"), MEDIA_TYPE).await
    }
}

#[async_trait]
impl BuildingBlockApi for MeshStackClient {
    async fn create_building_block(
        &self,
        spec: &BuildingBlockSpec,
    ) -> Result<BuildingBlock, ClientError> {
        let body = BuildingBlockCreate {
            api_version: API_VERSION,
            kind: KIND,
            spec,
        };
        self.post(PATH, MEDIA_TYPE, &body).await
    }

    async fn delete_building_block(&self, uuid: &str) -> Result<(), ClientError> {
        self.delete(&format!("{PATH}/{uuid}"), MEDIA_TYPE).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn building_blocks_decode_from_the_api() {
        let building_block: BuildingBlock = serde_json::from_value(json!({
            "apiVersion": "v2-preview",
            "kind": "meshBuildingBlock",
            "metadata": {
                "uuid": "2a1b",
                "ownedByWorkspace": "platform-team",
                "createdOn": "2024-11-04T10:00:00Z",
                "markedForDeletionOn": null,
                "markedForDeletionBy": null
            },
            "spec": {
                "displayName": "bucket",
                "buildingBlockDefinitionVersionRef": {"uuid": "def-v1"},
                "targetRef": {"kind": "meshWorkspace", "identifier": "platform-team"},
                "inputs": [
                    {"key": "region", "value": "eu-west-1", "valueType": "STRING"},
                    {"key": "versions", "value": 3, "valueType": "INTEGER"}
                ],
                "parentBuildingBlocks": [
                    {"buildingBlockUuid": "parent", "definitionUuid": "parent-def"}
                ]
            },
            "status": {
                "status": "IN_PROGRESS",
                "outputs": [],
                "forcePurge": false
            }
        }))
        .unwrap();

        assert_eq!(building_block.metadata.uuid, "2a1b");
        assert_eq!(building_block.spec.inputs.len(), 2);
        assert_eq!(building_block.spec.target_ref.uuid, None);
        assert_eq!(
            building_block.spec.parent_building_blocks[0].definition_uuid,
            "parent-def"
        );
        assert_eq!(building_block.status.status, BuildingBlockStatus::InProgress);
    }

    #[test]
    fn statuses_keep_unknown_values() {
        let status: BuildingBlockStatus = serde_json::from_value(json!("ABORTED")).unwrap();
        assert_eq!(status, BuildingBlockStatus::Other("ABORTED".to_owned()));
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("ABORTED"));

        for terminal in ["SUCCEEDED", "FAILED"] {
            assert!(BuildingBlockStatus::from(terminal.to_owned()).is_terminal());
        }
        for running in [
            "WAITING_FOR_DEPENDENT_INPUT",
            "WAITING_FOR_OPERATOR_INPUT",
            "PENDING",
            "IN_PROGRESS",
        ] {
            let status = BuildingBlockStatus::from(running.to_owned());
            assert!(!status.is_terminal());
            assert_eq!(status.as_str(), running);
        }
    }

    #[test]
    fn create_requests_carry_version_and_kind() {
        let spec = BuildingBlockSpec {
            display_name: "bucket".to_owned(),
            building_block_definition_version_ref: DefinitionVersionRef {
                uuid: "def-v1".to_owned(),
            },
            target_ref: TargetRef {
                kind: "meshTenant".to_owned(),
                uuid: Some("tenant".to_owned()),
                identifier: None,
            },
            ..Default::default()
        };
        let body = serde_json::to_value(BuildingBlockCreate {
            api_version: API_VERSION,
            kind: KIND,
            spec: &spec,
        })
        .unwrap();

        assert_eq!(body["apiVersion"], "v2-preview");
        assert_eq!(body["kind"], "meshBuildingBlock");
        assert_eq!(
            body["spec"]["targetRef"],
            json!({"kind": "meshTenant", "uuid": "tenant"})
        );
        assert_eq!(body["spec"]["inputs"], json!([]));
    }
}
