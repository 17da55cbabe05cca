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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ClientError, MeshStackClient};

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshworkspace.v2.hal+json";
pub const API_VERSION: &str = "v2";
pub const KIND: &str = "meshWorkspace";
const PATH: &str = "/api/meshobjects/meshworkspaces";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub api_version: String,
    pub kind: String,
    pub metadata: WorkspaceMetadata,
    pub spec: WorkspaceSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_on: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    pub display_name: String,
}

impl Workspace {
    pub fn new(metadata: WorkspaceMetadata, spec: WorkspaceSpec) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata,
            spec,
        }
    }
}

impl MeshStackClient {
    pub async fn read_workspace(&self, name: &str) -> Result<Option<Workspace>, ClientError> {
        self.get(&format!("{PATH}/{name}"), MEDIA_TYPE).await
    }

    pub async fn create_workspace(&self, workspace: &Workspace) -> Result<Workspace, ClientError> {
        self.post(PATH, MEDIA_TYPE, workspace).await
    }

    pub async fn update_workspace(&self, workspace: &Workspace) -> Result<Workspace, ClientError> {
        self.put(
            &format!("{PATH}/{}", workspace.metadata.name),
            MEDIA_TYPE,
            workspace,
        )
        .await
    }

    pub async fn delete_workspace(&self, name: &str) -> Result<(), ClientError> {
        self.delete(&format!("{PATH}/{name}"), MEDIA_TYPE).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn workspaces_decode_from_the_api() {
        let workspace: Workspace = serde_json::from_value(json!({
            "apiVersion": "v2",
            "kind": "meshWorkspace",
            "metadata": {
                "name": "platform",
                "createdOn": "2024-01-01T00:00:00Z",
                "tags": {"cost-center": ["1234"]}
            },
            "spec": {"displayName": "Platform team"}
        }))
        .unwrap();

        assert_eq!(workspace.metadata.name, "platform");
        assert_eq!(workspace.metadata.tags["cost-center"], ["1234"]);
        assert_eq!(workspace.spec.display_name, "Platform team");
    }

    #[test]
    fn workspaces_without_tags_decode_empty() {
        let workspace: Workspace = serde_json::from_value(json!({
            "apiVersion": "v2",
            "kind": "meshWorkspace",
            "metadata": {"name": "empty"},
            "spec": {"displayName": "Empty"}
        }))
        .unwrap();

        assert!(workspace.metadata.tags.is_empty());
        assert_eq!(workspace.metadata.created_on, None);
    }
}
