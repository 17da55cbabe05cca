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

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshproject.v2.hal+json";
pub const API_VERSION: &str = "v2";
pub const KIND: &str = "meshProject";
const PATH: &str = "/api/meshobjects/meshprojects";
const EMBEDDED_KEY: &str = "meshProjects";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub api_version: String,
    pub kind: String,
    pub metadata: ProjectMetadata,
    pub spec: ProjectSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub name: String,
    pub owned_by_workspace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    pub display_name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute_payment_method_identifier: Option<String>,
}

impl Project {
    pub fn new(metadata: ProjectMetadata, spec: ProjectSpec) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata,
            spec,
        }
    }

    /// Identifier used by the API: `<workspace>.<name>`
    pub fn identifier(&self) -> String {
        project_identifier(&self.metadata.owned_by_workspace, &self.metadata.name)
    }
}

pub fn project_identifier(workspace: &str, name: &str) -> String {
    format!("{workspace}.{name}")
}

/// Split a project identifier into its workspace and name
pub fn parse_project_identifier(identifier: &str) -> Option<(&str, &str)> {
    match identifier.split_once('.') {
        Some((workspace, name)) if !workspace.is_empty() && !name.is_empty() => {
            Some((workspace, name))
        }
        _ => None,
    }
}

impl MeshStackClient {
    pub async fn read_project(
        &self,
        workspace: &str,
        name: &str,
    ) -> Result<Option<Project>, ClientError> {
        let identifier = project_identifier(workspace, name);
        self.get(&format!("{PATH}/{identifier}"), MEDIA_TYPE).await
    }

    pub async fn list_projects(&self, workspace: &str) -> Result<Vec<Project>, ClientError> {
        self.list(
            PATH,
            MEDIA_TYPE,
            EMBEDDED_KEY,
            &[("workspaceIdentifier", workspace)],
        )
        .await
    }

    pub async fn create_project(&self, project: &Project) -> Result<Project, ClientError> {
        self.post(PATH, MEDIA_TYPE, project).await
    }

    pub async fn update_project(&self, project: &Project) -> Result<Project, ClientError> {
        self.put(
            &format!("{PATH}/{}", project.identifier()),
            MEDIA_TYPE,
            project,
        )
        .await
    }

    pub async fn delete_project(&self, workspace: &str, name: &str) -> Result<(), ClientError> {
        let identifier = project_identifier(workspace, name);
        self.delete(&format!("{PATH}/{identifier}"), MEDIA_TYPE)
            .await
    }
}
