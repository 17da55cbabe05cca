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

//! Role bindings of users and groups on projects and workspaces
//!
//! The four binding kinds share the same shape and only differ by their
//! endpoint, their media type, and whether their target lives in a workspace.

use serde::{Deserialize, Serialize};

use super::{ClientError, MeshStackClient};

/// Static description of a binding kind
pub trait BindingKind: Send + Sync + 'static {
    const KIND: &'static str;
    const API_VERSION: &'static str;
    const MEDIA_TYPE: &'static str;
    const PATH: &'static str;
    /// Project bindings target a project inside a workspace
    const TARGET_IN_WORKSPACE: bool;
    /// Subject of the binding, for documentation
    const SUBJECT: &'static str;
    /// Target of the binding, for documentation
    const TARGET: &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectUserBinding;
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectGroupBinding;
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceUserBinding;
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceGroupBinding;

impl BindingKind for ProjectUserBinding {
    const KIND: &'static str = "meshProjectUserBinding";
    const API_VERSION: &'static str = "v3";
    const MEDIA_TYPE: &'static str = "application/vnd.meshcloud.api.meshprojectuserbinding.v3.hal+json";
    const PATH: &'static str = "/api/meshobjects/meshprojectbindings/userbindings";
    const TARGET_IN_WORKSPACE: bool = true;
    const SUBJECT: &'static str = "user";
    const TARGET: &'static str = "project";
}

impl BindingKind for ProjectGroupBinding {
    const KIND: &'static str = "meshProjectGroupBinding";
    const API_VERSION: &'static str = "v3";
    const MEDIA_TYPE: &'static str = "application/vnd.meshcloud.api.meshprojectgroupbinding.v3.hal+json";
    const PATH: &'static str = "/api/meshobjects/meshprojectbindings/groupbindings";
    const TARGET_IN_WORKSPACE: bool = true;
    const SUBJECT: &'static str = "group";
    const TARGET: &'static str = "project";
}

impl BindingKind for WorkspaceUserBinding {
    const KIND: &'static str = "meshWorkspaceUserBinding";
    const API_VERSION: &'static str = "v2";
    const MEDIA_TYPE: &'static str = "application/vnd.meshcloud.api.meshworkspaceuserbinding.v2.hal+json";
    const PATH: &'static str = "/api/meshobjects/meshworkspacebindings/userbindings";
    const TARGET_IN_WORKSPACE: bool = false;
    const SUBJECT: &'static str = "user";
    const TARGET: &'static str = "workspace";
}

impl BindingKind for WorkspaceGroupBinding {
    const KIND: &'static str = "meshWorkspaceGroupBinding";
    const API_VERSION: &'static str = "v2";
    const MEDIA_TYPE: &'static str = "application/vnd.meshcloud.api.meshworkspacegroupbinding.v2.hal+json";
    const PATH: &'static str = "/api/meshobjects/meshworkspacebindings/groupbindings";
    const TARGET_IN_WORKSPACE: bool = false;
    const SUBJECT: &'static str = "group";
    const TARGET: &'static str = "workspace";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub api_version: String,
    pub kind: String,
    pub metadata: BindingMetadata,
    pub role_ref: NameRef,
    pub target_ref: TargetRef,
    pub subject: NameRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BindingMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by_workspace: Option<String>,
}

impl Binding {
    pub fn new<K: BindingKind>(
        name: String,
        role: String,
        target: TargetRef,
        subject: String,
    ) -> Self {
        Self {
            api_version: K::API_VERSION.to_owned(),
            kind: K::KIND.to_owned(),
            metadata: BindingMetadata { name },
            role_ref: NameRef { name: role },
            target_ref: target,
            subject: NameRef { name: subject },
        }
    }
}

impl MeshStackClient {
    pub async fn read_binding<K: BindingKind>(
        &self,
        name: &str,
    ) -> Result<Option<Binding>, ClientError> {
        self.get(&format!("{}/{name}", K::PATH), K::MEDIA_TYPE)
            .await
    }

    pub async fn create_binding<K: BindingKind>(
        &self,
        binding: &Binding,
    ) -> Result<Binding, ClientError> {
        self.post(K::PATH, K::MEDIA_TYPE, binding).await
    }

    pub async fn delete_binding<K: BindingKind>(&self, name: &str) -> Result<(), ClientError> {
        self.delete(&format!("{}/{name}", K::PATH), K::MEDIA_TYPE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn project_bindings_target_a_workspace_project() {
        let binding = Binding::new::<ProjectUserBinding>(
            "dev-access".to_owned(),
            "Project Reader".to_owned(),
            TargetRef {
                name: "prod".to_owned(),
                owned_by_workspace: Some("platform".to_owned()),
            },
            "jane@example.com".to_owned(),
        );

        assert_eq!(
            serde_json::to_value(&binding).unwrap(),
            json!({
                "apiVersion": "v3",
                "kind": "meshProjectUserBinding",
                "metadata": {"name": "dev-access"},
                "roleRef": {"name": "Project Reader"},
                "targetRef": {"name": "prod", "ownedByWorkspace": "platform"},
                "subject": {"name": "jane@example.com"}
            })
        );
    }

    #[test]
    fn workspace_bindings_decode_without_owner() {
        let binding: Binding = serde_json::from_value(json!({
            "apiVersion": "v2",
            "kind": "meshWorkspaceGroupBinding",
            "metadata": {"name": "admins"},
            "roleRef": {"name": "Workspace Manager"},
            "targetRef": {"name": "platform"},
            "subject": {"name": "platform-admins"}
        }))
        .unwrap();

        assert_eq!(binding.target_ref.owned_by_workspace, None);
        assert_eq!(binding.subject.name, "platform-admins");
        assert!(!WorkspaceGroupBinding::TARGET_IN_WORKSPACE);
    }
}
