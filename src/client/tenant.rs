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

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshtenant.v4-preview.hal+json";
pub const API_VERSION: &str = "v4-preview";
pub const KIND: &str = "meshTenant";
const PATH: &str = "/api/meshobjects/meshtenants";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub api_version: String,
    pub kind: String,
    pub metadata: TenantMetadata,
    pub spec: TenantSpec,
    #[serde(default)]
    pub status: TenantStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantMetadata {
    #[serde(default)]
    pub uuid: String,
    pub owned_by_workspace: String,
    pub owned_by_project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_for_deletion_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    pub platform_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_zone_identifier: Option<String>,
    #[serde(default)]
    pub quotas: Vec<Quota>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Quota {
    pub key: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatus {
    #[serde(default)]
    pub tenant_name: String,
    #[serde(default)]
    pub platform_type_identifier: String,
    #[serde(default)]
    pub platform_workspace_identifier: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TenantCreate<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: TenantCreateMetadata<'a>,
    spec: &'a TenantSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TenantCreateMetadata<'a> {
    owned_by_workspace: &'a str,
    owned_by_project: &'a str,
}

impl MeshStackClient {
    pub async fn read_tenant(&self, uuid: &str) -> Result<Option<Tenant>, ClientError> {
        self.get(&format!("{PATH}/{uuid}"), MEDIA_TYPE).await
    }

    pub async fn create_tenant(
        &self,
        workspace: &str,
        project: &str,
        spec: &TenantSpec,
    ) -> Result<Tenant, ClientError> {
        let body = TenantCreate {
            api_version: API_VERSION,
            kind: KIND,
            metadata: TenantCreateMetadata {
                owned_by_workspace: workspace,
                owned_by_project: project,
            },
            spec,
        };
        self.post(PATH, MEDIA_TYPE, &body).await
    }

    pub async fn delete_tenant(&self, uuid: &str) -> Result<(), ClientError> {
        self.delete(&format!("{PATH}/{uuid}"), MEDIA_TYPE).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tenants_decode_from_the_api() {
        let tenant: Tenant = serde_json::from_value(json!({
            "apiVersion": "v4-preview",
            "kind": "meshTenant",
            "metadata": {
                "uuid": "7e1c",
                "ownedByWorkspace": "platform",
                "ownedByProject": "prod",
                "createdOn": "2024-01-01T00:00:00Z",
                "markedForDeletionOn": null
            },
            "spec": {
                "platformIdentifier": "aws.eu-central-1",
                "localId": "123456789012",
                "landingZoneIdentifier": "sandbox",
                "quotas": [{"key": "vcpu", "value": 16}]
            },
            "status": {
                "tenantName": "platform.prod.aws",
                "platformTypeIdentifier": "AWS",
                "platformWorkspaceIdentifier": "aws",
                "tags": {"environment": ["prod"]}
            }
        }))
        .unwrap();

        assert_eq!(tenant.metadata.uuid, "7e1c");
        assert_eq!(
            tenant.spec.quotas,
            [Quota {
                key: "vcpu".to_owned(),
                value: 16
            }]
        );
        assert_eq!(tenant.status.platform_type_identifier, "AWS");
    }

    #[test]
    fn create_requests_only_carry_ownership() {
        let spec = TenantSpec {
            platform_identifier: "aws.eu-central-1".to_owned(),
            ..Default::default()
        };
        let body = serde_json::to_value(TenantCreate {
            api_version: API_VERSION,
            kind: KIND,
            metadata: TenantCreateMetadata {
                owned_by_workspace: "platform",
                owned_by_project: "prod",
            },
            spec: &spec,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "apiVersion": "v4-preview",
                "kind": "meshTenant",
                "metadata": {"ownedByWorkspace": "platform", "ownedByProject": "prod"},
                "spec": {"platformIdentifier": "aws.eu-central-1", "quotas": []}
            })
        );
    }
}
