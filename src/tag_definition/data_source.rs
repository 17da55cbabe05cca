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

use async_trait::async_trait;

use tf_provider::{AttributePath, DataSource, Diagnostics};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};

use crate::client::tag_definition::TagDefinition;
use crate::client::SharedClient;
use crate::utils::{known_str, report, required_str, required_value, WithSchema};

use super::state::{DataSourceSchema, ListState, State};

#[derive(Debug, Clone)]
pub struct TagDefinitionDataSource {
    client: SharedClient,
}

impl TagDefinitionDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for TagDefinitionDataSource {
    type State<'a> = State<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(DataSourceSchema::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let metadata = required_value(diags, &config.metadata, AttributePath::new("metadata"))?;
        let name_path = AttributePath::new("metadata").attribute("name");
        let name = required_str(diags, &metadata.name, name_path.clone())?;

        match client.read_tag_definition(name).await {
            Ok(Some(tag_definition)) => Some(State::from_remote(&tag_definition)),
            Ok(None) => {
                diags.error(
                    "Tag definition not found",
                    format!("No tag definition is named `{name}`"),
                    name_path,
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to read tag definition", err);
                None
            }
        }
    }
}

/// `meshstack_tag_definitions`: every tag definition, optionally of a single target kind
#[derive(Debug, Clone)]
pub struct TagDefinitionsDataSource {
    client: SharedClient,
}

impl TagDefinitionsDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

pub(crate) fn select<'a>(
    tag_definitions: &[TagDefinition],
    target_kind: Option<&str>,
) -> Vec<Value<State<'a>>> {
    tag_definitions
        .iter()
        .filter(|tag_definition| {
            target_kind.map_or(true, |kind| tag_definition.spec.target_kind == kind)
        })
        .map(|tag_definition| Value::Value(State::from_remote(tag_definition)))
        .collect()
}

#[async_trait]
impl DataSource for TagDefinitionsDataSource {
    type State<'a> = ListState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ListState::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;

        match client.list_tag_definitions().await {
            Ok(tag_definitions) => Some(ListState {
                tag_definitions: Value::Value(select(
                    &tag_definitions,
                    known_str(&config.target_kind),
                )),
                ..config
            }),
            Err(err) => {
                report(diags, "Failed to list tag definitions", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tag_definition::TagDefinitionSpec;
    use crate::tag_definition::convert::tests::environment_tag;

    use super::*;

    #[test]
    fn tag_definitions_are_filtered_by_target_kind() {
        let workspace_tag = TagDefinition::new(TagDefinitionSpec {
            target_kind: "meshWorkspace".to_owned(),
            key: "cost-center".to_owned(),
            display_name: "Cost center".to_owned(),
            ..Default::default()
        });
        let tag_definitions = [environment_tag(), workspace_tag];

        assert_eq!(select(&tag_definitions, None).len(), 2);
        let selected = select(&tag_definitions, Some("meshWorkspace"));
        assert_eq!(selected.len(), 1);
        assert_eq!(
            selected[0].as_ref_option().unwrap().name(),
            Some("meshWorkspace.cost-center")
        );
    }
}
