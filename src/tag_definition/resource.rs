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
use tracing::{info, warn};

use tf_provider::{AttributePath, Diagnostics, Resource};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};

use crate::client::tag_definition::tag_definition_name;
use crate::client::SharedClient;
use crate::utils::{known_str, report, string_value, WithSchema};

use super::state::{ResourceSchema, State, StateMetadata};

#[derive(Debug, Clone)]
pub struct TagDefinitionResource {
    client: SharedClient,
}

impl TagDefinitionResource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

/// Plan a tag definition
///
/// The name derives from the target kind and the key: changing them replaces the definition.
pub(crate) fn plan<'a>(
    prior: Option<&State<'a>>,
    proposed: State<'a>,
) -> (State<'a>, Vec<AttributePath>) {
    let mut state = proposed;
    let mut trigger_replace = Vec::new();

    if let Value::Value(spec) = &mut state.spec {
        for flag in [
            &mut spec.sensitive,
            &mut spec.once_editable,
            &mut spec.restricted,
            &mut spec.mandatory,
            &mut spec.immutable,
        ] {
            if flag.is_null() {
                *flag = Value::Value(false);
            }
        }
        if spec.description.is_null() {
            spec.description = string_value("");
        }

        if let Some(prior_spec) = prior.and_then(|prior| prior.spec.as_ref_option()) {
            if prior_spec.target_kind != spec.target_kind {
                trigger_replace.push(AttributePath::new("spec").attribute("target_kind"));
            }
            if prior_spec.key != spec.key {
                trigger_replace.push(AttributePath::new("spec").attribute("key"));
            }
        }

        let name = match (known_str(&spec.target_kind), known_str(&spec.key)) {
            (Some(target_kind), Some(key)) => string_value(tag_definition_name(target_kind, key)),
            _ => Value::Unknown,
        };
        state.metadata = Value::Value(StateMetadata { name });
    }

    (state, trigger_replace)
}

#[async_trait]
impl Resource for TagDefinitionResource {
    type State<'a> = State<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ResourceSchema::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(spec) = &config.spec {
            spec.validate(diags, AttributePath::new("spec"));
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let Some(name) = state.name() else {
            diags.root_error_short("Tag definition state has no name");
            return None;
        };
        match client.read_tag_definition(name).await {
            Ok(Some(tag_definition)) => Some((State::from_remote(&tag_definition), private_state)),
            Ok(None) => {
                warn!(name, "tag definition was deleted outside of terraform");
                None
            }
            Err(err) => {
                report(diags, "Failed to read tag definition", err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (state, _) = plan(None, proposed_state);
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let (state, trigger_replace) = plan(Some(&prior_state), proposed_state);
        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let tag_definition = planned_state.to_remote(diags)?;
        match client.create_tag_definition(&tag_definition).await {
            Ok(tag_definition) => {
                info!(name = %tag_definition.metadata.name, "tag definition created");
                Some((State::from_remote(&tag_definition), planned_private_state))
            }
            Err(err) => {
                report(diags, "Failed to create tag definition", err);
                None
            }
        }
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let tag_definition = planned_state.to_remote(diags)?;
        match client.update_tag_definition(&tag_definition).await {
            Ok(tag_definition) => Some((State::from_remote(&tag_definition), planned_private_state)),
            Err(err) => {
                report(diags, "Failed to update tag definition", err);
                None
            }
        }
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags)?;
        let Some(name) = prior_state.name() else {
            diags.root_error_short("Tag definition state has no name");
            return None;
        };
        match client.delete_tag_definition(name).await {
            Ok(()) => {
                info!(name, "tag definition deleted");
                Some(())
            }
            Err(err) => {
                report(diags, "Failed to delete tag definition", err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        match client.read_tag_definition(&id).await {
            Ok(Some(tag_definition)) => {
                Some((State::from_remote(&tag_definition), Default::default()))
            }
            Ok(None) => {
                diags.root_error(
                    "Tag definition not found",
                    format!("No tag definition is named `{id}`"),
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to import tag definition", err);
                None
            }
        }
    }
}
