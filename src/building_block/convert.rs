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

use tf_provider::{AttributePath, Diagnostics};
use tf_provider::value::{Value, ValueBool, ValueMap};

use crate::client::building_block::{
    BuildingBlock, BuildingBlockMetadata, BuildingBlockRunStatus, BuildingBlockSpec,
    DefinitionVersionRef, ParentBuildingBlock, TargetRef,
};
use crate::io_value::{
    decode_all, extract_value, to_input_projection, to_output_projection, CombinedValue,
    InputValue,
};
use crate::utils::{optional_string_value, required_str, string_value};

use super::validate::check_applied_input;
use super::state::{
    DataSourceState, ResourceState, StateDefinitionRef, StateMetadata, StateParent, StateSpec,
    StateStatus, StateTargetRef,
};

impl<'a> StateMetadata<'a> {
    pub fn from_remote(metadata: &BuildingBlockMetadata) -> Self {
        Self {
            uuid: string_value(metadata.uuid.as_str()),
            owned_by_workspace: string_value(metadata.owned_by_workspace.as_str()),
            created_on: string_value(metadata.created_on.as_str()),
            marked_for_deletion_on: optional_string_value(
                metadata.marked_for_deletion_on.as_deref(),
            ),
            marked_for_deletion_by: optional_string_value(
                metadata.marked_for_deletion_by.as_deref(),
            ),
        }
    }
}

impl<'a> StateStatus<'a> {
    pub fn from_remote(diags: &mut Diagnostics, status: &BuildingBlockRunStatus) -> Option<Self> {
        let outputs = match decode_all(&status.outputs) {
            Ok(outputs) => outputs,
            Err(err) => {
                diags.error(
                    "Invalid building block output",
                    err.to_string(),
                    AttributePath::new("status").attribute("outputs"),
                );
                return None;
            }
        };
        Some(Self {
            status: string_value(status.status.as_str()),
            force_purge: Value::Value(status.force_purge),
            outputs: Value::Value(
                outputs
                    .into_iter()
                    .map(|(key, value)| {
                        (key, value.map(|combined| to_output_projection(&combined)))
                    })
                    .collect(),
            ),
        })
    }
}

impl<'a> StateSpec<'a> {
    /// Build the API representation, encoding every input
    pub fn to_remote(&self, diags: &mut Diagnostics) -> Option<BuildingBlockSpec> {
        let attr_path = AttributePath::new("spec");
        let display_name = required_str(
            diags,
            &self.display_name,
            attr_path.clone().attribute("display_name"),
        );

        let definition_path = attr_path
            .clone()
            .attribute("building_block_definition_version_ref");
        let definition_uuid = match &self.building_block_definition_version_ref {
            Value::Value(definition) => {
                required_str(diags, &definition.uuid, definition_path.attribute("uuid"))
            }
            _ => {
                diags.error_short("Missing building block definition", definition_path);
                None
            }
        };

        let target_path = attr_path.clone().attribute("target_ref");
        let target_ref = match &self.target_ref {
            Value::Value(target) => required_str(diags, &target.kind, target_path.attribute("kind"))
                .map(|kind| TargetRef {
                    kind: kind.to_owned(),
                    uuid: target.uuid.as_deref_option().map(str::to_owned),
                    identifier: target.identifier.as_deref_option().map(str::to_owned),
                }),
            _ => {
                diags.error_short("Missing building block target", target_path);
                None
            }
        };

        let mut inputs = Vec::new();
        for (key, input) in self.inputs.iter().flatten() {
            let input_path = attr_path.clone().attribute("inputs").key(key.to_string());
            let Value::Value(input) = input else {
                diags.error_short("Input must be known at apply time", input_path);
                continue;
            };
            if !check_applied_input(diags, key, input, input_path.clone()) {
                continue;
            }
            match extract_value(input).and_then(|value| value.to_wire(key.to_string())) {
                Ok(wire) => inputs.push(wire),
                Err(err) => diags.error("Invalid building block input", err.to_string(), input_path),
            }
        }

        let parent_building_blocks = self
            .parent_building_blocks
            .iter()
            .flatten()
            .flatten()
            .filter_map(|parent| {
                Some(ParentBuildingBlock {
                    building_block_uuid: parent.building_block_uuid.as_deref_option()?.to_owned(),
                    definition_uuid: parent.definition_uuid.as_deref_option()?.to_owned(),
                })
            })
            .collect();

        if !diags.errors.is_empty() {
            return None;
        }

        Some(BuildingBlockSpec {
            display_name: display_name?.to_owned(),
            building_block_definition_version_ref: DefinitionVersionRef {
                uuid: definition_uuid?.to_owned(),
            },
            target_ref: target_ref?,
            inputs,
            parent_building_blocks,
        })
    }

    /// Build the state from the API representation
    ///
    /// `configured` is the spec written by the practitioner, if any: its inputs, target and
    /// parents are kept as is, as meshStack merges static inputs into the inputs it returns.
    /// Without it (import, data source), inputs are derived from the combined inputs.
    pub fn from_remote(
        diags: &mut Diagnostics,
        spec: &BuildingBlockSpec,
        configured: Option<&StateSpec<'a>>,
    ) -> Option<Self> {
        let combined = match decode_all(&spec.inputs) {
            Ok(combined) => combined,
            Err(err) => {
                diags.error(
                    "Invalid building block input",
                    err.to_string(),
                    AttributePath::new("spec").attribute("combined_inputs"),
                );
                return None;
            }
        };
        let combined_inputs: ValueMap<'a, Value<CombinedValue<'a>>> = Value::Value(combined);

        let (inputs, target_ref, parent_building_blocks) = match configured {
            Some(configured) => (
                configured.inputs.clone(),
                configured.target_ref.clone(),
                configured.parent_building_blocks.clone(),
            ),
            None => (
                Value::Value(project_inputs(&combined_inputs)),
                Value::Value(StateTargetRef {
                    kind: string_value(spec.target_ref.kind.as_str()),
                    uuid: optional_string_value(spec.target_ref.uuid.as_deref()),
                    identifier: optional_string_value(spec.target_ref.identifier.as_deref()),
                }),
                Value::Value(
                    spec.parent_building_blocks
                        .iter()
                        .map(|parent| {
                            Value::Value(StateParent {
                                building_block_uuid: string_value(
                                    parent.building_block_uuid.as_str(),
                                ),
                                definition_uuid: string_value(parent.definition_uuid.as_str()),
                            })
                        })
                        .collect(),
                ),
            ),
        };

        Some(Self {
            display_name: string_value(spec.display_name.as_str()),
            building_block_definition_version_ref: Value::Value(StateDefinitionRef {
                uuid: string_value(spec.building_block_definition_version_ref.uuid.as_str()),
            }),
            target_ref,
            inputs,
            combined_inputs,
            parent_building_blocks,
        })
    }
}

/// Inputs a practitioner could have written, file and list values are left out
fn project_inputs<'a>(
    combined: &ValueMap<'a, Value<CombinedValue<'a>>>,
) -> std::collections::BTreeMap<Cow<'a, str>, Value<InputValue<'a>>> {
    combined
        .iter()
        .flatten()
        .filter_map(|(key, value)| {
            let input = to_input_projection(value.as_ref_option()?)?;
            Some((key.clone(), Value::Value(input)))
        })
        .collect()
}

impl<'a> ResourceState<'a> {
    pub fn from_remote(
        diags: &mut Diagnostics,
        building_block: &BuildingBlock,
        wait_for_completion: ValueBool,
        configured: Option<&StateSpec<'a>>,
    ) -> Option<Self> {
        let spec = StateSpec::from_remote(diags, &building_block.spec, configured);
        let status = StateStatus::from_remote(diags, &building_block.status);
        Some(Self {
            id: string_value(building_block.metadata.uuid.as_str()),
            wait_for_completion,
            metadata: Value::Value(StateMetadata::from_remote(&building_block.metadata)),
            spec: Value::Value(spec?),
            status: Value::Value(status?),
        })
    }
}

impl<'a> DataSourceState<'a> {
    pub fn from_remote(diags: &mut Diagnostics, building_block: &BuildingBlock) -> Option<Self> {
        let spec = StateSpec::from_remote(diags, &building_block.spec, None);
        let status = StateStatus::from_remote(diags, &building_block.status);
        Some(Self {
            metadata: Value::Value(StateMetadata::from_remote(&building_block.metadata)),
            spec: Value::Value(spec?),
            status: Value::Value(status?),
        })
    }
}
