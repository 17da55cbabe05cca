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

use tf_provider::{AttributePath, Diagnostics};
use tf_provider::value::Value;

use crate::io_value::{population, InputValue, Population};

use super::state::{StateSpec, StateTargetRef, TARGET_KINDS};

impl<'a> StateSpec<'a> {
    /// Check the configuration before anything is sent to meshStack
    pub fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Value::Value(target) = &self.target_ref {
            target.validate(diags, attr_path.clone().attribute("target_ref"));
        }

        for (key, input) in self.inputs.iter().flatten() {
            let input_path = attr_path.clone().attribute("inputs").key(key.to_string());
            let Value::Value(input) = input else {
                continue;
            };
            match population(input) {
                Population {
                    known: 0,
                    unknown: 0,
                } => diags.error(
                    "Input has no value",
                    format!("Input `{key}` must set exactly one `value_*` attribute"),
                    input_path,
                ),
                Population { known, .. } if known > 1 => diags.error(
                    "Input has several values",
                    format!(
                        "Input `{key}` sets {known} `value_*` attributes, but must set exactly one"
                    ),
                    input_path,
                ),
                _ => (),
            }
        }
    }
}

/// Check an input right before it is sent
///
/// At apply time every value of the configuration is known, so the input
/// must hold exactly one value: a field that was unknown at plan time and
/// got a value counts like any other.
pub(crate) fn check_applied_input(
    diags: &mut Diagnostics,
    key: &str,
    input: &InputValue<'_>,
    input_path: AttributePath,
) -> bool {
    match population(input) {
        Population {
            known: 1,
            unknown: 0,
        } => true,
        Population {
            known: 0,
            unknown: 0,
        } => {
            diags.error(
                "Input has no value",
                format!("Input `{key}` must set exactly one `value_*` attribute"),
                input_path,
            );
            false
        }
        Population {
            known: 0,
            unknown: 1,
        } => {
            diags.error_short("Input must be known at apply time", input_path);
            false
        }
        Population { known, unknown } => {
            diags.error(
                "Input has several values",
                format!(
                    "Input `{key}` sets {} `value_*` attributes, but must set exactly one",
                    known + unknown
                ),
                input_path,
            );
            false
        }
    }
}

impl<'a> StateTargetRef<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        let Some(kind) = self.kind.as_deref_option() else {
            return;
        };
        match kind {
            "meshTenant" if self.uuid.is_null() => diags.error(
                "Missing target uuid",
                "A `meshTenant` target is referenced by its `uuid`",
                attr_path.attribute("uuid"),
            ),
            "meshWorkspace" if self.identifier.is_null() => diags.error(
                "Missing target identifier",
                "A `meshWorkspace` target is referenced by its `identifier`",
                attr_path.attribute("identifier"),
            ),
            kind if !TARGET_KINDS.contains(&kind) => diags.error(
                "Invalid target kind",
                format!(
                    "Target kind `{kind}` is not supported, expected one of: {}",
                    TARGET_KINDS.join(", ")
                ),
                attr_path.attribute("kind"),
            ),
            _ => (),
        }
    }
}
