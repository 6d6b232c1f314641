//! Builds a [`Stack`] from `stack=` directives in three passes — instantiate,
//! configure & resolve (tail to head), start (head to tail) — matching
//! spec.md §4.2/§4.3 exactly.

use std::collections::HashSet;

use crate::config::{ConfigData, ConfigParseOutcome, ConfigParser};
use crate::plugin::{KeySource, Pluginstance, PluginRegistry};
use crate::stack::error::StackError;
use crate::stack::Stack;

/// One `id:plugin` token parsed out of a `stack=` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub instance_id: String,
    pub plugin_name: String,
}

/// Parses `"dns:DNS,ip2bin:IP2BIN,print:PRINTPKT"` into ordered stage specs.
pub fn parse_stack_spec(raw: &str) -> Result<Vec<StageSpec>, StackError> {
    let mut specs = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((id, plugin)) = token.split_once(':') else {
            return Err(StackError::InvalidSpec {
                raw: raw.to_string(),
                message: format!("stage '{token}' is missing an 'id:plugin' separator"),
            });
        };
        specs.push(StageSpec { instance_id: id.trim().to_string(), plugin_name: plugin.trim().to_string() });
    }
    if specs.is_empty() {
        return Err(StackError::Empty);
    }
    Ok(specs)
}

/// Builds and fully starts a stack from parsed stage specs.
///
/// On any pass-3 failure, every stage that already had `start` called is
/// stopped in reverse order before the error is returned (spec.md §9).
pub async fn build_stack(
    registry: &PluginRegistry,
    specs: &[StageSpec],
    config_parser: &dyn ConfigParser,
) -> Result<Stack, StackError> {
    if specs.is_empty() {
        return Err(StackError::Empty);
    }

    let mut stages = instantiate_stages(registry, specs, config_parser)?;
    check_type_adjacency(&stages)?;
    resolve_and_configure(&mut stages).await?;
    start_stages(&mut stages).await?;

    Ok(Stack::new(stages))
}

fn instantiate_stages(
    registry: &PluginRegistry,
    specs: &[StageSpec],
    config_parser: &dyn ConfigParser,
) -> Result<Vec<Pluginstance>, StackError> {
    let mut seen_ids = HashSet::new();
    let mut stages = Vec::with_capacity(specs.len());

    for (index, spec) in specs.iter().enumerate() {
        if !seen_ids.insert(spec.instance_id.clone()) {
            return Err(StackError::DuplicateInstanceId { id: spec.instance_id.clone() });
        }

        let descriptor = registry
            .find(&spec.plugin_name)
            .ok_or_else(|| StackError::UnknownPlugin { name: spec.plugin_name.clone() })?;

        let config = match descriptor.config_schema() {
            Some(schema) => match config_parser.parse_section(&spec.instance_id, &schema) {
                Ok(section) => ConfigData::from_section(&section),
                Err(ConfigParseOutcome::SectionMissing) => ConfigData::new(),
                Err(outcome) => {
                    return Err(StackError::InvalidSpec {
                        raw: spec.instance_id.clone(),
                        message: outcome.to_string(),
                    })
                }
            },
            None => ConfigData::new(),
        };

        stages.push(Pluginstance::instantiate(descriptor, &spec.instance_id, index, config));
    }

    Ok(stages)
}

fn check_type_adjacency(stages: &[Pluginstance]) -> Result<(), StackError> {
    for window in stages.windows(2) {
        let [producer, consumer] = window else { unreachable!() };
        let produced = producer.descriptor().output_type();
        let expected = consumer.descriptor().input_type();
        let compatible = match (&produced, &expected) {
            (crate::plugin::DataType::Intermediate(a), crate::plugin::DataType::Intermediate(b)) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        };
        if !compatible {
            return Err(StackError::TypeMismatch {
                producer: producer.id().to_string(),
                consumer: consumer.id().to_string(),
                produced: format!("{produced:?}"),
                expected: format!("{expected:?}"),
            });
        }
    }
    Ok(())
}

/// Pass 2: tail to head, call `configure` then resolve each input key's
/// source by scanning backward from the current stage toward the head —
/// first match wins (spec.md §4.3).
async fn resolve_and_configure(stages: &mut [Pluginstance]) -> Result<(), StackError> {
    for index in (0..stages.len()).rev() {
        let descriptor = stages[index].descriptor().clone();
        descriptor
            .configure(&mut stages[index])
            .await
            .map_err(|source| StackError::ConfigureFailed { instance: stages[index].id().to_string(), source })?;

        let input_names: Vec<(usize, String, bool, bool)> = stages[index]
            .input_keys()
            .iter()
            .enumerate()
            .map(|(i, k)| (i, k.name().to_string(), k.is_optional(), k.is_inactive()))
            .collect();

        for (key_index, name, optional, inactive) in input_names {
            // A key `configure()` already marked inactive is skipped outright —
            // it needs no producer regardless of whether it's mandatory or
            // optional (spec.md §4.3 pass-2 step 4).
            if inactive {
                continue;
            }

            let found = find_producer(stages, index, &name);
            match found {
                Some(source) => stages[index].input_keys_mut()[key_index].bind_source(source),
                None if optional => stages[index].input_keys_mut()[key_index].set_inactive(true),
                None => {
                    return Err(StackError::UnresolvedMandatoryKey {
                        instance: stages[index].id().to_string(),
                        key: name,
                    })
                }
            }
        }
    }
    Ok(())
}

fn find_producer(stages: &[Pluginstance], consumer_index: usize, key_name: &str) -> Option<KeySource> {
    for instance_index in (0..consumer_index).rev() {
        if let Some(key_index) = stages[instance_index].output_index(key_name) {
            return Some(KeySource { instance_index, key_index });
        }
    }
    None
}

/// Pass 3: head to tail. Any failure stops every already-started stage in
/// reverse before the error propagates.
async fn start_stages(stages: &mut [Pluginstance]) -> Result<(), StackError> {
    for index in 0..stages.len() {
        let descriptor = stages[index].descriptor().clone();
        if let Err(source) = descriptor.start(&mut stages[index]).await {
            for rollback in (0..index).rev() {
                let descriptor = stages[rollback].descriptor().clone();
                if let Err(stop_err) = descriptor.stop(&mut stages[rollback]).await {
                    log::error!("stop() during rollback failed on '{}': {stop_err}", stages[rollback].id());
                }
            }
            return Err(StackError::StartFailed { instance: stages[index].id().to_string(), source });
        }
    }
    Ok(())
}

