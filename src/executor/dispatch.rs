use std::future::Future;
use std::time::Duration;

use tracing::trace;

use crate::command::Command;
use crate::decoder::ResultDecoder;
use crate::driver::{Driver, DriverCommand, TransactionToken};
use crate::error::{CommandContext, DriverError, Result, SqlCommandError};
use crate::options::ConnectorOptions;
use crate::params::{Parameter, ParameterList};
use crate::results::ResultSet;
use crate::types::{DbValue, ParameterDirection, SemanticType};

/// Which driver primitive a call maps to and how many result sets it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallShape {
    NonQuery,
    Scalar,
    Single,
    List,
    /// Exactly this many result sets, in order
    Multi(usize),
    /// Every result set the command produces
    Dynamic,
}

/// What the driver handed back, before typed decoding.
#[derive(Debug, Default)]
pub(crate) struct RawPayload {
    pub(crate) rows_affected: Option<u64>,
    pub(crate) scalar: Option<DbValue>,
    pub(crate) sets: Vec<ResultSet>,
}

impl RawPayload {
    pub(crate) fn take_first_set(&mut self) -> ResultSet {
        std::mem::take(&mut self.sets).into_iter().next().unwrap_or_default()
    }
}

/// A command ready to hand to the driver.
#[derive(Debug)]
pub(crate) struct PreparedCall {
    /// Every parameter the driver sees, including the synthetic return slot
    pub(crate) bound: ParameterList,
    /// Out/InOut parameters to read back, with the type to read them as
    tracked: Vec<(String, SemanticType)>,
    return_value_name: Option<String>,
    pub(crate) context: CommandContext,
    timeout: Option<Duration>,
}

/// Split the caller's parameters and append the return value slot if one is wanted.
pub(crate) fn prepare(command: &Command, options: &ConnectorOptions) -> Result<PreparedCall> {
    let mut bound = command.parameters.clone();

    let mut tracked = Vec::new();
    for p in bound
        .iter()
        .filter(|p| matches!(p.direction, ParameterDirection::Out | ParameterDirection::InOut))
    {
        if p.semantic_type == SemanticType::Xml {
            return Err(SqlCommandError::UnsupportedType(SemanticType::Xml));
        }
        // names must resolve to exactly one parameter for the write-back to be meaningful
        command.parameters.get(&p.name)?;
        tracked.push((p.name.clone(), p.semantic_type));
    }

    let return_requested = command
        .return_value_requested
        .unwrap_or_else(|| options.return_value_default(command.kind));
    let caller_slots: Vec<&str> = bound
        .iter()
        .filter(|p| p.direction == ParameterDirection::ReturnValue)
        .map(|p| p.name.as_str())
        .collect();
    if let [first, _, ..] = caller_slots.as_slice() {
        return Err(SqlCommandError::AmbiguousParameter {
            name: (*first).to_owned(),
            matches: caller_slots.len(),
        });
    }
    let caller_slot = caller_slots.first().map(|name| (*name).to_owned());

    let return_value_name = if return_requested {
        let name = match (&command.return_value_name, caller_slot) {
            // a caller-declared slot is the return slot
            (None, Some(declared)) => declared,
            (Some(requested), Some(declared)) if *requested != declared => {
                return Err(SqlCommandError::AmbiguousParameter {
                    name: requested.clone(),
                    matches: 2,
                });
            }
            (requested, _) => requested
                .clone()
                .unwrap_or_else(|| options.return_value_parameter_name.clone()),
        };
        if bound.contains(&name) {
            let existing = bound.get(&name)?;
            if existing.direction != ParameterDirection::ReturnValue {
                return Err(SqlCommandError::AmbiguousParameter { name, matches: 2 });
            }
        } else {
            bound.add(Parameter::return_value(name.clone()));
        }
        Some(name)
    } else {
        None
    };

    let context = CommandContext {
        text: command.text.clone(),
        kind: command.kind,
        parameter_names: bound.names(),
    };

    Ok(PreparedCall {
        bound,
        tracked,
        return_value_name,
        context,
        timeout: command.timeout.or_else(|| options.command_timeout()),
    })
}

/// Await one driver I/O step, applying the timeout and attaching the command context to any
/// driver error.
async fn io<T, F>(context: &CommandContext, timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, DriverError>>,
{
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(outcome) => outcome,
            Err(_) => {
                return Err(SqlCommandError::Timeout {
                    context: context.clone(),
                    elapsed_ms: limit.as_millis(),
                });
            }
        },
        None => fut.await,
    };
    outcome.map_err(|source| SqlCommandError::Driver {
        context: context.clone(),
        source,
    })
}

/// Run the call on an acquired connection.
pub(crate) async fn dispatch<D: Driver>(
    driver: &mut D,
    call: &mut PreparedCall,
    transaction: Option<TransactionToken>,
    shape: CallShape,
) -> Result<RawPayload> {
    let command = DriverCommand {
        text: &call.context.text,
        kind: call.context.kind,
        transaction,
        timeout: call.timeout,
    };
    let context = &call.context;
    let timeout = call.timeout;
    let mut payload = RawPayload::default();

    match shape {
        CallShape::NonQuery => {
            let affected = io(context, timeout, driver.execute(&command, &mut call.bound)).await?;
            payload.rows_affected = Some(affected);
        }
        CallShape::Scalar => {
            let value =
                io(context, timeout, driver.execute_scalar(&command, &mut call.bound)).await?;
            payload.scalar = Some(value);
        }
        CallShape::Single => {
            let set = io(context, timeout, driver.query_single(&command, &mut call.bound)).await?;
            if set.len() > 1 {
                return Err(SqlCommandError::MultipleRows { rows: set.len() });
            }
            payload.sets.push(set);
        }
        CallShape::List => {
            let set = io(context, timeout, driver.query(&command, &mut call.bound)).await?;
            payload.sets.push(set);
        }
        CallShape::Multi(count) => {
            let mut cursor =
                io(context, timeout, driver.query_multiple(&command, &mut call.bound)).await?;
            for slot in 0..count {
                match io(context, timeout, cursor.next_set()).await? {
                    Some(set) => {
                        trace!(slot, rows = set.len(), "read result set");
                        payload.sets.push(set);
                    }
                    None => {
                        return Err(SqlCommandError::ResultSetExhausted {
                            slot: slot + 1,
                            available: slot,
                        });
                    }
                }
            }
            io(context, timeout, cursor.finish(&mut call.bound)).await?;
        }
        CallShape::Dynamic => {
            let mut cursor =
                io(context, timeout, driver.query_multiple(&command, &mut call.bound)).await?;
            while let Some(set) = io(context, timeout, cursor.next_set()).await? {
                trace!(slot = payload.sets.len(), rows = set.len(), "read result set");
                payload.sets.push(set);
            }
            io(context, timeout, cursor.finish(&mut call.bound)).await?;
        }
    }

    Ok(payload)
}

/// Read back Out/InOut values and the return code, writing them onto the caller's parameters.
pub(crate) fn collect_outputs(
    call: &PreparedCall,
    command: &mut Command,
) -> Result<(ParameterList, i32)> {
    let mut outputs = ParameterList::with_capacity(call.tracked.len());
    for (name, semantic_type) in &call.tracked {
        let value = ResultDecoder::extract(name, *semantic_type, &call.bound)?;
        let parameter = command.parameters.get_mut(name)?;
        parameter.value = value;
        outputs.add(parameter.clone());
    }

    let return_value = match &call.return_value_name {
        Some(name) => match ResultDecoder::extract(name, SemanticType::Int32, &call.bound)? {
            DbValue::I32(code) => code,
            _ => {
                trace!(parameter = %name, "driver reported no return value");
                0
            }
        },
        None => 0,
    };

    Ok((outputs, return_value))
}
