//! Rhai-backed policy runtime
//!
//! A fresh `Engine` is built on every boot and dropped on shutdown. The
//! policy lives at `<script_dir>/job_submit.rhai`:
//!
//! ```rhai
//! fn job_submit(job_desc, submit_uid) {
//!     if job_desc.partition == () {
//!         job_desc.partition = "batch";
//!     }
//!     job_desc.environment["SUBMITTED_BY"] = `${submit_uid}`;
//!     slurm::user_msg("defaults applied");
//!     0
//! }
//! ```
//!
//! The record is passed as a shared value, so edits made by the script are
//! visible to the host once the call returns.

use std::mem;
use std::path::{Path, PathBuf};

use rhai::module_resolvers::FileModuleResolver;
use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, Map, Module, Scope, AST, INT};
use tracing::{debug, info, warn};

use crate::embedded::{PolicyRuntime, HOST_NAMESPACE};
use crate::error::{PolicyError, PolicyResult, ScriptFault};
use crate::plugin::PLUGIN_TYPE;
use crate::record::DynamicRecord;
use crate::runtime::extfunc::{MessageBridge, HOST_FUNCTIONS};
use crate::runtime::value::{Mapping, Value};

/// File extension of policy modules
pub const SCRIPT_EXTENSION: &str = "rhai";

/// Rhai runtime
#[derive(Default)]
pub struct RhaiRuntime {
    /// Present only between boot and shutdown
    engine: Option<Engine>,
    /// Directory modules are resolved from
    script_dir: PathBuf,
}

/// A compiled policy module and its top-level state
pub struct RhaiScript {
    module: String,
    ast: AST,
    scope: Scope<'static>,
}

impl RhaiScript {
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl RhaiRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path a module name resolves to
    pub fn module_path(
        &self,
        module: &str,
    ) -> PathBuf {
        self.script_dir
            .join(module)
            .with_extension(SCRIPT_EXTENSION)
    }

    fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }
}

impl PolicyRuntime for RhaiRuntime {
    type Script = RhaiScript;

    fn is_running(&self) -> bool {
        self.engine.is_some()
    }

    fn boot(
        &mut self,
        bridge: &MessageBridge,
        script_dir: &Path,
    ) -> PolicyResult<()> {
        if self.is_running() {
            return Ok(());
        }

        let mut engine = Engine::new();
        engine.set_module_resolver(FileModuleResolver::new_with_path(script_dir));
        engine.register_static_module(HOST_NAMESPACE, host_module(bridge).into());
        engine.on_print(|text| info!("{}: {}", PLUGIN_TYPE, text));
        engine.on_debug(|text, source, pos| {
            debug!("{}: {} ({:?} @ {})", PLUGIN_TYPE, text, source, pos)
        });

        self.script_dir = script_dir.to_path_buf();
        self.engine = Some(engine);
        debug!("{}: runtime booted, script dir {}", PLUGIN_TYPE, script_dir.display());
        Ok(())
    }

    fn load_policy_script(
        &mut self,
        module: &str,
    ) -> PolicyResult<RhaiScript> {
        let load_error = |fault: ScriptFault| PolicyError::ScriptLoad {
            module: module.to_string(),
            fault,
        };
        let engine = self
            .engine()
            .ok_or_else(|| load_error(ScriptFault::new("RuntimeError", "runtime is not running")))?;

        let path = self.module_path(module);
        let ast = engine
            .compile_file(path)
            .map_err(|err| load_error(script_fault(&err)))?;

        // Importing a module runs its top level.
        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| load_error(script_fault(&err)))?;

        info!("{}: Loaded \"{}\"", PLUGIN_TYPE, module);
        Ok(RhaiScript {
            module: module.to_string(),
            ast,
            scope,
        })
    }

    fn resolve_entry(
        &self,
        script: &RhaiScript,
        entry: &str,
    ) -> PolicyResult<()> {
        let callable = script
            .ast
            .iter_functions()
            .any(|f| f.name == entry && f.params.len() == 2);
        if callable {
            Ok(())
        } else {
            Err(PolicyError::EntryResolution {
                module: script.module().to_string(),
                entry: entry.to_string(),
            })
        }
    }

    fn invoke(
        &mut self,
        script: &mut RhaiScript,
        entry: &str,
        record: &mut DynamicRecord,
        submit_uid: u32,
    ) -> PolicyResult<i64> {
        let engine = self.engine.as_ref().ok_or_else(|| PolicyError::Invocation {
            fault: ScriptFault::new("RuntimeError", "runtime is not running"),
        })?;

        let shared = to_rhai(Value::Mapping(mem::take(record))).into_shared();
        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        let result = engine.call_fn_with_options::<Dynamic>(
            options,
            &mut script.scope,
            &script.ast,
            entry,
            (shared.clone(), submit_uid as INT),
        );

        match from_rhai(shared) {
            Value::Mapping(map) => *record = map,
            other => warn!(
                "{}: job descriptor was replaced by a {}, no fields will be updated",
                PLUGIN_TYPE,
                other.type_name()
            ),
        }

        // The called function is not wrapped in its own frame by the engine.
        let status = result.map_err(|err| {
            let mut fault = script_fault(&err);
            fault
                .trace
                .insert(0, format!("  in function '{}' ({})", entry, script.module()));
            PolicyError::Invocation { fault }
        })?;
        if status.is_unit() {
            return Err(PolicyError::Invocation {
                fault: ScriptFault::new(
                    "TypeError",
                    format!("function {} returned nothing", entry),
                ),
            });
        }
        status.as_int().map_err(|type_name| PolicyError::Invocation {
            fault: ScriptFault::new(
                "TypeError",
                format!("return value of function must be an integer, not {}", type_name),
            ),
        })
    }

    fn shutdown(&mut self) {
        if self.engine.take().is_some() {
            debug!("{}: runtime shut down", PLUGIN_TYPE);
        }
    }
}

/// Build the host namespace module from the host function registry
fn host_module(bridge: &MessageBridge) -> Module {
    let mut module = Module::new();
    for host_fn in HOST_FUNCTIONS.iter() {
        let bridge = bridge.clone();
        let func = host_fn.func;
        module.set_native_fn(host_fn.name, move |arg: Dynamic| {
            func(&bridge, &from_rhai(arg));
            Ok::<_, Box<EvalAltResult>>(())
        });
    }
    module
}

// ============================================================================
// Value conversion
// ============================================================================

/// Host value -> script value
pub fn to_rhai(value: Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from_bool(b),
        Value::Int(i) => Dynamic::from_int(i),
        Value::Text(s) => Dynamic::from(s),
        Value::Sequence(items) => Dynamic::from_array(items.into_iter().map(to_rhai).collect()),
        Value::Mapping(map) => Dynamic::from_map(
            map.into_iter()
                .map(|(k, v)| (k.into(), to_rhai(v)))
                .collect::<Map>(),
        ),
    }
}

/// Script value -> host value
///
/// Script types without a host counterpart (floats, characters, function
/// pointers, ...) become their textual representation.
pub fn from_rhai(value: Dynamic) -> Value {
    let value = value.flatten();
    if value.is_unit() {
        return Value::Null;
    }
    if let Ok(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Ok(i) = value.as_int() {
        return Value::Int(i);
    }
    if value.is_string() {
        return match value.into_string() {
            Ok(s) => Value::Text(s),
            Err(_) => Value::Null,
        };
    }
    if value.is_array() {
        return match value.into_array() {
            Ok(items) => Value::Sequence(items.into_iter().map(from_rhai).collect()),
            Err(_) => Value::Null,
        };
    }
    if value.is_map() {
        return match value.try_cast::<Map>() {
            Some(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k.to_string(), from_rhai(v)))
                    .collect::<Mapping>(),
            ),
            None => Value::Null,
        };
    }
    Value::Text(value.to_string())
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Capture kind, message and call trace from a script error
pub fn script_fault(err: &EvalAltResult) -> ScriptFault {
    let mut trace = Vec::new();
    let mut inner = err;
    loop {
        match inner {
            EvalAltResult::ErrorInFunctionCall(name, source, next, pos) => {
                if source.is_empty() {
                    trace.push(format!("  in function '{}' at {}", name, pos));
                } else {
                    trace.push(format!("  in function '{}' ({}) at {}", name, source, pos));
                }
                inner = &**next;
            }
            EvalAltResult::ErrorInModule(path, next, pos) => {
                trace.push(format!("  in module '{}' at {}", path, pos));
                inner = &**next;
            }
            _ => break,
        }
    }
    trace.push(format!("  at {}", inner.position()));

    ScriptFault {
        kind: fault_kind(inner).to_string(),
        message: inner.to_string(),
        trace,
    }
}

fn fault_kind(err: &EvalAltResult) -> &'static str {
    match err {
        EvalAltResult::ErrorParsing(..) => "ParseError",
        EvalAltResult::ErrorSystem(..) => "SystemError",
        EvalAltResult::ErrorRuntime(..) => "RuntimeError",
        EvalAltResult::ErrorFunctionNotFound(..) => "FunctionNotFound",
        EvalAltResult::ErrorVariableNotFound(..) => "VariableNotFound",
        EvalAltResult::ErrorModuleNotFound(..) => "ModuleNotFound",
        EvalAltResult::ErrorMismatchDataType(..) | EvalAltResult::ErrorMismatchOutputType(..) => {
            "TypeError"
        }
        _ => "EvalError",
    }
}
