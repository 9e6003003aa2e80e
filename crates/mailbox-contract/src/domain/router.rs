//! # Router
//!
//! Selects exactly one handler for a call and returns its result unchanged.
//!
//! ```text
//! no state ─────────────→ create
//! opt_in ───────────────→ reject
//! close_out ────────────→ close_out
//! update / delete ──────→ creator_lifecycle
//! no_op ── args[1] ─┬───→ share
//!                   ├───→ bulk
//!                   ├───→ set_config
//!                   └───→ reject (unknown action)
//! ```

use crate::domain::entities::{
    Action, ApplicationCall, CallOutcome, Effects, EngineConfig, GlobalConfig, OnCompletion,
};
use crate::domain::handlers;
use crate::errors::AuthorizationError;

/// Minimum arguments of any no-op call (version tag, action tag).
pub const NO_OP_MIN_ARGS: usize = 2;

/// Evaluates a call against a config snapshot (`None` before creation).
///
/// Pure: the snapshot is never modified. The returned outcome carries the
/// writes to apply if, and only if, the call is admitted.
#[must_use]
pub fn evaluate(
    call: &ApplicationCall,
    snapshot: Option<&GlobalConfig>,
    engine: &EngineConfig,
) -> CallOutcome {
    route(call, snapshot, engine).into()
}

/// Dispatch step of [`evaluate`].
///
/// # Errors
///
/// Whatever the selected handler rejects with.
pub fn route(
    call: &ApplicationCall,
    snapshot: Option<&GlobalConfig>,
    engine: &EngineConfig,
) -> Result<Effects, AuthorizationError> {
    let Some(config) = snapshot else {
        return handlers::create(call, engine);
    };

    match call.on_completion {
        OnCompletion::OptIn => handlers::opt_in(call),
        OnCompletion::CloseOut => handlers::close_out(call),
        OnCompletion::UpdateApplication | OnCompletion::DeleteApplication => {
            handlers::creator_lifecycle(call, config)
        }
        OnCompletion::NoOp => dispatch_action(call, config, engine),
    }
}

/// Resolves the action named by argument 1 of a no-op call.
///
/// # Errors
///
/// [`AuthorizationError::MalformedCall`] with fewer than two arguments,
/// [`AuthorizationError::UnknownAction`] for an unrecognized tag.
pub fn resolve_action(call: &ApplicationCall) -> Result<Action, AuthorizationError> {
    if call.arg_count() < NO_OP_MIN_ARGS {
        return Err(AuthorizationError::malformed(format!(
            "no-op call expects at least {NO_OP_MIN_ARGS} arguments, got {}",
            call.arg_count()
        )));
    }
    let tag = &call.args[1];
    Action::from_tag(tag.as_slice()).ok_or_else(|| AuthorizationError::UnknownAction(tag.clone()))
}

/// Short name of the operation a call is routed to, for logs and metrics.
#[must_use]
pub fn operation_name(call: &ApplicationCall, snapshot: Option<&GlobalConfig>) -> &'static str {
    if snapshot.is_none() {
        return "create";
    }
    match call.on_completion {
        OnCompletion::OptIn => "opt_in",
        OnCompletion::CloseOut => "close_out",
        OnCompletion::UpdateApplication => "update_application",
        OnCompletion::DeleteApplication => "delete_application",
        OnCompletion::NoOp => resolve_action(call).map_or("unknown", |action| action.tag()),
    }
}

fn dispatch_action(
    call: &ApplicationCall,
    config: &GlobalConfig,
    engine: &EngineConfig,
) -> Result<Effects, AuthorizationError> {
    match resolve_action(call)? {
        Action::Share => handlers::share(call, config, engine),
        Action::Bulk => handlers::bulk(call, config),
        Action::SetConfig => handlers::set_config(call, config),
    }
}

// =============================================================================
// TESTS
// =============================================================================
