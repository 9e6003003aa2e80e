//! # Action Handlers
//!
//! One function per operation. Each handler runs its own rekey guard and
//! returns the effects of an admitted call, or the first failed check.

use crate::domain::entities::{
    Action, ApplicationCall, ConfigUpdate, Effects, EngineConfig, GlobalConfig, LocalShareRecord,
    OnCompletion,
};
use crate::domain::payment::validate_group_payment;
use crate::domain::services::{btoi, bulk_charge, LogRecord};
use crate::domain::value_objects::{Address, ADDRESS_LENGTH};
use crate::errors::AuthorizationError;

/// Minimum argument count of a share call.
pub const SHARE_MIN_ARGS: usize = 3;

/// Exact argument count of a bulk call.
pub const BULK_ARGS: usize = 4;

/// Position of the fee argument of a `set_config` call.
const SET_CONFIG_FEE_INDEX: usize = 2;

// =============================================================================
// GUARDS
// =============================================================================

/// Rejects any call that would rekey the sender.
///
/// # Errors
///
/// [`AuthorizationError::RekeyAttempt`] if `rekey_to` is not the zero address.
pub fn check_rekey(call: &ApplicationCall) -> Result<(), AuthorizationError> {
    if call.rekey_to.is_zero() {
        Ok(())
    } else {
        Err(AuthorizationError::RekeyAttempt {
            target: call.rekey_to,
        })
    }
}

/// Rejects callers other than the creator.
///
/// # Errors
///
/// [`AuthorizationError::UnauthorizedCaller`] for any other sender.
pub fn check_creator(call: &ApplicationCall, config: &GlobalConfig) -> Result<(), AuthorizationError> {
    if call.sender == config.creator {
        Ok(())
    } else {
        Err(AuthorizationError::UnauthorizedCaller {
            caller: call.sender,
        })
    }
}

/// Requires argument 0 to equal the stored version tag.
///
/// # Errors
///
/// [`AuthorizationError::VersionMismatch`] on any difference, including an
/// absent tag.
pub fn check_version(call: &ApplicationCall, config: &GlobalConfig) -> Result<(), AuthorizationError> {
    let presented = call.arg(0).cloned().unwrap_or_default();
    if presented == config.version {
        Ok(())
    } else {
        Err(AuthorizationError::VersionMismatch {
            expected: config.version.clone(),
            presented,
        })
    }
}

fn check_action(call: &ApplicationCall, action: Action) -> Result<(), AuthorizationError> {
    match call.arg(1) {
        Some(tag) if tag.as_slice() == action.tag().as_bytes() => Ok(()),
        Some(tag) => Err(AuthorizationError::UnknownAction(tag.clone())),
        None => Err(AuthorizationError::malformed("missing action tag")),
    }
}

fn uint_arg(call: &ApplicationCall, index: usize, name: &str) -> Result<Option<u64>, AuthorizationError> {
    call.arg(index)
        .map(|raw| {
            btoi(raw.as_slice()).ok_or_else(|| {
                AuthorizationError::malformed(format!(
                    "{name} must be an integer of at most 8 bytes, got {} bytes",
                    raw.len()
                ))
            })
        })
        .transpose()
}

fn address_arg(
    call: &ApplicationCall,
    index: usize,
    name: &str,
) -> Result<Option<Address>, AuthorizationError> {
    call.arg(index)
        .map(|raw| {
            Address::from_slice(raw.as_slice()).ok_or_else(|| {
                AuthorizationError::malformed(format!(
                    "{name} must be a 32-byte address, got {} bytes",
                    raw.len()
                ))
            })
        })
        .transpose()
}

// =============================================================================
// CREATE
// =============================================================================

/// Initializes the global config. Arguments: `[version?, fee?, service?]`.
///
/// # Errors
///
/// Rekey attempts and undecodable fee/service arguments.
pub fn create(call: &ApplicationCall, engine: &EngineConfig) -> Result<Effects, AuthorizationError> {
    check_rekey(call)?;

    let config = GlobalConfig {
        creator: call.sender,
        version: call
            .arg(0)
            .cloned()
            .unwrap_or_else(|| engine.default_version.clone()),
        fee: uint_arg(call, 1, "fee")?.unwrap_or(engine.default_fee),
        service: address_arg(call, 2, "service")?.unwrap_or(call.sender),
    };

    Ok(Effects {
        update: ConfigUpdate::initial(config),
        ..Effects::none()
    })
}

// =============================================================================
// SHARE
// =============================================================================

/// Single share. Arguments: `[version, "share", cid, recipient?]`.
///
/// # Errors
///
/// Rekey, version, arity and companion payment failures.
pub fn share(
    call: &ApplicationCall,
    config: &GlobalConfig,
    engine: &EngineConfig,
) -> Result<Effects, AuthorizationError> {
    check_rekey(call)?;
    check_version(call, config)?;
    check_action(call, Action::Share)?;
    if call.arg_count() < SHARE_MIN_ARGS {
        return Err(AuthorizationError::malformed(format!(
            "share expects at least {SHARE_MIN_ARGS} arguments, got {}",
            call.arg_count()
        )));
    }

    validate_group_payment(call, config, config.fee)?;

    let cid = call.arg(2).cloned().unwrap_or_default();
    let recipient = call.arg(3).cloned().unwrap_or_default();
    let local_record = (engine.record_recipients && !recipient.is_empty()).then(|| {
        LocalShareRecord {
            recipient: recipient.clone(),
            cid: cid.clone(),
        }
    });
    let log = LogRecord::Share {
        version: config.version.clone(),
        cid,
        sender: call.sender,
        recipient,
    };

    Ok(Effects {
        log: Some(log.encode()),
        local_record,
        ..Effects::none()
    })
}

// =============================================================================
// BULK
// =============================================================================

/// Batch share. Arguments: `[version, "bulk", merkle_root, count]`.
///
/// # Errors
///
/// Rekey, version, arity, count decoding, overflow and payment failures.
pub fn bulk(call: &ApplicationCall, config: &GlobalConfig) -> Result<Effects, AuthorizationError> {
    check_rekey(call)?;
    check_version(call, config)?;
    check_action(call, Action::Bulk)?;
    if call.arg_count() != BULK_ARGS {
        return Err(AuthorizationError::malformed(format!(
            "bulk expects exactly {BULK_ARGS} arguments, got {}",
            call.arg_count()
        )));
    }

    let count = uint_arg(call, 3, "count")?.unwrap_or_default();
    let required = bulk_charge(config.fee, count).ok_or(AuthorizationError::ArithmeticOverflow {
        fee: config.fee,
        count,
    })?;

    validate_group_payment(call, config, required)?;

    let log = LogRecord::Bulk {
        version: config.version.clone(),
        merkle_root: call.arg(2).cloned().unwrap_or_default(),
        sender: call.sender,
        count,
    };

    Ok(Effects {
        log: Some(log.encode()),
        ..Effects::none()
    })
}

// =============================================================================
// SET CONFIG
// =============================================================================

/// Creator-only partial overwrite. Arguments:
/// `[version, "set_config", fee?, service?]` or, to change only the service,
/// `[version, "set_config", service]`.
///
/// A lone third argument of exactly 32 bytes is the service address (a fee
/// never exceeds 8 bytes). An empty fee slot leaves the fee untouched.
/// The presented version tag is not checked against the stored one; when it
/// differs it becomes the new stored tag.
///
/// # Errors
///
/// Rekey, non-creator caller, and undecodable fee/service arguments.
pub fn set_config(call: &ApplicationCall, config: &GlobalConfig) -> Result<Effects, AuthorizationError> {
    check_rekey(call)?;
    check_creator(call, config)?;
    check_action(call, Action::SetConfig)?;

    let version = call
        .arg(0)
        .filter(|tag| **tag != config.version)
        .cloned();

    let service_only = call.arg_count() == SET_CONFIG_FEE_INDEX + 1
        && call
            .arg(SET_CONFIG_FEE_INDEX)
            .is_some_and(|raw| raw.len() == ADDRESS_LENGTH);
    let (fee, service) = if service_only {
        (None, address_arg(call, SET_CONFIG_FEE_INDEX, "service")?)
    } else {
        let fee = match call.arg(SET_CONFIG_FEE_INDEX) {
            Some(raw) if raw.is_empty() => None,
            _ => uint_arg(call, SET_CONFIG_FEE_INDEX, "fee")?,
        };
        (fee, address_arg(call, SET_CONFIG_FEE_INDEX + 1, "service")?)
    };

    Ok(Effects {
        update: ConfigUpdate {
            creator: None,
            version,
            fee,
            service,
        },
        ..Effects::none()
    })
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Update or delete: creator only.
///
/// # Errors
///
/// Rekey attempts and non-creator callers.
pub fn creator_lifecycle(call: &ApplicationCall, config: &GlobalConfig) -> Result<Effects, AuthorizationError> {
    check_rekey(call)?;
    check_creator(call, config)?;
    Ok(Effects {
        delete_instance: call.on_completion == OnCompletion::DeleteApplication,
        ..Effects::none()
    })
}

/// Close-out: nothing to reconcile.
///
/// # Errors
///
/// Rekey attempts.
pub fn close_out(call: &ApplicationCall) -> Result<Effects, AuthorizationError> {
    check_rekey(call)?;
    Ok(Effects::none())
}

/// Opt-in: never allowed.
///
/// # Errors
///
/// Always [`AuthorizationError::OptInRejected`].
pub fn opt_in(_call: &ApplicationCall) -> Result<Effects, AuthorizationError> {
    Err(AuthorizationError::OptInRejected)
}

// =============================================================================
// TESTS
// =============================================================================
