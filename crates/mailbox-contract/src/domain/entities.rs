//! # Core Domain Entities
//!
//! Main business entities for authorizing mailbox application calls.
//! A call arrives as an [`ApplicationCall`] together with the read-only view of
//! its atomic group and the current [`GlobalConfig`] snapshot; evaluation
//! produces a [`CallOutcome`].

use crate::domain::value_objects::{Address, Bytes};
use crate::errors::AuthorizationError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Tunables of the engine itself (not ledger state).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version tag stored at creation when none is supplied.
    pub default_version: Bytes,
    /// Fee stored at creation when none is supplied.
    pub default_fee: u64,
    /// Emit a per-recipient record for every admitted share that names one.
    pub record_recipients: bool,
}

impl EngineConfig {
    /// Default version tag.
    pub const DEFAULT_VERSION: &'static str = "v1";

    /// Default per-share fee in base units.
    pub const DEFAULT_FEE: u64 = 1000;
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_version: Bytes::from(Self::DEFAULT_VERSION),
            default_fee: Self::DEFAULT_FEE,
            record_recipients: false,
        }
    }
}

// =============================================================================
// GLOBAL CONFIG
// =============================================================================

/// The application's global state: four named keys, written only by
/// `create` and `set_config`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Account that created the instance. Never changes.
    pub creator: Address,
    /// Tag every share/bulk call must present.
    pub version: Bytes,
    /// Minimum payment per share; per-unit rate for bulk.
    pub fee: u64,
    /// Receiver of companion payments.
    pub service: Address,
}

/// Names of the persisted global keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlobalKey {
    /// `Creator`
    Creator,
    /// `Version`
    Version,
    /// `Fee`
    Fee,
    /// `Service`
    Service,
}

impl GlobalKey {
    /// Key as stored in the application's global state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "Creator",
            Self::Version => "Version",
            Self::Fee => "Fee",
            Self::Service => "Service",
        }
    }
}

impl fmt::Display for GlobalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed global state value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValue {
    /// Byte-slice value.
    Bytes(Bytes),
    /// Unsigned integer value.
    Uint(u64),
}

/// A single global key write requested by an admitted call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// Key being written.
    pub key: GlobalKey,
    /// New value.
    pub value: StateValue,
}

/// Partial overwrite of the global config.
///
/// `None` fields are left untouched. An empty update writes nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// New creator (create only).
    pub creator: Option<Address>,
    /// New version tag.
    pub version: Option<Bytes>,
    /// New fee.
    pub fee: Option<u64>,
    /// New service address.
    pub service: Option<Address>,
}

impl ConfigUpdate {
    /// Update that initializes every key.
    #[must_use]
    pub fn initial(config: GlobalConfig) -> Self {
        Self {
            creator: Some(config.creator),
            version: Some(config.version),
            fee: Some(config.fee),
            service: Some(config.service),
        }
    }

    /// Returns true if nothing is written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creator.is_none()
            && self.version.is_none()
            && self.fee.is_none()
            && self.service.is_none()
    }

    /// Key/value writes in key order.
    #[must_use]
    pub fn state_changes(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        if let Some(creator) = self.creator {
            changes.push(StateChange {
                key: GlobalKey::Creator,
                value: StateValue::Bytes(creator.into()),
            });
        }
        if let Some(version) = &self.version {
            changes.push(StateChange {
                key: GlobalKey::Version,
                value: StateValue::Bytes(version.clone()),
            });
        }
        if let Some(fee) = self.fee {
            changes.push(StateChange {
                key: GlobalKey::Fee,
                value: StateValue::Uint(fee),
            });
        }
        if let Some(service) = self.service {
            changes.push(StateChange {
                key: GlobalKey::Service,
                value: StateValue::Bytes(service.into()),
            });
        }
        changes
    }

    /// Applies the update on top of an existing snapshot.
    #[must_use]
    pub fn apply_to(&self, base: &GlobalConfig) -> GlobalConfig {
        GlobalConfig {
            creator: self.creator.unwrap_or(base.creator),
            version: self.version.clone().unwrap_or_else(|| base.version.clone()),
            fee: self.fee.unwrap_or(base.fee),
            service: self.service.unwrap_or(base.service),
        }
    }

    /// Builds the first snapshot. Returns None unless every key is set.
    #[must_use]
    pub fn to_initial(&self) -> Option<GlobalConfig> {
        Some(GlobalConfig {
            creator: self.creator?,
            version: self.version.clone()?,
            fee: self.fee?,
            service: self.service?,
        })
    }
}

// =============================================================================
// CALL DESCRIPTION
// =============================================================================

/// Lifecycle phase requested by a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnCompletion {
    /// Ordinary business call.
    #[default]
    NoOp,
    /// Allocate per-account state.
    OptIn,
    /// Release per-account state.
    CloseOut,
    /// Replace the approval logic.
    UpdateApplication,
    /// Remove the instance.
    DeleteApplication,
}

impl fmt::Display for OnCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoOp => "no_op",
            Self::OptIn => "opt_in",
            Self::CloseOut => "close_out",
            Self::UpdateApplication => "update_application",
            Self::DeleteApplication => "delete_application",
        };
        f.write_str(name)
    }
}

/// Type tag of a transaction in an atomic group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    /// Plain value transfer.
    Payment,
    /// Participation key registration.
    KeyRegistration,
    /// Asset creation/reconfiguration.
    AssetConfig,
    /// Asset transfer.
    AssetTransfer,
    /// Asset freeze.
    AssetFreeze,
    /// Application call.
    ApplicationCall,
}

/// One element of an atomic transaction group, as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTransaction {
    /// Type tag.
    pub tx_type: TxType,
    /// Authorizing account.
    pub sender: Address,
    /// Payment receiver (zero for non-payments).
    #[serde(default)]
    pub receiver: Address,
    /// Payment amount in base units (zero for non-payments).
    #[serde(default)]
    pub amount: u64,
}

impl GroupTransaction {
    /// A plain payment.
    #[must_use]
    pub fn payment(sender: Address, receiver: Address, amount: u64) -> Self {
        Self {
            tx_type: TxType::Payment,
            sender,
            receiver,
            amount,
        }
    }

    /// An application call placeholder (used for the call's own slot).
    #[must_use]
    pub fn application_call(sender: Address) -> Self {
        Self {
            tx_type: TxType::ApplicationCall,
            sender,
            receiver: Address::ZERO,
            amount: 0,
        }
    }
}

/// An incoming application call.
///
/// `group` is the whole atomic group in submission order and `group_index`
/// the position of this call within it. A call submitted alone has an empty
/// or single-element group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCall {
    /// Lifecycle phase.
    #[serde(default)]
    pub on_completion: OnCompletion,
    /// Calling account.
    pub sender: Address,
    /// Rekey target (zero when absent).
    #[serde(default)]
    pub rekey_to: Address,
    /// Ordered call arguments.
    #[serde(default)]
    pub args: Vec<Bytes>,
    /// Enclosing atomic group.
    #[serde(default)]
    pub group: Vec<GroupTransaction>,
    /// Position of this call in `group`.
    #[serde(default)]
    pub group_index: usize,
}

impl ApplicationCall {
    /// A no-op call with the given arguments, outside any group.
    #[must_use]
    pub fn no_op(sender: Address, args: Vec<Bytes>) -> Self {
        Self {
            on_completion: OnCompletion::NoOp,
            sender,
            args,
            ..Self::default()
        }
    }

    /// A lifecycle call with no arguments.
    #[must_use]
    pub fn lifecycle(sender: Address, on_completion: OnCompletion) -> Self {
        Self {
            on_completion,
            sender,
            ..Self::default()
        }
    }

    /// Places this call after `preceding` in a fresh atomic group.
    #[must_use]
    pub fn grouped_after(mut self, preceding: Vec<GroupTransaction>) -> Self {
        self.group_index = preceding.len();
        self.group = preceding;
        self.group
            .push(GroupTransaction::application_call(self.sender));
        self
    }

    /// Sets the rekey target.
    #[must_use]
    pub fn with_rekey(mut self, rekey_to: Address) -> Self {
        self.rekey_to = rekey_to;
        self
    }

    /// Argument at `index`, if supplied.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Bytes> {
        self.args.get(index)
    }

    /// Number of supplied arguments.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Size of the enclosing group (a lone call counts as 1).
    #[must_use]
    pub fn group_size(&self) -> usize {
        self.group.len().max(1)
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Action selected by argument 1 of a no-op call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Single share gated by `fee`.
    Share,
    /// Batch share gated by `fee * count`.
    Bulk,
    /// Creator-only configuration change.
    SetConfig,
}

impl Action {
    /// Wire tag of the action.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Bulk => "bulk",
            Self::SetConfig => "set_config",
        }
    }

    /// Resolves a wire tag. Exact byte match only.
    #[must_use]
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"share" => Some(Self::Share),
            b"bulk" => Some(Self::Bulk),
            b"set_config" => Some(Self::SetConfig),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Per-recipient share flag (recipient registry variant).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalShareRecord {
    /// Recipient argument as supplied.
    pub recipient: Bytes,
    /// Content identifier shared with the recipient.
    pub cid: Bytes,
}

/// Everything an admitted call asks the ledger to do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Global config writes.
    pub update: ConfigUpdate,
    /// Log record, if any.
    pub log: Option<Bytes>,
    /// Recipient registry entry, if any.
    pub local_record: Option<LocalShareRecord>,
    /// The instance is removed once the call commits.
    pub delete_instance: bool,
}

impl Effects {
    /// Admit with no effects.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Decision for one call.
///
/// A rejected outcome never carries writes or a log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// Whether the call is admitted.
    pub admitted: bool,
    /// Requested global writes (empty when rejected).
    pub update: ConfigUpdate,
    /// Emitted log record (None when rejected).
    pub log: Option<Bytes>,
    /// Recipient registry entry (None when rejected).
    pub local_record: Option<LocalShareRecord>,
    /// Admitted delete: the instance and its state go away.
    pub delete_instance: bool,
    /// Why the call was rejected. Trace only; never persisted.
    pub rejection: Option<AuthorizationError>,
}

impl CallOutcome {
    /// An admitted outcome.
    #[must_use]
    pub fn admit(effects: Effects) -> Self {
        Self {
            admitted: true,
            update: effects.update,
            log: effects.log,
            local_record: effects.local_record,
            delete_instance: effects.delete_instance,
            rejection: None,
        }
    }

    /// A rejected outcome with no effects.
    #[must_use]
    pub fn reject(reason: AuthorizationError) -> Self {
        Self {
            admitted: false,
            update: ConfigUpdate::default(),
            log: None,
            local_record: None,
            delete_instance: false,
            rejection: Some(reason),
        }
    }

    /// Global key writes requested by this outcome.
    #[must_use]
    pub fn state_changes(&self) -> Vec<StateChange> {
        self.update.state_changes()
    }
}

impl From<Result<Effects, AuthorizationError>> for CallOutcome {
    fn from(result: Result<Effects, AuthorizationError>) -> Self {
        match result {
            Ok(effects) => Self::admit(effects),
            Err(reason) => Self::reject(reason),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
