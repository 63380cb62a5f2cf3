//! Structural errors (fatal) and consistency warnings (logged, non-fatal).

use std::fmt;

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

/// The kinds of entity held in a [`World`](crate::World) snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Commodity,
    Industry,
    SocialClass,
    Stock,
    Global,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Commodity => "commodity",
            EntityKind::Industry => "industry",
            EntityKind::SocialClass => "social_class",
            EntityKind::Stock => "stock",
            EntityKind::Global => "global",
        }
    }
}

/// Which ledger figure of a stock went out of bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LedgerField {
    Quantity,
    Value,
    Price,
}

impl LedgerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerField::Quantity => "quantity",
            LedgerField::Value => "value",
            LedgerField::Price => "price",
        }
    }
}

// ---------------------------------------------------------------------------
// StructuralError
// ---------------------------------------------------------------------------

/// A fatal violation of the model's structure.
///
/// Every variant carries the entity key and the offending figures so the
/// failure can be reproduced from the snapshot that triggered it. Callers
/// MUST abort the current period on any of these.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuralError {
    /// A required entity is absent from the snapshot.
    MissingEntity { kind: EntityKind, key: String },
    /// Two entities share a name where names must be unique.
    DuplicateEntity { kind: EntityKind, key: String },
    /// A transfer between stocks of different commodities.
    CommodityMismatch { from: String, to: String },
    /// A ledger figure would fall below `-EPSILON`.
    NegativeLedger {
        stock: String,
        field: LedgerField,
        value: f64,
    },
    /// A ledger figure would become NaN or infinite.
    NonFiniteLedger {
        stock: String,
        field: LedgerField,
        value: f64,
    },
    /// A class holds more disposable revenue than money: a data error.
    RevenueExceedsMoney {
        class: String,
        revenue: f64,
        money: f64,
    },
    /// The selected price-response policy has no implementation.
    UnsupportedPricePolicy { policy: String },
    /// The entity graph is malformed (e.g. a second money commodity).
    InvalidModel { reason: String },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntity { kind, key } => {
                write!(f, "missing {} '{}'", kind.as_str(), key)
            }
            Self::DuplicateEntity { kind, key } => {
                write!(f, "duplicate {} '{}'", kind.as_str(), key)
            }
            Self::CommodityMismatch { from, to } => {
                write!(f, "transfer between mismatched stocks: {from} -> {to}")
            }
            Self::NegativeLedger { stock, field, value } => write!(
                f,
                "stock {stock}: {} would become negative ({value})",
                field.as_str()
            ),
            Self::NonFiniteLedger { stock, field, value } => write!(
                f,
                "stock {stock}: {} would become non-finite ({value})",
                field.as_str()
            ),
            Self::RevenueExceedsMoney {
                class,
                revenue,
                money,
            } => write!(
                f,
                "class '{class}': revenue {revenue} exceeds money available {money}"
            ),
            Self::UnsupportedPricePolicy { policy } => {
                write!(f, "price response policy '{policy}' is not supported")
            }
            Self::InvalidModel { reason } => write!(f, "invalid model: {reason}"),
        }
    }
}

impl std::error::Error for StructuralError {}

// ---------------------------------------------------------------------------
// ConsistencyWarning
// ---------------------------------------------------------------------------

/// Categories of non-fatal drift. The computation continues with a clamped
/// or best-effort value whenever one of these is raised.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    /// A stock's price/quantity no longer matches the commodity unit price.
    UnitPriceDrift,
    /// A stock's value/quantity no longer matches the commodity unit value.
    UnitValueDrift,
    /// Desired output or expansion could not be fully funded.
    FundingShortfall,
    /// A purchase was clamped to what the buyer could pay for.
    Unaffordable,
    /// A transfer was clamped to the money actually held.
    InsufficientMoney,
    /// A purchase was clamped to what sellers actually held.
    InsufficientSupply,
    /// A production run was clamped to the inputs actually held.
    InsufficientInputs,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::UnitPriceDrift => "UNIT_PRICE_DRIFT",
            WarningKind::UnitValueDrift => "UNIT_VALUE_DRIFT",
            WarningKind::FundingShortfall => "FUNDING_SHORTFALL",
            WarningKind::Unaffordable => "UNAFFORDABLE",
            WarningKind::InsufficientMoney => "INSUFFICIENT_MONEY",
            WarningKind::InsufficientSupply => "INSUFFICIENT_SUPPLY",
            WarningKind::InsufficientInputs => "INSUFFICIENT_INPUTS",
        }
    }
}

/// One logged consistency warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsistencyWarning {
    pub kind: WarningKind,
    /// Key of the entity the warning concerns.
    pub entity: String,
    pub detail: String,
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.as_str(), self.entity, self.detail)
    }
}

/// Collects warnings raised while a phase runs.
///
/// Every warning is also emitted as a `tracing` WARN event at the moment it is
/// recorded, so nothing is dropped even if the collector is discarded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<ConsistencyWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, entity: impl Into<String>, detail: impl Into<String>) {
        let w = ConsistencyWarning {
            kind,
            entity: entity.into(),
            detail: detail.into(),
        };
        tracing::warn!(kind = w.kind.as_str(), entity = %w.entity, "{}", w.detail);
        self.warnings.push(w);
    }

    pub fn warnings(&self) -> &[ConsistencyWarning] {
        &self.warnings
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_warnings(self) -> Vec<ConsistencyWarning> {
        self.warnings
    }
}
