#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct SellerId(pub(crate) String);

#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct MechanicId(pub(crate) String);

#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct TeamId(pub(crate) String);

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct OperatorId(pub(crate) String);

/// Someone who is owed a derived amount: a seller earns a commission on the
/// invoices they sold, a mechanic earns a payout on the service lines they
/// performed.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub enum Beneficiary {
    Seller(SellerId),
    Mechanic(MechanicId),
}

/// Catalog data about a seller (display name, team, personal override rate).
#[derive(Debug, Clone)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub team: Option<TeamId>,
    pub commission_percent: Option<rust_decimal::Decimal>,
}

// Shorthand constructors.

pub fn seller(id: impl Into<String>) -> SellerId {
    SellerId(id.into())
}

pub fn mechanic(id: impl Into<String>) -> MechanicId {
    MechanicId(id.into())
}

pub fn team(id: impl Into<String>) -> TeamId {
    TeamId(id.into())
}

pub fn operator(id: impl Into<String>) -> OperatorId {
    OperatorId(id.into())
}

// --

macro_rules! impl_id {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_id!(SellerId);
impl_id!(MechanicId);
impl_id!(TeamId);
impl_id!(OperatorId);

impl From<SellerId> for Beneficiary {
    fn from(id: SellerId) -> Self {
        Beneficiary::Seller(id)
    }
}

impl From<MechanicId> for Beneficiary {
    fn from(id: MechanicId) -> Self {
        Beneficiary::Mechanic(id)
    }
}

impl Beneficiary {
    pub fn id(&self) -> &str {
        match self {
            Beneficiary::Seller(s) => s.as_str(),
            Beneficiary::Mechanic(m) => m.as_str(),
        }
    }

    pub fn is_seller(&self) -> bool {
        matches!(self, Beneficiary::Seller(_))
    }
}

impl std::fmt::Display for Beneficiary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Beneficiary::Seller(s) => write!(f, "seller:{}", s),
            Beneficiary::Mechanic(m) => write!(f, "mechanic:{}", m),
        }
    }
}
