use std::str::FromStr;

use fractic_server_error::ServerError;

use crate::{
    entities::{DocumentStatus, PaymentMethod, PaymentStatus, ProductType},
    errors::InvalidCode,
};

// Lower-case codes used in document exports and in the ledger snapshot.

#[derive(Debug)]
pub(crate) struct DocumentStatusModel(pub DocumentStatus);
impl FromStr for DocumentStatusModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self(DocumentStatus::Draft)),
            "posted" => Ok(Self(DocumentStatus::Posted)),
            "cancel" | "cancelled" => Ok(Self(DocumentStatus::Cancelled)),
            _ => Err(InvalidCode::new("status", s)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct PaymentStatusModel(pub PaymentStatus);
impl FromStr for PaymentStatusModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not_paid" => Ok(Self(PaymentStatus::NotPaid)),
            "in_payment" => Ok(Self(PaymentStatus::InPayment)),
            "partial" => Ok(Self(PaymentStatus::Partial)),
            "paid" => Ok(Self(PaymentStatus::Paid)),
            "reversed" => Ok(Self(PaymentStatus::Reversed)),
            _ => Err(InvalidCode::new("payment_status", s)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ProductTypeModel(pub ProductType);
impl FromStr for ProductTypeModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "service" => Ok(Self(ProductType::Service)),
            "product" => Ok(Self(ProductType::Product)),
            "consu" | "consumable" => Ok(Self(ProductType::Consumable)),
            _ => Err(InvalidCode::new("product_type", s)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct PaymentMethodModel(pub PaymentMethod);
impl FromStr for PaymentMethodModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(Self(PaymentMethod::Cash)),
            "transfer" => Ok(Self(PaymentMethod::Transfer)),
            _ => Err(InvalidCode::new("payment_method", s)),
        }
    }
}

impl PaymentMethodModel {
    pub(crate) fn code(method: PaymentMethod) -> &'static str {
        match method {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
        }
    }
}
