// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod catalog_csv_datasource;
        pub(crate) mod documents_csv_datasource;
        pub(crate) mod ledger_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod code_model;
        pub(crate) mod config_model;
        pub(crate) mod decimal_amount_model;
        pub(crate) mod iso_currency_model;
        pub(crate) mod iso_date_model;
        pub(crate) mod ledger_entry_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod catalog_repository_impl;
        pub(crate) mod documents_repository_impl;
        pub(crate) mod ledger_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod catalog;
        pub(crate) mod config;
        pub(crate) mod filters;
        pub(crate) mod handlers;
        pub(crate) mod invoice;
        pub(crate) mod ledger_entry;
        pub(crate) mod party;
        pub(crate) mod report;
        pub(crate) mod sale_order;
        pub(crate) mod snapshot;
    }
    pub(crate) mod logic {
        pub(crate) mod commission_calculator;
        pub(crate) mod entry_impl;
        pub(crate) mod period_impl;
        pub(crate) mod reconciler;
        pub(crate) mod totals;
    }
    pub(crate) mod repositories {
        pub(crate) mod catalog_repository;
        pub(crate) mod documents_repository;
        pub(crate) mod ledger_repository;
    }
    pub(crate) mod usecases {
        pub(crate) mod documents_usecase;
        pub(crate) mod payment_usecase;
        pub(crate) mod reconcile_usecase;
        pub(crate) mod reporting_session;
    }
}

pub(crate) mod presentation {
    pub(crate) mod money_fmt;
    pub(crate) mod report_builder;
    pub(crate) mod report_printer;
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from the
    // internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::catalog::*;
        pub use crate::domain::entities::config::*;
        pub use crate::domain::entities::filters::*;
        pub use crate::domain::entities::handlers::*;
        pub use crate::domain::entities::invoice::*;
        pub use crate::domain::entities::ledger_entry::*;
        pub use crate::domain::entities::party::*;
        pub use crate::domain::entities::report::*;
        pub use crate::domain::entities::sale_order::*;
        pub use crate::domain::entities::snapshot::*;
    }

    pub mod repositories {
        pub use crate::data::repositories::catalog_repository_impl::CatalogRepositoryImpl;
        pub use crate::data::repositories::documents_repository_impl::DocumentsRepositoryImpl;
        pub use crate::data::repositories::ledger_repository_impl::LedgerRepositoryImpl;
        pub use crate::domain::repositories::catalog_repository::*;
        pub use crate::domain::repositories::documents_repository::*;
        pub use crate::domain::repositories::ledger_repository::*;
    }

    pub mod usecases {
        pub use crate::domain::usecases::documents_usecase::{
            DocumentsUsecase, DocumentsUsecaseImpl,
        };
        pub use crate::domain::usecases::payment_usecase::{PaymentUsecase, PaymentUsecaseImpl};
        pub use crate::domain::usecases::reconcile_usecase::{
            ReconcileUsecase, ReconcileUsecaseImpl,
        };
        pub use crate::domain::usecases::reporting_session::ReportingSession;
    }

    pub mod presentation {
        pub use crate::presentation::report_printer::ReportPrinter;
    }
}
