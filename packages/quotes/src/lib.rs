// ABOUTME: Partner quotes and the budget approval workflow
// ABOUTME: Admin and client reviews with partial rejection, service cascade and execution tracking

pub mod storage;
pub mod types;
pub mod workflow;

pub use storage::QuoteStorage;
pub use types::{
    recompute_total, AdminDecision, ClientDecision, Quote, QuoteCreateInput, QuoteDetail,
    QuoteFilter, QuoteItem, QuoteItemInput, QuoteItemStatus, QuoteStatus, Service, ServiceStatus,
};
pub use workflow::BudgetWorkflow;
