pub mod account_service;
pub mod report_service;

pub use account_service::{AccountError, AccountService};
pub use report_service::{summarize, ReportError, ReportRange, ReportSummary};
