// handlers/protected/mod.rs - endpoints behind the session and user middleware
//
// Handlers receive the caller as `Extension<CurrentUser>`. Every handler that
// takes a resource id runs it through the ownership guard before touching
// the request body.

pub mod clients;
pub mod courts;
pub mod payments;
pub mod receipts;
pub mod reports;
pub mod session;
pub mod utils;

pub use clients::create as clients_create;
pub use clients::delete as client_delete;
pub use clients::get as client_get;
pub use clients::list as clients_list;
pub use clients::put as client_put;

pub use payments::create as payments_create;
pub use payments::delete as payment_delete;
pub use payments::get as payment_get;
pub use payments::list as payments_list;
pub use payments::put as payment_put;

pub use receipts::create as receipts_create;
pub use receipts::delete as receipt_delete;
pub use receipts::get as receipt_get;
pub use receipts::list as receipts_list;
pub use receipts::put as receipt_put;

pub use courts::create as courts_create;
pub use courts::delete as court_delete;
pub use courts::get as court_get;
pub use courts::list as courts_list;
pub use courts::put as court_put;

pub use reports::summary as reports_summary;

pub use session::delete as session_delete;
pub use session::get as session_get;
pub use session::refresh as session_refresh;
