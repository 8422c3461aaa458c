pub mod handler;
pub mod nonce;
pub mod page;

pub use handler::{AdminError, AdminFormHandler, INVALID_REQUEST, SAVED, SECURITY_FIELD};
pub use nonce::{NonceGuard, ADMIN_ACTION};
pub use page::AdminPage;
