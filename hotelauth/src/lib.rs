//--------------------------------------------------------------------------------------------------

mod auth;
pub mod backend;
pub mod codec;
mod error;
#[cfg(feature = "axum-extract")]
pub mod extract;
pub mod internal;
mod resolver;
mod role;
mod session;
mod store;
mod types;

pub use auth::AuthSession;
pub use error::AuthError;
pub use internal::claims::ClaimSet;
pub use internal::unixtime::UnixTimestamp;
pub use resolver::{ClaimResolver, Field, ResolvedClaim};
pub use role::{Role, UnknownRole};
pub use session::SessionValidator;
pub use store::{MemoryTokenStore, TokenStore};
pub use types::*;

//--------------------------------------------------------------------------------------------------
