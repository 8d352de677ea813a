pub mod authorizer;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod grants;
pub mod identity;
pub mod identity_cache;
pub mod locks;
pub mod payload;
pub mod resolver;
pub mod token;

pub use authorizer::{Authorized, Authorizer};
pub use error::{AuthError, DENIAL_MESSAGE, Denied};
pub use factory::build_authorizer;
