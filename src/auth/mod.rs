//! Bearer token authentication with admin and ownership gates.
//!
//! Requests carry a stateless HS256 access token in `Authorization: Bearer`.
//! The resolver turns it into a [`Principal`] by loading the user row, then the
//! policy gates decide whether the principal may touch the requested resource.

mod errors;
mod extractors;
mod header;
mod policy;
mod resolver;
mod state;
mod types;

pub use errors::{ApiAuthError, AuthErrorKind, UnauthorizedReason};
pub use extractors::{AdminOnly, AnyRole, Auth, OwnerOrAdmin, RoleConstraint, USER_ID_PARAM};
pub use header::{authorization_header, parse_bearer};
pub use policy::{parse_target_user_id, require_admin, require_owner_or_admin};
pub use resolver::resolve;
pub use state::HasAuthBackend;
pub use types::Principal;
