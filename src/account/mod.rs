//! Account credential state and authentication policy.
//!
//! This module provides the [`Account`] entity, its opaque credential,
//! the password strength policy and account summaries.

mod credential;
mod model;
mod strength;
mod summary;

pub use credential::{Credential, CredentialError, Hasher};
pub use model::{Account, CreateError};
pub use strength::{is_valid_username, CharClasses, PasswordPolicy, StrengthError};
