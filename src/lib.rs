//! acctguard - account credential state and authentication policy.
//!
//! Password validation, password rotation with strength rules,
//! login-failure rate limiting and time-bounded access denial for a
//! single in-memory account.

pub mod account;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod login;

pub use account::{
    is_valid_username, Account, CharClasses, CreateError, Credential, CredentialError, Hasher,
    PasswordPolicy, StrengthError,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{AcctError, Result};
pub use login::{handle_login, LoginResult};
