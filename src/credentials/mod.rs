pub mod broker;
pub mod messages;

pub use broker::{Credential, CredentialBroker, CredentialSource};
pub use messages::{CredentialErrorResponse, CredentialRequest, CredentialResponse};
