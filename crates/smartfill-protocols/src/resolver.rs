//! Value resolver protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResolverError;
use crate::types::{Credential, PageContext, Profile, SimplifiedField};

/// Input of a single resolution call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Fields keyed by their page-unique key.
    pub fields: Vec<SimplifiedField>,
    pub profile: Profile,
    pub context: PageContext,
    #[serde(skip)]
    pub credential: Option<Credential>,
}

impl ResolveRequest {
    pub fn new(fields: Vec<SimplifiedField>, profile: Profile, context: PageContext) -> Self {
        Self {
            fields,
            profile,
            context,
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// Maps field descriptors and a profile to values.
///
/// Implementations return the raw reply text. Extracting the value mapping
/// from it is the caller's job, so a resolver may answer in free prose as long
/// as it contains one JSON object of string values.
#[async_trait]
pub trait ValueResolver: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve(&self, request: ResolveRequest) -> Result<String, ResolverError>;
}
