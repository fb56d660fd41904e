use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// It caches the last loaded credential and only asks the provider again
/// once the cached one is no longer valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context this signer was built with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts) -> Result<()> {
        let credential = self.cached()?;
        let credential = if credential.is_valid() {
            credential
        } else {
            log::debug!("no valid cached credential, loading from provider");
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self
                .credential
                .lock()
                .map_err(|_| Error::unexpected("credential cache lock poisoned"))? =
                loaded.clone();
            loaded
        };

        self.builder
            .sign_request(&self.ctx, req, credential.as_ref())
            .await
    }

    fn cached(&self) -> Result<Option<K>> {
        Ok(self
            .credential
            .lock()
            .map_err(|_| Error::unexpected("credential cache lock poisoned"))?
            .clone())
    }
}
