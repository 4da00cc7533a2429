use {
    crate::*,
    std::future::Future,
};

/// Turns credentials into a user identity.
pub trait Authenticator: Send + Sync {
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<User, ApiError>> + Send;
}

/// Lists the certificates a user holds, in the order the portal keeps them.
pub trait CertificateSource: Send + Sync {
    fn list(&self, user: &User) -> impl Future<Output = Result<Vec<Certificate>, ApiError>> + Send;
}

/// Adds a scanned certificate to the user's list.
///
/// `encrypted_data` is the QR payload exactly as decoded.
pub trait CertificateIngestion: Send + Sync + 'static {
    fn ingest(
        &self,
        user: &User,
        encrypted_data: &str,
    ) -> impl Future<Output = Result<Certificate, ApiError>> + Send;
}
