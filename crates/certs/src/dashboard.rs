use crate::*;

/// What the portal front end shows: the user, their certificates, which one
/// is selected and the last error.
#[derive(Debug, Default)]
pub struct Dashboard {
    user: Option<User>,
    certificates: Vec<Certificate>,
    selected: Option<Id>,
    error: Option<String>,
    loading: bool,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Certificates in the order the portal returned them, newest scans first.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn selected(&self) -> Option<&Certificate> {
        let id = self.selected.as_ref()?;
        self.certificates.iter().find(|cert| &cert.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn login<A: Authenticator>(
        &mut self,
        auth: &A,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        self.loading = true;
        self.error = None;
        let result = auth.login(credentials).await;
        self.loading = false;
        match result {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            }
            Err(error) => {
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Reloads the certificate list and selects the first entry.
    ///
    /// Does nothing while logged out. On failure the previous list stays.
    pub async fn refresh<S: CertificateSource>(&mut self, source: &S) -> Result<(), ApiError> {
        let Some(user) = self.user.as_ref() else {
            log::debug!("refresh while logged out");
            return Ok(());
        };
        self.loading = true;
        self.error = None;
        let result = source.list(user).await;
        self.loading = false;
        match result {
            Ok(certificates) => {
                if let Some(first) = certificates.first() {
                    self.selected = Some(first.id.clone());
                }
                self.certificates = certificates;
                Ok(())
            }
            Err(error) => {
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("logged out {}", user.id);
        }
        self.certificates.clear();
        self.selected = None;
        self.error = None;
        self.loading = false;
    }

    /// Selects the certificate with `id`. Returns false if it is not listed.
    pub fn select(&mut self, id: &Id) -> bool {
        if self.certificates.iter().any(|cert| &cert.id == id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn begin_scan(&mut self) {
        self.selected = None;
        self.error = None;
    }

    /// A scanned certificate was accepted: show it first and select it.
    pub fn record_ingested(&mut self, certificate: Certificate) {
        self.selected = Some(certificate.id.clone());
        self.certificates.insert(0, certificate);
        self.error = None;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}
