/// Client identity and signing key supplied with each gateway call.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    private_key_pem: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            private_key_pem: private_key_pem.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// PEM-encoded RSA private key (PKCS#8 or PKCS#1).
    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("private_key_pem", &"***redacted***")
            .finish()
    }
}
