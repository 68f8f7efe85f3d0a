/// Verified caller identity.
///
/// Only `AccessTokenVerifier` creates one, from a token whose signature has
/// been checked. There is intentionally no `Deserialize`/`From<u64>`: a uid
/// taken from a request body must never become an `Identity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    uid: u64,
}

impl Identity {
    pub(crate) fn new(uid: u64) -> Self {
        Self { uid }
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }
}
