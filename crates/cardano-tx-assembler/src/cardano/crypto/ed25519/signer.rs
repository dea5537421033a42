//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Signature, SigningKey, VerificationKey};

/// Anything able to produce ed25519 signatures for a known verification key: an in-memory key,
/// or a handle on a key held elsewhere.
pub trait Signer {
    fn verification_key(&self) -> VerificationKey;

    fn sign(&self, message: &[u8]) -> Signature;
}

impl Signer for SigningKey {
    fn verification_key(&self) -> VerificationKey {
        self.to_verification_key()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        SigningKey::sign(self, message)
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn verification_key(&self) -> VerificationKey {
        (**self).verification_key()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        (**self).sign(message)
    }
}
