use crate::{
    ledger::{
        SignError,
        Signer,
    },
    tx::{
        Signature,
        SignedTransaction,
        Transaction,
    },
    types::Address,
};
use sha2::{
    Digest,
    Sha256,
};

/// A signer holding raw 32-byte key material, typically unlocked from an
/// encrypted keystore file. The address is derived by hashing the key.
#[derive(Clone)]
pub struct KeySigner {
    secret: [u8; 32],
    address: Address,
}

impl KeySigner {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"tamagosui-address");
        hasher.update(secret);
        let address = Address(hasher.finalize().into());
        Self { secret, address }
    }

    pub fn random() -> Self {
        Self::from_secret(rand::random())
    }
}

impl Signer for KeySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, tx: Transaction) -> Result<SignedTransaction, SignError> {
        let payload = serde_json::to_vec(&tx).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(&payload);
        let signature = Signature(hasher.finalize().into());
        Ok(SignedTransaction {
            tx,
            sender: self.address,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::tx::{
        CallArg,
        EntryPoint,
    };

    #[test]
    fn key_signer__derives_stable_address_from_secret() {
        let a = KeySigner::from_secret([9u8; 32]);
        let b = KeySigner::from_secret([9u8; 32]);
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), KeySigner::from_secret([10u8; 32]).address());
    }

    #[test]
    fn key_signer__signed_transaction_carries_sender() {
        let signer = KeySigner::from_secret([3u8; 32]);
        let tx = Transaction::single(
            EntryPoint::AdoptPet,
            vec![CallArg::Str("Ron".to_string())],
        );
        let signed = signer.sign(tx.clone()).unwrap();
        assert_eq!(signed.sender, signer.address());
        assert_eq!(signed.tx, tx);
    }
}
