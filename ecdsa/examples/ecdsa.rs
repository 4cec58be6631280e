use ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let sk = SigningKey::random(&mut rng);
    let vk = VerifyingKey::from(&sk);

    let sk_bytes = sk.to_bytes();
    let vk_bytes = vk.to_bytes();

    let msg = b"hello ecdsa";
    let sig = sk.sign(&mut rng, msg);
    let sig_bytes = sig.to_bytes();

    let sk2 = SigningKey::from_bytes(&sk_bytes).expect("decode sk");
    let vk2 = VerifyingKey::from_bytes(&vk_bytes).expect("decode vk");
    let sig2 = Signature::from_bytes(&sig_bytes).expect("decode sig");

    assert!(vk2.verify(msg, &sig2));
    assert_eq!(sk2.verifying_key(), vk2);
}
