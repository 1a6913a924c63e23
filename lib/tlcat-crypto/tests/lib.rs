// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use tlcat_crypto::{hex, KeyRing, PublicKey};

// As printed by `openssl rsa -pubin -text`.
const MODULUS_DUMP: &str = "
    00:c1:50:02:3e:2f:70:db:79:85:de:d0:64:75:9c:
    fe:cf:0a:f3:28:e6:9a:41:da:f4:d6:f0:1b:53:81:
    35:a6:f9:1f:8f:8b:2a:0e:c9:ba:97:20:ce:35:2e:
    fc:f6:c5:68:0f:fc:42:4b:d6:34:86:49:02:de:0b:
    4b:d6:d4:9f:4e:58:02:30:e3:ae:97:d9:5c:8b:19:
    44:2b:3c:0a:10:d8:f5:63:3f:ec:ed:d6:92:6a:7f:
    6d:ab:0d:db:7d:45:7f:9e:a8:1b:84:65:fc:d6:ff:
    fe:ed:11:40:11:df:91:c0:59:ca:ed:af:97:62:5f:
    6c:96:ec:c7:47:25:55:69:34:ef:78:1d:86:6b:34:
    f0:11:fc:e4:d8:35:a0:90:19:6e:9a:5f:0e:44:49:
    af:7e:b6:97:dd:b9:07:64:94:ca:5f:81:10:4a:30:
    5b:6d:d2:76:65:72:2c:46:b6:0e:5d:f6:80:fb:16:
    b2:10:60:7e:f2:17:65:2e:60:23:6c:25:5f:6a:28:
    31:5f:40:83:a9:67:91:d7:21:4b:f6:4c:1d:f4:fd:
    0d:b1:94:4f:b2:6a:2a:57:03:1b:32:ee:e6:4a:d1:
    5a:8b:a6:88:85:cd:e7:4a:5b:fc:92:0f:6a:bf:59:
    ba:5c:75:50:63:73:e7:13:0f:90:42:da:92:21:79:
    25:1f";

fn test_key() -> PublicKey {
    PublicKey::from_hex(MODULUS_DUMP, "010001").unwrap()
}

#[test]
fn openssl_dump_fingerprint() {
    let key = test_key();
    assert_eq!(hex::to_hex(&key.fingerprint()), "c3b42b026ce86b21");
    assert_eq!(key.fingerprint_id(), -4344800451088585951);
}

#[test]
fn fingerprint_is_deterministic() {
    assert_eq!(test_key().fingerprint(), test_key().fingerprint());
}

#[test]
fn key_ring_lookup() {
    let other = PublicKey::from_decimal("3233", "17").unwrap();
    let ring = vec![test_key(), other.clone()]
        .into_iter()
        .collect::<KeyRing>();
    assert_eq!(ring.len(), 2);

    let offered = [1, 2, -4344800451088585951, other.fingerprint_id()];
    let (fingerprint, key) = ring.find_first_known(&offered).unwrap();
    assert_eq!(fingerprint, -4344800451088585951);
    assert_eq!(key, &test_key());

    assert_eq!(ring.get(other.fingerprint_id()), Some(&other));
    assert!(ring.find_first_known(&[1, 2, 3]).is_none());
}

#[test]
fn key_ring_replaces_duplicates() {
    let mut ring = KeyRing::new();
    let first = ring.insert(test_key());
    let second = ring.insert(test_key());
    assert_eq!(first, second);
    assert_eq!(ring.len(), 1);
}
