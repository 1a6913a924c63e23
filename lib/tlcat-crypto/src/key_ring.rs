// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::collections::HashMap;

use log::{debug, warn};

use crate::rsa::PublicKey;

/// A set of trusted public keys, indexed by their wire fingerprint.
#[derive(Clone, Debug, Default)]
pub struct KeyRing {
    keys: HashMap<i64, PublicKey>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusts a new key, returning its fingerprint.
    pub fn insert(&mut self, key: PublicKey) -> i64 {
        let fingerprint = key.fingerprint_id();
        debug!("trusting {} with fingerprint {}", key, fingerprint);
        if self.keys.insert(fingerprint, key).is_some() {
            warn!("key with fingerprint {} was already trusted", fingerprint);
        }
        fingerprint
    }

    pub fn get(&self, fingerprint: i64) -> Option<&PublicKey> {
        self.keys.get(&fingerprint)
    }

    /// Picks the first of the fingerprints offered by a server for which a
    /// key is known.
    pub fn find_first_known(&self, fingerprints: &[i64]) -> Option<(i64, &PublicKey)> {
        let found = fingerprints
            .iter()
            .find_map(|&fingerprint| self.get(fingerprint).map(|key| (fingerprint, key)));

        if found.is_none() {
            warn!("all server fingerprints are unknown: {:?}", fingerprints);
        }
        found
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &PublicKey)> {
        self.keys.iter().map(|(&fingerprint, key)| (fingerprint, key))
    }
}

impl FromIterator<PublicKey> for KeyRing {
    fn from_iter<I: IntoIterator<Item = PublicKey>>(iter: I) -> Self {
        let mut ring = Self::new();
        iter.into_iter().for_each(|key| {
            ring.insert(key);
        });
        ring
    }
}
