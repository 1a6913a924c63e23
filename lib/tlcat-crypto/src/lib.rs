// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Utilities to identify the RSA public keys servers present during the
//! MTProto handshake.
//!
//! A server lists the fingerprints of the keys it can decrypt with, and the
//! client picks one it trusts from its [`KeyRing`].
pub mod hex;
mod key_ring;
mod rsa;

pub use key_ring::KeyRing;
pub use rsa::{fingerprint, KeyError, PublicKey, DEFAULT_EXPONENT};
