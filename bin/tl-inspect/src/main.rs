// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Inspect raw Type Language data and the RSA keys servers present.
//!
//! ```text
//! tl-inspect decode <file>... [--schema <file.tl>]... [--config <file.toml>]
//! tl-inspect fingerprint <modulus-hex> [<exponent-hex>]
//! tl-inspect keys [--config <file.toml>]
//! ```
//!
//! If a file to decode is "-", it is read from standard input instead.
//! Pass `--verbose` to see what the libraries log.
mod config;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use config::{Config, CONFIG_ENV};
use simple_logger::SimpleLogger;
use tlcat_codec::Codec;
use tlcat_crypto::{hex, PublicKey};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const STDIN_NAME: &str = "-";
const USAGE: &str = "usage: tl-inspect decode <file>... [--schema <file.tl>]... [--config <file.toml>]
       tl-inspect fingerprint <modulus-hex> [<exponent-hex>]
       tl-inspect keys [--config <file.toml>]";

/// Removes every occurrence of `flag` and the value following it.
fn take_values(args: &mut Vec<String>, flag: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    while let Some(pos) = args.iter().position(|arg| arg == flag) {
        args.remove(pos);
        if pos >= args.len() {
            return Err(format!("{} requires a value", flag).into());
        }
        values.push(args.remove(pos));
    }
    Ok(values)
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}

fn load_config(args: &mut Vec<String>) -> Result<Config> {
    let path = take_values(args, "--config")?
        .pop()
        .or_else(|| env::var(CONFIG_ENV).ok());

    match path {
        Some(path) => Config::load(Path::new(&path)),
        None => Ok(Config::default()),
    }
}

fn read_input(name: &str) -> io::Result<Vec<u8>> {
    if name == STDIN_NAME {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        Ok(data)
    } else {
        fs::read(name)
    }
}

fn decode(mut args: Vec<String>) -> Result<()> {
    let extra = take_values(&mut args, "--schema")?
        .into_iter()
        .map(PathBuf::from)
        .collect::<Vec<_>>();
    let config = load_config(&mut args)?;
    if args.is_empty() {
        return Err(USAGE.into());
    }

    let codec = Codec::new(config.load_schema(&extra)?);
    if codec.schema().is_empty() {
        log::warn!("no schema loaded, only built-in constructors can be decoded");
    }

    let mut failed = 0;
    for name in args.iter() {
        let result = read_input(name)
            .map_err(|e| e.to_string())
            .and_then(|data| codec.decode_exact(&data).map_err(|e| e.to_string()));

        match result {
            Ok(value) => println!("{}: {}", name, value),
            Err(e) => {
                eprintln!("{}: {}", name, e);
                failed += 1;
            }
        }
    }

    if failed != 0 {
        return Err(format!("{} of {} inputs could not be decoded", failed, args.len()).into());
    }
    Ok(())
}

fn fingerprint(args: Vec<String>) -> Result<()> {
    let (modulus, exponent) = match args.as_slice() {
        [modulus] => (modulus.as_str(), "010001"),
        [modulus, exponent] => (modulus.as_str(), exponent.as_str()),
        _ => return Err(USAGE.into()),
    };

    let key = PublicKey::from_hex(modulus, exponent)?;
    println!("0x{} {}", hex::to_hex(&key.fingerprint()), key.fingerprint_id());
    Ok(())
}

fn keys(mut args: Vec<String>) -> Result<()> {
    let config = load_config(&mut args)?;
    if !args.is_empty() {
        return Err(USAGE.into());
    }

    for (i, key) in config.keys.iter().enumerate() {
        let name = key.name.clone().unwrap_or_else(|| format!("#{}", i));
        match key.public_key() {
            Ok(public) => println!("{}: {} ({})", name, public, public.fingerprint_id()),
            Err(e) => eprintln!("{}: {}", name, e),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let verbose = take_flag(&mut args, "--verbose");

    SimpleLogger::new()
        .with_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init()?;

    if args.is_empty() {
        return Err(USAGE.into());
    }
    let command = args.remove(0);
    match command.as_str() {
        "decode" => decode(args),
        "fingerprint" => fingerprint(args),
        "keys" => keys(args),
        _ => Err(USAGE.into()),
    }
}
