//! String forms of identifiers and keys.
//!
//! Parsing is always available; `Display` needs the `with-to-string` feature.
use crate::error::{Error, Result};
use crate::keys::*;
use crate::types::*;

pub use hex::FromHexError;

fn decode_hex<const N: usize>(s: &str, skip: impl Fn(char) -> bool) -> Result<[u8; N]> {
    let cleaned: String = s.chars().filter(|c| !skip(*c)).collect();
    let mut res = [0; N];
    hex::decode_to_slice(cleaned.as_bytes(), &mut res)?;
    Ok(res)
}

macro_rules! fixed_len_struct_impl_key_string {
    (
        $type:ident;
    ) => {
        /// Parses 32 hex digits; whitespace between them is ignored.
        impl core::str::FromStr for $type {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                decode_hex::<16>(s, char::is_whitespace).map(Self::from)
            }
        }

        #[cfg(feature = "with-to-string")]
        impl core::fmt::Display for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&hex::encode(self.as_ref()))
            }
        }
    };
}

fixed_len_struct_impl_key_string! {
    AES128;
}

fixed_len_struct_impl_key_string! {
    AppKey;
}

fixed_len_struct_impl_key_string! {
    NwkSKey;
}

fixed_len_struct_impl_key_string! {
    AppSKey;
}

#[cfg(feature = "with-to-string")]
fn write_hyphenated(f: &mut core::fmt::Formatter<'_>, octets: &[u8]) -> core::fmt::Result {
    for (i, b) in octets.iter().enumerate() {
        if i > 0 {
            f.write_str("-")?;
        }
        f.write_str(&hex::encode([*b]))?;
    }
    Ok(())
}

/// Parses `xx-xx-xx-xx-xx-xx-xx-xx`; hyphens and whitespace are ignored, so
/// a bare 16 digit string is accepted too.
impl core::str::FromStr for EUI {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_hex::<8>(s, |c| c == '-' || c.is_whitespace()).map(EUI)
    }
}

#[cfg(feature = "with-to-string")]
impl core::fmt::Display for EUI {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_hyphenated(f, &self.0)
    }
}

/// Parses up to eight hex digits of the packed 32-bit value.
impl core::str::FromStr for DevAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        u32::from_str_radix(s.trim(), 16)
            .map(DevAddr::from_u32)
            .map_err(|_| Error::InvalidParameterFormat)
    }
}

#[cfg(feature = "with-to-string")]
impl core::fmt::Display for DevAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:08x}", self.to_u32())
    }
}

impl core::str::FromStr for MA {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let cleaned: String = s.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();
        MA::new(&hex::decode(cleaned)?)
    }
}

#[cfg(feature = "with-to-string")]
impl core::fmt::Display for MA {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_hyphenated(f, self.prefix())
    }
}
