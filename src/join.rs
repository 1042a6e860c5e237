//! Bodies of the JoinRequest and JoinAccept messages.
use rand_core::RngCore;

use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::packet_length::phy::join::*;
use crate::types::{AppNonce, DLSettings, DevAddr, EUI};

/// Largest NetID that fits in its 24-bit field.
pub const MAX_NET_ID: u32 = 0x00FF_FFFF;

/// JoinRequestPayload represents a join request MacPayload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinRequestPayload {
    pub app_eui: EUI,
    pub dev_eui: EUI,
    pub dev_nonce: u16,
}

impl JoinRequestPayload {
    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        let mut r = r.sub_reader(JOIN_REQUEST_PAYLOAD_LEN)?;
        Ok(Self {
            app_eui: EUI::read_from(&mut r)?,
            dev_eui: EUI::read_from(&mut r)?,
            // the only big endian field of a frame
            dev_nonce: r.read_u16_be()?,
        })
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        let mut w = Writer::new(w.reserve(JOIN_REQUEST_PAYLOAD_LEN)?);
        self.app_eui.write_to(&mut w)?;
        self.dev_eui.write_to(&mut w)?;
        w.write_u16_be(self.dev_nonce)
    }
}

/// Channel frequency list appended to a JoinAccept. It is carried as is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfList(pub [u8; CF_LIST_LEN]);

impl AsRef<[u8]> for CfList {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// JoinAcceptPayload represents a join accept MacPayload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinAcceptPayload {
    pub app_nonce: AppNonce,
    pub net_id: u32,
    pub dev_addr: DevAddr,
    pub dl_settings: DLSettings,
    pub rx_delay: u8,
    pub cf_list: Option<CfList>,
}

impl JoinAcceptPayload {
    /// Picks a fresh random AppNonce.
    pub fn generate_app_nonce<R: RngCore>(&mut self, rng: &mut R) -> Result<()> {
        self.app_nonce = AppNonce::random(rng)?;
        Ok(())
    }

    pub fn encoded_len(&self) -> usize {
        match self.cf_list {
            Some(_) => JOIN_ACCEPT_PAYLOAD_WITH_CFLIST_LEN,
            None => JOIN_ACCEPT_PAYLOAD_LEN,
        }
    }

    /// Reads the fixed body. A CFList is picked up only if a whole one
    /// follows; shorter trailing data is ignored.
    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        let mut body = r.sub_reader(JOIN_ACCEPT_PAYLOAD_LEN)?;
        let app_nonce = AppNonce(body.read_array()?);
        let [a, b, c] = body.read_array::<NET_ID_LEN>()?;
        let net_id = u32::from_be_bytes([0, a, b, c]);
        let dev_addr = DevAddr::read_from(&mut body)?;
        let dl_settings = DLSettings::read_from(&mut body)?;
        let rx_delay = body.read_u8()?;
        let cf_list = match r.remaining() {
            n if n >= CF_LIST_LEN => Some(CfList(r.read_array()?)),
            _ => None,
        };
        Ok(Self { app_nonce, net_id, dev_addr, dl_settings, rx_delay, cf_list })
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.net_id > MAX_NET_ID {
            return Err(Error::ParameterOutOfRange);
        }
        let mut w = Writer::new(w.reserve(self.encoded_len())?);
        w.write_slice(self.app_nonce.as_ref())?;
        w.write_slice(&self.net_id.to_be_bytes()[1..])?;
        self.dev_addr.write_to(&mut w)?;
        self.dl_settings.write_to(&mut w)?;
        w.write_u8(self.rx_delay)?;
        if let Some(cf_list) = &self.cf_list {
            w.write_slice(cf_list.as_ref())?;
        }
        Ok(())
    }
}
