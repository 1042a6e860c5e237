//! PhyPayload, the complete over-the-air frame, and its encode and decode
//! entry points.
//!
//! Every cryptographic entry point comes in two flavours: a `*_with_factory`
//! method generic over [`CryptoFactory`] and, with the `default-crypto`
//! feature, a shorthand using [`crate::default_crypto::DefaultFactory`].
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::header::{MType, MHDR};
use crate::join::{JoinAcceptPayload, JoinRequestPayload};
use crate::keys::{AppKey, AppSKey, CryptoFactory, NwkSKey, MIC};
use crate::macpayload::MacPayload;
use crate::packet_length::phy::join::{
    JOIN_ACCEPT_LEN, JOIN_ACCEPT_WITH_CFLIST_LEN, JOIN_REQUEST_LEN,
};
use crate::packet_length::phy::{MAX_PAYLOAD_SIZE, MHDR_LEN, MIC_LEN, PHY_PAYLOAD_MIN_LEN};
use crate::securityhelpers;

/// The message carried between the MHDR and the MIC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Mac(MacPayload),
    JoinRequest(JoinRequestPayload),
    JoinAccept(JoinAcceptPayload),
}

/// PhyPayload represents a complete LoRaWAN frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhyPayload {
    pub mhdr: MHDR,
    pub payload: Payload,
    pub mic: MIC,
}

impl PhyPayload {
    /// An empty frame of type `mtype`, ready to be filled in.
    pub fn new(mtype: MType) -> Self {
        let payload = match mtype {
            MType::JoinRequest => Payload::JoinRequest(JoinRequestPayload::default()),
            MType::JoinAccept => Payload::JoinAccept(JoinAcceptPayload::default()),
            _ => Payload::Mac(MacPayload::new(mtype.direction())),
        };
        Self { mhdr: MHDR::new(mtype), payload, mic: MIC::default() }
    }

    pub fn mtype(&self) -> MType {
        self.mhdr.mtype
    }

    pub fn mac_payload(&self) -> Result<&MacPayload> {
        match &self.payload {
            Payload::Mac(p) => Ok(p),
            _ => Err(Error::NilError),
        }
    }

    pub fn mac_payload_mut(&mut self) -> Result<&mut MacPayload> {
        match &mut self.payload {
            Payload::Mac(p) => Ok(p),
            _ => Err(Error::NilError),
        }
    }

    pub fn join_request(&self) -> Result<&JoinRequestPayload> {
        match &self.payload {
            Payload::JoinRequest(p) => Ok(p),
            _ => Err(Error::NilError),
        }
    }

    pub fn join_accept(&self) -> Result<&JoinAcceptPayload> {
        match &self.payload {
            Payload::JoinAccept(p) => Ok(p),
            _ => Err(Error::NilError),
        }
    }

    /// Parses a received frame. Payloads are left as they are on the wire:
    /// the FRMPayload stays encrypted and a JoinAccept body is read without
    /// decrypting it (see [`PhyPayload::decode_join_accept_with_factory`]).
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < PHY_PAYLOAD_MIN_LEN {
            return Err(Error::BufferTruncated);
        }
        if data.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidSource);
        }
        let (frame, mic) = data.split_at(data.len() - MIC_LEN);
        let mut r = Reader::new(frame);
        let mhdr = MHDR::read_from(&mut r)?;
        let mic = MIC(mic.try_into().map_err(|_| Error::BufferTruncated)?);

        let payload = match mhdr.mtype {
            MType::UnconfirmedDataUp
            | MType::UnconfirmedDataDown
            | MType::ConfirmedDataUp
            | MType::ConfirmedDataDown => {
                Payload::Mac(MacPayload::read_from(&mut r, mhdr.mtype.direction())?)
            }
            MType::JoinRequest => Payload::JoinRequest(JoinRequestPayload::read_from(&mut r)?),
            MType::JoinAccept => Payload::JoinAccept(JoinAcceptPayload::read_from(&mut r)?),
            MType::RFU | MType::Proprietary => return Err(Error::InvalidMessageType),
        };
        Ok(Self { mhdr, payload, mic })
    }

    /// Writes MHDR, MAC payload and the current MIC. The FRMPayload is
    /// written as is, so it must already be encrypted. `fctrl.f_opts_len`
    /// and `fport` are updated the way [`MacPayload::write_to`] describes.
    pub fn marshal_binary(&mut self) -> Result<Vec<u8>> {
        if matches!(self.mhdr.mtype, MType::JoinAccept | MType::JoinRequest | MType::Proprietary) {
            return Err(Error::InvalidMessageType);
        }
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        let mut w = Writer::new(&mut buf);
        self.mhdr.write_to(&mut w)?;
        let Payload::Mac(mac_payload) = &mut self.payload else {
            return Err(Error::NilError);
        };
        mac_payload.write_to(&mut w)?;
        w.write_slice(&self.mic.0)?;
        Ok(w.written().to_vec())
    }

    /// Data frame MIC over `data`, the frame without its MIC.
    pub fn calculate_mic_with_factory<F: CryptoFactory>(
        &self,
        nwk_skey: &NwkSKey,
        data: &[u8],
        factory: &F,
    ) -> Result<MIC> {
        let mac_payload = self.mac_payload()?;
        // B0 carries the length in a single byte
        if data.len() > MAX_PAYLOAD_SIZE - MIC_LEN {
            return Err(Error::InvalidSource);
        }
        Ok(securityhelpers::calculate_data_mic(
            factory,
            nwk_skey.inner(),
            self.mhdr.mtype.direction(),
            mac_payload.fhdr.dev_addr,
            mac_payload.fhdr.fcnt,
            data,
        ))
    }

    /// Checks the MIC of `data`, the raw frame this payload was decoded from.
    pub fn verify_mic_with_factory<F: CryptoFactory>(
        &self,
        nwk_skey: &NwkSKey,
        data: &[u8],
        factory: &F,
    ) -> Result<()> {
        if data.len() < PHY_PAYLOAD_MIN_LEN {
            return Err(Error::BufferTruncated);
        }
        let expected = self.calculate_mic_with_factory(nwk_skey, &data[..data.len() - MIC_LEN], factory)?;
        if expected != self.mic {
            debug!("MIC mismatch: got {:x}, expected {:x}", self.mic.to_u32(), expected.to_u32());
            return Err(Error::InvalidMic);
        }
        Ok(())
    }

    /// Toggles the FRMPayload between plain and cipher text, keyed with
    /// the NwkSKey on port 0 and the AppSKey otherwise. Encrypting and
    /// decrypting are the same operation.
    pub fn decrypt_with_factory<F: CryptoFactory>(
        &mut self,
        nwk_skey: &NwkSKey,
        app_skey: &AppSKey,
        factory: &F,
    ) -> Result<()> {
        let direction = self.mhdr.mtype.direction();
        let mac_payload = self.mac_payload_mut()?;
        let key = if mac_payload.fport == 0 { nwk_skey.inner() } else { app_skey.inner() };
        securityhelpers::encrypt_frm_data_payload(
            factory,
            key,
            direction,
            mac_payload.fhdr.dev_addr,
            mac_payload.fhdr.fcnt,
            &mut mac_payload.frm_payload,
        );
        Ok(())
    }

    /// Encrypts the FRMPayload, which must be plain text, sets the MIC
    /// over the cipher text and returns the frame.
    ///
    /// On success the payload is left encrypted, and calling this twice
    /// encrypts twice. On error the payload is untouched.
    pub fn encode_message_with_factory<F: CryptoFactory>(
        &mut self,
        nwk_skey: &NwkSKey,
        app_skey: &AppSKey,
        factory: &F,
    ) -> Result<Vec<u8>> {
        // the layout does not depend on the payload bytes, so a frame that
        // marshals now still fits once encrypted
        self.marshal_binary()?;
        self.decrypt_with_factory(nwk_skey, app_skey, factory)?;
        let mut buf = self.marshal_binary()?;
        let body_len = buf.len() - MIC_LEN;
        self.mic = self.calculate_mic_with_factory(nwk_skey, &buf[..body_len], factory)?;
        buf[body_len..].copy_from_slice(&self.mic.0);
        Ok(buf)
    }

    /// Builds the JoinRequest frame, MIC included.
    ///
    /// The frame is 23 bytes: MHDR, AppEUI, DevEUI, DevNonce and MIC. Some
    /// servers allocate a 24 byte buffer for it; the extra byte is never
    /// sent and is not covered by the MIC.
    pub fn encode_join_request_with_factory<F: CryptoFactory>(
        &mut self,
        app_key: &AppKey,
        factory: &F,
    ) -> Result<Vec<u8>> {
        if self.mhdr.mtype != MType::JoinRequest {
            return Err(Error::InvalidMessageType);
        }
        let mut buf = [0u8; JOIN_REQUEST_LEN];
        let mut w = Writer::new(&mut buf);
        self.mhdr.write_to(&mut w)?;
        self.join_request()?.write_to(&mut w)?;
        self.mic = securityhelpers::calculate_join_mic(factory, app_key, w.written());
        w.write_slice(&self.mic.0)?;
        Ok(buf.to_vec())
    }

    /// Checks the MIC of a raw JoinRequest frame against this payload.
    pub fn verify_join_request_mic_with_factory<F: CryptoFactory>(
        &self,
        app_key: &AppKey,
        data: &[u8],
        factory: &F,
    ) -> Result<()> {
        if data.len() < JOIN_REQUEST_LEN {
            return Err(Error::BufferTruncated);
        }
        let expected = securityhelpers::calculate_join_mic(factory, app_key, &data[..JOIN_REQUEST_LEN - MIC_LEN]);
        if expected != self.mic {
            debug!("JoinRequest MIC mismatch");
            return Err(Error::InvalidMic);
        }
        Ok(())
    }

    /// Builds an encrypted JoinAccept frame.
    ///
    /// The MIC is computed over the plain MHDR and body, then body and MIC
    /// go through the AES decrypt primitive block by block. The MHDR is sent
    /// in the clear.
    pub fn encode_join_accept_with_factory<F: CryptoFactory>(
        &mut self,
        app_key: &AppKey,
        factory: &F,
    ) -> Result<Vec<u8>> {
        if self.mhdr.mtype != MType::JoinAccept {
            return Err(Error::InvalidMessageType);
        }
        let join_accept = *self.join_accept()?;
        let len = MHDR_LEN + join_accept.encoded_len() + MIC_LEN;
        let mut buf = [0u8; JOIN_ACCEPT_WITH_CFLIST_LEN];
        let mut w = Writer::new(&mut buf[..len]);
        self.mhdr.write_to(&mut w)?;
        join_accept.write_to(&mut w)?;
        self.mic = securityhelpers::calculate_join_mic(factory, app_key, w.written());
        w.write_slice(&self.mic.0)?;

        securityhelpers::encrypt_join_accept(factory, app_key, &mut buf[MHDR_LEN..len]);
        Ok(buf[..len].to_vec())
    }

    /// Decrypts and parses a JoinAccept frame, then checks its MIC.
    ///
    /// Fails with [`Error::InvalidMic`] when the frame is well formed but was
    /// not sealed with `app_key`.
    pub fn decode_join_accept_with_factory<F: CryptoFactory>(
        app_key: &AppKey,
        data: &[u8],
        factory: &F,
    ) -> Result<Self> {
        let Some((&first, body)) = data.split_first() else {
            return Err(Error::BufferTruncated);
        };
        let mhdr = MHDR::from_byte(first)?;
        if mhdr.mtype != MType::JoinAccept {
            return Err(Error::InvalidMessageType);
        }
        if data.len() < JOIN_ACCEPT_LEN {
            return Err(Error::BufferTruncated);
        }
        if data.len() > JOIN_ACCEPT_WITH_CFLIST_LEN {
            return Err(Error::InvalidSource);
        }

        let mut decrypted = [0u8; JOIN_ACCEPT_WITH_CFLIST_LEN];
        decrypted[0] = first;
        decrypted[MHDR_LEN..data.len()].copy_from_slice(body);
        let padded = MHDR_LEN + body.len().next_multiple_of(16);
        securityhelpers::decrypt_join_accept(factory, app_key, &mut decrypted[MHDR_LEN..padded]);

        let (plain, mic) = decrypted[..data.len()].split_at(data.len() - MIC_LEN);
        let mut r = Reader::new(&plain[MHDR_LEN..]);
        let join_accept = JoinAcceptPayload::read_from(&mut r)?;
        let mic = MIC(mic.try_into().map_err(|_| Error::BufferTruncated)?);

        let expected = securityhelpers::calculate_join_mic(factory, app_key, plain);
        if expected != mic {
            debug!("JoinAccept MIC mismatch");
            return Err(Error::InvalidMic);
        }
        Ok(Self { mhdr, payload: Payload::JoinAccept(join_accept), mic })
    }
}

#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
impl PhyPayload {
    pub fn calculate_mic(&self, nwk_skey: &NwkSKey, data: &[u8]) -> Result<MIC> {
        self.calculate_mic_with_factory(nwk_skey, data, &crate::default_crypto::DefaultFactory)
    }

    pub fn verify_mic(&self, nwk_skey: &NwkSKey, data: &[u8]) -> Result<()> {
        self.verify_mic_with_factory(nwk_skey, data, &crate::default_crypto::DefaultFactory)
    }

    pub fn decrypt(&mut self, nwk_skey: &NwkSKey, app_skey: &AppSKey) -> Result<()> {
        self.decrypt_with_factory(nwk_skey, app_skey, &crate::default_crypto::DefaultFactory)
    }

    pub fn encode_message(&mut self, nwk_skey: &NwkSKey, app_skey: &AppSKey) -> Result<Vec<u8>> {
        self.encode_message_with_factory(nwk_skey, app_skey, &crate::default_crypto::DefaultFactory)
    }

    pub fn encode_join_request(&mut self, app_key: &AppKey) -> Result<Vec<u8>> {
        self.encode_join_request_with_factory(app_key, &crate::default_crypto::DefaultFactory)
    }

    pub fn verify_join_request_mic(&self, app_key: &AppKey, data: &[u8]) -> Result<()> {
        self.verify_join_request_mic_with_factory(app_key, data, &crate::default_crypto::DefaultFactory)
    }

    pub fn encode_join_accept(&mut self, app_key: &AppKey) -> Result<Vec<u8>> {
        self.encode_join_accept_with_factory(app_key, &crate::default_crypto::DefaultFactory)
    }

    pub fn decode_join_accept(app_key: &AppKey, data: &[u8]) -> Result<Self> {
        Self::decode_join_accept_with_factory(app_key, data, &crate::default_crypto::DefaultFactory)
    }
}
