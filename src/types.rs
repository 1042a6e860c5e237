//! Fixed-width LoRaWAN identifiers and the small value types carried inside
//! headers and MAC commands.
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use rand_core::RngCore;

/// IEEE EUI-64 identifier (DevEUI, AppEUI, gateway EUI).
///
/// The octets are kept most significant first, the order used by the string
/// form and by [`EUI::to_u64`]. On the wire the octets are reversed.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EUI(pub [u8; 8]);

impl EUI {
    pub const fn from_u64(v: u64) -> Self {
        EUI(v.to_be_bytes())
    }

    pub const fn to_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// Reads an EUI stored little-endian.
    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        let mut octets: [u8; 8] = r.read_array()?;
        octets.reverse();
        Ok(EUI(octets))
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        let mut octets = self.0;
        octets.reverse();
        w.write_slice(&octets)
    }
}

impl From<[u8; 8]> for EUI {
    fn from(v: [u8; 8]) -> Self {
        EUI(v)
    }
}

impl From<u64> for EUI {
    fn from(v: u64) -> Self {
        EUI::from_u64(v)
    }
}

impl AsRef<[u8]> for EUI {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Largest network id that fits in the 7 NwkID bits.
pub const MAX_NWK_ID: u8 = 0x7F;
/// Largest network address that fits in the 25 NwkAddr bits.
pub const MAX_NWK_ADDR: u32 = 0x01FF_FFFF;

/// 32-bit device address: 7-bit network id followed by a 25-bit network address.
///
/// The fields are public and unchecked; [`DevAddr::write_to`] refuses values
/// that overflow their bit widths.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevAddr {
    pub nwk_id: u8,
    pub nwk_addr: u32,
}

impl DevAddr {
    pub const fn new(nwk_id: u8, nwk_addr: u32) -> Self {
        DevAddr { nwk_id, nwk_addr }
    }

    pub const fn from_u32(v: u32) -> Self {
        DevAddr { nwk_id: ((v >> 25) as u8) & MAX_NWK_ID, nwk_addr: v & MAX_NWK_ADDR }
    }

    /// `NwkID << 25 | NwkAddr`, with both fields masked to their widths.
    pub const fn to_u32(&self) -> u32 {
        (self.nwk_id as u32) << 25 | (self.nwk_addr & MAX_NWK_ADDR)
    }

    /// A random address on network 0.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        DevAddr { nwk_id: 0, nwk_addr: rng.next_u32() & MAX_NWK_ADDR }
    }

    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        r.read_u32_le().map(DevAddr::from_u32)
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        if self.nwk_id > MAX_NWK_ID || self.nwk_addr > MAX_NWK_ADDR {
            return Err(Error::ParameterOutOfRange);
        }
        w.write_u32_le(self.to_u32())
    }
}

impl From<u32> for DevAddr {
    fn from(v: u32) -> Self {
        DevAddr::from_u32(v)
    }
}

/// Size of an IEEE MAC assignment block prefix, in bits.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MASize {
    /// MA-L, 24 bit prefix.
    Large = 24,
    /// MA-M, 28 bit prefix.
    Medium = 28,
    /// MA-S, 36 bit prefix.
    Small = 36,
}

impl MASize {
    /// Number of prefix octets, the last one partially used for MA-M and MA-S.
    pub const fn prefix_len(self) -> usize {
        match self {
            MASize::Large => 3,
            MASize::Medium => 4,
            MASize::Small => 5,
        }
    }

    /// Largest NetID that can be placed in a generated EUI without being
    /// overwritten by the prefix.
    pub const fn max_net_id(self) -> u32 {
        match self {
            MASize::Large => 0x7FFF,
            MASize::Medium => 0x07FF,
            MASize::Small => 0x07,
        }
    }
}

/// An IEEE MAC assignment block used to mint EUIs.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MA {
    prefix: [u8; 5],
    size: MASize,
}

impl MA {
    /// Builds a block from a 3 (MA-L), 4 (MA-M) or 5 (MA-S) byte prefix. For
    /// MA-M and MA-S only the high nibble of the last prefix byte is used.
    pub fn new(prefix: &[u8]) -> Result<Self> {
        let size = match prefix.len() {
            3 => MASize::Large,
            4 => MASize::Medium,
            5 => MASize::Small,
            _ => return Err(Error::InvalidParameterFormat),
        };
        let mut ma = MA { prefix: [0; 5], size };
        ma.prefix[..prefix.len()].copy_from_slice(prefix);
        Ok(ma)
    }

    pub fn size(&self) -> MASize {
        self.size
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix[..self.size.prefix_len()]
    }

    /// Overlays the prefix on `eui`, keeping the bits the prefix does not cover.
    pub fn combine(&self, eui: EUI) -> EUI {
        let mut out = eui.0;
        out[..3].copy_from_slice(&self.prefix[..3]);
        match self.size {
            MASize::Large => {}
            MASize::Medium => out[3] = (self.prefix[3] & 0xF0) | (eui.0[3] & 0x0F),
            MASize::Small => {
                out[3] = self.prefix[3];
                out[4] = (self.prefix[4] & 0xF0) | (eui.0[4] & 0x0F);
            }
        }
        EUI(out)
    }
}

/// Device EUI laid out as `MA | NetID | NwkAddr`, with NwkAddr in the low 25 bits.
///
/// The prefix may overwrite the high bits of the NetID; see [`MASize::max_net_id`].
pub fn new_device_eui(ma: &MA, net_id: u32, nwk_addr: u32) -> EUI {
    ma.combine(EUI::from_u64(u64::from(net_id) << 25 | u64::from(nwk_addr)))
}

/// Application EUI laid out as `MA | NetID | counter`.
pub fn new_application_eui(ma: &MA, net_id: u32, counter: u32) -> EUI {
    ma.combine(EUI::from_u64(u64::from(net_id) << 25 | u64::from(counter)))
}

/// Network EUI laid out as `MA | NetID | 0`.
pub fn new_network_eui(ma: &MA, net_id: u32) -> EUI {
    ma.combine(EUI::from_u64(u64::from(net_id) << 25))
}

/// 24-bit nonce chosen by the network server for every JoinAccept.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppNonce(pub [u8; 3]);

impl AppNonce {
    pub fn random<R: RngCore>(rng: &mut R) -> Result<Self> {
        let mut nonce = [0; 3];
        rng.try_fill_bytes(&mut nonce)?;
        Ok(AppNonce(nonce))
    }
}

impl From<[u8; 3]> for AppNonce {
    fn from(v: [u8; 3]) -> Self {
        AppNonce(v)
    }
}

impl AsRef<[u8]> for AppNonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// RX1 data rate offset and RX2 data rate, as sent in JoinAccept and RXParamSetupReq.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DLSettings {
    pub rx1_dr_offset: u8,
    pub rx2_data_rate: u8,
}

impl DLSettings {
    pub const fn new(rx1_dr_offset: u8, rx2_data_rate: u8) -> Self {
        DLSettings { rx1_dr_offset, rx2_data_rate }
    }

    pub const fn from_byte(b: u8) -> Self {
        DLSettings { rx1_dr_offset: (b >> 4) & 0x07, rx2_data_rate: b & 0x0F }
    }

    /// Packs the settings; out-of-width bits are dropped.
    pub const fn to_byte(&self) -> u8 {
        (self.rx1_dr_offset & 0x07) << 4 | (self.rx2_data_rate & 0x0F)
    }

    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        r.read_u8().map(DLSettings::from_byte)
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.to_byte())
    }
}

/// Minimum and maximum data rate of a channel, one nibble each.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataRateRange {
    pub min_dr: u8,
    pub max_dr: u8,
}

impl DataRateRange {
    pub const fn new(min_dr: u8, max_dr: u8) -> Self {
        DataRateRange { min_dr, max_dr }
    }

    pub const fn from_byte(b: u8) -> Self {
        DataRateRange { min_dr: b & 0x0F, max_dr: b >> 4 }
    }

    pub const fn to_byte(&self) -> u8 {
        (self.max_dr & 0x0F) << 4 | (self.min_dr & 0x0F)
    }
}

/// Channel frequency in units of 100 Hz, 24 bits on the wire.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frequency(pub u32);

impl Frequency {
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Frequency in Hz.
    pub const fn value(&self) -> u32 {
        (self.0 & Self::MAX) * 100
    }

    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        r.read_u24_le().map(Frequency)
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u24_le(self.0 & Self::MAX)
    }
}
