//! MAC header, frame control and frame header.
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::maccommands::Direction;
use crate::maccommandset::MacCommandSet;
use crate::packet_length::phy::mac::fhdr::FOPTS_MAX_LEN;
use crate::types::DevAddr;

/// The only supported major version.
pub const LORAWAN_R1: u8 = 0;

/// MType gives the possible message types of the PhyPayload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MType {
    JoinRequest = 0,
    JoinAccept = 1,
    UnconfirmedDataUp = 2,
    UnconfirmedDataDown = 3,
    ConfirmedDataUp = 4,
    ConfirmedDataDown = 5,
    RFU = 6,
    Proprietary = 7,
}

impl MType {
    /// Maps the three low bits of `bits` to a message type.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => MType::JoinRequest,
            1 => MType::JoinAccept,
            2 => MType::UnconfirmedDataUp,
            3 => MType::UnconfirmedDataDown,
            4 => MType::ConfirmedDataUp,
            5 => MType::ConfirmedDataDown,
            6 => MType::RFU,
            _ => MType::Proprietary,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// True for messages sent by the end device.
    pub const fn uplink(self) -> bool {
        matches!(self, MType::JoinRequest | MType::UnconfirmedDataUp | MType::ConfirmedDataUp)
    }

    pub const fn direction(self) -> Direction {
        if self.uplink() {
            Direction::Uplink
        } else {
            Direction::Downlink
        }
    }

    /// True for the four types carrying a MAC payload.
    pub const fn is_data(self) -> bool {
        matches!(
            self,
            MType::UnconfirmedDataUp
                | MType::UnconfirmedDataDown
                | MType::ConfirmedDataUp
                | MType::ConfirmedDataDown
        )
    }
}

impl core::fmt::Display for MType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            MType::JoinRequest => "JoinRequest",
            MType::JoinAccept => "JoinAccept",
            MType::UnconfirmedDataUp => "UnconfirmedDataUp",
            MType::UnconfirmedDataDown => "UnconfirmedDataDown",
            MType::ConfirmedDataUp => "ConfirmedDataUp",
            MType::ConfirmedDataDown => "ConfirmedDataDown",
            MType::RFU => "RFU",
            MType::Proprietary => "Proprietary",
        };
        f.write_str(name)
    }
}

/// MHDR represents LoRaWAN MHDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MHDR {
    pub mtype: MType,
    pub major: u8,
}

impl MHDR {
    pub const fn new(mtype: MType) -> Self {
        Self { mtype, major: LORAWAN_R1 }
    }

    pub fn from_byte(b: u8) -> Result<Self> {
        let major = b & 0x03;
        if major > LORAWAN_R1 {
            return Err(Error::InvalidLoRaWANVersion);
        }
        Ok(Self { mtype: MType::from_bits(b >> 5), major })
    }

    pub fn to_byte(&self) -> Result<u8> {
        if self.major > LORAWAN_R1 {
            return Err(Error::InvalidLoRaWANVersion);
        }
        Ok(self.mtype.bits() << 5 | self.major)
    }

    pub fn read_from(r: &mut Reader<'_>) -> Result<Self> {
        Self::from_byte(r.read_u8()?)
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.to_byte()?)
    }
}

/// FCtrl represents the FCtrl from FHDR.
///
/// `f_pending` and `class_b` share bit 4: downlinks read it as FPending,
/// uplinks as ClassB. Encoding sets the bit if either flag is set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FCtrl {
    pub adr: bool,
    pub adr_ack_req: bool,
    pub ack: bool,
    pub f_pending: bool,
    pub class_b: bool,
    pub f_opts_len: u8,
}

impl FCtrl {
    const ADR: u8 = 1 << 7;
    const ADR_ACK_REQ: u8 = 1 << 6;
    const ACK: u8 = 1 << 5;
    const F_PENDING: u8 = 1 << 4;

    pub fn from_byte(b: u8, direction: Direction) -> Self {
        let bit4 = b & Self::F_PENDING != 0;
        Self {
            adr: b & Self::ADR != 0,
            adr_ack_req: b & Self::ADR_ACK_REQ != 0,
            ack: b & Self::ACK != 0,
            f_pending: bit4 && !direction.is_uplink(),
            class_b: bit4 && direction.is_uplink(),
            f_opts_len: b & 0x0f,
        }
    }

    pub fn to_byte(&self) -> Result<u8> {
        if usize::from(self.f_opts_len) > FOPTS_MAX_LEN {
            return Err(Error::ParameterOutOfRange);
        }
        let mut b = self.f_opts_len;
        for (set, bit) in [
            (self.adr, Self::ADR),
            (self.adr_ack_req, Self::ADR_ACK_REQ),
            (self.ack, Self::ACK),
            (self.f_pending || self.class_b, Self::F_PENDING),
        ] {
            if set {
                b |= bit;
            }
        }
        Ok(b)
    }
}

/// FHDR represents the frame header of a data message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FHDR {
    pub dev_addr: DevAddr,
    pub fctrl: FCtrl,
    pub fcnt: u16,
    pub fopts: MacCommandSet,
}

impl FHDR {
    pub fn new(direction: Direction) -> Self {
        Self {
            dev_addr: DevAddr::default(),
            fctrl: FCtrl::default(),
            fcnt: 0,
            fopts: MacCommandSet::fopts(direction),
        }
    }

    pub fn direction(&self) -> Direction {
        self.fopts.direction()
    }

    /// Reads a frame header. The reader always ends up past the FOpts bytes
    /// the header declares, even when an unknown command cut the FOpts
    /// decode short.
    pub fn read_from(r: &mut Reader<'_>, direction: Direction) -> Result<Self> {
        let dev_addr = DevAddr::read_from(r)?;
        let fctrl = FCtrl::from_byte(r.read_u8()?, direction);
        let fcnt = r.read_u16_le()?;

        let mut opts = r.sub_reader(usize::from(fctrl.f_opts_len))?;
        let mut fopts = MacCommandSet::new(direction, usize::from(fctrl.f_opts_len));
        match fopts.decode(&mut opts) {
            Ok(()) => {}
            Err(Error::UnknownMacCommand) => {
                debug!("Skipping {} undecoded FOpts bytes", opts.remaining());
            }
            Err(e) => return Err(e),
        }
        fopts.grow_to(FOPTS_MAX_LEN);

        Ok(Self { dev_addr, fctrl, fcnt, fopts })
    }

    /// Writes the header, first setting `fctrl.f_opts_len` to the encoded
    /// length of `fopts`.
    pub fn write_to(&mut self, w: &mut Writer<'_>) -> Result<()> {
        self.fctrl.f_opts_len =
            u8::try_from(self.fopts.encoded_len()).map_err(|_| Error::ParameterOutOfRange)?;
        let fctrl = self.fctrl.to_byte()?;
        self.dev_addr.write_to(w)?;
        w.write_u8(fctrl)?;
        w.write_u16_le(self.fcnt)?;
        self.fopts.write_to(w)
    }
}
