//! MAC command payloads and the two direction-specific command families.
//!
//! The same CID names a different command depending on who sends it (0x03 is
//! `LinkADRReq` from the network but `LinkADRAns` from the device), so uplink
//! and downlink commands are separate enums and the direction is always
//! chosen explicitly.
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::macros::{mac_cmd_zero_len, mac_cmds_enum};
use crate::types::{DLSettings, DataRateRange, Frequency};

/// Who sends a frame or a MAC command.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// End-device to network.
    Uplink,
    /// Network to end-device.
    Downlink,
}

impl Direction {
    pub fn is_uplink(self) -> bool {
        self == Direction::Uplink
    }
}

/// Fixed-layout body of a single MAC command.
pub trait MacCommandPayload: Sized + Default {
    const CID: u8;
    /// Sent by end device or sent by network server.
    const UPLINK: bool;
    /// Length of payload without the CID.
    const LEN: usize;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self>;
    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()>;
}

mac_cmds_enum! {
    /// Commands sent by the network server.
    pub enum DownlinkMacCommand[Downlink] {
        // 1.0
        LinkCheckAns(LinkCheckAnsPayload),
        LinkADRReq(LinkADRReqPayload),
        DutyCycleReq(DutyCycleReqPayload),
        RXParamSetupReq(RXParamSetupReqPayload),
        DevStatusReq(DevStatusReqPayload),
        NewChannelReq(NewChannelReqPayload),
        RXTimingSetupReq(RXTimingSetupReqPayload),
        // class B
        PingSlotInfoAns(PingSlotInfoAnsPayload),
        PingSlotChannelReq(PingSlotChannelReqPayload),
        BeaconTimingAns(BeaconTimingAnsPayload),
        BeaconFreqReq(BeaconFreqReqPayload),
    }
}

mac_cmds_enum! {
    /// Commands sent by the end-device.
    pub enum UplinkMacCommand[Uplink] {
        // 1.0
        LinkCheckReq(LinkCheckReqPayload),
        LinkADRAns(LinkADRAnsPayload),
        DutyCycleAns(DutyCycleAnsPayload),
        RXParamSetupAns(RXParamSetupAnsPayload),
        DevStatusAns(DevStatusAnsPayload),
        NewChannelAns(NewChannelAnsPayload),
        RXTimingSetupAns(RXTimingSetupAnsPayload),
        // class B
        PingSlotInfoReq(PingSlotInfoReqPayload),
        PingSlotFreqAns(PingSlotFreqAnsPayload),
        BeaconTimingReq(BeaconTimingReqPayload),
        BeaconFreqAns(BeaconFreqAnsPayload),
    }
}

/// A command of either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::len_without_is_empty)]
pub enum MacCommand {
    Uplink(UplinkMacCommand),
    Downlink(DownlinkMacCommand),
}

impl MacCommand {
    /// Instantiates the command `cid` of the given direction with zeroed fields.
    pub fn new(direction: Direction, cid: u8) -> Option<Self> {
        match direction {
            Direction::Uplink => UplinkMacCommand::new(cid).map(MacCommand::Uplink),
            Direction::Downlink => DownlinkMacCommand::new(cid).map(MacCommand::Downlink),
        }
    }

    pub fn cid(&self) -> u8 {
        match self {
            MacCommand::Uplink(c) => c.cid(),
            MacCommand::Downlink(c) => c.cid(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MacCommand::Uplink(c) => c.name(),
            MacCommand::Downlink(c) => c.name(),
        }
    }

    /// Encoded length, CID included.
    pub fn len(&self) -> usize {
        match self {
            MacCommand::Uplink(c) => c.len(),
            MacCommand::Downlink(c) => c.len(),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            MacCommand::Uplink(_) => Direction::Uplink,
            MacCommand::Downlink(_) => Direction::Downlink,
        }
    }

    pub fn read_from(&mut self, r: &mut Reader<'_>) -> Result<()> {
        match self {
            MacCommand::Uplink(c) => c.read_from(r),
            MacCommand::Downlink(c) => c.read_from(r),
        }
    }

    pub fn write_to(&self, w: &mut Writer<'_>) -> Result<()> {
        match self {
            MacCommand::Uplink(c) => c.write_to(w),
            MacCommand::Downlink(c) => c.write_to(w),
        }
    }
}

mac_cmd_zero_len! {
    /// LinkCheckReqPayload represents the LinkCheckReq LoRaWAN MACCommand.
    struct LinkCheckReqPayload[cmd=LinkCheckReq, cid=0x02, uplink=true]

    /// DutyCycleAnsPayload represents the DutyCycleAns LoRaWAN MACCommand.
    struct DutyCycleAnsPayload[cmd=DutyCycleAns, cid=0x04, uplink=true]

    /// DevStatusReqPayload represents the DevStatusReq LoRaWAN MACCommand.
    struct DevStatusReqPayload[cmd=DevStatusReq, cid=0x06, uplink=false]

    /// RXTimingSetupAnsPayload represents the RXTimingSetupAns LoRaWAN MACCommand.
    struct RXTimingSetupAnsPayload[cmd=RXTimingSetupAns, cid=0x08, uplink=true]

    /// PingSlotInfoAnsPayload represents the PingSlotInfoAns LoRaWAN MACCommand.
    struct PingSlotInfoAnsPayload[cmd=PingSlotInfoAns, cid=0x10, uplink=false]

    /// BeaconTimingReqPayload represents the BeaconTimingReq LoRaWAN MACCommand.
    struct BeaconTimingReqPayload[cmd=BeaconTimingReq, cid=0x12, uplink=true]

    /// BeaconFreqAnsPayload represents the BeaconFreqAns LoRaWAN MACCommand.
    struct BeaconFreqAnsPayload[cmd=BeaconFreqAns, cid=0x13, uplink=true]
}

macro_rules! create_ack_fn {
    (
        $(#[$outer:meta])*
        $field:ident, $offset:expr
    ) => {
        $(#[$outer])*
        fn $field(b: u8) -> bool {
            b & (0x01 << $offset) != 0
        }
    };
}

fn ack_bit(set: bool, offset: u8) -> u8 {
    u8::from(set) << offset
}

/// LinkCheckAnsPayload represents the LinkCheckAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkCheckAnsPayload {
    /// Link margin in dB of the last LinkCheckReq.
    pub margin: u8,
    /// Number of gateways that received the LinkCheckReq.
    pub gw_cnt: u8,
}

impl MacCommandPayload for LinkCheckAnsPayload {
    const CID: u8 = 0x02;
    const UPLINK: bool = false;
    const LEN: usize = 2;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { margin: r.read_u8()?, gw_cnt: r.read_u8()? })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.margin)?;
        w.write_u8(self.gw_cnt)
    }
}

/// LinkADRReqPayload represents the LinkADRReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkADRReqPayload {
    pub data_rate: u8,
    pub tx_power: u8,
    pub ch_mask: u16,
    pub redundancy: u8,
}

impl LinkADRReqPayload {
    /// Controls how `ch_mask` is interpreted.
    pub fn ch_mask_cntl(&self) -> u8 {
        (self.redundancy >> 4) & 0x07
    }

    /// Number of transmissions for each uplink frame.
    pub fn nb_trans(&self) -> u8 {
        self.redundancy & 0x0F
    }
}

impl MacCommandPayload for LinkADRReqPayload {
    const CID: u8 = 0x03;
    const UPLINK: bool = false;
    const LEN: usize = 4;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        let dr_power = r.read_u8()?;
        Ok(Self {
            data_rate: dr_power >> 4,
            tx_power: dr_power & 0x0F,
            ch_mask: r.read_u16_le()?,
            redundancy: r.read_u8()?,
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.data_rate << 4 | (self.tx_power & 0x0F))?;
        w.write_u16_le(self.ch_mask)?;
        w.write_u8(self.redundancy)
    }
}

/// LinkADRAnsPayload represents the LinkADRAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkADRAnsPayload {
    pub power_ack: bool,
    pub data_rate_ack: bool,
    pub channel_mask_ack: bool,
}

impl LinkADRAnsPayload {
    create_ack_fn!(power_ack, 2);
    create_ack_fn!(data_rate_ack, 1);
    create_ack_fn!(channel_mask_ack, 0);

    /// All three settings were accepted.
    pub fn ack(&self) -> bool {
        self.power_ack && self.data_rate_ack && self.channel_mask_ack
    }
}

impl MacCommandPayload for LinkADRAnsPayload {
    const CID: u8 = 0x03;
    const UPLINK: bool = true;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        let b = r.read_u8()?;
        Ok(Self {
            power_ack: Self::power_ack(b),
            data_rate_ack: Self::data_rate_ack(b),
            channel_mask_ack: Self::channel_mask_ack(b),
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(
            ack_bit(self.power_ack, 2)
                | ack_bit(self.data_rate_ack, 1)
                | ack_bit(self.channel_mask_ack, 0),
        )
    }
}

/// DutyCycleReqPayload represents the DutyCycleReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DutyCycleReqPayload {
    /// The aggregated duty cycle is `1 / 2^max_duty_cycle`.
    pub max_duty_cycle: u8,
}

impl MacCommandPayload for DutyCycleReqPayload {
    const CID: u8 = 0x04;
    const UPLINK: bool = false;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { max_duty_cycle: r.read_u8()? })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.max_duty_cycle)
    }
}

/// RXParamSetupReqPayload represents the RXParamSetupReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RXParamSetupReqPayload {
    pub dl_settings: DLSettings,
    pub frequency: Frequency,
}

impl MacCommandPayload for RXParamSetupReqPayload {
    const CID: u8 = 0x05;
    const UPLINK: bool = false;
    const LEN: usize = 4;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { dl_settings: DLSettings::read_from(r)?, frequency: Frequency::read_from(r)? })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        self.dl_settings.write_to(w)?;
        self.frequency.write_to(w)
    }
}

/// RXParamSetupAnsPayload represents the RXParamSetupAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RXParamSetupAnsPayload {
    pub rx1_dr_offset_ack: bool,
    pub rx2_data_rate_ack: bool,
    pub channel_ack: bool,
}

impl RXParamSetupAnsPayload {
    create_ack_fn!(rx1_dr_offset_ack, 2);
    create_ack_fn!(rx2_data_rate_ack, 1);
    create_ack_fn!(channel_ack, 0);

    pub fn ack(&self) -> bool {
        self.rx1_dr_offset_ack && self.rx2_data_rate_ack && self.channel_ack
    }
}

impl MacCommandPayload for RXParamSetupAnsPayload {
    const CID: u8 = 0x05;
    const UPLINK: bool = true;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        let b = r.read_u8()?;
        Ok(Self {
            rx1_dr_offset_ack: Self::rx1_dr_offset_ack(b),
            rx2_data_rate_ack: Self::rx2_data_rate_ack(b),
            channel_ack: Self::channel_ack(b),
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(
            ack_bit(self.rx1_dr_offset_ack, 2)
                | ack_bit(self.rx2_data_rate_ack, 1)
                | ack_bit(self.channel_ack, 0),
        )
    }
}

/// DevStatusAnsPayload represents the DevStatusAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DevStatusAnsPayload {
    /// 0 is external power, 1..=254 the battery level, 255 unknown.
    pub battery: u8,
    /// Demodulation SNR of the last DevStatusReq, 6-bit signed.
    pub margin: u8,
}

impl DevStatusAnsPayload {
    pub const EXTERNAL_POWER: u8 = 0;
    pub const BATTERY_UNAVAILABLE: u8 = 0xFF;

    /// The margin as a signed value in dB (-32..=31).
    pub fn margin_db(&self) -> i8 {
        ((self.margin << 2) as i8) >> 2
    }
}

impl MacCommandPayload for DevStatusAnsPayload {
    const CID: u8 = 0x06;
    const UPLINK: bool = true;
    const LEN: usize = 2;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { battery: r.read_u8()?, margin: r.read_u8()? & 0x3F })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.battery)?;
        w.write_u8(self.margin & 0x3F)
    }
}

/// NewChannelReqPayload represents the NewChannelReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewChannelReqPayload {
    pub channel_index: u8,
    pub frequency: Frequency,
    pub data_rate_range: DataRateRange,
}

impl MacCommandPayload for NewChannelReqPayload {
    const CID: u8 = 0x07;
    const UPLINK: bool = false;
    const LEN: usize = 5;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            channel_index: r.read_u8()?,
            frequency: Frequency::read_from(r)?,
            data_rate_range: DataRateRange::from_byte(r.read_u8()?),
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.channel_index)?;
        self.frequency.write_to(w)?;
        w.write_u8(self.data_rate_range.to_byte())
    }
}

/// NewChannelAnsPayload represents the NewChannelAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewChannelAnsPayload {
    pub data_rate_range_ok: bool,
    pub channel_frequency_ok: bool,
}

impl NewChannelAnsPayload {
    create_ack_fn!(data_rate_range_ok, 1);
    create_ack_fn!(channel_frequency_ok, 0);
}

impl MacCommandPayload for NewChannelAnsPayload {
    const CID: u8 = 0x07;
    const UPLINK: bool = true;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        let b = r.read_u8()?;
        Ok(Self {
            data_rate_range_ok: Self::data_rate_range_ok(b),
            channel_frequency_ok: Self::channel_frequency_ok(b),
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(ack_bit(self.data_rate_range_ok, 1) | ack_bit(self.channel_frequency_ok, 0))
    }
}

/// RXTimingSetupReqPayload represents the RXTimingSetupReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RXTimingSetupReqPayload {
    /// Delay of RX1 in seconds; 0 means 1.
    pub delay: u8,
}

impl MacCommandPayload for RXTimingSetupReqPayload {
    const CID: u8 = 0x08;
    const UPLINK: bool = false;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { delay: r.read_u8()? & 0x0F })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(self.delay & 0x0F)
    }
}

/// PingSlotInfoReqPayload represents the PingSlotInfoReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PingSlotInfoReqPayload {
    pub periodicity: u8,
    pub data_rate: u8,
}

impl MacCommandPayload for PingSlotInfoReqPayload {
    const CID: u8 = 0x10;
    const UPLINK: bool = true;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        let b = r.read_u8()?;
        Ok(Self { periodicity: (b >> 4) & 0x07, data_rate: b & 0x0F })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8((self.periodicity & 0x07) << 4 | (self.data_rate & 0x0F))
    }
}

/// PingSlotChannelReqPayload represents the PingSlotChannelReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PingSlotChannelReqPayload {
    pub frequency: Frequency,
    pub data_rate_range: DataRateRange,
}

impl MacCommandPayload for PingSlotChannelReqPayload {
    const CID: u8 = 0x11;
    const UPLINK: bool = false;
    const LEN: usize = 4;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            frequency: Frequency::read_from(r)?,
            data_rate_range: DataRateRange::from_byte(r.read_u8()?),
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        self.frequency.write_to(w)?;
        w.write_u8(self.data_rate_range.to_byte())
    }
}

/// PingSlotFreqAnsPayload represents the PingSlotFreqAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PingSlotFreqAnsPayload {
    pub data_rate_range_ok: bool,
    pub channel_frequency_ok: bool,
}

impl PingSlotFreqAnsPayload {
    create_ack_fn!(data_rate_range_ok, 1);
    create_ack_fn!(channel_frequency_ok, 0);
}

impl MacCommandPayload for PingSlotFreqAnsPayload {
    const CID: u8 = 0x11;
    const UPLINK: bool = true;
    const LEN: usize = 1;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        let b = r.read_u8()?;
        Ok(Self {
            data_rate_range_ok: Self::data_rate_range_ok(b),
            channel_frequency_ok: Self::channel_frequency_ok(b),
        })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u8(ack_bit(self.data_rate_range_ok, 1) | ack_bit(self.channel_frequency_ok, 0))
    }
}

/// BeaconTimingAnsPayload represents the BeaconTimingAns LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeaconTimingAnsPayload {
    /// Time to the next beacon in 30 ms steps.
    pub delay: u16,
    pub channel: u8,
}

impl MacCommandPayload for BeaconTimingAnsPayload {
    const CID: u8 = 0x12;
    const UPLINK: bool = false;
    const LEN: usize = 3;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { delay: r.read_u16_le()?, channel: r.read_u8()? })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        w.write_u16_le(self.delay)?;
        w.write_u8(self.channel)
    }
}

/// BeaconFreqReqPayload represents the BeaconFreqReq LoRaWAN MACCommand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeaconFreqReqPayload {
    pub frequency: Frequency,
}

impl MacCommandPayload for BeaconFreqReqPayload {
    const CID: u8 = 0x13;
    const UPLINK: bool = false;
    const LEN: usize = 3;

    fn read_payload(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { frequency: Frequency::read_from(r)? })
    }

    fn write_payload(&self, w: &mut Writer<'_>) -> Result<()> {
        self.frequency.write_to(w)
    }
}
