use core::str::FromStr;

use lorawan_codec::default_crypto::DefaultFactory;
use lorawan_codec::header::MType;
use lorawan_codec::join::JoinAcceptPayload;
use lorawan_codec::keys::*;
use lorawan_codec::maccommands::*;
use lorawan_codec::securityhelpers;
use lorawan_codec::types::*;
use lorawan_codec::{Error, Payload, PhyPayload};

fn data_payload() -> Vec<u8> {
    vec![
        0x40, 0x04, 0x03, 0x02, 0x01, 0x80, 0x01, 0x00, 0x01, 0xa6, 0x94, 0x64, 0x26, 0x15,
        0xd6, 0xc3, 0xb5, 0x82,
    ]
}

fn join_request_payload() -> Vec<u8> {
    vec![
        0x00, 0x04, 0x03, 0x02, 0x01, 0x04, 0x03, 0x02, 0x01, 0x05, 0x04, 0x03, 0x02, 0x05,
        0x04, 0x03, 0x02, 0x2d, 0x10, 0x6a, 0x99, 0x0e, 0x12,
    ]
}

fn pleased_to_meet_you() -> Vec<u8> {
    hex::decode(
        "600403020180b300074246fd81549fe303b33d9cdf523c70c10806e302df686073676d88d0bd5578d454cb4553",
    )
    .unwrap()
}

const STANLEY: &[u8] = b"Pleased to meet you Mr Stanley!!";
const LIVINGSTONE: [u8; 25] = [
    77, 114, 76, 105, 118, 105, 110, 103, 115, 116, 111, 110, 101, 32, 73, 32, 80, 114, 101, 115,
    117, 109, 101, 255, 25,
];
const LIVINGSTONE_ENCRYPTED: [u8; 25] = [
    64, 238, 230, 130, 88, 184, 42, 7, 126, 23, 44, 234, 243, 24, 7, 221, 192, 181, 108, 89, 132,
    44, 165, 42, 244,
];

fn livingstone_keys() -> (NwkSKey, AppSKey) {
    (
        NwkSKey::from_str("3C5E 5C9F 469E EF3E 02CC D4FF 9531 31BA").unwrap(),
        AppSKey::from_str("E001 2A22 25B8 585E DCEC 7042 4798 C510").unwrap(),
    )
}

fn livingstone_message(frm_payload: &[u8]) -> PhyPayload {
    let mut phy = PhyPayload::new(MType::UnconfirmedDataUp);
    let mac = phy.mac_payload_mut().unwrap();
    mac.fhdr.dev_addr = DevAddr::new(0, 0x1E672E6);
    mac.fhdr.fctrl.adr = true;
    mac.fhdr.fctrl.adr_ack_req = true;
    mac.fhdr.fcnt = 24;
    mac.fport = 12;
    mac.frm_payload = frm_payload.to_vec();
    phy
}

#[test]
fn test_data_payload_headers() {
    let phy = PhyPayload::decode(&data_payload()).unwrap();
    assert_eq!(phy.mtype(), MType::UnconfirmedDataUp);
    assert_eq!(phy.mhdr.major, 0);
    let mac = phy.mac_payload().unwrap();
    assert_eq!(mac.fhdr.dev_addr.to_u32(), 0x01020304);
    assert_eq!(mac.fhdr.fcnt, 1);
    assert!(mac.fhdr.fctrl.adr);
    assert!(!mac.fhdr.fctrl.ack);
    assert!(mac.fhdr.fopts.is_empty());
    assert_eq!(mac.fport, 1);
    assert_eq!(phy.mic, MIC([0xd6, 0xc3, 0xb5, 0x82]));
}

#[test]
fn test_data_payload_mic_and_decryption() {
    let data = data_payload();
    let mut phy = PhyPayload::decode(&data).unwrap();
    let nwk_skey = NwkSKey::from([2; 16]);
    let app_skey = AppSKey::from([1; 16]);
    phy.verify_mic(&nwk_skey, &data).unwrap();
    assert_eq!(phy.verify_mic(&NwkSKey::from([1; 16]), &data), Err(Error::InvalidMic));

    phy.decrypt(&nwk_skey, &app_skey).unwrap();
    assert_eq!(phy.mac_payload().unwrap().frm_payload, b"hello");

    // sealing the plain text again gives back the received frame
    assert_eq!(phy.encode_message(&nwk_skey, &app_skey).unwrap(), data);
}

#[test]
fn test_decrypt_pleased_to_meet_you() {
    let data = pleased_to_meet_you();
    let mut phy = PhyPayload::decode(&data).unwrap();
    assert_eq!(phy.mtype(), MType::UnconfirmedDataDown);
    {
        let mac = phy.mac_payload().unwrap();
        assert_eq!(mac.fhdr.dev_addr, DevAddr::new(0, 0x1020304));
        assert_eq!(mac.fhdr.fcnt, 0xB3);
        assert_eq!(mac.fport, 7);
    }
    assert_eq!(phy.mic.to_u32(), 0x5345CB54);

    let key = AES128::from_str("0102 0304 0506 0708 090A 0B0C 0D0E 0F10").unwrap();
    let nwk_skey = NwkSKey::from(key);
    let app_skey = AppSKey::from(key);
    phy.verify_mic(&nwk_skey, &data).unwrap();
    phy.decrypt(&nwk_skey, &app_skey).unwrap();
    assert_eq!(phy.mac_payload().unwrap().frm_payload, STANLEY);
}

#[test]
fn test_encrypt_pleased_to_meet_you() {
    let key = AES128::from_str("0102 0304 0506 0708 090A 0B0C 0D0E 0F10").unwrap();
    let mut phy = PhyPayload::new(MType::UnconfirmedDataDown);
    let mac = phy.mac_payload_mut().unwrap();
    mac.fhdr.dev_addr = DevAddr::new(0, 0x1020304);
    mac.fhdr.fctrl.adr = true;
    mac.fhdr.fcnt = 179;
    mac.fport = 7;
    mac.frm_payload = STANLEY.to_vec();

    let bytes = phy.encode_message(&NwkSKey::from(key), &AppSKey::from(key)).unwrap();
    assert_eq!(phy.mic.to_u32(), 0x5345CB54);
    assert_eq!(bytes, pleased_to_meet_you());
}

#[test]
fn test_livingstone_decryption() {
    let (nwk_skey, app_skey) = livingstone_keys();
    let mut phy = livingstone_message(&LIVINGSTONE_ENCRYPTED);
    phy.decrypt(&nwk_skey, &app_skey).unwrap();
    assert_eq!(phy.mac_payload().unwrap().frm_payload, LIVINGSTONE);
}

#[test]
fn test_livingstone_encryption_and_mic() {
    let (nwk_skey, app_skey) = livingstone_keys();
    let mut phy = livingstone_message(&LIVINGSTONE);
    let bytes = phy.encode_message(&nwk_skey, &app_skey).unwrap();
    assert_eq!(phy.mac_payload().unwrap().frm_payload, LIVINGSTONE_ENCRYPTED);
    assert_eq!(phy.mic.to_u32(), 0x22CBE65F);

    assert_eq!(bytes[..9], [0x40, 0xe6, 0x72, 0xe6, 0x01, 0xc0, 0x18, 0x00, 0x0c]);
    let decoded = PhyPayload::decode(&bytes).unwrap();
    decoded.verify_mic(&nwk_skey, &bytes).unwrap();
    assert_eq!(decoded, phy);
}

#[test]
fn test_confirmed_uplink_sample() {
    let data = hex::decode("80e672e6018001000ba8126fc1358a281d").unwrap();
    let phy = PhyPayload::decode(&data).unwrap();
    assert_eq!(phy.mtype(), MType::ConfirmedDataUp);
    let mac = phy.mac_payload().unwrap();
    assert_eq!(mac.fhdr.dev_addr, DevAddr::new(0, 0x01E672E6));
    assert!(mac.fhdr.fctrl.adr);
    assert_eq!(mac.fhdr.fcnt, 1);
    assert_eq!(mac.fport, 0x0b);
    assert_eq!(mac.frm_payload, [0xa8, 0x12, 0x6f, 0xc1]);
}

#[test]
fn test_frame_without_port() {
    let data = hex::decode("60e672e601a008005836ace0").unwrap();
    let phy = PhyPayload::decode(&data).unwrap();
    let mac = phy.mac_payload().unwrap();
    assert_eq!(mac.fhdr.dev_addr.nwk_addr, 0x01E672E6);
    assert!(mac.fhdr.fctrl.adr && mac.fhdr.fctrl.ack);
    assert_eq!(mac.fhdr.fcnt, 8);
    assert_eq!(mac.fport, 0);
    assert!(mac.frm_payload.is_empty());
    assert!(mac.mac_commands.is_empty());
}

#[test]
fn test_frame_with_fopts() {
    let data = hex::decode("60e672e601a50a000321ff0000f8ddb7ab").unwrap();
    let mut phy = PhyPayload::decode(&data).unwrap();
    let mac = phy.mac_payload().unwrap();
    assert_eq!(mac.fhdr.fcnt, 10);
    assert_eq!(mac.fhdr.fctrl.f_opts_len, 5);
    let Some(MacCommand::Downlink(DownlinkMacCommand::LinkADRReq(req))) = mac.fhdr.fopts.get(0x03)
    else {
        panic!("no LinkADRReq in {:?}", mac.fhdr.fopts);
    };
    assert_eq!(req.data_rate, 2);
    assert_eq!(req.tx_power, 1);
    assert_eq!(req.ch_mask, 0x00ff);
    assert_eq!(req.redundancy, 0);

    assert_eq!(phy.marshal_binary().unwrap(), data);
}

#[test]
fn test_join_request_vectors() {
    let app_key = AppKey::from_str("0102030405060708 0102030405060708").unwrap();
    for (frame, dev_nonce) in [
        ("000807060504030201bebaefbebebaefbe115db08d7c07", 0x115d),
        ("000807060504030201bebaefbebebaefbe8a3ec38c32e7", 0x8a3e),
        ("000807060504030201bebaefbebebaefbe56ade72491b7", 0x56ad),
        ("000807060504030201bebaefbebebaefbe7ec4fb490502", 0x7ec4),
    ] {
        let data = hex::decode(frame).unwrap();
        let phy = PhyPayload::decode(&data).unwrap();
        let req = phy.join_request().unwrap();
        assert_eq!(req.app_eui.to_u64(), 0x0102030405060708);
        assert_eq!(req.dev_eui, EUI::from([0xbe, 0xef, 0xba, 0xbe, 0xbe, 0xef, 0xba, 0xbe]));
        assert_eq!(req.dev_nonce, dev_nonce);
        phy.verify_join_request_mic(&app_key, &data).unwrap();

        let mut rebuilt = PhyPayload::new(MType::JoinRequest);
        rebuilt.payload = Payload::JoinRequest(*req);
        assert_eq!(rebuilt.encode_join_request(&app_key).unwrap(), data);
    }
}

#[test]
fn test_join_request_mic() {
    let data = join_request_payload();
    let phy = PhyPayload::decode(&data).unwrap();
    let req = phy.join_request().unwrap();
    assert_eq!(req.app_eui.to_u64(), 0x0102030401020304);
    assert_eq!(req.dev_eui.to_u64(), 0x0203040502030405);
    assert_eq!(req.dev_nonce, 0x2d10);
    phy.verify_join_request_mic(&AppKey::from([1; 16]), &data).unwrap();
}

#[test]
fn test_join_accept_mic_vector() {
    let ja = JoinAcceptPayload {
        app_nonce: AppNonce([1, 2, 3]),
        net_id: 0x123456,
        dev_addr: DevAddr::new(1, 2),
        dl_settings: DLSettings::new(1, 1),
        rx_delay: 1,
        cf_list: None,
    };
    let mut buf = [0u8; 16];
    ja.write_to(&mut lorawan_codec::cursor::Writer::new(&mut buf)).unwrap();
    let app_key = AppKey::from_str("0102030405060708 0102030405060708").unwrap();
    let mic = securityhelpers::calculate_join_mic(&DefaultFactory, &app_key, &buf);
    assert_eq!(mic.to_u32(), 0xf2511d15);
}

#[test]
fn test_join_accept_keys_derivation_round_trip() {
    let app_key = AppKey::from([9; 16]);
    let mut phy = PhyPayload::new(MType::JoinAccept);
    let mut ja = JoinAcceptPayload {
        net_id: 0x010203,
        dev_addr: DevAddr::new(0x13, 0x1234),
        rx_delay: 1,
        ..Default::default()
    };
    ja.generate_app_nonce(&mut rand::thread_rng()).unwrap();
    phy.payload = Payload::JoinAccept(ja);

    let bytes = phy.encode_join_accept(&app_key).unwrap();
    let decoded = PhyPayload::decode_join_accept(&app_key, &bytes).unwrap();
    let received = decoded.join_accept().unwrap();
    assert_eq!(*received, ja);

    let nwk = nwk_skey_from_nonces(&app_key, &received.app_nonce, received.net_id, 0x1234);
    let app = app_skey_from_nonces(&app_key, &received.app_nonce, received.net_id, 0x1234);
    assert_eq!(nwk, nwk_skey_from_nonces(&app_key, &ja.app_nonce, 0x010203, 0x1234));
    assert_ne!(nwk.inner(), app.inner());
}

#[test]
fn test_proprietary_is_rejected() {
    let mut data = join_request_payload();
    data[0] = 0xe0;
    assert_eq!(PhyPayload::decode(&data), Err(Error::InvalidMessageType));
}

#[test]
fn test_wrong_payload_for_mtype() {
    let mut phy = PhyPayload::new(MType::JoinRequest);
    phy.payload = Payload::JoinAccept(JoinAcceptPayload::default());
    assert_eq!(phy.encode_join_request(&AppKey::from([1; 16])), Err(Error::NilError));
    let mut phy = PhyPayload::new(MType::ConfirmedDataDown);
    assert_eq!(phy.encode_join_accept(&AppKey::from([1; 16])), Err(Error::InvalidMessageType));
}
