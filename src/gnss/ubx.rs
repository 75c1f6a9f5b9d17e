//! UBX binary protocol codec
//!
//! Stateless encoder and fixed-offset decoders for the receiver's binary
//! protocol. Frames are `sync(2) class(1) id(1) len(2,LE) payload ck(2)`
//! with an 8-bit Fletcher checksum over class..payload. All documented
//! offsets below are frame offsets (header included) and must be reproduced
//! byte-exactly for interoperability with the physical receiver.
//!
//! Decoders only read; the dispatcher guarantees the buffer length before
//! calling in, and a decoder returns `None` rather than raising any
//! FSM-level error.

use crate::gnss::types::{
    AlignmentData, AlignmentErrors, AlignmentStatus, AlignmentValues, DynamicsValidity,
    FusionMode, FusionSensor, FusionStatus, GnssError, SensorFaults, VehicleDynamics,
    MAX_ESF_SENSORS,
};
use heapless::Vec;

/// First sync byte
pub const SYNC_1: u8 = 0xB5;
/// Second sync byte
pub const SYNC_2: u8 = 0x62;

pub const CLASS_NAV: u8 = 0x01;
pub const CLASS_CFG: u8 = 0x06;
pub const CLASS_ESF: u8 = 0x10;

pub const ID_NAV_PVT: u8 = 0x07;
pub const ID_NAV_HPPOSLLH: u8 = 0x14;
pub const ID_ESF_STATUS: u8 = 0x10;
pub const ID_ESF_ALG: u8 = 0x14;
pub const ID_ESF_INS: u8 = 0x15;
pub const ID_CFG_VALSET: u8 = 0x8A;
pub const ID_CFG_RST: u8 = 0x04;

/// Full frame lengths, header and checksum included
pub const NAV_PVT_FRAME_LEN: usize = 100;
pub const NAV_HPPOSLLH_FRAME_LEN: usize = 44;
pub const ESF_ALG_FRAME_LEN: usize = 24;
pub const ESF_STATUS_MIN_FRAME_LEN: usize = 24;
pub const ESF_INS_FRAME_LEN: usize = 44;

/// Largest outbound frame the encoder will build
pub const MAX_FRAME_LEN: usize = 128;

/// Configuration database keys (receiver interface description values)
pub mod keys {
    /// High-precision NMEA output
    pub const NMEA_HIGHPREC: u32 = 0x1093_0006;
    /// NAV-PVT output rate on I2C
    pub const MSGOUT_NAV_PVT_I2C: u32 = 0x2091_0006;
    /// NAV-HPPOSLLH output rate on I2C
    pub const MSGOUT_NAV_HPPOSLLH_I2C: u32 = 0x2091_0033;
    /// ESF-ALG output rate on I2C
    pub const MSGOUT_ESF_ALG_I2C: u32 = 0x2091_010F;
    /// ESF-STATUS output rate on I2C
    pub const MSGOUT_ESF_STATUS_I2C: u32 = 0x2091_0105;
    /// ESF-INS output rate on I2C
    pub const MSGOUT_ESF_INS_I2C: u32 = 0x2091_0114;
    /// Automatic IMU mount alignment enable
    pub const SFIMU_AUTO_MNTALG_ENA: u32 = 0x1006_0027;
    /// IMU mount yaw angle, centidegrees
    pub const SFIMU_IMU_MNTALG_YAW: u32 = 0x4006_002D;
    /// IMU mount pitch angle, centidegrees
    pub const SFIMU_IMU_MNTALG_PITCH: u32 = 0x3006_002E;
    /// IMU mount roll angle, centidegrees
    pub const SFIMU_IMU_MNTALG_ROLL: u32 = 0x3006_002F;
    /// Sensor fusion enable
    pub const SFCORE_USE_SF: u32 = 0x1008_0001;
    /// Correction source selection for decrypted corrections
    pub const SPARTN_USE_SOURCE: u32 = 0x20F7_0001;
    /// Dynamic platform model
    pub const NAVSPG_DYNMODEL: u32 = 0x2011_0021;
}

/// Calculate UBX checksum (8-bit Fletcher algorithm)
pub fn checksum(data: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;

    for &byte in data {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }

    (ck_a, ck_b)
}

/// Verify sync bytes, declared length, and checksum of a complete frame
pub fn verify_frame(frame: &[u8]) -> bool {
    if frame.len() < 8 || frame[0] != SYNC_1 || frame[1] != SYNC_2 {
        return false;
    }
    let payload_len = u16_le(frame, 4) as usize;
    if frame.len() != payload_len + 8 {
        return false;
    }
    let (ck_a, ck_b) = checksum(&frame[2..frame.len() - 2]);
    ck_a == frame[frame.len() - 2] && ck_b == frame[frame.len() - 1]
}

/// Class and id of a frame, if long enough to carry them
pub fn frame_class_id(frame: &[u8]) -> Option<(u8, u8)> {
    if frame.len() < 4 {
        return None;
    }
    Some((frame[2], frame[3]))
}

/// Build a complete frame around a raw payload
pub fn encode_frame(
    class: u8,
    id: u8,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_LEN>, GnssError> {
    if payload.len() + 8 > MAX_FRAME_LEN {
        return Err(GnssError::FrameTooLarge);
    }

    let mut frame: Vec<u8, MAX_FRAME_LEN> = Vec::new();
    let len = payload.len() as u16;
    let header = [
        SYNC_1,
        SYNC_2,
        class,
        id,
        (len & 0xFF) as u8,
        (len >> 8) as u8,
    ];
    frame
        .extend_from_slice(&header)
        .map_err(|_| GnssError::FrameTooLarge)?;
    frame
        .extend_from_slice(payload)
        .map_err(|_| GnssError::FrameTooLarge)?;

    let (ck_a, ck_b) = checksum(&frame[2..]);
    frame.push(ck_a).map_err(|_| GnssError::FrameTooLarge)?;
    frame.push(ck_b).map_err(|_| GnssError::FrameTooLarge)?;

    Ok(frame)
}

/// One key/value item for a configuration-set command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgItem {
    /// Configuration database key
    pub key: u32,
    /// Value; only the width encoded in the key's size field is sent
    pub value: u64,
}

impl CfgItem {
    /// Value width in bytes, taken from bits 28..30 of the key
    fn value_len(&self) -> usize {
        match (self.key >> 28) & 0x07 {
            // Size codes 1 and 2 are both one storage byte (bit and u8)
            1 | 2 => 1,
            3 => 2,
            4 => 4,
            _ => 8,
        }
    }
}

/// Build a CFG-VALSET frame applying items to the RAM layer
pub fn encode_cfg_valset(items: &[CfgItem]) -> Result<Vec<u8, MAX_FRAME_LEN>, GnssError> {
    let mut payload: Vec<u8, { MAX_FRAME_LEN - 8 }> = Vec::new();

    // version 0, RAM layer, reserved
    payload
        .extend_from_slice(&[0x00, 0x01, 0x00, 0x00])
        .map_err(|_| GnssError::FrameTooLarge)?;

    for item in items {
        payload
            .extend_from_slice(&item.key.to_le_bytes())
            .map_err(|_| GnssError::FrameTooLarge)?;
        let bytes = item.value.to_le_bytes();
        payload
            .extend_from_slice(&bytes[..item.value_len()])
            .map_err(|_| GnssError::FrameTooLarge)?;
    }

    encode_frame(CLASS_CFG, ID_CFG_VALSET, &payload)
}

/// Build the CFG-RST controlled software reset command (hot start)
pub fn encode_reset() -> Result<Vec<u8, MAX_FRAME_LEN>, GnssError> {
    // navBbrMask 0x0000 (hot start), resetMode 0x01 (controlled SW reset)
    encode_frame(CLASS_CFG, ID_CFG_RST, &[0x00, 0x00, 0x01, 0x00])
}

/// Decoded NAV-PVT fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavPvt {
    /// UTC time as Unix epoch seconds, when the date/time validity bits held
    pub utc_epoch: Option<i64>,
    /// gnssFixOK flag: position usable
    pub fix_ok: bool,
    /// Satellites used
    pub satellites: u8,
    /// Longitude, degrees x 1e7
    pub longitude_e7: i32,
    /// Latitude, degrees x 1e7
    pub latitude_e7: i32,
    /// Height above mean sea level in mm, only on a full 3D fix
    pub altitude_mm: Option<i32>,
    /// Horizontal accuracy in mm
    pub radius_mm: u32,
    /// Ground speed in mm/s
    pub speed_mm_s: i32,
}

/// Decode a NAV-PVT frame.
///
/// Field offsets (frame): year u16 @10, month @12, day @13, hour @14,
/// min @15, sec @16, validity @17, fixType @26, flags @27, numSV @29,
/// lon @30, lat @34, hMSL @42, hAcc @46, gSpeed @66.
pub fn decode_nav_pvt(frame: &[u8]) -> Option<NavPvt> {
    if frame.len() < NAV_PVT_FRAME_LEN || frame_class_id(frame)? != (CLASS_NAV, ID_NAV_PVT) {
        return None;
    }

    // validDate and validTime together gate the timestamp
    let time_valid = frame[17] & 0x03 == 0x03;
    let utc_epoch = if time_valid {
        Some(utc_to_epoch(
            u16_le(frame, 10),
            frame[12],
            frame[13],
            frame[14],
            frame[15],
            frame[16],
        ))
    } else {
        None
    };

    let fix_type = frame[26];
    Some(NavPvt {
        utc_epoch,
        fix_ok: frame[27] & 0x01 != 0,
        satellites: frame[29],
        longitude_e7: i32_le(frame, 30),
        latitude_e7: i32_le(frame, 34),
        // hMSL is meaningful only for a 3D fix
        altitude_mm: (fix_type == 3).then(|| i32_le(frame, 42)),
        radius_mm: u32_le(frame, 46),
        speed_mm_s: i32_le(frame, 66),
    })
}

/// High-precision accuracy estimates from NAV-HPPOSLLH, 0.1 mm units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighPrecisionAccuracy {
    pub horizontal_tmm: u32,
    pub vertical_tmm: u32,
}

/// Decode a NAV-HPPOSLLH frame (hAcc @34, vAcc @38)
pub fn decode_nav_hpposllh(frame: &[u8]) -> Option<HighPrecisionAccuracy> {
    if frame.len() < NAV_HPPOSLLH_FRAME_LEN
        || frame_class_id(frame)? != (CLASS_NAV, ID_NAV_HPPOSLLH)
    {
        return None;
    }

    Some(HighPrecisionAccuracy {
        horizontal_tmm: u32_le(frame, 34),
        vertical_tmm: u32_le(frame, 38),
    })
}

/// Decode an ESF-ALG frame (flags @11, error @12, yaw @14, pitch @18, roll @20)
pub fn decode_esf_alg(frame: &[u8]) -> Option<AlignmentData> {
    if frame.len() < ESF_ALG_FRAME_LEN || frame_class_id(frame)? != (CLASS_ESF, ID_ESF_ALG) {
        return None;
    }

    let flags = frame[11];
    let status = AlignmentStatus::from_bits((flags >> 1) & 0x07)?;

    Some(AlignmentData {
        auto_enabled: flags & 0x01 != 0,
        status,
        errors: AlignmentErrors::from_bits_truncate(frame[12]),
        angles: AlignmentValues {
            yaw_cd: u32_le(frame, 14),
            pitch_cd: i16_le(frame, 18),
            roll_cd: i16_le(frame, 20),
        },
    })
}

/// Decode an ESF-STATUS frame (fusionMode @18, numSens @21, 4-byte blocks @22)
pub fn decode_esf_status(frame: &[u8]) -> Option<FusionStatus> {
    if frame.len() < ESF_STATUS_MIN_FRAME_LEN
        || frame_class_id(frame)? != (CLASS_ESF, ID_ESF_STATUS)
    {
        return None;
    }

    let num_sens = frame[21] as usize;
    if frame.len() < ESF_STATUS_MIN_FRAME_LEN + 4 * num_sens {
        return None;
    }

    let mode = FusionMode::from_byte(frame[18])?;
    let mut sensors = heapless::Vec::new();
    for i in 0..num_sens.min(MAX_ESF_SENSORS) {
        let base = 22 + 4 * i;
        let status1 = frame[base];
        let _ = sensors.push(FusionSensor {
            sensor_type: status1 & 0x3F,
            used: status1 & 0x40 != 0,
            ready: status1 & 0x80 != 0,
            calib_status: frame[base + 1] & 0x03,
            freq_hz: frame[base + 2],
            faults: SensorFaults::from_bits_truncate(frame[base + 3] & 0x0F),
        });
    }

    Some(FusionStatus { mode, sensors })
}

/// Decode an ESF-INS frame (bitfield @6, angular rates @18/22/26, accel @30/34/38)
pub fn decode_esf_ins(frame: &[u8]) -> Option<VehicleDynamics> {
    if frame.len() < ESF_INS_FRAME_LEN || frame_class_id(frame)? != (CLASS_ESF, ID_ESF_INS) {
        return None;
    }

    let bitfield = u32_le(frame, 6);
    Some(VehicleDynamics {
        validity: DynamicsValidity::from_bits_truncate(((bitfield >> 8) & 0x3F) as u8),
        ang_rate_mdeg_s: [i32_le(frame, 18), i32_le(frame, 22), i32_le(frame, 26)],
        accel_cm_s2: [i32_le(frame, 30), i32_le(frame, 34), i32_le(frame, 38)],
    })
}

/// Convert a UTC calendar date/time to Unix epoch seconds.
///
/// Civil-calendar day count, valid for the full Gregorian range the
/// receiver can report.
pub fn utc_to_epoch(year: u16, month: u8, day: u8, hour: u8, min: u8, sec: u8) -> i64 {
    let y = year as i64 - if month <= 2 { 1 } else { 0 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    let days = era * 146_097 + doe - 719_468;

    days * 86_400 + hour as i64 * 3_600 + min as i64 * 60 + sec as i64
}

fn u16_le(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn i16_le(b: &[u8], off: usize) -> i16 {
    i16::from_le_bytes([b[off], b[off + 1]])
}

fn u32_le(b: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

fn i32_le(b: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_vector() {
        // CFG-MSG enabling GGA: class 0x06, id 0x01, len 3, payload F0 00 01
        let data = [0x06, 0x01, 0x03, 0x00, 0xF0, 0x00, 0x01];
        let (ck_a, ck_b) = checksum(&data);
        assert_eq!(ck_a, 0xFB);
        assert_eq!(ck_b, 0x10);
    }

    #[test]
    fn test_encode_frame_layout() {
        let frame = encode_frame(0x06, 0x01, &[0xF0, 0x00, 0x01]).unwrap();
        assert_eq!(
            frame.as_slice(),
            &[0xB5, 0x62, 0x06, 0x01, 0x03, 0x00, 0xF0, 0x00, 0x01, 0xFB, 0x10]
        );
        assert!(verify_frame(&frame));
    }

    #[test]
    fn test_encode_frame_too_large() {
        let payload = [0u8; MAX_FRAME_LEN];
        assert_eq!(
            encode_frame(0x06, 0x8A, &payload),
            Err(GnssError::FrameTooLarge)
        );
    }

    #[test]
    fn test_verify_frame_rejects_corruption() {
        let mut frame = encode_reset().unwrap();
        assert!(verify_frame(&frame));
        frame[6] ^= 0xFF;
        assert!(!verify_frame(&frame));
    }

    #[test]
    fn test_encode_reset_bytes() {
        let frame = encode_reset().unwrap();
        assert_eq!(frame[2], CLASS_CFG);
        assert_eq!(frame[3], ID_CFG_RST);
        // Hot start, controlled software reset
        assert_eq!(&frame[6..10], &[0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_cfg_valset_value_widths() {
        let frame = encode_cfg_valset(&[
            CfgItem {
                key: keys::SFCORE_USE_SF,
                value: 1,
            },
            CfgItem {
                key: keys::SFIMU_IMU_MNTALG_PITCH,
                value: 0x1234,
            },
            CfgItem {
                key: keys::SFIMU_IMU_MNTALG_YAW,
                value: 0xDEAD_BEEF,
            },
        ])
        .unwrap();

        assert_eq!(frame[2], CLASS_CFG);
        assert_eq!(frame[3], ID_CFG_VALSET);
        // version 0, RAM layer
        assert_eq!(&frame[6..10], &[0x00, 0x01, 0x00, 0x00]);

        // 1-byte value after the first key
        assert_eq!(&frame[10..14], &keys::SFCORE_USE_SF.to_le_bytes());
        assert_eq!(frame[14], 0x01);
        // 2-byte value after the second key
        assert_eq!(&frame[15..19], &keys::SFIMU_IMU_MNTALG_PITCH.to_le_bytes());
        assert_eq!(&frame[19..21], &[0x34, 0x12]);
        // 4-byte value after the third key
        assert_eq!(&frame[21..25], &keys::SFIMU_IMU_MNTALG_YAW.to_le_bytes());
        assert_eq!(&frame[25..29], &[0xEF, 0xBE, 0xAD, 0xDE]);

        assert!(verify_frame(&frame));
    }

    #[test]
    fn test_utc_to_epoch() {
        assert_eq!(utc_to_epoch(1970, 1, 1, 0, 0, 0), 0);
        assert_eq!(utc_to_epoch(2024, 1, 1, 0, 0, 0), 1_704_067_200);
        // Leap day
        assert_eq!(utc_to_epoch(2024, 2, 29, 12, 30, 15), 1_709_209_815);
    }

    fn build_nav_pvt(validity: u8, fix_type: u8, flags: u8) -> std::vec::Vec<u8> {
        let mut payload = [0u8; 92];
        payload[4..6].copy_from_slice(&2024u16.to_le_bytes());
        payload[6] = 6; // month
        payload[7] = 15; // day
        payload[8] = 10; // hour
        payload[9] = 30; // min
        payload[10] = 45; // sec
        payload[11] = validity;
        payload[20] = fix_type;
        payload[21] = flags;
        payload[23] = 12; // numSV
        payload[24..28].copy_from_slice(&236_569_273i32.to_le_bytes()); // lon
        payload[28..32].copy_from_slice(&379_813_755i32.to_le_bytes()); // lat
        payload[36..40].copy_from_slice(&152_400i32.to_le_bytes()); // hMSL
        payload[40..44].copy_from_slice(&1_250u32.to_le_bytes()); // hAcc
        payload[60..64].copy_from_slice(&13_890i32.to_le_bytes()); // gSpeed
        encode_frame(CLASS_NAV, ID_NAV_PVT, &payload)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_decode_nav_pvt_full_fix() {
        let frame = build_nav_pvt(0x07, 3, 0x01);
        let pvt = decode_nav_pvt(&frame).unwrap();

        assert_eq!(pvt.utc_epoch, Some(utc_to_epoch(2024, 6, 15, 10, 30, 45)));
        assert!(pvt.fix_ok);
        assert_eq!(pvt.satellites, 12);
        assert_eq!(pvt.longitude_e7, 236_569_273);
        assert_eq!(pvt.latitude_e7, 379_813_755);
        assert_eq!(pvt.altitude_mm, Some(152_400));
        assert_eq!(pvt.radius_mm, 1_250);
        assert_eq!(pvt.speed_mm_s, 13_890);
    }

    #[test]
    fn test_decode_nav_pvt_time_invalid() {
        // validDate set but validTime clear
        let frame = build_nav_pvt(0x01, 3, 0x01);
        let pvt = decode_nav_pvt(&frame).unwrap();
        assert_eq!(pvt.utc_epoch, None);
    }

    #[test]
    fn test_decode_nav_pvt_no_3d_fix_drops_altitude() {
        let frame = build_nav_pvt(0x07, 2, 0x00);
        let pvt = decode_nav_pvt(&frame).unwrap();
        assert_eq!(pvt.altitude_mm, None);
        assert!(!pvt.fix_ok);
    }

    #[test]
    fn test_decode_nav_pvt_rejects_short_buffer() {
        let frame = build_nav_pvt(0x07, 3, 0x01);
        assert!(decode_nav_pvt(&frame[..50]).is_none());
    }

    #[test]
    fn test_decode_nav_hpposllh() {
        let mut payload = [0u8; 36];
        payload[28..32].copy_from_slice(&4_900u32.to_le_bytes());
        payload[32..36].copy_from_slice(&7_200u32.to_le_bytes());
        let frame = encode_frame(CLASS_NAV, ID_NAV_HPPOSLLH, &payload).unwrap();

        let acc = decode_nav_hpposllh(&frame).unwrap();
        assert_eq!(acc.horizontal_tmm, 4_900);
        assert_eq!(acc.vertical_tmm, 7_200);
    }

    #[test]
    fn test_decode_esf_alg() {
        let mut payload = [0u8; 16];
        // auto on, status = coarse alignment (3)
        payload[5] = 0x01 | (3 << 1);
        payload[6] = 0x02; // yaw error
        payload[8..12].copy_from_slice(&27_000u32.to_le_bytes());
        payload[12..14].copy_from_slice(&(-500i16).to_le_bytes());
        payload[14..16].copy_from_slice(&250i16.to_le_bytes());
        let frame = encode_frame(CLASS_ESF, ID_ESF_ALG, &payload).unwrap();

        let alg = decode_esf_alg(&frame).unwrap();
        assert!(alg.auto_enabled);
        assert_eq!(alg.status, AlignmentStatus::CoarseAlignment);
        assert_eq!(alg.errors, AlignmentErrors::YAW);
        assert_eq!(alg.angles.yaw_cd, 27_000);
        assert_eq!(alg.angles.pitch_cd, -500);
        assert_eq!(alg.angles.roll_cd, 250);
    }

    #[test]
    fn test_decode_esf_status_sensors() {
        let mut payload = [0u8; 16 + 8];
        payload[12] = 1; // fusion mode: active
        payload[15] = 2; // two sensors
                         // sensor 0: type 16, used, ready, calibrated, 100 Hz, no faults
        payload[16] = 16 | 0x40 | 0x80;
        payload[17] = 0x03;
        payload[18] = 100;
        payload[19] = 0x00;
        // sensor 1: type 5, not used, noisy
        payload[20] = 5;
        payload[21] = 0x01;
        payload[22] = 10;
        payload[23] = 0x08;
        let frame = encode_frame(CLASS_ESF, ID_ESF_STATUS, &payload).unwrap();

        let status = decode_esf_status(&frame).unwrap();
        assert_eq!(status.mode, FusionMode::Active);
        assert_eq!(status.sensors.len(), 2);
        assert_eq!(status.sensors[0].sensor_type, 16);
        assert!(status.sensors[0].used);
        assert!(status.sensors[0].ready);
        assert_eq!(status.sensors[0].calib_status, 3);
        assert_eq!(status.sensors[1].faults, SensorFaults::NOISY_MEASUREMENT);
    }

    #[test]
    fn test_decode_esf_status_length_mismatch() {
        let mut payload = [0u8; 16];
        payload[12] = 1;
        payload[15] = 3; // claims three sensors but carries none
        let frame = encode_frame(CLASS_ESF, ID_ESF_STATUS, &payload).unwrap();
        assert!(decode_esf_status(&frame).is_none());
    }

    #[test]
    fn test_decode_esf_ins() {
        let mut payload = [0u8; 36];
        // version 1, all six validity bits
        payload[0..4].copy_from_slice(&(0x3F00u32 | 0x01).to_le_bytes());
        payload[12..16].copy_from_slice(&1_000i32.to_le_bytes());
        payload[16..20].copy_from_slice(&(-2_000i32).to_le_bytes());
        payload[20..24].copy_from_slice(&3_000i32.to_le_bytes());
        payload[24..28].copy_from_slice(&(-10i32).to_le_bytes());
        payload[28..32].copy_from_slice(&20i32.to_le_bytes());
        payload[32..36].copy_from_slice(&981i32.to_le_bytes());
        let frame = encode_frame(CLASS_ESF, ID_ESF_INS, &payload).unwrap();

        let dyn_data = decode_esf_ins(&frame).unwrap();
        assert_eq!(dyn_data.validity, DynamicsValidity::all());
        assert_eq!(dyn_data.ang_rate_mdeg_s, [1_000, -2_000, 3_000]);
        assert_eq!(dyn_data.accel_cm_s2, [-10, 20, 981]);
    }
}
