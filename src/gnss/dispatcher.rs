//! Inbound message dispatcher
//!
//! Receive-side entry points for the two transport channels. Every accepted
//! message feeds the watchdog and the raw log before being decoded; decode
//! failures are logged and dropped without touching device state. Messages
//! arriving while the matching session is not running are discarded, which
//! covers the window between a restart's teardown and the next bring-up.

use crate::gnss::calibration::{self, PersistState};
use crate::gnss::nmea::GGA_SENTENCE;
use crate::gnss::rawlog::RawLogBuffer;
use crate::gnss::ubx::{
    self, CLASS_ESF, CLASS_NAV, ID_ESF_ALG, ID_ESF_INS, ID_ESF_STATUS, ID_NAV_HPPOSLLH,
    ID_NAV_PVT,
};
use crate::log_debug;
use crate::platform::traits::{KeyValueStore, TransportInterface};

use super::device::GnssDevice;

impl<T: TransportInterface, K: KeyValueStore> GnssDevice<T, K> {
    /// Handle one complete frame from the binary channel.
    pub fn on_binary_frame(&mut self, now_us: u64, frame: &[u8], rawlog: &mut RawLogBuffer) {
        if self.binary_session.is_none() {
            return;
        }
        self.watchdog.feed(now_us);
        if self.config().raw_logging {
            rawlog.push(frame);
        }

        if !ubx::verify_frame(frame) {
            log_debug!("gnss{}: dropping corrupt frame", self.profile());
            return;
        }
        let Some(class_id) = ubx::frame_class_id(frame) else {
            return;
        };

        match class_id {
            (CLASS_NAV, ID_NAV_PVT) => match ubx::decode_nav_pvt(frame) {
                Some(pvt) => self.apply_nav_pvt(&pvt),
                None => log_debug!("gnss{}: NAV-PVT length mismatch", self.profile()),
            },
            (CLASS_NAV, ID_NAV_HPPOSLLH) => match ubx::decode_nav_hpposllh(frame) {
                Some(acc) => {
                    self.location.h_accuracy_tmm = acc.horizontal_tmm;
                    self.location.v_accuracy_tmm = acc.vertical_tmm;
                }
                None => log_debug!("gnss{}: NAV-HPPOSLLH length mismatch", self.profile()),
            },
            (CLASS_ESF, ID_ESF_ALG) => match ubx::decode_esf_alg(frame) {
                Some(alg) => self.apply_esf_alg(alg),
                None => log_debug!("gnss{}: ESF-ALG decode failed", self.profile()),
            },
            (CLASS_ESF, ID_ESF_STATUS) => match ubx::decode_esf_status(frame) {
                Some(status) => self.fusion = Some(status),
                None => log_debug!("gnss{}: ESF-STATUS decode failed", self.profile()),
            },
            (CLASS_ESF, ID_ESF_INS) => match ubx::decode_esf_ins(frame) {
                Some(dynamics) => self.dynamics = Some(dynamics),
                None => log_debug!("gnss{}: ESF-INS length mismatch", self.profile()),
            },
            // Anything else on the binary channel is not subscribed to
            _ => {}
        }
    }

    /// Handle one sentence from the text channel.
    pub fn on_text_sentence(&mut self, now_us: u64, sentence: &[u8], rawlog: &mut RawLogBuffer) {
        if self.text_session.is_none() {
            return;
        }
        self.watchdog.feed(now_us);
        if self.config().raw_logging {
            rawlog.push(sentence);
        }

        // Only GGA carries the fix-quality digit; other sentences pass by
        if sentence.len() < 6 || &sentence[1..6] != GGA_SENTENCE {
            return;
        }
        if let Some(fix) = self.fix_tracker.update(sentence) {
            self.location.fix = fix;
        }
    }

    fn apply_nav_pvt(&mut self, pvt: &ubx::NavPvt) {
        if pvt.utc_epoch.is_some() {
            self.location.utc_epoch = pvt.utc_epoch;
        }
        if pvt.fix_ok {
            self.location.longitude_e7 = pvt.longitude_e7;
            self.location.latitude_e7 = pvt.latitude_e7;
            self.location.altitude_mm = pvt.altitude_mm;
            self.location.radius_mm = pvt.radius_mm;
            self.location.speed_mm_s = pvt.speed_mm_s;
            self.location.satellites = pvt.satellites;
            self.flags.location_available = true;
        } else {
            // Position fields keep their last good values; the frame only
            // marks them unusable.
            self.flags.location_available = false;
        }
        self.flags.location_refreshed = true;
    }

    fn apply_esf_alg(&mut self, alg: crate::gnss::types::AlignmentData) {
        if calibration::should_persist(alg.status, self.active_mode, self.flags.persist) {
            self.flags.persist = PersistState::Pending;
        }
        self.flags.is_calibrated = calibration::is_calibrated(alg.status, self.active_mode);
        self.alignment = Some(alg);
    }
}
