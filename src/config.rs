//! Decoder limits, adjustable from code or from received SETTINGS.

use crate::error::Error;
use crate::headers::DEFAULT_MAX_HEADER_LIST_SIZE;
use crate::hpack::{constants::DEFAULT_HEADER_TABLE_SIZE_SETTING, DEFAULT_MAX_DECODE_BUFFER_SIZE};
use crate::http2::{SettingsParameter, DEFAULT_MAX_FRAME_SIZE, MAX_PAYLOAD_LENGTH};
use crate::log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Frames with a longer payload are rejected.
    pub max_frame_payload_size: u32,
    /// SETTINGS_HEADER_TABLE_SIZE acknowledged for the HPACK decoder.
    pub header_table_size: u32,
    /// Largest HPACK fragment (and string literal) accepted.
    pub max_decode_buffer_size: usize,
    pub max_header_list_size: usize,
    /// Return from `process_input` after each complete frame.
    pub process_single_input_frame: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_frame_payload_size: DEFAULT_MAX_FRAME_SIZE,
            header_table_size: DEFAULT_HEADER_TABLE_SIZE_SETTING,
            max_decode_buffer_size: DEFAULT_MAX_DECODE_BUFFER_SIZE,
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
            process_single_input_frame: false,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_frame_payload_size(mut self, size: u32) -> Self {
        self.max_frame_payload_size = size;
        self
    }

    pub fn with_header_table_size(mut self, size: u32) -> Self {
        self.header_table_size = size;
        self
    }

    pub fn with_max_decode_buffer_size(mut self, size: usize) -> Self {
        self.max_decode_buffer_size = size;
        self
    }

    pub fn with_max_header_list_size(mut self, size: usize) -> Self {
        self.max_header_list_size = size;
        self
    }

    pub fn with_process_single_input_frame(mut self, single: bool) -> Self {
        self.process_single_input_frame = single;
        self
    }

    /// Applies a setting we advertised, validated per RFC 9113 §6.5.2.
    /// Settings that do not limit decoding are checked but not stored;
    /// unknown identifiers are ignored.
    pub fn apply(&mut self, id: u16, value: u32) -> Result<(), Error> {
        let invalid = Error::InvalidSetting { id, value };
        match SettingsParameter::from_id(id) {
            Some(SettingsParameter::HeaderTableSize) => self.header_table_size = value,
            Some(SettingsParameter::EnablePush) => {
                if value > 1 {
                    return Err(invalid);
                }
            }
            Some(SettingsParameter::MaxConcurrentStreams) => {}
            Some(SettingsParameter::InitialWindowSize) => {
                if value > 0x7fff_ffff {
                    return Err(invalid);
                }
            }
            Some(SettingsParameter::MaxFrameSize) => {
                if !(DEFAULT_MAX_FRAME_SIZE..=MAX_PAYLOAD_LENGTH).contains(&value) {
                    return Err(invalid);
                }
                self.max_frame_payload_size = value;
            }
            Some(SettingsParameter::MaxHeaderListSize) => {
                self.max_header_list_size = value as usize;
            }
            None => {
                debug!("ignoring unknown setting {id:#x}={value}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DecoderConfig::default();
        assert_eq!(c.max_frame_payload_size, 16384);
        assert_eq!(c.header_table_size, 4096);
        assert_eq!(c.max_decode_buffer_size, 32 * 1024);
        assert_eq!(c.max_header_list_size, 16 * 1024);
        assert!(!c.process_single_input_frame);
    }

    #[test]
    fn builder() {
        let c = DecoderConfig::default()
            .with_max_frame_payload_size(1 << 20)
            .with_process_single_input_frame(true);
        assert_eq!(c.max_frame_payload_size, 1 << 20);
        assert!(c.process_single_input_frame);
    }

    #[test]
    fn apply_validates() {
        let mut c = DecoderConfig::default();
        c.apply(0x5, 32768).unwrap();
        assert_eq!(c.max_frame_payload_size, 32768);
        assert_eq!(c.apply(0x5, 100), Err(Error::InvalidSetting { id: 5, value: 100 }));
        assert_eq!(c.apply(0x5, 1 << 24), Err(Error::InvalidSetting { id: 5, value: 1 << 24 }));
        assert!(c.apply(0x2, 2).is_err());
        assert!(c.apply(0x4, 0x8000_0000).is_err());
        c.apply(0x1, 0).unwrap();
        assert_eq!(c.header_table_size, 0);
        c.apply(0x6, 100).unwrap();
        assert_eq!(c.max_header_list_size, 100);
        c.apply(0xff, 7).unwrap();
    }

    #[test]
    fn unknown_setting_leaves_config_untouched() {
        let mut c = DecoderConfig::default();
        assert_eq!(c.apply(0x99, 12345), Ok(()));
        assert_eq!(c, DecoderConfig::default());
    }
}
