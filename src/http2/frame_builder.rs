//! Serializes frames into a growable buffer.
//!
//! Every method writes one complete frame with a correct length field,
//! except [`FrameBuilder::append_frame_header`] and
//! [`FrameBuilder::append_bytes`], which write exactly what they are given
//! and so can produce malformed input on purpose.

use alloc::vec::Vec;

use super::constants::*;
use super::structures::*;

#[derive(Debug, Default, Clone)]
pub struct FrameBuilder {
    buf: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn append_frame_header(&mut self, header: &FrameHeader) -> &mut Self {
        header.encode(&mut self.buf);
        self
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    fn frame(&mut self, frame_type: FrameType, flags: u8, stream_id: u32, len: usize) {
        debug_assert!(len <= MAX_PAYLOAD_LENGTH as usize);
        let header = FrameHeader::new(len as u32, frame_type, flags, stream_id);
        header.encode(&mut self.buf);
    }

    fn padding(&mut self, pad_length: Option<u8>) {
        if let Some(pad) = pad_length {
            self.buf.resize(self.buf.len() + usize::from(pad), 0);
        }
    }

    /// DATA, optionally padded with `pad_length` zero bytes.
    pub fn data(
        &mut self,
        stream_id: u32,
        payload: &[u8],
        end_stream: bool,
        pad_length: Option<u8>,
    ) -> &mut Self {
        let mut flags = if end_stream { FLAG_END_STREAM } else { 0 };
        let mut len = payload.len();
        if let Some(pad) = pad_length {
            flags |= FLAG_PADDED;
            len += 1 + usize::from(pad);
        }
        self.frame(FrameType::Data, flags, stream_id, len);
        if let Some(pad) = pad_length {
            self.buf.push(pad);
        }
        self.buf.extend_from_slice(payload);
        self.padding(pad_length);
        self
    }

    /// HEADERS. `flags` may carry END_STREAM and END_HEADERS; PADDED and
    /// PRIORITY are derived from the optional arguments.
    pub fn headers(
        &mut self,
        stream_id: u32,
        fragment: &[u8],
        flags: u8,
        priority: Option<&PriorityFields>,
        pad_length: Option<u8>,
    ) -> &mut Self {
        let mut flags = flags & (FLAG_END_STREAM | FLAG_END_HEADERS);
        let mut len = fragment.len();
        if let Some(pad) = pad_length {
            flags |= FLAG_PADDED;
            len += 1 + usize::from(pad);
        }
        if priority.is_some() {
            flags |= FLAG_PRIORITY;
            len += PriorityFields::ENCODED_SIZE;
        }
        self.frame(FrameType::Headers, flags, stream_id, len);
        if let Some(pad) = pad_length {
            self.buf.push(pad);
        }
        if let Some(p) = priority {
            p.encode(&mut self.buf);
        }
        self.buf.extend_from_slice(fragment);
        self.padding(pad_length);
        self
    }

    pub fn priority(&mut self, stream_id: u32, priority: &PriorityFields) -> &mut Self {
        self.frame(FrameType::Priority, 0, stream_id, PriorityFields::ENCODED_SIZE);
        priority.encode(&mut self.buf);
        self
    }

    pub fn rst_stream(&mut self, stream_id: u32, error_code: u32) -> &mut Self {
        self.frame(FrameType::RstStream, 0, stream_id, RstStreamFields::ENCODED_SIZE);
        RstStreamFields { error_code }.encode(&mut self.buf);
        self
    }

    pub fn settings(&mut self, settings: &[SettingFields]) -> &mut Self {
        self.frame(
            FrameType::Settings,
            0,
            0,
            settings.len() * SettingFields::ENCODED_SIZE,
        );
        for s in settings {
            s.encode(&mut self.buf);
        }
        self
    }

    pub fn settings_ack(&mut self) -> &mut Self {
        self.frame(FrameType::Settings, FLAG_ACK, 0, 0);
        self
    }

    pub fn push_promise(
        &mut self,
        stream_id: u32,
        promised_stream_id: u32,
        fragment: &[u8],
        end_headers: bool,
        pad_length: Option<u8>,
    ) -> &mut Self {
        let mut flags = if end_headers { FLAG_END_HEADERS } else { 0 };
        let mut len = PushPromiseFields::ENCODED_SIZE + fragment.len();
        if let Some(pad) = pad_length {
            flags |= FLAG_PADDED;
            len += 1 + usize::from(pad);
        }
        self.frame(FrameType::PushPromise, flags, stream_id, len);
        if let Some(pad) = pad_length {
            self.buf.push(pad);
        }
        PushPromiseFields { promised_stream_id }.encode(&mut self.buf);
        self.buf.extend_from_slice(fragment);
        self.padding(pad_length);
        self
    }

    pub fn ping(&mut self, opaque_bytes: [u8; 8], ack: bool) -> &mut Self {
        let flags = if ack { FLAG_ACK } else { 0 };
        self.frame(FrameType::Ping, flags, 0, PingFields::ENCODED_SIZE);
        PingFields { opaque_bytes }.encode(&mut self.buf);
        self
    }

    pub fn goaway(&mut self, last_stream_id: u32, error_code: u32, debug_data: &[u8]) -> &mut Self {
        self.frame(
            FrameType::GoAway,
            0,
            0,
            GoAwayFields::ENCODED_SIZE + debug_data.len(),
        );
        GoAwayFields { last_stream_id, error_code }.encode(&mut self.buf);
        self.buf.extend_from_slice(debug_data);
        self
    }

    pub fn window_update(&mut self, stream_id: u32, increment: u32) -> &mut Self {
        self.frame(FrameType::WindowUpdate, 0, stream_id, WindowUpdateFields::ENCODED_SIZE);
        WindowUpdateFields { window_size_increment: increment }.encode(&mut self.buf);
        self
    }

    pub fn continuation(&mut self, stream_id: u32, fragment: &[u8], end_headers: bool) -> &mut Self {
        let flags = if end_headers { FLAG_END_HEADERS } else { 0 };
        self.frame(FrameType::Continuation, flags, stream_id, fragment.len());
        self.buf.extend_from_slice(fragment);
        self
    }

    pub fn altsvc(&mut self, stream_id: u32, origin: &[u8], value: &[u8]) -> &mut Self {
        self.frame(
            FrameType::AltSvc,
            0,
            stream_id,
            AltSvcFields::ENCODED_SIZE + origin.len() + value.len(),
        );
        AltSvcFields { origin_length: origin.len() as u16 }.encode(&mut self.buf);
        self.buf.extend_from_slice(origin);
        self.buf.extend_from_slice(value);
        self
    }

    /// A frame of any type, flags untouched.
    pub fn raw_frame(&mut self, frame_type: u8, flags: u8, stream_id: u32, payload: &[u8]) -> &mut Self {
        self.frame(FrameType::from_u8(frame_type), flags, stream_id, payload.len());
        self.buf.extend_from_slice(payload);
        self
    }
}
