//! Frame decoder behaviour through the public API: callback sequences,
//! resumability under arbitrary input segmentation, and the fixed
//! structure codecs.

use milli_h2q::http2::*;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Recording listener
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    FrameHeader(FrameHeader),
    DataStart(FrameHeader),
    DataPayload(Vec<u8>),
    DataEnd,
    HeadersStart(FrameHeader),
    HeadersPriority(PriorityFields),
    HpackFragment(Vec<u8>),
    HeadersEnd,
    Priority(FrameHeader, PriorityFields),
    ContinuationStart(FrameHeader),
    ContinuationEnd,
    PadLength(usize),
    Padding(Vec<u8>),
    RstStream(FrameHeader, u32),
    SettingsStart(FrameHeader),
    Setting(SettingFields),
    SettingsEnd,
    SettingsAck(FrameHeader),
    PushPromiseStart(FrameHeader, PushPromiseFields, usize),
    PushPromiseEnd,
    Ping(FrameHeader, PingFields, bool),
    GoAwayStart(FrameHeader, GoAwayFields),
    GoAwayData(Vec<u8>),
    GoAwayEnd,
    WindowUpdate(FrameHeader, u32),
    AltSvcStart(FrameHeader, usize, usize),
    AltSvcOrigin(Vec<u8>),
    AltSvcValue(Vec<u8>),
    AltSvcEnd,
    UnknownStart(FrameHeader),
    UnknownPayload(Vec<u8>),
    UnknownEnd,
    PaddingTooLong(FrameHeader, usize),
    FrameSizeError(FrameHeader),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    statuses: Vec<DecodeStatus>,
}

impl Recorder {
    /// Adjacent byte events are merged; how a payload is split across
    /// callbacks depends on how the input was split.
    fn push(&mut self, event: Event) {
        use Event::*;
        if let Some(last) = self.events.last_mut() {
            match (last, &event) {
                (DataPayload(a), DataPayload(b))
                | (HpackFragment(a), HpackFragment(b))
                | (Padding(a), Padding(b))
                | (GoAwayData(a), GoAwayData(b))
                | (AltSvcOrigin(a), AltSvcOrigin(b))
                | (AltSvcValue(a), AltSvcValue(b))
                | (UnknownPayload(a), UnknownPayload(b)) => {
                    a.extend_from_slice(b);
                    return;
                }
                _ => {}
            }
        }
        self.events.push(event);
    }
}

impl FrameDecoderListener for Recorder {
    fn on_frame_header(&mut self, header: &FrameHeader) -> bool {
        self.push(Event::FrameHeader(*header));
        true
    }
    fn on_data_start(&mut self, header: &FrameHeader) {
        self.push(Event::DataStart(*header));
    }
    fn on_data_payload(&mut self, data: &[u8]) {
        self.push(Event::DataPayload(data.to_vec()));
    }
    fn on_data_end(&mut self) {
        self.push(Event::DataEnd);
    }
    fn on_headers_start(&mut self, header: &FrameHeader) {
        self.push(Event::HeadersStart(*header));
    }
    fn on_headers_priority(&mut self, priority: &PriorityFields) {
        self.push(Event::HeadersPriority(*priority));
    }
    fn on_hpack_fragment(&mut self, data: &[u8]) {
        self.push(Event::HpackFragment(data.to_vec()));
    }
    fn on_headers_end(&mut self) {
        self.push(Event::HeadersEnd);
    }
    fn on_priority_frame(&mut self, header: &FrameHeader, priority: &PriorityFields) {
        self.push(Event::Priority(*header, *priority));
    }
    fn on_continuation_start(&mut self, header: &FrameHeader) {
        self.push(Event::ContinuationStart(*header));
    }
    fn on_continuation_end(&mut self) {
        self.push(Event::ContinuationEnd);
    }
    fn on_pad_length(&mut self, pad_length: usize) {
        self.push(Event::PadLength(pad_length));
    }
    fn on_padding(&mut self, padding: &[u8]) {
        self.push(Event::Padding(padding.to_vec()));
    }
    fn on_rst_stream(&mut self, header: &FrameHeader, error_code: u32) {
        self.push(Event::RstStream(*header, error_code));
    }
    fn on_settings_start(&mut self, header: &FrameHeader) {
        self.push(Event::SettingsStart(*header));
    }
    fn on_setting(&mut self, setting: &SettingFields) {
        self.push(Event::Setting(*setting));
    }
    fn on_settings_end(&mut self) {
        self.push(Event::SettingsEnd);
    }
    fn on_settings_ack(&mut self, header: &FrameHeader) {
        self.push(Event::SettingsAck(*header));
    }
    fn on_push_promise_start(
        &mut self,
        header: &FrameHeader,
        promise: &PushPromiseFields,
        total_padding_length: usize,
    ) {
        self.push(Event::PushPromiseStart(*header, *promise, total_padding_length));
    }
    fn on_push_promise_end(&mut self) {
        self.push(Event::PushPromiseEnd);
    }
    fn on_ping(&mut self, header: &FrameHeader, ping: &PingFields) {
        self.push(Event::Ping(*header, *ping, false));
    }
    fn on_ping_ack(&mut self, header: &FrameHeader, ping: &PingFields) {
        self.push(Event::Ping(*header, *ping, true));
    }
    fn on_go_away_start(&mut self, header: &FrameHeader, goaway: &GoAwayFields) {
        self.push(Event::GoAwayStart(*header, *goaway));
    }
    fn on_go_away_opaque_data(&mut self, data: &[u8]) {
        self.push(Event::GoAwayData(data.to_vec()));
    }
    fn on_go_away_end(&mut self) {
        self.push(Event::GoAwayEnd);
    }
    fn on_window_update(&mut self, header: &FrameHeader, increment: u32) {
        self.push(Event::WindowUpdate(*header, increment));
    }
    fn on_alt_svc_start(&mut self, header: &FrameHeader, origin_length: usize, value_length: usize) {
        self.push(Event::AltSvcStart(*header, origin_length, value_length));
    }
    fn on_alt_svc_origin_data(&mut self, data: &[u8]) {
        self.push(Event::AltSvcOrigin(data.to_vec()));
    }
    fn on_alt_svc_value_data(&mut self, data: &[u8]) {
        self.push(Event::AltSvcValue(data.to_vec()));
    }
    fn on_alt_svc_end(&mut self) {
        self.push(Event::AltSvcEnd);
    }
    fn on_unknown_start(&mut self, header: &FrameHeader) {
        self.push(Event::UnknownStart(*header));
    }
    fn on_unknown_payload(&mut self, data: &[u8]) {
        self.push(Event::UnknownPayload(data.to_vec()));
    }
    fn on_unknown_end(&mut self) {
        self.push(Event::UnknownEnd);
    }
    fn on_padding_too_long(&mut self, header: &FrameHeader, missing_length: usize) {
        self.push(Event::PaddingTooLong(*header, missing_length));
    }
    fn on_frame_size_error(&mut self, header: &FrameHeader) {
        self.push(Event::FrameSizeError(*header));
    }
}

/// Feeds `input` in chunks whose sizes cycle through `chunk_sizes`, and
/// records every event plus every non-`InProgress` status.
fn decode_chunked(input: &[u8], chunk_sizes: &[usize]) -> Recorder {
    let mut decoder = Http2FrameDecoder::new();
    let mut recorder = Recorder::default();
    let mut rest = input;
    let mut sizes = chunk_sizes.iter().cycle();
    while !rest.is_empty() {
        let size = sizes.next().copied().unwrap_or(rest.len()).clamp(1, rest.len());
        let (chunk, tail) = rest.split_at(size);
        rest = tail;

        let mut db = DecodeBuffer::new(chunk);
        loop {
            let before = db.remaining();
            let status = decoder.decode_frame(&mut db, &mut recorder);
            if status == DecodeStatus::InProgress {
                assert!(db.is_empty(), "InProgress with {} bytes left", db.remaining());
                assert!(before == 0 || db.remaining() < before, "no progress");
            } else {
                recorder.statuses.push(status);
            }
            if db.is_empty() {
                break;
            }
        }
    }
    recorder
}

fn decode_whole(input: &[u8]) -> Recorder {
    decode_chunked(input, &[input.len().max(1)])
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

const PADDED_HELLO: [u8; 19] = hex_literal::hex!(
    "00000a 00 08 00000001"
    "04 68656c6c6f 00000000"
);

#[test]
fn padded_data_any_segmentation() {
    let header = FrameHeader::new(10, FrameType::Data, FLAG_PADDED, 1);
    let expected = vec![
        Event::FrameHeader(header),
        Event::DataStart(header),
        Event::PadLength(4),
        Event::DataPayload(b"hello".to_vec()),
        Event::Padding(vec![0; 4]),
        Event::DataEnd,
    ];
    for size in 1..=PADDED_HELLO.len() {
        let r = decode_chunked(&PADDED_HELLO, &[size]);
        assert_eq!(r.events, expected, "chunk size {size}");
        assert_eq!(r.statuses, vec![DecodeStatus::Done], "chunk size {size}");
    }
    // Split points at every pair of offsets.
    for a in 1..PADDED_HELLO.len() {
        for b in 1..PADDED_HELLO.len() - a {
            let r = decode_chunked(&PADDED_HELLO, &[a, b, PADDED_HELLO.len()]);
            assert_eq!(r.events, expected);
        }
    }
}

#[test]
fn remaining_payload_never_grows() {
    let mut decoder = Http2FrameDecoder::new();
    let mut recorder = Recorder::default();
    let mut last = u32::MAX;
    for (i, byte) in PADDED_HELLO.iter().enumerate() {
        let mut db = DecodeBuffer::new(core::slice::from_ref(byte));
        let status = decoder.decode_frame(&mut db, &mut recorder);
        if i >= 9 {
            let remaining = decoder.remaining_payload();
            assert!(remaining <= last);
            last = remaining;
        }
        if i + 1 == PADDED_HELLO.len() {
            assert_eq!(status, DecodeStatus::Done);
        }
    }
    assert_eq!(decoder.remaining_payload(), 0);
    assert_eq!(recorder.events.last(), Some(&Event::DataEnd));
}

#[test]
fn padding_longer_than_payload() {
    let mut b = FrameBuilder::new();
    b.raw_frame(0x0, FLAG_PADDED, 1, &[9, 1, 2]);
    for size in 1..=b.len() {
        let r = decode_chunked(b.as_slice(), &[size]);
        assert!(matches!(r.events.last(), Some(Event::PaddingTooLong(_, 7))));
        assert_eq!(r.statuses.first(), Some(&DecodeStatus::Error));
        assert!(!r.events.contains(&Event::DataEnd));
    }
}

#[test]
fn settings_length_must_be_multiple_of_six() {
    let mut b = FrameBuilder::new();
    b.raw_frame(0x4, 0, 0, &[0; 7]);
    for size in 1..=b.len() {
        let r = decode_chunked(b.as_slice(), &[size]);
        assert!(matches!(r.events.last(), Some(Event::FrameSizeError(_))));
        assert_eq!(r.statuses.first(), Some(&DecodeStatus::Error));
    }
}

#[test]
fn settings_ack_must_be_empty() {
    let mut b = FrameBuilder::new();
    b.raw_frame(0x4, FLAG_ACK, 0, &[0, 1, 0, 0, 0x10, 0]);
    let r = decode_whole(b.as_slice());
    assert!(matches!(r.events.last(), Some(Event::FrameSizeError(_))));
    assert!(!r.events.iter().any(|e| matches!(e, Event::SettingsAck(_))));
}

#[test]
fn decoding_continues_after_bad_frame() {
    let mut b = FrameBuilder::new();
    b.raw_frame(0x6, 0, 0, &[0; 5]);
    b.window_update(3, 0);
    let r = decode_chunked(b.as_slice(), &[4]);
    assert!(r
        .events
        .iter()
        .any(|e| matches!(e, Event::FrameSizeError(h) if h.frame_type == FrameType::Ping)));
    // A zero increment is not this layer's concern.
    assert!(matches!(r.events.last(), Some(Event::WindowUpdate(h, 0)) if h.stream_id == 3));
}

#[test]
fn oversized_frame_is_skipped() {
    let mut b = FrameBuilder::new();
    b.data(1, &[7; 64], false, None);
    b.ping([1; 8], true);
    let mut decoder = Http2FrameDecoder::new();
    decoder.set_maximum_payload_size(32);
    let mut recorder = Recorder::default();
    let mut db = DecodeBuffer::new(b.as_slice());
    assert_eq!(decoder.decode_frame(&mut db, &mut recorder), DecodeStatus::Error);
    assert!(decoder.is_discarding_payload());
    assert_eq!(decoder.decode_frame(&mut db, &mut recorder), DecodeStatus::Done);
    assert_eq!(decoder.decode_frame(&mut db, &mut recorder), DecodeStatus::Done);
    assert!(db.is_empty());
    assert!(matches!(recorder.events.last(), Some(Event::Ping(_, p, true)) if p.opaque_bytes == [1; 8]));
}

#[test]
fn weight_and_reserved_bit() {
    let mut db = DecodeBuffer::new(&[0xff, 0xff, 0xff, 0xff, 0x00]);
    let p = PriorityFields::decode(&mut db);
    assert_eq!(p.weight, 1);
    assert_eq!(p.stream_dependency, 0x7fff_ffff);
    assert!(p.is_exclusive);

    let mut db = DecodeBuffer::new(&[0, 0, 0, 1, 0xff]);
    assert_eq!(PriorityFields::decode(&mut db).weight, 256);

    let mut db = DecodeBuffer::new(&[0, 0, 0, 0x09, 0, 0xff, 0xff, 0xff, 0xff]);
    let h = FrameHeader::decode(&mut db);
    assert_eq!(h.stream_id, 0x7fff_ffff);
    assert_eq!(h.frame_type, FrameType::Continuation);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn priority() -> impl Strategy<Value = PriorityFields> {
    (0u32..=STREAM_ID_MASK, 1u32..=256, any::<bool>()).prop_map(
        |(stream_dependency, weight, is_exclusive)| PriorityFields {
            stream_dependency,
            weight,
            is_exclusive,
        },
    )
}

fn bytes(max: usize) -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..max)
}

fn frame() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![stream_frame(), control_frame()]
}

fn stream_frame() -> impl Strategy<Value = Vec<u8>> {
    let stream = 1u32..1000;
    prop_oneof![
        (stream.clone(), bytes(48), any::<bool>(), option::of(any::<u8>())).prop_map(
            |(s, payload, end, pad)| {
                let mut b = FrameBuilder::new();
                b.data(s, &payload, end, pad);
                b.finish()
            }
        ),
        (stream.clone(), bytes(48), option::of(priority()), option::of(0u8..32)).prop_map(
            |(s, fragment, priority, pad)| {
                let mut b = FrameBuilder::new();
                b.headers(s, &fragment, FLAG_END_HEADERS, priority.as_ref(), pad);
                b.finish()
            }
        ),
        (stream.clone(), priority()).prop_map(|(s, p)| {
            let mut b = FrameBuilder::new();
            b.priority(s, &p);
            b.finish()
        }),
        (stream.clone(), any::<u32>()).prop_map(|(s, code)| {
            let mut b = FrameBuilder::new();
            b.rst_stream(s, code);
            b.finish()
        }),
        vec((any::<u16>(), any::<u32>()), 0..6).prop_map(|settings| {
            let settings: Vec<_> = settings
                .into_iter()
                .map(|(parameter, value)| SettingFields { parameter, value })
                .collect();
            let mut b = FrameBuilder::new();
            b.settings(&settings);
            b.finish()
        }),
        Just({
            let mut b = FrameBuilder::new();
            b.settings_ack();
            b.finish()
        }),
        (stream.clone(), 1u32..1000, bytes(32), option::of(0u8..16)).prop_map(
            |(s, promised, fragment, pad)| {
                let mut b = FrameBuilder::new();
                b.push_promise(s, promised, &fragment, true, pad);
                b.finish()
            }
        ),
        (any::<[u8; 8]>(), any::<bool>()).prop_map(|(opaque, ack)| {
            let mut b = FrameBuilder::new();
            b.ping(opaque, ack);
            b.finish()
        }),
    ]
}

fn control_frame() -> impl Strategy<Value = Vec<u8>> {
    let stream = 1u32..1000;
    prop_oneof![
        (0u32..1000, any::<u32>(), bytes(24)).prop_map(|(last, code, data)| {
            let mut b = FrameBuilder::new();
            b.goaway(last, code, &data);
            b.finish()
        }),
        (0u32..1000, 0u32..=STREAM_ID_MASK).prop_map(|(s, inc)| {
            let mut b = FrameBuilder::new();
            b.window_update(s, inc);
            b.finish()
        }),
        (0u32..1000, bytes(24), bytes(24)).prop_map(|(s, origin, value)| {
            let mut b = FrameBuilder::new();
            b.altsvc(s, &origin, &value);
            b.finish()
        }),
        (0x0bu8..=0xff, any::<u8>(), 0u32..1000, bytes(24)).prop_map(
            |(t, flags, s, payload)| {
                let mut b = FrameBuilder::new();
                b.raw_frame(t, flags, s, &payload);
                b.finish()
            }
        ),
        // Malformed: padding that does not fit.
        (stream, 1u8..=255, bytes(8)).prop_map(|(s, pad, payload)| {
            let mut body = vec![pad.max(payload.len() as u8 + 1)];
            body.extend_from_slice(&payload);
            let mut b = FrameBuilder::new();
            b.raw_frame(0x0, FLAG_PADDED, s, &body);
            b.finish()
        }),
    ]
}

proptest! {
    #[test]
    fn segmentation_does_not_change_events(
        frames in vec(frame(), 1..6),
        chunk_sizes in vec(1usize..24, 1..8),
    ) {
        let input = frames.concat();
        let whole = decode_whole(&input);
        let chunked = decode_chunked(&input, &chunk_sizes);
        prop_assert_eq!(&whole.events, &chunked.events);
        prop_assert_eq!(&whole.statuses, &chunked.statuses);

        let single = decode_chunked(&input, &[1]);
        prop_assert_eq!(&whole.events, &single.events);
    }

    #[test]
    fn arbitrary_bytes_always_progress(
        input in bytes(256),
        chunk_sizes in vec(1usize..32, 1..4),
    ) {
        // Assertions inside `decode_chunked` check progress.
        let _ = decode_chunked(&input, &chunk_sizes);
    }

    #[test]
    fn priority_round_trip(p in priority()) {
        let mut out = Vec::new();
        p.encode(&mut out);
        prop_assert_eq!(out.len(), PriorityFields::ENCODED_SIZE);
        prop_assert_eq!(PriorityFields::decode(&mut DecodeBuffer::new(&out)), p);
    }

    #[test]
    fn frame_header_round_trip(
        payload_length in 0u32..=MAX_PAYLOAD_LENGTH,
        frame_type in any::<u8>(),
        flags in any::<u8>(),
        stream_id in 0u32..=STREAM_ID_MASK,
    ) {
        let h = FrameHeader::new(payload_length, FrameType::from_u8(frame_type), flags, stream_id);
        let mut out = Vec::new();
        h.encode(&mut out);
        prop_assert_eq!(FrameHeader::decode(&mut DecodeBuffer::new(&out)), h);
    }

    #[test]
    fn goaway_round_trip(last_stream_id in 0u32..=STREAM_ID_MASK, error_code in any::<u32>()) {
        let g = GoAwayFields { last_stream_id, error_code };
        let mut out = Vec::new();
        g.encode(&mut out);
        prop_assert_eq!(GoAwayFields::decode(&mut DecodeBuffer::new(&out)), g);
    }
}
