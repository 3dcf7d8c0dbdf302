//! HPACK against the RFC 7541 Appendix C examples, and encoder/decoder
//! table agreement.

use hex_literal::hex;
use milli_h2q::hpack::{HpackDecoder, HpackEncoder};
use milli_h2q::HpackDecodeError;
use proptest::prelude::*;

type Fields = Vec<(Vec<u8>, Vec<u8>)>;

fn decode_block(decoder: &mut HpackDecoder, block: &[u8]) -> Result<Fields, HpackDecodeError> {
    let mut fields = Fields::new();
    decoder.start_decoding_block()?;
    decoder.decode_fragment(block, &mut |name, value| {
        fields.push((name.to_vec(), value.to_vec()))
    })?;
    decoder.end_decoding_block()?;
    Ok(fields)
}

fn owned(expected: &[(&str, &str)]) -> Fields {
    expected
        .iter()
        .map(|(n, v)| (n.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect()
}

/// Dynamic table as (name, value) pairs, newest first, plus its size.
fn dynamic_table(decoder: &HpackDecoder) -> (Fields, usize) {
    let table = decoder.header_table();
    let entries = table
        .dynamic_entries()
        .map(|e| (e.name().to_vec(), e.value().to_vec()))
        .collect();
    (entries, table.size())
}

const AUTHORITY: (&str, &str) = (":authority", "www.example.com");

fn check_request_sequence(blocks: [&[u8]; 3]) {
    let mut decoder = HpackDecoder::new();

    let first = decode_block(&mut decoder, blocks[0]).unwrap();
    assert_eq!(
        first,
        owned(&[(":method", "GET"), (":scheme", "http"), (":path", "/"), AUTHORITY])
    );
    assert_eq!(dynamic_table(&decoder), (owned(&[AUTHORITY]), 57));

    let second = decode_block(&mut decoder, blocks[1]).unwrap();
    assert_eq!(
        second,
        owned(&[
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            AUTHORITY,
            ("cache-control", "no-cache"),
        ])
    );
    assert_eq!(
        dynamic_table(&decoder),
        (owned(&[("cache-control", "no-cache"), AUTHORITY]), 110)
    );

    let third = decode_block(&mut decoder, blocks[2]).unwrap();
    assert_eq!(
        third,
        owned(&[
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/index.html"),
            AUTHORITY,
            ("custom-key", "custom-value"),
        ])
    );
    assert_eq!(
        dynamic_table(&decoder),
        (
            owned(&[
                ("custom-key", "custom-value"),
                ("cache-control", "no-cache"),
                AUTHORITY
            ]),
            164
        )
    );
}

#[test]
fn rfc7541_c3_requests_without_huffman() {
    check_request_sequence([
        &hex!("828684410f7777772e6578616d706c652e636f6d"),
        &hex!("828684be58086e6f2d6361636865"),
        &hex!("828785bf400a637573746f6d2d6b65790c637573746f6d2d76616c7565"),
    ]);
}

#[test]
fn rfc7541_c4_requests_with_huffman() {
    check_request_sequence([
        &hex!("828684418cf1e3c2e5f23a6ba0ab90f4ff"),
        &hex!("828684be5886a8eb10649cbf"),
        &hex!("828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf"),
    ]);
}

const DATE_21: &str = "Mon, 21 Oct 2013 20:13:21 GMT";
const DATE_22: &str = "Mon, 21 Oct 2013 20:13:22 GMT";
const LOCATION: (&str, &str) = ("location", "https://www.example.com");
const COOKIE: &str = "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1";

/// The response examples use a 256-byte table. The acknowledged setting
/// obliges the peer to open its first block with a matching size update.
fn check_response_sequence(blocks: [&[u8]; 3]) {
    const SIZE_UPDATE_256: [u8; 3] = hex!("3fe101");
    let mut decoder = HpackDecoder::new();
    decoder.apply_header_table_size_setting(256);

    let first_block = [&SIZE_UPDATE_256[..], blocks[0]].concat();
    let first = decode_block(&mut decoder, &first_block).unwrap();
    assert_eq!(
        first,
        owned(&[
            (":status", "302"),
            ("cache-control", "private"),
            ("date", DATE_21),
            LOCATION
        ])
    );
    assert_eq!(decoder.header_table().max_size(), 256);
    assert_eq!(
        dynamic_table(&decoder),
        (
            owned(&[
                LOCATION,
                ("date", DATE_21),
                ("cache-control", "private"),
                (":status", "302")
            ]),
            222
        )
    );

    let second = decode_block(&mut decoder, blocks[1]).unwrap();
    assert_eq!(
        second,
        owned(&[
            (":status", "307"),
            ("cache-control", "private"),
            ("date", DATE_21),
            LOCATION
        ])
    );
    assert_eq!(
        dynamic_table(&decoder),
        (
            owned(&[
                (":status", "307"),
                LOCATION,
                ("date", DATE_21),
                ("cache-control", "private")
            ]),
            222
        )
    );

    let third = decode_block(&mut decoder, blocks[2]).unwrap();
    assert_eq!(
        third,
        owned(&[
            (":status", "200"),
            ("cache-control", "private"),
            ("date", DATE_22),
            LOCATION,
            ("content-encoding", "gzip"),
            ("set-cookie", COOKIE),
        ])
    );
    assert_eq!(
        dynamic_table(&decoder),
        (
            owned(&[
                ("set-cookie", COOKIE),
                ("content-encoding", "gzip"),
                ("date", DATE_22)
            ]),
            215
        )
    );
}

#[test]
fn rfc7541_c5_responses_without_huffman() {
    check_response_sequence([
        &hex!(
            "4803333032580770726976617465611d"
            "4d6f6e2c203231204f637420323031332032303a31333a323120474d54"
            "6e1768747470733a2f2f7777772e6578616d706c652e636f6d"
        ),
        &hex!("4803333037c1c0bf"),
        &hex!(
            "88c1611d4d6f6e2c203231204f637420323031332032303a31333a323220474d54"
            "c05a04677a697077"
            "38666f6f3d4153444a4b48514b425a584f5157454f50495541585157454f49553b"
            "206d61782d6167653d333630303b2076657273696f6e3d31"
        ),
    ]);
}

#[test]
fn rfc7541_c6_responses_with_huffman() {
    check_response_sequence([
        &hex!(
            "488264025885aec3771a4b6196d07abe941054d444a8200595040b8166e082a62d1bff"
            "6e919d29ad171863c78f0b97c8e9ae82ae43d3"
        ),
        &hex!("4883640effc1c0bf"),
        &hex!(
            "88c16196d07abe941054d444a8200595040b8166e084a62d1bffc05a839bd9ab"
            "77ad94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f"
            "9587316065c003ed4ee5b1063d5007"
        ),
    ]);
}

#[test]
fn pseudo_headers_are_encoded_first() {
    let mut encoder = HpackEncoder::new();
    let block = encoder.encode_header_set(&[(b"accept", b"*/*"), (b":path", b"/x")]);
    let decoded = decode_block(&mut HpackDecoder::new(), &block).unwrap();
    assert_eq!(decoded, owned(&[(":path", "/x"), ("accept", "*/*")]));
}

#[test]
fn block_split_at_every_offset() {
    let block = hex!("828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf");
    let mut reference = HpackDecoder::new();
    decode_block(&mut reference, &hex!("828684418cf1e3c2e5f23a6ba0ab90f4ff")).unwrap();
    decode_block(&mut reference, &hex!("828684be5886a8eb10649cbf")).unwrap();
    let expected = decode_block(&mut reference, &block).unwrap();

    for split in 0..=block.len() {
        let mut decoder = HpackDecoder::new();
        decode_block(&mut decoder, &hex!("828684418cf1e3c2e5f23a6ba0ab90f4ff")).unwrap();
        decode_block(&mut decoder, &hex!("828684be5886a8eb10649cbf")).unwrap();

        let mut fields = Fields::new();
        let mut collect = |n: &[u8], v: &[u8]| fields.push((n.to_vec(), v.to_vec()));
        decoder.start_decoding_block().unwrap();
        decoder.decode_fragment(&block[..split], &mut collect).unwrap();
        decoder.decode_fragment(&block[split..], &mut collect).unwrap();
        decoder.end_decoding_block().unwrap();
        assert_eq!(fields, expected, "split at {split}");
    }
}

#[test]
fn truncated_block_fails() {
    let mut decoder = HpackDecoder::new();
    decoder.start_decoding_block().unwrap();
    decoder
        .decode_fragment(&hex!("410f7777"), &mut |_, _| {})
        .unwrap();
    assert_eq!(
        decoder.end_decoding_block(),
        Err(HpackDecodeError::TruncatedBlock)
    );
    assert_eq!(
        decoder.start_decoding_block(),
        Err(HpackDecodeError::DecoderFailed)
    );
}

// ---------------------------------------------------------------------------
// Encoder and decoder stay in step
// ---------------------------------------------------------------------------

fn header_set() -> impl Strategy<Value = Vec<(String, String)>> {
    let name = prop::sample::select(vec![
        ":path",
        ":authority",
        "accept",
        "user-agent",
        "x-request-id",
        "custom-key",
    ]);
    prop::collection::vec((name.prop_map(String::from), "[a-z0-9/ .=-]{0,24}"), 0..8)
}

proptest! {
    #[test]
    fn encoder_output_decodes_to_input(
        sets in prop::collection::vec(header_set(), 1..6),
        table_size in prop::option::of(0usize..512),
    ) {
        let mut encoder = HpackEncoder::new();
        let mut decoder = HpackDecoder::new();
        if let Some(size) = table_size {
            encoder.apply_header_table_size_setting(size);
            decoder.apply_header_table_size_setting(size);
        }
        for set in &sets {
            let fields: Vec<(&[u8], &[u8])> = set
                .iter()
                .map(|(n, v)| (n.as_bytes(), v.as_bytes()))
                .collect();
            let block = encoder.encode_header_set(&fields);
            let decoded = decode_block(&mut decoder, &block).unwrap();
            // Pseudo-headers go out first; relative order is otherwise kept.
            let (pseudo, regular): (Vec<_>, Vec<_>) =
                set.iter().partition(|(n, _)| n.starts_with(':'));
            let expected: Fields = pseudo
                .into_iter()
                .chain(regular)
                .map(|(n, v)| (n.as_bytes().to_vec(), v.as_bytes().to_vec()))
                .collect();
            prop_assert_eq!(decoded, expected);
            prop_assert_eq!(encoder.header_table().size(), decoder.header_table().size());
            prop_assert_eq!(encoder.header_table().max_size(), decoder.header_table().max_size());
        }
    }

    #[test]
    fn arbitrary_blocks_never_panic(block in prop::collection::vec(any::<u8>(), 0..128)) {
        let mut decoder = HpackDecoder::new();
        let _ = decode_block(&mut decoder, &block);
    }
}
