//! HPACK header compression (RFC 7541).
//!
//! [`HpackEncoder`] and [`HpackDecoder`] each own a [`HpackHeaderTable`];
//! the static table and the Huffman code are process-wide and read-only.
//! [`HpackDecoderAdapter`] is what frame processing talks to.

pub mod constants;
mod decoder;
mod decoder_adapter;
mod encoder;
mod entry;
mod header_block;
mod header_table;
pub mod huffman;
mod integer;
mod output_stream;
mod static_table;

pub use decoder::{HpackDecoder, DEFAULT_MAX_STRING_SIZE};
pub use decoder_adapter::{HpackDecoderAdapter, DEFAULT_MAX_DECODE_BUFFER_SIZE};
pub use encoder::{default_indexing_policy, HeaderListener, HpackEncoder, IndexingPolicy, ProgressiveEncoder};
pub use entry::{entry_size, EntryType, HpackEntry};
pub use header_block::HeaderBlock;
pub use header_table::HpackHeaderTable;
pub use huffman::{obtain_hpack_huffman_table, HpackHuffmanSymbol, HpackHuffmanTable};
pub use integer::decode_integer;
pub use output_stream::HpackOutputStream;
pub use static_table::{obtain_hpack_static_table, HpackStaticTable};
