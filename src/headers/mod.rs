//! Header-block consumers: the [`HeadersHandler`] interface, the bounded
//! [`QuicHeaderList`] accumulator, and bookkeeping for sent header bytes
//! awaiting acknowledgement.

mod handler;
mod header_list;
mod unacked;

pub use handler::HeadersHandler;
pub use header_list::{QuicHeaderList, DEFAULT_MAX_HEADER_LIST_SIZE, PER_HEADER_OVERHEAD};
pub use unacked::{AckListener, CompressedHeaderInfo, UnackedHeaders};
