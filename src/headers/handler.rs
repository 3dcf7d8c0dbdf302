/// Receives the fields of one decoded header block.
///
/// Name and value slices are only valid for the duration of the call.
pub trait HeadersHandler {
    /// Called once before the first field of a block.
    fn on_header_block_start(&mut self);

    fn on_header(&mut self, name: &[u8], value: &[u8]);

    /// Called once after the last field, with the decoded size (sum of name
    /// and value lengths) and the encoded size of the block.
    fn on_header_block_end(&mut self, uncompressed_header_bytes: usize, compressed_header_bytes: usize);
}
