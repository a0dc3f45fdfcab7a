use encoding_rs::{Encoding, UTF_8};
use xhtmlchardet::detect;

pub(crate) fn encoding(data: &[u8], hint: Option<String>) -> Option<&'static Encoding> {
    let mut cursor = std::io::Cursor::new(data);
    let charsets = detect(&mut cursor, hint).ok()?;
    // no encoding detected
    let label = if charsets.is_empty() {
        "UTF-8"
    } else {
        &charsets[0]
    };
    Encoding::for_label(label.as_bytes())
}

/// Decode bytes to text, falling back to UTF-8 when the encoding is not
/// recognized. Malformed sequences become U+FFFD.
pub(crate) fn decode(data: &[u8]) -> String {
    let encoding = encoding(data, None).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(data);
    text.into_owned()
}

/// Decode bytes as UTF-8 and drop anything that is not valid, rather than
/// replacing it.
pub(crate) fn decode_utf8_lossy_stripped(data: &[u8]) -> String {
    data.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
