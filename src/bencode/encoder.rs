pub trait BencodeEncode {
    fn bencode(&self, buf: &mut Vec<u8>);
}

impl BencodeEncode for i64 {
    fn bencode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"i");

        let mut buffer = itoa::Buffer::new();
        buf.extend_from_slice(buffer.format(*self).as_bytes());
        buf.extend_from_slice(b"e");
    }
}

impl BencodeEncode for u16 {
    fn bencode(&self, buf: &mut Vec<u8>) {
        i64::from(*self).bencode(buf);
    }
}

// Byte strings are length-prefixed and binary safe
impl BencodeEncode for [u8] {
    fn bencode(&self, buf: &mut Vec<u8>) {
        let mut buffer = itoa::Buffer::new();
        buf.extend_from_slice(buffer.format(self.len()).as_bytes());
        buf.extend_from_slice(b":");
        buf.extend_from_slice(self);
    }
}

impl BencodeEncode for str {
    fn bencode(&self, buf: &mut Vec<u8>) {
        self.as_bytes().bencode(buf);
    }
}

impl BencodeEncode for String {
    fn bencode(&self, buf: &mut Vec<u8>) {
        self.as_str().bencode(buf);
    }
}

/// Encode a list; an empty slice still yields `le`
pub fn encode_list<T: BencodeEncode>(items: &[T], buf: &mut Vec<u8>) {
    buf.extend_from_slice(b"l");
    for item in items {
        item.bencode(buf);
    }
    buf.extend_from_slice(b"e");
}
