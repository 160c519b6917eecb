// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

static CRLF: &[u8; 2] = b"\r\n";

/// A reply value, one of the RESP2 types. Null bulk strings and null arrays are separate from empty
/// ones and have their own encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
    NullArray,
}

impl Frame {
    /// Writes the wire representation of the frame into `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            // +<string>\r\n
            Frame::Simple(s) => {
                dst.put_u8(b'+');
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            // -<error>\r\n
            Frame::Error(s) => {
                dst.put_u8(b'-');
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            // :<integer>\r\n
            Frame::Integer(i) => {
                dst.put_u8(b':');
                dst.put_slice(i.to_string().as_bytes());
                dst.put_slice(CRLF);
            }
            // $<length>\r\n<data>\r\n
            Frame::Bulk(bytes) => {
                let length_str = bytes.len().to_string();
                dst.reserve(1 + length_str.len() + CRLF.len() + bytes.len() + CRLF.len());
                dst.put_u8(b'$');
                dst.put_slice(length_str.as_bytes());
                dst.put_slice(CRLF);
                dst.put_slice(bytes);
                dst.put_slice(CRLF);
            }
            Frame::Null => dst.put_slice(b"$-1\r\n"),
            // *<number-of-elements>\r\n<element-1>...<element-n>
            Frame::Array(arr) => {
                dst.put_u8(b'*');
                dst.put_slice(arr.len().to_string().as_bytes());
                dst.put_slice(CRLF);
                for frame in arr {
                    frame.encode(dst);
                }
            }
            Frame::NullArray => dst.put_slice(b"*-1\r\n"),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = BytesMut::new();
        self.encode(&mut bytes);
        bytes.to_vec()
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
            Frame::NullArray => write!(f, "*-1"),
        }
    }
}
