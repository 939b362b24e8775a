use super::*;

async fn decode_one(input: &[u8]) -> Resp {
    let mut cursor = std::io::Cursor::new(input.to_vec());
    let mut decoder = Decoder::new(&mut cursor);
    decoder.decode().await.unwrap().unwrap()
}

#[tokio::test]
async fn round_trip_simple_string() {
    let v = decode_one(b"+OK\r\n").await;
    assert_eq!(v, Resp::SimpleString(Bytes::from_static(b"OK")));
    assert_eq!(v.encode(), &b"+OK\r\n"[..]);
}

#[tokio::test]
async fn round_trip_empty_bulk() {
    let v = decode_one(b"$0\r\n\r\n").await;
    assert_eq!(v, Resp::bulk(&b""[..]));
    assert_eq!(v.encode(), &b"$0\r\n\r\n"[..]);
}

#[tokio::test]
async fn round_trip_null_bulk() {
    let v = decode_one(b"$-1\r\n").await;
    assert_eq!(v, Resp::null_bulk());
    assert_eq!(v.encode(), &b"$-1\r\n"[..]);
}

#[tokio::test]
async fn round_trip_null_array() {
    let v = decode_one(b"*-1\r\n").await;
    assert_eq!(v, Resp::null_array());
    assert_eq!(v.encode(), &b"*-1\r\n"[..]);
}

#[tokio::test]
async fn round_trip_mixed_array() {
    let v = decode_one(b"*3\r\n$3\r\nfoo\r\n$-1\r\n$3\r\nbar\r\n").await;
    assert_eq!(
        v,
        Resp::array(vec![
            Resp::bulk(&b"foo"[..]),
            Resp::null_bulk(),
            Resp::bulk(&b"bar"[..]),
        ])
    );
}

#[tokio::test]
async fn bulk_payload_read_by_length_not_terminator() {
    let v = decode_one(b"$14\r\nHello \rWorld!\n\r\n").await;
    assert_eq!(v, Resp::bulk(&b"Hello \rWorld!\n"[..]));
}

#[tokio::test]
async fn clean_close_with_no_bytes_is_not_an_error() {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut decoder = Decoder::new(&mut cursor);
    assert_eq!(decoder.decode().await, Ok(None));
}

#[tokio::test]
async fn truncated_frame_is_unexpected_eof() {
    let mut cursor = std::io::Cursor::new(b"$5\r\nhi".to_vec());
    let mut decoder = Decoder::new(&mut cursor);
    assert_eq!(decoder.decode().await, Err(FramingError::UnexpectedEof));
}

#[tokio::test]
async fn length_mismatch_terminator() {
    let mut cursor = std::io::Cursor::new(b"$2\r\nhiXX".to_vec());
    let mut decoder = Decoder::new(&mut cursor);
    assert_eq!(decoder.decode().await, Err(FramingError::LengthMismatch));
}

#[tokio::test]
async fn unknown_type_tag() {
    let mut cursor = std::io::Cursor::new(b"!oops\r\n".to_vec());
    let mut decoder = Decoder::new(&mut cursor);
    assert_eq!(decoder.decode().await, Err(FramingError::UnknownType));
}

#[test]
fn integer_rendering() {
    assert_eq!(Resp::Integer(-42).encode(), &b":-42\r\n"[..]);
}
