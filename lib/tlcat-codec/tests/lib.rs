// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use tlcat_codec::{
    Codec, Cursor, DecodeError, EncodeError, FieldType, Object, Schema, TlValue, BOOL_FALSE_ID,
    BOOL_TRUE_ID, GZIP_PACKED_ID,
};

const SCHEMA: &str = "
    // A few definitions from mtproto.tl and friends.
    resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes server_public_key_fingerprints:Vector<long> = ResPQ;
    rpc_result#f35c6d01 req_msg_id:long result:Object = RpcResult;
    msg_container#73f1f8dc messages:vector<%Message> = MessageContainer;
    message msg_id:long seqno:int bytes:int body:Object = Message;
    peer#9db1bc6d id:long name:string verified:Bool rating:double = Peer;
    ---functions---
    ping#7abe77ec ping_id:long = Pong;
";

fn codec() -> Codec {
    Codec::new(Schema::from_tl(SCHEMA).unwrap())
}

fn peer(id: i64, name: &str) -> TlValue {
    Object::new(0x9db1bc6d, "peer")
        .with("id", TlValue::Long(id))
        .with("name", TlValue::String(name.into()))
        .with("verified", TlValue::Bool(id % 2 == 0))
        .with("rating", TlValue::Double(1.5))
        .into()
}

fn res_pq() -> TlValue {
    Object::new(0x05162463, "resPQ")
        .with("nonce", TlValue::Int128([1; 16]))
        .with("server_nonce", TlValue::Int128([2; 16]))
        .with("pq", TlValue::Bytes(vec![0x17, 0xed, 0x48, 0x94, 0x1a, 0x08, 0xf9, 0x81]))
        .with(
            "server_public_key_fingerprints",
            TlValue::Vector(vec![TlValue::Long(-4344800451088585951)]),
        )
        .into()
}

#[test]
fn object_round_trip() {
    let codec = codec();
    let value = res_pq();
    let bytes = codec.encode(&value).unwrap();

    assert_eq!(&bytes[..4], &[0x63, 0x24, 0x16, 0x05]);
    assert_eq!(bytes.len(), 4 + 16 + 16 + 12 + 4 + 4 + 8);
    assert_eq!(codec.decode_exact(&bytes).unwrap(), value);
}

#[test]
fn scalar_round_trip() {
    let codec = codec();
    let cases = [
        (TlValue::Int(-5), FieldType::Int),
        (TlValue::Long(i64::MIN), FieldType::Long),
        (TlValue::Int128([0xab; 16]), FieldType::Int128),
        (TlValue::Int256([0xcd; 32]), FieldType::Int256),
        (TlValue::Double(-0.25), FieldType::Double),
        (TlValue::Bool(true), FieldType::Bool),
        (TlValue::Bool(false), FieldType::Bool),
        (TlValue::Bytes(vec![0, 1, 2]), FieldType::Bytes),
        (TlValue::String("héllo".into()), FieldType::String),
        (TlValue::Nothing, FieldType::Boxed(None)),
    ];

    for (value, ty) in cases.iter() {
        let bytes = codec.encode_as(value, ty).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(&codec.decode_as(&bytes, ty).unwrap(), value, "as {}", ty);
    }
}

#[test]
fn byte_string_lengths() {
    let codec = codec();
    for len in [0usize, 1, 253, 254, 255, 65536] {
        let value = TlValue::Bytes(vec![0x5a; len]);
        let bytes = codec.encode_as(&value, &FieldType::Bytes).unwrap();
        assert_eq!(bytes.len() % 4, 0, "length {}", len);

        let mut cursor = Cursor::from_slice(&bytes);
        let decoded = codec.decode_as_from(&mut cursor, &FieldType::Bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(cursor.remaining(), 0, "padding of {} not consumed", len);
    }
}

#[test]
fn scalars_need_a_type() {
    let codec = codec();
    for value in [
        TlValue::Int(0),
        TlValue::Int(BOOL_TRUE_ID as i32),
        TlValue::Long(5),
        TlValue::Double(1.0),
        TlValue::Bytes(vec![1]),
        TlValue::String("x".into()),
        TlValue::Vector(vec![TlValue::Int(1)]),
    ] {
        assert!(
            matches!(codec.encode(&value), Err(EncodeError::UnencodableValue { .. })),
            "{} was encoded without a constructor",
            value
        );
        assert!(matches!(
            codec.encode_packed(&value),
            Err(EncodeError::UnencodableValue { .. })
        ));
    }

    let bytes = codec.encode_as(&TlValue::Int(0), &FieldType::Int).unwrap();
    assert_eq!(bytes, [0, 0, 0, 0]);
}

#[test]
fn oversized_byte_string() {
    let codec = codec();
    let longest = TlValue::Bytes(vec![0; (1 << 24) - 1]);
    let bytes = codec.encode_as(&longest, &FieldType::Bytes).unwrap();
    assert_eq!(&bytes[..4], &[254, 0xff, 0xff, 0xff]);
    assert_eq!(bytes.len(), 1 << 24 | 4);

    let too_long = TlValue::Bytes(vec![0; 1 << 24]);
    assert!(matches!(
        codec.encode_as(&too_long, &FieldType::Bytes),
        Err(EncodeError::UnencodableValue { .. })
    ));

    let value: TlValue = Object::new(0x9db1bc6d, "peer")
        .with("id", TlValue::Long(1))
        .with("name", TlValue::String("x".repeat(1 << 24)))
        .with("verified", TlValue::Bool(true))
        .with("rating", TlValue::Double(0.0))
        .into();
    assert!(matches!(
        codec.encode(&value),
        Err(EncodeError::UnencodableValue { .. })
    ));
}

#[test]
fn vectors_keep_order() {
    let codec = codec();
    let longs = FieldType::Vector(Box::new(FieldType::Long));
    for len in [0, 1, 5] {
        let value = TlValue::Vector((0..len).map(TlValue::Long).collect());
        let bytes = codec.encode_as(&value, &longs).unwrap();
        assert_eq!(bytes.len(), 8 + 8 * len as usize);
        assert_eq!(codec.decode_as(&bytes, &longs).unwrap(), value);

        let value = TlValue::Vector((0..len).map(|i| peer(i, "p")).collect());
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode_exact(&bytes).unwrap(), value);
    }
}

#[test]
fn bare_objects_in_container() {
    let codec = codec();
    let message = codec.schema().find_by_name("message").unwrap().id;

    let body = Object::new(0xf35c6d01, "rpc_result")
        .with("req_msg_id", TlValue::Long(42))
        .with("result", TlValue::Bool(true));
    let value: TlValue = Object::new(0x73f1f8dc, "msg_container")
        .with(
            "messages",
            TlValue::Vector(vec![Object::new(message, "message")
                .with("msg_id", TlValue::Long(42))
                .with("seqno", TlValue::Int(1))
                .with("bytes", TlValue::Int(16))
                .with("body", body.into())
                .into()]),
        )
        .into();

    let bytes = codec.encode(&value).unwrap();
    // container id, count, then the message without its constructor
    assert_eq!(&bytes[8..16], &42i64.to_le_bytes());
    assert_eq!(codec.decode_exact(&bytes).unwrap(), value);
}

#[test]
fn unknown_constructor_consumes_nothing() {
    let codec = codec();
    let bytes = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x00, 0x00, 0x00];
    let mut cursor = Cursor::from_slice(&bytes);
    assert_eq!(
        codec.decode_from(&mut cursor),
        Err(DecodeError::UnknownConstructor { id: 0xefbeadde })
    );
    assert_eq!(cursor.pos(), 0);
}

#[test]
fn truncated_byte_string() {
    let codec = codec();
    let mut bytes = codec.encode(&res_pq()).unwrap();
    // Declare a longer `pq` than what remains after it.
    bytes[36] = 0xf0;
    assert_eq!(codec.decode(&bytes), Err(DecodeError::Truncated));

    assert_eq!(codec.decode(&[0x63, 0x24, 0x16]), Err(DecodeError::Truncated));
}

#[test]
fn impossible_vector_count() {
    let codec = codec();
    let bytes = [0x15, 0xc4, 0xb5, 0x1c, 0xff, 0xff, 0xff, 0x7f, 0, 0, 0, 0];
    assert!(matches!(
        codec.decode(&bytes),
        Err(DecodeError::MalformedLength { .. })
    ));
}

#[test]
fn boolean_tags() {
    let codec = codec();
    for (id, expected) in [(BOOL_TRUE_ID, true), (BOOL_FALSE_ID, false)] {
        let mut bytes = id.to_le_bytes().to_vec();
        bytes.extend([0xaa; 4]);

        let mut cursor = Cursor::from_slice(&bytes);
        assert_eq!(codec.decode_from(&mut cursor), Ok(TlValue::Bool(expected)));
        assert_eq!(cursor.pos(), 4);
    }
}

#[test]
fn trailing_bytes() {
    let codec = codec();
    let mut bytes = codec.encode(&peer(1, "x")).unwrap();
    bytes.push(0);
    assert!(codec.decode(&bytes).is_ok());
    assert_eq!(
        codec.decode_exact(&bytes),
        Err(DecodeError::TrailingBytes { count: 1 })
    );
}

#[test]
fn gzip_packed_is_unpacked() {
    let codec = codec();
    let value = TlValue::Vector((0..50).map(|i| peer(i, "repeated name")).collect());
    let packed = codec.encode_packed(&value).unwrap();
    assert_eq!(&packed[..4], &GZIP_PACKED_ID.to_le_bytes());
    assert!(packed.len() < codec.encode(&value).unwrap().len());
    assert_eq!(codec.decode_exact(&packed).unwrap(), value);

    let codec = Codec::build(Schema::from_tl(SCHEMA).unwrap())
        .unpack_gzip(false)
        .finish();
    assert_eq!(
        codec.decode(&packed),
        Err(DecodeError::UnknownConstructor { id: GZIP_PACKED_ID })
    );
}

#[test]
fn packed_size_is_limited() {
    let value = TlValue::Vector((0..50).map(|i| peer(i, "repeated name")).collect());
    let unpacked_len = codec().encode(&value).unwrap().len();
    let packed = codec().encode_packed(&value).unwrap();

    let codec = Codec::build(Schema::from_tl(SCHEMA).unwrap())
        .max_unpacked_len(unpacked_len)
        .finish();
    assert_eq!(codec.decode_exact(&packed).unwrap(), value);

    let codec = Codec::build(Schema::from_tl(SCHEMA).unwrap())
        .max_unpacked_len(unpacked_len - 1)
        .finish();
    assert_eq!(
        codec.decode(&packed),
        Err(DecodeError::UnpackedTooLarge {
            limit: unpacked_len - 1
        })
    );
}

#[test]
fn corrupt_gzip() {
    let codec = codec();
    let mut bytes = GZIP_PACKED_ID.to_le_bytes().to_vec();
    bytes.extend([4, 1, 2, 3, 4, 0, 0, 0]);
    assert_eq!(codec.decode(&bytes), Err(DecodeError::Decompression));
}

#[test]
fn functions_can_be_decoded() {
    let codec = codec();
    let bytes = [0xec, 0x77, 0xbe, 0x7a, 9, 0, 0, 0, 0, 0, 0, 0];
    let value = codec.decode_exact(&bytes).unwrap();
    assert_eq!(value.as_object().map(|o| o.name.as_str()), Some("ping"));
    assert_eq!(value.get("ping_id"), Some(&TlValue::Long(9)));
}
