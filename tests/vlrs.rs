//! Variable length records, as seen by a las reader.

use base64::{Engine, engine::general_purpose::STANDARD};
use las::Reader;
use las_writer::{
    Field, MetadataNode, Options, PointBuffer, SpatialReference, Writer, WriterOptions,
};
use std::io::Cursor;

const UTM: &str = r#"PROJCS["NAD83 / UTM zone 10N",GEOGCS["NAD83",AUTHORITY["EPSG","4269"]],AUTHORITY["EPSG","26910"]]"#;

fn buffer() -> PointBuffer {
    let mut buffer = PointBuffer::new();
    buffer.push([(Field::X, 1.), (Field::Y, 2.), (Field::Z, 3.)]);
    buffer
}

fn write(options: &Options, metadata: Option<MetadataNode>) -> Vec<u8> {
    let options = WriterOptions::from_options(options).unwrap();
    let mut writer = Writer::new(Cursor::new(Vec::new()), options).unwrap();
    if let Some(metadata) = metadata {
        writer.set_metadata(metadata).unwrap();
    }
    writer.write_table(&buffer()).unwrap();
    writer.into_inner().unwrap().into_inner()
}

#[test]
fn explicit_vlr() {
    let mut options = Options::new();
    let _ = options.add_vlr(
        "vlr",
        STANDARD.encode(b"hello"),
        &[
            ("record_id", "42"),
            ("user_id", "me"),
            ("description", "a greeting"),
        ],
    );
    let reader = Reader::new(Cursor::new(write(&options, None))).unwrap();
    let vlrs = reader.header().vlrs();
    assert_eq!(1, vlrs.len());
    assert_eq!("me", vlrs[0].user_id);
    assert_eq!(42, vlrs[0].record_id);
    assert_eq!("a greeting", vlrs[0].description);
    assert_eq!(b"hello", vlrs[0].data.as_slice());
}

#[test]
fn vlr_evlr_boundary() {
    let mut options = Options::new();
    let _ = options
        .add("minor_version", 4)
        .add_vlr(
            "vlr_small",
            STANDARD.encode(vec![1u8; u16::MAX as usize]),
            &[("record_id", "1"), ("user_id", "small")],
        )
        .add_vlr(
            "vlr_large",
            STANDARD.encode(vec![2u8; u16::MAX as usize + 1]),
            &[("record_id", "2"), ("user_id", "large")],
        );
    let bytes = write(&options, None);
    let evlr_start = u64::from_le_bytes(bytes[235..243].try_into().unwrap());
    assert_eq!(375 + 54 + u16::MAX as u64 + 34, evlr_start);

    let reader = Reader::new(Cursor::new(bytes)).unwrap();
    let header = reader.header();
    assert_eq!(1, header.vlrs().len());
    assert_eq!("small", header.vlrs()[0].user_id);
    assert_eq!(1, header.evlrs().len());
    assert_eq!("large", header.evlrs()[0].user_id);
    assert_eq!(u16::MAX as usize + 1, header.evlrs()[0].data.len());
}

#[test]
fn forwarded_vlr() {
    let metadata = MetadataNode::new("root", "").with_child(
        MetadataNode::new("VLR_3", STANDARD.encode(b"forwarded data"))
            .with_child(MetadataNode::new("record_id", "7"))
            .with_child(MetadataNode::new("user_id", "upstream")),
    );
    let mut options = Options::new();
    let _ = options
        .add_vlr(
            "vlr_found",
            "FORWARD",
            &[("record_id", "7"), ("user_id", "upstream")],
        )
        .add_vlr(
            "vlr_missing",
            "FORWARD",
            &[("record_id", "8"), ("user_id", "upstream")],
        );
    let reader = Reader::new(Cursor::new(write(&options, Some(metadata)))).unwrap();
    let vlrs = reader.header().vlrs();
    assert_eq!(1, vlrs.len());
    assert_eq!(7, vlrs[0].record_id);
    assert_eq!(b"forwarded data", vlrs[0].data.as_slice());
}

#[test]
fn forward_miss_writes_nothing() {
    let mut options = Options::new();
    let _ = options.add_vlr("vlr", "FORWARD", &[("record_id", "8"), ("user_id", "nobody")]);
    let bytes = write(&options, None);
    assert_eq!(227 + 34, bytes.len());
}

#[test]
fn spatial_reference_from_option() {
    let mut options = Options::new();
    let _ = options.add("a_srs", UTM);
    let reader = Reader::new(Cursor::new(write(&options, None))).unwrap();
    let ids: Vec<(String, u16)> = reader
        .header()
        .vlrs()
        .iter()
        .map(|vlr| (vlr.user_id.clone(), vlr.record_id))
        .collect();
    assert_eq!(
        vec![
            ("LASF_Projection".to_string(), 34735),
            ("LASF_Projection".to_string(), 2112),
            ("liblas".to_string(), 2112),
        ],
        ids
    );
    let wkt = &reader.header().vlrs()[1].data;
    assert_eq!(UTM.as_bytes(), &wkt[..wkt.len() - 1]);
}

#[test]
fn spatial_reference_from_table() {
    let buffer = buffer().with_spatial_reference(SpatialReference::new(UTM));
    let mut writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
    writer.write_table(&buffer).unwrap();
    let reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    assert_eq!(3, reader.header().vlrs().len());
}

#[test]
fn no_geotiff_encoder() {
    let buffer = buffer().with_spatial_reference(SpatialReference::new(UTM));
    let mut writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
    writer.set_geotiff_encoder(None);
    writer.write_table(&buffer).unwrap();
    let reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    assert!(reader.header().vlrs().is_empty());
}

#[test]
fn quantization() {
    let mut buffer = PointBuffer::new();
    buffer.push([(Field::X, 1.005), (Field::Y, 2.004), (Field::Z, 3.006)]);
    let mut writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
    writer.write_table(&buffer).unwrap();
    let bytes = writer.into_inner().unwrap().into_inner();
    let point = &bytes[227..];
    let x = i32::from_le_bytes(point[0..4].try_into().unwrap());
    let y = i32::from_le_bytes(point[4..8].try_into().unwrap());
    let z = i32::from_le_bytes(point[8..12].try_into().unwrap());
    // 1.005 / 0.01 is 100.49999999999999 in f64
    assert_eq!((1.005f64 / 0.01).round() as i32, x);
    assert_eq!(200, y);
    assert_eq!(301, z);
}

#[test]
fn spatial_reference_with_long_digit_tail() {
    let mut options = Options::new();
    let _ = options.add("a_srs", "LOCAL_CS[\"site grid\",1234567890");
    let reader = Reader::new(Cursor::new(write(&options, None))).unwrap();
    let vlrs = reader.header().vlrs();
    assert_eq!(2, vlrs.len());
    assert!(vlrs.iter().all(|vlr| vlr.record_id == 2112));
}
