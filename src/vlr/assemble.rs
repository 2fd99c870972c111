use super::{
    EXTRA_BYTES_RECORD_ID, GEOTIFF_ASCII_RECORD_ID, GEOTIFF_DIRECTORY_RECORD_ID,
    GEOTIFF_DOUBLES_RECORD_ID, LIBLAS_USER_ID, SPEC_USER_ID, TRANSFORM_USER_ID, Vlr, VlrList,
    WKT_RECORD_ID,
};
use crate::{
    MetadataNode, Result, SpatialReference,
    extra_dims::{ExtraDim, extra_bytes_payload},
    metadata::find_vlr_metadata,
    options::VlrOption,
    srs::GeoTiffEncoder,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use log::debug;

/// Builds the records that describe a file, in the order they're written.
///
/// User vlrs come first, in option order, then the spatial reference, then the extra bytes
/// description. Forwarded vlrs that aren't in the metadata are skipped, as is the spatial
/// reference when it's empty or there's no GeoTIFF encoder.
///
/// # Examples
///
/// ```
/// use las_writer::{MetadataNode, vlr};
/// let list = vlr::assemble(&MetadataNode::default(), &[], None, None, &[]).unwrap();
/// assert!(list.vlrs().is_empty());
/// ```
pub fn assemble(
    metadata: &MetadataNode,
    options: &[VlrOption],
    srs: Option<&SpatialReference>,
    geotiff: Option<&dyn GeoTiffEncoder>,
    extra_dims: &[ExtraDim],
) -> Result<VlrList> {
    let mut list = VlrList::default();
    add_option_vlrs(&mut list, metadata, options)?;
    if let (Some(srs), Some(geotiff)) = (srs, geotiff) {
        add_srs_vlrs(&mut list, srs, geotiff);
    }
    if !extra_dims.is_empty() {
        list.push(Vlr::new(
            SPEC_USER_ID,
            EXTRA_BYTES_RECORD_ID,
            "Extra Bytes Record",
            extra_bytes_payload(extra_dims)?,
        ));
    }
    Ok(list)
}

fn add_option_vlrs(list: &mut VlrList, metadata: &MetadataNode, options: &[VlrOption]) -> Result<()> {
    for option in options {
        let encoded = if option.is_forward() {
            match find_vlr_metadata(metadata, option.record_id, &option.user_id) {
                Some(node) => node.value(),
                None => {
                    debug!(
                        "no metadata for forwarded vlr {}/{}",
                        option.user_id, option.record_id
                    );
                    continue;
                }
            }
        } else {
            option.value.as_str()
        };
        list.push(Vlr::new(
            option.user_id.as_str(),
            option.record_id,
            option.description.as_str(),
            decode(encoded)?,
        ));
    }
    Ok(())
}

fn decode(encoded: &str) -> Result<Vec<u8>> {
    let encoded: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(encoded)?)
}

fn add_srs_vlrs(list: &mut VlrList, srs: &SpatialReference, geotiff: &dyn GeoTiffEncoder) {
    if srs.is_empty() {
        return;
    }
    let keys = geotiff.encode(srs);
    for (record_id, description, data) in [
        (
            GEOTIFF_DIRECTORY_RECORD_ID,
            "GeoTiff GeoKeyDirectoryTag",
            keys.directory,
        ),
        (
            GEOTIFF_DOUBLES_RECORD_ID,
            "GeoTiff GeoDoubleParamsTag",
            keys.doubles,
        ),
        (
            GEOTIFF_ASCII_RECORD_ID,
            "GeoTiff GeoAsciiParamsTag",
            keys.ascii,
        ),
    ] {
        if !data.is_empty() {
            list.push(Vlr::new(TRANSFORM_USER_ID, record_id, description, data));
        }
    }
    list.push(Vlr::new(
        TRANSFORM_USER_ID,
        WKT_RECORD_ID,
        "OGC Transformation Record",
        wkt_payload(srs),
    ));
    list.push(Vlr::new(
        LIBLAS_USER_ID,
        WKT_RECORD_ID,
        "OGR variant of OpenGIS WKT SRS",
        wkt_payload(srs),
    ));
}

fn wkt_payload(srs: &SpatialReference) -> Vec<u8> {
    let mut data = Vec::with_capacity(srs.wkt().len() + 1);
    data.extend_from_slice(srs.wkt().as_bytes());
    data.push(0);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extra_dims::DataType,
        srs::{EpsgGeoTiffEncoder, GeoTiffKeys},
    };

    const UTM: &str = r#"PROJCS["NAD83 / UTM zone 10N",AUTHORITY["EPSG","26910"]]"#;

    fn vlr_option(value: &str, record_id: u16, user_id: &str) -> VlrOption {
        VlrOption {
            value: value.to_string(),
            record_id,
            user_id: user_id.to_string(),
            description: "a description".to_string(),
        }
    }

    fn metadata() -> MetadataNode {
        MetadataNode::new("root", "").with_child(
            MetadataNode::new("vlr_0", "d29ybGQ=")
                .with_child(MetadataNode::new("record_id", "12"))
                .with_child(MetadataNode::new("user_id", "forwarded")),
        )
    }

    #[test]
    fn explicit() {
        let options = [vlr_option("aGVsbG8=", 42, "me")];
        let list = assemble(&MetadataNode::default(), &options, None, None, &[]).unwrap();
        let vlr = &list.vlrs()[0];
        assert_eq!("me", vlr.user_id);
        assert_eq!(42, vlr.record_id);
        assert_eq!("a description", vlr.description);
        assert_eq!(b"hello", vlr.data.as_slice());
    }

    #[test]
    fn invalid_base64() {
        let options = [vlr_option("not base64!", 42, "me")];
        assert!(assemble(&MetadataNode::default(), &options, None, None, &[]).is_err());
    }

    #[test]
    fn forward() {
        let options = [
            vlr_option("FORWARD", 12, "forwarded"),
            vlr_option("FORWARD", 13, "forwarded"),
        ];
        let list = assemble(&metadata(), &options, None, None, &[]).unwrap();
        assert_eq!(1, list.vlrs().len());
        assert_eq!(b"world", list.vlrs()[0].data.as_slice());
    }

    #[test]
    fn srs() {
        let srs = SpatialReference::new(UTM);
        let list = assemble(
            &MetadataNode::default(),
            &[],
            Some(&srs),
            Some(&EpsgGeoTiffEncoder),
            &[],
        )
        .unwrap();
        let ids: Vec<(&str, u16)> = list
            .vlrs()
            .iter()
            .map(|vlr| (vlr.user_id.as_str(), vlr.record_id))
            .collect();
        assert_eq!(
            vec![
                ("LASF_Projection", 34735),
                ("LASF_Projection", 2112),
                ("liblas", 2112)
            ],
            ids
        );
        let wkt = &list.vlrs()[1].data;
        assert_eq!(Some(&0), wkt.last());
        assert_eq!(UTM.len() + 1, wkt.len());
    }

    #[test]
    fn all_geotiff_tags() {
        struct Everything;
        impl GeoTiffEncoder for Everything {
            fn encode(&self, _: &SpatialReference) -> GeoTiffKeys {
                GeoTiffKeys {
                    directory: vec![1],
                    doubles: vec![2],
                    ascii: vec![3],
                }
            }
        }
        let srs = SpatialReference::new(UTM);
        let list = assemble(&MetadataNode::default(), &[], Some(&srs), Some(&Everything), &[])
            .unwrap();
        let ids: Vec<u16> = list.vlrs().iter().map(|vlr| vlr.record_id).collect();
        assert_eq!(vec![34735, 34736, 34737, 2112, 2112], ids);
    }

    #[test]
    fn srs_skipped() {
        let empty = SpatialReference::new("");
        let list = assemble(
            &MetadataNode::default(),
            &[],
            Some(&empty),
            Some(&EpsgGeoTiffEncoder),
            &[],
        )
        .unwrap();
        assert!(list.vlrs().is_empty());

        let srs = SpatialReference::new(UTM);
        let list = assemble(&MetadataNode::default(), &[], Some(&srs), None, &[]).unwrap();
        assert!(list.vlrs().is_empty());
    }

    #[test]
    fn order() {
        let options = [vlr_option("aGVsbG8=", 42, "me")];
        let srs = SpatialReference::new(UTM);
        let dims = [ExtraDim::new("Amplitude", DataType::Uint16)];
        let list = assemble(
            &MetadataNode::default(),
            &options,
            Some(&srs),
            Some(&EpsgGeoTiffEncoder),
            &dims,
        )
        .unwrap();
        let first = list.vlrs().first().unwrap();
        let last = list.vlrs().last().unwrap();
        assert_eq!("me", first.user_id);
        assert_eq!("LASF_Spec", last.user_id);
        assert_eq!(4, last.record_id);
        assert_eq!(192, last.data.len());
    }

    #[test]
    fn large_payload_is_extended() {
        let encoded = STANDARD.encode(vec![0u8; u16::MAX as usize + 1]);
        let options = [vlr_option(&encoded, 1, "big")];
        let list = assemble(&MetadataNode::default(), &options, None, None, &[]).unwrap();
        assert!(list.vlrs().is_empty());
        assert_eq!(1, list.evlrs().len());
    }
}
