//! Metadata export from a raw form with images loaded from disk

use std::io::Write;

use token_launcher::metadata::{export_metadata, MetadataDocument};
use token_launcher::types::ImageSlot;
use token_launcher::{Session, TokenForm};

fn form() -> TokenForm {
    TokenForm {
        name: "  Test Coin ".to_string(),
        symbol: "TST".to_string(),
        decimals: 6,
        supply: 1_000.0,
        description: "A test token".to_string(),
        website: "https://example.com".to_string(),
        twitter: "@tst".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_export_embeds_images_as_data_urls() {
    let dir = tempfile::tempdir().unwrap();

    let image_path = dir.path().join("logo.png");
    std::fs::File::create(&image_path)
        .unwrap()
        .write_all(&[0x89, b'P', b'N', b'G'])
        .unwrap();
    let banner_path = dir.path().join("banner.jpg");
    std::fs::write(&banner_path, b"jpeg").unwrap();

    let mut session = Session::new();
    session.load_image(ImageSlot::Image, &image_path).unwrap();
    session.load_image(ImageSlot::Banner, &banner_path).unwrap();

    let spec = form().collect().unwrap();
    let path = export_metadata(&spec, &session, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "TST-metadata.json");

    let json = std::fs::read_to_string(&path).unwrap();
    let doc: MetadataDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(doc.name, "Test Coin");
    assert_eq!(doc.image, "data:image/png;base64,iVBORw==");
    assert_eq!(doc.extensions.banner, "data:image/jpeg;base64,anBlZw==");
    assert_eq!(doc.extensions.website, "https://example.com");
    assert_eq!(doc.extensions.twitter, "@tst");
    assert_eq!(doc.extensions.telegram, "");
}

#[test]
fn test_export_without_images_uses_empty_strings() {
    let dir = tempfile::tempdir().unwrap();
    let spec = form().collect().unwrap();

    let path = export_metadata(&spec, &Session::new(), dir.path()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(value["image"], "");
    assert_eq!(value["extensions"]["banner"], "");
    assert_eq!(value["description"], "A test token");
}

#[test]
fn test_blank_symbol_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut blank = form();
    blank.symbol = "   ".to_string();

    let err = blank
        .collect()
        .and_then(|spec| export_metadata(&spec, &Session::new(), dir.path()))
        .unwrap_err();
    assert_eq!(err.to_string(), "Token name and symbol are required.");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
