//! Tests for ALTO text extraction and ALTO directory aggregation.

use ocr_to_metadata::error::Error;
use ocr_to_metadata::ocr::{AltoDocument, AltoExtractor, OcrRepresentation, TextAggregator};
use ocr_to_metadata::storage::LocalStorage;
use std::fs;
use tempfile::tempdir;

/// ALTO v2 sample with two text blocks and a hyphenated line break.
const NEWSPAPER_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v2#"
      xmlns:xlink="http://www.w3.org/1999/xlink">
  <Description>
    <MeasurementUnit>pixel</MeasurementUnit>
    <sourceImageInformation><fileName>00000001.tif</fileName></sourceImageInformation>
  </Description>
  <Styles><TextStyle ID="TS1" FONTSIZE="9"/></Styles>
  <Layout>
    <Page ID="Page1" PHYSICAL_IMG_NR="1" HEIGHT="5000" WIDTH="3500">
      <TopMargin/>
      <PrintSpace>
        <TextBlock ID="TB1" HPOS="100" VPOS="100">
          <TextLine ID="TL1">
            <String ID="S1" CONTENT="Berliner" WC="0.98"/>
            <SP/>
            <String ID="S2" CONTENT="Tageblatt" WC="0.95"/>
          </TextLine>
        </TextBlock>
        <TextBlock ID="TB2">
          <TextLine ID="TL2">
            <String CONTENT="Die"/><SP/><String CONTENT="Verhand" SUBS_TYPE="HypPart1" SUBS_CONTENT="Verhandlung"/><HYP CONTENT="-"/>
          </TextLine>
          <TextLine ID="TL3">
            <String CONTENT="lung" SUBS_TYPE="HypPart2" SUBS_CONTENT="Verhandlung"/><SP/><String CONTENT="begann."/>
          </TextLine>
        </TextBlock>
        <Illustration ID="IL1"/>
      </PrintSpace>
    </Page>
  </Layout>
</alto>"#;

/// Encode text as ISO-8859-1; every character must be below U+0100.
fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

const LATIN1_PAGE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v2#">
  <Layout><Page ID="Page1"><PrintSpace><TextBlock ID="TB1">
    <TextLine><String CONTENT="Müller"/><SP/><String CONTENT="&amp;"/><SP/><String CONTENT="Söhne"/></TextLine>
  </TextBlock></PrintSpace></Page></Layout>
</alto>"#;

mod document {
    use super::*;

    #[test]
    fn test_declared_latin1_encoding_is_honoured() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("00000001.xml");
        fs::write(&path, latin1(LATIN1_PAGE)).unwrap();

        let doc = AltoDocument::from_file(&path).unwrap();
        assert_eq!(doc.text(), "Müller & Söhne");
    }

    #[test]
    fn test_realistic_page() {
        let doc = AltoDocument::parse_str(NEWSPAPER_PAGE).unwrap();

        assert_eq!(doc.pages().len(), 1);
        let page = &doc.pages()[0];
        assert_eq!(page.id.as_deref(), Some("Page1"));
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[1].id.as_deref(), Some("TB2"));
        assert_eq!(doc.text(), "Berliner Tageblatt\nDie Verhand-\nlung begann.");
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("00000001.xml");
        fs::write(&path, NEWSPAPER_PAGE).unwrap();

        let doc = AltoDocument::from_file(&path).unwrap();
        assert!(doc.text().starts_with("Berliner Tageblatt"));
    }

    #[test]
    fn test_byte_order_mark_is_accepted() {
        let with_bom = format!("\u{feff}{}", NEWSPAPER_PAGE);
        let doc = AltoDocument::parse_str(&with_bom).unwrap();
        assert_eq!(doc.pages().len(), 1);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.xml");

        match AltoDocument::from_file(&path) {
            Err(Error::AltoParse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

mod extractor {
    use super::*;

    #[test]
    fn test_extract_through_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("00000001.xml");
        fs::write(&path, NEWSPAPER_PAGE).unwrap();

        let text = AltoExtractor::extract(&LocalStorage, &path).unwrap();
        assert!(text.ends_with("begann."));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_extract_unreadable_file() {
        let dir = tempdir().unwrap();
        let err = AltoExtractor::extract(&LocalStorage, &dir.path().join("nope.xml")).unwrap_err();
        assert!(err.is_per_file());
    }
}

mod directory {
    use super::*;

    #[test]
    fn test_files_concatenated_in_name_order_without_separator() {
        let dir = tempdir().unwrap();
        let page = |word: &str| {
            format!(
                r#"<alto><Layout><Page><PrintSpace><TextBlock><TextLine><String CONTENT="{}"/></TextLine></TextBlock></PrintSpace></Page></Layout></alto>"#,
                word
            )
        };
        fs::write(dir.path().join("00000002.xml"), page("two")).unwrap();
        fs::write(dir.path().join("00000001.xml"), page("one")).unwrap();
        fs::write(dir.path().join("00000003.xml"), page("three")).unwrap();

        let aggregation = TextAggregator::new(&LocalStorage)
            .aggregate(dir.path(), OcrRepresentation::Alto)
            .unwrap();

        assert_eq!(aggregation.text.as_str(), Some("onetwothree"));
        assert_eq!(aggregation.files.len(), 3);
    }

    #[test]
    fn test_latin1_file_is_not_dropped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("00000001.xml"), latin1(LATIN1_PAGE)).unwrap();
        fs::write(dir.path().join("00000002.xml"), NEWSPAPER_PAGE).unwrap();

        let aggregation = TextAggregator::new(&LocalStorage)
            .aggregate(dir.path(), OcrRepresentation::Alto)
            .unwrap();

        assert!(aggregation.failures.is_empty());
        assert!(aggregation.text.as_str().unwrap().starts_with("Müller & SöhneBerliner"));
    }

    #[test]
    fn test_repeated_aggregation_is_identical() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{:08}.xml", 5 - i)), NEWSPAPER_PAGE).unwrap();
        }

        let aggregator = TextAggregator::new(&LocalStorage);
        let first = aggregator.aggregate(dir.path(), OcrRepresentation::Alto).unwrap();
        let second = aggregator.aggregate(dir.path(), OcrRepresentation::Alto).unwrap();

        assert_eq!(first.text, second.text);
        assert_eq!(first.files, second.files);
    }
}
