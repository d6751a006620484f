//! In-memory `.pptx` decks and images for unit tests.
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);
const DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT: &str = "application/vnd.openxmlformats-officedocument.presentationml";

/// One slide of a generated deck.
#[derive(Debug, Clone, Default)]
pub struct FixtureSlide {
    pub title: Option<&'static str>,
    /// `(x, y, cx, cy)` in EMU, in document order
    pub pictures: Vec<(i64, i64, i64, i64)>,
    pub notes: Option<&'static str>,
}

/// Encoded black PNG of `width` x `height` pixels.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height)).unwrap();
    path
}

/// EMF header record with device bounds 640x480 and the given `rclFrame`.
pub fn emf_bytes(frame: [i32; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&108u32.to_le_bytes());
    for v in [0i32, 0, 640, 480].into_iter().chain(frame) {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes.extend_from_slice(b" EMF");
    bytes.resize(108, 0);
    bytes
}

pub fn write_deck(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("deck.pptx");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Four slides:
///
/// 0. title "Cover", no pictures
/// 1. title "Template", one picture at 1in/2in, 6in x 3in, with notes
/// 2. title "Pair", two pictures side by side
/// 3. title "Results", one picture
pub fn standard_deck() -> Vec<u8> {
    build_pptx(&standard_slides())
}

/// [`standard_deck`] with two sections: "Intro" (slides 0-1) and "Body" (slides 2-3).
pub fn sectioned_deck() -> Vec<u8> {
    const SECTIONS: &[(&str, &[u32])] = &[("Intro", &[256, 257]), ("Body", &[258, 259])];
    build(&standard_slides(), Some(SECTIONS))
}

fn standard_slides() -> Vec<FixtureSlide> {
    vec![
        FixtureSlide {
            title: Some("Cover"),
            ..Default::default()
        },
        FixtureSlide {
            title: Some("Template"),
            pictures: vec![(914_400, 1_828_800, 5_486_400, 2_743_200)],
            notes: Some("Speaker notes"),
        },
        FixtureSlide {
            title: Some("Pair"),
            pictures: vec![
                (457_200, 1_371_600, 3_657_600, 2_743_200),
                (4_572_000, 1_371_600, 3_657_600, 2_743_200),
            ],
            notes: None,
        },
        FixtureSlide {
            title: Some("Results"),
            pictures: vec![(914_400, 914_400, 1_828_800, 1_828_800)],
            notes: None,
        },
    ]
}

pub fn build_pptx(slides: &[FixtureSlide]) -> Vec<u8> {
    build(slides, None)
}

fn build(slides: &[FixtureSlide], sections: Option<&[(&str, &[u32])]>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut add = |name: &str, data: &[u8]| {
        zip.start_file(name, options).unwrap();
        zip.write_all(data).unwrap();
    };

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), format!("{CT}.presentation.main+xml")),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), format!("{CT}.slideMaster+xml")),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), format!("{CT}.slideLayout+xml")),
    ];
    let mut pres_rels = vec![(1, "slideMaster", "slideMasters/slideMaster1.xml".to_string())];
    let mut sld_ids = String::new();
    let mut image_no = 0u32;

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        overrides.push((format!("/ppt/slides/slide{n}.xml"), format!("{CT}.slide+xml")));
        pres_rels.push((n + 1, "slide", format!("slides/slide{n}.xml")));
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1));

        let mut rels = vec![(1, "slideLayout", "../slideLayouts/slideLayout1.xml".to_string())];
        let mut shapes = String::new();
        if let Some(title) = slide.title {
            shapes.push_str(&format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{title}</a:t></a:r></a:p></p:txBody></p:sp>"#
            ));
        }
        for (k, &(x, y, cx, cy)) in slide.pictures.iter().enumerate() {
            image_no += 1;
            let r_id = k + 2;
            let shape_id = k + 3;
            add(
                &format!("ppt/media/image{image_no}.png"),
                &png_bytes(8 + image_no, 4),
            );
            rels.push((r_id, "image", format!("../media/image{image_no}.png")));
            shapes.push_str(&format!(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="{shape_id}" name="Picture {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId{r_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
                shape_id - 1
            ));
        }
        if let Some(notes) = slide.notes {
            overrides.push((
                format!("/ppt/notesSlides/notesSlide{n}.xml"),
                format!("{CT}.notesSlide+xml"),
            ));
            rels.push((rels.len() + 1, "notesSlide", format!("../notesSlides/notesSlide{n}.xml")));
            add(
                &format!("ppt/notesSlides/notesSlide{n}.xml"),
                format!(
                    r#"{DECL}<p:notes {NS}><p:cSld><p:spTree>{}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Notes Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{notes}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#,
                    group_props()
                )
                .as_bytes(),
            );
            add(
                &format!("ppt/notesSlides/_rels/notesSlide{n}.xml.rels"),
                rels_xml(&[(1, "slide", format!("../slides/slide{n}.xml"))]).as_bytes(),
            );
        }

        add(
            &format!("ppt/slides/slide{n}.xml"),
            format!(
                r#"{DECL}<p:sld {NS}><p:cSld><p:spTree>{}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                group_props()
            )
            .as_bytes(),
        );
        add(&format!("ppt/slides/_rels/slide{n}.xml.rels"), rels_xml(&rels).as_bytes());
    }

    add(
        "ppt/presentation.xml",
        format!(
            r#"{DECL}<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/>{}</p:presentation>"#,
            sections.map(section_ext).unwrap_or_default()
        )
        .as_bytes(),
    );
    add("ppt/_rels/presentation.xml.rels", rels_xml(&pres_rels).as_bytes());
    add(
        "ppt/slideMasters/slideMaster1.xml",
        format!(
            r#"{DECL}<p:sldMaster {NS}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
            group_props()
        )
        .as_bytes(),
    );
    add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels_xml(&[(1, "slideLayout", "../slideLayouts/slideLayout1.xml".to_string())]).as_bytes(),
    );
    add(
        "ppt/slideLayouts/slideLayout1.xml",
        format!(
            r#"{DECL}<p:sldLayout {NS} type="titleOnly"><p:cSld name="Title Only"><p:spTree>{}</p:spTree></p:cSld></p:sldLayout>"#,
            group_props()
        )
        .as_bytes(),
    );
    add(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        rels_xml(&[(1, "slideMaster", "../slideMasters/slideMaster1.xml".to_string())]).as_bytes(),
    );
    add(
        "_rels/.rels",
        rels_xml(&[(1, "officeDocument", "ppt/presentation.xml".to_string())]).as_bytes(),
    );

    let mut types = String::from(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#
    ));
    for (partname, content_type) in &overrides {
        types.push_str(&format!(
            r#"<Override PartName="{partname}" ContentType="{content_type}"/>"#
        ));
    }
    types.push_str("</Types>");
    add("[Content_Types].xml", format!("{DECL}{types}").as_bytes());

    zip.finish().unwrap().into_inner()
}

/// `p:extLst` carrying a `p14:sectionLst`, as PowerPoint writes it.
fn section_ext(sections: &[(&str, &[u32])]) -> String {
    let mut xml = String::from(concat!(
        r#"<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}">"#,
        r#"<p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main">"#
    ));
    for (i, (name, ids)) in sections.iter().enumerate() {
        xml.push_str(&format!(
            r#"<p14:section name="{name}" id="{{6C9A3B1E-0000-4000-8000-00000000000{i}}}"><p14:sldIdLst>"#
        ));
        for id in *ids {
            xml.push_str(&format!(r#"<p14:sldId id="{id}"/>"#));
        }
        xml.push_str("</p14:sldIdLst></p14:section>");
    }
    xml.push_str("</p14:sectionLst></p:ext></p:extLst>");
    xml
}

fn group_props() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
}

fn rels_xml(rels: &[(usize, &str, String)]) -> String {
    let mut xml = format!(
        r#"{DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    );
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{id}" Type="{RT}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}
