use base64::{Engine as _, engine::general_purpose::STANDARD};
use tally::{
    EngineError,
    request::{
        ClassInput, ContentPart, GradingRequest, InputSection, build_request, check_preconditions,
        decode_data_url, response_schema,
    },
};

const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn pixel() -> Vec<u8> {
    STANDARD.decode(PIXEL_PNG).expect("decode test png")
}

fn full_input() -> ClassInput {
    ClassInput::builder()
        .test_image(pixel())
        .marking_guide("Câu 1: 10 điểm")
        .sheet_data("Họ tên\tBài làm\nNguyễn Văn A\t42")
        .cam_visible_list("Nguyễn Văn A")
        .cam_hidden_list("")
        .praise_list("An")
        .build()
}

fn sections(request: &GradingRequest) -> Vec<InputSection> {
    request
        .parts()
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { section, .. } => Some(*section),
            ContentPart::Image { .. } => None,
        })
        .collect()
}

#[test]
fn image_comes_first_then_sections_in_order() {
    let request = build_request(&full_input()).expect("build request");
    let parts = request.parts();

    assert_eq!(parts.len(), 6);
    assert!(parts[0].is_image());
    assert!(parts[1..].iter().all(|p| !p.is_image()));
    assert_eq!(sections(&request), InputSection::ORDERED.to_vec());

    match &parts[0] {
        ContentPart::Image { mime_type, .. } => assert_eq!(*mime_type, "image/png"),
        other => panic!("expected image part, got {other:?}"),
    }
    let url = parts[0].data_url().expect("image has a data url");
    assert!(url.starts_with("data:image/png;base64,"));
}

#[test]
fn text_parts_carry_their_prefix() {
    let request = build_request(&full_input()).expect("build request");

    let ContentPart::Text { text, .. } = &request.parts()[2] else {
        panic!("expected the sheet section");
    };
    assert!(text.starts_with("--- DỮ LIỆU ĐẦU VÀO ---\n"));
    assert!(text.ends_with("Nguyễn Văn A\t42"));

    let ContentPart::Text { text, .. } = &request.parts()[5] else {
        panic!("expected the praise section");
    };
    assert_eq!(text, "Danh sách Khen tương tác (+1đ): An");
}

#[test]
fn image_part_is_omitted_when_absent() {
    let input = ClassInput::builder().sheet_data("row").build();
    let request = GradingRequest::from_input(&input).expect("assemble without image");

    assert_eq!(request.parts().len(), 5);
    assert!(request.parts().iter().all(|p| !p.is_image()));
    assert_eq!(sections(&request), InputSection::ORDERED.to_vec());
}

#[test]
fn empty_sections_are_still_sent() {
    let input = ClassInput::builder()
        .test_image(pixel())
        .sheet_data("row")
        .build();
    let request = build_request(&input).expect("build request");

    let ContentPart::Text { text, .. } = &request.parts()[3] else {
        panic!("expected the camera-visible section");
    };
    assert_eq!(text, InputSection::CamVisible.prefix());
}

#[test]
fn missing_image_or_sheet_is_rejected() {
    let no_image = ClassInput::builder().sheet_data("row").build();
    let err = build_request(&no_image).expect_err("image is required");
    assert!(matches!(err, EngineError::PreconditionFailed(_)));
    assert!(err.is_local());
    assert!(err.to_string().contains("test image"));

    let blank_sheet = ClassInput::builder()
        .test_image(pixel())
        .sheet_data("   \n")
        .build();
    let err = check_preconditions(&blank_sheet).expect_err("sheet is required");
    assert!(err.to_string().contains("sheet data"));
    assert!(!err.to_string().contains("test image"));

    let err = check_preconditions(&ClassInput::default()).expect_err("both missing");
    assert!(err.to_string().contains("test image and sheet data"));
}

#[test]
fn undecodable_image_is_a_precondition_failure() {
    let input = ClassInput::builder()
        .test_image(b"definitely not an image".to_vec())
        .sheet_data("row")
        .build();

    let err = build_request(&input).expect_err("garbage image");
    assert!(matches!(err, EngineError::PreconditionFailed(_)));
}

#[test]
fn data_urls_decode_with_or_without_header() {
    let with_header = decode_data_url(&format!("data:image/png;base64,{PIXEL_PNG}"))
        .expect("decode data url");
    let bare = decode_data_url(PIXEL_PNG).expect("decode bare payload");

    assert_eq!(with_header, pixel());
    assert_eq!(bare, pixel());
    assert!(decode_data_url("data:text/plain,hello").is_err());
}

#[test]
fn schema_requires_the_report_fields() {
    let schema = response_schema();

    assert_eq!(schema["required"], serde_json::json!(["answerKey", "results"]));
    let row = &schema["properties"]["results"]["items"];
    assert_eq!(row["required"].as_array().map(Vec::len), Some(7));
    assert_eq!(row["properties"]["feedback"]["minItems"], 5);
}
