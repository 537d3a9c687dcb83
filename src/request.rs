#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assembles the multimodal grading request.
//!
//! The engine's instructions refer to "the image" and "the data that
//! follows", so the image always comes first and the text sections keep a
//! fixed order.

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bon::Builder;
use image::ImageFormat;
use serde_json::{Value, json};

use crate::error::EngineError;

/// Everything the instructor supplies for one grading run.
#[derive(Debug, Clone, Default, Builder)]
#[builder(on(String, into))]
pub struct ClassInput {
    /// Photographed test sheet.
    pub(crate) test_image:       Option<Vec<u8>>,
    /// Rubric text.
    #[builder(default)]
    pub(crate) marking_guide:    String,
    /// Pasted or fetched submission rows.
    #[builder(default)]
    pub(crate) sheet_data:       String,
    /// Students whose camera showed their work.
    #[builder(default)]
    pub(crate) cam_visible_list: String,
    /// Students whose camera was off.
    #[builder(default)]
    pub(crate) cam_hidden_list:  String,
    /// Students earning the participation bonus.
    #[builder(default)]
    pub(crate) praise_list:      String,
}

impl ClassInput {
    /// Photographed test sheet, if any.
    pub fn test_image(&self) -> Option<&[u8]> {
        self.test_image.as_deref()
    }

    /// Rubric text.
    pub fn marking_guide(&self) -> &str {
        &self.marking_guide
    }

    /// Submission rows.
    pub fn sheet_data(&self) -> &str {
        &self.sheet_data
    }

    /// Camera-visible roster.
    pub fn cam_visible_list(&self) -> &str {
        &self.cam_visible_list
    }

    /// Camera-hidden roster.
    pub fn cam_hidden_list(&self) -> &str {
        &self.cam_hidden_list
    }

    /// Praise roster.
    pub fn praise_list(&self) -> &str {
        &self.praise_list
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URL into raw bytes.
///
/// A bare base64 payload without the `data:` header is accepted as well.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = match url.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => {
            if !header.ends_with(";base64") {
                return Err(anyhow!("Only base64 data URLs are supported, got `{header}`"));
            }
            payload
        }
        _ => url,
    };
    STANDARD
        .decode(payload.trim())
        .context("Image data URL does not contain valid base64")
}

/// Text sections of the request, in the order they are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSection {
    /// Rubric.
    MarkingGuide,
    /// Submission rows.
    SheetData,
    /// Camera-visible roster.
    CamVisible,
    /// Camera-hidden roster.
    CamHidden,
    /// Praise roster.
    Praise,
}

impl InputSection {
    /// All sections in request order.
    pub const ORDERED: [InputSection; 5] = [
        InputSection::MarkingGuide,
        InputSection::SheetData,
        InputSection::CamVisible,
        InputSection::CamHidden,
        InputSection::Praise,
    ];

    /// Label the section's text is prefixed with.
    pub fn prefix(&self) -> &'static str {
        match self {
            InputSection::MarkingGuide => "BIỂU MẪU CHẤM ĐIỂM CHI TIẾT: ",
            InputSection::SheetData => "--- DỮ LIỆU ĐẦU VÀO ---\nDữ liệu Sheet (TSV/CSV): ",
            InputSection::CamVisible => "Danh sách Bật Cam (Rõ): ",
            InputSection::CamHidden => "Danh sách Không Bật Cam: ",
            InputSection::Praise => "Danh sách Khen tương tác (+1đ): ",
        }
    }

    /// Raw text of this section in `input`.
    fn source<'a>(&self, input: &'a ClassInput) -> &'a str {
        match self {
            InputSection::MarkingGuide => input.marking_guide(),
            InputSection::SheetData => input.sheet_data(),
            InputSection::CamVisible => input.cam_visible_list(),
            InputSection::CamHidden => input.cam_hidden_list(),
            InputSection::Praise => input.praise_list(),
        }
    }
}

/// One element of the multimodal request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Inline image.
    Image {
        /// Detected MIME type.
        mime_type: &'static str,
        /// Raw image bytes.
        data:      Vec<u8>,
    },
    /// Labelled text section.
    Text {
        /// Which input the text came from.
        section: InputSection,
        /// Prefixed text as sent.
        text:    String,
    },
}

impl ContentPart {
    /// Inline `data:` URL for an image part.
    pub fn data_url(&self) -> Option<String> {
        match self {
            ContentPart::Image { mime_type, data } => {
                Some(format!("data:{mime_type};base64,{}", STANDARD.encode(data)))
            }
            ContentPart::Text { .. } => None,
        }
    }

    /// Whether this is the image part.
    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::Image { .. })
    }
}

/// Ordered parts ready for the engine adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingRequest {
    /// Image first when present, then the five text sections.
    parts: Vec<ContentPart>,
}

impl GradingRequest {
    /// Assembles parts without checking preconditions.
    ///
    /// The image part is left out entirely when no image was supplied.
    pub fn from_input(input: &ClassInput) -> Result<Self, EngineError> {
        let mut parts = Vec::with_capacity(InputSection::ORDERED.len() + 1);

        if let Some(data) = input.test_image() {
            let mime_type = sniff_image(data)?;
            parts.push(ContentPart::Image {
                mime_type,
                data: data.to_vec(),
            });
        }

        parts.extend(InputSection::ORDERED.iter().map(|section| ContentPart::Text {
            section: *section,
            text:    format!("{}{}", section.prefix(), section.source(input)),
        }));

        Ok(Self { parts })
    }

    /// All parts in send order.
    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    /// Consumes the request, returning its parts.
    pub fn into_parts(self) -> Vec<ContentPart> {
        self.parts
    }
}

/// Fails when the inputs required for grading are missing.
pub fn check_preconditions(input: &ClassInput) -> Result<(), EngineError> {
    let mut missing = Vec::new();
    if input.test_image().is_none_or(<[u8]>::is_empty) {
        missing.push("test image");
    }
    if input.sheet_data().trim().is_empty() {
        missing.push("sheet data");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EngineError::PreconditionFailed(format!(
            "missing {}; upload the test image and paste the sheet rows first",
            missing.join(" and ")
        )))
    }
}

/// Checks preconditions and assembles the request.
pub fn build_request(input: &ClassInput) -> Result<GradingRequest, EngineError> {
    check_preconditions(input)?;
    GradingRequest::from_input(input)
}

/// Detects the image format and confirms the bytes decode.
fn sniff_image(data: &[u8]) -> Result<&'static str, EngineError> {
    let format = image::guess_format(data).map_err(|e| {
        EngineError::PreconditionFailed(format!("test image is not a recognised format: {e}"))
    })?;
    image::load_from_memory_with_format(data, format).map_err(|e| {
        EngineError::PreconditionFailed(format!("test image could not be decoded: {e}"))
    })?;

    Ok(match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    })
}

/// JSON schema the engine's reply must follow.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "answerKey": {
                "type": "string",
                "description": "Lời giải chi tiết cho đề bài."
            },
            "validationWarnings": {
                "type": "array",
                "items": { "type": "string" }
            },
            "results": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "studentName": { "type": "string" },
                        "firstName": { "type": "string" },
                        "studentAnswer": { "type": "string" },
                        "submissionTime": { "type": "string" },
                        "score": { "type": "integer", "minimum": 0, "maximum": 10 },
                        "rank": { "type": "string" },
                        "feedback": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 5,
                            "maxItems": 5,
                            "description": "Đúng 5 câu nhận xét theo thứ tự: kết quả, hành động, camera, tương tác, lời chúc."
                        }
                    },
                    "required": [
                        "studentName",
                        "firstName",
                        "studentAnswer",
                        "submissionTime",
                        "score",
                        "rank",
                        "feedback"
                    ]
                }
            }
        },
        "required": ["answerKey", "results"]
    })
}
