//! The edit adapter: request assembly, the model call, response decoding.

use crate::config::Config;
use crate::edit::transport::{ContentGenerator, HttpGenerator};
use crate::edit::types::{EditRequest, EditResult, ImagePayload, DEFAULT_RESULT_MIME_TYPE};
use crate::edit::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, RequestSegment,
    ResponseSegment,
};
use crate::error::{EditError, Result};
use std::time::Instant;

/// Edits images through a multimodal generation model.
///
/// Holds no mutable state; one adapter can serve concurrent edits.
pub struct EditAdapter<G = HttpGenerator> {
    generator: G,
    model: String,
}

impl EditAdapter<HttpGenerator> {
    /// Creates an adapter that talks to the Gemini API.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_generator(
            HttpGenerator::new(config)?,
            config.model(),
        ))
    }
}

impl<G: ContentGenerator> EditAdapter<G> {
    /// Creates an adapter over any [`ContentGenerator`].
    pub fn with_generator(generator: G, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// The model identifier edits are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Applies `request.instruction` to `request.source`.
    ///
    /// Makes exactly one call to the model, with no retry. The result is the
    /// first inline image in the response.
    pub async fn edit(&self, request: &EditRequest) -> Result<EditResult> {
        request.validate()?;

        let start = Instant::now();
        let body = build_request(request);

        tracing::debug!(
            model = %self.model,
            segments = body.contents[0].parts.len(),
            has_reference = request.reference().is_some(),
            "submitting image edit request"
        );

        let response = self.generator.generate_content(&self.model, &body).await?;

        match decode_response(response) {
            Ok(result) => {
                tracing::debug!(
                    mime_type = %result.mime_type,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "image edit complete"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(model = %self.model, "image edit produced no image: {e}");
                Err(e)
            }
        }
    }

    /// Convenience wrapper that builds the [`EditRequest`] and calls [`edit`](Self::edit).
    pub async fn edit_image(
        &self,
        source: ImagePayload,
        instruction: impl Into<String>,
        reference: Option<ImagePayload>,
    ) -> Result<EditResult> {
        let mut request = EditRequest::new(source, instruction);
        if let Some(reference) = reference {
            request = request.with_reference(reference);
        }
        self.edit(&request).await
    }

    /// Checks that the configured model is reachable and authenticated.
    pub async fn health_check(&self) -> Result<()> {
        self.generator.check_model(&self.model).await
    }
}

/// Builds the wire request: source image, then reference, then instruction.
pub(crate) fn build_request(request: &EditRequest) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(3);

    parts.push(image_segment(request.source()));
    if let Some(reference) = request.reference() {
        parts.push(image_segment(reference));
    }
    parts.push(RequestSegment::text(request.instruction()));

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig::default(),
    }
}

fn image_segment(payload: &ImagePayload) -> RequestSegment {
    RequestSegment::image(payload.content_type(), payload.base64_data())
}

/// Extracts the first inline image from the first candidate.
pub(crate) fn decode_response(response: GenerateContentResponse) -> Result<EditResult> {
    let block_reason = response.prompt_feedback.and_then(|feedback| {
        feedback
            .block_reason_message
            .or_else(|| feedback.block_reason.map(|r| format!("prompt blocked: {r}")))
    });

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(EditError::NoContent {
            detail: block_reason,
        });
    };

    let parts = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default();
    if parts.is_empty() {
        return Err(EditError::NoContent {
            detail: block_reason.or_else(|| {
                candidate
                    .finish_reason
                    .map(|reason| format!("finish reason: {reason}"))
            }),
        });
    }

    let image = parts.iter().find_map(|segment| match segment {
        ResponseSegment::InlineBinary { data, mime_type } if !data.trim().is_empty() => {
            Some((data, mime_type))
        }
        _ => None,
    });

    match image {
        Some((data, mime_type)) => {
            let mime_type = mime_type.as_deref().unwrap_or(DEFAULT_RESULT_MIME_TYPE);
            Ok(EditResult::new(mime_type, data))
        }
        None => {
            let text: Vec<&str> = parts
                .iter()
                .filter_map(|segment| match segment {
                    ResponseSegment::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            Err(EditError::NoImageProduced {
                model_text: (!text.is_empty()).then(|| text.join("\n")),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::wire::{Candidate, CandidateContent, PromptFeedback};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns a canned response and records every request it sees.
    struct StubGenerator {
        response: Mutex<Option<Result<GenerateContentResponse>>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<GenerateContentRequest>>,
        last_model: Mutex<Option<String>>,
    }

    impl StubGenerator {
        fn returning(response: GenerateContentResponse) -> Self {
            Self::with_result(Ok(response))
        }

        fn with_result(result: Result<GenerateContentResponse>) -> Self {
            Self {
                response: Mutex::new(Some(result)),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                last_model: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn sent_parts(&self) -> Vec<RequestSegment> {
            self.last_request.lock().unwrap().as_ref().unwrap().contents[0]
                .parts
                .clone()
        }
    }

    #[async_trait]
    impl ContentGenerator for StubGenerator {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_model.lock().unwrap() = Some(model.to_string());
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(GenerateContentResponse::default()))
        }

        async fn check_model(&self, _model: &str) -> Result<()> {
            Ok(())
        }
    }

    fn response_with(parts: Vec<ResponseSegment>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(CandidateContent { parts }),
                finish_reason: Some("STOP".into()),
            }],
            prompt_feedback: None,
        }
    }

    fn image_response(data: &str, mime_type: Option<&str>) -> GenerateContentResponse {
        response_with(vec![inline(data, mime_type)])
    }

    fn inline(data: &str, mime_type: Option<&str>) -> ResponseSegment {
        ResponseSegment::InlineBinary {
            data: data.into(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    fn adapter(stub: StubGenerator) -> EditAdapter<StubGenerator> {
        EditAdapter::with_generator(stub, "gemini-2.5-flash-image")
    }

    fn source() -> ImagePayload {
        ImagePayload::new("SOURCEDATA", "image/jpeg")
    }

    #[tokio::test]
    async fn test_segments_with_reference_are_source_reference_text() {
        let adapter = adapter(StubGenerator::returning(image_response("OUT", None)));
        let request = EditRequest::new(source(), "wear this jersey")
            .with_reference(ImagePayload::new("REFDATA", "image/png"));

        let result = adapter.edit(&request).await.unwrap();
        assert_eq!(result.image_data, "data:image/png;base64,OUT");

        assert_eq!(
            adapter.generator.sent_parts(),
            vec![
                RequestSegment::image("image/jpeg", "SOURCEDATA"),
                RequestSegment::image("image/png", "REFDATA"),
                RequestSegment::text("wear this jersey"),
            ]
        );
        assert_eq!(
            adapter.generator.last_model.lock().unwrap().as_deref(),
            Some("gemini-2.5-flash-image")
        );
    }

    #[tokio::test]
    async fn test_segments_without_reference_are_source_text() {
        let adapter = adapter(StubGenerator::returning(image_response("OUT", None)));

        let result = adapter
            .edit_image(source(), "make the shirt neon green", None)
            .await
            .unwrap();
        assert_eq!(result.image_data, "data:image/png;base64,OUT");

        assert_eq!(
            adapter.generator.sent_parts(),
            vec![
                RequestSegment::image("image/jpeg", "SOURCEDATA"),
                RequestSegment::text("make the shirt neon green"),
            ]
        );
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let raw = EditRequest::new(ImagePayload::new("SOURCEDATA", "image/jpeg"), "x")
            .with_reference(ImagePayload::new("REFDATA", "image/png"));
        let wrapped = EditRequest::new(
            ImagePayload::new("data:image/jpeg;base64,SOURCEDATA", "image/jpeg"),
            "x",
        )
        .with_reference(ImagePayload::new("data:image/png;base64,REFDATA", "image/png"));

        assert_eq!(
            build_request(&raw).contents[0].parts,
            build_request(&wrapped).contents[0].parts
        );
    }

    #[tokio::test]
    async fn test_first_inline_image_wins() {
        let adapter = adapter(StubGenerator::returning(response_with(vec![
            ResponseSegment::Text("Here you go".into()),
            inline("AAAA", Some("image/png")),
            inline("BBBB", Some("image/jpeg")),
            ResponseSegment::Text("Enjoy!".into()),
        ])));

        let result = adapter.edit_image(source(), "edit", None).await.unwrap();

        assert_eq!(result.image_data, "data:image/png;base64,AAAA");
        assert_eq!(result.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_other_segments_are_skipped() {
        let adapter = adapter(StubGenerator::returning(response_with(vec![
            ResponseSegment::Other,
            inline("AAAA", Some("image/webp")),
        ])));

        let result = adapter.edit_image(source(), "edit", None).await.unwrap();

        assert_eq!(result.image_data, "data:image/webp;base64,AAAA");
    }

    #[tokio::test]
    async fn test_inline_segment_without_bytes_is_not_an_image() {
        let adapter = adapter(StubGenerator::returning(response_with(vec![
            inline("", Some("image/png")),
            inline("BBBB", Some("image/jpeg")),
        ])));

        let result = adapter.edit_image(source(), "edit", None).await.unwrap();

        assert_eq!(result.image_data, "data:image/jpeg;base64,BBBB");
    }

    #[test]
    fn test_response_with_only_empty_inline_data_is_no_image_produced() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png"}}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            decode_response(response),
            Err(EditError::NoImageProduced { .. })
        ));

        assert!(matches!(
            decode_response(response_with(vec![inline(" ", None)])),
            Err(EditError::NoImageProduced { model_text: None })
        ));
    }

    #[tokio::test]
    async fn test_missing_mime_type_defaults_to_png() {
        let adapter = adapter(StubGenerator::returning(image_response("AAAA", None)));

        let result = adapter.edit_image(source(), "edit", None).await.unwrap();

        assert_eq!(result.mime_type, "image/png");
        assert_eq!(result.image_data, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn test_reported_mime_type_is_kept() {
        let adapter = adapter(StubGenerator::returning(image_response("/9j/", Some("image/jpeg"))));

        let result = adapter.edit_image(source(), "edit", None).await.unwrap();

        assert_eq!(
            result,
            EditResult {
                image_data: "data:image/jpeg;base64,/9j/".into(),
                mime_type: "image/jpeg".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_text_only_response_is_no_image_produced() {
        let stub = StubGenerator::returning(response_with(vec![ResponseSegment::Text(
            "I can't edit photos of real people in that way.".into(),
        )]));
        let adapter = adapter(stub);

        let err = adapter.edit_image(source(), "edit", None).await.unwrap_err();

        match err {
            EditError::NoImageProduced { ref model_text } => {
                assert_eq!(
                    model_text.as_deref(),
                    Some("I can't edit photos of real people in that way.")
                );
            }
            other => panic!("expected NoImageProduced, got {other:?}"),
        }
        assert!(err.to_string().contains("did not return an image"));
    }

    #[tokio::test]
    async fn test_empty_response_is_no_content() {
        for response in [
            GenerateContentResponse::default(),
            GenerateContentResponse {
                candidates: vec![Candidate::default()],
                prompt_feedback: None,
            },
            response_with(vec![]),
        ] {
            let adapter = adapter(StubGenerator::returning(response));
            let err = adapter.edit_image(source(), "edit", None).await.unwrap_err();
            assert!(
                matches!(err, EditError::NoContent { .. }),
                "expected NoContent, got {err:?}"
            );
        }
    }

    #[test]
    fn test_no_content_carries_block_reason() {
        let response = GenerateContentResponse {
            candidates: vec![],
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".into()),
                block_reason_message: None,
            }),
        };
        match decode_response(response) {
            Err(EditError::NoContent { detail }) => {
                assert_eq!(detail.as_deref(), Some("prompt blocked: SAFETY"));
            }
            other => panic!("expected NoContent, got {other:?}"),
        }

        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("IMAGE_SAFETY".into()),
            }],
            prompt_feedback: None,
        };
        match decode_response(response) {
            Err(EditError::NoContent { detail }) => {
                assert_eq!(detail.as_deref(), Some("finish reason: IMAGE_SAFETY"));
            }
            other => panic!("expected NoContent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_instruction_makes_no_call() {
        let adapter = adapter(StubGenerator::returning(image_response("AAAA", None)));

        let err = adapter.edit_image(source(), "", None).await.unwrap_err();

        assert!(matches!(err, EditError::InvalidInput(_)));
        assert_eq!(adapter.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_makes_no_call() {
        let adapter = adapter(StubGenerator::returning(image_response("AAAA", None)));

        let err = adapter
            .edit_image(ImagePayload::new("", "image/png"), "edit", None)
            .await
            .unwrap_err();

        assert!(matches!(err, EditError::InvalidInput(_)));
        assert_eq!(adapter.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let adapter = adapter(StubGenerator::with_result(Err(EditError::Api {
            status: 503,
            message: "overloaded".into(),
        })));

        let err = adapter.edit_image(source(), "edit", None).await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(adapter.generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_identical_requests_are_resent() {
        let adapter = adapter(StubGenerator::returning(image_response("AAAA", None)));
        let request = EditRequest::new(source(), "edit");

        let first = adapter.edit(&request).await.unwrap();
        assert_eq!(first.mime_type, "image/png");
        // The stub has no second canned response; the empty default comes back.
        let err = adapter.edit(&request).await.unwrap_err();

        assert!(matches!(err, EditError::NoContent { .. }));
        assert_eq!(adapter.generator.calls(), 2);
    }
}
