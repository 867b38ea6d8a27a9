use std::path::Path;

use super::mock::MockTranscriber;
use crate::transcription::{transcribe_reference, Transcription, RECOGNITION_FAILED};

#[tokio::test]
async fn test_no_audio_gives_empty_text() {
    let transcriber = MockTranscriber::returning("unused");

    let result = transcribe_reference(&transcriber, None).await;

    assert_eq!(result, Transcription::Text(String::new()));
    assert_eq!(transcriber.call_count(), 0);
}

#[tokio::test]
async fn test_text_is_trimmed() {
    let transcriber = MockTranscriber::returning("  今天天气很好。 \n");

    let result = transcribe_reference(&transcriber, Some(Path::new("ref.wav"))).await;

    assert_eq!(result.text(), Some("今天天气很好。"));
    assert!(!result.is_failed());
}

#[tokio::test]
async fn test_failure_is_typed() {
    let transcriber = MockTranscriber::failing("model download failed");

    let result = transcribe_reference(&transcriber, Some(Path::new("ref.wav"))).await;

    assert!(result.is_failed());
    assert_eq!(result.text(), None);
    assert_eq!(result.display_text(), RECOGNITION_FAILED);
    match result {
        Transcription::Failed(reason) => assert!(reason.contains("model download failed")),
        other => panic!("unexpected result: {:?}", other),
    }
}
