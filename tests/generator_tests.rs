
use quizcraft::clients::MockResponse;
use quizcraft::interceptors::FileInterceptor;
use quizcraft::{parse_quiz, AIError, GenerationFailure, OPTION_COUNT, QUESTION_COUNT};
use serde_json::json;
use std::sync::Arc;
use test_utils::{correct_option, fenced, mock_generator, quiz_json, quiz_json_with, TOPIC};

#[tokio::test]
async fn fenced_json_with_ten_questions_succeeds() {
    let raw = fenced(&serde_json::to_string_pretty(&quiz_json()).unwrap(), "json");
    let (generator, handle) = mock_generator(vec![MockResponse::text(raw)]);

    let quiz = generator.generate("Zelda").await.expect("quiz should be generated");

    assert_eq!(quiz.topic(), TOPIC);
    assert_eq!(quiz.questions().len(), QUESTION_COUNT);
    assert!(quiz.questions().iter().all(|q| q.options().len() == OPTION_COUNT));
    assert_eq!(quiz.questions()[3].correct_option(), correct_option(3));
    assert_eq!(handle.call_count(), 1);
}

#[tokio::test]
async fn prompt_carries_the_topic() {
    let (generator, handle) = mock_generator(vec![MockResponse::text(quiz_json().to_string())]);
    generator.generate("Stardew Valley").await.unwrap();

    let prompts = handle.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("\"Stardew Valley\""));
}

#[tokio::test]
async fn refusal_is_returned_verbatim() {
    let (generator, _) = mock_generator(vec![MockResponse::text(r#"{"error":"Futebol não é apropriado"}"#)]);

    let failure = generator.generate("Futebol").await.unwrap_err();

    assert!(matches!(&failure, GenerationFailure::Refused(m) if m == "Futebol não é apropriado"));
    assert_eq!(failure.reason(), "Futebol não é apropriado");
}

#[tokio::test]
async fn portuguese_refusal_key_is_honoured() {
    let raw = fenced(r#"{"erro": "O assunto 'Futebol' não é apropriado."}"#, "json");
    let (generator, _) = mock_generator(vec![MockResponse::text(raw)]);

    let failure = generator.generate("Futebol").await.unwrap_err();
    assert_eq!(failure.reason(), "O assunto 'Futebol' não é apropriado.");
}

#[test]
fn refusal_behind_a_glued_json_tag_is_recognised() {
    let failure = parse_quiz("```json{\"error\":\"Não é um jogo\"}```").unwrap_err();
    assert_eq!(failure.reason(), "Não é um jogo");

    let quiz = parse_quiz(&format!("```json{}```", quiz_json())).unwrap();
    assert_eq!(quiz.len(), QUESTION_COUNT);
}

#[tokio::test]
async fn unparsable_text_is_a_parse_failure() {
    let (generator, _) = mock_generator(vec![MockResponse::text("Sure! Here is your quiz about Zelda.")]);

    let failure = generator.generate("Zelda").await.unwrap_err();

    assert!(matches!(failure, GenerationFailure::Unparsable { .. }));
    assert!(failure.reason().starts_with("could not parse the generated quiz"));
}

#[tokio::test]
async fn transport_errors_are_not_retried() {
    let (generator, handle) = mock_generator(vec![
        MockResponse::error("connection reset"),
        MockResponse::text(quiz_json().to_string()),
    ]);

    let failure = generator.generate("Zelda").await.unwrap_err();

    assert!(matches!(&failure, GenerationFailure::Transport(AIError::Mock(m)) if m == "connection reset"));
    assert!(failure.reason().contains("connection reset"));
    assert_eq!(handle.call_count(), 1);
    assert_eq!(handle.remaining(), 1);
}

#[test]
fn wrong_question_count_is_invalid() {
    for count in [0, 9, 11] {
        let failure = parse_quiz(&quiz_json_with(count).to_string()).unwrap_err();
        assert!(matches!(failure, GenerationFailure::InvalidQuiz), "count {count}");
        assert_eq!(failure.reason(), "generation did not produce a valid quiz for this topic");
    }
}

#[test]
fn question_with_three_options_is_invalid() {
    let mut value = quiz_json();
    value["questions"][5]["options"] = json!(["a", "b", "c"]);
    let failure = parse_quiz(&value.to_string()).unwrap_err();
    assert!(matches!(failure, GenerationFailure::InvalidQuiz));
}

#[test]
fn missing_topic_or_questions_is_invalid() {
    let mut no_topic = quiz_json();
    no_topic.as_object_mut().unwrap().remove("topic");
    assert!(matches!(parse_quiz(&no_topic.to_string()), Err(GenerationFailure::InvalidQuiz)));

    let no_questions = json!({"topic": TOPIC});
    assert!(matches!(parse_quiz(&no_questions.to_string()), Err(GenerationFailure::InvalidQuiz)));

    let mut missing_field = quiz_json();
    missing_field["questions"][0].as_object_mut().unwrap().remove("correctOption");
    assert!(matches!(parse_quiz(&missing_field.to_string()), Err(GenerationFailure::InvalidQuiz)));
}

#[test]
fn non_object_json_is_invalid() {
    assert!(matches!(parse_quiz("[1, 2, 3]"), Err(GenerationFailure::InvalidQuiz)));
    assert!(matches!(parse_quiz("42"), Err(GenerationFailure::InvalidQuiz)));
}

#[test]
fn empty_error_field_falls_through_to_validation() {
    let mut value = quiz_json();
    value["error"] = json!("");
    assert!(parse_quiz(&value.to_string()).is_ok());
}

#[test]
fn correct_option_outside_options_is_trusted() {
    let mut value = quiz_json();
    value["questions"][0]["correctOption"] = json!("Not listed");
    let quiz = parse_quiz(&value.to_string()).unwrap();
    assert_eq!(quiz.questions()[0].correct_option(), "Not listed");
}

#[test]
fn portuguese_payload_keys_are_accepted() {
    let questions: Vec<_> = (0..10)
        .map(|i| {
            json!({
                "pergunta": format!("P{i}?"),
                "alternativas": ["a", "b", "c", "d"],
                "respostaCorreta": "c",
            })
        })
        .collect();
    let raw = json!({"assunto": "Minecraft", "perguntas": questions}).to_string();

    let quiz = parse_quiz(&raw).unwrap();
    assert_eq!(quiz.topic(), "Minecraft");
    assert_eq!(quiz.questions()[9].text(), "P9?");
}

#[tokio::test]
async fn streamed_generation_drains_before_parsing() {
    let raw = fenced(&quiz_json().to_string(), "json");
    let (generator, handle) = mock_generator(vec![MockResponse::text(raw)]);
    handle.set_chunk_size(5);
    let generator = generator.with_streaming(true);

    let quiz = generator.generate("Zelda").await.unwrap();
    assert_eq!(quiz.len(), QUESTION_COUNT);
}

#[tokio::test]
async fn streamed_transport_error_is_a_failure() {
    let (generator, _) = mock_generator(vec![MockResponse::error("stream dropped")]);
    let generator = generator.with_streaming(true);

    let failure = generator.generate("Zelda").await.unwrap_err();
    assert!(matches!(failure, GenerationFailure::Transport(AIError::Mock(_))));
}

#[tokio::test]
async fn transcript_is_written_for_each_generation() {
    let dir = std::env::temp_dir().join(format!("quizcraft-transcripts-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let (generator, _) = mock_generator(vec![MockResponse::text(r#"{"error":"não"}"#)]);
    let generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));

    assert!(generator.generate("Futebol").await.is_err());

    let files: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
    assert!(content.contains("# Topic\n\nFutebol"));
    assert!(content.contains(r#"{"error":"não"}"#));

    let _ = std::fs::remove_dir_all(&dir);
}
