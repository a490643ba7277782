use outreach_core::{
    update, AppState, DraftField, EmailDraft, Effect, GenerationRequest, JobSnapshot, LlmProvider,
    Msg, Phase, PhaseStatus, ResearchResult, ValidationError,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    outreach_logging::initialize_for_tests();
}

fn research_done(urls: &[String]) -> AppState {
    let (state, _) = update(AppState::new(), Msg::KeywordChanged("ai writers".to_string()));
    let (state, _) = update(state, Msg::ResearchSubmitted);
    let (state, _) = update(
        state,
        Msg::JobStarted {
            phase: Phase::Research,
            job_id: "r1".to_string(),
        },
    );
    let rows = urls
        .iter()
        .enumerate()
        .map(|(i, url)| ResearchResult {
            url: url.clone(),
            domain: "example.com".to_string(),
            title: "T".to_string(),
            contact_email: format!("editor@site{i}.example.com"),
            ..ResearchResult::default()
        })
        .collect();
    let (state, _) = update(
        state,
        Msg::ResearchPolled {
            job_id: "r1".to_string(),
            snapshot: JobSnapshot::done(rows),
        },
    );
    state
}

fn urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://site{i}.example.com"))
        .collect()
}

fn select(state: AppState, urls: &[String]) -> AppState {
    urls.iter().fold(state, |state, url| {
        update(state, Msg::UrlToggled(url.clone())).0
    })
}

fn draft(to_email: &str) -> EmailDraft {
    EmailDraft {
        to_email: to_email.to_string(),
        subject: "Guest post collaboration".to_string(),
        body: "Hello".to_string(),
        ..EmailDraft::default()
    }
}

fn generation_done(drafts: Vec<EmailDraft>) -> AppState {
    let all = urls(1);
    let state = select(research_done(&all), &all);
    let (state, _) = update(state, Msg::GenerationSubmitted);
    let (state, _) = update(
        state,
        Msg::JobStarted {
            phase: Phase::Generation,
            job_id: "g1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::GenerationPolled {
            job_id: "g1".to_string(),
            snapshot: JobSnapshot::done(drafts),
        },
    );
    state
}

#[test]
fn generation_accepted_iff_selection_between_1_and_100() {
    init_logging();
    let all = urls(101);

    for count in [0usize, 1, 50, 100, 101] {
        let state = select(research_done(&all), &all[..count]);
        let (state, effects) = update(state, Msg::GenerationSubmitted);

        if (1..=100).contains(&count) {
            assert_eq!(effects.len(), 1, "count {count} should start");
            assert_eq!(state.generation().status(), PhaseStatus::Starting);
        } else {
            assert!(effects.is_empty(), "count {count} should be rejected");
            assert_eq!(state.generation().status(), PhaseStatus::Idle);
            assert_eq!(
                state.generation().validation_error(),
                Some(&ValidationError::SelectionOutOfRange(count))
            );
        }
    }
}

#[test]
fn generation_request_threads_research_job_and_selected_urls() {
    init_logging();
    let all = urls(3);
    let state = select(research_done(&all), &[all[2].clone(), all[0].clone()]);
    let (state, _) = update(state, Msg::TakeChanged(2));
    let (state, _) = update(state, Msg::LlmProviderChanged(LlmProvider::Openai));
    let (state, _) = update(state, Msg::YourNameChanged("  Ada ".to_string()));
    let (_state, effects) = update(state, Msg::GenerationSubmitted);

    assert_eq!(
        effects,
        vec![Effect::StartGeneration(GenerationRequest {
            research_job_id: "r1".to_string(),
            selected_urls: vec![all[0].clone(), all[2].clone()],
            subject: "Guest post collaboration".to_string(),
            take: 2,
            provider: LlmProvider::Openai,
            model: None,
            your_name: Some("Ada".to_string()),
            your_email: None,
        })]
    );
}

#[test]
fn selected_rows_without_valid_contact_email_reject_generation() {
    init_logging();
    let all = urls(2);
    let state = research_done(&all);
    let state = all.iter().fold(state, |state, url| {
        update(
            state,
            Msg::ContactEmailEdited {
                url: url.clone(),
                email: String::new(),
            },
        )
        .0
    });
    let (state, _) = update(
        state,
        Msg::ContactEmailEdited {
            url: all[1].clone(),
            email: "not-an-email".to_string(),
        },
    );
    let state = select(state, &all);
    let (state, effects) = update(state, Msg::GenerationSubmitted);

    assert!(effects.is_empty());
    assert_eq!(state.generation().status(), PhaseStatus::Idle);
    assert_eq!(
        state.generation().validation_error(),
        Some(&ValidationError::NoContactEmails)
    );
    assert!(!state.view().can_start_generation);
}

#[test]
fn contact_email_edits_decide_which_urls_are_sent() {
    init_logging();
    let all = urls(3);
    let state = research_done(&all);
    let (state, _) = update(
        state,
        Msg::ContactEmailEdited {
            url: all[0].clone(),
            email: " ".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::ContactEmailEdited {
            url: all[2].clone(),
            email: "broken@".to_string(),
        },
    );
    let state = select(state, &all);
    let (state, effects) = update(state, Msg::GenerationSubmitted);

    let [Effect::StartGeneration(request)] = effects.as_slice() else {
        panic!("expected a single StartGeneration effect");
    };
    assert_eq!(request.selected_urls, vec![all[1].clone()]);

    // Fixing an address brings its row back into the request.
    let (state, _) = update(
        state,
        Msg::JobStartFailed {
            phase: Phase::Generation,
            error: "Bad Gateway (502): down".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::ContactEmailEdited {
            url: all[2].clone(),
            email: "editor@site2.example.com".to_string(),
        },
    );
    let (_state, effects) = update(state, Msg::GenerationSubmitted);

    let [Effect::StartGeneration(request)] = effects.as_slice() else {
        panic!("expected a single StartGeneration effect");
    };
    assert_eq!(request.selected_urls, vec![all[1].clone(), all[2].clone()]);
}

#[test]
fn generation_requires_research_done() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::GenerationSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.generation().validation_error(),
        Some(&ValidationError::ResearchNotDone)
    );
}

#[test]
fn subject_and_take_bounds_reject_start() {
    init_logging();
    let all = urls(1);
    let cases = [
        ("Hi".to_string(), 5, ValidationError::SubjectLength(2)),
        ("x".repeat(121), 5, ValidationError::SubjectLength(121)),
        ("Guest post".to_string(), 0, ValidationError::TakeOutOfRange(0)),
    ];

    for (subject, take, expected) in cases {
        let state = select(research_done(&all), &all);
        let (state, _) = update(state, Msg::SubjectChanged(subject));
        let (state, _) = update(state, Msg::TakeChanged(take));
        let (state, effects) = update(state, Msg::GenerationSubmitted);

        assert!(effects.is_empty());
        assert_eq!(state.generation().validation_error(), Some(&expected));
        assert!(!state.view().can_start_generation);
    }
}

#[test]
fn invalid_sender_email_rejects_generation() {
    init_logging();
    let all = urls(1);
    let state = select(research_done(&all), &all);
    let (state, _) = update(state, Msg::YourEmailChanged("me-at-x".to_string()));
    let (state, effects) = update(state, Msg::GenerationSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.generation().validation_error(),
        Some(&ValidationError::InvalidEmail("me-at-x".to_string()))
    );
}

#[test]
fn draft_edit_changes_exactly_one_field_of_one_row() {
    init_logging();
    let drafts = vec![draft("a@example.com"), draft("b@example.com"), draft("")];
    let state = generation_done(drafts.clone());

    let (state, _) = update(
        state,
        Msg::DraftEdited {
            index: 1,
            field: DraftField::ToEmail,
            value: "editor@example.com".to_string(),
        },
    );

    let mut expected = drafts;
    expected[1].to_email = "editor@example.com".to_string();
    assert_eq!(state.generation().results(), expected.as_slice());

    let (state, _) = update(
        state,
        Msg::DraftEdited {
            index: 2,
            field: DraftField::Body,
            value: "Rewritten".to_string(),
        },
    );
    expected[2].body = "Rewritten".to_string();
    assert_eq!(state.generation().results(), expected.as_slice());

    // Out of range edits are ignored.
    let (mut state, _) = update(
        state,
        Msg::DraftEdited {
            index: 9,
            field: DraftField::Subject,
            value: "x".to_string(),
        },
    );
    state.consume_dirty();
    assert_eq!(state.generation().results(), expected.as_slice());
}

#[test]
fn generation_error_keeps_research_results() {
    init_logging();
    let all = urls(1);
    let state = select(research_done(&all), &all);
    let (state, _) = update(state, Msg::GenerationSubmitted);
    let (state, _) = update(
        state,
        Msg::JobStarted {
            phase: Phase::Generation,
            job_id: "g1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::GenerationPolled {
            job_id: "g1".to_string(),
            snapshot: JobSnapshot::failed("missing GEMINI_API_KEY"),
        },
    );

    assert_eq!(state.generation().status(), PhaseStatus::Failed);
    assert_eq!(state.generation().error(), Some("missing GEMINI_API_KEY"));
    assert_eq!(state.research().status(), PhaseStatus::Done);
    assert_eq!(state.research().results().len(), 1);
    assert_eq!(state.view().selected_count, 1);
}
