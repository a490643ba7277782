use outreach_core::{
    update, AppState, EmailDraft, Effect, JobSnapshot, Msg, OutcomeRow, Phase, PhaseStatus,
    ResearchResult, SendOutcome, SendProvider, SendRequest, SendRow, ValidationError,
};
use pretty_assertions::assert_eq;

fn generation_done(drafts: Vec<EmailDraft>) -> AppState {
    let steps = vec![
        Msg::KeywordChanged("ai writers".to_string()),
        Msg::ResearchSubmitted,
        Msg::JobStarted {
            phase: Phase::Research,
            job_id: "r1".to_string(),
        },
        Msg::ResearchPolled {
            job_id: "r1".to_string(),
            snapshot: JobSnapshot::done(vec![ResearchResult {
                url: "https://example.com".to_string(),
                domain: "example.com".to_string(),
                title: "T".to_string(),
                contact_email: "editor@example.com".to_string(),
                ..ResearchResult::default()
            }]),
        },
        Msg::UrlToggled("https://example.com".to_string()),
        Msg::GenerationSubmitted,
        Msg::JobStarted {
            phase: Phase::Generation,
            job_id: "g1".to_string(),
        },
        Msg::GenerationPolled {
            job_id: "g1".to_string(),
            snapshot: JobSnapshot::done(drafts),
        },
    ];
    steps
        .into_iter()
        .fold(AppState::new(), |state, msg| update(state, msg).0)
}

fn draft(to_email: &str, subject: &str) -> EmailDraft {
    EmailDraft {
        to_email: to_email.to_string(),
        subject: subject.to_string(),
        body: format!("Body for {subject}"),
        ..EmailDraft::default()
    }
}

#[test]
fn send_rejected_when_no_draft_has_a_recipient() {
    outreach_logging::initialize_for_tests();
    let state = generation_done(vec![draft("", "One"), draft("   ", "Two")]);
    let (state, _) = update(state, Msg::FromEmailChanged("me@x.com".to_string()));
    let (state, effects) = update(state, Msg::SendSubmitted);

    assert!(effects.is_empty());
    assert_eq!(state.send().status(), PhaseStatus::Idle);
    assert_eq!(
        state.send().validation_error(),
        Some(&ValidationError::NoRecipients)
    );
}

#[test]
fn send_rejected_with_empty_draft_list() {
    let state = generation_done(Vec::new());
    let (state, _) = update(state, Msg::FromEmailChanged("me@x.com".to_string()));
    let (state, effects) = update(state, Msg::SendSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.send().validation_error(),
        Some(&ValidationError::NoDrafts)
    );
}

#[test]
fn send_rejected_before_generation_done() {
    let (state, effects) = update(AppState::new(), Msg::SendSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.send().validation_error(),
        Some(&ValidationError::GenerationNotDone)
    );
}

#[test]
fn send_requires_sender_and_valid_recipients() {
    let state = generation_done(vec![draft("x@example.com", "One")]);
    let (state, effects) = update(state, Msg::SendSubmitted);
    assert!(effects.is_empty());
    assert_eq!(
        state.send().validation_error(),
        Some(&ValidationError::MissingSender)
    );

    let state = generation_done(vec![draft("x@example.com", "One"), draft("broken", "Two")]);
    let (state, _) = update(state, Msg::FromEmailChanged("me@x.com".to_string()));
    let (state, effects) = update(state, Msg::SendSubmitted);
    assert!(effects.is_empty());
    assert_eq!(
        state.send().validation_error(),
        Some(&ValidationError::InvalidRecipient {
            index: 1,
            address: "broken".to_string(),
        })
    );
}

#[test]
fn send_submits_only_rows_with_recipients() {
    let state = generation_done(vec![
        draft("x@example.com", "One"),
        draft("", "Two"),
        draft(" y@example.com ", "Three"),
    ]);
    let (state, _) = update(state, Msg::FromEmailChanged(" me@x.com ".to_string()));
    let (state, _) = update(state, Msg::RateLimitChanged(5));
    let (state, _) = update(state, Msg::SendProviderChanged(SendProvider::Sendgrid));
    let (state, effects) = update(state, Msg::SendSubmitted);

    assert_eq!(
        effects,
        vec![Effect::StartSend(SendRequest {
            provider: SendProvider::Sendgrid,
            from_email: "me@x.com".to_string(),
            rows: vec![
                SendRow {
                    to_email: "x@example.com".to_string(),
                    subject: "One".to_string(),
                    body: "Body for One".to_string(),
                },
                SendRow {
                    to_email: "y@example.com".to_string(),
                    subject: "Three".to_string(),
                    body: "Body for Three".to_string(),
                },
            ],
            rate_limit_per_sec: 5,
            dry_run: true,
            sandbox: false,
            smtp: None,
        })]
    );
    assert_eq!(state.send().status(), PhaseStatus::Starting);
}

#[test]
fn rate_limit_is_bounded() {
    let state = generation_done(vec![draft("x@example.com", "One")]);
    let (state, _) = update(state, Msg::FromEmailChanged("me@x.com".to_string()));
    let (state, _) = update(state, Msg::RateLimitChanged(0));
    let (state, effects) = update(state, Msg::SendSubmitted);

    assert!(effects.is_empty());
    assert_eq!(
        state.send().validation_error(),
        Some(&ValidationError::RateLimitOutOfRange(0))
    );
}

#[test]
fn from_email_follows_your_email_until_edited() {
    let (state, _) = update(AppState::new(), Msg::YourEmailChanged("m".to_string()));
    let (state, _) = update(state, Msg::YourEmailChanged("me@x.com".to_string()));
    assert_eq!(state.send_form().from_email, "me@x.com");

    let (state, _) = update(state, Msg::FromEmailChanged("sales@x.com".to_string()));
    let (state, _) = update(state, Msg::YourEmailChanged("other@x.com".to_string()));
    assert_eq!(state.send_form().from_email, "sales@x.com");
    assert_eq!(state.generation_form().your_email, "other@x.com");
}

#[test]
fn send_outcomes_are_stored_on_done() {
    let state = generation_done(vec![draft("x@example.com", "One")]);
    let (state, _) = update(state, Msg::FromEmailChanged("me@x.com".to_string()));
    let (state, _) = update(state, Msg::SendSubmitted);
    let (state, effects) = update(
        state,
        Msg::JobStarted {
            phase: Phase::Send,
            job_id: "s1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::BeginPolling {
            phase: Phase::Send,
            job_id: "s1".to_string(),
        }]
    );

    let outcome = SendOutcome {
        row: Some(OutcomeRow::Index(0)),
        to_email: Some("x@example.com".to_string()),
        status: Some("sent".to_string()),
        ..SendOutcome::default()
    };
    let mut snapshot = JobSnapshot::done(vec![outcome.clone()]);
    snapshot.saved_csv_path = Some("/srv/data/send_s1.csv".to_string());
    let (state, _) = update(
        state,
        Msg::SendPolled {
            job_id: "s1".to_string(),
            snapshot,
        },
    );

    assert_eq!(state.send().status(), PhaseStatus::Done);
    assert_eq!(state.send().results(), &[outcome]);
    let view = state.view();
    assert_eq!(view.send.progress_percent, 100);
    assert_eq!(
        view.send.saved_csv_path.as_deref(),
        Some("/srv/data/send_s1.csv")
    );
}
