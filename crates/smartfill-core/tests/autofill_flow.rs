//! End-to-end autofill rounds over in-memory pages.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use smartfill_core::{
    Autofill, AutofillError, Document, FillPreview, LocalPage, PrepareOutcome, SerializedNode as N,
};
use smartfill_protocols::{
    keys, FieldValues, PreconditionError, ResolveRequest, ResolverError, StateStore,
    ValueResolver, HISTORY_CAPACITY,
};
use smartfill_store::MemoryStateStore;

/// Answers every request with values looked up by field label, or a fixed
/// reply when one is set.
struct LabelResolver {
    by_label: Vec<(&'static str, &'static str)>,
    fixed: Option<String>,
}

impl LabelResolver {
    fn new(by_label: Vec<(&'static str, &'static str)>) -> Arc<Self> {
        Arc::new(Self { by_label, fixed: None })
    }

    fn fixed(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            by_label: Vec::new(),
            fixed: Some(reply.to_string()),
        })
    }
}

#[async_trait]
impl ValueResolver for LabelResolver {
    fn name(&self) -> &str {
        "label"
    }

    async fn resolve(&self, request: ResolveRequest) -> Result<String, ResolverError> {
        if let Some(reply) = &self.fixed {
            return Ok(reply.clone());
        }
        let values: FieldValues = request
            .fields
            .iter()
            .filter_map(|field| {
                self.by_label
                    .iter()
                    .find(|(label, _)| *label == field.label)
                    .map(|(_, value)| (field.id.clone(), value.to_string()))
            })
            .collect();
        Ok(format!("Here you go:\n{}", serde_json::to_string(&values).unwrap()))
    }
}

async fn store() -> Arc<dyn StateStore> {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    store.set(keys::API_KEY, json!("sk-test")).await.unwrap();
    store
        .set(keys::USER_PROFILE, json!({"name": "Ada Lovelace"}))
        .await
        .unwrap();
    store
}

fn labelled(id: &str, label: &str, control: N) -> Vec<N> {
    vec![
        N::element("label").attr("for", id).child(N::text(label)),
        control.attr("id", id),
    ]
}

fn application_form() -> N {
    let mut controls = Vec::new();
    controls.extend(labelled(
        "full-name",
        "Full name",
        N::element("input").attr("placeholder", "Jane Doe"),
    ));
    controls.extend(labelled("email", "Email", N::element("input").attr("type", "email")));
    controls.extend(labelled(
        "experience",
        "Experience",
        N::element("select").children([
            N::element("option").attr("value", "").child(N::text("Choose")),
            N::element("option").attr("value", "3-5").child(N::text("3-5 years")),
            N::element("option").attr("value", "5-10").child(N::text("5-10 years")),
        ]),
    ));
    controls.extend(labelled(
        "relocate",
        "Willing to relocate",
        N::element("input").attr("type", "checkbox"),
    ));
    controls.extend(labelled(
        "remote",
        "Remote only",
        N::element("input").attr("type", "checkbox").checked(true),
    ));
    controls.push(N::element("input").attr("type", "hidden").attr("name", "csrf"));
    controls.push(N::element("input").attr("type", "submit").attr("value", "Apply"));
    controls.push(N::element("input").attr("name", "legacy").disabled());
    controls.push(N::element("input").attr("name", "ghost").hidden());

    N::element("html").child(N::element("body").child(N::element("form").children(controls)))
}

fn cover_frame() -> N {
    N::element("html").child(N::element("body").child(N::element("form").children(labelled(
        "cover",
        "Cover letter",
        N::element("textarea"),
    ))))
}

fn job_page() -> Arc<LocalPage> {
    Arc::new(
        LocalPage::new("tab-42")
            .with_frame(Document::new(
                "https://jobs.example.com/apply",
                "Apply",
                &application_form(),
            ))
            .with_frame(Document::new(
                "https://embed.example.com/cover",
                "Cover",
                &cover_frame(),
            )),
    )
}

fn answers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Full name", "Ada Lovelace"),
        ("Email", "ada@example.com"),
        ("Experience", "3 to 5 years"),
        ("Willing to relocate", "YES"),
        ("Remote only", "maybe"),
        ("Cover letter", "I like engines."),
    ]
}

async fn prepare(autofill: &Autofill, page: &Arc<LocalPage>) -> FillPreview {
    match autofill.prepare(page.clone()).await.unwrap() {
        PrepareOutcome::Ready(preview) => preview,
        PrepareOutcome::NothingToFill => panic!("expected fillable fields"),
    }
}

async fn value_of(page: &LocalPage, frame: u32, id: &str) -> String {
    let doc = page.document(frame).await.unwrap();
    doc.value(doc.element_by_id(id).unwrap())
}

async fn checked(page: &LocalPage, id: &str) -> bool {
    let doc = page.document(0).await.unwrap();
    doc.is_checked(doc.element_by_id(id).unwrap())
}

#[tokio::test]
async fn test_scan_finds_every_eligible_field_once() {
    let autofill = Autofill::new(store().await, LabelResolver::new(answers()));
    let preview = prepare(&autofill, &job_page()).await;

    assert_eq!(preview.fields.len(), 6);
    let keys: HashSet<String> = preview.fields.iter().map(|f| f.key()).collect();
    assert_eq!(keys.len(), 6);
    assert_eq!(preview.context.url, "https://jobs.example.com/apply");
    assert_eq!(preview.frames_failed, 0);
}

#[tokio::test]
async fn test_linked_label_beats_placeholder() {
    let autofill = Autofill::new(store().await, LabelResolver::new(answers()));
    let preview = prepare(&autofill, &job_page()).await;

    let name = preview
        .fields
        .iter()
        .find(|f| f.placeholder == "Jane Doe")
        .unwrap();
    assert_eq!(name.label, "Full name");
}

#[tokio::test]
async fn test_full_round_fills_across_frames() {
    let page = job_page();
    let autofill = Autofill::new(store().await, LabelResolver::new(answers()));
    let preview = prepare(&autofill, &page).await;

    let outcome = autofill.apply(page.clone(), &preview).await.unwrap();

    assert_eq!(outcome.filled_count, 6);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(value_of(&page, 0, "full-name").await, "Ada Lovelace");
    assert_eq!(value_of(&page, 0, "experience").await, "3-5");
    assert!(checked(&page, "relocate").await);
    assert!(!checked(&page, "remote").await);
    assert_eq!(value_of(&page, 1, "cover").await, "I like engines.");
}

#[tokio::test]
async fn test_undo_restores_everything_once() {
    let page = job_page();
    let autofill = Autofill::new(store().await, LabelResolver::new(answers()));

    assert_eq!(autofill.undo(page.clone()).await.unwrap(), 0);

    let preview = prepare(&autofill, &page).await;
    autofill.apply(page.clone(), &preview).await.unwrap();

    assert_eq!(autofill.undo(page.clone()).await.unwrap(), 6);
    assert_eq!(value_of(&page, 0, "full-name").await, "");
    assert_eq!(value_of(&page, 0, "experience").await, "");
    assert!(!checked(&page, "relocate").await);
    assert!(checked(&page, "remote").await);
    assert_eq!(value_of(&page, 1, "cover").await, "");

    assert_eq!(autofill.undo(page).await.unwrap(), 0);
}

#[tokio::test]
async fn test_undo_skips_frames_that_navigated() {
    let page = job_page();
    let autofill = Autofill::new(store().await, LabelResolver::new(answers()));
    let preview = prepare(&autofill, &page).await;
    autofill.apply(page.clone(), &preview).await.unwrap();

    assert!(page.reload(1).await);

    assert_eq!(autofill.undo(page.clone()).await.unwrap(), 5);
    assert_eq!(value_of(&page, 1, "cover").await, "I like engines.");
}

#[tokio::test]
async fn test_frame_navigated_before_confirm_is_left_alone() {
    let page = job_page();
    let autofill = Autofill::new(store().await, LabelResolver::new(answers()));
    let preview = prepare(&autofill, &page).await;

    assert!(
        page.navigate(
            1,
            Document::new("https://ads.example/banner", "Ad", &cover_frame()),
        )
        .await
    );

    let outcome = autofill.apply(page.clone(), &preview).await.unwrap();

    assert_eq!(outcome.filled_count, 5);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("Frame 1:"), "{}", outcome.errors[0]);
    assert_eq!(value_of(&page, 0, "full-name").await, "Ada Lovelace");
    assert_eq!(value_of(&page, 1, "cover").await, "");

    let history = autofill.history().list().await.unwrap();
    assert_eq!(history[0].fields_count, 5);
    assert_eq!(autofill.undo(page).await.unwrap(), 5);
}

#[tokio::test]
async fn test_missing_target_is_one_error_among_five() {
    let page = Arc::new(LocalPage::new("tab-7").with_frame(Document::new(
        "https://example.com/contact",
        "Contact",
        &N::element("html").child(N::element("body").child(N::element("form").children(
            ["a", "b", "c", "d", "e"].map(|id| N::element("input").attr("id", id).attr("name", id)),
        ))),
    )));
    let autofill = Autofill::new(
        store().await,
        LabelResolver::new(vec![("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")]),
    );

    // Scanned labels fall back to the name attribute.
    let preview = prepare(&autofill, &page).await;
    assert_eq!(preview.entries().len(), 5);

    page.rewrite(
        0,
        Document::new(
            "https://example.com/contact",
            "Contact",
            &N::element("html").child(N::element("body").child(N::element("form").children(
                ["a", "b", "d", "e"].map(|id| N::element("input").attr("id", id).attr("name", id)),
            ))),
        ),
    )
    .await;

    let outcome = autofill.apply(page, &preview).await.unwrap();
    assert_eq!(outcome.filled_count, 4);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("@id=\"c\""), "{}", outcome.errors[0]);
}

#[tokio::test]
async fn test_history_keeps_newest_fifty() {
    let store = store().await;
    let autofill = Autofill::new(store, LabelResolver::new(answers()));

    for i in 0..=HISTORY_CAPACITY {
        let page = Arc::new(LocalPage::new("tab-h").with_frame(Document::new(
            format!("https://jobs.example.com/apply/{}", i),
            "Apply",
            &application_form(),
        )));
        let preview = prepare(&autofill, &page).await;
        autofill.apply(page, &preview).await.unwrap();
    }

    let history = autofill.history().list().await.unwrap();
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(history[0].url, format!("https://jobs.example.com/apply/{}", HISTORY_CAPACITY));
    assert_eq!(history.last().unwrap().url, "https://jobs.example.com/apply/1");
}

#[tokio::test]
async fn test_reply_without_braces_is_not_a_precondition_failure() {
    let autofill = Autofill::new(store().await, LabelResolver::fixed("I could not find a form."));

    let err = autofill.prepare(job_page()).await.unwrap_err();
    assert!(matches!(err, AutofillError::Resolver(ResolverError::NoJsonObject)));
    assert!(!matches!(err, AutofillError::Precondition(_)));
}

#[tokio::test]
async fn test_missing_profile_is_reported_before_any_work() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    store.set(keys::API_KEY, json!("sk-test")).await.unwrap();
    let autofill = Autofill::new(store, LabelResolver::fixed("{}"));

    let err = autofill.prepare(job_page()).await.unwrap_err();
    assert!(matches!(
        err,
        AutofillError::Precondition(PreconditionError::IncompleteProfile)
    ));
    assert_eq!(
        err.user_message(),
        "Please set up your profile first (at least your name)."
    );
}
