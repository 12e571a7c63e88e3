use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use serde_json::{json, Value};
use smartfill_protocols::{StoreChange, StoreError};
use smartfill_store::MemoryStateStore;
use tokio::sync::broadcast;

use super::*;
use crate::dom::{Document, SerializedNode as N};
use crate::local_page::LocalPage;

/// Replies with a fixed string and remembers what it was asked.
struct ScriptedResolver {
    reply: String,
    seen: SyncMutex<Vec<ResolveRequest>>,
}

impl ScriptedResolver {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            seen: SyncMutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait]
impl ValueResolver for ScriptedResolver {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn resolve(&self, request: ResolveRequest) -> Result<String, ResolverError> {
        self.seen.lock().push(request);
        Ok(self.reply.clone())
    }
}

/// Memory store whose writes to one key fail like a full disk.
struct FailingKeyStore {
    inner: MemoryStateStore,
    failing_key: String,
}

#[async_trait]
impl StateStore for FailingKeyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if key == self.failing_key {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.remove(key).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.subscribe()
    }
}

async fn store_failing_on(key: &str) -> Arc<dyn StateStore> {
    let store: Arc<dyn StateStore> = Arc::new(FailingKeyStore {
        inner: MemoryStateStore::new(),
        failing_key: key.to_string(),
    });
    seed(&store).await;
    store
}

async fn seed(store: &Arc<dyn StateStore>) {
    store.set(keys::API_KEY, json!("sk-test")).await.unwrap();
    store
        .set(keys::USER_PROFILE, json!({"name": "Ada Lovelace", "email": "ada@example.com"}))
        .await
        .unwrap();
}

async fn ready_store() -> Arc<dyn StateStore> {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    store.set(keys::API_KEY, json!("sk-test")).await.unwrap();
    store
        .set(keys::USER_PROFILE, json!({"name": "Ada Lovelace", "email": "ada@example.com"}))
        .await
        .unwrap();
    store
}

fn contact_page() -> Arc<LocalPage> {
    let form = N::element("form").children([
        N::element("input").attr("id", "name").attr("placeholder", "Full name"),
        N::element("input").attr("id", "email").attr("type", "email").value("old@example.com"),
        N::element("input").attr("id", "cv").attr("type", "file"),
    ]);
    let root = N::element("html").child(N::element("body").child(form));
    Arc::new(LocalPage::new("tab-1").with_frame(Document::new(
        "https://example.com/contact",
        "Contact",
        &root,
    )))
}

const NAME: &str = "//*[@id=\"name\"]";
const EMAIL: &str = "//*[@id=\"email\"]";
const CV: &str = "//*[@id=\"cv\"]";

fn reply() -> String {
    let values: FieldValues = [(NAME, "Ada Lovelace"), (EMAIL, "ada@example.com"), (CV, "resume.pdf")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    serde_json::to_string(&values).unwrap()
}

#[tokio::test]
async fn test_missing_credential_stops_before_scan() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    let resolver = ScriptedResolver::replying("{}");
    let autofill = Autofill::new(store, resolver.clone());

    let err = autofill.prepare(contact_page()).await.unwrap_err();
    assert!(matches!(
        err,
        AutofillError::Precondition(PreconditionError::MissingCredential)
    ));
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_nameless_profile_is_incomplete() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
    store.set(keys::API_KEY, json!("sk-test")).await.unwrap();
    store.set(keys::USER_PROFILE, json!({"name": "  "})).await.unwrap();
    let autofill = Autofill::new(store, ScriptedResolver::replying("{}"));

    let err = autofill.check_preconditions().await.unwrap_err();
    assert!(matches!(
        err,
        AutofillError::Precondition(PreconditionError::IncompleteProfile)
    ));
}

#[tokio::test]
async fn test_prepare_forwards_credential_and_blanks_uploads() {
    let resolver = ScriptedResolver::replying(&reply());
    let autofill = Autofill::new(ready_store().await, resolver.clone());

    let PrepareOutcome::Ready(preview) = autofill.prepare(contact_page()).await.unwrap() else {
        panic!("expected a preview");
    };

    let seen = resolver.seen.lock();
    assert_eq!(seen[0].credential.as_ref().unwrap().expose(), "sk-test");
    assert_eq!(seen[0].fields.len(), 3);
    assert_eq!(seen[0].context.title, "Contact");
    drop(seen);

    assert_eq!(preview.values[CV], "");
    let entries = preview.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].label, "Full name");
    assert_eq!(entries[1].value, "ada@example.com");
}

#[tokio::test]
async fn test_page_without_fields_needs_no_resolver() {
    let page = Arc::new(LocalPage::new("tab-2").with_frame(Document::new(
        "https://example.com",
        "",
        &N::element("html").child(N::element("body").child(N::text("hello"))),
    )));
    let resolver = ScriptedResolver::replying("{}");
    let autofill = Autofill::new(ready_store().await, resolver.clone());

    let outcome = autofill.prepare(page).await.unwrap();
    assert!(matches!(outcome, PrepareOutcome::NothingToFill));
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_reply_without_object_is_resolver_error() {
    let autofill = Autofill::new(
        ready_store().await,
        ScriptedResolver::replying("Sorry, I can't help with that."),
    );

    let err = autofill.prepare(contact_page()).await.unwrap_err();
    assert!(matches!(err, AutofillError::Resolver(ResolverError::NoJsonObject)));
    assert_eq!(
        err.user_message(),
        "The AI returned an invalid response. Please try again."
    );
}

#[tokio::test]
async fn test_apply_records_undo_and_history() {
    let page = contact_page();
    let autofill = Autofill::new(ready_store().await, ScriptedResolver::replying(&reply()));

    let PrepareOutcome::Ready(preview) = autofill.prepare(page.clone()).await.unwrap() else {
        panic!("expected a preview");
    };
    let outcome = autofill.apply(page.clone(), &preview).await.unwrap();

    assert_eq!(outcome.filled_count, 2);
    assert!(outcome.errors.is_empty());
    assert!(outcome.undo_available);
    assert!(outcome.history_recorded);
    assert!(autofill.undo_manager().can_undo("tab-1").await.unwrap());

    let history = autofill.history().list().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, "https://example.com/contact");
    assert_eq!(history[0].fields_count, 2);

    assert_eq!(autofill.undo(page.clone()).await.unwrap(), 2);
    let doc = page.document(0).await.unwrap();
    assert_eq!(doc.value(doc.element_by_id("email").unwrap()), "old@example.com");
    assert_eq!(autofill.undo(page).await.unwrap(), 0);
}

#[tokio::test]
async fn test_fill_that_writes_nothing_keeps_previous_snapshot() {
    let page = contact_page();
    let autofill = Autofill::new(ready_store().await, ScriptedResolver::replying(&reply()));
    let PrepareOutcome::Ready(preview) = autofill.prepare(page.clone()).await.unwrap() else {
        panic!("expected a preview");
    };
    autofill.apply(page.clone(), &preview).await.unwrap();

    let empty = FillPreview {
        values: FieldValues::new(),
        ..preview
    };
    let outcome = autofill.apply(page, &empty).await.unwrap();

    assert_eq!(outcome.filled_count, 0);
    assert!(!outcome.undo_available);
    assert!(autofill.undo_manager().can_undo("tab-1").await.unwrap());
    assert_eq!(autofill.history().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_busy_tab_is_rejected() {
    let autofill = Autofill::new(ready_store().await, ScriptedResolver::replying("{}"));
    let guard = autofill.acquire("tab-1").unwrap();

    let err = autofill.undo(contact_page()).await.unwrap_err();
    assert!(matches!(err, AutofillError::Busy(ref tab) if tab == "tab-1"));

    drop(guard);
    assert_eq!(autofill.undo(contact_page()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_history_write_failure_keeps_fill_outcome() {
    let page = contact_page();
    let autofill = Autofill::new(
        store_failing_on(keys::FILL_HISTORY).await,
        ScriptedResolver::replying(&reply()),
    );
    let PrepareOutcome::Ready(preview) = autofill.prepare(page.clone()).await.unwrap() else {
        panic!("expected a preview");
    };

    let outcome = autofill.apply(page.clone(), &preview).await.unwrap();

    assert_eq!(outcome.filled_count, 2);
    assert!(outcome.undo_available);
    assert!(!outcome.history_recorded);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("disk full"), "{}", outcome.errors[0]);

    let doc = page.document(0).await.unwrap();
    assert_eq!(doc.value(doc.element_by_id("name").unwrap()), "Ada Lovelace");
    assert_eq!(autofill.undo(page).await.unwrap(), 2);
}

#[tokio::test]
async fn test_undo_snapshot_failure_is_reported_not_raised() {
    let page = contact_page();
    let autofill = Autofill::new(
        store_failing_on(&keys::last_fill("tab-1")).await,
        ScriptedResolver::replying(&reply()),
    );
    let PrepareOutcome::Ready(preview) = autofill.prepare(page.clone()).await.unwrap() else {
        panic!("expected a preview");
    };

    let outcome = autofill.apply(page.clone(), &preview).await.unwrap();

    assert_eq!(outcome.filled_count, 2);
    assert!(!outcome.undo_available);
    assert!(outcome.history_recorded);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("Undo is not available"));
    assert_eq!(autofill.undo(page).await.unwrap(), 0);
}

#[tokio::test]
async fn test_history_lists_only_written_fields() {
    let size = N::element("select").attr("id", "size").children([
        N::element("option").attr("value", "s").child(N::text("Small")),
        N::element("option").attr("value", "m").child(N::text("Medium")),
    ]);
    let form = N::element("form").children([
        N::element("input").attr("id", "name").attr("placeholder", "Full name"),
        size,
    ]);
    let page = Arc::new(LocalPage::new("tab-3").with_frame(Document::new(
        "https://shop.example/order",
        "Order",
        &N::element("html").child(N::element("body").child(form)),
    )));
    let values: FieldValues = [(NAME, "Ada Lovelace"), ("//*[@id=\"size\"]", "XXL")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let autofill = Autofill::new(
        ready_store().await,
        ScriptedResolver::replying(&serde_json::to_string(&values).unwrap()),
    );
    let PrepareOutcome::Ready(preview) = autofill.prepare(page.clone()).await.unwrap() else {
        panic!("expected a preview");
    };
    assert_eq!(preview.entries().len(), 2);

    let outcome = autofill.apply(page, &preview).await.unwrap();
    assert_eq!(outcome.filled_count, 1);

    let history = autofill.history().list().await.unwrap();
    assert_eq!(history[0].fields_count, 1);
    assert_eq!(history[0].fields[0].key, NAME);
    assert_eq!(history[0].fields[0].value, "Ada Lovelace");
}
