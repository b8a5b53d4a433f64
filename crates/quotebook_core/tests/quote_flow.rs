use async_trait::async_trait;
use quotebook_core::{
    categories, export_to_file, import_from_file, reconcile, MemoryKeyValueStore, Quote,
    QuoteRepository, QuoteService, RemoteSource, ServiceOptions, SyncResult,
};

struct FixedSource(Vec<Quote>);

#[async_trait]
impl RemoteSource for FixedSource {
    fn source_id(&self) -> &str {
        "fixed"
    }

    async fn fetch_remote(&self) -> SyncResult<Vec<Quote>> {
        Ok(self.0.clone())
    }
}

fn quote(text: &str, category: &str) -> Quote {
    Quote::new(text, category).unwrap()
}

#[tokio::test]
async fn add_categorize_and_reconcile_end_to_end() {
    let mut repo = QuoteRepository::new();
    repo.add("A", "X").unwrap();
    repo.add("B", "Y").unwrap();
    assert_eq!(categories(repo.all()), vec!["X", "Y"]);

    let duplicate = FixedSource(vec![quote("B", "Y")]);
    assert_eq!(reconcile(&mut repo, &duplicate).await.unwrap(), 0);

    let novel = FixedSource(vec![quote("C", "Server")]);
    assert_eq!(reconcile(&mut repo, &novel).await.unwrap(), 1);

    assert_eq!(repo.len(), 3);
    assert_eq!(categories(repo.all()), vec!["X", "Y", "Server"]);
}

#[tokio::test]
async fn service_reconcile_persists_and_refreshes_categories() {
    let mut service = QuoteService::open(
        MemoryKeyValueStore::new(),
        MemoryKeyValueStore::new(),
        ServiceOptions::default(),
    )
    .unwrap();
    assert_eq!(service.categories(), vec!["Motivation", "Life", "Success"]);

    let source = FixedSource(vec![quote("remote one", "Server"), quote("remote two", "Server")]);
    assert_eq!(service.reconcile(&source).await.unwrap(), 2);
    assert_eq!(service.reconcile(&source).await.unwrap(), 0);

    assert_eq!(service.quotes().len(), 5);
    assert_eq!(
        service.categories(),
        vec!["Motivation", "Life", "Success", "Server"]
    );
    service.select_category("Server").unwrap();
    assert_eq!(service.visible_quotes().len(), 2);
}

#[test]
fn export_then_import_file_appends_copies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotes.json");

    let mut service = QuoteService::open(
        MemoryKeyValueStore::new(),
        MemoryKeyValueStore::new(),
        ServiceOptions::default(),
    )
    .unwrap();
    export_to_file(&path, service.quotes()).unwrap();

    let batch = import_from_file(&path).unwrap();
    assert_eq!(batch.quotes, service.quotes());

    let contents = std::fs::read_to_string(&path).unwrap();
    let report = service.import_json(&contents).unwrap();
    assert_eq!(report.added, 3);
    assert_eq!(service.quotes().len(), 6);
    assert_eq!(service.categories().len(), 3);
}

#[test]
fn import_from_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(import_from_file(dir.path().join("nope.json")).is_err());
}
