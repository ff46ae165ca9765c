//! Record service: business rules and identity management over the greeting collection.
//!
//! Every operation loads the full collection from the store. Writes hold a single
//! lock for the whole load-mutate-save sequence so concurrent requests can neither
//! lose each other's updates nor hand out the same id twice.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::AppError;
use crate::models::{Greeting, GreetingDraft, GreetingFilter};
use crate::store::GreetingStore;

pub const NOT_FOUND_MESSAGE: &str = "Greeting not found";
const CONFLICT_MESSAGE: &str = "Greeting for this language already exists";

/// Greeting record service.
pub struct GreetingService {
    store: Arc<dyn GreetingStore>,
    write_lock: Mutex<()>,
}

impl GreetingService {
    pub fn new(store: Arc<dyn GreetingStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// List greetings in stored order, narrowed by `filter`.
    pub fn list(&self, filter: &GreetingFilter) -> Result<Vec<Greeting>, AppError> {
        let greetings = self.store.load()?;
        Ok(greetings.into_iter().filter(|g| filter.matches(g)).collect())
    }

    /// Get a greeting by id.
    pub fn get(&self, id: i64) -> Result<Greeting, AppError> {
        self.store
            .load()?
            .into_iter()
            .find(|g| g.id == id)
            .ok_or_else(not_found)
    }

    /// Create a greeting. The id is one past the current maximum, or 1 for an empty collection.
    pub fn create(&self, draft: GreetingDraft) -> Result<Greeting, AppError> {
        let _guard = self.write_lock.lock();
        let mut greetings = self.store.load()?;

        if find_language(&greetings, &draft.language, None).is_some() {
            tracing::debug!("Rejected duplicate language {:?}", draft.language);
            return Err(AppError::Conflict(CONFLICT_MESSAGE.to_string()));
        }

        let id = match greetings.iter().map(|g| g.id).max() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| AppError::Internal("Greeting id space exhausted".to_string()))?,
            None => 1,
        };

        let created = Greeting {
            id,
            language: draft.language,
            greeting: draft.greeting,
            formal: draft.formal.unwrap_or(true),
        };

        greetings.push(created.clone());
        self.store.save(&greetings)?;

        tracing::info!("Created greeting {} ({})", created.id, created.language);
        Ok(created)
    }

    /// Replace the greeting at `id`. An omitted `formal` keeps the prior value.
    pub fn update(&self, id: i64, draft: GreetingDraft) -> Result<Greeting, AppError> {
        let _guard = self.write_lock.lock();
        let mut greetings = self.store.load()?;

        let index = greetings
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(not_found)?;

        if find_language(&greetings, &draft.language, Some(id)).is_some() {
            tracing::debug!("Rejected rename of {} to duplicate {:?}", id, draft.language);
            return Err(AppError::Conflict(CONFLICT_MESSAGE.to_string()));
        }

        let updated = Greeting {
            id,
            language: draft.language,
            greeting: draft.greeting,
            formal: draft.formal.unwrap_or(greetings[index].formal),
        };

        greetings[index] = updated.clone();
        self.store.save(&greetings)?;

        tracing::info!("Updated greeting {} ({})", updated.id, updated.language);
        Ok(updated)
    }

    /// Remove the greeting at `id` and return it.
    pub fn delete(&self, id: i64) -> Result<Greeting, AppError> {
        let _guard = self.write_lock.lock();
        let mut greetings = self.store.load()?;

        let index = greetings
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(not_found)?;

        let removed = greetings.remove(index);
        self.store.save(&greetings)?;

        tracing::info!("Deleted greeting {} ({})", removed.id, removed.language);
        Ok(removed)
    }
}

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

/// Find a record whose language matches case-insensitively, ignoring `except_id`.
fn find_language<'a>(
    greetings: &'a [Greeting],
    language: &str,
    except_id: Option<i64>,
) -> Option<&'a Greeting> {
    let needle = language.to_lowercase();
    greetings
        .iter()
        .find(|g| Some(g.id) != except_id && g.language.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn greeting(id: i64, language: &str, text: &str, formal: bool) -> Greeting {
        Greeting {
            id,
            language: language.to_string(),
            greeting: text.to_string(),
            formal,
        }
    }

    fn draft(language: &str, text: &str, formal: Option<bool>) -> GreetingDraft {
        GreetingDraft::new(language, text, formal).unwrap()
    }

    fn service_with(greetings: Vec<Greeting>) -> (Arc<MemoryStore>, GreetingService) {
        let store = Arc::new(MemoryStore::with_greetings(greetings));
        let service = GreetingService::new(store.clone());
        (store, service)
    }

    #[test]
    fn test_create_in_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let service = GreetingService::new(store.clone());

        let created = service.create(draft("French", "Bonjour", None)).unwrap();

        assert_eq!(created, greeting(1, "French", "Bonjour", true));
        assert_eq!(store.snapshot(), vec![created]);
    }

    #[test]
    fn test_create_uses_max_id_plus_one() {
        let (_, service) = service_with(vec![
            greeting(7, "French", "Bonjour", true),
            greeting(2, "German", "Hallo", true),
        ]);

        let created = service.create(draft("Italian", "Ciao", Some(false))).unwrap();

        assert_eq!(created.id, 8);
        assert!(!created.formal);
    }

    #[test]
    fn test_create_trims_input() {
        let (_, service) = service_with(Vec::new());

        let created = service
            .create(draft("  Japanese ", " Konnichiwa  ", None))
            .unwrap();

        assert_eq!(created.language, "Japanese");
        assert_eq!(created.greeting, "Konnichiwa");
    }

    #[test]
    fn test_create_duplicate_language_conflicts() {
        let initial = vec![greeting(1, "French", "Bonjour", true)];
        let (store, service) = service_with(initial.clone());

        let err = service.create(draft("french", "Salut", None)).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn test_get_and_missing() {
        let (_, service) = service_with(vec![greeting(1, "French", "Bonjour", true)]);

        assert_eq!(service.get(1).unwrap().language, "French");
        assert!(matches!(service.get(2), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_replaces_record() {
        let (store, service) = service_with(vec![greeting(1, "French", "Bonjour", true)]);

        let updated = service
            .update(1, draft("Spanish", "Hola", Some(false)))
            .unwrap();

        assert_eq!(updated, greeting(1, "Spanish", "Hola", false));
        assert_eq!(store.snapshot(), vec![updated]);
    }

    #[test]
    fn test_update_keeps_formal_when_omitted() {
        let (_, service) = service_with(vec![greeting(1, "French", "Bonjour", false)]);

        let updated = service.update(1, draft("French", "Salut", None)).unwrap();

        assert!(!updated.formal);
        assert_eq!(updated.greeting, "Salut");
    }

    #[test]
    fn test_update_same_language_different_case_is_allowed() {
        let (_, service) = service_with(vec![greeting(1, "French", "Bonjour", true)]);

        let updated = service.update(1, draft("FRENCH", "Bonjour", None)).unwrap();

        assert_eq!(updated.language, "FRENCH");
    }

    #[test]
    fn test_update_conflicts_with_other_record() {
        let initial = vec![
            greeting(1, "French", "Bonjour", true),
            greeting(2, "German", "Hallo", true),
        ];
        let (store, service) = service_with(initial.clone());

        let err = service.update(2, draft("french", "Salut", None)).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let initial = vec![greeting(1, "French", "Bonjour", true)];
        let (store, service) = service_with(initial.clone());

        let err = service.update(9, draft("Dutch", "Hallo", None)).unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let (store, service) = service_with(vec![
            greeting(1, "French", "Bonjour", true),
            greeting(2, "German", "Hallo", true),
        ]);

        let removed = service.delete(1).unwrap();

        assert_eq!(removed.language, "French");
        assert!(matches!(service.get(1), Err(AppError::NotFound(_))));
        assert_eq!(store.snapshot().len(), 1);
        assert!(matches!(service.delete(1), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_id_reused_after_deleting_max() {
        let (_, service) = service_with(vec![
            greeting(1, "French", "Bonjour", true),
            greeting(2, "German", "Hallo", true),
        ]);

        service.delete(2).unwrap();
        let created = service.create(draft("Dutch", "Hallo", None)).unwrap();

        assert_eq!(created.id, 2);
    }

    #[test]
    fn test_list_filters() {
        let (_, service) = service_with(vec![
            greeting(1, "Spanish", "Hola", false),
            greeting(2, "French", "Bonjour", true),
            greeting(3, "Old Spanish", "Buenos dias", true),
        ]);

        let by_language = service
            .list(&GreetingFilter {
                language: Some("span".to_string()),
                formal: None,
            })
            .unwrap();
        assert_eq!(
            by_language.iter().map(|g| g.id).collect::<Vec<_>>(),
            vec![1, 3]
        );

        let combined = service
            .list(&GreetingFilter {
                language: Some("SPAN".to_string()),
                formal: Some(true),
            })
            .unwrap();
        assert_eq!(combined.iter().map(|g| g.id).collect::<Vec<_>>(), vec![3]);

        assert_eq!(service.list(&GreetingFilter::default()).unwrap().len(), 3);
    }

    #[test]
    fn test_failed_save_reports_error_and_commits_nothing() {
        let initial = vec![greeting(1, "French", "Bonjour", true)];
        let (store, service) = service_with(initial.clone());
        store.fail_writes(true);

        assert!(matches!(
            service.create(draft("German", "Hallo", None)),
            Err(AppError::StorageWrite(_))
        ));
        assert!(matches!(
            service.update(1, draft("German", "Hallo", None)),
            Err(AppError::StorageWrite(_))
        ));
        assert!(matches!(service.delete(1), Err(AppError::StorageWrite(_))));
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn test_concurrent_creates_get_unique_ids() {
        let (store, service) = service_with(Vec::new());
        let service = Arc::new(service);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    service
                        .create(draft(&format!("Language {}", i), "Hello", None))
                        .unwrap()
                })
            })
            .collect();

        let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap().id).collect();
        ids.sort_unstable();

        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
        assert_eq!(store.snapshot().len(), 16);
    }
}
