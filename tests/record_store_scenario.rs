//! Record store lifecycle tests
//!
//! Drives a store through create, read, update and delete against the
//! in-memory backend and checks the record-level guarantees:
//! 1. Created records are readable by their identifier
//! 2. Updates merge fields and leave the rest alone
//! 3. Deletes remove exactly the matching records
//! 4. Malformed inputs are rejected without side effects

use serde_json::{json, Value};

use shelterdb::store::{MemoryBackend, RecordStore, StoreConfig, StoreError, UpdateCounts};

fn open() -> (MemoryBackend, RecordStore<MemoryBackend>) {
    let backend = MemoryBackend::new();
    let config = StoreConfig::new("aacuser", "SNHU1234");
    let store = RecordStore::with_backend(&config, backend.clone()).unwrap();
    (backend, store)
}

fn lucy() -> Value {
    json!({
        "age_upon_outcome": "1 year",
        "animal_type": "Dog",
        "breed": "Labrador Retriever Mix",
        "name": "Lucy",
        "outcome_type": "Transfer",
        "location_lat": 30.6525984560228,
        "location_long": -97.7419963476444
    })
}

// =============================================================================
// FULL LIFECYCLE
// =============================================================================

#[test]
fn test_dog_lifecycle() {
    let (backend, store) = open();

    assert!(store.create(lucy()).unwrap());
    assert_eq!(backend.len(), 1);

    let found = store
        .read(&json!({"animal_type": "Dog", "name": "Lucy"}), None, 0)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["breed"], "Labrador Retriever Mix");
    assert!(found[0].contains_key("_id"));

    let modified = store
        .update(&json!({"name": "Lucy"}), &json!({"outcome_type": "Adoption"}))
        .unwrap();
    assert_eq!(modified, 1);

    let found = store.read(&json!({"name": "Lucy"}), None, 0).unwrap();
    assert_eq!(found[0]["outcome_type"], "Adoption");
    assert_eq!(found[0]["age_upon_outcome"], "1 year");

    let deleted = store.delete(&json!({"name": "Lucy"})).unwrap();
    assert_eq!(deleted, 1);
    assert!(store.read(&json!({"name": "Lucy"}), None, 0).unwrap().is_empty());
    assert!(backend.is_empty());
}

#[test]
fn test_three_dog_fixture() {
    let fixture = ["Rex", "Max", "Bella"]
        .iter()
        .map(|name| match json!({"category": "Dog", "name": name, "status": "intake"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        });
    let backend = MemoryBackend::with_records(fixture).unwrap();
    let store =
        RecordStore::with_backend(&StoreConfig::new("aacuser", "SNHU1234"), backend).unwrap();
    let dogs = json!({"category": "Dog"});

    assert_eq!(store.read(&dogs, None, 0).unwrap().len(), 3);
    assert_eq!(store.read(&dogs, None, 2).unwrap().len(), 2);

    assert_eq!(store.update(&dogs, &json!({"status": "adopted"})).unwrap(), 3);
    let names: Vec<Value> = store
        .read(&dogs, None, 0)
        .unwrap()
        .into_iter()
        .map(|r| {
            assert_eq!(r["status"], "adopted");
            assert_eq!(r["category"], "Dog");
            r["name"].clone()
        })
        .collect();
    assert_eq!(names, vec![json!("Rex"), json!("Max"), json!("Bella")]);

    assert_eq!(store.delete(&dogs).unwrap(), 3);
    assert!(store.read(&dogs, None, 0).unwrap().is_empty());
}

#[test]
fn test_reapplied_update_reports_no_modification() {
    let (_, store) = open();
    store.create(json!({"category": "Dog", "status": "adopted"})).unwrap();
    let counts = store
        .try_update(&json!({"category": "Dog"}), &json!({"status": "adopted"}))
        .unwrap();
    assert_eq!(counts, UpdateCounts { matched: 1, modified: 0 });
}

#[test]
fn test_read_by_assigned_identifier() {
    let (_, store) = open();
    store.create(json!({"name": "Max"})).unwrap();
    let id = store.try_create(lucy()).unwrap();

    let mut found = store.read(&json!({"_id": id.clone()}), None, 0).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].remove("_id"), Some(id));
    assert_eq!(Value::Object(found.remove(0)), lucy());
}

// =============================================================================
// READ
// =============================================================================

#[test]
fn test_empty_query_reads_everything_in_order() {
    let (_, store) = open();
    for name in ["Rex", "Max", "Bella"] {
        store.create(json!({ "name": name })).unwrap();
    }

    let names: Vec<Value> = store
        .read(&json!({}), None, 0)
        .unwrap()
        .into_iter()
        .map(|r| r["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("Rex"), json!("Max"), json!("Bella")]);
}

#[test]
fn test_limit_and_projection() {
    let (_, store) = open();
    for i in 0..5 {
        store
            .create(json!({"animal_type": "Cat", "name": format!("cat-{}", i), "age_weeks": i}))
            .unwrap();
    }

    let found = store
        .read(
            &json!({"animal_type": "Cat"}),
            Some(&json!({"name": 1, "_id": 0})),
            2,
        )
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(Value::Object(found[0].clone()), json!({"name": "cat-0"}));
}

#[test]
fn test_query_operators() {
    let (_, store) = open();
    store.create(json!({"name": "Rex", "age_weeks": 10})).unwrap();
    store.create(json!({"name": "Max", "age_weeks": 60})).unwrap();
    store.create(json!({"name": "rexie", "age_weeks": 200})).unwrap();

    let older = store
        .read(&json!({"age_weeks": {"$gte": 60}}), None, 0)
        .unwrap();
    assert_eq!(older.len(), 2);

    let rexes = store
        .read(&json!({"name": {"$regex": "^rex", "$options": "i"}}), None, 0)
        .unwrap();
    assert_eq!(rexes.len(), 2);

    let either = store
        .read(&json!({"$or": [{"name": "Rex"}, {"name": "Max"}]}), None, 0)
        .unwrap();
    assert_eq!(either.len(), 2);
}

#[test]
fn test_no_match_is_empty_not_error() {
    let (_, store) = open();
    store.create(lucy()).unwrap();
    assert!(store.read(&json!({"name": "Nobody"}), None, 0).unwrap().is_empty());
}

// =============================================================================
// UPDATE / DELETE
// =============================================================================

#[test]
fn test_update_touches_every_match() {
    let (_, store) = open();
    for name in ["Rex", "Max"] {
        store
            .create(json!({"animal_type": "Dog", "name": name}))
            .unwrap();
    }
    store.create(json!({"animal_type": "Cat", "name": "Tom"})).unwrap();

    let counts = store
        .try_update(&json!({"animal_type": "Dog"}), &json!({"vaccinated": true}))
        .unwrap();
    assert_eq!(counts, UpdateCounts { matched: 2, modified: 2 });

    let cats = store.read(&json!({"animal_type": "Cat"}), None, 0).unwrap();
    assert!(!cats[0].contains_key("vaccinated"));
}

#[test]
fn test_update_without_match_is_zero() {
    let (_, store) = open();
    store.create(lucy()).unwrap();
    let modified = store
        .update(&json!({"name": "Nobody"}), &json!({"outcome_type": "Adoption"}))
        .unwrap();
    assert_eq!(modified, 0);
}

#[test]
fn test_delete_is_exact() {
    let (_, store) = open();
    for name in ["Rex", "Rex", "Max"] {
        store.create(json!({ "name": name })).unwrap();
    }

    assert_eq!(store.delete(&json!({"name": "Rex"})).unwrap(), 2);
    let left = store.read(&json!({}), None, 0).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["name"], "Max");
}

// =============================================================================
// CONTRACT VIOLATIONS
// =============================================================================

#[test]
fn test_empty_record_rejected() {
    let (backend, store) = open();
    let err = store.create(json!({})).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(err.code(), "SHELTER_VALIDATION_ERROR");
    assert!(backend.is_empty());
}

#[test]
fn test_non_mapping_query_rejected() {
    let (_, store) = open();
    assert!(matches!(
        store.read(&json!("Lucy"), None, 0),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn test_update_requires_both_parts() {
    let (_, store) = open();
    store.create(lucy()).unwrap();
    assert!(store.update(&json!({}), &json!({"a": 1})).is_err());
    assert!(store.update(&json!({"name": "Lucy"}), &json!({})).is_err());
}

#[test]
fn test_empty_delete_rejected() {
    let (backend, store) = open();
    store.create(lucy()).unwrap();
    let err = store.delete(&json!({})).unwrap_err();
    assert!(err.to_string().contains("Delete query cannot be empty"));
    assert_eq!(backend.len(), 1);
}

#[test]
fn test_identifier_cannot_be_rewritten() {
    let (_, store) = open();
    store.create(lucy()).unwrap();
    assert!(store
        .try_update(&json!({"name": "Lucy"}), &json!({"_id": "other"}))
        .is_err());
}
