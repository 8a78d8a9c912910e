//! Trait contract tests for AgentRegistry and ContactLedger.
//!
//! Every contract runs against both the in-memory fake and an in-memory
//! SurrealDB instance. Any conforming implementation must pass these.

use callsheet_state::{
    AgentId, AgentRecord, AgentRegistry, Assignment, ContactId, ContactLedger, ContactRecord,
    MemoryRoster, RosterStore, StorageError, SurrealRoster,
};
use pretty_assertions::assert_eq;

async fn surreal() -> SurrealRoster {
    SurrealRoster::in_memory()
        .await
        .expect("in-memory SurrealDB should start")
}

fn names(agents: &[AgentRecord]) -> Vec<String> {
    agents.iter().map(|a| a.name.clone()).collect()
}

fn first_names(contacts: &[ContactRecord]) -> Vec<String> {
    contacts.iter().map(|c| c.first_name.clone()).collect()
}

fn contacts(names: &[&str]) -> Vec<ContactRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| ContactRecord::new(*n, format!("555-{}", i), ""))
        .collect()
}

// ===========================================================================
// Contracts (backend-agnostic)
// ===========================================================================

async fn agents_list_in_registration_order(store: &dyn RosterStore) {
    for name in ["Zed", "Amy", "Kim"] {
        store.insert_agent(AgentRecord::new(name)).await.unwrap();
    }
    let listed = store.list_agents().await.unwrap();
    assert_eq!(names(&listed), vec!["Zed", "Amy", "Kim"]);
}

async fn replace_agents_discards_previous_pool(store: &dyn RosterStore) {
    store.insert_agent(AgentRecord::new("Manual")).await.unwrap();
    let pool: Vec<AgentRecord> = (1..=5).map(|n| AgentRecord::placeholder("Agent", n)).collect();
    store.replace_agents(pool.clone()).await.unwrap();

    let listed = store.list_agents().await.unwrap();
    assert_eq!(
        names(&listed),
        vec!["Agent 1", "Agent 2", "Agent 3", "Agent 4", "Agent 5"]
    );
    let ids: Vec<AgentId> = listed.iter().map(|a| a.id.clone()).collect();
    let expected: Vec<AgentId> = pool.iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, expected);
}

async fn insert_after_replace_goes_last(store: &dyn RosterStore) {
    store
        .replace_agents(vec![AgentRecord::new("A"), AgentRecord::new("B")])
        .await
        .unwrap();
    store.insert_agent(AgentRecord::new("C")).await.unwrap();
    assert_eq!(names(&store.list_agents().await.unwrap()), vec!["A", "B", "C"]);
}

async fn contacts_keep_insertion_order(store: &dyn RosterStore) {
    store
        .replace_contacts(contacts(&["Ann", "Bob", "Cid"]))
        .await
        .unwrap();
    store.append_contacts(contacts(&["Dee", "Eve"])).await.unwrap();

    let listed = store.list_contacts().await.unwrap();
    assert_eq!(first_names(&listed), vec!["Ann", "Bob", "Cid", "Dee", "Eve"]);
}

async fn replace_contacts_drops_old_rows(store: &dyn RosterStore) {
    store.replace_contacts(contacts(&["Old"])).await.unwrap();
    store
        .replace_contacts(contacts(&["New1", "New2"]))
        .await
        .unwrap();
    assert_eq!(
        first_names(&store.list_contacts().await.unwrap()),
        vec!["New1", "New2"]
    );
}

async fn contact_fields_round_trip(store: &dyn RosterStore) {
    let agent = store.insert_agent(AgentRecord::new("A")).await.unwrap();
    let contact = ContactRecord::new("Ann", "555-1", "after 5pm").assigned_to(&agent.id);
    store.replace_contacts(vec![contact.clone()]).await.unwrap();

    let listed = store.list_contacts().await.unwrap();
    assert_eq!(listed, vec![contact]);
}

async fn bulk_reassign_changes_only_agent(store: &dyn RosterStore) {
    let a = store.insert_agent(AgentRecord::new("A")).await.unwrap();
    let b = store.insert_agent(AgentRecord::new("B")).await.unwrap();
    let rows: Vec<ContactRecord> = contacts(&["Ann", "Bob"])
        .into_iter()
        .map(|c| c.assigned_to(&a.id))
        .collect();
    store.replace_contacts(rows.clone()).await.unwrap();

    store
        .bulk_reassign(&[Assignment {
            contact_id: rows[1].id.clone(),
            agent_id: b.id.clone(),
        }])
        .await
        .unwrap();

    let listed = store.list_contacts().await.unwrap();
    assert_eq!(listed[0], rows[0]);
    assert_eq!(listed[1].agent_id, Some(b.id.clone()));
    assert_eq!(listed[1].first_name, rows[1].first_name);
    assert_eq!(listed[1].phone, rows[1].phone);
}

async fn bulk_reassign_unknown_contact_changes_nothing(store: &dyn RosterStore) {
    let a = store.insert_agent(AgentRecord::new("A")).await.unwrap();
    let b = store.insert_agent(AgentRecord::new("B")).await.unwrap();
    let rows: Vec<ContactRecord> = contacts(&["Ann"])
        .into_iter()
        .map(|c| c.assigned_to(&a.id))
        .collect();
    store.replace_contacts(rows.clone()).await.unwrap();

    let ghost = ContactId::new();
    let err = store
        .bulk_reassign(&[
            Assignment {
                contact_id: rows[0].id.clone(),
                agent_id: b.id.clone(),
            },
            Assignment {
                contact_id: ghost.clone(),
                agent_id: b.id.clone(),
            },
        ])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StorageError::ContactNotFound {
            contact_id: ghost.0.clone()
        }
    );
    assert_eq!(store.list_contacts().await.unwrap(), rows);
}

async fn bulk_reassign_unknown_agent_changes_nothing(store: &dyn RosterStore) {
    let a = store.insert_agent(AgentRecord::new("A")).await.unwrap();
    let rows: Vec<ContactRecord> = contacts(&["Ann"])
        .into_iter()
        .map(|c| c.assigned_to(&a.id))
        .collect();
    store.replace_contacts(rows.clone()).await.unwrap();

    let err = store
        .bulk_reassign(&[Assignment {
            contact_id: rows[0].id.clone(),
            agent_id: AgentId::new(),
        }])
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::AgentNotFound { .. }));
    assert_eq!(store.list_contacts().await.unwrap(), rows);
}

async fn empty_writes_are_accepted(store: &dyn RosterStore) {
    store.replace_contacts(Vec::new()).await.unwrap();
    store.append_contacts(Vec::new()).await.unwrap();
    store.bulk_reassign(&[]).await.unwrap();
    assert!(store.list_contacts().await.unwrap().is_empty());
}

// ===========================================================================
// MemoryRoster
// ===========================================================================

#[tokio::test]
async fn memory_agents_list_in_registration_order() {
    agents_list_in_registration_order(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_replace_agents_discards_previous_pool() {
    replace_agents_discards_previous_pool(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_insert_after_replace_goes_last() {
    insert_after_replace_goes_last(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_contacts_keep_insertion_order() {
    contacts_keep_insertion_order(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_replace_contacts_drops_old_rows() {
    replace_contacts_drops_old_rows(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_contact_fields_round_trip() {
    contact_fields_round_trip(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_bulk_reassign_changes_only_agent() {
    bulk_reassign_changes_only_agent(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_bulk_reassign_unknown_contact_changes_nothing() {
    bulk_reassign_unknown_contact_changes_nothing(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_bulk_reassign_unknown_agent_changes_nothing() {
    bulk_reassign_unknown_agent_changes_nothing(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_empty_writes_are_accepted() {
    empty_writes_are_accepted(&MemoryRoster::new()).await;
}

#[tokio::test]
async fn memory_injected_failure_leaves_state_untouched() {
    let store = MemoryRoster::new();
    store.replace_contacts(contacts(&["Ann"])).await.unwrap();
    store.fail_next_write();

    let err = store.replace_contacts(contacts(&["Bob"])).await.unwrap_err();
    assert!(matches!(err, StorageError::Backend(_)));
    assert_eq!(first_names(&store.list_contacts().await.unwrap()), vec!["Ann"]);

    // Only the next write fails.
    store.replace_contacts(contacts(&["Cid"])).await.unwrap();
}

// ===========================================================================
// SurrealRoster
// ===========================================================================

#[tokio::test]
async fn surreal_agents_list_in_registration_order() {
    agents_list_in_registration_order(&surreal().await).await;
}

#[tokio::test]
async fn surreal_replace_agents_discards_previous_pool() {
    replace_agents_discards_previous_pool(&surreal().await).await;
}

#[tokio::test]
async fn surreal_insert_after_replace_goes_last() {
    insert_after_replace_goes_last(&surreal().await).await;
}

#[tokio::test]
async fn surreal_contacts_keep_insertion_order() {
    contacts_keep_insertion_order(&surreal().await).await;
}

#[tokio::test]
async fn surreal_replace_contacts_drops_old_rows() {
    replace_contacts_drops_old_rows(&surreal().await).await;
}

#[tokio::test]
async fn surreal_contact_fields_round_trip() {
    contact_fields_round_trip(&surreal().await).await;
}

#[tokio::test]
async fn surreal_bulk_reassign_changes_only_agent() {
    bulk_reassign_changes_only_agent(&surreal().await).await;
}

#[tokio::test]
async fn surreal_bulk_reassign_unknown_contact_changes_nothing() {
    bulk_reassign_unknown_contact_changes_nothing(&surreal().await).await;
}

#[tokio::test]
async fn surreal_bulk_reassign_unknown_agent_changes_nothing() {
    bulk_reassign_unknown_agent_changes_nothing(&surreal().await).await;
}

#[tokio::test]
async fn surreal_empty_writes_are_accepted() {
    empty_writes_are_accepted(&surreal().await).await;
}
