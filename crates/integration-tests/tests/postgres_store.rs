//! Store tests against a real `PostgreSQL` database.
//!
//! These tests require `TEST_DATABASE_URL` to point at a database the tests
//! may migrate and write to. Each test uses unique names so runs can share
//! a database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use phonebook_core::{PersonName, Username};
use phonebook_integration_tests::TestApp;
use phonebook_server::config::StoreKind;
use phonebook_server::db::{PgStore, PhonebookStore, RepositoryError};
use phonebook_server::models::NewPerson;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn store() -> PgStore {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
    let pool = PgPool::connect(&url).await.expect("failed to connect");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("failed to migrate");
    PgStore::new(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..12])
}

fn new_person(name: &str) -> NewPerson {
    NewPerson {
        name: PersonName::parse(name).unwrap(),
        phone: None,
        street: "Main St".to_string(),
        city: "Metropolis".to_string(),
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_person_name_is_unique() {
    let store = store().await;
    let name = unique("Bob ");

    store.insert_person(&new_person(&name)).await.unwrap();
    let err = store.insert_person(&new_person(&name)).await.unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_insert_for_user_rolls_back_on_conflict() {
    let store = store().await;
    let user = store
        .create_user(&Username::parse(&unique("u")).unwrap())
        .await
        .unwrap();
    let name = unique("Bob ");
    store.insert_person(&new_person(&name)).await.unwrap();

    let err = store
        .insert_person_for_user(user.id, &new_person(&name))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert!(user.friends.is_empty());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_add_friend_twice_keeps_one_row() {
    let store = store().await;
    let user = store
        .create_user(&Username::parse(&unique("u")).unwrap())
        .await
        .unwrap();
    let person = store
        .insert_person(&new_person(&unique("Carol ")))
        .await
        .unwrap();

    assert!(store.add_friend(user.id, person.id).await.unwrap());
    assert!(!store.add_friend(user.id, person.id).await.unwrap());

    let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.friends, vec![person]);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_graphql_scenario_over_postgres() {
    let app = TestApp::with_store(Arc::new(store().await), StoreKind::Postgres);
    let username = unique("u");
    let person = unique("Bob ");
    let token = app.sign_up(&username).await;

    let added = app
        .graphql(
            "mutation($n: String!) { addPerson(name: $n, street: \"Main St\", city: \"Metropolis\") { name } }",
            json!({ "n": person }),
            Some(&token),
        )
        .await
        .json();
    assert_eq!(added["data"]["addPerson"]["name"], person.as_str());

    let me = app
        .graphql("{ me { friends { name } } }", json!({}), Some(&token))
        .await
        .json();
    assert_eq!(me["data"]["me"]["friends"], json!([{ "name": person }]));
}
