mod helpers;

use dialcast_core::AppError;
use helpers::setup_test_db;

fn numbers(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_replace_keeps_file_order() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let user = db.user("order").await;

    // Deliberately not sorted in any column order Postgres could fall back to
    let first: Vec<String> = (0..50).map(|i| format!("+1555{:04}", (i * 37) % 101)).collect();
    let report = db
        .subscribers
        .replace_for_user(user.id, first.clone(), false)
        .await
        .unwrap();
    assert_eq!(report.inserted, 50);
    assert_eq!(report.cleared, 0);
    assert_eq!(db.numbers(&user).await, first);

    // Appending keeps the earlier rows ahead of the new ones
    let second = numbers(&["+19990003", "+19990001", "+19990002"]);
    db.subscribers
        .replace_for_user(user.id, second.clone(), false)
        .await
        .unwrap();
    let mut expected = first.clone();
    expected.extend(second.iter().cloned());
    assert_eq!(db.numbers(&user).await, expected);

    // Clearing restarts the list in the new file's order
    let report = db
        .subscribers
        .replace_for_user(user.id, second.clone(), true)
        .await
        .unwrap();
    assert_eq!(report.cleared, 53);
    assert_eq!(report.inserted, 3);
    assert_eq!(db.numbers(&user).await, second);
}

#[tokio::test]
async fn test_replace_keeps_duplicates() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let user = db.user("dupes").await;

    let list = numbers(&["+15550001", "+15550001", "+15550002"]);
    db.subscribers
        .replace_for_user(user.id, list.clone(), false)
        .await
        .unwrap();
    assert_eq!(db.numbers(&user).await, list);
}

#[tokio::test]
async fn test_failed_insert_rolls_back_clear() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let user = db.user("atomic").await;
    let existing = numbers(&["+15550001", "+15550002"]);
    db.subscribers
        .replace_for_user(user.id, existing.clone(), false)
        .await
        .unwrap();

    // Postgres rejects NUL in text, so the insert fails after the DELETE ran
    let result = db
        .subscribers
        .replace_for_user(user.id, numbers(&["+15559999", "+1555\0"]), true)
        .await;
    assert!(matches!(result, Err(AppError::Database(_))));

    assert_eq!(db.numbers(&user).await, existing);
}

#[tokio::test]
async fn test_replace_is_scoped_to_user() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let alice = db.user("alice").await;
    let bob = db.user("bob").await;
    db.subscribers
        .replace_for_user(bob.id, numbers(&["+15550100"]), false)
        .await
        .unwrap();

    db.subscribers
        .replace_for_user(alice.id, numbers(&["+15550200"]), true)
        .await
        .unwrap();

    assert_eq!(db.numbers(&bob).await, numbers(&["+15550100"]));
    assert_eq!(db.numbers(&alice).await, numbers(&["+15550200"]));
}

#[tokio::test]
async fn test_delete_user_removes_everything() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let user = db.user("leaving").await;
    let other = db.user("staying").await;

    db.token(&user).await;
    let provider = db.provider(&user, "sip.example.com").await;
    let audio = db.audio_file(&user, "greeting").await;
    let second_audio = db.audio_file(&user, "reminder").await;
    db.settings
        .upsert_for_user(user.id, provider.id, audio.id)
        .await
        .unwrap();
    db.subscribers
        .replace_for_user(user.id, numbers(&["+15550001"]), false)
        .await
        .unwrap();

    db.token(&other).await;
    db.subscribers
        .replace_for_user(other.id, numbers(&["+15550002"]), false)
        .await
        .unwrap();

    let mut keys = db.users.delete_user(user.id).await.unwrap().unwrap();
    keys.sort();
    let mut expected = vec![audio.storage_key.clone(), second_audio.storage_key.clone()];
    expected.sort();
    assert_eq!(keys, expected);

    assert!(db.users.get_user(user.id).await.unwrap().is_none());
    for table in [
        "access_tokens",
        "campaign_settings",
        "subscribers",
        "audio_files",
        "telephony_providers",
    ] {
        assert_eq!(db.count(table, &user).await, 0, "{} not emptied", table);
    }

    assert!(db.users.get_user(other.id).await.unwrap().is_some());
    assert_eq!(db.count("access_tokens", &other).await, 1);
    assert_eq!(db.numbers(&other).await, numbers(&["+15550002"]));
}

#[tokio::test]
async fn test_delete_unknown_user_returns_none() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    assert!(db
        .users
        .delete_user(uuid::Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_delete_provider_drops_settings() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let user = db.user("provider").await;
    let provider = db.provider(&user, "sip.example.com").await;
    let audio = db.audio_file(&user, "greeting").await;
    db.settings
        .upsert_for_user(user.id, provider.id, audio.id)
        .await
        .unwrap();

    assert!(db.providers.delete_provider(user.id, provider.id).await.unwrap());

    assert!(db.settings.get_for_user(user.id).await.unwrap().is_none());
    assert!(db
        .audio_files
        .get_audio_file(user.id, audio.id)
        .await
        .unwrap()
        .is_some());
    assert!(!db.providers.delete_provider(user.id, provider.id).await.unwrap());
}

#[tokio::test]
async fn test_delete_audio_file_drops_settings() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let user = db.user("audio").await;
    let provider = db.provider(&user, "sip.example.com").await;
    let audio = db.audio_file(&user, "greeting").await;
    db.settings
        .upsert_for_user(user.id, provider.id, audio.id)
        .await
        .unwrap();

    let deleted = db
        .audio_files
        .delete_audio_file(user.id, audio.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.storage_key, audio.storage_key);

    assert!(db.settings.get_for_user(user.id).await.unwrap().is_none());
    assert!(db
        .providers
        .get_provider(user.id, provider.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_delete_leaves_other_users_settings() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let owner = db.user("owner").await;
    let intruder = db.user("intruder").await;
    let provider = db.provider(&owner, "sip.example.com").await;
    let audio = db.audio_file(&owner, "greeting").await;
    db.settings
        .upsert_for_user(owner.id, provider.id, audio.id)
        .await
        .unwrap();

    assert!(!db
        .providers
        .delete_provider(intruder.id, provider.id)
        .await
        .unwrap());
    assert!(db
        .audio_files
        .delete_audio_file(intruder.id, audio.id)
        .await
        .unwrap()
        .is_none());

    assert!(db.settings.get_for_user(owner.id).await.unwrap().is_some());
}
