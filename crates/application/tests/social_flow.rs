use application::SocialApp;
use config::{Config, StorageBackend};
use domain::DomainError;

async fn migrated_app() -> SocialApp {
    let app = SocialApp::in_memory();
    app.migrate().await.unwrap();
    app
}

#[tokio::test]
async fn register_follow_post_and_comment() {
    let app = migrated_app().await;

    let alice = app
        .user_service
        .register("alice", "alice@example.com", "s3cret!")
        .await
        .unwrap();
    let bob = app
        .user_service
        .register("bob", "bob@example.com", "hunter22")
        .await
        .unwrap();

    // Follow updates both counters
    app.follow_service.follow(bob.id(), alice.id()).await.unwrap();
    let alice = app.user_service.get_user_by_id(alice.id()).await.unwrap();
    let bob = app.user_service.get_user_by_id(bob.id()).await.unwrap();
    assert_eq!(alice.followers_count(), 1);
    assert_eq!(bob.following_count(), 1);
    assert!(app.follow_service.is_following(bob.id(), alice.id()).await.unwrap());

    let post = app
        .post_service
        .create_post(alice.id(), "Hey @Bob, shipping #Rust #rust today", Vec::new())
        .await
        .unwrap();
    assert_eq!(post.hashtags().iter().collect::<Vec<_>>(), vec!["rust"]);
    assert_eq!(post.mentions().iter().collect::<Vec<_>>(), vec!["bob"]);

    let tagged = app.post_service.posts_by_hashtag("#RUST").await.unwrap();
    assert_eq!(tagged.len(), 1);

    let comment = app
        .post_service
        .add_comment(post.id(), bob.id(), "Nice!", None)
        .await
        .unwrap();
    let reply = app
        .post_service
        .add_comment(post.id(), alice.id(), "Thanks", Some(comment.id().to_string()))
        .await
        .unwrap();
    assert!(reply.is_reply());

    let post = app.post_service.get_post(post.id()).await.unwrap();
    assert_eq!(post.comments_count(), 2);
    assert_eq!(app.post_service.replies_to(comment.id()).await.unwrap().len(), 1);

    app.follow_service.unfollow(bob.id(), alice.id()).await.unwrap();
    let alice = app.user_service.get_user_by_id(alice.id()).await.unwrap();
    assert_eq!(alice.followers_count(), 0);
}

#[tokio::test]
async fn duplicate_registration_and_bad_input_are_rejected() {
    let app = migrated_app().await;
    app.user_service
        .register("carol", "carol@example.com", "password")
        .await
        .unwrap();

    assert_eq!(
        app.user_service
            .register("carol", "other@example.com", "password")
            .await
            .unwrap_err(),
        DomainError::UsernameAlreadyExists("carol".into())
    );
    assert_eq!(
        app.user_service
            .register("carol2", "carol@example.com", "password")
            .await
            .unwrap_err(),
        DomainError::EmailAlreadyExists("carol@example.com".into())
    );
    assert!(matches!(
        app.user_service.register("cz", "cz@example.com", "password").await,
        Err(DomainError::ValidationError(_))
    ));

    let carol = app.user_service.find_user_by_username("carol").await.unwrap().unwrap();
    assert!(matches!(
        app.follow_service.follow(carol.id(), &carol.id().to_uppercase()).await,
        Err(DomainError::ValidationError(_))
    ));
}

#[tokio::test]
async fn authentication_checks_the_stored_hash() {
    let app = migrated_app().await;
    app.user_service
        .register("dave", "dave@example.com", "correct horse")
        .await
        .unwrap();

    let user = app
        .user_service
        .authenticate("dave@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(user.unwrap().username(), "dave");
    assert!(app
        .user_service
        .authenticate("dave@example.com", "wrong")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn sqlite_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        storage_backend: StorageBackend::Sqlite,
        database_path: dir.path().join("social.db").to_string_lossy().into_owned(),
        ..Config::default()
    };

    let user_id = {
        let app = SocialApp::new(&config).unwrap();
        app.migrate().await.unwrap();
        let user = app
            .user_service
            .register("erin", "erin@example.com", "password")
            .await
            .unwrap();
        user.id().to_string()
    };

    let app = SocialApp::new(&config).unwrap();
    let result = app.migrate().await.unwrap();
    assert!(result.applied_migrations.is_empty());

    let user = app.user_service.get_user_by_id(&user_id).await.unwrap();
    assert_eq!(user.email(), "erin@example.com");
}
