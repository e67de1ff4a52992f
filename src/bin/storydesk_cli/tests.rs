#![deny(clippy::all, clippy::pedantic)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use serde_json::json;
use storydesk::api_types::{Post, Region};
use storydesk::application::{
    error::AppError,
    pagination::PaginationPolicy,
    posts::DeletePolicy,
    session::{MemorySessionStore, Session, SessionStore},
};
use storydesk::config::{
    ApiSettings, LogFormat, LoggingSettings, SessionSettings, Settings, SyncSettings,
};
use storydesk::infra::session::FileSessionStore;
use tempfile::{NamedTempFile, TempDir, tempdir};
use tracing::level_filters::LevelFilter;

use crate::args::{
    AuthCmd, EntityCmd, ListArgs, PasswordArgs, PayloadArgs, PostsCmd, StoriesCmd,
};
use crate::client::{CliError, Ctx, build_ctx};
use crate::handlers::{auth, entities, posts, stories};

fn settings(dir: &Path) -> Settings {
    Settings {
        api: ApiSettings {
            base_url: None,
            timeout: Duration::from_secs(5),
        },
        session: SessionSettings {
            path: dir.join("session.json"),
        },
        logging: LoggingSettings {
            level: LevelFilter::OFF,
            format: LogFormat::Compact,
        },
        pagination: PaginationPolicy::default(),
        sync: SyncSettings {
            delete_policy: DeletePolicy::Detach,
        },
    }
}

fn ctx(server: &MockServer) -> (Ctx, TempDir) {
    let dir = tempdir().expect("tmp dir");
    let session: Arc<dyn SessionStore> =
        Arc::new(MemorySessionStore::with_session(Session::new("tok", None)));
    let ctx = Ctx::new(&server.base_url(), settings(dir.path()), session).expect("ctx");
    (ctx, dir)
}

fn tmp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    std::io::Write::write_all(&mut file, contents.as_bytes()).expect("write tmp");
    file
}

fn inline(data: serde_json::Value) -> PayloadArgs {
    PayloadArgs {
        data: Some(data.to_string()),
        data_file: None,
    }
}

#[test]
fn build_ctx_errors_without_site() {
    let dir = tempdir().expect("tmp dir");
    let result = build_ctx(settings(dir.path()));
    assert!(matches!(result, Err(CliError::MissingSite)));
}

#[test]
fn read_value_prefers_file_over_inline() -> Result<(), CliError> {
    let file = tmp_file("from-file");
    let val = crate::io::read_value(Some("inline".into()), Some(file.path().to_path_buf()))?;
    assert_eq!(val, "from-file");
    Ok(())
}

#[test]
fn password_file_wins_and_loses_its_newline() -> Result<(), CliError> {
    let file = tmp_file("s3cret\n");
    let password = crate::io::read_password(PasswordArgs {
        password_file: Some(file.path().to_path_buf()),
        password_env: Some("from-env".into()),
    })?;
    assert_eq!(password, "s3cret");

    let err = crate::io::read_password(PasswordArgs {
        password_file: None,
        password_env: None,
    })
    .expect_err("no password");
    assert!(matches!(err, CliError::MissingPassword));
    Ok(())
}

#[test]
fn merge_fields_needs_an_object() {
    let region = Region {
        id: "r1".into(),
        region_name: "Europe".into(),
        ..Region::default()
    };
    let err = crate::io::merge_fields(&region, json!(["not", "an", "object"]))
        .expect_err("array patch");
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[tokio::test]
async fn regions_list_uses_default_page_size() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/admin/regions")
            .header("authorization", "Bearer tok")
            .query_param("page", "1")
            .query_param("limit", "20");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[{"_id":"r1","regionName":"Europe"}],"total":1,"totalPages":1}"#);
    });

    let (ctx, _dir) = ctx(&server);
    entities::handle::<Region>(
        &ctx,
        EntityCmd::List(ListArgs {
            page: 1,
            limit: None,
            search: None,
            all: false,
        }),
    )
    .await?;

    mock.assert();
    Ok(())
}

#[tokio::test]
async fn regions_update_overlays_fields_on_the_stored_record() -> Result<(), CliError> {
    let server = MockServer::start();
    let fetch = server.mock(|when, then| {
        when.method("GET").path("/api/admin/regions/r1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"r1","regionName":"Europe","code":"EU"}"#);
    });
    let put = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/regions/r1")
            .json_body(json!({"_id": "r1", "regionName": "Europa", "code": "EU"}));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"r1","regionName":"Europa","code":"EU"}"#);
    });

    let (ctx, _dir) = ctx(&server);
    entities::handle::<Region>(
        &ctx,
        EntityCmd::Update {
            id: "r1".into(),
            payload: inline(json!({"regionName": "Europa"})),
        },
    )
    .await?;

    fetch.assert();
    put.assert();
    Ok(())
}

#[tokio::test]
async fn incomplete_record_is_rejected_before_any_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/api/admin/regions");
        then.status(201).body("{}");
    });

    let (ctx, _dir) = ctx(&server);
    let err = entities::handle::<Region>(&ctx, EntityCmd::Create(inline(json!({"regionName": " "}))))
        .await
        .expect_err("blank name");

    assert!(matches!(err, CliError::App(AppError::Domain(_))));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn posts_save_links_the_new_post_into_each_context() -> Result<(), CliError> {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/api/admin/posts")
            .json_body_includes(r#"{"postTitle":"Grid outage"}"#);
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"data":{"_id":"p1","postTitle":"Grid outage","date":"2026-01-02T00:00:00Z"}}"#);
    });
    let get_c1 = server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts/c1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"c1","contextTitle":"Energy","posts":[{"postId":"p0","includeInContainer":false}]}"#);
    });
    let put_c1 = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/contexts/c1")
            .json_body(json!({"posts": [
                {"postId": "p0", "includeInContainer": false},
                {"postId": "p1", "includeInContainer": true}
            ]}));
        then.status(200).body("{}");
    });
    let get_c2 = server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts/c2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"c2","contextTitle":"Grid","posts":[]}"#);
    });
    let put_c2 = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/contexts/c2")
            .json_body(json!({"posts": [{"postId": "p1", "includeInContainer": true}]}));
        then.status(204);
    });

    let (ctx, _dir) = ctx(&server);
    posts::handle(
        &ctx,
        PostsCmd::Save {
            payload: inline(json!({"postTitle": "Grid outage", "date": "2026-01-02T00:00:00Z"})),
            contexts: vec!["c1".into(), "c2".into(), "c1".into()],
            include_in_container: true,
        },
    )
    .await?;

    create.assert();
    get_c1.assert();
    put_c1.assert();
    get_c2.assert();
    put_c2.assert();
    Ok(())
}

#[tokio::test]
async fn posts_save_reports_contexts_that_failed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("PUT").path("/api/admin/posts/p1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"p1","postTitle":"T","date":"2026-01-02T00:00:00Z"}"#);
    });
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts/c1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"c1","posts":[]}"#);
    });
    let put_c1 = server.mock(|when, then| {
        when.method("PUT").path("/api/admin/contexts/c1");
        then.status(200).body("{}");
    });
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts/c2");
        then.status(500).body(r#"{"message":"boom"}"#);
    });

    let (ctx, _dir) = ctx(&server);
    let err = posts::handle(
        &ctx,
        PostsCmd::Save {
            payload: inline(json!({"_id": "p1", "postTitle": "T", "date": "2026-01-02T00:00:00Z"})),
            contexts: vec!["c1".into(), "c2".into()],
            include_in_container: false,
        },
    )
    .await
    .expect_err("partial sync");

    put_c1.assert();
    match err {
        CliError::PartialSync { post_id, failed } => {
            assert_eq!(post_id, "p1");
            assert_eq!(failed, "c2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn posts_delete_detaches_before_deleting() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts").query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"_id":"c1","posts":[{"postId":"p1"},{"postId":"p2"}]},{"_id":"c2","posts":[]}]"#);
    });
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts/c1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"c1","posts":[{"postId":"p1"},{"postId":"p2"}]}"#);
    });
    let detach = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/contexts/c1")
            .json_body(json!({"posts": [{"postId": "p2", "includeInContainer": false}]}));
        then.status(200).body("{}");
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/api/admin/posts/p1");
        then.status(204);
    });

    let (ctx, _dir) = ctx(&server);
    posts::handle(
        &ctx,
        PostsCmd::Delete {
            id: "p1".into(),
            policy: None,
        },
    )
    .await?;

    detach.assert();
    delete.assert();
    Ok(())
}

#[tokio::test]
async fn orphan_policy_deletes_without_touching_contexts() -> Result<(), CliError> {
    let server = MockServer::start();
    let contexts = server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts");
        then.status(200).body("[]");
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/api/admin/posts/p1");
        then.status(200).body("{}");
    });

    let (ctx, _dir) = ctx(&server);
    posts::handle(
        &ctx,
        PostsCmd::Delete {
            id: "p1".into(),
            policy: Some(crate::args::DeletePolicyArg::Orphan),
        },
    )
    .await?;

    delete.assert();
    assert_eq!(contexts.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn stories_include_rewrites_only_the_flag() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/contexts/c1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"c1","posts":[{"postId":"p1"},{"postId":"p2"}]}"#);
    });
    let put = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/contexts/c1")
            .json_body(json!({"posts": [
                {"postId": "p1", "includeInContainer": false},
                {"postId": "p2", "includeInContainer": true}
            ]}));
        then.status(200).body("{}");
    });

    let (ctx, _dir) = ctx(&server);
    stories::handle(
        &ctx,
        StoriesCmd::Include {
            context_id: "c1".into(),
            post_id: "p2".into(),
        },
    )
    .await?;

    put.assert();
    Ok(())
}

#[tokio::test]
async fn login_persists_the_session_and_logout_clears_it() -> Result<(), CliError> {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/users/login")
            .json_body(json!({"email": "ed@example.com", "password": "pw"}));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"token":"fresh","user":{"_id":"u1","email":"ed@example.com"}}"#);
    });

    let dir = tempdir().expect("tmp dir");
    let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));
    let ctx = Ctx::new(&server.base_url(), settings(dir.path()), store.clone())?;

    auth::handle(
        &ctx,
        AuthCmd::Login {
            email: "ed@example.com".into(),
            password: PasswordArgs {
                password_file: None,
                password_env: Some("pw".into()),
            },
        },
    )
    .await?;

    login.assert();
    let session = store.load().await.expect("readable").expect("signed in");
    assert_eq!(session.token, "fresh");
    assert_eq!(session.email.as_deref(), Some("ed@example.com"));

    auth::handle(&ctx, AuthCmd::Logout).await?;
    assert!(store.load().await.expect("readable").is_none());
    Ok(())
}

#[tokio::test]
async fn commands_need_a_session() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/api/admin/posts/p1");
        then.status(200).body("{}");
    });

    let dir = tempdir().expect("tmp dir");
    let ctx = Ctx::new(
        &server.base_url(),
        settings(dir.path()),
        Arc::new(MemorySessionStore::new()),
    )
    .expect("ctx");
    let err = entities::get::<Post>(&ctx, "p1").await.expect_err("signed out");

    assert!(err.to_string().contains("Not signed in"), "{err}");
    assert_eq!(mock.hits(), 0);
}
