mod common;

use axum::http::StatusCode;

use common::{
    DownCache, body_string, get, link_id, post_form, send, test_app, test_app_with_cache,
};
use onetime_text::services::secret_id::SecretId;
use onetime_text::web::pages::INVALID_LINK_MESSAGE;

#[tokio::test]
async fn index_renders_form() {
    let app = test_app();

    let res = send(&app, get("/")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains(r#"<form method="post""#));
}

#[tokio::test]
async fn form_rejects_durations_outside_the_fixed_set() {
    let app = test_app();

    for duration in ["5", "-1", "1.5", "", "one"] {
        let res = send(
            &app,
            post_form("/create", &format!("text=secret&duration={duration}")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "duration={duration:?}");
    }

    let res = send(&app, post_form("/create", "text=secret&duration=6")).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn pre_get_confirms_without_consuming() {
    let app = test_app();

    let res = send(&app, post_form("/create", "text=top+secret&duration=1")).await;
    let id = link_id(&body_string(res).await, "pre_get/");

    for _ in 0..2 {
        let res = send(&app, get(&format!("/pre_get/{id}"))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(link_id(&body_string(res).await, "/get/"), id);
    }

    let res = send(&app, get(&format!("/get/{id}"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("top secret"));
}

#[tokio::test]
async fn get_consumes_and_second_visit_shows_invalid_message() {
    let app = test_app();

    let res = send(&app, post_form("/create", "text=once&duration=24")).await;
    let id = link_id(&body_string(res).await, "pre_get/");

    let res = send(&app, get(&format!("/get/{id}"))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(&app, get(&format!("/get/{id}"))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_string(res).await.contains(INVALID_LINK_MESSAGE));

    let res = send(&app, get(&format!("/pre_get/{id}"))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_string(res).await.contains(INVALID_LINK_MESSAGE));
}

#[tokio::test]
async fn secret_text_is_html_escaped() {
    let app = test_app();

    let res = send(
        &app,
        post_form("/create", "text=%3Cb%3Ebold%3C%2Fb%3E&duration=1"),
    )
    .await;
    let id = link_id(&body_string(res).await, "pre_get/");

    let html = body_string(send(&app, get(&format!("/get/{id}"))).await).await;
    assert!(!html.contains("<b>bold"));
    assert!(html.contains("&lt;b&gt;bold"));
}

#[tokio::test]
async fn pages_report_store_outage_instead_of_invalid_link() {
    let app = test_app_with_cache(DownCache, None);
    let id = SecretId::generate();

    for path in [format!("/pre_get/{id}"), format!("/get/{id}")] {
        let res = send(&app, get(&path)).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE, "{path}");
        assert!(!body_string(res).await.contains(INVALID_LINK_MESSAGE));
    }

    let res = send(&app, post_form("/create", "text=secret&duration=1")).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
