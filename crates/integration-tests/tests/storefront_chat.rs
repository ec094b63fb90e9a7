//! Integration tests for the chat API.
//!
//! The storefront runs with a scripted provider so replies, failures and
//! hangs are deterministic. Typing delays are zero.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use freshking_core::{Cart, ChatRole};
use freshking_integration_tests::{Reply, TestContext, parse_sse};
use freshking_storefront::llm::{CompletionError, GENERIC_NOTICE, RATE_LIMIT_NOTICE};

fn messages(body: &Value) -> &Vec<Value> {
    body["snapshot"]["messages"]
        .as_array()
        .expect("snapshot.messages")
}

async fn snapshot(ctx: &TestContext) -> Value {
    ctx.client
        .get(ctx.url("/chat/messages"))
        .send()
        .await
        .expect("GET /chat/messages")
        .json()
        .await
        .expect("snapshot json")
}

#[tokio::test]
async fn test_send_message_records_turn() {
    let (ctx, provider) = TestContext::scripted([Reply::Text("Try our **Buddha Bowl**!")]).await;

    let (status, body) = ctx.chat("What do you recommend?").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["busy"], false);
    assert_eq!(body["navigate_to"], Value::Null);
    let messages = messages(&body);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "What do you recommend?");
    assert_eq!(messages[1]["role"], "assistant");
    assert!(
        messages[1]["html"]
            .as_str()
            .expect("assistant html")
            .contains("<strong>Buddha Bowl</strong>")
    );

    let histories = provider.histories();
    assert_eq!(histories.len(), 1);
    assert_eq!(histories[0][0].role, ChatRole::System);
    assert!(histories[0][0].content.contains("FreshBot"));
    assert_eq!(histories[0][1].content, "What do you recommend?");
}

#[tokio::test]
async fn test_history_carries_previous_turns() {
    let (ctx, provider) =
        TestContext::scripted([Reply::Text("Hello!"), Reply::Text("Sure.")]).await;

    ctx.chat("hi").await;
    ctx.chat("tell me more").await;

    let histories = provider.histories();
    assert_eq!(histories[1].len(), 4);
    assert_eq!(histories[1][2].role, ChatRole::Assistant);
    assert_eq!(histories[1][3].content, "tell me more");
}

#[tokio::test]
async fn test_blank_message_is_ignored() {
    let (ctx, provider) = TestContext::scripted([]).await;

    let (status, body) = ctx.chat("   ").await;

    assert_eq!(status, StatusCode::OK);
    assert!(messages(&body).is_empty());
    assert!(provider.histories().is_empty());
}

#[tokio::test]
async fn test_add_to_cart_directive_updates_session_cart() {
    let (ctx, _) =
        TestContext::scripted([Reply::Text("Great pick! [ADD_TO_CART:poke-bowl] Enjoy.")]).await;

    let (status, body) = ctx.chat("Add a poke bowl please").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart_count"], 1);
    let messages = messages(&body);
    assert_eq!(messages.len(), 3);
    assert!(
        messages[1]["content"]
            .as_str()
            .expect("content")
            .starts_with("✨ **Added to Cart!**\n\nI've added `Poke Bowl` to your cart.")
    );
    assert!(
        messages
            .iter()
            .all(|m| !m["content"].as_str().unwrap_or_default().contains("[ADD_TO_CART"))
    );

    assert!(ctx.cart_count().await.contains(">1<"));
    let (_, cart) = ctx.get_text("/cart").await;
    assert!(cart.contains("Poke Bowl"));
}

#[tokio::test]
async fn test_add_to_cart_on_full_line_keeps_turn() {
    let (ctx, _) = TestContext::scripted([Reply::Text(
        "Added! [ADD_TO_CART:buddha-bowl] [NAVIGATE:/cart]",
    )])
    .await;
    let max = Cart::MAX_QUANTITY.to_string();
    ctx.post_form("/cart/update", &[("item_id", "buddha-bowl"), ("quantity", &max)])
        .await;

    let (status, body) = ctx.chat("One more buddha bowl").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["navigate_to"], "/cart");
    assert_eq!(body["cart_count"], Cart::MAX_QUANTITY);
    let contents: Vec<_> = messages(&body)
        .iter()
        .map(|m| m["content"].as_str().expect("content"))
        .collect();
    assert_eq!(contents, ["One more buddha bowl", "Added!"]);
    assert!(ctx.cart_count().await.contains(&format!(">{max}<")));
}

#[tokio::test]
async fn test_unknown_item_directive_is_dropped() {
    let (ctx, _) = TestContext::scripted([Reply::Text("Here you go [ADD_TO_CART:pizza]")]).await;

    let (status, body) = ctx.chat("add pizza").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart_count"], 0);
    assert_eq!(messages(&body).len(), 2);
}

#[tokio::test]
async fn test_navigate_directive() {
    let (ctx, _) = TestContext::scripted([Reply::Text(
        "Our rewards program is great! [NAVIGATE:/rewards]",
    )])
    .await;

    let (_, body) = ctx.chat("tell me about rewards").await;

    assert_eq!(body["navigate_to"], "/rewards");
    let reply = messages(&body)[1]["content"].as_str().expect("content");
    assert!(!reply.contains("NAVIGATE"));
}

#[tokio::test]
async fn test_rate_limited_provider_shows_notice() {
    let (ctx, _) = TestContext::scripted([Reply::Fail(CompletionError::RateLimited {
        retry_after: Some(5),
    })])
    .await;

    let (status, body) = ctx.chat("hi").await;

    assert_eq!(status, StatusCode::OK);
    let last = messages(&body).last().expect("notice");
    assert_eq!(last["role"], "assistant");
    assert_eq!(last["content"], RATE_LIMIT_NOTICE);
}

#[tokio::test]
async fn test_busy_conversation_rejects_second_message_until_cancelled() {
    let (ctx, provider) = TestContext::scripted([Reply::Text("Hi!"), Reply::Hang]).await;
    // Establish the session cookie first
    ctx.chat("hello").await;

    let background = {
        let client = ctx.client.clone();
        let url = ctx.url("/chat/messages");
        tokio::spawn(async move {
            client
                .post(url)
                .json(&serde_json::json!({ "text": "slow question" }))
                .send()
                .await
                .expect("POST")
        })
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        while provider.histories().len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("second call started");

    let (status, _) = ctx.chat("another").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let cancelled: Value = ctx
        .client
        .post(ctx.url("/chat/cancel"))
        .send()
        .await
        .expect("POST /chat/cancel")
        .json()
        .await
        .expect("json");
    assert_eq!(cancelled["cancelled"], true);

    let response = background.await.expect("join");
    assert_eq!(response.status().as_u16(), 200);

    let snapshot = snapshot(&ctx).await;
    assert_eq!(snapshot["busy"], false);
    let last = snapshot["messages"]
        .as_array()
        .and_then(|m| m.last())
        .expect("notice");
    assert_eq!(last["content"], GENERIC_NOTICE);
}

#[tokio::test]
async fn test_reset_clears_conversation() {
    let (ctx, _) = TestContext::scripted([Reply::Text("Hello!")]).await;
    ctx.chat("hi").await;

    let response = ctx
        .client
        .delete(ctx.url("/chat"))
        .send()
        .await
        .expect("DELETE /chat");
    assert_eq!(response.status().as_u16(), 204);

    let snapshot = snapshot(&ctx).await;
    assert!(snapshot["messages"].as_array().expect("messages").is_empty());
}

#[tokio::test]
async fn test_conversations_are_per_visitor() {
    let (ctx, _) = TestContext::scripted([Reply::Text("Hello!")]).await;
    ctx.chat("hi").await;

    let other: Value = TestContext::visitor()
        .get(ctx.url("/chat/messages"))
        .send()
        .await
        .expect("GET")
        .json()
        .await
        .expect("json");

    assert!(other["messages"].as_array().expect("messages").is_empty());
}

#[tokio::test]
async fn test_reveal_streams_newest_reply_once() {
    let (ctx, _) = TestContext::scripted([Reply::Text("Fresh & tasty!")]).await;
    let (_, body) = ctx.chat("hi").await;
    let content = messages(&body)[1]["content"]
        .as_str()
        .expect("content")
        .to_string();

    let response = ctx
        .client
        .get(ctx.url("/chat/reveal"))
        .send()
        .await
        .expect("GET /chat/reveal");
    assert_eq!(response.status().as_u16(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .expect("ascii")
            .starts_with("text/event-stream")
    );
    let events = parse_sse(&response.text().await.expect("body"));

    let typed: String = events
        .iter()
        .filter(|e| e.event == "char")
        .map(|e| {
            let frame: Value = serde_json::from_str(&e.data).expect("frame json");
            frame["ch"].as_str().expect("ch").to_string()
        })
        .collect();
    assert_eq!(typed, content);

    let done = events.last().expect("done event");
    assert_eq!(done.event, "done");
    let done: Value = serde_json::from_str(&done.data).expect("done json");
    assert_eq!(done["show_investor_cta"], false);

    let again = ctx
        .client
        .get(ctx.url("/chat/reveal"))
        .send()
        .await
        .expect("GET /chat/reveal");
    assert_eq!(again.status().as_u16(), 204);
    assert!(snapshot(&ctx).await["last_revealed"].is_number());
}

#[tokio::test]
async fn test_reveal_flags_investor_topics() {
    let (ctx, _) =
        TestContext::scripted([Reply::Text("Our Series A round is open to new investors.")]).await;
    ctx.chat("Can I invest?").await;

    let body = ctx
        .client
        .get(ctx.url("/chat/reveal"))
        .send()
        .await
        .expect("GET /chat/reveal")
        .text()
        .await
        .expect("body");
    let events = parse_sse(&body);

    let done = events.iter().find(|e| e.event == "done").expect("done");
    assert!(done.data.contains(r#""show_investor_cta":true"#));
}

#[tokio::test]
async fn test_reveal_without_conversation_is_empty() {
    let (ctx, _) = TestContext::scripted([]).await;
    let response = ctx
        .client
        .get(ctx.url("/chat/reveal"))
        .send()
        .await
        .expect("GET /chat/reveal");
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn test_chat_api_is_rate_limited() {
    let (ctx, _) = TestContext::scripted([]).await;

    let mut statuses = Vec::new();
    for _ in 0..15 {
        let response = ctx
            .client
            .get(ctx.url("/chat/messages"))
            .send()
            .await
            .expect("GET /chat/messages");
        statuses.push(response.status().as_u16());
    }

    assert_eq!(statuses[0], 200);
    assert!(statuses.contains(&429));

    // Pages are not limited
    let (status, _) = ctx.get_text("/cart/count").await;
    assert_eq!(status, StatusCode::OK);
}
