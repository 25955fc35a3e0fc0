#[cfg(test)]
mod integration_tests {
    use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    use serde_json::{json, Value};

    use crate::test_utils::test_utils::{
        create_superuser, login, register_account, register_and_login, setup_test_server,
    };

    fn token_header(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Token {token}")).unwrap()
    }

    async fn create_product(server: &TestServer, token: &str, body: Value) -> Value {
        let response = server
            .post("/api/v1/products")
            .add_header(AUTHORIZATION, token_header(token))
            .json(&body)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _state) = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_seller_account() {
        let (server, _state) = setup_test_server().await;

        let response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "username": "logan",
                "password": "1234",
                "first_name": "logan",
                "last_name": "mattos",
                "is_seller": true,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);

        let data = &body["data"];
        assert_eq!(data["username"], "logan");
        assert_eq!(data["is_seller"], true);
        assert_eq!(data["is_active"], true);
        assert_eq!(data["is_superuser"], false);
        assert!(data["id"].as_i64().unwrap() > 0);

        // Exactly the account projection, never the credential.
        let mut keys: Vec<&str> = data.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "date_joined",
                "first_name",
                "id",
                "is_active",
                "is_seller",
                "is_superuser",
                "last_name",
                "username",
            ]
        );
    }

    #[tokio::test]
    async fn test_register_non_seller_account() {
        let (server, _state) = setup_test_server().await;

        let data = register_account(&server, "yoshi", false).await;

        assert_eq!(data["is_seller"], false);
    }

    #[tokio::test]
    async fn test_register_requires_is_seller() {
        let (server, _state) = setup_test_server().await;

        let response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "username": "sandy",
                "password": "1234",
                "first_name": "sandy",
                "last_name": "mattos",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["fields"]["is_seller"].is_array());
    }

    #[tokio::test]
    async fn test_register_username_too_long() {
        let (server, _state) = setup_test_server().await;

        let response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "username": "x".repeat(21),
                "password": "1234",
                "first_name": "sandy",
                "last_name": "mattos",
                "is_seller": false,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["fields"]["username"].is_array());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (server, _state) = setup_test_server().await;

        register_account(&server, "sandy", true).await;

        let response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "username": "sandy",
                "password": "1234",
                "first_name": "sandy",
                "last_name": "mattos",
                "is_seller": false,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["fields"]["username"].is_array());

        // The first registration remains valid.
        let token = login(&server, "sandy").await;
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_login_returns_token_for_sellers_and_non_sellers() {
        let (server, _state) = setup_test_server().await;

        register_account(&server, "logan", true).await;
        register_account(&server, "yoshi", false).await;

        let seller_token = login(&server, "logan").await;
        let regular_token = login(&server, "yoshi").await;

        assert_eq!(seller_token.len(), 40);
        assert_eq!(regular_token.len(), 40);
        assert_ne!(seller_token, regular_token);

        // Repeated logins return the same token.
        assert_eq!(login(&server, "logan").await, seller_token);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let (server, _state) = setup_test_server().await;

        register_account(&server, "logan", true).await;

        let response = server
            .post("/api/v1/login")
            .json(&json!({"username": "logan", "password": "wrong"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_anyone_can_list_accounts() {
        let (server, _state) = setup_test_server().await;

        register_account(&server, "logan", true).await;
        register_account(&server, "yoshi", false).await;

        let response = server.get("/api/v1/accounts").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["count"], 2);
        assert_eq!(body["data"]["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_newest_accounts_are_limited_and_ordered() {
        let (server, _state) = setup_test_server().await;

        register_account(&server, "first", true).await;
        register_account(&server, "second", false).await;
        register_account(&server, "third", true).await;

        let response = server.get("/api/v1/accounts/newest/2").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let results = body["data"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["username"], "third");
        assert_eq!(results[1]["username"], "second");
    }

    #[tokio::test]
    async fn test_owner_can_edit_own_account() {
        let (server, _state) = setup_test_server().await;

        let (account, token) = register_and_login(&server, "logan", true).await;
        let account_id = account["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/api/v1/accounts/{account_id}"))
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({
                "first_name": "first name updated",
                "last_name": "last name updated",
            }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["first_name"], "first name updated");
        assert_eq!(body["data"]["last_name"], "last name updated");
    }

    #[tokio::test]
    async fn test_account_can_not_be_edited_by_non_owner() {
        let (server, _state) = setup_test_server().await;

        let (owner, _) = register_and_login(&server, "logan", true).await;
        let (_, other_token) = register_and_login(&server, "yoshi", false).await;
        let owner_id = owner["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/api/v1/accounts/{owner_id}"))
            .add_header(AUTHORIZATION, token_header(&other_token))
            .json(&json!({"first_name": "hijacked"}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_can_not_edit_account() {
        let (server, _state) = setup_test_server().await;

        let account = register_account(&server, "logan", true).await;
        let account_id = account["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/api/v1/accounts/{account_id}"))
            .json(&json!({"first_name": "hijacked"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_missing_account_is_not_found() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;

        let response = server
            .patch("/api/v1/accounts/99999")
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({"first_name": "nobody"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_can_deactivate_and_activate_account() {
        let (server, state) = setup_test_server().await;

        let account = register_account(&server, "logan", true).await;
        let account_id = account["id"].as_i64().unwrap();
        create_superuser(&state.db, "kamila").await;
        let admin_token = login(&server, "kamila").await;

        let manager_url = format!("/api/v1/accounts/{account_id}/management");

        let response = server
            .patch(&manager_url)
            .add_header(AUTHORIZATION, token_header(&admin_token))
            .json(&json!({"is_active": false}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["is_active"], false);

        let response = server
            .patch(&manager_url)
            .add_header(AUTHORIZATION, token_header(&admin_token))
            .json(&json!({"is_active": true}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["is_active"], true);
    }

    #[tokio::test]
    async fn test_non_admin_can_not_manage_account() {
        let (server, _state) = setup_test_server().await;

        let account = register_account(&server, "logan", true).await;
        let account_id = account["id"].as_i64().unwrap();
        let (_, regular_token) = register_and_login(&server, "yoshi", false).await;

        let response = server
            .patch(&format!("/api/v1/accounts/{account_id}/management"))
            .add_header(AUTHORIZATION, token_header(&regular_token))
            .json(&json!({"is_active": false}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_can_not_manage_account() {
        let (server, _state) = setup_test_server().await;

        let account = register_account(&server, "logan", true).await;
        let account_id = account["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/api/v1/accounts/{account_id}/management"))
            .json(&json!({"is_active": false}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deactivated_account_token_stops_working() {
        let (server, state) = setup_test_server().await;

        let (account, token) = register_and_login(&server, "logan", true).await;
        let account_id = account["id"].as_i64().unwrap();
        create_superuser(&state.db, "kamila").await;
        let admin_token = login(&server, "kamila").await;

        server
            .patch(&format!("/api/v1/accounts/{account_id}/management"))
            .add_header(AUTHORIZATION, token_header(&admin_token))
            .json(&json!({"is_active": false}))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .patch(&format!("/api/v1/accounts/{account_id}"))
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({"first_name": "still me"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_seller_can_create_product() {
        let (server, _state) = setup_test_server().await;

        let (seller, token) = register_and_login(&server, "logan", true).await;

        let data = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;

        assert_eq!(data["description"], "cadeira");
        assert_eq!(data["price"], "2500.99");
        assert_eq!(data["quantity"], 10);
        assert_eq!(data["is_active"], true);
        assert_eq!(data["seller"]["id"], seller["id"]);
        assert_eq!(data["seller"]["username"], "logan");
        assert!(data["seller"].get("password").is_none());

        let mut keys: Vec<&str> = data.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["description", "id", "is_active", "price", "quantity", "seller"]
        );
    }

    #[tokio::test]
    async fn test_product_seller_is_never_taken_from_the_body() {
        let (server, _state) = setup_test_server().await;

        let (seller, token) = register_and_login(&server, "logan", true).await;
        let (other, _) = register_and_login(&server, "sandy", true).await;

        let data = create_product(
            &server,
            &token,
            json!({
                "description": "teclado",
                "price": "250.99",
                "quantity": 10,
                "seller": other["id"],
            }),
        )
        .await;

        assert_eq!(data["seller"]["id"], seller["id"]);
    }

    #[tokio::test]
    async fn test_non_seller_can_not_create_product() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "yoshi", false).await;

        let response = server
            .post("/api/v1/products")
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({"description": "cadeira", "price": "2500.99", "quantity": 10}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_can_not_create_product() {
        let (server, _state) = setup_test_server().await;

        let response = server
            .post("/api/v1/products")
            .json(&json!({"description": "cadeira", "price": "2500.99", "quantity": 10}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_product_with_missing_fields() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;

        let response = server
            .post("/api/v1/products")
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["fields"]["description"].is_array());
    }

    #[tokio::test]
    async fn test_denial_is_checked_before_the_body() {
        let (server, _state) = setup_test_server().await;

        // An incomplete body never bypasses the permission gate: anonymous
        // requests are denied with 401, non-sellers with 403.
        let response = server.post("/api/v1/products").json(&json!({})).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let (_, token) = register_and_login(&server, "yoshi", false).await;
        let response = server
            .post("/api/v1/products")
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_negative_quantity_is_rejected_and_zero_accepted() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;

        let response = server
            .post("/api/v1/products")
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({"description": "cadeira", "price": "100.00", "quantity": -1}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["fields"]["quantity"].is_array());

        let data = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "100.00", "quantity": 0}),
        )
        .await;
        assert_eq!(data["quantity"], 0);
    }

    #[tokio::test]
    async fn test_price_precision_is_enforced() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;

        for bad_price in ["-1.00", "10.999", "100000000.00"] {
            let response = server
                .post("/api/v1/products")
                .add_header(AUTHORIZATION, token_header(&token))
                .json(&json!({"description": "cadeira", "price": bad_price, "quantity": 1}))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert!(body["fields"]["price"].is_array(), "price {bad_price}");
        }
    }

    #[tokio::test]
    async fn test_anyone_can_list_products() {
        let (server, _state) = setup_test_server().await;

        let (seller, token) = register_and_login(&server, "logan", true).await;
        create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;

        let response = server.get("/api/v1/products").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["count"], 1);
        let results = body["data"]["results"].as_array().unwrap();
        // The general projection carries the seller as a bare identifier.
        assert_eq!(results[0]["seller"], seller["id"]);
        assert_eq!(results[0]["description"], "cadeira");
    }

    #[tokio::test]
    async fn test_retrieve_product_roundtrip() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;
        let created = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;
        let product_id = created["id"].as_i64().unwrap();

        let response = server.get(&format!("/api/v1/products/{product_id}")).await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let data = &body["data"];
        assert_eq!(data["description"], "cadeira");
        assert_eq!(data["price"], "2500.99");
        assert_eq!(data["quantity"], 10);
        assert_eq!(data["is_active"], true);
        assert_eq!(data["seller"]["username"], "logan");
        // The filtered projection omits the product identifier.
        assert!(data.get("id").is_none());
    }

    #[tokio::test]
    async fn test_retrieve_missing_product_is_not_found() {
        let (server, _state) = setup_test_server().await;

        let response = server.get("/api/v1/products/99999").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_only_the_owning_seller_can_update_a_product() {
        let (server, _state) = setup_test_server().await;

        // Two sellers; A owns the product.
        let (_, token_a) = register_and_login(&server, "logan", true).await;
        let (_, token_b) = register_and_login(&server, "sandy", true).await;
        let created = create_product(
            &server,
            &token_a,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;
        let product_id = created["id"].as_i64().unwrap();
        let detail_url = format!("/api/v1/products/{product_id}");

        // B is a seller, but not this product's seller.
        let response = server
            .patch(&detail_url)
            .add_header(AUTHORIZATION, token_header(&token_b))
            .json(&json!({"description": "x"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // A may update, and the change sticks.
        let response = server
            .patch(&detail_url)
            .add_header(AUTHORIZATION, token_header(&token_a))
            .json(&json!({"description": "x"}))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&detail_url).await;
        let body: Value = response.json();
        assert_eq!(body["data"]["description"], "x");
    }

    #[tokio::test]
    async fn test_anonymous_can_not_update_a_product() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;
        let created = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;
        let product_id = created["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/api/v1/products/{product_id}"))
            .json(&json!({"description": "x"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_partial_update_is_idempotent() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;
        let created = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;
        let product_id = created["id"].as_i64().unwrap();
        let detail_url = format!("/api/v1/products/{product_id}");
        let patch_body = json!({"description": "teclado", "quantity": 5});

        let first: Value = server
            .patch(&detail_url)
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&patch_body)
            .await
            .json();
        let second: Value = server
            .patch(&detail_url)
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&patch_body)
            .await
            .json();

        assert_eq!(first["data"], second["data"]);
        assert_eq!(second["data"]["description"], "teclado");
        assert_eq!(second["data"]["quantity"], 5);
    }

    #[tokio::test]
    async fn test_product_update_validates_fields() {
        let (server, _state) = setup_test_server().await;

        let (_, token) = register_and_login(&server, "logan", true).await;
        let created = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;
        let product_id = created["id"].as_i64().unwrap();

        let response = server
            .patch(&format!("/api/v1/products/{product_id}"))
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&json!({"quantity": -5}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["fields"]["quantity"].is_array());
    }

    #[tokio::test]
    async fn test_reassigning_the_seller_moves_the_product() {
        use model::entities::product;

        let (server, state) = setup_test_server().await;

        let (seller_a, token) = register_and_login(&server, "logan", true).await;
        let (seller_b, _) = register_and_login(&server, "sandy", true).await;
        let created = create_product(
            &server,
            &token,
            json!({"description": "cadeira", "price": "2500.99", "quantity": 10}),
        )
        .await;
        let product_id = created["id"].as_i64().unwrap() as i32;

        // Reassign ownership at the storage layer: last assignment wins.
        let existing = product::Entity::find_by_id(product_id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(existing.seller_id as i64, seller_a["id"].as_i64().unwrap());

        let mut reassigned: product::ActiveModel = existing.into();
        reassigned.seller_id = Set(seller_b["id"].as_i64().unwrap() as i32);
        reassigned.update(&state.db).await.unwrap();

        // The product now lists under B and no longer under A.
        let response = server.get("/api/v1/products").await;
        let body: Value = response.json();
        let results = body["data"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["seller"], seller_b["id"]);
        assert_ne!(results[0]["seller"], seller_a["id"]);
    }
}
