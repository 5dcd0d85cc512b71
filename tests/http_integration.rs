//! Integration tests for the Guacamole client using wiremock
//!
//! These tests verify the REST client and the full data source read against
//! mocked endpoints, covering identifier and path lookups and error bodies.

use guacamole_provider::guacamole::client::{ClientConfig, GuacClient};
use guacamole_provider::resource::{ConnectionDataSource, ConnectionGroupDataSource, LookupRequest};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/guacamole/api/session/data/mysql";

fn client_for(server: &MockServer) -> GuacClient {
    let config = ClientConfig::new(&format!("{}/guacamole", server.uri()), "mysql").with_token("test-token");
    GuacClient::new(&config).expect("client should build")
}

async fn mount_connection_42(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{}/connections/42", BASE)))
        .and(query_param("token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "bastion",
            "identifier": "42",
            "parentIdentifier": "3",
            "protocol": "kubernetes",
            "attributes": {
                "guacd-hostname": "10.0.0.5",
                "guacd-port": null,
                "failover-only": "true"
            },
            "activeConnections": 1
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/connections/42/parameters", BASE)))
        .and(query_param("token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "namespace": "prod",
            "pod": "shell-1",
            "use-ssl": "true",
            "client-key": "-----BEGIN KEY-----",
            "enable-sftp": "true"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_tree(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{}/connectionGroups/ROOT/tree", BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "ROOT",
            "identifier": "ROOT",
            "type": "ORGANIZATIONAL",
            "activeConnections": 0,
            "childConnectionGroups": [{
                "name": "ops",
                "identifier": "3",
                "parentIdentifier": "ROOT",
                "type": "BALANCING",
                "activeConnections": 1,
                "attributes": {"max-connections": "4", "enable-session-affinity": ""},
                "childConnections": [{
                    "name": "bastion",
                    "identifier": "42",
                    "parentIdentifier": "3",
                    "protocol": "kubernetes"
                }]
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_group_3(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{}/connectionGroups/3/tree", BASE)))
        .and(query_param("token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "ops",
            "identifier": "3",
            "parentIdentifier": "ROOT",
            "type": "ORGANIZATIONAL",
            "activeConnections": 2,
            "attributes": {"max-connections": null},
            "childConnections": [
                {"name": "bastion", "identifier": "42", "parentIdentifier": "3", "protocol": "kubernetes"},
                {"name": "db", "identifier": "43", "parentIdentifier": "3", "protocol": "ssh"}
            ],
            "childConnectionGroups": [
                {"name": "prod", "identifier": "5", "parentIdentifier": "3", "type": "BALANCING"}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Test module for REST client integration tests
mod client_tests {
    use super::*;

    /// Reading by identifier merges the parameters call into the connection
    #[tokio::test]
    async fn test_read_connection_merges_parameters() {
        let server = MockServer::start().await;
        mount_connection_42(&server).await;

        let connection = client_for(&server)
            .read_connection("42")
            .await
            .expect("read should succeed");

        assert_eq!(connection.name, "bastion");
        assert_eq!(connection.parent_identifier, "3");
        assert_eq!(connection.active_connections, 1);
        assert_eq!(connection.attributes.get("guacd-hostname").map(String::as_str), Some("10.0.0.5"));
        assert!(!connection.attributes.contains_key("guacd-port"));
        assert_eq!(connection.parameters.get("pod").map(String::as_str), Some("shell-1"));
    }

    /// Reading by path walks the tree then reads by identifier
    #[tokio::test]
    async fn test_read_connection_by_path() {
        let server = MockServer::start().await;
        mount_tree(&server).await;
        mount_connection_42(&server).await;

        let connection = client_for(&server)
            .read_connection_by_path("/ops/bastion")
            .await
            .expect("read should succeed");

        assert_eq!(connection.identifier, "42");
        assert_eq!(connection.parameters.get("namespace").map(String::as_str), Some("prod"));
    }

    /// Unknown path segments fail without a by-identifier read
    #[tokio::test]
    async fn test_read_connection_by_unknown_path() {
        let server = MockServer::start().await;
        mount_tree(&server).await;

        let err = client_for(&server)
            .read_connection_by_path("/dev/bastion")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No connection group named 'dev'"));
    }

    /// 404 responses surface the Guacamole error message
    #[tokio::test]
    async fn test_404_carries_remote_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/connections/99", BASE)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "No such connection: \"99\"",
                "type": "NOT_FOUND"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).read_connection("99").await.unwrap_err();
        let text = format!("{:#}", err);

        assert!(text.contains("Failed to read connection '99'"));
        assert!(text.contains("404"));
        assert!(text.contains("No such connection"));
    }

    /// 403 responses without a JSON body still fail cleanly
    #[tokio::test]
    async fn test_403_without_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/connections/42", BASE)))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server).read_connection("42").await.unwrap_err();
        assert!(format!("{:#}", err).contains("API request failed: 403"));
    }

    /// Reading a group by identifier uses its tree endpoint
    #[tokio::test]
    async fn test_read_connection_group_by_identifier() {
        let server = MockServer::start().await;
        mount_group_3(&server).await;

        let group = client_for(&server)
            .read_connection_group("3")
            .await
            .expect("read should succeed");

        assert_eq!(group.name, "ops");
        assert_eq!(group.child_connections.len(), 2);
        assert_eq!(group.child_connection_groups[0].identifier, "5");
        assert!(group.attributes.is_empty());
    }

    /// Without a token no `token` query parameter is sent
    #[tokio::test]
    async fn test_client_without_token_omits_query_param() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/connectionGroups/ROOT/tree", BASE)))
            .and(query_param_is_missing("token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "ROOT",
                "identifier": "ROOT",
                "type": "ORGANIZATIONAL"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig::new(&format!("{}/guacamole", server.uri()), "mysql");
        let client = GuacClient::new(&config).expect("client should build");

        let tree = client.connection_tree().await.expect("read should succeed");
        assert_eq!(tree.identifier, "ROOT");
    }

    /// Group by path resolves `/` to the root group
    #[tokio::test]
    async fn test_read_root_group_by_path() {
        let server = MockServer::start().await;
        mount_tree(&server).await;

        let group = client_for(&server)
            .read_connection_group_by_path("/")
            .await
            .expect("read should succeed");

        assert_eq!(group.identifier, "ROOT");
        assert_eq!(group.child_connection_groups.len(), 1);
    }
}

/// End-to-end reads through the data sources
mod data_source_tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_read_by_identifier() {
        let server = MockServer::start().await;
        mount_connection_42(&server).await;
        let client = client_for(&server);

        let source = ConnectionDataSource::for_protocol(&client, "kubernetes").unwrap();
        let result = source.read(&LookupRequest::by_identifier("42")).await;

        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let declaration = result.declaration.expect("read should commit");
        assert_eq!(declaration.id.as_deref(), Some("42"));
        assert_eq!(declaration.parent_identifier, "3");
        assert_eq!(declaration.attributes.get_str("guacd_hostname"), Some("10.0.0.5"));
        assert_eq!(declaration.attributes.get_str("guacd_port"), Some(""));
        assert_eq!(declaration.attributes.get_bool("failover_only"), Some(true));
        assert_eq!(declaration.parameters.get_bool("use_ssl"), Some(true));
        assert_eq!(declaration.parameters.get_str("container"), Some(""));
        assert!(declaration.parameters.get("enable-sftp").is_none());
    }

    #[tokio::test]
    async fn test_connection_read_not_found() {
        let server = MockServer::start().await;
        mount_tree(&server).await;
        let client = client_for(&server);

        let source = ConnectionDataSource::new(&client);
        let result = source.read(&LookupRequest::by_path("/ops/missing")).await;

        assert!(result.declaration.is_none());
        assert!(result.diagnostics.has_error());
        let diagnostic = result.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Unable to read connection");
        assert!(diagnostic.detail.contains("No connection named 'missing'"));
    }

    #[tokio::test]
    async fn test_connection_group_read_by_path() {
        let server = MockServer::start().await;
        mount_tree(&server).await;
        let client = client_for(&server);

        let source = ConnectionGroupDataSource::new(&client);
        let result = source.read(&LookupRequest::by_path("ops")).await;

        assert!(result.diagnostics.is_empty());
        let declaration = result.declaration.expect("read should commit");
        assert_eq!(declaration.id.as_deref(), Some("3"));
        assert_eq!(declaration.group_type, "BALANCING");
        assert_eq!(declaration.attributes.get_str("max_connections"), Some("4"));
        assert_eq!(declaration.attributes.get_bool("enable_session_affinity"), Some(false));
        assert_eq!(declaration.member_connections, vec!["42"]);
        assert!(declaration.member_groups.is_empty());
    }

    #[tokio::test]
    async fn test_connection_group_read_by_identifier() {
        let server = MockServer::start().await;
        mount_group_3(&server).await;
        let client = client_for(&server);

        let source = ConnectionGroupDataSource::new(&client);
        let result = source.read(&LookupRequest::by_identifier("3")).await;

        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let declaration = result.declaration.expect("read should commit");
        assert_eq!(declaration.id.as_deref(), Some("3"));
        assert_eq!(declaration.identifier.as_deref(), Some("3"));
        assert_eq!(declaration.group_type, "ORGANIZATIONAL");
        assert_eq!(declaration.active_connections, 2);
        assert_eq!(declaration.attributes.get_str("max_connections"), Some(""));
        assert_eq!(declaration.member_connections, vec!["42", "43"]);
        assert_eq!(declaration.member_groups, vec!["5"]);
    }
}
