use super::{Ack, ActionRequest, ActionTransport, RequestId, TransportError};
use crate::app::AppEvent;
use crate::runtime::catch_task_panic;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// Header the reader server checks to answer with JSON instead of a redirect.
const XHR_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Posts requests to the reader server on spawned tasks and reports each
/// outcome through the event channel.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    event_tx: mpsc::Sender<AppEvent>,
}

impl HttpTransport {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            event_tx,
        })
    }
}

impl ActionTransport for HttpTransport {
    fn submit(&self, id: RequestId, request: ActionRequest) {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let tx = self.event_tx.clone();

        tracing::debug!(request_id = %id, path = %request.path(), "Submitting request");

        tokio::spawn(async move {
            let result = match catch_task_panic(send_request(&client, &base_url, &request)).await
            {
                Ok(result) => result,
                Err(panic_msg) => {
                    tracing::error!(task = "request", request_id = %id, error = %panic_msg, "Background task panicked");
                    Err(TransportError::TaskPanicked(panic_msg))
                }
            };
            if let Err(e) = tx
                .send(AppEvent::RequestCompleted {
                    request_id: id,
                    result,
                })
                .await
            {
                tracing::warn!(error = %e, event = "RequestCompleted", "Channel send failed (receiver dropped)");
            }
        });
    }
}

/// Build the absolute endpoint for a request. Routes resolve beneath the
/// base URL's path, so a server mounted at `/reader/` keeps its prefix.
fn endpoint(base_url: &Url, request: &ActionRequest) -> Result<Url, url::ParseError> {
    let path = request.path();
    let mut url = base_url.join(path.trim_start_matches('/'))?;
    if let ActionRequest::MarkAllRead {
        feed_id: Some(feed_id),
    } = request
    {
        url.query_pairs_mut()
            .append_pair("feed_id", &feed_id.to_string());
    }
    Ok(url)
}

/// POST one request and interpret the response.
///
/// - 2xx with `{"success": false}` → `TransportError::Rejected`
/// - 2xx with any other body (JSON, empty, or HTML) → `Ok`
/// - anything else → `TransportError::HttpStatus`
pub async fn send_request(
    client: &reqwest::Client,
    base_url: &Url,
    request: &ActionRequest,
) -> Result<Ack, TransportError> {
    let url = endpoint(base_url, request)?;

    let response = client
        .post(url)
        .header(XHR_HEADER.0, XHR_HEADER.1)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Network(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::HttpStatus(status.as_u16()));
    }

    let body = response.bytes().await?;
    let ack = if body.is_empty() {
        Ack::default()
    } else {
        match serde_json::from_slice::<Ack>(&body) {
            Ok(ack) => ack,
            Err(e) => {
                tracing::debug!(error = %e, "Non-JSON success body, treating as acknowledged");
                Ack::default()
            }
        }
    };

    if ack.success == Some(false) {
        return Err(TransportError::Rejected);
    }
    Ok(ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ArticleId, FeedId};
    use crate::transport::ArticleAction;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mark_read(id: i64) -> ActionRequest {
        ActionRequest::Article {
            article_id: ArticleId(id),
            action: ArticleAction::MarkRead,
        }
    }

    #[tokio::test]
    async fn test_mark_read_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/articles/5/read"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let ack = send_request(&client, &base, &mark_read(5)).await.unwrap();
        assert_eq!(ack.success, Some(true));
    }

    #[tokio::test]
    async fn test_toggle_save_reports_saved_flag() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/articles/9/save"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success": true, "is_saved": true}"#),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let request = ActionRequest::Article {
            article_id: ArticleId(9),
            action: ArticleAction::ToggleSave,
        };
        let ack = send_request(&client, &base, &request).await.unwrap();
        assert_eq!(ack.is_saved, Some(true));
    }

    #[tokio::test]
    async fn test_mark_all_read_passes_feed_id() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/articles/mark-all-read"))
            .and(query_param("feed_id", "3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let request = ActionRequest::MarkAllRead {
            feed_id: Some(FeedId(3)),
        };
        assert!(send_request(&client, &base, &request).await.is_ok());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://reader.example.com/app/").unwrap();
        assert_eq!(
            endpoint(&base, &mark_read(7)).unwrap().as_str(),
            "https://reader.example.com/app/articles/7/read"
        );
        let all = ActionRequest::MarkAllRead { feed_id: None };
        assert_eq!(
            endpoint(&base, &all).unwrap().as_str(),
            "https://reader.example.com/app/articles/mark-all-read"
        );
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let err = send_request(&client, &base, &mark_read(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_success_false_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": false}"#))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let err = send_request(&client, &base, &mark_read(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected));
    }

    #[tokio::test]
    async fn test_html_body_counts_as_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let ack = send_request(&client, &base, &mark_read(1)).await.unwrap();
        assert_eq!(ack, Ack::default());
    }

    #[tokio::test]
    async fn test_submit_reports_completion_on_channel() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let (tx, mut rx) = mpsc::channel(4);
        let transport = HttpTransport::new(
            Url::parse(&mock_server.uri()).unwrap(),
            Duration::from_secs(5),
            tx,
        )
        .unwrap();
        transport.submit(RequestId(42), mark_read(1));

        match rx.recv().await {
            Some(AppEvent::RequestCompleted { request_id, result }) => {
                assert_eq!(request_id, RequestId(42));
                assert!(result.is_ok());
            }
            _ => panic!("expected RequestCompleted"),
        }
    }
}
