use pattern_mux::{async_trait, Handler, Request, Response, Router, Settings};

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hyper::header::{self, HeaderValue};
use hyper::{Body, Method, StatusCode};

/// Answers GET with its name and the variables it was given.
#[derive(Default)]
struct Echo(&'static str);

#[async_trait]
impl Handler for Echo {
    async fn get(&mut self, req: &mut Request) -> Response {
        let vars: Vec<String> = req
            .params()
            .iter()
            .map(|p| format!("{}={}", p.key, p.value))
            .collect();
        Response::with_body(format!("{} {}", self.0, vars.join(",")))
    }
}

fn get(uri: &str) -> hyper::Request<Body> {
    hyper::Request::get(uri).body(Body::empty()).unwrap()
}

fn request(method: Method, uri: &str) -> hyper::Request<Body> {
    hyper::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn append_slash() -> Settings {
    Settings {
        append_slash: true,
        ..Settings::default()
    }
}

#[tokio::test]
async fn first_match_in_registration_order() {
    let router = Router::default()
        .pattern("/", || Echo("root"))
        .pattern("/user/new", || Echo("new"))
        .pattern("/user/:id", || Echo("user"))
        .pattern("/user/:name", || Echo("shadowed"));

    assert_eq!(router.resolve(get("/")).await.body, "root ");
    assert_eq!(router.resolve(get("/user/new")).await.body, "new ");
    assert_eq!(router.resolve(get("/user/42")).await.body, "user :id=42");
}

#[tokio::test]
async fn variables_are_taken_verbatim() {
    let router = Router::default()
        .pattern("/a:x/b", || Echo("a"))
        .pattern("/files/:name.:ext", || Echo("file"))
        .pattern("/pair/:v/:v", || Echo("pair"))
        .pattern("/raw/:v", || Echo("raw"));

    assert_eq!(router.resolve(get("/a123/b")).await.body, "a :x=123");
    assert_eq!(router.resolve(get("/a/b")).await.body, "a :x=");
    assert_eq!(
        router.resolve(get("/files/report.pdf")).await.body,
        "file :name=report,:ext=pdf"
    );
    assert_eq!(router.resolve(get("/pair/x/y")).await.body, "pair :v=x,:v=y");
    assert_eq!(router.resolve(get("/raw/a%20b")).await.body, "raw :v=a%20b");
}

#[tokio::test]
async fn unmatched_paths_are_not_found() {
    let router = Router::default()
        .pattern("/", || Echo("root"))
        .pattern("/user/:id", || Echo("user"));

    for path in &["/x", "/user/", "/user/42/posts", "/user"] {
        let res = router.resolve(get(path)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(res.body, "Page not found");
        assert_eq!(res.content_type, "text/plain");
    }

    let res = router.resolve(request(Method::POST, "/x")).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn custom_not_found_handler() {
    #[derive(Default)]
    struct Missing;

    #[async_trait]
    impl Handler for Missing {
        async fn get(&mut self, req: &mut Request) -> Response {
            Response::with_body(format!("no {}", req.path())).with_status(StatusCode::NOT_FOUND)
        }
    }

    let router = Router::default().not_found(Missing::default);
    assert_eq!(router.resolve(get("/gone")).await.body, "no /gone");

    router.set_not_found(|| Echo("fallback"));
    let res = router.resolve(get("/gone")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "fallback ");
}

#[tokio::test]
async fn prefix_patterns() {
    let router = Router::default()
        .pattern("/", || Echo("root"))
        .pattern("/static/", || Echo("static"));

    assert_eq!(router.resolve(get("/static/")).await.body, "static ");
    assert_eq!(router.resolve(get("/static/a/b/c")).await.body, "static ");
    assert_eq!(router.resolve(get("/static")).await.status, StatusCode::NOT_FOUND);
    // the bare "/" pattern is not a prefix pattern
    assert_eq!(router.resolve(get("/other")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn append_slash_redirects() {
    let router = Router::new(append_slash()).pattern("/blog/", || Echo("blog"));

    let res = router.resolve(get("/blog")).await;
    assert_eq!(res.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers[header::LOCATION], "/blog/");
    assert_eq!(res.body, "<a href=\"/blog/\">Moved Permanently</a>.\n");

    let res = router.resolve(get("/blog?x=1")).await;
    assert_eq!(res.headers[header::LOCATION], "/blog/?x=1");

    let res = router.resolve(request(Method::POST, "/blog")).await;
    assert_eq!(res.status, StatusCode::MOVED_PERMANENTLY);
    assert!(res.body.is_empty());

    let raw = Request::new(get("/blog?x=1"), Default::default()).with_fragment("top");
    let res = router.resolve_request(raw).await;
    assert_eq!(res.headers[header::LOCATION], "/blog/?x=1#top");

    assert_eq!(router.resolve(get("/blog/")).await.body, "blog ");
}

#[tokio::test]
async fn append_slash_keeps_variables_and_order() {
    let router = Router::new(append_slash())
        .pattern("/u/:id/", || Echo("user"))
        .pattern("/u/:id", || Echo("never"));

    let res = router.resolve(get("/u/7")).await;
    assert_eq!(res.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers[header::LOCATION], "/u/7/");
}

#[tokio::test]
async fn resolve_is_idempotent() {
    let router = Router::default().pattern("/user/:id", || Echo("user"));

    let first = router.resolve(get("/user/1")).await;
    let second = router.resolve(get("/user/1")).await;
    assert_eq!(first, second);

    let first = router.resolve(get("/missing")).await;
    let second = router.resolve(get("/missing")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn serve_writes_the_response() {
    #[derive(Default)]
    struct Tagged;

    #[async_trait]
    impl Handler for Tagged {
        async fn get(&mut self, _: &mut Request) -> Response {
            let mut res = Response::with_body("{}").with_content_type("application/json");
            res.add_header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            res.add_header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            res
        }
    }

    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let router = Router::default().pattern("/tagged", Tagged::default);
    let res = router.serve(get("/tagged"), None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-cache,no-store");

    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    assert_eq!(&body[..], b"{}");
}

/// Collects formatted log output so tests can inspect it.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self, message: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(message))
            .map(String::from)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn serve_logs_one_line_per_request() {
    #[derive(Default)]
    struct Flaky;

    #[async_trait]
    impl Handler for Flaky {
        async fn get(&mut self, _: &mut Request) -> Response {
            panic!("flaky handler")
        }
    }

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let router = Router::default()
        .pattern("/ok", || Echo("ok"))
        .pattern("/flaky", Flaky::default);
    let remote: SocketAddr = ([10, 0, 0, 7], 4711).into();

    let res = router.serve(get("/ok?x=1"), Some(remote)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let served = logs.lines("request served");
    assert_eq!(served.len(), 1, "{:?}", served);
    let line = &served[0];
    assert!(line.contains("status=200"), "{}", line);
    assert!(line.contains("method=GET"), "{}", line);
    assert!(line.contains("uri=/ok?x=1"), "{}", line);
    assert!(line.contains("10.0.0.7:4711"), "{}", line);
    assert!(line.contains("elapsed="), "{}", line);

    // a panicking handler is still logged, once, with the error status
    let res = router.serve(request(Method::POST, "/flaky"), None).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let res = router.serve(get("/flaky"), None).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let served = logs.lines("request served");
    assert_eq!(served.len(), 3, "{:?}", served);
    assert!(served[1].contains("status=405"), "{}", served[1]);
    assert!(served[1].contains("method=POST"), "{}", served[1]);
    assert!(served[2].contains("status=500"), "{}", served[2]);
    assert!(served[2].contains("uri=/flaky"), "{}", served[2]);
    assert!(served[2].contains("remote_addr=None"), "{}", served[2]);
}

#[tokio::test]
async fn serves_over_tcp() {
    let service = Router::default()
        .pattern("/hello/:name", || Echo("hello"))
        .into_service();
    let shared = service.router().clone();

    let server = hyper::Server::bind(&([127, 0, 0, 1], 0).into()).serve(service);
    let addr = server.local_addr();
    tokio::spawn(server);

    let client = hyper::Client::new();

    let res = client
        .get(format!("http://{}/hello/world", addr).parse().unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    assert_eq!(&body[..], b"hello :name=world");

    // patterns registered while serving are picked up
    shared.register("/late", || Echo("late"));
    let res = client
        .get(format!("http://{}/late", addr).parse().unwrap())
        .await
        .unwrap();
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    assert_eq!(&body[..], b"late ");
}
