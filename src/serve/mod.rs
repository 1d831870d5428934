//! HTTP server over the page cache.
//!
//! Built on `tiny_http`, with a fixed pool of worker threads pulling from
//! one listener:
//!
//! ```text
//!   request ─▶ method / target check ─▶ ?reload ─▶ route table ─▶ handler
//!                    │ 400                  │            │
//!                    ▼                      ▼            ├─ index / page ─▶ page:<n>
//!             page:error:400           Rebuilder         ├─ content ──────▶ post:<slug>
//!                                                        └─ static ───────▶ public/<path>
//! ```
//!
//! Every miss is answered with the cached `page:error:404` body.

mod request;
mod response;
mod router;

use response::{Response, Status};

use request::parse_target;
use router::{Handler, route, route_name};

use crate::{
    build::Rebuilder,
    cache::{CacheKey, CacheStore},
    config::SiteConfig,
    log,
};
use anyhow::{Context, Result};
use std::{
    fs::File,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
    thread,
};
use tiny_http::{Request, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Application
// ============================================================================

/// Request handling state shared by all workers.
pub struct App {
    store: Arc<dyn CacheStore>,
    rebuilder: Arc<Rebuilder>,
    public: PathBuf,
    reload_query: String,
}

impl App {
    pub fn new(config: &SiteConfig, store: Arc<dyn CacheStore>, rebuilder: Arc<Rebuilder>) -> Self {
        Self {
            store,
            rebuilder,
            public: config.build.public.clone(),
            reload_query: config.build.reload_query.clone(),
        }
    }

    /// Answer one request.
    pub fn respond(&self, method: &str, url: &str) -> Response {
        if !method.eq_ignore_ascii_case("GET") {
            return self.error(Status::BadRequest);
        }
        let Some(target) = parse_target(url) else {
            return self.error(Status::BadRequest);
        };

        if target.has_query_key(&self.reload_query) {
            self.reload();
        }

        match route(&target.path) {
            Some(Handler::Index) => self.cached(&CacheKey::page(1)),
            Some(Handler::Page(n)) => self.cached(&CacheKey::page(n)),
            Some(Handler::Content(slug)) => self.cached(&CacheKey::post(slug)),
            Some(Handler::Static { path, ext }) => self.static_file(path, ext),
            Some(Handler::NotFound) | None => self.error(Status::NotFound),
        }
    }

    fn reload(&self) {
        if self.rebuilder.is_rebuilding() {
            log!("reload"; "rebuild already running, serving current cache");
            return;
        }
        match self.rebuilder.trigger() {
            None => log!("reload"; "rebuild already running, serving current cache"),
            Some(Ok(report)) => log!(
                "reload"; "rebuilt {} posts, {} pages in {:.2?}",
                report.posts, report.pages, report.elapsed
            ),
            Some(Err(err)) => log!("error"; "rebuild failed, keeping previous cache: {err:#}"),
        }
    }

    fn cached(&self, key: &CacheKey) -> Response {
        match self.store.get(key) {
            Some(body) => Response::cached(body.as_bytes(), "html", Status::Ok),
            None => self.error(Status::NotFound),
        }
    }

    /// Error page for `status`, empty when it was never built.
    fn error(&self, status: Status) -> Response {
        let body = self
            .store
            .get(&CacheKey::error(status.code()))
            .map(|body| body.as_bytes().to_vec())
            .unwrap_or_default();
        Response::cached(body, "html", status)
    }

    fn static_file(&self, path: &str, ext: &str) -> Response {
        let relative = Path::new(path.trim_start_matches('/'));
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return self.error(Status::NotFound);
        }

        let full = self.public.join(relative);
        let Ok(file) = File::open(&full) else {
            return self.error(Status::NotFound);
        };
        let metadata = match file.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log!("error"; "cannot stat {}: {err}", full.display());
                return self.error(Status::InternalError);
            }
        };
        if !metadata.is_file() {
            return self.error(Status::NotFound);
        }

        Response::stream(file, metadata.len(), ext)
    }
}

// ============================================================================
// Server Entry Point
// ============================================================================

/// Serve `app` until Ctrl+C.
///
/// Binds to the configured interface and port (retrying on higher ports when
/// taken), then runs `serve.workers` threads over the shared listener.
pub fn serve_site(config: &SiteConfig, app: Arc<App>) -> Result<()> {
    let interface: IpAddr = config.serve.interface.parse()?;
    let workers = config.serve.workers;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Each unblock releases one worker
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        for _ in 0..workers {
            server_for_signal.unblock();
        }
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{} ({} workers)", addr, workers);

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let server = Arc::clone(&server);
            let app = Arc::clone(&app);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle_request(request, &app);
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            log!("error"; "request worker panicked");
        }
    }

    log!("serve"; "stopped");
    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // Port 0 asks the OS for a free port
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(err) => last_error = Some(err),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|err| err.to_string()).unwrap_or_default()
    ))
}

fn handle_request(request: Request, app: &App) {
    let method = request.method().to_string();
    let url = request.url().to_owned();

    let response = app.respond(&method, &url);
    let route = parse_target(&url)
        .and_then(|target| route_name(&target.path))
        .unwrap_or("-");
    log!(
        "serve"; "{} {} -> {} {} ({})",
        method,
        url,
        response.status().code(),
        response.header("Content-Type").unwrap_or("-"),
        route
    );

    if let Err(err) = request.respond(response.into_tiny()) {
        log!("error"; "failed to send response for {url}: {err}");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build::BuildOptions,
        cache::MemoryStore,
    };
    use std::{
        fs,
        io::{Read, Write},
        net::TcpStream,
    };
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(root: &Path) {
        let content = root.join("content");
        write(&content, "layout.tpl", "<html>{{ include header }}{{ content }}</html>");
        write(&content, "header.tpl", "<title>{{ title }}</title>");
        write(&content, "content_top.tpl", "");
        write(&content, "footer.tpl", "");
        write(&content, "post.tpl", "<li>{{ title }}</li>");
        write(&content, "page.tpl", "@section_title Home @endsection @section_content <ul>{{ posts }}</ul>{{ more }} @endsection");
        write(&content, "errors/400.tpl", "@section_title Bad @endsection");
        write(&content, "errors/404.tpl", "@section_title Missing @endsection");
        write(&content, "errors/500.tpl", "@section_title Broken @endsection");
        write(&content, "posts/hello.tpl", "@section_title Hello @endsection @section_content hi @endsection");
        write(&root.join("public"), "css/site.css", "body{}");
    }

    fn app(root: &Path) -> (App, Arc<MemoryStore>) {
        let mut config = SiteConfig::default();
        config.build.content = root.join("content");
        config.build.public = root.join("public");
        config.build.markdown = false;

        let store = Arc::new(MemoryStore::new());
        let rebuilder = Arc::new(Rebuilder::new(BuildOptions::from_config(&config), store.clone()));
        (App::new(&config, store.clone(), rebuilder), store)
    }

    fn body(response: Response) -> Vec<u8> {
        match response.body {
            response::Body::Bytes(bytes) => bytes,
            response::Body::Stream { mut file, .. } => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).unwrap();
                buf
            }
        }
    }

    fn body_text(response: Response) -> String {
        String::from_utf8(body(response)).unwrap()
    }

    #[test]
    fn test_non_get_is_bad_request() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());
        app.rebuilder.build().unwrap();

        let response = app.respond("POST", "/");
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(body_text(response), "<html><title>Bad</title></html>");
    }

    #[test]
    fn test_lowercase_get_is_accepted() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());
        app.rebuilder.build().unwrap();

        assert_eq!(app.respond("get", "/").status(), Status::Ok);
    }

    #[test]
    fn test_bad_target_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(dir.path());

        let response = app.respond("GET", "*");
        assert_eq!(response.status(), Status::BadRequest);
        // No error page was built
        assert!(body(response).is_empty());
    }

    #[test]
    fn test_index_and_post() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());
        app.rebuilder.build().unwrap();

        let index = app.respond("GET", "/");
        assert_eq!(index.status(), Status::Ok);
        assert_eq!(index.header("Content-Type"), Some("text/html; charset=UTF-8"));
        assert_eq!(body_text(index), "<html><title>Home</title><ul><li>Hello</li></ul></html>");

        let post = app.respond("GET", "/hello");
        assert_eq!(post.status(), Status::Ok);
        assert_eq!(body_text(post), "<html><title>Hello</title>hi</html>");
    }

    #[test]
    fn test_cache_miss_is_not_found() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());
        app.rebuilder.build().unwrap();

        for url in ["/missing", "/page/2", "/page/99999999999999999999999"] {
            let response = app.respond("GET", url);
            assert_eq!(response.status(), Status::NotFound, "{url}");
            assert_eq!(body_text(response), "<html><title>Missing</title></html>");
        }
    }

    #[test]
    fn test_static_file_is_streamed() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());

        let response = app.respond("GET", "/css/site.css?v=3");
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.header("Content-Type"), Some("text/css; charset=UTF-8"));
        assert_eq!(response.header("Content-Length"), None);
        assert_eq!(body_text(response), "body{}");
    }

    #[test]
    fn test_static_file_missing_or_escaping() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        write(dir.path(), "secret.css", "nope");
        let (app, _) = app(dir.path());

        assert_eq!(app.respond("GET", "/css/none.css").status(), Status::NotFound);
        assert_eq!(app.respond("GET", "/../secret.css").status(), Status::NotFound);
        assert_eq!(app.respond("GET", "/%2E%2E/secret.css").status(), Status::NotFound);
    }

    #[test]
    fn test_static_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        fs::create_dir_all(dir.path().join("public/assets.css")).unwrap();
        let (app, _) = app(dir.path());

        assert_eq!(app.respond("GET", "/assets.css").status(), Status::NotFound);
    }

    #[test]
    fn test_reload_query_rebuilds() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, store) = app(dir.path());
        app.rebuilder.build().unwrap();

        write(&dir.path().join("content"), "posts/later.tpl", "@section_title Later @endsection");
        assert_eq!(app.respond("GET", "/later").status(), Status::NotFound);

        let response = app.respond("GET", "/later?reload");
        assert_eq!(response.status(), Status::Ok);
        assert!(store.get(&CacheKey::post("later")).is_some());
    }

    #[test]
    fn test_reload_query_on_static_file() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, store) = app(dir.path());
        app.rebuilder.build().unwrap();

        write(&dir.path().join("content"), "posts/fresh.tpl", "@section_title Fresh @endsection");
        assert!(store.get(&CacheKey::post("fresh")).is_none());

        let response = app.respond("GET", "/css/site.css?reload");
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.header("Content-Length"), None);
        assert!(matches!(response.body, response::Body::Stream { .. }));
        assert_eq!(body_text(response), "body{}");
        assert!(store.get(&CacheKey::post("fresh")).is_some());
    }

    #[test]
    fn test_failed_reload_keeps_cache() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());
        app.rebuilder.build().unwrap();

        fs::remove_file(dir.path().join("content/errors/500.tpl")).unwrap();
        let response = app.respond("GET", "/hello?reload=1");
        assert_eq!(response.status(), Status::Ok);
    }

    #[test]
    fn test_try_bind_port_picks_next_free_port() {
        let interface: IpAddr = "127.0.0.1".parse().unwrap();
        let (first, first_addr) = try_bind_port(interface, 0, 1).unwrap();
        let (_second, second_addr) = try_bind_port(interface, first_addr.port(), 10).unwrap();

        assert_ne!(first_addr.port(), second_addr.port());
        drop(first);
    }

    #[test]
    fn test_request_over_socket() {
        let dir = TempDir::new().unwrap();
        site(dir.path());
        let (app, _) = app(dir.path());
        app.rebuilder.build().unwrap();
        let app = Arc::new(app);

        let (server, addr) = try_bind_port("127.0.0.1".parse().unwrap(), 0, 1).unwrap();
        let worker = {
            let app = Arc::clone(&app);
            thread::spawn(move || {
                let request = server.recv().unwrap();
                handle_request(request, &app);
            })
        };

        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        worker.join().unwrap();

        assert!(reply.starts_with("HTTP/1.1 200"));
        assert!(reply.contains("Server: blogd"));
        assert!(reply.contains("X-Frame-Options: SAMEORIGIN"));
        assert!(reply.ends_with("<html><title>Hello</title>hi</html>"));
    }
}
