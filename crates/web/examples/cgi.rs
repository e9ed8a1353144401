//! A CGI script: run it from a web server, or from a shell with
//! `REQUEST_METHOD=GET REQUEST_URI=/hello?name=ann cargo run --example cgi`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use http::StatusCode;
use serde::Serialize;
use tern_http::request::RequestContext;
use tern_http::response::{ResponseBuilder, ResponseConfig};
use tern_http::transport::IoTransport;
use tern_web::{CookieConfig, CookieJar, HttpException, Json, Responder, SessionError, SessionHandler, SessionStore};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Stores each session as a file in a directory.
struct FileSessions {
    dir: PathBuf,
}

impl FileSessions {
    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("sess_{id}"))
    }
}

impl SessionHandler for FileSessions {
    fn read(&mut self, id: &str) -> Result<String, SessionError> {
        match fs::read_to_string(self.path(id)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(SessionError::handler(e)),
        }
    }

    fn write(&mut self, id: &str, data: &str) -> Result<(), SessionError> {
        fs::write(self.path(id), data).map_err(SessionError::handler)
    }

    fn destroy(&mut self, id: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path(id)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(SessionError::handler(e)),
            _ => Ok(()),
        }
    }

    fn gc(&mut self, _max_lifetime: Duration) -> Result<usize, SessionError> {
        Ok(0)
    }
}

#[derive(Serialize)]
struct Visit<'a> {
    path: &'a str,
    visits: u64,
    notice: Option<String>,
}

fn handle(request: &RequestContext, response: &mut ResponseBuilder<'_>) -> Result<(), SessionError> {
    let jar = CookieJar::new(request, CookieConfig { prefix: "demo_".into(), ..CookieConfig::default() });
    let id = jar.get("sid").map_or_else(|| format!("{:x}", request.time()), ToOwned::to_owned);
    jar.set(response, "sid", &id, 3600);

    let mut session = SessionStore::new(FileSessions { dir: std::env::temp_dir() }, id);
    session.start()?;
    let visits = session.get_or("visits", 0u64) + 1;
    session.set("visits", visits)?;

    match request.uri() {
        "/hello" => {
            let name = request.query_param("name").unwrap_or("world");
            session.set_flash("notice", format!("said hello to {name}"))?;
            format!("Hello {name}!").respond_to(response);
        }
        "/visits" => {
            let notice = session.get::<String>("notice");
            Json(Visit { path: request.uri(), visits, notice }).respond_to(response);
        }
        "/old" => {
            response.redirect("/hello", false);
        }
        _ => {
            let params: HashMap<&str, &str> = request.query_params().iter().collect();
            HttpException::new(StatusCode::NOT_FOUND, "no such page").add_extra("query", params.len()).respond_to(response);
        }
    }

    response.no_cache();
    session.close()?;
    Ok(())
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).with_writer(io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let request = match RequestContext::from_process() {
        Ok(request) => request,
        Err(e) => {
            error!(cause = %e, "failed to read request");
            return;
        }
    };
    info!(method = %request.method(), uri = request.uri(), "handling request");

    let mut response = ResponseBuilder::with_config(&request, ResponseConfig::new().buffer(8 * 1024));
    if let Err(e) = handle(&request, &mut response) {
        error!(cause = %e, "session failure");
        HttpException::internal("session unavailable").respond_to(&mut response);
    }

    let mut transport = IoTransport::new(io::stdout().lock());
    if let Err(e) = response.emit(&mut transport, None) {
        error!(cause = %e, "failed to send response");
    }
}
