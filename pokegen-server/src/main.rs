mod gen;
mod httputil;
use envconfig::Envconfig;
use routerify::ext::RequestExt;

#[derive(Envconfig)]
struct Config {
    #[envconfig(from = "LISTEN_ADDR", default = "[::]:8080")]
    listen_addr: String,

    // Only enable this behind a reverse proxy that sets the header.
    #[envconfig(from = "USE_X_REAL_IP", default = "false")]
    use_x_real_ip: bool,

    #[envconfig(from = "DEFAULT_PLAYER_NAME", default = "RED")]
    default_player_name: String,

    #[envconfig(from = "DEFAULT_RIVAL_NAME", default = "BLUE")]
    default_rival_name: String,

    #[envconfig(from = "DEFAULT_MONEY", default = "3000")]
    default_money: u64,

    #[envconfig(from = "MAX_BODY_SIZE", default = "4096")]
    max_body_size: usize,
}

struct State {
    use_x_real_ip: bool,
    max_body_size: usize,
    generator: std::sync::Arc<gen::Generator>,
}

async fn handle_healthcheck_request(
    _request: hyper::Request<hyper::Body>,
) -> Result<hyper::Response<hyper::Body>, anyhow::Error> {
    Ok(hyper::Response::new(hyper::Body::from("OK")))
}

async fn handle_gen_request(request: hyper::Request<hyper::Body>) -> Result<hyper::Response<hyper::Body>, anyhow::Error> {
    let state = request
        .data::<State>()
        .ok_or_else(|| anyhow::format_err!("router state is missing"))?;
    let remote_ip = httputil::remote_ip(request.headers(), request.remote_addr(), state.use_x_real_ip);
    let max_body_size = state.max_body_size;
    let generator = state.generator.clone();

    let (parts, body) = request.into_parts();
    let body = if let Some(body) = httputil::read_body(body, max_body_size).await? {
        body
    } else {
        log::warn!("{}: rejected request body over {} bytes", remote_ip, max_body_size);
        return Ok(httputil::text_response(
            hyper::StatusCode::PAYLOAD_TOO_LARGE,
            "request body is too large",
        ));
    };

    Ok(generator.handle(remote_ip, &parts.headers, &body))
}

async fn handle_error(err: routerify::RouteError) -> hyper::Response<hyper::Body> {
    log::error!("error handling request: {}", err);
    httputil::text_response(hyper::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

fn router(
    use_x_real_ip: bool,
    max_body_size: usize,
    generator: gen::Generator,
) -> anyhow::Result<routerify::Router<hyper::Body, anyhow::Error>> {
    Ok(routerify::Router::builder()
        .data(State {
            use_x_real_ip,
            max_body_size,
            generator: std::sync::Arc::new(generator),
        })
        .post("/gen", handle_gen_request)
        .get("/health", handle_healthcheck_request)
        .err_handler(handle_error)
        .build()
        .map_err(|e| anyhow::format_err!(e))?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter(Some("pokegen_server"), log::LevelFilter::Info)
        .init();
    log::info!("welcome to pokegen-server {}!", env!("CARGO_PKG_VERSION"));
    let config = Config::init_from_env()?;
    let addr: std::net::SocketAddr = config.listen_addr.parse()?;

    let generator = gen::Generator::new(gen::Defaults {
        player_name: config.default_player_name.clone(),
        rival_name: config.default_rival_name.clone(),
        money: config.default_money,
    })?;
    log::info!(
        "defaults: player {:?}, rival {:?}, money {}",
        config.default_player_name,
        config.default_rival_name,
        config.default_money
    );

    let router = router(config.use_x_real_ip, config.max_body_size, generator)?;

    let service = routerify::RouterService::new(router).map_err(|e| anyhow::format_err!(e))?;
    log::info!("listening on {}", addr);
    hyper::Server::bind(&addr).serve(service).await?;
    Ok(())
}
