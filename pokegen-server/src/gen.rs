use crate::httputil;

const CONTENT_DISPOSITION: &str = "attachment; filename=\"Pokemon Red.sav\"";

#[derive(Clone, Debug)]
pub struct Defaults {
    pub player_name: String,
    pub rival_name: String,
    pub money: u64,
}

#[derive(serde::Deserialize, Default)]
struct Request {
    #[serde(default)]
    player_name: Option<String>,

    #[serde(default)]
    rival_name: Option<String>,

    #[serde(default)]
    money: Option<u64>,
}

pub struct Generator {
    defaults: Defaults,
}

impl Generator {
    /// Fails if the defaults themselves cannot be encoded.
    pub fn new(defaults: Defaults) -> anyhow::Result<Self> {
        pokegen::gen(&defaults.player_name, &defaults.rival_name, defaults.money)
            .map_err(|e| anyhow::format_err!("invalid defaults {:?}: {}", defaults, e))?;
        Ok(Self { defaults })
    }

    fn parse(&self, body: &[u8]) -> Result<Request, hyper::Response<hyper::Body>> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Request::default());
        }

        // A literal null keeps every default, like an empty body.
        serde_json::from_slice::<Option<Request>>(body)
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                httputil::text_response(
                    hyper::StatusCode::BAD_REQUEST,
                    &match e.classify() {
                        serde_json::error::Category::Syntax => {
                            format!("syntax error at line {} column {}", e.line(), e.column())
                        }
                        _ => e.to_string(),
                    },
                )
            })
    }

    pub fn handle(
        &self,
        remote_ip: std::net::IpAddr,
        headers: &hyper::HeaderMap,
        body: &[u8],
    ) -> hyper::Response<hyper::Body> {
        if !httputil::has_media_type(headers, "application/json") {
            log::warn!("{}: rejected request with unsupported content type", remote_ip);
            return httputil::text_response(
                hyper::StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Content-Type is unsupported",
            );
        }

        let request = match self.parse(body) {
            Ok(request) => request,
            Err(response) => {
                log::warn!("{}: rejected malformed request", remote_ip);
                return response;
            }
        };

        let player_name = request.player_name.as_deref().unwrap_or(&self.defaults.player_name);
        let rival_name = request.rival_name.as_deref().unwrap_or(&self.defaults.rival_name);
        let money = request.money.unwrap_or(self.defaults.money);

        let mut buf = Vec::with_capacity(pokegen::SAVE_SIZE);
        let checksum = match pokegen::save::write(&mut buf, player_name, rival_name, money) {
            Ok(checksum) => checksum,
            Err(e) if e.is_invalid_input() => {
                log::warn!("{}: {}", remote_ip, e);
                return httputil::text_response(hyper::StatusCode::BAD_REQUEST, &e.to_string());
            }
            Err(e) => {
                log::error!("{}: failed to generate save: {}", remote_ip, e);
                return httputil::text_response(hyper::StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
            }
        };

        log::info!(
            "{}: generated save for {:?} vs {:?} with {} money (checksum {:02x})",
            remote_ip,
            player_name,
            rival_name,
            money,
            checksum
        );

        let mut response = hyper::Response::new(hyper::Body::from(buf));
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/octet-stream"),
        );
        response.headers_mut().insert(
            hyper::header::CONTENT_DISPOSITION,
            hyper::header::HeaderValue::from_static(CONTENT_DISPOSITION),
        );
        response
    }
}
