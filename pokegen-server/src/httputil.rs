use hyper::body::HttpBody;

/// Works out the client address, optionally trusting `X-Real-IP` from a reverse proxy.
///
/// Falls back to the peer address if the header is missing or unparseable.
pub fn remote_ip(
    headers: &hyper::HeaderMap,
    peer_addr: std::net::SocketAddr,
    use_x_real_ip: bool,
) -> std::net::IpAddr {
    if !use_x_real_ip {
        return peer_addr.ip();
    }
    match headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
    {
        Some(ip) => ip,
        None => {
            log::warn!("{}: missing or invalid X-Real-IP header", peer_addr);
            peer_addr.ip()
        }
    }
}

/// Compares the media type of a `Content-Type` value, ignoring parameters such as `charset`.
pub fn has_media_type(headers: &hyper::HeaderMap, media_type: &str) -> bool {
    headers
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map_or(false, |v| v.trim().eq_ignore_ascii_case(media_type))
}

/// Reads the whole body, giving up with `None` as soon as it grows past `limit` bytes.
pub async fn read_body(mut body: hyper::Body, limit: usize) -> Result<Option<Vec<u8>>, hyper::Error> {
    let mut buf = vec![];
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

pub fn text_response(status: hyper::StatusCode, message: &str) -> hyper::Response<hyper::Body> {
    let mut response = hyper::Response::new(hyper::Body::from(format!("{}\n", message)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
