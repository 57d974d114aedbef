//! 指标与健康检查端点
//!
//! `/metrics` 以 Prometheus 文本格式导出注册表，`/healthz` 用于存活探针。

use anyhow::Result;
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use prometheus::{Encoder, Registry, TextEncoder};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::{error, info};

/// 启动 HTTP 服务，直到出错才返回
pub async fn serve(addr: SocketAddr, registry: Registry) -> Result<()> {
    let make_svc = make_service_fn(move |_| {
        let registry = registry.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                async move { Ok::<_, Infallible>(route(&req, &registry)) }
            }))
        }
    });

    info!("指标服务器启动在 {}", addr);
    Server::try_bind(&addr)?.serve(make_svc).await?;
    Ok(())
}

/// 请求路由
fn route(req: &Request<Body>, registry: &Registry) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => metrics(registry),
        (&Method::GET, "/healthz") => text(StatusCode::OK, "ok"),
        _ => text(StatusCode::NOT_FOUND, "not found"),
    }
}

fn metrics(registry: &Registry) -> Response<Body> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("编码指标失败: {}", e);
        return text(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics");
    }

    let mut response = Response::new(Body::from(buffer));
    if let Ok(value) = encoder.format_type().parse() {
        response.headers_mut().insert(hyper::header::CONTENT_TYPE, value);
    }
    response
}

fn text(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}
