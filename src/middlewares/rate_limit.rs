/*!
 * 认证端点的按 IP 限流
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 *
 * 每个 `前缀:IP` 在固定窗口内计数，超出后返回 429 与 `Retry-After`。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{HeaderName, HeaderValue, RETRY_AFTER},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode};

/// 窗口上限，也是计数缓存的存活时间
const MAX_WINDOW_SECS: u64 = 3600;

/// 键: `前缀:IP`，值: (窗口起点, 窗口内请求数)
static RATE_LIMIT_CACHE: Lazy<Cache<String, (Instant, u32)>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.clamp(1, MAX_WINDOW_SECS),
            key_prefix,
        }
    }

    /// 5 次/分钟
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 3 次/分钟
    pub fn register() -> Self {
        Self::new("register", 3, 60)
    }

    /// 10 次/分钟
    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60)
    }

    /// 3 次/10 分钟，同一 IP 不能批量探测邮箱
    pub fn forgot_password() -> Self {
        Self::new("forgot_password", 3, 600)
    }

    /// 5 次/10 分钟
    pub fn reset_password() -> Self {
        Self::new("reset_password", 5, 600)
    }
}

/// 客户端 IP：优先连接信息，其次 X-Forwarded-For 第一项、X-Real-IP
fn client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ip) = connection_ip.as_deref()
        && ip.parse::<IpAddr>().is_ok()
    {
        return ip.to_string();
    }

    let header_ip = ["X-Forwarded-For", "X-Real-IP"].iter().find_map(|name| {
        let value = req.headers().get(*name)?.to_str().ok()?;
        let ip = value.split(',').next()?.trim();
        ip.parse::<IpAddr>().ok().map(|ip| ip.to_string())
    });

    header_ip
        .or(connection_ip)
        .unwrap_or_else(|| "unknown".to_string())
}

/// 本次请求计入窗口后的结果
enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: u64 },
}

async fn register_hit(key: String, max_requests: u32, window: Duration) -> Decision {
    let now = Instant::now();
    let (started, count) = match RATE_LIMIT_CACHE.get(&key).await {
        Some((started, count)) if now.duration_since(started) < window => (started, count),
        _ => (now, 0),
    };

    if count >= max_requests {
        let retry_after = window
            .saturating_sub(now.duration_since(started))
            .as_secs()
            .max(1);
        return Decision::Limited { retry_after };
    }

    RATE_LIMIT_CACHE.insert(key, (started, count + 1)).await;
    Decision::Allowed {
        remaining: max_requests - count - 1,
    }
}

fn rate_limited(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((RETRY_AFTER, retry_after.to_string()))
        .insert_header(("x-ratelimit-remaining", "0"))
        .json(ApiResponse::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            rule: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    rule: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let rule = self.rule.clone();

        Box::pin(async move {
            let key = format!("{}:{}", rule.key_prefix, client_ip(&req));
            let window = Duration::from_secs(rule.window_secs);

            let remaining = match register_hit(key.clone(), rule.max_requests, window).await {
                Decision::Allowed { remaining } => remaining,
                Decision::Limited { retry_after } => {
                    warn!(
                        "Rate limit exceeded for {} ({} requests per {}s)",
                        key, rule.max_requests, rule.window_secs
                    );
                    return Ok(req.into_response(rate_limited(retry_after).map_into_right_body()));
                }
            };

            let mut res = srv.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(rule.max_requests),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(remaining),
            );

            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[::core::prelude::v1::test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.max_requests, login.window_secs), (5, 60));
        assert_eq!(login.key_prefix, "login");

        let forgot = RateLimit::forgot_password();
        assert_eq!((forgot.max_requests, forgot.window_secs), (3, 600));

        assert_eq!(RateLimit::new("x", 1, 0).window_secs, 1);
        assert_eq!(RateLimit::new("x", 1, 86_400).window_secs, MAX_WINDOW_SECS);
    }

    #[actix_web::test]
    async fn test_limit_is_per_ip_and_reports_retry_after() {
        let app = test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new("limit_test", 2, 60))
                    .route(web::post().to(ok)),
            ),
        )
        .await;
        let from = |ip: &str| {
            test::TestRequest::post()
                .uri("/login")
                .peer_addr(format!("{ip}:40000").parse().unwrap())
                .to_request()
        };

        let first = test::call_service(&app, from("10.0.0.1")).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers().get("x-ratelimit-remaining").unwrap(), "1");
        let second = test::call_service(&app, from("10.0.0.1")).await;
        assert_eq!(second.headers().get("x-ratelimit-remaining").unwrap(), "0");

        let limited = test::call_service(&app, from("10.0.0.1")).await;
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = limited
            .headers()
            .get(RETRY_AFTER)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));

        let other_ip = test::call_service(&app, from("10.0.0.2")).await;
        assert_eq!(other_ip.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_expired_window_starts_over() {
        let key = "window_test:10.0.0.3".to_string();
        let window = Duration::from_secs(1);
        RATE_LIMIT_CACHE
            .insert(key.clone(), (Instant::now() - Duration::from_secs(5), 1))
            .await;

        assert!(matches!(
            register_hit(key.clone(), 1, window).await,
            Decision::Allowed { remaining: 0 }
        ));
        assert!(matches!(register_hit(key, 1, window).await, Decision::Limited { .. }));
    }
}
