use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// 配置列表解析结果："*" 归入 `any`，其余合法项收集到 `items`。
#[derive(Debug, PartialEq)]
struct Allowed<T> {
    any: bool,
    items: Vec<T>,
}

fn parse_list<T>(
    label: &str,
    values: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> Allowed<T> {
    let mut out = Allowed {
        any: false,
        items: Vec::new(),
    };
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if value == "*" {
            out.any = true;
        } else if let Some(item) = parse(value) {
            out.items.push(item);
        } else {
            tracing::warn!("CORS {} 含无效值: {}", label, value);
        }
    }
    out
}

fn parse_method(v: &str) -> Option<Method> {
    Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
}

fn parse_header(v: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(v.to_ascii_lowercase().as_bytes()).ok()
}

/// 根据配置构建 CORS 中间件；未启用或配置无效时返回 `None`。
///
/// 未配置 `allowed_methods` 时默认放行本服务用到的 GET/POST。
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let origins = parse_list("allowed_origins", &cors.allowed_origins, |v| {
        HeaderValue::from_str(v).ok()
    });
    if !origins.any && origins.items.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }
    let methods = parse_list("allowed_methods", &cors.allowed_methods, parse_method);
    let headers = parse_list("allowed_headers", &cors.allowed_headers, parse_header);
    let expose = parse_list("expose_headers", &cors.expose_headers, parse_header);

    if cors.allow_credentials && (origins.any || methods.any || headers.any || expose.any) {
        tracing::error!("CORS 配置无效：allow_credentials=true 不能与 \"*\" 同时使用，已跳过启用");
        return None;
    }

    let mut layer = if origins.any {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins.items)
    };

    layer = match (methods.any, methods.items.is_empty()) {
        (true, _) => layer.allow_methods(Any),
        (false, true) => layer.allow_methods([Method::GET, Method::POST]),
        (false, false) => layer.allow_methods(methods.items),
    };

    if headers.any {
        layer = layer.allow_headers(Any);
    } else if !headers.items.is_empty() {
        layer = layer.allow_headers(headers.items);
    }

    if expose.any {
        layer = layer.expose_headers(Any);
    } else if !expose.items.is_empty() {
        layer = layer.expose_headers(expose.items);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(secs) = cors.max_age_secs
        && secs > 0
    {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_builds_nothing() {
        assert!(build_cors_layer(&CorsConfig::default()).is_none());
    }

    #[test]
    fn skips_when_origins_empty() {
        let cors = CorsConfig {
            enabled: true,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn rejects_credentials_with_wildcard() {
        let cors = CorsConfig {
            enabled: true,
            allow_credentials: true,
            allowed_origins: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn methods_are_normalized_and_invalid_entries_dropped() {
        let input = vec!["get".to_string(), " POST ".to_string(), "*".to_string()];
        let parsed = parse_list("allowed_methods", &input, parse_method);
        assert!(parsed.any);
        assert_eq!(parsed.items, vec![Method::GET, Method::POST]);

        let bad = vec!["bad header".to_string()];
        let parsed = parse_list("allowed_headers", &bad, parse_header);
        assert!(!parsed.any);
        assert!(parsed.items.is_empty());
    }
}
